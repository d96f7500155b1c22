//! Downscope permission scopes

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

/// A set of scopes. Ordered, so serialization is deterministic.
pub type ScopeSet = BTreeSet<TokenScope>;

/// Capability that a downscoped token may be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    /// Edit annotations
    AnnotationEdit,
    /// View all annotations
    AnnotationViewAll,
    /// View own annotations
    AnnotationViewSelf,
    /// Content Explorer UI element
    BaseExplorer,
    /// Content Picker UI element
    BasePicker,
    /// Content Preview UI element
    BasePreview,
    /// Content Sidebar UI element
    BaseSidebar,
    /// Content Uploader UI element
    BaseUpload,
    /// Delete items
    ItemDelete,
    /// Download items
    ItemDownload,
    /// Preview items
    ItemPreview,
    /// Rename items
    ItemRename,
    /// Share items
    ItemShare,
    /// Upload items
    ItemUpload,
    /// Read all files and folders
    RootReadonly,
    /// Read and write all files and folders
    RootReadwrite,
}

impl TokenScope {
    /// Every scope, in canonical order.
    pub const ALL: [TokenScope; 16] = [
        TokenScope::AnnotationEdit,
        TokenScope::AnnotationViewAll,
        TokenScope::AnnotationViewSelf,
        TokenScope::BaseExplorer,
        TokenScope::BasePicker,
        TokenScope::BasePreview,
        TokenScope::BaseSidebar,
        TokenScope::BaseUpload,
        TokenScope::ItemDelete,
        TokenScope::ItemDownload,
        TokenScope::ItemPreview,
        TokenScope::ItemRename,
        TokenScope::ItemShare,
        TokenScope::ItemUpload,
        TokenScope::RootReadonly,
        TokenScope::RootReadwrite,
    ];

    /// Canonical wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::AnnotationEdit => "annotation_edit",
            TokenScope::AnnotationViewAll => "annotation_view_all",
            TokenScope::AnnotationViewSelf => "annotation_view_self",
            TokenScope::BaseExplorer => "base_explorer",
            TokenScope::BasePicker => "base_picker",
            TokenScope::BasePreview => "base_preview",
            TokenScope::BaseSidebar => "base_sidebar",
            TokenScope::BaseUpload => "base_upload",
            TokenScope::ItemDelete => "item_delete",
            TokenScope::ItemDownload => "item_download",
            TokenScope::ItemPreview => "item_preview",
            TokenScope::ItemRename => "item_rename",
            TokenScope::ItemShare => "item_share",
            TokenScope::ItemUpload => "item_upload",
            TokenScope::RootReadonly => "root_readonly",
            TokenScope::RootReadwrite => "root_readwrite",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenScope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s.trim())
            .ok_or_else(|| SdkError::Custom(format!("unknown token scope: {s}")))
    }
}

/// Joins a scope set with single spaces.
///
/// Each scope appears once; order follows [`TokenScope`]'s `Ord`.
pub fn scope_string(scopes: &ScopeSet) -> String {
    scopes
        .iter()
        .map(TokenScope::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
