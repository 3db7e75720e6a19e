/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the photo-search gateway and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidPerPage;

/// Image URLs of a photo in the sizes the API offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUrls {
    /// Small (~200px wide) image used in the grid
    pub thumb: String,
    /// Full-size image shown in the photo dialog
    pub full: String,
    /// Remaining sizes (raw, regular, small, ...) passed through untouched
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// A single photo from a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Unsplash photo ID
    #[serde(default)]
    pub id: String,
    pub urls: PhotoUrls,
    #[serde(default)]
    pub likes: u64,
    /// Used as the tile tooltip
    #[serde(default)]
    pub alt_description: Option<String>,
    /// Every other field of the API record, not interpreted here
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of search results, replaced as a whole on each fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub items: Vec<Photo>,
    pub total_items: u64,
    pub total_pages: u32,
}

impl ResultSet {
    /// Check if the search matched nothing at all
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

/// Page size, restricted to the values offered in the per-page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PerPage {
    Five,
    #[default]
    Ten,
    Twenty,
    Thirty,
}

impl PerPage {
    /// All allowed values, in selector order
    pub const ALL: [PerPage; 4] = [PerPage::Five, PerPage::Ten, PerPage::Twenty, PerPage::Thirty];

    pub fn get(self) -> u32 {
        match self {
            PerPage::Five => 5,
            PerPage::Ten => 10,
            PerPage::Twenty => 20,
            PerPage::Thirty => 30,
        }
    }

    /// Number of pages needed to show `total_items` at this page size
    pub fn page_count(self, total_items: u64) -> u32 {
        let per_page = u64::from(self.get());
        let pages = total_items.div_ceil(per_page);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl TryFrom<u32> for PerPage {
    type Error = InvalidPerPage;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(PerPage::Five),
            10 => Ok(PerPage::Ten),
            20 => Ok(PerPage::Twenty),
            30 => Ok(PerPage::Thirty),
            other => Err(InvalidPerPage(other)),
        }
    }
}

impl From<PerPage> for u32 {
    fn from(value: PerPage) -> Self {
        value.get()
    }
}

// pick_list renders options with ToString
impl fmt::Display for PerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl Serialize for PerPage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for PerPage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        PerPage::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Which page of which size to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    pub per_page: PerPage,
}

impl PageRequest {
    pub fn first(per_page: PerPage) -> Self {
        Self { page: 1, per_page }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(PerPage::default())
    }
}
