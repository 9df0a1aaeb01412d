use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{Email, Item, ItemId, Vendor, VendorMatch};

/// Matches per item, in the order the server listed them.
pub type ItemVendorMatches = IndexMap<ItemId, Vec<VendorMatch>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub item_count: Option<usize>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub item_vendor_matches: ItemVendorMatches,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub vendors: Vec<Vendor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailResponse {
    pub email: Email,
}
