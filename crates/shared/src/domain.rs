use std::fmt;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(RfqId);
id_newtype!(ItemId);
id_newtype!(VendorId);
id_newtype!(EmailId);

/// Prefix of client-side ids handed out before the server has seen a row.
pub const TEMPORARY_ID_PREFIX: &str = "new-";

impl ItemId {
    pub fn temporary(stamp: i64) -> Self {
        Self(format!("{TEMPORARY_ID_PREFIX}{stamp}"))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_ID_PREFIX)
    }
}

/// A requested line item of an RFQ.
///
/// Optional text fields travel as `null` when blank. `extracted_confidence`
/// is only present on items produced by document extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_confidence: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireQuantity {
    Whole(u64),
    Fractional(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Accepts whole numbers sent as integers, floats or strings. Anything else
/// decodes as no quantity instead of failing the whole item.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = match Option::<WireQuantity>::deserialize(deserializer)? {
        None | Some(WireQuantity::Other(_)) => None,
        Some(WireQuantity::Whole(value)) => u32::try_from(value).ok(),
        Some(WireQuantity::Fractional(value)) => {
            let whole =
                value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
            whole.then_some(value as u32)
        }
        Some(WireQuantity::Text(value)) => value.trim().parse().ok(),
    };
    Ok(quantity)
}

impl Item {
    pub fn named(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity: None,
            brand: None,
            model: None,
            size: None,
            item_type: None,
            description: None,
            extracted_confidence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorLocation {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: VendorLocation,
    #[serde(default)]
    pub vendor_type: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorMatch {
    pub vendor: Vendor,
    /// Ranking score in `0..=100`.
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub subject: String,
    pub body: String,
}
