//! Vendor search filters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub keywords: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub vendor_type: Option<String>,
    /// Only sent together with a zip code.
    pub radius_miles: Option<u32>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl SearchCriteria {
    /// Query parameters in wire order; blank filters are left out entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text_filters = [
            ("keywords", &self.keywords),
            ("country", &self.country),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
            ("vendor_type", &self.vendor_type),
        ];
        for (key, value) in text_filters {
            if let Some(value) = filled(value) {
                pairs.push((key, value.to_string()));
            }
        }

        if filled(&self.zip_code).is_some() {
            if let Some(radius) = self.radius_miles {
                pairs.push(("radius_miles", radius.to_string()));
            }
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}
