//! Conversion between server items and editable table rows.
//!
//! A [`Row`] holds exactly the text the user sees in each input, so reading a
//! row back never needs the rendering surface.

use shared::domain::{Item, ItemId};

/// Quantity shown for items that arrive without one.
pub const DEFAULT_DISPLAY_QUANTITY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowField {
    Name,
    Quantity,
    Brand,
    Model,
    Size,
    Type,
    Description,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: ItemId,
    pub name: String,
    pub quantity: String,
    pub brand: String,
    pub model: String,
    pub size: String,
    pub item_type: String,
    pub description: String,
    /// Display-only; never edited.
    pub confidence: Option<f64>,
}

impl Row {
    /// A freshly added row: empty fields, default quantity, no confidence.
    pub fn blank(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            quantity: DEFAULT_DISPLAY_QUANTITY.to_string(),
            brand: String::new(),
            model: String::new(),
            size: String::new(),
            item_type: String::new(),
            description: String::new(),
            confidence: None,
        }
    }

    pub fn field(&self, field: RowField) -> &str {
        match field {
            RowField::Name => &self.name,
            RowField::Quantity => &self.quantity,
            RowField::Brand => &self.brand,
            RowField::Model => &self.model,
            RowField::Size => &self.size,
            RowField::Type => &self.item_type,
            RowField::Description => &self.description,
        }
    }

    pub fn set_field(&mut self, field: RowField, value: impl Into<String>) {
        let slot = match field {
            RowField::Name => &mut self.name,
            RowField::Quantity => &mut self.quantity,
            RowField::Brand => &mut self.brand,
            RowField::Model => &mut self.model,
            RowField::Size => &mut self.size,
            RowField::Type => &mut self.item_type,
            RowField::Description => &mut self.description,
        };
        *slot = value.into();
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

pub fn to_row(item: &Item) -> Row {
    let quantity = item
        .quantity
        .filter(|quantity| *quantity > 0)
        .unwrap_or(DEFAULT_DISPLAY_QUANTITY);

    Row {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: quantity.to_string(),
        brand: item.brand.clone().unwrap_or_default(),
        model: item.model.clone().unwrap_or_default(),
        size: item.size.clone().unwrap_or_default(),
        item_type: item.item_type.clone().unwrap_or_default(),
        description: item.description.clone().unwrap_or_default(),
        confidence: item.extracted_confidence,
    }
}

/// Reads a row back into an item, or `None` when the row has no name yet.
///
/// Quantity must be a positive whole number; anything else is sent as null.
/// Blank optional text becomes null.
pub fn from_row(row: &Row) -> Option<Item> {
    if !row.is_complete() {
        return None;
    }

    Some(Item {
        id: row.id.clone(),
        name: row.name.clone(),
        quantity: parse_quantity(&row.quantity),
        brand: non_blank(&row.brand),
        model: non_blank(&row.model),
        size: non_blank(&row.size),
        item_type: non_blank(&row.item_type),
        description: non_blank(&row.description),
        extracted_confidence: row.confidence,
    })
}

pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|quantity| *quantity > 0)
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
