//! The editable items table.
//!
//! [`ItemTable`] is the in-memory row store; the HTML it renders is a pure
//! projection of it. Display indices and row striping are derived from
//! position on every read and never stored.

use chrono::Utc;
use shared::domain::{Item, ItemId};
use tracing::debug;

use crate::{
    html::{escape_html, percent_label},
    rows::{from_row, to_row, Row, RowField},
};

pub const COLUMN_COUNT: usize = 8;
pub const EMPTY_STATE_MESSAGE: &str =
    "No items extracted. You can add items manually or process documents again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Neutral,
    Danger,
    Warning,
    Info,
    Success,
}

impl ConfidenceLevel {
    /// Buckets an extraction confidence. Each bucket includes its lower bound.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => ConfidenceLevel::Neutral,
            Some(score) if score == 0.0 || score.is_nan() => ConfidenceLevel::Neutral,
            Some(score) if score >= 0.8 => ConfidenceLevel::Success,
            Some(score) if score >= 0.5 => ConfidenceLevel::Info,
            Some(score) if score >= 0.3 => ConfidenceLevel::Warning,
            Some(_) => ConfidenceLevel::Danger,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ConfidenceLevel::Neutral => "bg-secondary",
            ConfidenceLevel::Danger => "bg-danger",
            ConfidenceLevel::Warning => "bg-warning",
            ConfidenceLevel::Info => "bg-info",
            ConfidenceLevel::Success => "bg-success",
        }
    }
}

/// Alternating stripe; carries no meaning beyond position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Even,
    Odd,
}

impl RowStyle {
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 {
            RowStyle::Even
        } else {
            RowStyle::Odd
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            RowStyle::Even => "bg-white",
            RowStyle::Odd => "bg-gray-50",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRow<'a> {
    pub display_index: usize,
    pub style: RowStyle,
    pub confidence: ConfidenceLevel,
    pub row: &'a Row,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableLine<'a> {
    EmptyState,
    Row(RenderedRow<'a>),
}

#[derive(Debug, Default, Clone)]
pub struct ItemTable {
    rows: Vec<Row>,
    last_temporary_stamp: i64,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: &[Item]) -> Self {
        let mut table = Self::new();
        table.render(items.iter().map(to_row));
        table
    }

    /// Replaces the whole row set, keeping the given order.
    pub fn render(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.clear();
        for row in rows {
            if !self.append_row(row) {
                debug!("table render dropped a row with a duplicate id");
            }
        }
    }

    /// Appends a row unless its id is already present.
    pub fn append_row(&mut self, row: Row) -> bool {
        if self.contains(&row.id) {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn add_blank_row(&mut self) -> ItemId {
        let id = self.next_temporary_id();
        self.rows.push(Row::blank(id.clone()));
        id
    }

    pub fn remove_row(&mut self, id: &ItemId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| &row.id != id);
        self.rows.len() != before
    }

    pub fn edit(&mut self, id: &ItemId, field: RowField, value: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|row| &row.id == id) {
            Some(row) => {
                row.set_field(field, value);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.rows.iter().any(|row| &row.id == id)
    }

    pub fn row(&self, id: &ItemId) -> Option<&Row> {
        self.rows.iter().find(|row| &row.id == id)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn display_index(&self, id: &ItemId) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| &row.id == id)
            .map(|position| position + 1)
    }

    pub fn lines(&self) -> Vec<TableLine<'_>> {
        if self.rows.is_empty() {
            return vec![TableLine::EmptyState];
        }

        self.rows
            .iter()
            .enumerate()
            .map(|(position, row)| {
                TableLine::Row(RenderedRow {
                    display_index: position + 1,
                    style: RowStyle::for_position(position),
                    confidence: ConfidenceLevel::from_score(row.confidence),
                    row,
                })
            })
            .collect()
    }

    /// Items for the save payload; rows without a name are left out.
    pub fn collect_items(&self) -> Vec<Item> {
        self.rows.iter().filter_map(from_row).collect()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from(
            r#"<table id="items-table" class="table"><thead><tr><th>#</th><th>Item Name</th><th>Quantity</th><th>Brand/Model</th><th>Size/Type</th><th>Description</th><th>Confidence</th><th>Actions</th></tr></thead><tbody>"#,
        );
        for line in self.lines() {
            match line {
                TableLine::EmptyState => html.push_str(&format!(
                    r#"<tr class="empty-state"><td colspan="{COLUMN_COUNT}" class="text-center">{EMPTY_STATE_MESSAGE}</td></tr>"#
                )),
                TableLine::Row(rendered) => html.push_str(&render_row(&rendered)),
            }
        }
        html.push_str("</tbody></table>");
        html
    }

    fn next_temporary_id(&mut self) -> ItemId {
        let mut stamp = Utc::now()
            .timestamp_millis()
            .max(self.last_temporary_stamp + 1);
        while self.contains(&ItemId::temporary(stamp)) {
            stamp += 1;
        }
        self.last_temporary_stamp = stamp;
        ItemId::temporary(stamp)
    }
}

fn render_row(rendered: &RenderedRow<'_>) -> String {
    let row = rendered.row;
    let percent = row.confidence.unwrap_or(0.0) * 100.0;
    let percent = if percent.is_finite() { percent } else { 0.0 };

    format!(
        concat!(
            r#"<tr data-item-id="{id}" class="{style}">"#,
            r#"<td class="item-number">{index}</td>"#,
            r#"<td><input type="text" class="form-control item-name" value="{name}" required></td>"#,
            r#"<td><input type="number" class="form-control item-quantity" value="{quantity}" min="1"></td>"#,
            r#"<td><input type="text" class="form-control item-brand" value="{brand}" placeholder="Brand">"#,
            r#"<input type="text" class="form-control mt-1 item-model" value="{model}" placeholder="Model"></td>"#,
            r#"<td><input type="text" class="form-control item-size" value="{size}" placeholder="Size">"#,
            r#"<input type="text" class="form-control mt-1 item-type" value="{item_type}" placeholder="Type"></td>"#,
            r#"<td><textarea class="form-control item-description">{description}</textarea></td>"#,
            r#"<td><div class="progress"><div class="progress-bar {confidence}" role="progressbar" style="width: {width}%" aria-valuenow="{width}" aria-valuemin="0" aria-valuemax="100">{label}</div></div></td>"#,
            r#"<td><button type="button" class="btn btn-sm btn-danger delete-item-btn" data-item-id="{id}">Delete</button></td>"#,
            "</tr>"
        ),
        id = escape_html(row.id.as_str()),
        style = rendered.style.css_class(),
        index = rendered.display_index,
        name = escape_html(&row.name),
        quantity = escape_html(&row.quantity),
        brand = escape_html(&row.brand),
        model = escape_html(&row.model),
        size = escape_html(&row.size),
        item_type = escape_html(&row.item_type),
        description = escape_html(&row.description),
        confidence = rendered.confidence.css_class(),
        width = percent,
        label = percent_label(percent),
    )
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
