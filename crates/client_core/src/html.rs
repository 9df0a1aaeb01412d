//! Small helpers shared by the HTML projections.

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Rounds a percentage for display labels.
pub fn percent_label(value: f64) -> String {
    format!("{}%", value.round() as i64)
}
