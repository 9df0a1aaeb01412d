//! Vendor match breakdown and vendor search results.

use shared::{
    domain::{ItemId, RfqId, Vendor, VendorId, VendorLocation, VendorMatch},
    protocol::ItemVendorMatches,
};

use crate::{
    html::{escape_html, percent_label},
    table::{ItemTable, RowStyle},
};

pub const NO_MATCHES_MESSAGE: &str =
    "No vendor matches found. Try adjusting search criteria or add items to the RFQ.";
pub const NO_SEARCH_RESULTS_MESSAGE: &str =
    "No vendors found matching your criteria. Try broadening your search.";

/// The "generate email" action attached to each matched vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAction {
    pub rfq_id: RfqId,
    pub vendor_id: VendorId,
    pub serial: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorMatchGroup {
    pub item_id: ItemId,
    pub label: String,
    pub matches: Vec<VendorMatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorMatchView {
    rfq_id: RfqId,
    groups: Vec<VendorMatchGroup>,
}

impl VendorMatchView {
    /// Groups without matches are dropped. Labels use the item name from
    /// `table` when the item is known, else `Item #n` over rendered groups.
    pub fn build(rfq_id: RfqId, matches: ItemVendorMatches, table: &ItemTable) -> Self {
        let groups = matches
            .into_iter()
            .filter(|(_, matches)| !matches.is_empty())
            .enumerate()
            .map(|(position, (item_id, matches))| {
                let label = table
                    .row(&item_id)
                    .map(|row| row.name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Item #{}", position + 1));
                VendorMatchGroup {
                    item_id,
                    label,
                    matches,
                }
            })
            .collect();

        Self { rfq_id, groups }
    }

    pub fn rfq_id(&self) -> &RfqId {
        &self.rfq_id
    }

    pub fn groups(&self) -> &[VendorMatchGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn email_actions(&self, item_id: &ItemId) -> Vec<EmailAction> {
        self.groups
            .iter()
            .find(|group| &group.item_id == item_id)
            .map(|group| {
                group
                    .matches
                    .iter()
                    .enumerate()
                    .map(|(position, vendor_match)| EmailAction {
                        rfq_id: self.rfq_id.clone(),
                        vendor_id: vendor_match.vendor.id.clone(),
                        serial: position as u32 + 1,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_html(&self) -> String {
        if self.groups.is_empty() {
            return notice_html(NO_MATCHES_MESSAGE);
        }

        let mut html = String::new();
        for group in &self.groups {
            html.push_str(&format!(
                r#"<div class="mb-4 border border-gray-200 rounded-lg overflow-hidden" data-item-id="{}"><div class="bg-gray-50 px-4 py-3 flex justify-between items-center"><h3 class="text-sm font-medium text-gray-700">{}</h3><span class="text-sm text-gray-500">{} vendors</span></div>"#,
                escape_html(group.item_id.as_str()),
                escape_html(&group.label),
                group.matches.len()
            ));
            html.push_str(r#"<div class="bg-white px-4 py-3"><table class="min-w-full divide-y divide-gray-200"><thead class="bg-gray-50"><tr><th>Vendor</th><th>Location</th><th>Type</th><th>Match Score</th><th>Actions</th></tr></thead><tbody>"#);
            let actions = self.email_actions(&group.item_id);
            for (position, (action, vendor_match)) in actions.iter().zip(&group.matches).enumerate()
            {
                html.push_str(&match_row_html(position, action, vendor_match));
            }
            html.push_str("</tbody></table></div></div>");
        }
        html
    }
}

fn match_row_html(position: usize, action: &EmailAction, vendor_match: &VendorMatch) -> String {
    let vendor = &vendor_match.vendor;
    let score = vendor_match.match_score.clamp(0.0, 100.0);
    format!(
        concat!(
            r#"<tr class="{style}">"#,
            "{identity}{location}{kind}",
            r#"<td class="match-score"><div class="w-full bg-gray-200 rounded-full h-2.5"><div class="bg-primary-600 h-2.5 rounded-full" style="width: {score}%"></div></div><span class="ml-2">{label}</span></td>"#,
            r#"<td class="text-center"><button type="button" class="generate-email-btn" data-rfq-id="{rfq}" data-vendor-id="{vendor_id}" data-serial="{serial}">Generate Email</button></td>"#,
            "</tr>"
        ),
        style = RowStyle::for_position(position).css_class(),
        identity = identity_cell(vendor),
        location = location_cell(&vendor.location),
        kind = type_cell(&vendor.vendor_type),
        score = score,
        label = percent_label(score),
        rfq = escape_html(action.rfq_id.as_str()),
        vendor_id = escape_html(action.vendor_id.as_str()),
        serial = action.serial,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultsView {
    vendors: Vec<Vendor>,
}

impl SearchResultsView {
    pub fn new(vendors: Vec<Vendor>) -> Self {
        Self { vendors }
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    pub fn to_html(&self) -> String {
        if self.vendors.is_empty() {
            return notice_html(NO_SEARCH_RESULTS_MESSAGE);
        }

        let mut html = String::from(
            r#"<table class="min-w-full divide-y divide-gray-200"><thead class="bg-gray-50"><tr><th>Vendor</th><th>Location</th><th>Type</th><th>Specializations</th><th>Contact</th></tr></thead><tbody>"#,
        );
        for (position, vendor) in self.vendors.iter().enumerate() {
            let specializations: String = vendor
                .specializations
                .iter()
                .map(|spec| {
                    format!(
                        r#"<span class="px-2 py-0.5 text-xs rounded bg-gray-100">{}</span>"#,
                        escape_html(spec)
                    )
                })
                .collect();
            let contact = match vendor.email.as_deref().filter(|email| !email.trim().is_empty()) {
                Some(email) => format!(
                    r#"<a href="mailto:{0}" class="text-primary-600">{0}</a>"#,
                    escape_html(email)
                ),
                None => "N/A".to_string(),
            };
            html.push_str(&format!(
                r#"<tr class="{}">{}{}{}<td class="specializations"><div class="flex flex-wrap gap-1">{}</div></td><td class="text-center">{}</td></tr>"#,
                RowStyle::for_position(position).css_class(),
                identity_cell(vendor),
                location_cell(&vendor.location),
                type_cell(&vendor.vendor_type),
                specializations,
                contact
            ));
        }
        html.push_str("</tbody></table>");
        html
    }
}

pub fn vendor_type_label(vendor_type: &str) -> String {
    vendor_type.replace('_', " ")
}

/// `city (zip)`, either part omitted when missing.
pub fn location_detail(location: &VendorLocation) -> String {
    let city = location.city.as_deref().map(str::trim).unwrap_or_default();
    let zip = location
        .zip_code
        .as_deref()
        .map(str::trim)
        .filter(|zip| !zip.is_empty());
    match zip {
        Some(zip) if city.is_empty() => format!("({zip})"),
        Some(zip) => format!("{city} ({zip})"),
        None => city.to_string(),
    }
}

fn identity_cell(vendor: &Vendor) -> String {
    let website = vendor
        .website
        .as_deref()
        .filter(|site| !site.trim().is_empty())
        .unwrap_or("N/A");
    format!(
        r#"<td><div class="text-sm font-medium text-gray-900">{}</div><div class="text-sm text-gray-500">{}</div></td>"#,
        escape_html(&vendor.name),
        escape_html(website)
    )
}

fn location_cell(location: &VendorLocation) -> String {
    format!(
        r#"<td><div class="text-sm text-gray-900">{}</div><div class="text-sm text-gray-500">{}</div></td>"#,
        escape_html(&location.country),
        escape_html(&location_detail(location))
    )
}

fn type_cell(vendor_type: &str) -> String {
    format!(
        r#"<td><span class="px-2 inline-flex text-xs font-semibold rounded-full bg-blue-100 text-blue-800">{}</span></td>"#,
        escape_html(&vendor_type_label(vendor_type))
    )
}

fn notice_html(message: &str) -> String {
    format!(
        r#"<div class="bg-yellow-50 border-l-4 border-yellow-400 p-4 mb-4"><p class="text-sm text-yellow-700">{}</p></div>"#,
        escape_html(message)
    )
}

#[cfg(test)]
#[path = "tests/vendors_tests.rs"]
mod tests;
