//! Fetch → render and edit → save orchestration.
//!
//! Every operation runs `Idle -> Pending -> {Success | Failure} -> Idle`.
//! While pending, the triggering control is disabled and a busy indicator is
//! shown. The state lock is never held across a network call, so edits made
//! while a request is in flight land immediately and may be overwritten by
//! that request's completion.

use std::{collections::HashSet, sync::Arc};

use shared::domain::{EmailId, Item, ItemId, RfqId};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    email::EmailPreview,
    error::ClientError,
    notifier::{BusyTarget, Notifier, Severity},
    rows::{to_row, RowField},
    search::SearchCriteria,
    table::ItemTable,
    transport::ProcurementApi,
    vendors::{EmailAction, SearchResultsView, VendorMatchView},
};

pub const PROCESSING_MESSAGE: &str = "Processing documents with AI...";
pub const SAVING_MESSAGE: &str = "Saving items...";
pub const MATCHING_MESSAGE: &str = "Finding suitable vendors...";
pub const SEARCHING_MESSAGE: &str = "Searching vendors...";
pub const NOTHING_TO_SAVE_MESSAGE: &str = "Please add at least one item";

/// Triggers that start a remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    ProcessDocuments,
    SaveItems,
    MatchVendors,
    SearchVendors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The same control already has a request outstanding.
    InFlight,
    /// The control has not been made available yet.
    Unavailable,
    NothingToSave,
    NoEmailPreview,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Failed(String),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

struct ViewState {
    table: ItemTable,
    in_flight: HashSet<Control>,
    unavailable: HashSet<Control>,
    vendor_matches: Option<VendorMatchView>,
    search_results: Option<SearchResultsView>,
    email_preview: Option<EmailPreview>,
}

impl ViewState {
    fn new() -> Self {
        Self {
            table: ItemTable::new(),
            in_flight: HashSet::new(),
            unavailable: HashSet::from([Control::MatchVendors]),
            vendor_matches: None,
            search_results: None,
            email_preview: None,
        }
    }

    fn begin(&mut self, control: Control) -> Result<(), SkipReason> {
        if self.unavailable.contains(&control) {
            return Err(SkipReason::Unavailable);
        }
        if !self.in_flight.insert(control) {
            return Err(SkipReason::InFlight);
        }
        Ok(())
    }

    fn finish(&mut self, control: Control) {
        self.in_flight.remove(&control);
    }
}

pub struct SyncController {
    api: Arc<dyn ProcurementApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ViewState>,
}

impl SyncController {
    pub fn new(api: Arc<dyn ProcurementApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(ViewState::new()),
        }
    }

    /// Makes a control usable, e.g. vendor matching for an RFQ whose items
    /// were saved in an earlier session.
    pub async fn enable(&self, control: Control) {
        self.state.lock().await.unavailable.remove(&control);
    }

    pub async fn is_enabled(&self, control: Control) -> bool {
        let state = self.state.lock().await;
        !state.unavailable.contains(&control) && !state.in_flight.contains(&control)
    }

    pub async fn load_items(&self, items: &[Item]) {
        self.state
            .lock()
            .await
            .table
            .render(items.iter().map(to_row));
    }

    pub async fn add_blank_row(&self) -> ItemId {
        self.state.lock().await.table.add_blank_row()
    }

    pub async fn remove_row(&self, id: &ItemId) -> bool {
        self.state.lock().await.table.remove_row(id)
    }

    pub async fn edit_row(&self, id: &ItemId, field: RowField, value: impl Into<String>) -> bool {
        self.state.lock().await.table.edit(id, field, value)
    }

    pub async fn table(&self) -> ItemTable {
        self.state.lock().await.table.clone()
    }

    pub async fn table_html(&self) -> String {
        self.state.lock().await.table.to_html()
    }

    pub async fn vendor_matches(&self) -> Option<VendorMatchView> {
        self.state.lock().await.vendor_matches.clone()
    }

    pub async fn search_results(&self) -> Option<SearchResultsView> {
        self.state.lock().await.search_results.clone()
    }

    pub async fn email_preview(&self) -> Option<EmailPreview> {
        self.state.lock().await.email_preview.clone()
    }

    /// Runs server-side extraction and replaces the table with its items.
    pub async fn process_documents(&self, rfq_id: &RfqId) -> Outcome<usize> {
        if let Err(reason) = self.state.lock().await.begin(Control::ProcessDocuments) {
            debug!(rfq_id = %rfq_id, ?reason, "process documents skipped");
            return Outcome::Skipped(reason);
        }

        self.notifier
            .show_busy(BusyTarget::ItemsTable, PROCESSING_MESSAGE);
        let result = self.api.process_documents(rfq_id).await;
        self.notifier.hide_busy(BusyTarget::ItemsTable);

        let mut state = self.state.lock().await;
        state.finish(Control::ProcessDocuments);
        match result {
            Ok(items) => {
                state.table.render(items.iter().map(to_row));
                drop(state);
                info!(rfq_id = %rfq_id, item_count = items.len(), "documents processed");
                self.notifier
                    .notify(Severity::Success, "Documents processed successfully");
                Outcome::Done(items.len())
            }
            Err(err) => {
                drop(state);
                self.report_failure(&err)
            }
        }
    }

    /// Submits every named row as a replace-all payload.
    pub async fn save_item_corrections(&self, rfq_id: &RfqId) -> Outcome<usize> {
        let items = {
            let mut state = self.state.lock().await;
            if state.in_flight.contains(&Control::SaveItems) {
                debug!(rfq_id = %rfq_id, "save skipped while a save is in flight");
                return Outcome::Skipped(SkipReason::InFlight);
            }
            let items = state.table.collect_items();
            if items.is_empty() {
                drop(state);
                self.notifier
                    .notify(Severity::Warning, NOTHING_TO_SAVE_MESSAGE);
                return Outcome::Skipped(SkipReason::NothingToSave);
            }
            if let Err(reason) = state.begin(Control::SaveItems) {
                return Outcome::Skipped(reason);
            }
            items
        };

        self.notifier.show_busy(BusyTarget::ItemsTable, SAVING_MESSAGE);
        let result = self.api.save_items(rfq_id, &items).await;
        self.notifier.hide_busy(BusyTarget::ItemsTable);

        let mut state = self.state.lock().await;
        state.finish(Control::SaveItems);
        match result {
            Ok(_ack) => {
                state.unavailable.remove(&Control::MatchVendors);
                drop(state);
                info!(rfq_id = %rfq_id, item_count = items.len(), "items saved");
                self.notifier
                    .notify(Severity::Success, "Items saved successfully");
                Outcome::Done(items.len())
            }
            Err(err) => {
                drop(state);
                self.report_failure(&err)
            }
        }
    }

    /// Fetches ranked vendor matches and renders them per item.
    pub async fn match_vendors_for_rfq(&self, rfq_id: &RfqId) -> Outcome<usize> {
        if let Err(reason) = self.state.lock().await.begin(Control::MatchVendors) {
            debug!(rfq_id = %rfq_id, ?reason, "vendor matching skipped");
            return Outcome::Skipped(reason);
        }

        self.notifier
            .show_busy(BusyTarget::VendorResults, MATCHING_MESSAGE);
        let result = self.api.match_vendors(rfq_id).await;
        self.notifier.hide_busy(BusyTarget::VendorResults);

        let mut state = self.state.lock().await;
        state.finish(Control::MatchVendors);
        match result {
            Ok(matches) => {
                let view = VendorMatchView::build(rfq_id.clone(), matches, &state.table);
                let group_count = view.groups().len();
                state.vendor_matches = Some(view);
                drop(state);
                info!(rfq_id = %rfq_id, group_count, "vendors matched");
                self.notifier
                    .notify(Severity::Success, "Vendors matched successfully!");
                Outcome::Done(group_count)
            }
            Err(err) => {
                drop(state);
                self.report_failure(&err)
            }
        }
    }

    pub async fn search_vendors(&self, criteria: &SearchCriteria) -> Outcome<usize> {
        if let Err(reason) = self.state.lock().await.begin(Control::SearchVendors) {
            debug!(?reason, "vendor search skipped");
            return Outcome::Skipped(reason);
        }

        self.notifier
            .show_busy(BusyTarget::SearchResults, SEARCHING_MESSAGE);
        let result = self.api.search_vendors(criteria).await;
        self.notifier.hide_busy(BusyTarget::SearchResults);

        let mut state = self.state.lock().await;
        state.finish(Control::SearchVendors);
        match result {
            Ok(vendors) => {
                let count = vendors.len();
                state.search_results = Some(SearchResultsView::new(vendors));
                debug!(vendor_count = count, "vendor search finished");
                Outcome::Done(count)
            }
            Err(err) => {
                drop(state);
                self.report_failure(&err)
            }
        }
    }

    /// Generates an email for a matched vendor and opens the preview.
    pub async fn generate_email(&self, action: &EmailAction) -> Outcome<EmailId> {
        self.notifier.notify(Severity::Info, "Generating email...");
        let result = self
            .api
            .generate_email(&action.rfq_id, &action.vendor_id, action.serial)
            .await;

        match result {
            Ok(email) => {
                let email_id = email.id.clone();
                {
                    let mut state = self.state.lock().await;
                    match state.email_preview.as_mut() {
                        Some(preview) => preview.show(email),
                        None => state.email_preview = Some(EmailPreview::new(email)),
                    }
                }
                info!(
                    rfq_id = %action.rfq_id,
                    vendor_id = %action.vendor_id,
                    email_id = %email_id,
                    "email generated"
                );
                self.notifier
                    .notify(Severity::Success, "Email generated successfully!");
                Outcome::Done(email_id)
            }
            Err(err) => self.report_failure(&err),
        }
    }

    /// Closes the preview; nothing is sent.
    pub async fn discard_email(&self) -> bool {
        let mut state = self.state.lock().await;
        match state.email_preview.as_mut() {
            Some(preview) if preview.is_open() => {
                preview.close();
                true
            }
            _ => false,
        }
    }

    /// Sends the previewed email and closes the preview.
    pub async fn send_email(&self) -> Outcome<EmailId> {
        let email_id = {
            let mut state = self.state.lock().await;
            let Some(preview) = state.email_preview.as_mut() else {
                return Outcome::Skipped(SkipReason::NoEmailPreview);
            };
            let Some(email_id) = preview.pending_send().cloned() else {
                return Outcome::Skipped(SkipReason::NoEmailPreview);
            };
            preview.close();
            email_id
        };

        self.notifier.notify(Severity::Info, "Sending email...");
        match self.api.send_email(&email_id).await {
            Ok(()) => {
                info!(email_id = %email_id, "email sent");
                self.notifier
                    .notify(Severity::Success, "Email sent successfully!");
                Outcome::Done(email_id)
            }
            Err(err) => self.report_failure(&err),
        }
    }

    fn report_failure<T>(&self, err: &ClientError) -> Outcome<T> {
        let message = err.to_string();
        warn!(operation = ?err.operation(), error = %message, "operation failed");
        self.notifier
            .notify(Severity::Error, &format!("Error: {message}"));
        Outcome::Failed(message)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
