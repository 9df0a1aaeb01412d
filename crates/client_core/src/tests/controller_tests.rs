use super::*;
use crate::{
    error::Operation,
    notifier::ToastCenter,
    table::{ConfidenceLevel, TableLine},
};
use async_trait::async_trait;
use shared::{
    domain::{Email, Vendor, VendorId, VendorLocation, VendorMatch},
    protocol::{ItemVendorMatches, SaveAck},
};
use tokio::sync::Notify;

struct Gate {
    entered: Notify,
    release: Notify,
}

struct FakeApi {
    items: Vec<Item>,
    matches: ItemVendorMatches,
    vendors: Vec<Vendor>,
    failing: HashSet<Operation>,
    gate: Option<Gate>,
    calls: Mutex<Vec<Operation>>,
    saved: Mutex<Vec<Vec<Item>>>,
    searches: Mutex<Vec<SearchCriteria>>,
    sent: Mutex<Vec<EmailId>>,
    generated: Mutex<u32>,
}

impl FakeApi {
    fn ok() -> Self {
        Self {
            items: Vec::new(),
            matches: ItemVendorMatches::new(),
            vendors: Vec::new(),
            failing: HashSet::new(),
            gate: None,
            calls: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            generated: Mutex::new(0),
        }
    }

    fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    fn with_matches(mut self, matches: ItemVendorMatches) -> Self {
        self.matches = matches;
        self
    }

    fn with_vendors(mut self, vendors: Vec<Vendor>) -> Self {
        self.vendors = vendors;
        self
    }

    fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    fn gated(mut self) -> Self {
        self.gate = Some(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    async fn record(&self, operation: Operation) -> Result<(), ClientError> {
        self.calls.lock().await.push(operation);
        if self.failing.contains(&operation) {
            return Err(ClientError::Status {
                operation,
                status: 500,
                detail: None,
            });
        }
        Ok(())
    }

    async fn calls(&self) -> Vec<Operation> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ProcurementApi for FakeApi {
    async fn process_documents(&self, _rfq_id: &RfqId) -> Result<Vec<Item>, ClientError> {
        self.pass_gate().await;
        self.record(Operation::ProcessDocuments).await?;
        Ok(self.items.clone())
    }

    async fn save_items(&self, _rfq_id: &RfqId, items: &[Item]) -> Result<SaveAck, ClientError> {
        self.pass_gate().await;
        self.record(Operation::SaveItems).await?;
        self.saved.lock().await.push(items.to_vec());
        Ok(SaveAck::default())
    }

    async fn match_vendors(&self, _rfq_id: &RfqId) -> Result<ItemVendorMatches, ClientError> {
        self.pass_gate().await;
        self.record(Operation::MatchVendors).await?;
        Ok(self.matches.clone())
    }

    async fn search_vendors(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Vendor>, ClientError> {
        self.pass_gate().await;
        self.record(Operation::SearchVendors).await?;
        self.searches.lock().await.push(criteria.clone());
        Ok(self.vendors.clone())
    }

    async fn generate_email(
        &self,
        _rfq_id: &RfqId,
        vendor_id: &VendorId,
        serial: u32,
    ) -> Result<Email, ClientError> {
        self.record(Operation::GenerateEmail).await?;
        let mut generated = self.generated.lock().await;
        *generated += 1;
        Ok(Email {
            id: EmailId::new(format!("e{}", *generated)),
            subject: format!("RFQ for {vendor_id} #{serial}"),
            body: "Please quote.".into(),
        })
    }

    async fn send_email(&self, email_id: &EmailId) -> Result<(), ClientError> {
        self.record(Operation::SendEmail).await?;
        self.sent.lock().await.push(email_id.clone());
        Ok(())
    }
}

fn controller(api: FakeApi) -> (Arc<SyncController>, Arc<FakeApi>, Arc<ToastCenter>) {
    let api = Arc::new(api);
    let toasts = Arc::new(ToastCenter::default());
    let controller = Arc::new(SyncController::new(api.clone(), toasts.clone()));
    (controller, api, toasts)
}

fn pump() -> Item {
    let mut item = Item::named("1", "Pump");
    item.quantity = Some(2);
    item.extracted_confidence = Some(0.85);
    item
}

fn rfq() -> RfqId {
    RfqId::new("rfq-1")
}

fn vendor(id: &str) -> Vendor {
    Vendor {
        id: VendorId::new(id),
        name: format!("Vendor {id}"),
        website: None,
        location: VendorLocation {
            country: "US".into(),
            city: None,
            zip_code: None,
        },
        vendor_type: "manufacturer".into(),
        specializations: Vec::new(),
        email: None,
    }
}

#[tokio::test]
async fn process_renders_returned_items() {
    let (controller, _api, toasts) = controller(FakeApi::ok().with_items(vec![pump()]));

    let outcome = controller.process_documents(&rfq()).await;
    assert_eq!(outcome, Outcome::Done(1));

    let table = controller.table().await;
    let lines = table.lines();
    assert_eq!(lines.len(), 1);
    let TableLine::Row(rendered) = lines[0] else {
        panic!("expected an item row");
    };
    assert_eq!(rendered.display_index, 1);
    assert_eq!(rendered.confidence, ConfidenceLevel::Success);
    assert_eq!(rendered.row.quantity, "2");

    assert_eq!(toasts.count(Severity::Success), 1);
    assert!(toasts.busy_message(BusyTarget::ItemsTable).is_none());
    assert!(controller.is_enabled(Control::ProcessDocuments).await);
}

#[tokio::test]
async fn failed_process_keeps_existing_rows() {
    let (controller, _api, toasts) =
        controller(FakeApi::ok().failing(Operation::ProcessDocuments));
    controller.load_items(&[Item::named("keep", "Gasket")]).await;

    let outcome = controller.process_documents(&rfq()).await;
    assert_eq!(
        outcome,
        Outcome::Failed("Error processing documents".to_string())
    );

    let table = controller.table().await;
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].name, "Gasket");
    let errors: Vec<String> = toasts
        .history()
        .into_iter()
        .filter(|toast| toast.severity == Severity::Error)
        .map(|toast| toast.message)
        .collect();
    assert_eq!(errors, vec!["Error: Error processing documents".to_string()]);
    assert!(controller.is_enabled(Control::ProcessDocuments).await);
    assert!(toasts.busy_message(BusyTarget::ItemsTable).is_none());
}

#[tokio::test]
async fn saving_without_named_rows_warns_without_network() {
    let (controller, api, toasts) = controller(FakeApi::ok());
    controller.add_blank_row().await;

    let outcome = controller.save_item_corrections(&rfq()).await;

    assert_eq!(outcome, Outcome::Skipped(SkipReason::NothingToSave));
    assert!(api.calls().await.is_empty());
    assert_eq!(toasts.history().len(), 1);
    assert_eq!(toasts.count(Severity::Warning), 1);
}

#[tokio::test]
async fn blank_rows_are_left_out_of_the_payload() {
    let (controller, api, toasts) = controller(FakeApi::ok());
    controller.load_items(&[pump()]).await;
    controller.add_blank_row().await;

    let outcome = controller.save_item_corrections(&rfq()).await;

    assert_eq!(outcome, Outcome::Done(1));
    let saved = api.saved.lock().await.clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].len(), 1);
    assert_eq!(saved[0][0].id, ItemId::new("1"));
    assert_eq!(toasts.count(Severity::Warning), 0);
    assert_eq!(toasts.count(Severity::Success), 1);
    assert_eq!(controller.table().await.len(), 2);
}

#[tokio::test]
async fn edited_values_reach_the_payload() {
    let (controller, api, _toasts) = controller(FakeApi::ok());
    let id = controller.add_blank_row().await;
    assert!(controller.edit_row(&id, RowField::Name, "Impeller").await);
    assert!(controller.edit_row(&id, RowField::Quantity, "oops").await);
    assert!(!controller.edit_row(&ItemId::new("ghost"), RowField::Name, "x").await);

    controller.save_item_corrections(&rfq()).await;

    let saved = api.saved.lock().await.clone();
    assert_eq!(saved[0][0].id, id);
    assert_eq!(saved[0][0].name, "Impeller");
    assert_eq!(saved[0][0].quantity, None);
}

#[tokio::test]
async fn failed_save_leaves_table_and_matching_untouched() {
    let (controller, _api, toasts) = controller(FakeApi::ok().failing(Operation::SaveItems));
    controller.load_items(&[pump(), Item::named("2", "Seal")]).await;
    let before = controller.table().await.rows().to_vec();

    let outcome = controller.save_item_corrections(&rfq()).await;

    assert_eq!(outcome, Outcome::Failed("Error saving items".to_string()));
    assert_eq!(controller.table().await.rows(), before.as_slice());
    assert_eq!(toasts.count(Severity::Error), 1);
    assert!(!controller.is_enabled(Control::MatchVendors).await);
    assert!(controller.is_enabled(Control::SaveItems).await);
}

#[tokio::test]
async fn vendor_matching_unlocks_after_save() {
    let mut matches = ItemVendorMatches::new();
    matches.insert(
        ItemId::new("1"),
        vec![VendorMatch {
            vendor: vendor("v1"),
            match_score: 88.0,
        }],
    );
    let (controller, api, toasts) = controller(FakeApi::ok().with_matches(matches));
    controller.load_items(&[pump()]).await;

    assert_eq!(
        controller.match_vendors_for_rfq(&rfq()).await,
        Outcome::Skipped(SkipReason::Unavailable)
    );
    assert!(api.calls().await.is_empty());

    controller.save_item_corrections(&rfq()).await;
    assert!(controller.is_enabled(Control::MatchVendors).await);

    assert_eq!(controller.match_vendors_for_rfq(&rfq()).await, Outcome::Done(1));
    let view = controller.vendor_matches().await.expect("matches rendered");
    assert_eq!(view.groups()[0].label, "Pump");
    assert_eq!(toasts.count(Severity::Success), 2);
    assert!(toasts.busy_message(BusyTarget::VendorResults).is_none());
}

#[tokio::test]
async fn failed_matching_keeps_previous_results() {
    let (controller, _api, toasts) = controller(FakeApi::ok().failing(Operation::MatchVendors));
    controller.enable(Control::MatchVendors).await;

    let outcome = controller.match_vendors_for_rfq(&rfq()).await;

    assert_eq!(outcome, Outcome::Failed("Failed to match vendors".to_string()));
    assert!(controller.vendor_matches().await.is_none());
    assert_eq!(toasts.count(Severity::Error), 1);
    assert!(controller.is_enabled(Control::MatchVendors).await);
}

#[tokio::test]
async fn search_forwards_criteria_and_stores_results() {
    let (controller, api, toasts) =
        controller(FakeApi::ok().with_vendors(vec![vendor("v1"), vendor("v2")]));
    let criteria = SearchCriteria {
        country: Some("US".into()),
        ..Default::default()
    };

    assert_eq!(controller.search_vendors(&criteria).await, Outcome::Done(2));
    assert_eq!(api.searches.lock().await.clone(), vec![criteria]);
    let results = controller.search_results().await.expect("results");
    assert_eq!(results.vendors().len(), 2);
    assert!(toasts.history().is_empty());
}

#[tokio::test]
async fn email_preview_is_reused_and_sent_by_id() {
    let (controller, api, toasts) = controller(FakeApi::ok());
    let action = EmailAction {
        rfq_id: rfq(),
        vendor_id: VendorId::new("v1"),
        serial: 1,
    };

    assert_eq!(
        controller.generate_email(&action).await,
        Outcome::Done(EmailId::new("e1"))
    );
    assert_eq!(
        controller.generate_email(&action).await,
        Outcome::Done(EmailId::new("e2"))
    );
    let preview = controller.email_preview().await.expect("preview");
    assert!(preview.is_open());
    assert_eq!(preview.email().id, EmailId::new("e2"));

    assert_eq!(controller.send_email().await, Outcome::Done(EmailId::new("e2")));
    assert_eq!(api.sent.lock().await.clone(), vec![EmailId::new("e2")]);
    assert!(!controller.email_preview().await.expect("preview").is_open());
    assert_eq!(
        controller.send_email().await,
        Outcome::Skipped(SkipReason::NoEmailPreview)
    );
    assert_eq!(toasts.count(Severity::Info), 3);
}

#[tokio::test]
async fn discarding_an_email_makes_no_call() {
    let (controller, api, _toasts) = controller(FakeApi::ok());
    assert!(!controller.discard_email().await);

    let action = EmailAction {
        rfq_id: rfq(),
        vendor_id: VendorId::new("v1"),
        serial: 2,
    };
    controller.generate_email(&action).await;
    assert!(controller.discard_email().await);

    assert_eq!(api.calls().await, vec![Operation::GenerateEmail]);
    assert_eq!(
        controller.send_email().await,
        Outcome::Skipped(SkipReason::NoEmailPreview)
    );
}

#[tokio::test]
async fn process_control_is_disabled_while_in_flight() {
    let (controller, api, toasts) =
        controller(FakeApi::ok().with_items(vec![pump()]).gated());
    controller.load_items(&[Item::named("old", "Old row")]).await;

    let background = controller.clone();
    let first = tokio::spawn(async move { background.process_documents(&rfq()).await });

    let gate = api.gate.as_ref().expect("gate");
    gate.entered.notified().await;
    assert!(!controller.is_enabled(Control::ProcessDocuments).await);
    assert_eq!(
        toasts.busy_message(BusyTarget::ItemsTable).as_deref(),
        Some(PROCESSING_MESSAGE)
    );
    assert_eq!(
        controller.process_documents(&rfq()).await,
        Outcome::Skipped(SkipReason::InFlight)
    );

    // Edits made while the request is pending are replaced by its result.
    controller.add_blank_row().await;
    gate.release.notify_one();

    assert_eq!(first.await.expect("join"), Outcome::Done(1));
    let table = controller.table().await;
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].id, ItemId::new("1"));
    assert!(controller.is_enabled(Control::ProcessDocuments).await);
    assert!(toasts.busy_message(BusyTarget::ItemsTable).is_none());
    assert_eq!(api.calls().await, vec![Operation::ProcessDocuments]);
}

#[tokio::test]
async fn save_control_is_disabled_while_in_flight() {
    let (controller, api, toasts) = controller(FakeApi::ok().gated());
    controller.load_items(&[pump()]).await;

    let background = controller.clone();
    let first = tokio::spawn(async move { background.save_item_corrections(&rfq()).await });

    let gate = api.gate.as_ref().expect("gate");
    gate.entered.notified().await;
    assert!(!controller.is_enabled(Control::SaveItems).await);
    assert_eq!(
        toasts.busy_message(BusyTarget::ItemsTable).as_deref(),
        Some(SAVING_MESSAGE)
    );
    assert_eq!(
        controller.save_item_corrections(&rfq()).await,
        Outcome::Skipped(SkipReason::InFlight)
    );

    gate.release.notify_one();
    assert!(first.await.expect("join").is_done());
    assert!(controller.is_enabled(Control::SaveItems).await);
    assert!(toasts.busy_message(BusyTarget::ItemsTable).is_none());
    assert_eq!(api.saved.lock().await.len(), 1);
}

#[tokio::test]
async fn match_control_is_disabled_while_in_flight() {
    let (controller, api, toasts) = controller(FakeApi::ok().gated());
    controller.enable(Control::MatchVendors).await;

    let background = controller.clone();
    let first = tokio::spawn(async move { background.match_vendors_for_rfq(&rfq()).await });

    let gate = api.gate.as_ref().expect("gate");
    gate.entered.notified().await;
    assert_eq!(
        toasts.busy_message(BusyTarget::VendorResults).as_deref(),
        Some(MATCHING_MESSAGE)
    );
    assert_eq!(
        controller.match_vendors_for_rfq(&rfq()).await,
        Outcome::Skipped(SkipReason::InFlight)
    );

    gate.release.notify_one();
    assert!(first.await.expect("join").is_done());
    assert!(toasts.busy_message(BusyTarget::VendorResults).is_none());
    assert_eq!(api.calls().await, vec![Operation::MatchVendors]);
}

#[tokio::test]
async fn search_control_is_disabled_while_in_flight() {
    let (controller, api, toasts) =
        controller(FakeApi::ok().with_vendors(vec![vendor("v1")]).gated());
    let criteria = SearchCriteria {
        keywords: Some("pumps".into()),
        ..Default::default()
    };

    let background = controller.clone();
    let pending = criteria.clone();
    let first = tokio::spawn(async move { background.search_vendors(&pending).await });

    let gate = api.gate.as_ref().expect("gate");
    gate.entered.notified().await;
    assert!(!controller.is_enabled(Control::SearchVendors).await);
    assert_eq!(
        toasts.busy_message(BusyTarget::SearchResults).as_deref(),
        Some(SEARCHING_MESSAGE)
    );
    assert_eq!(
        controller.search_vendors(&criteria).await,
        Outcome::Skipped(SkipReason::InFlight)
    );

    gate.release.notify_one();
    assert!(first.await.expect("join").is_done());
    assert!(toasts.busy_message(BusyTarget::SearchResults).is_none());
    assert_eq!(api.searches.lock().await.len(), 1);
}

#[tokio::test]
async fn deleting_rows_through_the_controller_renumbers() {
    let (controller, _api, _toasts) = controller(FakeApi::ok());
    controller
        .load_items(&[
            Item::named("a", "A"),
            Item::named("b", "B"),
            Item::named("c", "C"),
        ])
        .await;

    assert!(controller.remove_row(&ItemId::new("a")).await);

    let table = controller.table().await;
    assert_eq!(table.display_index(&ItemId::new("b")), Some(1));
    assert_eq!(table.display_index(&ItemId::new("c")), Some(2));
    assert!(controller.table_html().await.contains(r#"<td class="item-number">2</td>"#));
}
