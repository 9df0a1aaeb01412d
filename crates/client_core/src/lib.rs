//! Client-side synchronisation of RFQ item tables and vendor results with the
//! procurement backend.

pub mod controller;
pub mod email;
pub mod error;
mod html;
pub mod notifier;
pub mod rows;
pub mod search;
pub mod table;
pub mod transport;
pub mod vendors;

pub use controller::{Control, Outcome, SkipReason, SyncController};
pub use error::{ClientError, Operation};
pub use notifier::{BusyTarget, Notifier, Severity, ToastCenter};
pub use search::SearchCriteria;
pub use table::ItemTable;
pub use transport::{HttpProcurementApi, ProcurementApi};
