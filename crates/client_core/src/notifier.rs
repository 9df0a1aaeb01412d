//! Transient user messages (toasts) and busy indicators.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::html::escape_html;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);
const TOAST_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Severity::Success => "bg-green-100 text-green-700 border-green-200",
            Severity::Info => "bg-blue-100 text-blue-700 border-blue-200",
            Severity::Warning => "bg-yellow-100 text-yellow-700 border-yellow-200",
            Severity::Error => "bg-red-100 text-red-700 border-red-200",
        }
    }
}

/// Page regions that can be covered by a busy indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusyTarget {
    ItemsTable,
    VendorResults,
    SearchResults,
}

impl BusyTarget {
    pub fn container_id(self) -> &'static str {
        match self {
            BusyTarget::ItemsTable => "items-container",
            BusyTarget::VendorResults => "vendor-results-container",
            BusyTarget::SearchResults => "search-results-container",
        }
    }
}

/// What the sync layer needs from the page chrome.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
    fn show_busy(&self, target: BusyTarget, message: &str);
    fn hide_busy(&self, target: BusyTarget);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

#[derive(Debug, Default)]
struct ToastContainer {
    toasts: VecDeque<Toast>,
}

/// In-memory [`Notifier`] backing the toast stack and spinners.
///
/// The toast container is created on the first toast and reused for every
/// later one.
#[derive(Debug)]
pub struct ToastCenter {
    duration: Duration,
    container: Mutex<Option<ToastContainer>>,
    busy: Mutex<HashMap<BusyTarget, String>>,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ToastCenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            container: Mutex::new(None),
            busy: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_container(&self) -> bool {
        lock(&self.container).is_some()
    }

    /// Every toast shown so far, oldest first, expired ones included.
    pub fn history(&self) -> Vec<Toast> {
        lock(&self.container)
            .as_ref()
            .map(|container| container.toasts.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.history()
            .iter()
            .filter(|toast| toast.severity == severity)
            .count()
    }

    pub fn visible(&self, now: Instant) -> Vec<Toast> {
        self.history()
            .into_iter()
            .filter(|toast| !toast.is_expired(now))
            .collect()
    }

    pub fn busy_message(&self, target: BusyTarget) -> Option<String> {
        lock(&self.busy).get(&target).cloned()
    }

    pub fn render_html(&self, now: Instant) -> String {
        let mut html = String::from(
            r#"<div id="toast-container" class="fixed top-4 right-4 z-50 flex flex-col space-y-2">"#,
        );
        for toast in self.visible(now) {
            html.push_str(&format!(
                r#"<div class="flex items-center p-3 mb-2 rounded-lg shadow-lg border {}" data-severity="{}"><span>{}</span></div>"#,
                toast.severity.css_class(),
                toast.severity.label(),
                escape_html(&toast.message)
            ));
        }
        html.push_str("</div>");
        html
    }

    pub fn render_busy_html(&self, target: BusyTarget) -> Option<String> {
        self.busy_message(target).map(|message| {
            format!(
                r#"<div class="flex flex-col items-center justify-center p-6" data-busy="{}"><div class="spinner-border animate-spin" role="status"></div><p class="mt-2 text-gray-600">{}</p></div>"#,
                target.container_id(),
                escape_html(&message)
            )
        })
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error | Severity::Warning => {
                warn!(severity = severity.label(), "{message}")
            }
            Severity::Success | Severity::Info => {
                info!(severity = severity.label(), "{message}")
            }
        }

        let mut container = lock(&self.container);
        let container = container.get_or_insert_with(ToastContainer::default);
        if container.toasts.len() == TOAST_HISTORY_LIMIT {
            container.toasts.pop_front();
        }
        container.toasts.push_back(Toast {
            severity,
            message: message.to_string(),
            shown_at: Instant::now(),
            duration: self.duration,
        });
    }

    fn show_busy(&self, target: BusyTarget, message: &str) {
        lock(&self.busy).insert(target, message.to_string());
    }

    fn hide_busy(&self, target: BusyTarget) {
        lock(&self.busy).remove(&target);
    }
}
