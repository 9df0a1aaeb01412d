use shared::domain::{Email, EmailId};

use crate::html::escape_html;

/// Read-only preview of a generated email. One instance per controller,
/// refreshed on every generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPreview {
    email: Email,
    open: bool,
}

impl EmailPreview {
    pub fn new(email: Email) -> Self {
        Self { email, open: true }
    }

    pub fn show(&mut self, email: Email) {
        self.email = email;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// The id the "send" action submits, available only while open.
    pub fn pending_send(&self) -> Option<&EmailId> {
        self.open.then_some(&self.email.id)
    }

    pub fn to_html(&self) -> String {
        if !self.open {
            return String::new();
        }
        format!(
            concat!(
                r#"<div id="email-preview-modal" class="fixed inset-0 flex items-center justify-center z-50">"#,
                r#"<div class="bg-white rounded-lg overflow-hidden shadow-xl"><h3 class="text-lg font-medium">Email Preview</h3>"#,
                r#"<div id="email-subject" class="border border-gray-300 rounded-md p-2 bg-gray-50">{subject}</div>"#,
                r#"<div id="email-body" class="border border-gray-300 rounded-md p-3 bg-gray-50 whitespace-pre-line">{body}</div>"#,
                r#"<button type="button" id="discard-email">Discard</button>"#,
                r#"<button type="button" id="send-email" data-email-id="{id}">Send Email</button>"#,
                "</div></div>"
            ),
            subject = escape_html(&self.email.subject),
            body = escape_html(&self.email.body),
            id = escape_html(self.email.id.as_str()),
        )
    }
}
