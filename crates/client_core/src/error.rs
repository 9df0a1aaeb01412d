use std::fmt;

use thiserror::Error;

/// Remote operations the controller issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ProcessDocuments,
    SaveItems,
    MatchVendors,
    SearchVendors,
    GenerateEmail,
    SendEmail,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::ProcessDocuments => "process_documents",
            Operation::SaveItems => "save_items",
            Operation::MatchVendors => "match_vendors",
            Operation::SearchVendors => "search_vendors",
            Operation::GenerateEmail => "generate_email",
            Operation::SendEmail => "send_email",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ProcessDocuments => "Error processing documents",
            Operation::SaveItems => "Error saving items",
            Operation::MatchVendors => "Failed to match vendors",
            Operation::SearchVendors => "Failed to search vendors",
            Operation::GenerateEmail => "Failed to generate email",
            Operation::SendEmail => "Failed to send email",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}: {source}", .operation.failure_message())]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}{}", .operation.failure_message(), detail_suffix(.detail))]
    Status {
        operation: Operation,
        status: u16,
        detail: Option<String>,
    },
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ClientError {
    pub fn transport(operation: Operation, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::Transport { operation, .. } | ClientError::Status { operation, .. } => {
                Some(*operation)
            }
            ClientError::InvalidUrl { .. } | ClientError::ClientBuild(_) => None,
        }
    }
}
