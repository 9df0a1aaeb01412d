//! HTTP access to the procurement backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Email, EmailId, Item, RfqId, Vendor, VendorId},
    error::ErrorDetail,
    protocol::{
        EmailResponse, ItemVendorMatches, MatchResponse, ProcessResponse, SaveAck, SearchResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{ClientError, Operation},
    search::SearchCriteria,
};

#[async_trait]
pub trait ProcurementApi: Send + Sync {
    async fn process_documents(&self, rfq_id: &RfqId) -> Result<Vec<Item>, ClientError>;
    /// Replaces the RFQ's whole item list.
    async fn save_items(&self, rfq_id: &RfqId, items: &[Item]) -> Result<SaveAck, ClientError>;
    async fn match_vendors(&self, rfq_id: &RfqId) -> Result<ItemVendorMatches, ClientError>;
    async fn search_vendors(&self, criteria: &SearchCriteria)
        -> Result<Vec<Vendor>, ClientError>;
    async fn generate_email(
        &self,
        rfq_id: &RfqId,
        vendor_id: &VendorId,
        serial: u32,
    ) -> Result<Email, ClientError>;
    async fn send_email(&self, email_id: &EmailId) -> Result<(), ClientError>;
}

pub struct HttpProcurementApi {
    http: Client,
    base_url: Url,
}

impl HttpProcurementApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_client(server_url, Client::new())
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::ClientBuild)?;
        Self::with_client(server_url, http)
    }

    pub fn with_client(server_url: &str, http: Client) -> Result<Self, ClientError> {
        let invalid = |source| ClientError::InvalidUrl {
            url: server_url.to_string(),
            source,
        };
        let base_url = Url::parse(server_url.trim()).map_err(invalid)?;
        if base_url.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::transport(operation, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation = operation.name(), status = status.as_u16(), "request rejected");
            return Err(ClientError::Status {
                operation,
                status: status.as_u16(),
                detail: ErrorDetail::parse(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::transport(operation, source))
    }
}

#[async_trait]
impl ProcurementApi for HttpProcurementApi {
    async fn process_documents(&self, rfq_id: &RfqId) -> Result<Vec<Item>, ClientError> {
        let url = self.endpoint(&["rfq", rfq_id.as_str(), "process"]);
        debug!(rfq_id = %rfq_id, %url, "processing documents");
        let body: ProcessResponse = self
            .execute(Operation::ProcessDocuments, self.http.post(url))
            .await?;
        Ok(body.items)
    }

    async fn save_items(&self, rfq_id: &RfqId, items: &[Item]) -> Result<SaveAck, ClientError> {
        let url = self.endpoint(&["rfq", rfq_id.as_str(), "items"]);
        debug!(rfq_id = %rfq_id, item_count = items.len(), "saving items");
        self.execute(Operation::SaveItems, self.http.put(url).json(items))
            .await
    }

    async fn match_vendors(&self, rfq_id: &RfqId) -> Result<ItemVendorMatches, ClientError> {
        let url = self.endpoint(&["vendors", "match", rfq_id.as_str()]);
        debug!(rfq_id = %rfq_id, "matching vendors");
        let body: MatchResponse = self
            .execute(Operation::MatchVendors, self.http.post(url))
            .await?;
        Ok(body.item_vendor_matches)
    }

    async fn search_vendors(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Vendor>, ClientError> {
        let mut url = self.endpoint(&["vendors", "search"]);
        let query = criteria.to_query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        debug!(%url, "searching vendors");
        let body: SearchResponse = self
            .execute(Operation::SearchVendors, self.http.get(url))
            .await?;
        Ok(body.vendors)
    }

    async fn generate_email(
        &self,
        rfq_id: &RfqId,
        vendor_id: &VendorId,
        serial: u32,
    ) -> Result<Email, ClientError> {
        let mut url = self.endpoint(&["emails", "generate", rfq_id.as_str(), vendor_id.as_str()]);
        url.query_pairs_mut()
            .append_pair("serial", &serial.to_string());
        debug!(rfq_id = %rfq_id, vendor_id = %vendor_id, serial, "generating email");
        let body: EmailResponse = self
            .execute(Operation::GenerateEmail, self.http.post(url))
            .await?;
        Ok(body.email)
    }

    async fn send_email(&self, email_id: &EmailId) -> Result<(), ClientError> {
        let url = self.endpoint(&["emails", "send", email_id.as_str()]);
        debug!(email_id = %email_id, "sending email");
        let _ack: serde_json::Value = self
            .execute(Operation::SendEmail, self.http.post(url))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
