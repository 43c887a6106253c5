use answer_core::{OperationId, PollResult};
use answer_logging::{answer_debug, answer_trace};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::wire::{decode_detail, decode_poll, decode_start, StartRequest};
use crate::{ClientSettings, Endpoint, TransportError};

/// Request/response contract with the answer server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Starts answering `query` against `page_id` and returns the new operation id.
    async fn start_operation(
        &self,
        query: &str,
        page_id: &str,
    ) -> Result<OperationId, TransportError>;

    /// Fetches the current root state and full update log of an operation.
    async fn poll_operation(&self, operation_id: &OperationId)
        -> Result<PollResult, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    chat_url: Url,
}

impl HttpTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        // `join` replaces the last path segment unless the base ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let chat_url = base
            .join("chat")
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(Self { client, chat_url })
    }

    async fn read_body(
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<Vec<u8>, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            answer_debug!("{} request failed with {}", endpoint, status);
            return Err(TransportError::status(
                endpoint,
                status.as_u16(),
                decode_detail(&body),
            ));
        }
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn start_operation(
        &self,
        query: &str,
        page_id: &str,
    ) -> Result<OperationId, TransportError> {
        let body = serde_json::to_vec(&StartRequest { query, page_id })
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        let response = self
            .client
            .post(self.chat_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(Endpoint::Start, response).await?;
        decode_start(&body)
    }

    async fn poll_operation(
        &self,
        operation_id: &OperationId,
    ) -> Result<PollResult, TransportError> {
        let mut url = self.chat_url.clone();
        url.query_pairs_mut()
            .append_pair("request_id", operation_id.as_str());
        answer_trace!("polling {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(Endpoint::Poll, response).await?;
        decode_poll(&body)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout(err.to_string());
    }
    TransportError::Network(err.to_string())
}
