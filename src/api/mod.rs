//! Client for the document-registration API.

use std::sync::Arc;

use crate::config::{Config, DOCUMENT_CREATION_PATH, HEADER_CONTENT_TYPE, HEADER_SIGNATURE};
use crate::dispatch::{
    BoundedDispatcher, Codec, HttpTransport, JsonCodec, OutboundRequest, Transport,
};
use crate::document::{Document, DocumentResponse};
use crate::error_handling::{DispatchError, InitializationError};
use crate::initialization::{init_client, init_limiter};

/// Registration API client.
///
/// All calls made through one client (and its clones) share a single
/// dispatcher, so they are rate limited together.
pub struct CrptClient<T = HttpTransport, C = JsonCodec> {
    dispatcher: Arc<BoundedDispatcher<T, C>>,
    base_url: String,
}

impl<T, C> Clone for CrptClient<T, C> {
    fn clone(&self) -> Self {
        CrptClient {
            dispatcher: Arc::clone(&self.dispatcher),
            base_url: self.base_url.clone(),
        }
    }
}

impl CrptClient<HttpTransport, JsonCodec> {
    /// Builds the HTTP client, limiter and dispatcher described by `config`.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConfigError` if the configuration is
    /// invalid, and `InitializationError::HttpClientError` if the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        config.validate()?;
        let client = init_client(config)?;
        let limiter = init_limiter(config)?;
        let dispatcher = BoundedDispatcher::new(limiter, HttpTransport::new(client))
            .with_timeout(config.request_timeout());
        Ok(Self::new(Arc::new(dispatcher), &config.base_url))
    }
}

impl<T: Transport, C: Codec> CrptClient<T, C> {
    /// Creates a client sending through `dispatcher` to `base_url`.
    pub fn new(dispatcher: Arc<BoundedDispatcher<T, C>>, base_url: &str) -> Self {
        CrptClient {
            dispatcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<BoundedDispatcher<T, C>> {
        &self.dispatcher
    }

    /// Registers a document.
    ///
    /// Waits for a rate-limit permit, then POSTs the encoded document with its
    /// detached `signature`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidRequest` if the document cannot be
    /// encoded; every other failure comes from the dispatcher.
    pub async fn create_document(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<DocumentResponse, DispatchError> {
        let body = self
            .dispatcher
            .codec()
            .encode(document)
            .map_err(DispatchError::InvalidRequest)?;

        let request = OutboundRequest::post(self.endpoint(DOCUMENT_CREATION_PATH))
            .with_header(HEADER_CONTENT_TYPE, self.dispatcher.codec().content_type())
            .with_header(HEADER_SIGNATURE, signature)
            .with_body(body);

        self.dispatcher.submit(request).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
