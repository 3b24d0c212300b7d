//! # Domain Traits
//!
//! Abstract interfaces for the external collaborators the dispatcher talks to.
//! Allows for pluggable implementations in the Infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{HttpRequest, HttpResponse};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Transport(String),
}

/// Abstract interface for an outbound HTTP client.
/// Implementations follow redirects and honour `request.timeout`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
