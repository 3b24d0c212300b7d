//! # HTTP Client
//!
//! `reqwest`-backed implementation of [`HttpClient`].
//! Redirects are followed (reqwest's default policy) and the per-request timeout covers the
//! whole exchange, body included.

use async_trait::async_trait;
use reqwest::Method;

use crate::domain::traits::{HttpClient, HttpError};
use crate::domain::types::{HttpBody, HttpMethod, HttpRequest, HttpResponse};

pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Transport(err.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        tracing::debug!("HTTP {} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(to_method(request.method), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(HttpBody::Json(value)) => builder.json(&value),
            Some(HttpBody::Text(text)) => builder.body(text),
            None => builder,
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(classify)?;

        tracing::debug!("HTTP {} -> {} ({} bytes)", final_url, status, body.len());
        Ok(HttpResponse {
            status,
            final_url,
            body,
        })
    }
}
