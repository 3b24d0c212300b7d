//! # Network Operations

use std::collections::BTreeMap;

use serde_json::Value;

use crate::application::args::Args;
use crate::application::dispatcher::ToolContext;
use crate::domain::error::ToolError;
use crate::domain::traits::HttpError;
use crate::domain::types::{HttpBody, HttpMethod, HttpRequest};
use crate::infrastructure::html::strip_html;
use crate::strings::messages;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Cuts `text` to at most `max` characters, appending the truncation marker if anything was cut.
fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(max) {
        text.truncate(cut);
        text.push_str(messages::TRUNCATION_MARKER);
    }
    text
}

fn network_error(err: HttpError, secs: u64, action: &'static str) -> ToolError {
    match err {
        HttpError::Timeout => ToolError::NetworkTimeout { secs },
        HttpError::Transport(message) => ToolError::Network { action, message },
    }
}

pub async fn fetch_url(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let url = args.str("url")?;
    let raw = args.bool_or("raw", false)?;

    let request = HttpRequest {
        method: HttpMethod::Get,
        url: url.to_string(),
        headers: BTreeMap::from([("User-Agent".to_string(), BROWSER_USER_AGENT.to_string())]),
        body: None,
        timeout: ctx.timeouts.fetch(),
    };
    let response = ctx
        .http
        .send(request)
        .await
        .map_err(|e| network_error(e, ctx.timeouts.fetch, "fetching URL"))?;

    let content = if raw {
        response.body
    } else {
        strip_html(&response.body)
    };
    let content = truncate_chars(content, ctx.limits.max_body_chars);
    Ok(messages::http_response(
        response.status,
        &response.final_url,
        &content,
    ))
}

fn headers(args: &Args<'_>) -> Result<BTreeMap<String, String>, ToolError> {
    let Some(map) = args.object("headers")? else {
        return Ok(BTreeMap::new());
    };
    map.iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name.clone(), s.clone())),
            _ => Err(ToolError::invalid(
                "headers",
                format!("value of '{name}' must be a string"),
            )),
        })
        .collect()
}

/// A non-empty `json_body` wins over a non-empty `body`.
fn body(args: &Args<'_>) -> Result<Option<HttpBody>, ToolError> {
    if let Some(json) = args.object("json_body")? {
        if !json.is_empty() {
            return Ok(Some(HttpBody::Json(Value::Object(json.clone()))));
        }
    }
    Ok(args
        .opt_str("body")?
        .filter(|text| !text.is_empty())
        .map(|text| HttpBody::Text(text.to_string())))
}

/// Pretty-prints bodies that parse as JSON; anything else passes through.
fn format_body(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(body),
        Err(_) => body,
    }
}

pub async fn http_request(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let raw_method = args.str("method")?;
    let method = HttpMethod::parse(raw_method).ok_or_else(|| {
        ToolError::invalid(
            "method",
            format!("unsupported method '{raw_method}' (use GET, POST, PUT, DELETE or PATCH)"),
        )
    })?;

    let request = HttpRequest {
        method,
        url: args.str("url")?.to_string(),
        headers: headers(args)?,
        body: body(args)?,
        timeout: ctx.timeouts.http(),
    };
    let response = ctx
        .http
        .send(request)
        .await
        .map_err(|e| network_error(e, ctx.timeouts.http, "making request"))?;

    let content = truncate_chars(format_body(response.body), ctx.limits.max_body_chars);
    Ok(messages::http_response(
        response.status,
        &response.final_url,
        &content,
    ))
}
