//! # Domain Types
//!
//! Common data structures passed between the dispatcher, the process runner and the HTTP client.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::ToolError;

/// The single normalized outcome of any operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => Self::success(text),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

/// A supervised process invocation. stdin is never part of the request: it is always closed.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
    /// Label used in timeout messages ("Command", "Git command").
    pub label: &'static str,
}

impl RunRequest {
    pub fn new(program: impl Into<PathBuf>, label: &'static str, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout,
            label,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// Outcome of a process that exited on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    /// Trimmed stdout, then trimmed stderr under a separator line.
    /// Never empty: silent runs get an explicit marker.
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();

        let mut output = String::from(stdout);
        if !stderr.is_empty() {
            if !output.is_empty() {
                output.push_str("\n--- STDERR ---\n");
            }
            output.push_str(stderr);
        }

        if output.is_empty() {
            output = match self.exit_code {
                Some(0) => "(Command executed successfully with no output)".to_string(),
                _ => format!(
                    "(Command failed with exit code {} but no output)",
                    self.exit_code_label()
                ),
            };
        }
        output
    }

    pub fn exit_code_label(&self) -> String {
        match self.exit_code {
            Some(code) => code.to_string(),
            None => "none (terminated by signal)".to_string(),
        }
    }

    /// `"Exit code: <code>\n\n<combined output>"`
    pub fn render(&self) -> String {
        format!("Exit code: {}\n\n{}", self.exit_code_label(), self.combined_output())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Case-insensitive parse of one of the supported verbs.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Text(String),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<HttpBody>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// URL after following redirects.
    pub final_url: String,
    pub body: String,
}
