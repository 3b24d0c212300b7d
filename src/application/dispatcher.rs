//! # Dispatcher
//!
//! Routes a decoded operation call to its handler and flattens the outcome into a
//! [`ToolResult`]. Argument presence and types are validated here, once, against the registry;
//! every failure a handler produces is converted to text at this boundary.

use std::sync::Arc;
use std::time::Instant;

use crate::application::args::Args;
use crate::application::handlers::{files, process, system, web};
use crate::application::registry::{JsonObject, OperationKind};
use crate::domain::config::{AppConfig, LimitsConfig, TimeoutConfig};
use crate::domain::error::ToolError;
use crate::domain::traits::HttpClient;
use crate::domain::types::ToolResult;
use crate::infrastructure::tools::discovery::Executables;
use crate::infrastructure::tools::executor::ProcessRunner;
use crate::infrastructure::tools::guard::PathGuard;

/// Read-only state shared by every handler.
pub struct ToolContext {
    pub guard: PathGuard,
    pub runner: ProcessRunner,
    pub executables: Executables,
    pub http: Arc<dyn HttpClient>,
    pub timeouts: TimeoutConfig,
    pub limits: LimitsConfig,
}

impl ToolContext {
    pub fn from_config(config: &AppConfig, http: Arc<dyn HttpClient>) -> anyhow::Result<Self> {
        let guard = PathGuard::new(&config.allowed_paths)?;
        if guard.roots().is_empty() {
            tracing::warn!("No allowed paths configured; every path operation will be rejected");
        }
        for root in guard.roots() {
            tracing::info!("Allowed root: {}", root.display());
        }

        Ok(Self {
            guard,
            runner: ProcessRunner::new(),
            executables: Executables::discover(&config.executables),
            http,
            timeouts: config.timeouts.clone(),
            limits: config.limits.clone(),
        })
    }
}

/// Cheap to clone; concurrent invocations share nothing mutable.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<ToolContext>,
}

impl Dispatcher {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub async fn invoke(&self, name: &str, args: &JsonObject) -> ToolResult {
        let started = Instant::now();
        let outcome = self.dispatch(name, args).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &outcome {
            Ok(text) => {
                tracing::info!("{} ok in {}ms ({} chars)", name, elapsed_ms, text.len())
            }
            Err(err) => tracing::info!("{} failed in {}ms: {}", name, elapsed_ms, err),
        }
        outcome.into()
    }

    async fn dispatch(&self, name: &str, args: &JsonObject) -> Result<String, ToolError> {
        let kind = OperationKind::from_name(name)
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))?;
        let spec = kind.spec();
        spec.validate(args)?;

        let ctx = self.ctx.as_ref();
        let args = Args::new(spec.name, args);
        match kind {
            OperationKind::ReadFile => files::read_file(ctx, &args).await,
            OperationKind::WriteFile => files::write_file(ctx, &args).await,
            OperationKind::AppendToFile => files::append_to_file(ctx, &args).await,
            OperationKind::DeleteFile => files::delete_file(ctx, &args).await,
            OperationKind::CopyFile => files::copy_file(ctx, &args).await,
            OperationKind::MoveFile => files::move_file(ctx, &args).await,
            OperationKind::FileExists => files::file_exists(ctx, &args).await,
            OperationKind::GetFileInfo => files::get_file_info(ctx, &args).await,
            OperationKind::ListDirectory => files::list_directory(ctx, &args).await,
            OperationKind::SearchFiles => files::search_files(ctx, &args).await,
            OperationKind::RunPowershell => process::run_shell(ctx, &args).await,
            OperationKind::RunGit => process::run_git(ctx, &args).await,
            OperationKind::FetchUrl => web::fetch_url(ctx, &args).await,
            OperationKind::HttpRequest => web::http_request(ctx, &args).await,
            OperationKind::GetTime => Ok(system::get_time()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::domain::traits::HttpError;
    use crate::domain::types::{HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Canned HTTP responses; records every request it sees.
    #[derive(Default)]
    pub struct FakeHttp {
        pub response: Mutex<Option<Result<HttpResponse, HttpError>>>,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeHttp {
        pub fn responding(status: u16, url: &str, body: &str) -> Self {
            let fake = Self::default();
            *fake.response.lock().unwrap() = Some(Ok(HttpResponse {
                status,
                final_url: url.to_string(),
                body: body.to_string(),
            }));
            fake
        }

        pub fn failing(err: HttpError) -> Self {
            let fake = Self::default();
            *fake.response.lock().unwrap() = Some(Err(err));
            fake
        }
    }

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests.lock().unwrap().push(request);
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(HttpError::Transport("no canned response".into())))
        }
    }

    pub struct Harness {
        pub _tmp: tempfile::TempDir,
        pub root: PathBuf,
        pub outside: PathBuf,
        pub dispatcher: Dispatcher,
        pub http: Arc<FakeHttp>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with(AppConfig::default(), FakeHttp::default())
        }

        pub fn with_http(http: FakeHttp) -> Self {
            Self::with(AppConfig::default(), http)
        }

        pub fn with(mut config: AppConfig, http: FakeHttp) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = std::fs::canonicalize(tmp.path()).unwrap().join("allowed");
            let outside = root.with_file_name("outside");
            std::fs::create_dir_all(&root).unwrap();
            std::fs::create_dir_all(&outside).unwrap();
            config.allowed_paths = vec![root.clone()];

            let http = Arc::new(http);
            let ctx = ToolContext::from_config(&config, http.clone()).unwrap();
            Self {
                _tmp: tmp,
                root,
                outside,
                dispatcher: Dispatcher::new(ctx),
                http,
            }
        }

        pub fn path(&self, rel: &str) -> String {
            self.root.join(rel).display().to_string()
        }

        pub fn outside_path(&self, rel: &str) -> String {
            self.outside.join(rel).display().to_string()
        }

        pub async fn call(&self, name: &str, args: serde_json::Value) -> ToolResult {
            let map = args.as_object().cloned().unwrap_or_default();
            self.dispatcher.invoke(name, &map).await
        }

        pub fn read(&self, path: impl AsRef<Path>) -> String {
            std::fs::read_to_string(path).unwrap()
        }
    }
}
