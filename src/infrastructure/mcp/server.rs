//! # MCP Server
//!
//! Implements `rmcp`'s [`ServerHandler`] on top of the [`Dispatcher`].
//! Tool listings come straight from the operation registry; a failed operation is reported as a
//! tool result with `isError` set, never as a protocol error.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};

use crate::application::dispatcher::Dispatcher;
use crate::application::registry::{JsonObject, OperationKind};
use crate::domain::types::ToolResult;

pub const SERVER_NAME: &str = "hermes-mcp";

const INSTRUCTIONS: &str = "Local file, process and network tools. \
    File paths must be absolute and lie inside the configured allowed directories.";

#[derive(Clone)]
pub struct HermesServer {
    dispatcher: Dispatcher,
}

impl HermesServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Every registered operation as an MCP tool, in catalog order.
pub fn tool_list() -> Vec<Tool> {
    OperationKind::ALL
        .iter()
        .map(|kind| {
            let spec = kind.spec();
            Tool::new(spec.name, spec.description, Arc::new(spec.input_schema()))
        })
        .collect()
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    let content = vec![Content::text(result.text)];
    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for HermesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tool_list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments: JsonObject = request.arguments.unwrap_or_default();
        tracing::debug!("call_tool {} {:?}", request.name, arguments.keys().collect::<Vec<_>>());

        let result = self.dispatcher.invoke(&request.name, &arguments).await;
        Ok(to_call_result(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::test_support::Harness;

    #[test]
    fn test_tool_list_matches_catalog() {
        let tools = tool_list();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names.len(), 15);
        assert_eq!(names[0], "read_file");
        assert!(names.contains(&"run_powershell"));
        assert!(names.contains(&"get_time"));

        let http = tools.iter().find(|t| t.name == "http_request").unwrap();
        let required = http.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
        assert_eq!(http.input_schema["properties"]["method"]["enum"][1], "POST");
    }

    #[test]
    fn test_server_info() {
        let server = HermesServer::new(Harness::new().dispatcher);
        let info = server.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_error_results_set_flag() {
        let failed = to_call_result(ToolResult::failure("Error: boom"));
        assert_eq!(failed.is_error, Some(true));

        let ok = to_call_result(ToolResult::success("done"));
        assert_eq!(ok.is_error, Some(false));
    }
}
