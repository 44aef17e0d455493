//! MCP Server implementation
//!
//! Reads JSON-RPC requests line by line from stdin and writes one response
//! line per request to stdout.

use std::io::{BufRead, Write};

use cami_core::Workspace;
use serde_json::{Value, json};

use crate::handlers::handle_tool_call;
use crate::protocol::{InitializeResult, JsonRpcRequest, JsonRpcResponse, ToolCallParams, codes};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP Server for CAMI
///
/// # Example
///
/// ```ignore
/// use cami_core::Workspace;
/// use cami_mcp::CamiMcpServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = CamiMcpServer::new(Workspace::resolve(None)?);
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct CamiMcpServer {
    /// Workspace holding the config, sources and central manifest
    workspace: Workspace,

    /// Whether the server has been initialized
    initialized: bool,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,
}

impl CamiMcpServer {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            initialized: false,
            tools: Vec::new(),
        }
    }

    /// Load tool definitions. Called by [`CamiMcpServer::run`].
    pub async fn initialize(&mut self) -> Result<()> {
        tracing::info!(workspace = %self.workspace.root().display(), "Initializing MCP server");
        self.tools = get_tool_definitions();
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Serve requests over stdin/stdout until stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            match self.handle_message(&line).await {
                Ok(response) if !response.is_empty() => {
                    writeln!(stdout, "{}", response)?;
                    stdout.flush()?;
                }
                Ok(_) => {}
                Err(Error::Json(e)) => {
                    let error_response =
                        JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e));
                    writeln!(stdout, "{}", serde_json::to_string(&error_response)?)?;
                    stdout.flush()?;
                }
                Err(e) => {
                    let error_response = JsonRpcResponse::error(
                        None,
                        codes::INTERNAL_ERROR,
                        format!("Internal error: {}", e),
                    );
                    writeln!(stdout, "{}", serde_json::to_string(&error_response)?)?;
                    stdout.flush()?;
                }
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message.
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = serde_json::from_str(message)?;

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "tools/list" => self.handle_tools_list(request.id)?,
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult::new("cami", env!("CARGO_PKG_VERSION"));

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let tools = if self.tools.is_empty() {
            get_tool_definitions()
        } else {
            self.tools.clone()
        };

        let tools_value: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        Ok(JsonRpcResponse::success(id, json!({ "tools": tools_value })))
    }

    async fn handle_tools_call(
        &self,
        id: Option<Value>,
        params: Value,
    ) -> Result<JsonRpcResponse> {
        if params.is_null() {
            return Ok(JsonRpcResponse::error(id, codes::INVALID_PARAMS, "Missing params"));
        }

        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        tracing::info!(tool = %call.name, "Tool call");

        let result = match handle_tool_call(&self.workspace, &call.name, call.arguments).await {
            Ok(value) => ToolResult::text(serde_json::to_string_pretty(&value)?),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult::error(e.to_string())
            }
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }
}
