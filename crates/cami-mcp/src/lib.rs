//! MCP Server for CAMI
//!
//! Exposes agent management over the Model Context Protocol so that an
//! assistant can list, deploy and maintain agents on the user's behalf.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (Claude Code) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ cami-mcp (MCP Server) ]
//!        | (Rust API)
//!        v
//! [ cami-core ]
//!        |
//!        +--> [ ~/cami-workspace/ (config, sources, central manifest) ]
//!        +--> [ <project>/.claude/ (agents, project manifest) ]
//! ```
//!
//! Tool failures are reported inside a successful JSON-RPC response with
//! `is_error` set, so the client can show the message to the model.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::CamiMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
