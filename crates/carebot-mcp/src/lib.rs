//! # carebot-mcp
//!
//! MCP (Model Context Protocol) server exposing the DBOps clinic backend to
//! AI agents as callable tools and readable resources.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (tools/call, resources/read)
//!       ▼
//! ┌──────────────────────┐
//! │  CareBot MCP Server  │
//! │  1. Look capability  │  ← CapabilityRegistry, built once at startup
//! │     up by name/URI   │
//! │  2. Resolve names →  │  ← carebot-resolve (cache + resolvers)
//! │     backend ids      │
//! │  3. Call the backend │  ← carebot-dbops (reqwest, bearer auth)
//! │  4. Return text      │
//! └──────────┬───────────┘
//!            │ HTTP/JSON, bearer token
//!            ▼
//!      DBOps REST backend
//! ```
//!
//! Every handler returns human-readable text. Resolution failures and
//! backend errors are converted into descriptive messages before they reach
//! the agent: the contract is "always return text", never a raw error.

pub mod catalog;
pub mod context;
pub mod error;
pub mod handlers;
pub mod http_transport;
pub mod protocol;
pub mod registry;
pub mod server;

pub use catalog::build_registry;
pub use context::ToolContext;
pub use error::McpError;
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ResourceDefinition,
    ToolContent, ToolDefinition,
};
pub use registry::CapabilityRegistry;
pub use server::McpServer;
