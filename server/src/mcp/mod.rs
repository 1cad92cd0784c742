//! MCP (Model Context Protocol) Server Module
//!
//! Exposes the pain-point matcher to AI clients such as Claude Desktop,
//! Cursor and Cline through a single `find_solutions` tool.
//!
//! ## Usage
//!
//! ```bash
//! painpoint mcp --catalog knowledge_base.json --embeddings kb.bin
//! ```
//!
//! The MCP server communicates via stdio using JSON-RPC 2.0.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::McpServer;
