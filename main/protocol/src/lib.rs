//! Wire types spoken between MCP clients and the Scythe server.
//!
//! The Model Context Protocol is JSON-RPC 2.0 with a small set of well-known methods. This crate
//! contains no I/O. It only knows how messages look.

mod jsonrpc;
pub use jsonrpc::*;

mod mcp;
pub use mcp::*;

mod schema;
pub use schema::*;
