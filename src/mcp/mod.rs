//! MCP server for smart-notes
//!
//! Exposes note CRUD, tag counts and hybrid search as MCP tools over stdio.

mod server;

pub use server::run_mcp_server;
