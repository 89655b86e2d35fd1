//! MCP server that lists GitHub organization members and issues.
//!
//! Provides an `add` tool, `list_all_members_in_organization` and
//! `list_issues`, and optionally a static config resource and a
//! code-request prompt.

pub mod config;
pub mod error;
pub mod extras;
pub mod github;
pub mod server;
