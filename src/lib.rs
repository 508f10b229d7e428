//! Daily token usage and cost for Claude Code, read from its local JSONL logs.

pub mod config;
pub mod logging;
pub mod parsers;
pub mod services;
pub mod types;
