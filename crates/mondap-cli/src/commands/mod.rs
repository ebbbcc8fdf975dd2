//! Command implementations.

pub mod answer;
pub mod image;
pub mod question;
pub mod ranking;
pub mod session;

use anyhow::Result;
use serde_json::Value;

use crate::output;

/// Parse a `--body` argument as JSON.
pub(crate) fn parse_body(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("Invalid JSON body: {e}"))
}

/// Print a payload, optionally pretty-printed.
pub(crate) fn print_payload(payload: &Value, pretty: bool) -> Result<()> {
    output::payload(payload, pretty)
}
