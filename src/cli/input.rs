//! Input loading for CLI commands

use crate::types::{AnalysisContext, AnalysisInput};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a JSON `AnalysisInput` from `path`, or from stdin for `None` / "-"
pub fn load_input(path: Option<&Path>) -> Result<AnalysisInput> {
    let raw = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read input file {}", p.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            buffer
        }
    };

    parse_input(&raw)
}

/// Parse a JSON `AnalysisInput`
pub fn parse_input(raw: &str) -> Result<AnalysisInput> {
    serde_json::from_str(raw).context(
        "Input must be a JSON object like {\"type\": \"numeric_series\", \"data\": [1, 2, 3]}",
    )
}

/// Parse an optional JSON context; absent means `null`
pub fn load_context(raw: Option<&str>) -> Result<AnalysisContext> {
    match raw {
        Some(text) => serde_json::from_str(text).context("Context must be valid JSON"),
        None => Ok(AnalysisContext::Null),
    }
}
