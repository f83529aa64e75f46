//! Subcommand implementations. Each returns the text to print on stdout.

use crate::cli::OutputFormat;
use crate::output;
use anyhow::{bail, Context, Result};
use canopy_query::{page_from_json, EngineConfig, InMemoryResolver, QueryEngine, RawNode};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Build an engine from a describe file and an optional config file
pub fn load_engine(describe: &Path, config: Option<&Path>) -> Result<QueryEngine<InMemoryResolver>> {
    let text = std::fs::read_to_string(describe)
        .with_context(|| format!("Failed to read describe file {}", describe.display()))?;
    let resolver = InMemoryResolver::from_json(&text)
        .with_context(|| format!("Invalid describe file {}", describe.display()))?;
    debug!(entities = resolver.len(), "Loaded describes");

    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(QueryEngine::with_config(resolver, config))
}

/// Split a response file into pages of raw records.
///
/// Accepts a single query-result page, an array of pages, or a bare array
/// of records (one page).
pub fn load_pages(response: &Path, entity: &str) -> Result<Vec<Vec<RawNode>>> {
    let text = std::fs::read_to_string(response)
        .with_context(|| format!("Failed to read response file {}", response.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", response.display()))?;

    let is_page = |v: &Value| v.get("records").is_some_and(Value::is_array);
    let pages = match &value {
        Value::Array(items) if !items.is_empty() && items.iter().all(is_page) => items
            .iter()
            .map(|page| page_from_json(entity, page))
            .collect::<Result<Vec<_>, _>>()?,
        Value::Array(_) | Value::Object(_) => vec![page_from_json(entity, &value)?],
        _ => bail!("Response must be a JSON object or array"),
    };
    Ok(pages)
}

pub fn translate(
    describe: &Path,
    config: Option<&Path>,
    sql: &str,
    format: OutputFormat,
) -> Result<String> {
    let engine = load_engine(describe, config)?;
    let compiled = engine.compile(sql)?;
    Ok(output::translation(&compiled, format))
}

pub fn reshape(
    describe: &Path,
    response: &Path,
    config: Option<&Path>,
    sql: &str,
    format: OutputFormat,
) -> Result<String> {
    let engine = load_engine(describe, config)?;
    let compiled = engine.compile(sql)?;
    let pages = load_pages(response, &compiled.root_entity)?;
    let rows = engine.reshape_pages(&compiled, &pages)?;

    info!(pages = pages.len(), rows = rows.len(), "Reshaped response");
    Ok(output::rows(&compiled, &rows, format))
}
