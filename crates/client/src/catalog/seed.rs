//! Local seed source for the catalog map.
//!
//! Two JSON shapes are accepted: a list of `{"code": .., "id": ..}` records
//! or a flat `{"CODE": id}` mapping.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// Errors reading or parsing a seed file. Never fatal for the caller:
/// seeding is a best-effort step that gets logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Records(Vec<SeedRecord>),
    Map(HashMap<String, u64>),
}

#[derive(Debug, Deserialize)]
struct SeedRecord {
    #[serde(alias = "sku")]
    code: String,
    id: u64,
}

/// Read seed entries as `(code, id)` pairs.
pub(crate) fn read_seed(path: &Path) -> Result<Vec<(String, u64)>, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    let file: SeedFile = serde_json::from_str(&raw)?;
    Ok(match file {
        SeedFile::Records(records) => records.into_iter().map(|r| (r.code, r.id)).collect(),
        SeedFile::Map(map) => map.into_iter().collect(),
    })
}
