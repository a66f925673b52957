use std::{fs, path::Path};

use anyhow::Context;
use srk_schema::{Ranklist, SolutionTetrad};

pub fn load_ranklist_json_from_path(path: impl AsRef<Path>) -> anyhow::Result<Ranklist> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read ranklist: {}", path.display()))?;
    let ranklist: Ranklist = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse ranklist json: {}", path.display()))?;
    Ok(ranklist)
}

pub fn load_ranklist_json_from_str(json: &str) -> anyhow::Result<Ranklist> {
    let ranklist: Ranklist = serde_json::from_str(json).context("failed to parse ranklist json")?;
    Ok(ranklist)
}

/// A pre-sorted solution log stored as a JSON array of tetrads.
pub fn load_solutions_json_from_path(path: impl AsRef<Path>) -> anyhow::Result<Vec<SolutionTetrad>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read solutions: {}", path.display()))?;
    let solutions: Vec<SolutionTetrad> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse solutions json: {}", path.display()))?;
    Ok(solutions)
}
