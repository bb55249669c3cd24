// ============================================================
// Layer 6 — Checkpoint Resolution and File Layout
// ============================================================
// Two jobs:
//
//   1. resolve_checkpoint() — decide which reference to load.
//      If the configured path does not exist, fall back to a
//      public baseline model id from the hub.
//
//   2. ModelFiles — find the files of one checkpoint layout:
//
//        <dir>/
//          config.json              ← architecture + model_type (required)
//          tokenizer.json           ← vocabulary (required)
//          tokenizer_config.json    ← chat template, eos token (optional)
//          generation_config.json   ← eos id (optional)
//          model.safetensors        ← weights, or
//          model.safetensors.index.json + shards, or
//          any *.safetensors files
//
//      A reference that is not a local path is fetched through
//      the hub cache instead (infra::hub).
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use crate::domain::checkpoint::CheckpointRef;
use crate::infra::hub;

pub const CONFIG_FILE:            &str = "config.json";
pub const TOKENIZER_FILE:         &str = "tokenizer.json";
pub const TOKENIZER_CONFIG_FILE:  &str = "tokenizer_config.json";
pub const GENERATION_CONFIG_FILE: &str = "generation_config.json";
pub const SINGLE_WEIGHTS_FILE:    &str = "model.safetensors";
pub const WEIGHTS_INDEX_FILE:     &str = "model.safetensors.index.json";

// ─── Checkpoint Resolver ──────────────────────────────────────────────────────

/// Pick the checkpoint reference to load.
///
/// Never fails: a missing path is only reported, and whether the
/// returned reference is actually loadable is decided later by
/// the model loader.
pub fn resolve_checkpoint(path: &str, baseline: &str) -> CheckpointRef {
    let candidate = CheckpointRef::new(path);
    if candidate.exists_locally() {
        tracing::info!("Using checkpoint '{}'", candidate);
        candidate
    } else {
        tracing::warn!(
            "Checkpoint '{}' not found, using base model '{}'",
            candidate,
            baseline
        );
        CheckpointRef::new(baseline)
    }
}

// ─── ModelFiles ───────────────────────────────────────────────────────────────

/// Paths of everything needed to build a tokenizer and model
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config:            PathBuf,
    pub tokenizer:         PathBuf,
    pub tokenizer_config:  Option<PathBuf>,
    pub generation_config: Option<PathBuf>,
    /// Safetensors files, in load order
    pub weights:           Vec<PathBuf>,
}

impl ModelFiles {
    /// Locate files for a reference: local directory first,
    /// otherwise treat the reference as a hub model id.
    pub fn locate(reference: &CheckpointRef) -> Result<Self> {
        if reference.exists_locally() {
            Self::from_dir(reference.as_path())
        } else {
            hub::fetch_model_files(reference.as_str())
        }
    }

    /// Collect the files of a self-contained model directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("'{}' is not a directory", dir.display());
        }

        let config = required(dir, CONFIG_FILE)?;
        let tokenizer = required(dir, TOKENIZER_FILE)?;
        let weights = local_weights(dir)?;

        tracing::debug!(
            "Found {} weight file(s) in '{}'",
            weights.len(),
            dir.display()
        );

        Ok(Self {
            config,
            tokenizer,
            tokenizer_config:  optional(dir, TOKENIZER_CONFIG_FILE),
            generation_config: optional(dir, GENERATION_CONFIG_FILE),
            weights,
        })
    }

    /// Parse config.json into a generic JSON value.
    /// The architecture is chosen from its `model_type` field.
    pub fn read_config(&self) -> Result<serde_json::Value> {
        read_json(&self.config)
    }

    /// eos id from generation_config.json, falling back to config.json
    pub fn configured_eos_token_id(&self) -> Result<Option<u32>> {
        if let Some(path) = &self.generation_config {
            if let Some(id) = eos_from_value(&read_json(path)?) {
                return Ok(Some(id));
            }
        }
        Ok(eos_from_value(&self.read_config()?))
    }
}

fn required(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if !path.is_file() {
        bail!("'{}' is missing {}", dir.display(), name);
    }
    Ok(path)
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))
}

/// `eos_token_id` may be a single id or a list; the first wins
fn eos_from_value(value: &serde_json::Value) -> Option<u32> {
    let id = match value.get("eos_token_id")? {
        serde_json::Value::Array(ids) => ids.first()?.as_u64()?,
        other => other.as_u64()?,
    };
    u32::try_from(id).ok()
}

fn local_weights(dir: &Path) -> Result<Vec<PathBuf>> {
    let single = dir.join(SINGLE_WEIGHTS_FILE);
    if single.is_file() {
        return Ok(vec![single]);
    }

    let index = dir.join(WEIGHTS_INDEX_FILE);
    if index.is_file() {
        return shard_names(&index)?
            .into_iter()
            .map(|name| required(dir, &name))
            .collect();
    }

    // Sort for deterministic loading order
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("safetensors"))
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("No .safetensors files found in '{}'", dir.display());
    }
    Ok(files)
}

#[derive(Deserialize)]
struct WeightIndex {
    weight_map: HashMap<String, String>,
}

/// Unique shard file names listed in a safetensors index, sorted
pub fn shard_names(index_path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(index_path)
        .with_context(|| format!("Cannot read '{}'", index_path.display()))?;
    let index: WeightIndex = serde_json::from_str(&text)
        .with_context(|| format!("Invalid weight index '{}'", index_path.display()))?;

    let shards: BTreeSet<String> = index.weight_map.into_values().collect();
    Ok(shards.into_iter().collect())
}
