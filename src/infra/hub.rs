// ============================================================
// Layer 6 — Model Hub Fetch
// ============================================================
// Resolves a hub model id (e.g. "Qwen/Qwen2.5-0.5B-Instruct")
// to files in the local hub cache, downloading what is missing.
// Returns the same ModelFiles a local directory would.
//
// The repo's file listing decides which optional files exist.
// A failed download of a listed file is an error, never a
// silent "file absent".

use anyhow::{bail, Context, Result};
use hf_hub::api::sync::{Api, ApiRepo};
use std::{collections::HashSet, path::PathBuf};

use crate::infra::checkpoint::{
    shard_names, ModelFiles, CONFIG_FILE, GENERATION_CONFIG_FILE, SINGLE_WEIGHTS_FILE,
    TOKENIZER_CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_INDEX_FILE,
};

/// How a repo stores its weights
#[derive(Debug, PartialEq, Eq)]
enum WeightLayout {
    Single,
    Sharded,
}

fn weight_layout(listing: &HashSet<String>, repo_id: &str) -> Result<WeightLayout> {
    if listing.contains(SINGLE_WEIGHTS_FILE) {
        Ok(WeightLayout::Single)
    } else if listing.contains(WEIGHTS_INDEX_FILE) {
        Ok(WeightLayout::Sharded)
    } else {
        bail!("'{repo_id}' has neither {SINGLE_WEIGHTS_FILE} nor {WEIGHTS_INDEX_FILE}")
    }
}

fn fetch(repo: &ApiRepo, repo_id: &str, name: &str) -> Result<PathBuf> {
    repo.get(name)
        .with_context(|| format!("Cannot fetch '{name}' for '{repo_id}'"))
}

/// `None` only when the repo does not list the file
fn fetch_optional(
    repo:    &ApiRepo,
    listing: &HashSet<String>,
    repo_id: &str,
    name:    &str,
) -> Result<Option<PathBuf>> {
    if !listing.contains(name) {
        tracing::debug!("'{}' has no {}", repo_id, name);
        return Ok(None);
    }
    fetch(repo, repo_id, name).map(Some)
}

pub fn fetch_model_files(repo_id: &str) -> Result<ModelFiles> {
    tracing::info!("Fetching '{}' from the model hub", repo_id);

    let api  = Api::new().context("Cannot initialise the model hub client")?;
    let repo = api.model(repo_id.to_string());

    let listing: HashSet<String> = repo
        .info()
        .with_context(|| format!("Cannot list files of '{repo_id}'"))?
        .siblings
        .into_iter()
        .map(|s| s.rfilename)
        .collect();

    let config    = fetch(&repo, repo_id, CONFIG_FILE)?;
    let tokenizer = fetch(&repo, repo_id, TOKENIZER_FILE)?;

    let tokenizer_config  = fetch_optional(&repo, &listing, repo_id, TOKENIZER_CONFIG_FILE)?;
    let generation_config = fetch_optional(&repo, &listing, repo_id, GENERATION_CONFIG_FILE)?;

    let weights = match weight_layout(&listing, repo_id)? {
        WeightLayout::Single => vec![fetch(&repo, repo_id, SINGLE_WEIGHTS_FILE)?],
        WeightLayout::Sharded => {
            let index = fetch(&repo, repo_id, WEIGHTS_INDEX_FILE)?;
            shard_names(&index)?
                .iter()
                .map(|name| fetch(&repo, repo_id, name))
                .collect::<Result<Vec<_>>>()?
        }
    };

    tracing::debug!("Hub files for '{}': {} weight file(s)", repo_id, weights.len());

    Ok(ModelFiles {
        config,
        tokenizer,
        tokenizer_config,
        generation_config,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_hub::api::sync::ApiBuilder;

    fn listing(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_weight_layout_prefers_single_file() {
        let l = listing(&[CONFIG_FILE, SINGLE_WEIGHTS_FILE, WEIGHTS_INDEX_FILE]);
        assert_eq!(weight_layout(&l, "org/m").unwrap(), WeightLayout::Single);

        let l = listing(&[CONFIG_FILE, WEIGHTS_INDEX_FILE, "model-00001-of-00002.safetensors"]);
        assert_eq!(weight_layout(&l, "org/m").unwrap(), WeightLayout::Sharded);

        assert!(weight_layout(&listing(&[CONFIG_FILE]), "org/m").is_err());
    }

    #[test]
    fn test_unlisted_optional_file_is_absent_without_request() {
        let cache = tempfile::tempdir().unwrap();
        let api = ApiBuilder::new()
            .with_cache_dir(cache.path().to_path_buf())
            .with_progress(false)
            .build()
            .unwrap();
        let repo = api.model("org/m".to_string());

        let found = fetch_optional(&repo, &listing(&[CONFIG_FILE]), "org/m", GENERATION_CONFIG_FILE)
            .unwrap();
        assert_eq!(found, None);
    }
}
