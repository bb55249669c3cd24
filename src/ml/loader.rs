// ============================================================
// Layer 5 — Model Loader
// ============================================================
// A training run saves its actor checkpoint in one of two
// layouts:
//
//   <ckpt>/                 ← already a self-contained model dir
//   <ckpt>/huggingface/     ← converted copy inside the checkpoint
//
// The loader tries them in that order and returns the first
// model that loads. The converted layout is only tried when the
// subdirectory actually exists.
//
// The load function itself is a parameter: the pipeline passes
// CandleModel::load, tests pass a closure that records calls.

use anyhow::Result;

use crate::domain::{checkpoint::CheckpointRef, error::HarnessError};

/// One way of turning the configured reference into a candidate
/// location; `None` means the layout is not present
struct Strategy {
    name:      &'static str,
    candidate: fn(&CheckpointRef) -> Option<CheckpointRef>,
}

fn direct(reference: &CheckpointRef) -> Option<CheckpointRef> {
    Some(reference.clone())
}

fn converted(reference: &CheckpointRef) -> Option<CheckpointRef> {
    let dir = reference.converted_dir();
    dir.is_dir().then(|| CheckpointRef::from(dir))
}

const STRATEGIES: &[Strategy] = &[
    Strategy { name: "HuggingFace format",           candidate: direct },
    Strategy { name: "converted HuggingFace format", candidate: converted },
];

/// Load a tokenizer + model pair from `reference`.
///
/// Fails with `UnloadableCheckpoint` when no layout loads.
pub fn load_model<M, F>(reference: &CheckpointRef, mut load: F) -> Result<M, HarnessError>
where
    F: FnMut(&CheckpointRef) -> Result<M>,
{
    tracing::info!("Loading model from {}", reference);

    for strategy in STRATEGIES {
        let Some(candidate) = (strategy.candidate)(reference) else {
            tracing::debug!("No {} layout under '{}'", strategy.name, reference);
            continue;
        };

        match load(&candidate) {
            Ok(model) => {
                tracing::info!("Successfully loaded {} model from '{}'", strategy.name, candidate);
                return Ok(model);
            }
            Err(e) => {
                tracing::warn!("Failed to load as {} model: {:#}", strategy.name, e);
            }
        }
    }

    Err(HarnessError::UnloadableCheckpoint { path: reference.to_string() })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkpoint::CONVERTED_SUBDIR;
    use std::fs;
    use tempfile::tempdir;

    /// Loader that succeeds only for the listed references and
    /// records every attempt
    fn recording_loader<'a>(
        ok_for:   &'a [String],
        attempts: &'a mut Vec<String>,
    ) -> impl FnMut(&CheckpointRef) -> Result<String> + 'a {
        move |r: &CheckpointRef| {
            attempts.push(r.to_string());
            if ok_for.contains(&r.to_string()) {
                Ok(format!("model@{r}"))
            } else {
                anyhow::bail!("no model at {r}")
            }
        }
    }

    #[test]
    fn test_direct_success_never_checks_converted() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join(CONVERTED_SUBDIR)).unwrap();
        let r = CheckpointRef::from(tmp.path().to_path_buf());

        let mut attempts = Vec::new();
        let ok = vec![r.to_string()];
        let model = load_model(&r, recording_loader(&ok, &mut attempts)).unwrap();

        assert_eq!(model, format!("model@{r}"));
        assert_eq!(attempts, vec![r.to_string()]);
    }

    #[test]
    fn test_falls_back_to_converted_subdir() {
        let tmp = tempdir().unwrap();
        let hf = tmp.path().join(CONVERTED_SUBDIR);
        fs::create_dir(&hf).unwrap();
        let r = CheckpointRef::from(tmp.path().to_path_buf());
        let hf_ref = CheckpointRef::from(hf);

        let mut attempts = Vec::new();
        let ok = vec![hf_ref.to_string()];
        let model = load_model(&r, recording_loader(&ok, &mut attempts)).unwrap();

        assert_eq!(model, format!("model@{hf_ref}"));
        assert_eq!(attempts, vec![r.to_string(), hf_ref.to_string()]);
    }

    #[test]
    fn test_missing_subdir_fails_after_one_attempt() {
        let tmp = tempdir().unwrap();
        let r = CheckpointRef::from(tmp.path().to_path_buf());

        let mut attempts = Vec::new();
        let err = load_model(&r, recording_loader(&[], &mut attempts)).unwrap_err();

        assert!(matches!(err, HarnessError::UnloadableCheckpoint { ref path } if *path == r.to_string()));
        assert_eq!(attempts.len(), 1);
    }

    #[test]
    fn test_subdir_that_is_a_file_is_not_tried() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join(CONVERTED_SUBDIR), "not a directory").unwrap();
        let r = CheckpointRef::from(tmp.path().to_path_buf());

        let mut attempts = Vec::new();
        assert!(load_model(&r, recording_loader(&[], &mut attempts)).is_err());
        assert_eq!(attempts, vec![r.to_string()]);
    }

    #[test]
    fn test_both_layouts_failing_is_unloadable() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join(CONVERTED_SUBDIR)).unwrap();
        let r = CheckpointRef::from(tmp.path().to_path_buf());

        let mut attempts = Vec::new();
        let err = load_model(&r, recording_loader(&[], &mut attempts)).unwrap_err();

        assert!(matches!(err, HarnessError::UnloadableCheckpoint { .. }));
        assert_eq!(attempts.len(), 2);
    }
}
