// ============================================================
// Layer 3 — Checkpoint Reference
// ============================================================
// A checkpoint is named by a string that is either
//   - a local directory  ("/data/run1/actor/huggingface"), or
//   - a hub model id     ("Qwen/Qwen2.5-0.5B-Instruct").
//
// The two cases are told apart only when files are actually
// fetched (infra::checkpoint::ModelFiles), mirroring how a
// `from_pretrained` call treats its argument.

use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the subdirectory a converted training checkpoint
/// keeps its loadable model in
pub const CONVERTED_SUBDIR: &str = "huggingface";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRef(String);

impl CheckpointRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True when the reference names something on the local filesystem
    pub fn exists_locally(&self) -> bool {
        self.as_path().exists()
    }

    /// `<reference>/huggingface`
    pub fn converted_dir(&self) -> PathBuf {
        self.as_path().join(CONVERTED_SUBDIR)
    }
}

impl fmt::Display for CheckpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckpointRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for CheckpointRef {
    fn from(p: PathBuf) -> Self {
        Self::new(p.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_dir_appends_subdir() {
        let r = CheckpointRef::new("/ckpt/step_10/actor");
        assert_eq!(r.converted_dir(), PathBuf::from("/ckpt/step_10/actor/huggingface"));
    }

    #[test]
    fn test_hub_id_does_not_exist_locally() {
        let r = CheckpointRef::new("SomeOrg/definitely-not-a-local-dir-9f3a");
        assert!(!r.exists_locally());
    }
}
