// ============================================================
// Layer 6 — Result Writer
// ============================================================
// Saves the generated answers in two forms:
//
//   inference_results.csv   — one row per prompt:
//       prompt,response
//       "Calculate: What is 15% of 240?","15% of 240 is 36."
//
//   inference_results.json  — array of records, 2-space indent:
//       [
//         {
//           "prompt": "...",
//           "response": "..."
//         }
//       ]
//
// Both files are overwritten on every run. CSV fields are
// quoted only when they contain a delimiter, a quote or a line
// break; quotes inside a field are doubled.
//
// Reference: RFC 4180 (CSV)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{error::HarnessError, generation_result::GenerationResult};

pub const CSV_FILE:  &str = "inference_results.csv";
pub const JSON_FILE: &str = "inference_results.json";

pub struct ResultWriter {
    csv_path:  PathBuf,
    json_path: PathBuf,
}

impl ResultWriter {
    pub fn new(csv_path: impl Into<PathBuf>, json_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path:  csv_path.into(),
            json_path: json_path.into(),
        }
    }

    /// Writer for the default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(CSV_FILE), dir.join(JSON_FILE))
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// Write both files, CSV first. Stops at the first failure.
    pub fn write(&self, results: &[GenerationResult]) -> Result<(), HarnessError> {
        write_file(&self.csv_path, render_csv(results).as_bytes())?;

        let json = serde_json::to_string_pretty(results)
            .map_err(|e| write_error(&self.json_path, e))?;
        write_file(&self.json_path, json.as_bytes())?;

        tracing::info!(
            "Saved {} results to '{}' and '{}'",
            results.len(),
            self.csv_path.display(),
            self.json_path.display()
        );
        Ok(())
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> HarnessError {
    HarnessError::WriteError {
        path:   path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Full overwrite; creates the parent directory if needed
fn write_file(path: &Path, bytes: &[u8]) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
    }
    let mut f = fs::File::create(path).map_err(|e| write_error(path, e))?;
    f.write_all(bytes).map_err(|e| write_error(path, e))?;
    tracing::debug!("Wrote {} bytes to '{}'", bytes.len(), path.display());
    Ok(())
}

fn render_csv(results: &[GenerationResult]) -> String {
    let mut out = String::from("prompt,response\n");
    for r in results {
        out.push_str(&csv_field(&r.prompt));
        out.push(',');
        out.push_str(&csv_field(&r.response));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
