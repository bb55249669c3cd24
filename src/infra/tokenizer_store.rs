// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the two tokenizer files of a checkpoint:
//
//   tokenizer.json         → tokenizers::Tokenizer
//   tokenizer_config.json  → chat template + special token names
//
// tokenizer_config.json is loose JSON written by many different
// tools, so only the fields we use are parsed and each of them
// accepts the shapes seen in the wild.
//
// Reference: HuggingFace tokenizers documentation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

/// A special token is written either as a bare string or as an
/// AddedToken object: {"content": "<|im_end|>", "special": true, ...}
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenSpec {
    Text(String),
    Added { content: String },
}

impl TokenSpec {
    pub fn content(&self) -> &str {
        match self {
            TokenSpec::Text(s)           => s,
            TokenSpec::Added { content } => content,
        }
    }
}

/// `chat_template` is a single Jinja string, or a list of named
/// templates of which "default" is the one used for chat
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    Single(String),
    Named(Vec<NamedTemplate>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedTemplate {
    pub name:     String,
    pub template: String,
}

impl TemplateSpec {
    pub fn default_template(&self) -> Option<&str> {
        match self {
            TemplateSpec::Single(t) => Some(t),
            TemplateSpec::Named(list) => list
                .iter()
                .find(|t| t.name == "default")
                .or_else(|| list.first())
                .map(|t| t.template.as_str()),
        }
    }
}

/// The subset of tokenizer_config.json this tool reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub chat_template: Option<TemplateSpec>,
    #[serde(default)]
    pub bos_token:     Option<TokenSpec>,
    #[serde(default)]
    pub eos_token:     Option<TokenSpec>,
}

pub struct TokenizerStore {
    tokenizer_path: PathBuf,
    config_path:    Option<PathBuf>,
}

impl TokenizerStore {
    pub fn new(tokenizer_path: impl Into<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            tokenizer_path: tokenizer_path.into(),
            config_path,
        }
    }

    /// Load tokenizer.json
    pub fn load(&self) -> Result<Tokenizer> {
        Tokenizer::from_file(&self.tokenizer_path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", self.tokenizer_path.display(), e
            ))
    }

    /// Load tokenizer_config.json, or an empty config if the
    /// checkpoint does not ship one
    pub fn load_config(&self) -> Result<TokenizerConfig> {
        let Some(path) = &self.config_path else {
            tracing::debug!("No tokenizer_config.json, using defaults");
            return Ok(TokenizerConfig::default());
        };
        read_tokenizer_config(path)
    }
}

fn read_tokenizer_config(path: &Path) -> Result<TokenizerConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid tokenizer config '{}'", path.display()))
}

/// Write a word-level tokenizer.json for tests.
///
/// Ids: the special tokens first (in the order given), then the
/// words. Special tokens are registered as added tokens with
/// `special: true` so decode(.., true) drops them.
#[cfg(test)]
pub fn write_word_level_tokenizer(dir: &Path, special: &[&str], words: &[&str]) -> Result<PathBuf> {
    let mut vocab = serde_json::Map::new();
    let mut added = Vec::new();
    for (id, tok) in special.iter().enumerate() {
        vocab.insert(tok.to_string(), serde_json::json!(id));
        added.push(serde_json::json!({
            "id": id, "content": tok, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        }));
    }
    let unk = "[UNK]";
    vocab.insert(unk.to_string(), serde_json::json!(special.len()));
    for (i, w) in words.iter().enumerate() {
        vocab.insert(w.to_string(), serde_json::json!(special.len() + 1 + i));
    }

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added,
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": unk }
    });

    let path = dir.join("tokenizer.json");
    std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json)?)?;
    Ok(path)
}
