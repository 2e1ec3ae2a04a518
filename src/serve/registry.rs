use crate::error::{Result, TokenHubError};
use crate::registry::{ModelEntry, ModelRegistry};
use crate::serve::resolve::{resolve_source, LoadSource};
use std::collections::HashMap;
use std::path::Path;
use tokenizers::Tokenizer;

/// Fixed-length encoding result
///
/// Invariant: `input_ids.len() == attention_mask.len() == max_length` of the
/// call that produced it, and `token_count` equals the number of mask
/// positions set to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub token_count: usize,
}

/// One loaded tokenizer, bound to a model identifier for the process lifetime
///
/// Never mutated after load; safe to share across concurrent requests.
pub struct LoadedTokenizer {
    id: String,
    tokenizer: Tokenizer,
    pad_id: u32,
}

impl LoadedTokenizer {
    #[must_use]
    pub fn new(id: impl Into<String>, tokenizer: Tokenizer) -> Self {
        // Resolve the padding id once up front; 0 is the conventional
        // fallback when the vocabulary declares no pad token.
        let pad_id = tokenizer
            .token_to_id("[PAD]")
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .unwrap_or(0);

        Self {
            id: id.into(),
            tokenizer,
            pad_id,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Encode text to exactly `max_length` positions
    ///
    /// Truncates past `max_length` and right-pads short sequences, with an
    /// attention mask of 1 for real tokens and 0 for padding.
    pub fn encode(&self, text: &str, max_length: usize) -> Result<EncodedText> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| TokenHubError::Tokenizer(format!("Encoding failed: {e}")))?;

        let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();
        input_ids.truncate(max_length);

        let token_count = input_ids.len();
        let mut attention_mask = vec![1u32; token_count];

        input_ids.resize(max_length, self.pad_id);
        attention_mask.resize(max_length, 0);

        Ok(EncodedText {
            input_ids,
            attention_mask,
            token_count,
        })
    }
}

/// All loaded tokenizers for the service lifetime, keyed by model id
///
/// Populated once at startup and read-only afterwards.
#[derive(Default)]
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, LoadedTokenizer>,
}

impl TokenizerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one tokenizer per registry entry
    ///
    /// Any entry that can be loaded neither locally nor remotely aborts the
    /// whole load: the service never starts with a partial model set.
    pub async fn load(registry: &ModelRegistry, models_dir: &Path) -> Result<Self> {
        let mut loaded = Self::new();

        for entry in &registry.models {
            let tokenizer = load_entry(models_dir, entry).await?;
            loaded.insert(tokenizer);
        }

        if loaded.is_empty() {
            tracing::warn!("No models declared; service will report not ready");
        }

        Ok(loaded)
    }

    /// Register a loaded tokenizer under its model id
    pub fn insert(&mut self, tokenizer: LoadedTokenizer) {
        self.tokenizers.insert(tokenizer.id().to_string(), tokenizer);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LoadedTokenizer> {
        self.tokenizers.get(id)
    }

    /// Loaded model identifiers, sorted for stable messages
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tokenizers.keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }

    /// Route text through the tokenizer bound to `model`
    ///
    /// An unknown id is an error carrying the loaded set; it never falls
    /// back to a default model.
    pub fn tokenize(&self, model: &str, text: &str, max_length: usize) -> Result<EncodedText> {
        let tokenizer = self.get(model).ok_or_else(|| TokenHubError::UnknownModel {
            requested: model.to_string(),
            available: self.available(),
        })?;

        tokenizer.encode(text, max_length)
    }
}

/// Load one entry, local-first with a single remote retry
async fn load_entry(models_dir: &Path, entry: &ModelEntry) -> Result<LoadedTokenizer> {
    match resolve_source(models_dir, entry) {
        LoadSource::Local(dir) => {
            let path = dir.join("tokenizer.json");
            match Tokenizer::from_file(&path) {
                Ok(tokenizer) => {
                    tracing::info!("Loaded tokenizer for '{}' from {}", entry.id, path.display());
                    Ok(LoadedTokenizer::new(entry.id.clone(), tokenizer))
                }
                Err(e) => {
                    tracing::warn!(
                        "Local tokenizer for '{}' failed to load ({e}), falling back to {}",
                        entry.id,
                        entry.huggingface_model
                    );
                    load_remote(entry).await
                }
            }
        }
        LoadSource::Remote(_) => load_remote(entry).await,
    }
}

/// Download `tokenizer.json` from the upstream repository and load it
async fn load_remote(entry: &ModelEntry) -> Result<LoadedTokenizer> {
    let api = hf_hub::api::tokio::Api::new().map_err(|e| {
        TokenHubError::Tokenizer(format!("Failed to initialize HuggingFace API: {e}"))
    })?;

    let repo = api.repo(hf_hub::Repo::model(entry.huggingface_model.clone()));

    let tokenizer_file = repo.get("tokenizer.json").await.map_err(|e| {
        TokenHubError::Tokenizer(format!(
            "Failed to download tokenizer for '{}' from {}: {e}",
            entry.id, entry.huggingface_model
        ))
    })?;

    let tokenizer = Tokenizer::from_file(&tokenizer_file).map_err(|e| {
        TokenHubError::Tokenizer(format!(
            "Failed to load downloaded tokenizer for '{}': {e}",
            entry.id
        ))
    })?;

    tracing::info!(
        "Loaded tokenizer for '{}' from {}",
        entry.id,
        entry.huggingface_model
    );

    Ok(LoadedTokenizer::new(entry.id.clone(), tokenizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Whitespace WordLevel tokenizer: "hello" -> 0, "world" -> 1, pad -> 3.
    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"hello": 0, "world": 1, "[UNK]": 2, "[PAD]": 3},
            "unk_token": "[UNK]"
        }
    }"#;

    fn loaded(id: &str) -> LoadedTokenizer {
        let tokenizer = Tokenizer::from_bytes(TOKENIZER_JSON.as_bytes()).unwrap();
        LoadedTokenizer::new(id, tokenizer)
    }

    #[test]
    fn test_encode_pads_to_max_length() {
        let encoded = loaded("m1").encode("hello world", 8).unwrap();

        assert_eq!(encoded.input_ids, vec![0, 1, 3, 3, 3, 3, 3, 3]);
        assert_eq!(encoded.attention_mask, vec![1, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encoded.token_count, 2);
    }

    #[test]
    fn test_encode_truncates_to_max_length() {
        let encoded = loaded("m1").encode("hello world hello", 2).unwrap();

        assert_eq!(encoded.input_ids, vec![0, 1]);
        assert_eq!(encoded.attention_mask, vec![1, 1]);
        assert_eq!(encoded.token_count, 2);
    }

    #[test]
    fn test_pad_id_resolved_from_vocabulary() {
        let tokenizer = Tokenizer::from_bytes(TOKENIZER_JSON.as_bytes()).unwrap();
        let loaded = LoadedTokenizer::new("m1", tokenizer);
        assert_eq!(loaded.pad_id, 3);
    }

    #[test]
    fn test_unknown_model_carries_loaded_set() {
        let mut registry = TokenizerRegistry::new();
        registry.insert(loaded("m2"));
        registry.insert(loaded("m1"));

        let err = registry.tokenize("m3", "hello", 4).unwrap_err();
        match err {
            TokenHubError::UnknownModel {
                requested,
                available,
            } => {
                assert_eq!(requested, "m3");
                assert_eq!(available, vec!["m1", "m2"]);
            }
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_reports_not_ready() {
        let registry = TokenizerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.available().is_empty());
    }
}
