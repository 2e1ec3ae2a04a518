use thiserror::Error;

/// Main error type for tokenhub
#[derive(Error, Debug)]
pub enum TokenHubError {
    #[error("Registry error: {0}\n\nTroubleshooting:\n- Check the registry file: config/models.json\n- Every model needs a unique 'id' and a non-empty 'check_files' list\n- Run with RUST_LOG=debug for more details")]
    Registry(String),

    #[error("Config error: {0}\n\nTroubleshooting:\n- Check the config file passed with --config\n- See example: config/default.toml")]
    Config(String),

    #[error("Conversion error: {0}\n\nTroubleshooting:\n- Is python3 installed and in PATH?\n- Does the scripts directory contain the conversion script named in the registry?")]
    Conversion(String),

    #[error("Tokenizer error: {0}\n\nTroubleshooting:\n- Check that the model directory contains tokenizer.json\n- Check internet connection for the HuggingFace fallback\n- Re-run provisioning: tokenhub provision")]
    Tokenizer(String),

    #[error("Unknown model '{requested}'. Available models: {}", .available.join(", "))]
    UnknownModel {
        requested: String,
        available: Vec<String>,
    },

    #[error("No tokenizers loaded")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TokenHubError>;
