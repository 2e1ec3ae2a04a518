//! Tokenizer serving
//!
//! At startup every registry entry gets exactly one loaded tokenizer,
//! resolved local-first with a remote HuggingFace fallback. The loaded set
//! is read-only for the process lifetime and shared across concurrent
//! requests; the HTTP layer routes each request to the tokenizer bound to
//! its model identifier.

pub mod http;
pub mod registry;
pub mod resolve;

pub use http::{router, serve, AppState};
pub use registry::{EncodedText, LoadedTokenizer, TokenizerRegistry};
pub use resolve::{resolve_source, LoadSource};
