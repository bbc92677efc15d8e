//! Analysis adapters.
//!
//! The bus talks to the outside world through two narrow interfaces:
//! an analysis provider and a finding extractor. The Ollama client
//! implements both.

pub mod error;
pub mod ollama;
pub mod provider;

pub use error::{AnalysisError, ErrorKind};
pub use ollama::{OllamaAnalyst, OllamaConfig};
pub use provider::{AnalysisProvider, FindingExtractor};
