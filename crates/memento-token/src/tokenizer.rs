//! Token counting strategies.
//!
//! The exact strategy uses tiktoken-rs with cl100k_base encoding (close to
//! Claude's tokenization). When the encoder cannot be loaded, counting falls
//! back to a byte-length heuristic and results are flagged as estimated.

use anyhow::{Context, Result};
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Average number of UTF-8 bytes per token assumed by the heuristic.
pub const BYTES_PER_TOKEN: usize = 4;

/// Relative error of [`HeuristicTokenizer`] against the exact count on
/// representative markdown, shell, code and JSON.
pub const HEURISTIC_TOLERANCE: f64 = 0.40;

/// Converts text into a token count.
pub trait Tokenizer: Send + Sync {
    /// Count the tokens in `text`. Empty input is always 0.
    fn count(&self, text: &str) -> usize;

    /// Whether counts come from the reference encoder rather than a heuristic.
    fn is_exact(&self) -> bool;

    /// Short name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Exact counting with the cl100k_base encoder.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    /// Load the cl100k_base encoder.
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .context("Failed to load cl100k_base tokenizer")?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "cl100k_base"
    }
}

/// Byte-length approximation: `floor(utf8_len / 4)`.
///
/// On typical configuration content (markdown, shell hooks, source code,
/// JSON) the estimate stays within [`HEURISTIC_TOLERANCE`] of the cl100k
/// count. Prose tends to be overcounted and code or JSON undercounted.
/// Punctuation-dense code can come in at less than half the exact count.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl Tokenizer for HeuristicTokenizer {
    fn count(&self, text: &str) -> usize {
        text.len() / BYTES_PER_TOKEN
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Pick a tokenizer once at startup.
///
/// Returns the exact encoder unless `force_estimate` is set or the encoder
/// fails to load, in which case the heuristic is used.
pub fn select_tokenizer(force_estimate: bool) -> Arc<dyn Tokenizer> {
    if force_estimate {
        tracing::debug!("Using heuristic tokenizer (forced)");
        return Arc::new(HeuristicTokenizer);
    }

    match Cl100kTokenizer::new() {
        Ok(tokenizer) => Arc::new(tokenizer),
        Err(e) => {
            tracing::warn!(error = %e, "Exact tokenizer unavailable, falling back to estimates");
            Arc::new(HeuristicTokenizer)
        }
    }
}
