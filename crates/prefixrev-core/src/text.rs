//! Reading-corpus texts.
//!
//! Texts arrive as one JSON file per corpus, mapping text id to an object
//! of stringified 0-based positions and token strings:
//!
//! ```json
//! { "1": { "0": "The", "1": "cat", "2": "sat" } }
//! ```
//!
//! Loading validates that positions are contiguous from 0; a gap means the
//! export is broken and the run must not continue. Loaded texts are
//! immutable for the rest of the run.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::corpus::TokenId;
use crate::error::{PipelineError, Result};

/// One text: ordered tokens plus its corpus-specific identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub id: String,
    pub tokens: Vec<String>,
}

impl Text {
    pub fn new(id: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            id: id.into(),
            tokens,
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The prefix string ending at position `i` (inclusive): tokens joined
    /// by a single space, exactly as the labeller sees them.
    pub fn prefix(&self, i: usize) -> String {
        self.tokens[..=i].join(" ")
    }

    /// Row identifier for the token at `position`.
    pub fn token_id(&self, position: usize) -> TokenId {
        TokenId::new(self.id.clone(), position)
    }
}

/// Load all texts of a corpus from its JSON token-map file.
///
/// Texts are returned sorted by id, numerically where ids parse as
/// integers so that `"10"` sorts after `"9"`.
pub fn load_texts(path: &Path) -> Result<Vec<Text>> {
    let reader = BufReader::new(File::open(path)?);
    let raw: HashMap<String, HashMap<String, String>> = serde_json::from_reader(reader)?;

    let mut texts = Vec::with_capacity(raw.len());
    for (id, token_map) in raw {
        texts.push(text_from_map(id, token_map)?);
    }
    texts.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.id.cmp(&b.id),
    });
    log::debug!("loaded {} texts from {}", texts.len(), path.display());
    Ok(texts)
}

/// Turn one position→token object into an ordered token list, enforcing
/// contiguity from position 0.
fn text_from_map(id: String, token_map: HashMap<String, String>) -> Result<Text> {
    let mut indexed: Vec<(usize, String)> = Vec::with_capacity(token_map.len());
    for (pos, token) in token_map {
        let position: usize = pos.parse().map_err(|_| PipelineError::BadPosition {
            text_id: id.clone(),
            key: pos.clone(),
        })?;
        indexed.push((position, token));
    }
    indexed.sort_by_key(|(p, _)| *p);

    let mut tokens = Vec::with_capacity(indexed.len());
    for (expected, (position, token)) in indexed.into_iter().enumerate() {
        if position != expected {
            return Err(PipelineError::NonContiguousText {
                text_id: id,
                position: expected,
            });
        }
        tokens.push(token);
    }
    Ok(Text::new(id, tokens))
}
