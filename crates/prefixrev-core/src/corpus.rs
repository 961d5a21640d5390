//! Corpus registry and token identifiers.
//!
//! Every row in every human or model table is keyed by a compound token
//! identifier of the form `text_<textId>_token_<position>`. [`TokenId`]
//! parses and formats that scheme. [`CorpusSpec`] records the per-corpus
//! metadata the merge stage needs, most importantly the documented number
//! of token-text mismatches caused by character-encoding normalization.

use std::borrow::Cow;
use std::fmt;

use crate::error::{PipelineError, Result};

/// Metadata for a reading corpus.
///
/// Registry entries borrow their names statically; custom corpora built at
/// runtime own theirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSpec {
    /// Corpus identifier used in filenames (e.g. `"provo"`).
    pub name: Cow<'static, str>,
    /// ISO 639-1 language code of the corpus texts.
    pub language: Cow<'static, str>,
    /// Number of token-text entries allowed to differ between human and
    /// model tables. Non-zero only where encoding normalization is known
    /// to change a bounded set of tokens.
    pub token_mismatch_tolerance: usize,
}

impl CorpusSpec {
    /// Spec for a corpus outside the registry: zero mismatch tolerance,
    /// undetermined language.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            language: Cow::Borrowed("und"),
            token_mismatch_tolerance: 0,
        }
    }
}

/// The fixed list of corpora this pipeline knows about.
///
/// Provo and GECO carry non-zero tolerances: curly-quote and ligature
/// normalization changes 3 resp. 2 token strings between the eye-tracking
/// release and the plain-text version the labellers see.
pub const KNOWN_CORPORA: &[CorpusSpec] = &[
    CorpusSpec {
        name: Cow::Borrowed("provo"),
        language: Cow::Borrowed("en"),
        token_mismatch_tolerance: 3,
    },
    CorpusSpec {
        name: Cow::Borrowed("geco"),
        language: Cow::Borrowed("en"),
        token_mismatch_tolerance: 2,
    },
    CorpusSpec {
        name: Cow::Borrowed("meco"),
        language: Cow::Borrowed("en"),
        token_mismatch_tolerance: 0,
    },
    CorpusSpec {
        name: Cow::Borrowed("zuco"),
        language: Cow::Borrowed("en"),
        token_mismatch_tolerance: 0,
    },
];

/// Look up a known corpus by name.
pub fn corpus_spec(name: &str) -> Option<&'static CorpusSpec> {
    KNOWN_CORPORA.iter().find(|c| c.name == name)
}

/// Look up a known corpus, failing with [`PipelineError::UnknownCorpus`].
pub fn require_corpus(name: &str) -> Result<&'static CorpusSpec> {
    corpus_spec(name).ok_or_else(|| PipelineError::UnknownCorpus(name.to_string()))
}

/// Parsed form of the compound row identifier `text_<id>_token_<position>`.
///
/// Text ids may themselves contain underscores, so parsing anchors on the
/// last `_token_` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId {
    pub text_id: String,
    pub position: usize,
}

impl TokenId {
    pub fn new(text_id: impl Into<String>, position: usize) -> Self {
        Self {
            text_id: text_id.into(),
            position,
        }
    }

    /// Parse `text_<id>_token_<position>` back into its parts.
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || PipelineError::BadTokenId(s.to_string());
        let rest = s.strip_prefix("text_").ok_or_else(bad)?;
        let sep = rest.rfind("_token_").ok_or_else(bad)?;
        let text_id = &rest[..sep];
        let position: usize = rest[sep + "_token_".len()..].parse().map_err(|_| bad())?;
        if text_id.is_empty() {
            return Err(bad());
        }
        Ok(Self::new(text_id, position))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text_{}_token_{}", self.text_id, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Corpus registry tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_known_corpora_tolerances() {
        assert_eq!(corpus_spec("provo").unwrap().token_mismatch_tolerance, 3);
        assert_eq!(corpus_spec("geco").unwrap().token_mismatch_tolerance, 2);
        assert_eq!(corpus_spec("meco").unwrap().token_mismatch_tolerance, 0);
    }

    #[test]
    fn test_custom_corpus_owns_name() {
        let spec = CorpusSpec::custom("celer");
        assert_eq!(spec.name, "celer");
        assert_eq!(spec.language, "und");
        assert_eq!(spec.token_mismatch_tolerance, 0);
    }

    #[test]
    fn test_unknown_corpus_rejected() {
        assert!(corpus_spec("dundee").is_none());
        assert!(matches!(
            require_corpus("dundee"),
            Err(PipelineError::UnknownCorpus(_))
        ));
    }

    // -----------------------------------------------------------------------
    // TokenId tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_token_id_roundtrip() {
        let id = TokenId::new("12", 7);
        assert_eq!(id.to_string(), "text_12_token_7");
        assert_eq!(TokenId::parse("text_12_token_7").unwrap(), id);
    }

    #[test]
    fn test_token_id_underscore_in_text_id() {
        let id = TokenId::parse("text_story_a_token_3").unwrap();
        assert_eq!(id.text_id, "story_a");
        assert_eq!(id.position, 3);
    }

    #[test]
    fn test_token_id_rejects_malformed() {
        assert!(TokenId::parse("token_3").is_err());
        assert!(TokenId::parse("text_1_token_").is_err());
        assert!(TokenId::parse("text_1_token_x").is_err());
        assert!(TokenId::parse("text__token_0").is_err());
    }
}
