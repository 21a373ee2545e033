//! Payload sources produce the message body of every generated log entry.
//!
//! The burst runner does not care which variant is wired in,
//! it only asks for a payload of (approximately) a given size.

use std::{fmt, str::FromStr, sync::Arc};

use rama::error::BoxError;

mod filler;
mod sentence;

pub use self::{
    filler::FillerPayload,
    sentence::{MAX_WORD_LEN, SentencePayload},
};

/// Produces a message body of a requested approximate size.
///
/// Implementations are stateless with respect to `size`:
/// calling `produce` twice with the same size is always allowed.
pub trait PayloadSource: Send + Sync + 'static {
    fn produce(&self, size: usize) -> String;
}

/// Which payload variant to use, as selected by the CLI or HTTP defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PayloadKind {
    /// Exact sized filler bytes.
    #[default]
    Filler,
    /// Pseudo-random natural language text, truncated at a word boundary.
    Sentence,
}

impl PayloadKind {
    pub fn new_source(self) -> Arc<dyn PayloadSource> {
        match self {
            Self::Filler => Arc::new(FillerPayload::default()),
            Self::Sentence => Arc::new(SentencePayload::new()),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filler => f.write_str("filler"),
            Self::Sentence => f.write_str("sentence"),
        }
    }
}

impl FromStr for PayloadKind {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("filler") {
            Ok(Self::Filler)
        } else if s.eq_ignore_ascii_case("sentence") {
            Ok(Self::Sentence)
        } else {
            Err(BoxError::from(format!(
                "unknown payload kind '{s}' (expected 'filler' or 'sentence')"
            )))
        }
    }
}
