use std::{fmt, io};

#[derive(Debug)]
pub enum BurstError {
    /// The burst configuration was rejected before any run started.
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },
    /// The log sink rejected a write, which aborts the run.
    Io {
        /// Entries successfully written before the failure.
        emitted: u64,
        source: io::Error,
    },
    /// The run task stopped without publishing a result,
    /// e.g. because its executor was shut down.
    Aborted,
}

impl BurstError {
    pub(crate) const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfiguration { field, reason }
    }

    /// Name of the configuration field at fault, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfiguration { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for BurstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, reason } => {
                write!(f, "invalid burst configuration: {field} {reason}")
            }
            Self::Io { emitted, source } => {
                write!(f, "log sink write failed after {emitted} entries: {source}")
            }
            Self::Aborted => write!(f, "burst run aborted before completion"),
        }
    }
}

impl std::error::Error for BurstError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
