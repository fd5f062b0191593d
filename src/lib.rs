pub mod annotate;
pub mod bio;
pub mod blast;
pub mod cli;
pub mod core;
pub mod report;
pub mod utils;

pub use crate::annotate::{AnnotatedDocument, HyperlinkResolver, LineAnnotator};
pub use crate::blast::report::{Hit, Hsp, Query, Report};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeqServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema violation: {0}")]
    Schema(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Other(String),
}

impl SeqServerError {
    /// Errors caused by output we could not make sense of, rather than by the
    /// caller. A web front-end reports these as internal server errors.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SeqServerError::Parse(_) | SeqServerError::Schema(_) | SeqServerError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SeqServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let schema = SeqServerError::Schema("Hsp_evalue is not a number".to_string());
        assert_eq!(
            format!("{}", schema),
            "Schema violation: Hsp_evalue is not a number"
        );

        let parse = SeqServerError::Parse("unclosed <Hit>".to_string());
        assert_eq!(format!("{}", parse), "Parse error: unclosed <Hit>");

        let other = SeqServerError::Other("boom".to_string());
        assert_eq!(format!("{}", other), "boom");
    }

    #[test]
    fn test_internal_classification() {
        assert!(SeqServerError::Schema("x".into()).is_internal());
        assert!(SeqServerError::Parse("x".into()).is_internal());
        assert!(!SeqServerError::Config("x".into()).is_internal());
        assert!(!SeqServerError::Database("x".into()).is_internal());
    }
}
