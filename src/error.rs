//! Error types for the conversion pipeline.
//!
//! Conversion does not try to recover: the first error wins and carries a
//! [`Span`] so a caller can point at the offending SRC text. See spec.md §7.

use crate::span::Span;
use thiserror::Error;

/// Errors that can occur while converting SRC to TGT.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    /// Surfaced as-is from the external parser; conversion aborts.
    #[error("parse error at {span:?}: {message}")]
    ParserError { message: String, span: Span },

    /// The converter has no handler for this node kind.
    #[error("unknown node kind `{kind}` at {span:?}")]
    UnknownNodeKind { kind: String, span: Span },

    /// A construct that is syntactically valid SRC but has no TGT mapping.
    #[error("unsupported construct at {span:?}: {message}")]
    UnsupportedConstruct { message: String, span: Span },

    /// An x-string (`` `...` ``) was used without a `binding` option.
    #[error("x-string requires a `binding` option at {span:?}")]
    SecurityXstrBinding { span: Span },

    /// A filter raised while rewriting; wrapped with the offending node's location.
    #[error("filter `{filter}` failed at {span:?}: {message}")]
    FilterError {
        filter: String,
        message: String,
        span: Span,
    },
}

impl ConvertError {
    pub fn unknown_node(kind: impl Into<String>, span: Span) -> Self {
        Self::UnknownNodeKind {
            kind: kind.into(),
            span,
        }
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::UnsupportedConstruct {
            message: message.into(),
            span,
        }
    }

    pub fn filter(filter: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self::FilterError {
            filter: filter.into(),
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::ParserError { span, .. }
            | Self::UnknownNodeKind { span, .. }
            | Self::UnsupportedConstruct { span, .. }
            | Self::SecurityXstrBinding { span }
            | Self::FilterError { span, .. } => *span,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
