use thiserror::Error;

/// Errors surfaced by the pipeline.
///
/// Every transform is total; the only failures are configuration mistakes
/// and the send-path input cap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("input is {len} bytes, over the {max} byte limit")]
    InputTooLarge { len: usize, max: usize },

    #[error("invalid link scheme {0:?}: must start with a letter and contain only letters, digits, '+', '-' or '.'")]
    InvalidScheme(String),
}

/// Errors converting wire-format display tokens back into typed tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown display type id {0}")]
    UnknownType(u8),

    #[error("display token of type {kind} is missing its {field}")]
    MissingField { kind: u8, field: &'static str },
}
