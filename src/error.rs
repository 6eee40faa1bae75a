use std::fmt;

/// Landmark set that cannot be scaled: every point coincides with the wrist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationError;

impl fmt::Display for NormalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "degenerate hand: all landmarks coincide with the wrist")
    }
}

impl std::error::Error for NormalizationError {}

/// Failure reported by an injected classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationError {
    /// Feature vector length does not match the model input.
    InputLength { expected: usize, actual: usize },
    /// Backend failed to run or returned an unusable output.
    Inference(String),
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputLength { expected, actual } => {
                write!(f, "classifier expects {} features, got {}", expected, actual)
            }
            Self::Inference(msg) => write!(f, "inference failed: {}", msg),
        }
    }
}

impl std::error::Error for ClassificationError {}
