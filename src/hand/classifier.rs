use crate::error::ClassificationError;

/// Maps a feature vector to a discrete class id.
///
/// Implementations must be deterministic for the same vector and model state.
pub trait Classifier {
    fn classify(&mut self, features: &[f32]) -> Result<usize, ClassificationError>;
}

/// Adapter for closures, mostly for wiring fixed rules or test doubles.
pub struct FnClassifier<F>(pub F);

impl<F> FnClassifier<F>
where
    F: FnMut(&[f32]) -> Result<usize, ClassificationError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Classifier for FnClassifier<F>
where
    F: FnMut(&[f32]) -> Result<usize, ClassificationError>,
{
    fn classify(&mut self, features: &[f32]) -> Result<usize, ClassificationError> {
        (self.0)(features)
    }
}

/// Index of the highest score, or `fallback` when it is below `threshold`.
pub fn argmax_with_threshold(scores: &[f32], threshold: Option<f32>, fallback: usize) -> Option<usize> {
    let (index, best) = scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |acc: Option<(usize, f32)>, (i, s)| match acc {
            Some((_, b)) if b >= s => acc,
            _ => Some((i, s)),
        })?;

    match threshold {
        Some(t) if best < t => Some(fallback),
        _ => Some(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_classifier_delegates() {
        let mut c = FnClassifier::new(|v: &[f32]| Ok(v.len()));
        assert_eq!(c.classify(&[0.0; 42]), Ok(42));
    }

    #[test]
    fn test_argmax_picks_first_best() {
        assert_eq!(argmax_with_threshold(&[0.1, 0.7, 0.7, 0.2], None, 0), Some(1));
    }

    #[test]
    fn test_argmax_threshold_fallback() {
        assert_eq!(argmax_with_threshold(&[0.2, 0.4, 0.3], Some(0.5), 0), Some(0));
        assert_eq!(argmax_with_threshold(&[0.2, 0.6, 0.3], Some(0.5), 0), Some(1));
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax_with_threshold(&[], None, 0), None);
    }
}
