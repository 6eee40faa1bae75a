//! Feature vectors fed to the pose and dynamic-gesture classifiers.

use super::landmark::{LandmarkIndex, Point2};
use crate::error::NormalizationError;

/// Length of the pose classifier input (21 landmarks × 2).
pub const POSE_FEATURES: usize = LandmarkIndex::COUNT * 2;

/// Wrist-relative, max-abs-scaled landmark vector.
///
/// The largest absolute element of the output is exactly 1.0.
pub fn normalize_landmarks(
    landmarks: &[Point2; LandmarkIndex::COUNT],
) -> Result<[f32; POSE_FEATURES], NormalizationError> {
    let [base_x, base_y] = landmarks[LandmarkIndex::Wrist as usize];

    let mut out = [0.0f32; POSE_FEATURES];
    for (i, &[x, y]) in landmarks.iter().enumerate() {
        out[i * 2] = (x - base_x) as f32;
        out[i * 2 + 1] = (y - base_y) as f32;
    }

    let max_value = out.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max_value == 0.0 {
        return Err(NormalizationError);
    }
    for v in &mut out {
        *v /= max_value;
    }
    Ok(out)
}

/// Point history relative to its oldest point, x / width and y / height, flattened.
pub fn normalize_point_history<I>(points: I, width: u32, height: u32) -> Vec<f32>
where
    I: IntoIterator<Item = Point2>,
{
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;

    let mut base: Option<Point2> = None;
    let mut out = Vec::new();
    for point in points {
        let [bx, by] = *base.get_or_insert(point);
        out.push((point[0] - bx) as f32 / w);
        out.push((point[1] - by) as f32 / h);
    }
    out
}
