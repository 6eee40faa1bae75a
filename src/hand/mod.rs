pub mod classifier;
pub mod labels;
pub mod landmark;
pub mod normalize;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{Classifier, FnClassifier};
pub use labels::Labels;
pub use landmark::{HandFrame, Handedness, LandmarkIndex, Point2, Point3};
pub use normalize::{normalize_landmarks, normalize_point_history, POSE_FEATURES};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
