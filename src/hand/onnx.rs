use anyhow::{Context, Result};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::classifier::{argmax_with_threshold, Classifier};
use crate::error::ClassificationError;

/// ONNX モデルによる分類器 (入力 [1, N] f32、出力はクラススコア)
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    input_len: usize,
    score_threshold: Option<f32>,
    invalid_id: usize,
}

impl OnnxClassifier {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_name: &str,
        output_name: &str,
        input_len: usize,
    ) -> Result<Self> {
        let path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load ONNX model {}", path.display()))?;

        Ok(Self {
            session,
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
            input_len,
            score_threshold: None,
            invalid_id: 0,
        })
    }

    /// 最大スコアが閾値未満なら `invalid_id` を返すようにする
    pub fn with_score_threshold(mut self, threshold: f32, invalid_id: usize) -> Self {
        self.score_threshold = Some(threshold);
        self.invalid_id = invalid_id;
        self
    }

    fn run(&mut self, features: &[f32]) -> Result<usize, ClassificationError> {
        let input = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        let input_tensor =
            Tensor::from_array(input).map_err(|e| ClassificationError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;

        let scores: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;
        let scores: Vec<f32> = scores.iter().copied().collect();

        argmax_with_threshold(&scores, self.score_threshold, self.invalid_id)
            .ok_or_else(|| ClassificationError::Inference("empty output tensor".to_string()))
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&mut self, features: &[f32]) -> Result<usize, ClassificationError> {
        if features.len() != self.input_len {
            return Err(ClassificationError::InputLength {
                expected: self.input_len,
                actual: features.len(),
            });
        }
        self.run(features)
    }
}
