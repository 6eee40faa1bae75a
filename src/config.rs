use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// フレーム幅 (px)。検出器がサイズを送らない場合に使う
    #[serde(default = "default_width")]
    pub width: u32,
    /// フレーム高さ (px)
    #[serde(default = "default_height")]
    pub height: u32,
    /// tracing のフィルタ (RUST_LOG が優先)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_width() -> u32 { 960 }
fn default_height() -> u32 { 540 }
fn default_log_level() -> String { "info".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// ランドマークストリームの待ち受けアドレス
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String { "127.0.0.1:9400".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    /// イベント送信先 (UDP)
    #[serde(default = "default_sink_addr")]
    pub addr: String,
    #[serde(default = "default_finger_topic")]
    pub finger_topic: String,
    #[serde(default = "default_gesture_topic")]
    pub gesture_topic: String,
}

fn default_sink_addr() -> String { "127.0.0.1:39571".to_string() }
fn default_finger_topic() -> String { "/finger".to_string() }
fn default_gesture_topic() -> String { "/gesture".to_string() }

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            addr: default_sink_addr(),
            finger_topic: default_finger_topic(),
            gesture_topic: default_gesture_topic(),
        }
    }
}

/// ポーズ id の割り当てと検出器のしきい値
#[derive(Debug, Deserialize, Clone)]
pub struct GestureConfig {
    /// 人差し指ポインタ
    #[serde(default = "default_pointer_id")]
    pub pointer_id: usize,
    /// 指歩き
    #[serde(default = "default_walk_id")]
    pub walk_id: usize,
    /// 銃の構え (複数可)
    #[serde(default = "default_aim_ids")]
    pub aim_ids: Vec<usize>,
    /// これ以上間隔が空いたステップは歩行とみなさない (秒)
    #[serde(default = "default_walk_timeout")]
    pub walk_timeout_secs: f64,
    /// ケイデンス = cadence_scale / ステップ間隔
    #[serde(default = "default_cadence_scale")]
    pub cadence_scale: f64,
    /// 掌の深度を量子化する幅
    #[serde(default = "default_depth_bucket")]
    pub depth_bucket: f32,
    /// 連射防止のクールダウン (秒)
    #[serde(default = "default_shoot_cooldown")]
    pub shoot_cooldown_secs: f64,
    /// この角度 (度) 未満で引き金とみなす
    #[serde(default = "default_trigger_angle")]
    pub trigger_angle_deg: i32,
}

fn default_pointer_id() -> usize { 2 }
fn default_walk_id() -> usize { 5 }
fn default_aim_ids() -> Vec<usize> { vec![6, 7] }
fn default_walk_timeout() -> f64 { 1.0 }
fn default_cadence_scale() -> f64 { 50.0 }
fn default_depth_bucket() -> f32 { 30.0 }
fn default_shoot_cooldown() -> f64 { 1.0 }
fn default_trigger_angle() -> i32 { 90 }

/// `Duration` に変換できる秒数か
fn check_secs(name: &str, secs: f64) -> Result<()> {
    if !secs.is_finite() || secs < 0.0 || Duration::try_from_secs_f64(secs).is_err() {
        bail!("gesture.{} must be a finite, non-negative number of seconds (got {})", name, secs);
    }
    Ok(())
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        check_secs("walk_timeout_secs", self.walk_timeout_secs)?;
        check_secs("shoot_cooldown_secs", self.shoot_cooldown_secs)?;
        if !self.cadence_scale.is_finite() {
            bail!("gesture.cadence_scale must be finite (got {})", self.cadence_scale);
        }
        if !self.depth_bucket.is_finite() || self.depth_bucket <= 0.0 {
            bail!("gesture.depth_bucket must be positive (got {})", self.depth_bucket);
        }
        Ok(())
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pointer_id: default_pointer_id(),
            walk_id: default_walk_id(),
            aim_ids: default_aim_ids(),
            walk_timeout_secs: default_walk_timeout(),
            cadence_scale: default_cadence_scale(),
            depth_bucket: default_depth_bucket(),
            shoot_cooldown_secs: default_shoot_cooldown(),
            trigger_angle_deg: default_trigger_angle(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_keypoint_model")]
    pub keypoint_model: String,
    #[serde(default = "default_point_history_model")]
    pub point_history_model: String,
    #[serde(default = "default_keypoint_labels")]
    pub keypoint_labels: String,
    #[serde(default = "default_point_history_labels")]
    pub point_history_labels: String,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    /// 最大スコアがこれ未満なら invalid_gesture_id を返す
    #[serde(default = "default_score_threshold")]
    pub point_history_score_threshold: f32,
    #[serde(default)]
    pub invalid_gesture_id: usize,
}

fn default_keypoint_model() -> String { "models/keypoint_classifier.onnx".to_string() }
fn default_point_history_model() -> String { "models/point_history_classifier.onnx".to_string() }
fn default_keypoint_labels() -> String { "models/keypoint_classifier_label.csv".to_string() }
fn default_point_history_labels() -> String { "models/point_history_classifier_label.csv".to_string() }
fn default_input_name() -> String { "input".to_string() }
fn default_output_name() -> String { "output".to_string() }
fn default_score_threshold() -> f32 { 0.5 }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keypoint_model: default_keypoint_model(),
            point_history_model: default_point_history_model(),
            keypoint_labels: default_keypoint_labels(),
            point_history_labels: default_point_history_labels(),
            input_name: default_input_name(),
            output_name: default_output_name(),
            point_history_score_threshold: default_score_threshold(),
            invalid_gesture_id: 0,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("invalid config")?;
        config.gesture.validate()?;
        Ok(config)
    }

    /// ファイルが無い・壊れている場合はデフォルト値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{:#} (using defaults)", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.app.width, 960);
        assert_eq!(config.app.height, 540);
        assert_eq!(config.gesture.pointer_id, 2);
        assert_eq!(config.gesture.walk_id, 5);
        assert_eq!(config.gesture.aim_ids, vec![6, 7]);
        assert_eq!(config.gesture.trigger_angle_deg, 90);
        assert_eq!(config.sink.gesture_topic, "/gesture");
        assert_eq!(config.classifier.point_history_score_threshold, 0.5);
    }

    #[test]
    fn test_partial_section_override() {
        let config = Config::parse(
            r#"
            [gesture]
            walk_id = 4
            shoot_cooldown_secs = 0.5

            [sink]
            addr = "192.168.0.10:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.gesture.walk_id, 4);
        assert_eq!(config.gesture.shoot_cooldown_secs, 0.5);
        assert_eq!(config.gesture.pointer_id, 2);
        assert_eq!(config.sink.addr, "192.168.0.10:9000");
        assert_eq!(config.sink.finger_topic, "/finger");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::parse("[gesture\nwalk_id = ").is_err());
    }

    #[test]
    fn test_unrepresentable_durations_are_rejected() {
        assert!(Config::parse("[gesture]\nwalk_timeout_secs = inf").is_err());
        assert!(Config::parse("[gesture]\nshoot_cooldown_secs = 1e30").is_err());
        assert!(Config::parse("[gesture]\nshoot_cooldown_secs = -1.0").is_err());
        assert!(Config::parse("[gesture]\nwalk_timeout_secs = nan").is_err());
        assert!(Config::parse("[gesture]\ndepth_bucket = 0.0").is_err());
        assert!(Config::parse("[gesture]\nwalk_timeout_secs = 0.25").is_ok());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("no/such/config.toml");
        assert_eq!(config.server.listen_addr, "127.0.0.1:9400");
    }
}
