//! Replays recorded landmark frames (JSON lines) to the gesture server.
//!
//! Usage: landmark_replay <frames.jsonl> [server_addr]
//!
//! Each line: {"timestamp_us": 0, "width": 960, "height": 540,
//!             "hands": [{"handedness": "Right", "landmarks": [[x, y, z], ...]}]}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use finger_gesture::config::Config;
use finger_gesture::protocol::{self, DetectorMessage, HandLandmarks};

const CONFIG_PATH: &str = "config.toml";

/// ギャップが長すぎるときの上限
const MAX_SLEEP: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    timestamp_us: u64,
    width: u32,
    height: u32,
    #[serde(default)]
    hands: Vec<RecordedHand>,
}

#[derive(Debug, Deserialize)]
struct RecordedHand {
    handedness: String,
    landmarks: Vec<[f32; 3]>,
}

impl From<RecordedFrame> for DetectorMessage {
    fn from(f: RecordedFrame) -> Self {
        DetectorMessage::Frame {
            timestamp_us: f.timestamp_us,
            width: f.width,
            height: f.height,
            hands: f
                .hands
                .into_iter()
                .map(|h| HandLandmarks {
                    handedness: h.handedness,
                    landmarks: h.landmarks,
                })
                .collect(),
        }
    }
}

fn parse_frames(content: &str) -> Vec<RecordedFrame> {
    let mut frames = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RecordedFrame>(line) {
            Ok(frame) => frames.push(frame),
            Err(e) => warn!("line {} skipped: {}", lineno + 1, e),
        }
    }
    frames
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: landmark_replay <frames.jsonl> [server_addr]");
    };
    let server_addr = match args.next() {
        Some(addr) => addr,
        None => Config::load_or_default(CONFIG_PATH).server.listen_addr,
    };

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let frames = parse_frames(&content);
    info!("{} frames from {}", frames.len(), path);

    let tcp = tokio::net::TcpStream::connect(&server_addr)
        .await
        .with_context(|| format!("failed to connect {}", server_addr))?;
    tcp.set_nodelay(true)?;
    info!("connected to {}", server_addr);
    let mut stream = protocol::message_stream(tcp);

    let mut prev_ts: Option<u64> = None;
    let total = frames.len();
    for frame in frames {
        if let Some(prev) = prev_ts {
            let gap = Duration::from_micros(frame.timestamp_us.saturating_sub(prev));
            tokio::time::sleep(gap.min(MAX_SLEEP)).await;
        }
        prev_ts = Some(frame.timestamp_us);
        protocol::send_message(&mut stream, &DetectorMessage::from(frame)).await?;
    }
    protocol::send_message(&mut stream, &DetectorMessage::EndOfStream).await?;
    info!("sent {} frames", total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frames_skips_bad_lines() {
        let content = r#"
{"timestamp_us": 0, "width": 960, "height": 540, "hands": []}
not json
{"timestamp_us": 33000, "width": 960, "height": 540}
"#;
        let frames = parse_frames(content);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].timestamp_us, 33000);
        assert!(frames[1].hands.is_empty());
    }

    #[test]
    fn test_recorded_frame_to_message() {
        let line = r#"{"timestamp_us": 5, "width": 640, "height": 480,
            "hands": [{"handedness": "Left", "landmarks": [[0.1, 0.2, 0.0]]}]}"#;
        let frame: RecordedFrame = serde_json::from_str(line).unwrap();
        match DetectorMessage::from(frame) {
            DetectorMessage::Frame { timestamp_us, hands, .. } => {
                assert_eq!(timestamp_us, 5);
                assert_eq!(hands[0].handedness, "Left");
                assert_eq!(hands[0].landmarks, vec![[0.1, 0.2, 0.0]]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
