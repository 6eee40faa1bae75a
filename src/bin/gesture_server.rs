//! Gesture server: receives hand landmarks over TCP, classifies poses and
//! dynamic gestures, and sends finger/gesture events via OSC.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use finger_gesture::config::Config;
use finger_gesture::hand::{HandFrame, Labels, OnnxClassifier, POSE_FEATURES};
use finger_gesture::pipeline::{FrameReport, GesturePipeline};
use finger_gesture::protocol::{self, DetectorMessage, HandLandmarks, MessageStream};
use finger_gesture::sink::{EventSink, OscSink};
use finger_gesture::tracker::HISTORY_LEN;

const CONFIG_PATH: &str = "config.toml";

struct LabelSet {
    pose: Labels,
    gesture: Labels,
}

/// 1 秒ごとの FPS とラベル表示
struct FpsLog {
    frames: u32,
    events: u32,
    timer: Instant,
}

impl FpsLog {
    fn new() -> Self {
        Self {
            frames: 0,
            events: 0,
            timer: Instant::now(),
        }
    }

    fn tick(&mut self, report: &FrameReport, labels: &LabelSet) {
        self.frames += 1;
        self.events += report.events.len() as u32;
        let elapsed = self.timer.elapsed().as_secs_f32();
        if elapsed < 1.0 {
            return;
        }

        let poses: Vec<String> = report
            .hands
            .iter()
            .map(|h| {
                let name = match h.pose_id {
                    Some(id) => labels.pose.name(id),
                    None => "-".to_string(),
                };
                format!("{}={}", h.handedness.as_str(), name)
            })
            .collect();
        info!(
            "FPS: {:.1} (events: {}) | pose: {} | gesture: {}",
            self.frames as f32 / elapsed,
            self.events,
            if poses.is_empty() { "no hand".to_string() } else { poses.join(" ") },
            labels.gesture.name(report.smoothed_gesture_id),
        );
        self.frames = 0;
        self.events = 0;
        self.timer = Instant::now();
    }
}

fn to_hand_frames(hands: &[HandLandmarks], width: u32, height: u32) -> Vec<HandFrame> {
    hands
        .iter()
        .filter_map(|h| match h.to_hand_frame(width, height) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!("hand skipped: {:#}", e);
                None
            }
        })
        .collect()
}

async fn run_session(
    stream: &mut MessageStream,
    pipeline: &mut GesturePipeline,
    sink: &OscSink,
    labels: &LabelSet,
) -> Result<()> {
    let mut fps = FpsLog::new();

    while let Some(msg) = protocol::recv_message::<DetectorMessage>(stream).await? {
        match msg {
            DetectorMessage::Frame {
                timestamp_us,
                width,
                height,
                hands,
            } => {
                pipeline.set_frame_size(width, height);
                let frames = to_hand_frames(&hands, width, height);
                let report = pipeline.process(&frames, Duration::from_micros(timestamp_us));
                for event in &report.events {
                    sink.send(event);
                }
                debug!(
                    "t={}us hands={} gesture={} (raw {})",
                    timestamp_us,
                    frames.len(),
                    report.smoothed_gesture_id,
                    report.finger_gesture_id
                );
                fps.tick(&report, labels);
            }
            DetectorMessage::EndOfStream => {
                info!("end of stream");
                break;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.app.log_level.as_str().into()),
        )
        .init();

    info!("Gesture Server ({})", env!("GIT_VERSION"));
    info!("Listen: {}", config.server.listen_addr);
    info!("Sink: {}", config.sink.addr);

    let cls = &config.classifier;
    let pose = OnnxClassifier::new(&cls.keypoint_model, &cls.input_name, &cls.output_name, POSE_FEATURES)?;
    info!("Keypoint model loaded: {}", cls.keypoint_model);
    let gesture = OnnxClassifier::new(
        &cls.point_history_model,
        &cls.input_name,
        &cls.output_name,
        HISTORY_LEN * 2,
    )?
    .with_score_threshold(cls.point_history_score_threshold, cls.invalid_gesture_id);
    info!("Point history model loaded: {}", cls.point_history_model);

    let labels = LabelSet {
        pose: Labels::load_or_empty(&cls.keypoint_labels),
        gesture: Labels::load_or_empty(&cls.point_history_labels),
    };
    info!(
        "Labels: {} poses, {} gestures",
        labels.pose.len(),
        labels.gesture.len()
    );

    let sink = OscSink::new(&config.sink)?;
    let mut pipeline = GesturePipeline::new(
        &config.gesture,
        Box::new(pose),
        Box::new(gesture),
        config.app.width,
        config.app.height,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen_addr))?;
    info!("Listening on {}", config.server.listen_addr);

    loop {
        let (tcp_stream, addr) = listener.accept().await?;
        tcp_stream.set_nodelay(true)?;
        info!("Client connected: {}", addr);

        pipeline.reset();
        let mut stream = protocol::message_stream(tcp_stream);
        if let Err(e) = run_session(&mut stream, &mut pipeline, &sink, &labels).await {
            warn!("session error: {:#}", e);
        }
        info!("Client disconnected, waiting for next connection...");
    }
}
