//! Per-frame glue: classification dispatch, history, detectors and vote.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::GestureConfig;
use crate::event::{FingerEvent, OutboundEvent};
use crate::hand::{normalize_landmarks, normalize_point_history, Classifier, HandFrame, Handedness, LandmarkIndex};
use crate::tracker::{AimShootDetector, MajorityVote, PointHistory, WalkingDetector, HISTORY_LEN};

/// Dynamic-gesture id used when no classification ran.
pub const IDLE_GESTURE_ID: usize = 0;

/// Which detector a pose id routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseBranch {
    Pointer,
    Walking,
    Aiming,
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandReport {
    pub handedness: Handedness,
    /// `None` when normalization or classification failed.
    pub pose_id: Option<usize>,
    pub branch: PoseBranch,
    pub aim_angle: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    pub hands: Vec<HandReport>,
    /// Raw dynamic-gesture id of the last classification this frame.
    pub finger_gesture_id: usize,
    /// Majority over the vote window.
    pub smoothed_gesture_id: usize,
    /// Events in emission order.
    pub events: Vec<OutboundEvent>,
}

pub struct GesturePipeline {
    config: GestureConfig,
    pose_classifier: Box<dyn Classifier + Send>,
    gesture_classifier: Box<dyn Classifier + Send>,
    width: u32,
    height: u32,
    history: PointHistory,
    vote: MajorityVote,
    walking: WalkingDetector,
    aim: AimShootDetector,
}

impl GesturePipeline {
    pub fn new(
        config: &GestureConfig,
        pose_classifier: Box<dyn Classifier + Send>,
        gesture_classifier: Box<dyn Classifier + Send>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            config: config.clone(),
            pose_classifier,
            gesture_classifier,
            width,
            height,
            history: PointHistory::new(),
            vote: MajorityVote::new(),
            walking: WalkingDetector::from_config(config),
            aim: AimShootDetector::from_config(config),
        }
    }

    pub fn set_frame_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Drops all per-stream state. Classifiers are kept.
    pub fn reset(&mut self) {
        self.history = PointHistory::new();
        self.vote = MajorityVote::new();
        self.walking = WalkingDetector::from_config(&self.config);
        self.aim = AimShootDetector::from_config(&self.config);
    }

    pub fn history(&self) -> &PointHistory {
        &self.history
    }

    pub fn branch_for(&self, pose_id: Option<usize>) -> PoseBranch {
        match pose_id {
            Some(id) if id == self.config.pointer_id => PoseBranch::Pointer,
            Some(id) if id == self.config.walk_id => PoseBranch::Walking,
            Some(id) if self.config.aim_ids.contains(&id) => PoseBranch::Aiming,
            _ => PoseBranch::Idle,
        }
    }

    /// One frame. `hands` may be empty; `now` is the frame timestamp.
    pub fn process(&mut self, hands: &[HandFrame], now: Duration) -> FrameReport {
        let mut report = FrameReport::default();

        if hands.is_empty() {
            let features = self.history_features();
            self.history.push([0, 0]);
            self.record_gesture(&features, &mut report);
            return report;
        }

        for hand in hands {
            report
                .events
                .push(OutboundEvent::Finger(FingerEvent::from_hand(hand)));

            let features = self.history_features();
            let pose_id = self.classify_pose(hand);
            let branch = self.branch_for(pose_id);
            let mut aim_angle = None;

            match branch {
                PoseBranch::Pointer => {
                    self.history.push(hand.point(LandmarkIndex::IndexTip));
                }
                PoseBranch::Walking => {
                    self.history.push(hand.point(LandmarkIndex::IndexTip));
                    self.history.push(hand.point(LandmarkIndex::MiddleTip));
                    if let Some(ev) = self.walking.update(hand, now) {
                        report.events.push(OutboundEvent::Gesture(ev));
                    }
                }
                PoseBranch::Aiming => {
                    if let Some(outcome) = self.aim.update(hand, now) {
                        aim_angle = Some(outcome.angle);
                        report.events.push(OutboundEvent::Gesture(outcome.gun));
                        if let Some(shot) = outcome.shoot {
                            report.events.push(OutboundEvent::Gesture(shot));
                        }
                    }
                }
                PoseBranch::Idle => {
                    self.history.push([0, 0]);
                }
            }

            self.record_gesture(&features, &mut report);
            report.hands.push(HandReport {
                handedness: hand.handedness,
                pose_id,
                branch,
                aim_angle,
            });
        }

        report
    }

    fn history_features(&self) -> Vec<f32> {
        normalize_point_history(self.history.iter(), self.width, self.height)
    }

    fn classify_pose(&mut self, hand: &HandFrame) -> Option<usize> {
        let features = match normalize_landmarks(&hand.landmarks_2d) {
            Ok(v) => v,
            Err(e) => {
                debug!("{} hand skipped: {}", hand.handedness.as_str(), e);
                return None;
            }
        };
        match self.pose_classifier.classify(&features) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("pose classifier: {}", e);
                None
            }
        }
    }

    fn record_gesture(&mut self, features: &[f32], report: &mut FrameReport) {
        let id = if features.len() == HISTORY_LEN * 2 {
            match self.gesture_classifier.classify(features) {
                Ok(id) => id,
                Err(e) => {
                    warn!("point history classifier: {}", e);
                    IDLE_GESTURE_ID
                }
            }
        } else {
            IDLE_GESTURE_ID
        };
        report.finger_gesture_id = id;
        report.smoothed_gesture_id = self.vote.push(id);
    }
}
