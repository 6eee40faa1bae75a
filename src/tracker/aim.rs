use std::time::Duration;

use nalgebra::Vector3;
use tracing::{debug, info};

use crate::config::GestureConfig;
use crate::event::GestureEvent;
use crate::hand::{HandFrame, LandmarkIndex, Point2, Point3};
use super::secs_to_duration;

/// Angle in degrees between two 3D vectors.
///
/// The cosine is clamped to [-1, 1] before `acos`. `None` if either vector has zero length.
pub fn angle_between(v1: Vector3<f64>, v2: Vector3<f64>) -> Option<f64> {
    let denom = v1.norm() * v2.norm();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let cos = (v1.dot(&v2) / denom).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn to_vector(p: Point3) -> Vector3<f64> {
    Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// Bend of the index finger: tip segment (DIP→tip) against the base segment (PIP→MCP).
pub fn index_finger_angle(hand: &HandFrame) -> Option<f64> {
    let v1 = to_vector(hand.point_3d(LandmarkIndex::IndexTip))
        - to_vector(hand.point_3d(LandmarkIndex::IndexDip));
    let v2 = to_vector(hand.point_3d(LandmarkIndex::IndexMcp))
        - to_vector(hand.point_3d(LandmarkIndex::IndexPip));
    angle_between(v1, v2)
}

/// Result of one aim frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AimOutcome {
    pub angle: i32,
    pub gun: GestureEvent,
    pub shoot: Option<GestureEvent>,
}

/// Gun pose: continuous aim telemetry plus rate-limited shots.
pub struct AimShootDetector {
    cooldown: Duration,
    trigger_angle: i32,
    last_shot: Option<Duration>,
    last_aim_point: Point2,
}

impl AimShootDetector {
    pub fn new(cooldown: Duration, trigger_angle: i32) -> Self {
        Self {
            cooldown,
            trigger_angle,
            last_shot: None,
            last_aim_point: [0, 0],
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(
            secs_to_duration(config.shoot_cooldown_secs),
            config.trigger_angle_deg,
        )
    }

    /// `None` when the finger joints collapse to a point and the angle is undefined.
    pub fn update(&mut self, hand: &HandFrame, now: Duration) -> Option<AimOutcome> {
        let angle = index_finger_angle(hand)? as i32;
        let tip = hand.point(LandmarkIndex::IndexTip);
        let gun = GestureEvent::gun(tip, angle);

        let mut shoot = None;
        if angle < self.trigger_angle {
            let ready = match self.last_shot {
                Some(t) => now.saturating_sub(t) > self.cooldown,
                None => true,
            };
            if ready {
                info!("shoot: angle={} at {:?}", angle, self.last_aim_point);
                shoot = Some(GestureEvent::shoot(self.last_aim_point, angle));
                self.last_shot = Some(now);
            } else {
                self.last_aim_point = tip;
            }
        } else {
            debug!("aim: angle={} tip={:?}", angle, tip);
        }

        Some(AimOutcome { angle, gun, shoot })
    }

    pub fn last_aim_point(&self) -> Point2 {
        self.last_aim_point
    }

    pub fn last_shot(&self) -> Option<Duration> {
        self.last_shot
    }
}

impl Default for AimShootDetector {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}
