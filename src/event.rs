//! Outbound event schema.
//!
//! Field names and value types are the wire contract: every field is a string.

use serde::{Deserialize, Serialize};

use crate::hand::{HandFrame, Point2};

/// Placeholder value for unused gesture parameters.
pub const DEFAULT_PARAM: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    #[serde(rename = "idle")]
    Idle,
    Walking,
    Gun,
    Shoot,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "Walking",
            Self::Gun => "Gun",
            Self::Shoot => "Shoot",
        }
    }
}

/// Lateral direction of a walking step, from palm depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    Front,
    Left,
    Right,
}

impl WalkDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub gesture: GestureKind,
    pub param1: String,
    pub param2: String,
    pub param3: String,
}

impl GestureEvent {
    fn with_params(gesture: GestureKind, param1: String, param2: String) -> Self {
        Self {
            gesture,
            param1,
            param2,
            param3: DEFAULT_PARAM.to_string(),
        }
    }

    pub fn idle() -> Self {
        Self::with_params(
            GestureKind::Idle,
            DEFAULT_PARAM.to_string(),
            DEFAULT_PARAM.to_string(),
        )
    }

    /// `param1` = direction, `param2` = cadence score
    pub fn walking(direction: WalkDirection, cadence: u32) -> Self {
        Self::with_params(
            GestureKind::Walking,
            direction.as_str().to_string(),
            cadence.to_string(),
        )
    }

    /// `param1` = fingertip "x,y", `param2` = aim angle in degrees
    pub fn gun(point: Point2, angle: i32) -> Self {
        Self::with_params(GestureKind::Gun, format_point(point), angle.to_string())
    }

    /// `param1` = last aim point "x,y", `param2` = angle at the trigger pull
    pub fn shoot(aim_point: Point2, angle: i32) -> Self {
        Self::with_params(GestureKind::Shoot, format_point(aim_point), angle.to_string())
    }

    /// (key, value) pairs in schema order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("gesture", self.gesture.as_str()),
            ("param1", self.param1.as_str()),
            ("param2", self.param2.as_str()),
            ("param3", self.param3.as_str()),
        ]
    }
}

/// Per-hand landmark telemetry, emitted every frame a hand is seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerEvent {
    pub hand: String,
    pub landmark: String,
}

impl FingerEvent {
    /// `landmark` is `"<z>,<x>,<y>,"` repeated for all 21 landmarks.
    pub fn from_hand(hand: &HandFrame) -> Self {
        let mut landmark = String::new();
        for [x, y, z] in hand.landmarks_3d.iter() {
            landmark.push_str(&format!("{:?},{},{},", z, *x as i32, *y as i32));
        }
        Self {
            hand: hand.handedness.as_str().to_string(),
            landmark,
        }
    }

    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [("hand", self.hand.as_str()), ("landmark", self.landmark.as_str())]
    }
}

/// Anything the pipeline hands to the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    Finger(FingerEvent),
    Gesture(GestureEvent),
}

fn format_point([x, y]: Point2) -> String {
    format!("{},{}", x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Handedness, LandmarkIndex};

    #[test]
    fn test_gesture_json_field_names() {
        let json = serde_json::to_string(&GestureEvent::gun([120, 80], 45)).unwrap();
        assert_eq!(
            json,
            r#"{"gesture":"Gun","param1":"120,80","param2":"45","param3":"0"}"#
        );
        let json = serde_json::to_string(&GestureEvent::idle()).unwrap();
        assert!(json.starts_with(r#"{"gesture":"idle""#));
    }

    #[test]
    fn test_walking_params() {
        let ev = GestureEvent::walking(WalkDirection::Left, 125);
        assert_eq!(ev.gesture, GestureKind::Walking);
        assert_eq!(ev.param1, "left");
        assert_eq!(ev.param2, "125");
        assert_eq!(ev.param3, "0");
    }

    #[test]
    fn test_fields_in_schema_order() {
        let ev = GestureEvent::shoot([3, 4], 60);
        let keys: Vec<&str> = ev.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["gesture", "param1", "param2", "param3"]);
        assert_eq!(ev.fields()[0].1, "Shoot");
        assert_eq!(ev.fields()[1].1, "3,4");
    }

    #[test]
    fn test_finger_event_z_first() {
        let mut landmarks_3d = [[0.0f32; 3]; LandmarkIndex::COUNT];
        landmarks_3d[0] = [10.0, 20.0, -1.5];
        let hand = HandFrame::new(Handedness::Left, [[0; 2]; LandmarkIndex::COUNT], landmarks_3d);
        let ev = FingerEvent::from_hand(&hand);
        assert_eq!(ev.hand, "left");
        assert!(ev.landmark.starts_with("-1.5,10,20,0.0,0,0,"));
        assert!(ev.landmark.ends_with(','));
        assert_eq!(ev.landmark.matches(',').count(), LandmarkIndex::COUNT * 3);
    }
}
