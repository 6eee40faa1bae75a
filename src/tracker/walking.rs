use std::time::Duration;

use tracing::debug;

use crate::config::GestureConfig;
use crate::event::{GestureEvent, WalkDirection};
use crate::hand::{HandFrame, LandmarkIndex};
use super::secs_to_duration;

/// 人差し指と中指のどちらが画面上で上にあるか (y は下向き)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    /// 人差し指の方が下 (index.y > middle.y)
    IndexBelow,
    /// 人差し指が上、または同じ高さ
    IndexAbove,
}

impl Cross {
    pub fn from_hand(hand: &HandFrame) -> Self {
        let index = hand.point(LandmarkIndex::IndexTip);
        let middle = hand.point(LandmarkIndex::MiddleTip);
        if index[1] > middle[1] {
            Self::IndexBelow
        } else {
            Self::IndexAbove
        }
    }
}

/// 指歩きのステップ検出
///
/// 人差し指と中指の上下が入れ替わるたびに 1 ステップ。直前のステップからの
/// 間隔が `timeout` 未満ならケイデンス `cadence_scale / 間隔` で Walking を出す。
/// 状態はポーズが変わってもリセットしない。
pub struct WalkingDetector {
    timeout: Duration,
    cadence_scale: f64,
    depth_bucket: f32,
    cross_pre: Option<Cross>,
    last_transition: Option<Duration>,
}

impl WalkingDetector {
    pub fn new(timeout: Duration, cadence_scale: f64, depth_bucket: f32) -> Self {
        Self {
            timeout,
            cadence_scale,
            depth_bucket,
            cross_pre: None,
            last_transition: None,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(
            secs_to_duration(config.walk_timeout_secs),
            config.cadence_scale,
            config.depth_bucket,
        )
    }

    /// 歩行ポーズ中の 1 フレーム。`now` はストリーム上の時刻
    pub fn update(&mut self, hand: &HandFrame, now: Duration) -> Option<GestureEvent> {
        let cross = Cross::from_hand(hand);

        // 初回は基準状態として記録するだけ
        let prev = self.cross_pre.replace(cross)?;
        if prev == cross {
            return None;
        }

        // 最初の切り替わりには比較対象の時刻が無い
        let last = self.last_transition.replace(now)?;
        let elapsed = now.saturating_sub(last);
        if elapsed >= self.timeout {
            debug!("walk step after {:.2}s ignored", elapsed.as_secs_f64());
            return None;
        }
        if elapsed.is_zero() {
            return None;
        }

        let cadence = (self.cadence_scale / elapsed.as_secs_f64()).round() as u32;
        let direction = self.direction(hand);
        debug!("walking: {} cadence={}", direction.as_str(), cadence);
        Some(GestureEvent::walking(direction, cadence))
    }

    /// 人差し指の付け根と小指の付け根の深度バケットを比較する
    fn direction(&self, hand: &HandFrame) -> WalkDirection {
        let index = (hand.point_3d(LandmarkIndex::IndexMcp)[2] / self.depth_bucket) as i32;
        let pinky = (hand.point_3d(LandmarkIndex::PinkyMcp)[2] / self.depth_bucket) as i32;
        if index == pinky {
            WalkDirection::Front
        } else if index > pinky {
            WalkDirection::Left
        } else {
            WalkDirection::Right
        }
    }

    pub fn cross_pre(&self) -> Option<Cross> {
        self.cross_pre
    }

    pub fn last_transition(&self) -> Option<Duration> {
        self.last_transition
    }
}

impl Default for WalkingDetector {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GestureKind;
    use crate::hand::Handedness;

    fn walking_hand(index_y: i32, middle_y: i32, index_z: f32, pinky_z: f32) -> HandFrame {
        let mut landmarks_2d = [[100, 100]; LandmarkIndex::COUNT];
        let mut landmarks_3d = [[100.0, 100.0, 0.0]; LandmarkIndex::COUNT];
        landmarks_2d[LandmarkIndex::IndexTip as usize] = [90, index_y];
        landmarks_2d[LandmarkIndex::MiddleTip as usize] = [110, middle_y];
        landmarks_3d[LandmarkIndex::IndexMcp as usize][2] = index_z;
        landmarks_3d[LandmarkIndex::PinkyMcp as usize][2] = pinky_z;
        HandFrame::new(Handedness::Right, landmarks_2d, landmarks_3d)
    }

    fn step(phase: bool) -> HandFrame {
        if phase {
            walking_hand(200, 150, 0.0, 0.0)
        } else {
            walking_hand(150, 200, 0.0, 0.0)
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_cross_screen_convention() {
        assert_eq!(Cross::from_hand(&walking_hand(200, 150, 0.0, 0.0)), Cross::IndexBelow);
        assert_eq!(Cross::from_hand(&walking_hand(150, 200, 0.0, 0.0)), Cross::IndexAbove);
        assert_eq!(Cross::from_hand(&walking_hand(150, 150, 0.0, 0.0)), Cross::IndexAbove);
    }

    #[test]
    fn test_cadence_scenario() {
        let mut walk = WalkingDetector::default();
        // 初期状態
        assert!(walk.update(&step(false), ms(0)).is_none());

        let mut events = Vec::new();
        for (i, t) in [400, 800, 1200].iter().enumerate() {
            if let Some(ev) = walk.update(&step(i % 2 == 0), ms(*t)) {
                events.push(ev);
            }
        }

        assert_eq!(events.len(), 2);
        for ev in &events {
            assert_eq!(ev.gesture, GestureKind::Walking);
            assert_eq!(ev.param2, "125");
            assert_eq!(ev.param1, "front");
        }
    }

    #[test]
    fn test_held_pose_emits_nothing() {
        let mut walk = WalkingDetector::default();
        for t in 0..10 {
            assert!(walk.update(&step(true), ms(t * 100)).is_none());
        }
        assert_eq!(walk.last_transition(), None);
    }

    #[test]
    fn test_timeout_scenario() {
        let mut walk = WalkingDetector::default();
        walk.update(&step(false), ms(0));
        walk.update(&step(true), ms(100));

        let ev = walk.update(&step(false), ms(1600));
        assert!(ev.is_none());
        assert_eq!(walk.cross_pre(), Some(Cross::IndexAbove));
        assert_eq!(walk.last_transition(), Some(ms(1600)));

        // 次のステップは 1600ms を基準にする
        let ev = walk.update(&step(true), ms(2100)).unwrap();
        assert_eq!(ev.param2, "100");
    }

    #[test]
    fn test_exactly_timeout_is_ignored() {
        let mut walk = WalkingDetector::default();
        walk.update(&step(false), ms(0));
        walk.update(&step(true), ms(0));
        assert!(walk.update(&step(false), ms(1000)).is_none());
    }

    #[test]
    fn test_direction_from_palm_depth() {
        let cases = [
            (10.0, 20.0, "front"),
            (65.0, 5.0, "left"),
            (-40.0, 10.0, "right"),
            // 切り捨ては 0 方向 (-29 / 30 → 0)
            (-29.0, 29.0, "front"),
        ];
        for (index_z, pinky_z, expected) in cases {
            let mut walk = WalkingDetector::default();
            walk.update(&walking_hand(150, 200, index_z, pinky_z), ms(0));
            walk.update(&walking_hand(200, 150, index_z, pinky_z), ms(100));
            let ev = walk.update(&walking_hand(150, 200, index_z, pinky_z), ms(300)).unwrap();
            assert_eq!(ev.param1, expected, "z=({}, {})", index_z, pinky_z);
            assert_eq!(ev.param2, "250");
        }
    }

    #[test]
    fn test_huge_timeout_from_config() {
        let config = GestureConfig {
            walk_timeout_secs: f64::INFINITY,
            ..GestureConfig::default()
        };
        let mut walk = WalkingDetector::from_config(&config);
        walk.update(&step(false), ms(0));
        walk.update(&step(true), ms(0));
        // 長い間隔でもタイムアウトしない
        let ev = walk.update(&step(false), ms(5000)).unwrap();
        assert_eq!(ev.param2, "10");
    }

    #[test]
    fn test_state_survives_pose_change() {
        let mut walk = WalkingDetector::default();
        walk.update(&step(false), ms(0));
        walk.update(&step(true), ms(200));
        // ポーズが外れていた間は update されない。戻った直後の切り替わりは古い基準時刻を使う
        let ev = walk.update(&step(false), ms(900)).unwrap();
        assert_eq!(ev.param2, "71");
    }
}
