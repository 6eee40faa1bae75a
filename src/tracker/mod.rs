pub mod aim;
pub mod history;
pub mod vote;
pub mod walking;

pub use aim::{AimOutcome, AimShootDetector};
pub use history::{PointHistory, RingBuffer, HISTORY_LEN};
pub use vote::MajorityVote;
pub use walking::{Cross, WalkingDetector};

use std::time::Duration;

/// 設定値の秒数。負と NaN は 0、表せないほど大きい値は `Duration::MAX`
pub(crate) fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_duration_saturates() {
        assert_eq!(secs_to_duration(1.5), Duration::from_millis(1500));
        assert_eq!(secs_to_duration(-2.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(secs_to_duration(1e30), Duration::MAX);
    }
}
