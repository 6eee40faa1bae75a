use anyhow::{bail, Result};

/// 手の 21 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkIndex {
    pub const COUNT: usize = 21;
}

/// 画素座標 (x, y)。y は下向きに増える
pub type Point2 = [i32; 2];

/// 画素座標 + 画像高さスケールの深度 (x, y, z)
pub type Point3 = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// 検出器のラベルは先頭 1 文字だけを見る ("Left" / "L" / "Right" ...)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.chars().next() {
            Some('L') | Some('l') => Some(Self::Left),
            Some('R') | Some('r') => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// 1 フレーム内で検出された 1 つの手
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    pub handedness: Handedness,
    pub landmarks_2d: [Point2; LandmarkIndex::COUNT],
    pub landmarks_3d: [Point3; LandmarkIndex::COUNT],
}

impl HandFrame {
    pub fn new(
        handedness: Handedness,
        landmarks_2d: [Point2; LandmarkIndex::COUNT],
        landmarks_3d: [Point3; LandmarkIndex::COUNT],
    ) -> Self {
        Self {
            handedness,
            landmarks_2d,
            landmarks_3d,
        }
    }

    /// 検出器の正規化座標 (x, y ∈ [0, 1], 相対 z) を画素座標に変換する
    ///
    /// x, y は切り捨てて `[0, width-1] × [0, height-1]` にクランプ、z は画像高さ倍。
    /// 3D 側の x, y はクランプ後の画素座標をそのまま使う。
    pub fn from_normalized(
        label: &str,
        points: &[[f32; 3]],
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let handedness = match Handedness::from_label(label) {
            Some(h) => h,
            None => bail!("unknown handedness label: {:?}", label),
        };
        if points.len() != LandmarkIndex::COUNT {
            bail!(
                "expected {} landmarks, got {}",
                LandmarkIndex::COUNT,
                points.len()
            );
        }
        if width == 0 || height == 0 {
            bail!("invalid frame size {}x{}", width, height);
        }

        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;
        let mut landmarks_2d = [[0; 2]; LandmarkIndex::COUNT];
        let mut landmarks_3d = [[0.0; 3]; LandmarkIndex::COUNT];

        for (i, &[x, y, z]) in points.iter().enumerate() {
            let px = ((x * width as f32) as i32).clamp(0, max_x);
            let py = ((y * height as f32) as i32).clamp(0, max_y);
            landmarks_2d[i] = [px, py];
            landmarks_3d[i] = [px as f32, py as f32, z * height as f32];
        }

        Ok(Self::new(handedness, landmarks_2d, landmarks_3d))
    }

    pub fn point(&self, index: LandmarkIndex) -> Point2 {
        self.landmarks_2d[index as usize]
    }

    pub fn point_3d(&self, index: LandmarkIndex) -> Point3 {
        self.landmarks_3d[index as usize]
    }
}
