use serde::{Deserialize, Serialize};

/// Clockwise rotation in fixed 90° increments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Next clockwise step, wrapping 270 back to 0.
    pub fn rotated_cw(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270, got {}", degrees))
    }
}

/// Flip / rotation state of one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub flip_h: bool,
    pub flip_v: bool,
    pub rotation: Rotation,
}

/// An explicit user operation on a slot's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    FlipHorizontal,
    FlipVertical,
    Rotate,
    Reset,
}

impl TransformState {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Applies one operation. Flips never touch the rotation and vice versa.
    pub fn apply(&mut self, op: TransformOp) {
        match op {
            TransformOp::FlipHorizontal => self.flip_h = !self.flip_h,
            TransformOp::FlipVertical => self.flip_v = !self.flip_v,
            TransformOp::Rotate => self.rotation = self.rotation.rotated_cw(),
            TransformOp::Reset => *self = Self::identity(),
        }
    }

    pub fn applied(mut self, op: TransformOp) -> Self {
        self.apply(op);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_after_n_steps() {
        let mut state = TransformState::identity();
        for n in 1..=9u16 {
            state.apply(TransformOp::Rotate);
            assert_eq!(state.rotation.degrees(), (90 * n) % 360);
        }
    }

    #[test]
    fn test_double_flip_is_identity() {
        let start = TransformState {
            flip_h: false,
            flip_v: true,
            rotation: Rotation::Deg180,
        };
        let h = start
            .applied(TransformOp::FlipHorizontal)
            .applied(TransformOp::FlipHorizontal);
        assert_eq!(h, start);
        let v = start
            .applied(TransformOp::FlipVertical)
            .applied(TransformOp::FlipVertical);
        assert_eq!(v, start);
    }

    #[test]
    fn test_flip_and_rotation_are_independent() {
        let state = TransformState::identity()
            .applied(TransformOp::Rotate)
            .applied(TransformOp::FlipHorizontal);
        assert_eq!(state.rotation, Rotation::Deg90);
        assert!(state.flip_h);

        let rotated = state.applied(TransformOp::Rotate);
        assert!(rotated.flip_h);
        assert!(!rotated.flip_v);
    }

    #[test]
    fn test_reset() {
        let state = TransformState::identity()
            .applied(TransformOp::Rotate)
            .applied(TransformOp::FlipVertical)
            .applied(TransformOp::Reset);
        assert!(state.is_identity());
    }

    #[test]
    fn test_rotation_serde_rejects_odd_angles() {
        let ok: TransformState =
            serde_json::from_str(r#"{"flipH":true,"flipV":false,"rotation":270}"#).unwrap();
        assert_eq!(ok.rotation, Rotation::Deg270);
        let bad = serde_json::from_str::<TransformState>(
            r#"{"flipH":true,"flipV":false,"rotation":45}"#,
        );
        assert!(bad.is_err());
    }
}
