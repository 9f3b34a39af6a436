use std::ops::AddAssign;

// one stereo frame, laid out like an interleaved pair of f32s
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    pub fn scaled(self, gain: f32) -> Self {
        Self {
            left: self.left * gain,
            right: self.right * gain,
        }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            left: self.left + (other.left - self.left) * t,
            right: self.right + (other.right - self.right) * t,
        }
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

impl AddAssign for StereoFrame {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}
