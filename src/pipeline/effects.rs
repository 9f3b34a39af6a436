// per-plant audio parameters, edited from the plant editor

use serde::{Deserialize, Serialize};

use crate::audio::EffectSpec;

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 2.0;
pub const CRUSH_LEVELS: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    pub scale: f32, // plant size, doubles as gain
    pub drive: f32, // 0.0 to 1.0, 0 = no distortion
    pub crush: Option<u32>, // bitcrusher levels when enabled
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            drive: 0.0,
            crush: None,
        }
    }
}

impl EffectParams {
    pub fn gain(&self) -> f32 {
        (self.scale * 0.8).clamp(0.0, 1.5)
    }

    pub fn adjust_scale(&mut self, delta: f32) {
        self.scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn adjust_drive(&mut self, delta: f32) {
        self.drive = (self.drive + delta).clamp(0.0, 1.0);
    }

    pub fn toggle_crush(&mut self) {
        self.crush = match self.crush {
            Some(_) => None,
            None => Some(CRUSH_LEVELS),
        };
    }

    // ordered chain handed to the engine; distortion before the crusher
    pub fn effect_chain(&self) -> Vec<EffectSpec> {
        let mut chain = Vec::new();
        if self.drive > 0.0 {
            chain.push(EffectSpec::Distortion { drive: self.drive });
        }
        if let Some(levels) = self.crush {
            chain.push(EffectSpec::Bitcrusher { levels });
        }
        chain
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
