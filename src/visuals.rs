// Plant sprites for the garden view: one per placed plant, plus the little
// jump a plant does when its note plays.

use std::collections::HashMap;

use crate::sequencer::{Layout, VisualError, VisualFeedback, NOTES_PER_OCTAVE};

pub const BLOOM_FRAMES: u32 = 20;
pub const JUMP_HEIGHT: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub height: f32, // taller for higher notes
    pub shade: usize, // 0..7, by note name
    bloom: Option<u32>, // frames into the current jump
}

impl Sprite {
    fn for_cell(layout: &Layout, track: usize) -> Self {
        let note_pos = (layout.n_tracks - 1).saturating_sub(track);
        Self {
            height: 0.5 + (note_pos as f32 / layout.n_tracks as f32) * 3.0,
            shade: note_pos % NOTES_PER_OCTAVE,
            bloom: None,
        }
    }

    pub fn is_blooming(&self) -> bool {
        self.bloom.is_some()
    }

    /// Vertical offset from the jump: a half sine over `BLOOM_FRAMES`.
    pub fn lift(&self) -> f32 {
        match self.bloom {
            Some(frame) => {
                let progress = frame as f32 / BLOOM_FRAMES as f32;
                (progress * std::f32::consts::PI).sin() * JUMP_HEIGHT
            }
            None => 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlantSprites {
    layout: Layout,
    sprites: HashMap<(usize, usize), Sprite>,
}

impl PlantSprites {
    pub fn new(layout: Layout) -> Self {
        Self { layout, sprites: HashMap::new() }
    }

    pub fn spawn(&mut self, track: usize, step: usize) {
        let sprite = Sprite::for_cell(&self.layout, track);
        self.sprites.entry((track, step)).or_insert(sprite);
    }

    pub fn remove(&mut self, track: usize, step: usize) -> bool {
        self.sprites.remove(&(track, step)).is_some()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn get(&self, track: usize, step: usize) -> Option<&Sprite> {
        self.sprites.get(&(track, step))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Moves every running jump on by one frame; finished jumps land.
    pub fn advance_frame(&mut self) {
        for sprite in self.sprites.values_mut() {
            if let Some(frame) = sprite.bloom {
                sprite.bloom = (frame + 1 < BLOOM_FRAMES).then_some(frame + 1);
            }
        }
    }
}

impl VisualFeedback for PlantSprites {
    fn play_placement_animation(&mut self, track: usize, step: usize) -> Result<(), VisualError> {
        let sprite = self
            .sprites
            .get_mut(&(track, step))
            .ok_or(VisualError::MissingPlant { track, step })?;
        sprite.bloom = Some(0); // retrigger restarts the jump
        Ok(())
    }
}
