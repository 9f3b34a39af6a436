/// Step sequencer clock: the plant grid, the playhead, and the per-tick
/// dispatch to sound and visuals.
use rand::Rng;

use crate::pipeline::effects::EffectParams;

pub mod grid;
pub mod pitch;
pub mod transport;

pub use grid::Grid;
pub use pitch::{pitch_for_track, NoteName, Pitch, NOTES_PER_OCTAVE};
pub use transport::{ClockTransport, Subdivision, Transport};

pub const DEFAULT_OCTAVES: usize = 4;
pub const DEFAULT_STEPS: usize = 16; // 4 bars of 4 beats
pub const DEFAULT_BASE_OCTAVE: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub n_tracks: usize,
    pub n_steps: usize,
    pub base_octave: u8,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            n_tracks: NOTES_PER_OCTAVE * DEFAULT_OCTAVES,
            n_steps: DEFAULT_STEPS,
            base_octave: DEFAULT_BASE_OCTAVE,
        }
    }
}

impl Layout {
    pub fn capacity(&self) -> usize {
        self.n_tracks * self.n_steps
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequencerError {
    #[error("cell ({track}, {step}) is outside the grid")]
    CellOutOfRange { track: usize, step: usize },

    #[error("no space left in the garden")]
    GridFull,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("no samples loaded")]
    NoSamples,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisualError {
    #[error("no plant to animate at ({track}, {step})")]
    MissingPlant { track: usize, step: usize },
}

/// Something that can sound a pitch at a transport time.
pub trait NotePlayer {
    fn trigger_note(
        &mut self,
        pitch: Pitch,
        time: f64,
        params: Option<&EffectParams>,
    ) -> Result<(), TriggerError>;
}

/// Purely cosmetic feedback for a triggered cell.
pub trait VisualFeedback {
    fn play_placement_animation(&mut self, track: usize, step: usize) -> Result<(), VisualError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Playhead {
    beats_elapsed: u64,
}

impl Playhead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(beats_elapsed: u64) -> Self {
        Self { beats_elapsed }
    }

    pub fn beats_elapsed(&self) -> u64 {
        self.beats_elapsed
    }

    pub fn current_step(&self, n_steps: usize) -> usize {
        (self.beats_elapsed % n_steps as u64) as usize
    }

    fn advance(&mut self) {
        self.beats_elapsed = self.beats_elapsed.wrapping_add(1);
    }
}

pub struct Sequencer {
    grid: Grid,
    playhead: Playhead,
    current_step: usize,
}

impl Sequencer {
    pub fn new(layout: Layout) -> Self {
        Self {
            grid: Grid::new(layout),
            playhead: Playhead::new(),
            current_step: 0,
        }
    }

    pub fn with_playhead(layout: Layout, playhead: Playhead) -> Self {
        let mut seq = Self::new(layout);
        seq.current_step = playhead.current_step(layout.n_steps);
        seq.playhead = playhead;
        seq
    }

    pub fn layout(&self) -> &Layout {
        self.grid.layout()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn playhead(&self) -> Playhead {
        self.playhead
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_occupied(&self, track: usize, step: usize) -> bool {
        self.grid.is_occupied(track, step)
    }

    /// Sets or clears a cell. Out-of-range coordinates are always rejected
    /// with `CellOutOfRange` and leave the grid untouched. Spawning or
    /// removing the plant's visual is up to the caller.
    pub fn set_cell(&mut self, track: usize, step: usize, on: bool) -> Result<(), SequencerError> {
        if on {
            if self.grid.is_occupied(track, step) {
                return Ok(()); // keep the plant's params
            }
            self.grid.put(track, step, Some(EffectParams::default()))?;
        } else {
            self.grid.put(track, step, None)?;
        }
        Ok(())
    }

    pub fn set_cell_with(
        &mut self,
        track: usize,
        step: usize,
        params: EffectParams,
    ) -> Result<(), SequencerError> {
        self.grid.put(track, step, Some(params)).map(|_| ())
    }

    pub fn params_mut(&mut self, track: usize, step: usize) -> Option<&mut EffectParams> {
        self.grid.get_mut(track, step)
    }

    /// Plants a note on a uniformly random free cell and returns where it went.
    pub fn place_random_note<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<(usize, usize), SequencerError> {
        if self.grid.is_full() {
            return Err(SequencerError::GridFull);
        }
        let layout = *self.grid.layout();
        for _ in 0..layout.capacity() {
            let track = rng.gen_range(0..layout.n_tracks);
            let step = rng.gen_range(0..layout.n_steps);
            if !self.grid.is_occupied(track, step) {
                self.set_cell(track, step, true)?;
                return Ok((track, step));
            }
        }
        // crowded grid: stop guessing and draw from what's left
        let free: Vec<(usize, usize)> = self.grid.free_cells().collect();
        let (track, step) = free[rng.gen_range(0..free.len())];
        self.set_cell(track, step, true)?;
        Ok((track, step))
    }

    /// One transport subdivision. Every plant on the current step sounds and
    /// animates before the playhead moves on; a failing cell is logged and
    /// skipped. Returns how many notes were triggered.
    pub fn on_tick(
        &mut self,
        time: f64,
        player: &mut dyn NotePlayer,
        visuals: &mut dyn VisualFeedback,
    ) -> usize {
        let layout = *self.grid.layout();
        let step = self.current_step;
        let mut triggered = 0;
        for track in 0..layout.n_tracks {
            let Some(params) = self.grid.get(track, step) else {
                continue;
            };
            let pitch = pitch_for_track(&layout, track);
            match player.trigger_note(pitch, time, Some(params)) {
                Ok(()) => triggered += 1,
                Err(e) => log::warn!("skipping {pitch} at ({track}, {step}): {e}"),
            }
            if let Err(e) = visuals.play_placement_animation(track, step) {
                log::debug!("no bloom for ({track}, {step}): {e}");
            }
        }
        self.playhead.advance();
        self.current_step = self.playhead.current_step(layout.n_steps);
        triggered
    }

    pub fn set_tempo(&self, transport: &mut dyn Transport, bpm: f32) {
        transport.set_tempo(bpm);
    }

    pub fn occupied_cells(&self) -> Vec<(usize, usize, EffectParams)> {
        self.grid
            .occupied_cells()
            .map(|(t, s, p)| (t, s, *p))
            .collect()
    }

    /// Replaces the grid contents; invalid cells are logged and dropped.
    pub fn load_cells<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = (usize, usize, Option<EffectParams>)>,
    {
        self.grid.clear();
        let mut loaded = 0;
        for (track, step, params) in cells {
            match self.set_cell_with(track, step, params.unwrap_or_default()) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("dropping saved plant: {e}"),
            }
        }
        loaded
    }

    pub fn reset(&mut self) {
        self.grid.clear();
        self.playhead = Playhead::new();
        self.current_step = 0;
    }
}
