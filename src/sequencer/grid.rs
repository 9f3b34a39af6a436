use crate::pipeline::effects::EffectParams;

use super::{Layout, SequencerError};

// one slot per (track, step); Some = a plant lives here
#[derive(Clone, Debug)]
pub struct Grid {
    layout: Layout,
    cells: Vec<Option<EffectParams>>,
    occupied: usize,
}

impl Grid {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            cells: vec![None; layout.capacity()],
            occupied: 0,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn index(&self, track: usize, step: usize) -> Result<usize, SequencerError> {
        if track >= self.layout.n_tracks || step >= self.layout.n_steps {
            return Err(SequencerError::CellOutOfRange { track, step });
        }
        Ok(track * self.layout.n_steps + step)
    }

    pub fn is_occupied(&self, track: usize, step: usize) -> bool {
        self.get(track, step).is_some()
    }

    pub fn get(&self, track: usize, step: usize) -> Option<&EffectParams> {
        let idx = self.index(track, step).ok()?;
        self.cells[idx].as_ref()
    }

    pub fn get_mut(&mut self, track: usize, step: usize) -> Option<&mut EffectParams> {
        let idx = self.index(track, step).ok()?;
        self.cells[idx].as_mut()
    }

    // returns what was there before
    pub fn put(
        &mut self,
        track: usize,
        step: usize,
        value: Option<EffectParams>,
    ) -> Result<Option<EffectParams>, SequencerError> {
        let idx = self.index(track, step)?;
        let previous = std::mem::replace(&mut self.cells[idx], value);
        match (previous.is_some(), self.cells[idx].is_some()) {
            (false, true) => self.occupied += 1,
            (true, false) => self.occupied -= 1,
            _ => {}
        }
        Ok(previous)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.occupied = 0;
    }

    /// Occupied cells in track-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize, &EffectParams)> + '_ {
        let n_steps = self.layout.n_steps;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_ref().map(|p| (i / n_steps, i % n_steps, p)))
    }

    pub fn free_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n_steps = self.layout.n_steps;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(move |(i, _)| (i / n_steps, i % n_steps))
    }
}
