// The middle layer: owns the sequencer, its transport and capabilities, the
// open garden and the explore carousel. The TUI sends it `InputEvent`s and
// renders its `DisplayState`; the engine gets the `AudioCommand`s it returns.

use rand::rngs::StdRng;

use crate::audio::SamplerBridge;
use crate::audio_api::AudioCommand;
use crate::carousel::{Carousel, FilterOutcome, RebuildOutcome};
use crate::config::GardenConfig;
use crate::pipeline::effects::EffectParams;
use crate::pipeline::garden::{Garden, GardenSummary};
use crate::pipeline::store::{GardenStore, StoreError};
use crate::sequencer::{
    pitch_for_track, ClockTransport, Layout, Sequencer, SequencerError, Subdivision, Transport,
};
use crate::shared::{
    bar_beat, CardView, CellView, DisplayState, EditorView, InputEvent, Page, TextEntry,
};
use crate::visuals::PlantSprites;

const DEFAULT_VIEWPORT: f64 = 80.0;

pub struct Middle {
    config: GardenConfig,
    sequencer: Sequencer,
    transport: ClockTransport,
    sprites: PlantSprites,
    bridge: SamplerBridge,
    store: GardenStore,
    garden: Garden,
    explore: Carousel<GardenSummary>,
    rng: StdRng,
    page: Page,
    cursor: (usize, usize), // (track, step)
    entry: Option<(TextEntry, String)>,
    search_term: String,
    viewport_width: f64,
    message: Option<String>,
}

impl Middle {
    /// Opens the most recent garden in the store, or plants a fresh one.
    pub fn new(
        config: GardenConfig,
        store: GardenStore,
        bridge: SamplerBridge,
        rng: StdRng,
    ) -> Result<Self, StoreError> {
        let layout = Layout::default();
        let recent = store.recent(1)?.into_iter().next();
        let is_new = recent.is_none();
        let garden = match recent {
            Some(garden) => garden,
            None => store.create(&config.owner, "")?,
        };
        let mut middle = Self {
            explore: Carousel::new(config.carousel),
            config,
            sequencer: Sequencer::new(layout),
            transport: ClockTransport::default(),
            sprites: PlantSprites::new(layout),
            bridge,
            store,
            garden: garden.clone(),
            rng,
            page: Page::Garden,
            cursor: (layout.n_tracks - 1, 0),
            entry: None,
            search_term: String::new(),
            viewport_width: DEFAULT_VIEWPORT,
            message: None,
        };
        middle.transport.schedule_repeat(Subdivision::Sixteenth);
        middle.load_garden(garden);
        if is_new {
            middle.seed_plants();
            middle.save()?;
        }
        Ok(middle)
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn transport(&self) -> &ClockTransport {
        &self.transport
    }

    pub fn explore(&self) -> &Carousel<GardenSummary> {
        &self.explore
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Writes the grid and tempo back to the open garden's document.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let plants = Garden::plants_from(&self.sequencer);
        let tempo = self.transport.bpm().round() as u32;
        self.garden = self.store.update(self.garden.id, plants, tempo)?;
        Ok(())
    }

    // swap the open garden: stopped transport, fresh playhead, new cells
    fn load_garden(&mut self, garden: Garden) -> Vec<AudioCommand> {
        self.transport.stop();
        self.sequencer.reset();
        self.sprites.clear();
        let loaded = self.sequencer.load_cells(garden.cells());
        for (track, step, _) in self.sequencer.occupied_cells() {
            self.sprites.spawn(track, step);
        }
        self.sequencer.set_tempo(&mut self.transport, garden.tempo as f32);
        log::info!("opened garden {} ({:?}), {loaded} plants", garden.id, garden.name);
        self.garden = garden;
        vec![AudioCommand::Silence]
    }

    fn seed_plants(&mut self) {
        for _ in 0..self.config.seed_plants {
            match self.sequencer.place_random_note(&mut self.rng) {
                Ok((track, step)) => self.sprites.spawn(track, step),
                Err(e) => {
                    log::debug!("stopped seeding: {e}");
                    break;
                }
            }
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        match event {
            InputEvent::TogglePlay => {
                if self.transport.is_running() {
                    self.transport.pause();
                } else {
                    self.transport.start();
                }
            }
            InputEvent::MoveCursor { tracks, steps } => self.move_cursor(tracks, steps),
            InputEvent::ToggleCell => self.toggle_cell(),
            InputEvent::RandomPlant => match self.sequencer.place_random_note(&mut self.rng) {
                Ok((track, step)) => {
                    self.sprites.spawn(track, step);
                    let pitch = pitch_for_track(self.sequencer.layout(), track);
                    self.message = Some(format!("Planted {pitch} at {}", bar_beat(step)));
                }
                Err(SequencerError::GridFull) => {
                    self.message = Some("The garden is full".to_string());
                }
                Err(e) => self.message = Some(e.to_string()),
            },
            InputEvent::AdjustTempo(delta) => {
                let bpm = self.transport.bpm() + delta as f32;
                self.sequencer.set_tempo(&mut self.transport, bpm);
            }
            InputEvent::AdjustScale(delta) => self.edit_plant(|p| p.adjust_scale(delta)),
            InputEvent::AdjustDrive(delta) => self.edit_plant(|p| p.adjust_drive(delta)),
            InputEvent::ToggleCrush => self.edit_plant(|p| p.toggle_crush()),
            InputEvent::Save => {
                self.message = Some(match self.save() {
                    Ok(()) => format!("Saved {}", self.garden.name),
                    Err(e) => {
                        log::error!("save failed: {e}");
                        format!("Save failed: {e}")
                    }
                });
            }
            InputEvent::BeginRename => {
                if self.page == Page::Garden {
                    self.entry = Some((TextEntry::Rename, self.garden.name.clone()));
                }
            }
            InputEvent::BeginSearch => {
                if self.page == Page::Explore {
                    self.entry = Some((TextEntry::Search, self.search_term.clone()));
                }
            }
            InputEvent::TextInput(c) => {
                if let Some((_, text)) = self.entry.as_mut() {
                    text.push(c);
                }
            }
            InputEvent::TextBackspace => {
                if let Some((_, text)) = self.entry.as_mut() {
                    text.pop();
                }
            }
            InputEvent::TextCancel => self.entry = None,
            InputEvent::TextSubmit => self.submit_entry(),
            InputEvent::TogglePage => {
                self.entry = None;
                self.page = match self.page {
                    Page::Garden => {
                        self.reload_explore();
                        Page::Explore
                    }
                    Page::Explore => Page::Garden,
                };
            }
            InputEvent::ScrollCarousel(direction) => {
                self.explore.on_scroll_input(direction as f64);
            }
            InputEvent::OpenCentered => return self.open_centered(),
            InputEvent::ReloadExplore => self.reload_explore(),
            InputEvent::Resize { width, .. } => {
                self.viewport_width = width as f64;
                self.explore.resize(self.viewport_width);
            }
            InputEvent::Quit => {}
        }
        self.bridge.drain()
    }

    /// One UI frame: runs the transport, the blooms and the carousel, and
    /// returns whatever the sequencer queued for the engine.
    pub fn tick(&mut self, elapsed: f64) -> Vec<AudioCommand> {
        let Self { sequencer, transport, bridge, sprites, .. } = self;
        transport.advance(elapsed, |time| {
            sequencer.on_tick(time, &mut *bridge, &mut *sprites);
        });
        self.sprites.advance_frame();
        self.explore.frame(elapsed);
        self.bridge.drain()
    }

    fn move_cursor(&mut self, tracks: i32, steps: i32) {
        let layout = *self.sequencer.layout();
        let (track, step) = self.cursor;
        let track = (track as i64 + tracks as i64).clamp(0, layout.n_tracks as i64 - 1);
        // steps wrap, the garden is a circle
        let step = (step as i64 + steps as i64).rem_euclid(layout.n_steps as i64);
        self.cursor = (track as usize, step as usize);
    }

    fn toggle_cell(&mut self) {
        let (track, step) = self.cursor;
        let on = !self.sequencer.is_occupied(track, step);
        match self.sequencer.set_cell(track, step, on) {
            Ok(()) if on => self.sprites.spawn(track, step),
            Ok(()) => {
                self.sprites.remove(track, step);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn edit_plant(&mut self, edit: impl FnOnce(&mut EffectParams)) {
        let (track, step) = self.cursor;
        match self.sequencer.params_mut(track, step) {
            Some(params) => edit(params),
            None => self.message = Some("No plant here".to_string()),
        }
    }

    fn submit_entry(&mut self) {
        let Some((kind, text)) = self.entry.take() else {
            return;
        };
        match kind {
            TextEntry::Rename => match self.store.rename(self.garden.id, &text) {
                Ok(renamed) => {
                    self.garden.name = renamed.name;
                    self.garden.last_modified = renamed.last_modified;
                    self.message = Some(format!("Renamed to {}", self.garden.name));
                }
                Err(StoreError::EmptyName) => {
                    self.message = Some("Garden name cannot be empty".to_string());
                }
                Err(e) => {
                    log::error!("rename failed: {e}");
                    self.message = Some(format!("Rename failed: {e}"));
                }
            },
            TextEntry::Search => self.apply_search(&text),
        }
    }

    fn reload_explore(&mut self) {
        let summaries = match self.store.search("") {
            Ok(summaries) => summaries,
            Err(e) => {
                log::error!("listing gardens failed: {e}");
                self.message = Some(format!("Could not list gardens: {e}"));
                return;
            }
        };
        if self.explore.rebuild(summaries, self.viewport_width) == RebuildOutcome::Empty {
            self.message = Some("No gardens yet".to_string());
            return;
        }
        if !self.search_term.is_empty() {
            let term = self.search_term.clone();
            self.apply_search(&term);
        }
    }

    fn apply_search(&mut self, term: &str) {
        self.search_term = term.trim().to_string();
        if self.search_term.is_empty() {
            self.explore.clear_filter();
            self.message = None;
            return;
        }
        let term = self.search_term.clone();
        self.message = Some(match self.explore.apply_filter(|s| s.matches(&term)) {
            FilterOutcome::Matches(n) => format!("{n} gardens match {term:?}"),
            FilterOutcome::NoResults => "No gardens found".to_string(),
        });
    }

    fn open_centered(&mut self) -> Vec<AudioCommand> {
        let Some(id) = self
            .explore
            .centered_item()
            .and_then(|i| self.explore.item(i))
            .map(|s| s.id)
        else {
            return Vec::new();
        };
        if let Err(e) = self.save() {
            log::warn!("could not save {} before switching: {e}", self.garden.id);
        }
        match self.store.get(id) {
            Ok(garden) => {
                let cmds = self.load_garden(garden);
                self.page = Page::Garden;
                self.cursor = (self.sequencer.layout().n_tracks - 1, 0);
                self.message = Some(format!("Opened {}", self.garden.name));
                cmds
            }
            Err(e) => {
                self.message = Some(format!("Could not open garden: {e}"));
                Vec::new()
            }
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let layout = *self.sequencer.layout();
        let cells = self
            .sequencer
            .grid()
            .occupied_cells()
            .map(|(track, step, params)| {
                let (shade, lift) = self
                    .sprites
                    .get(track, step)
                    .map(|s| (s.shade, s.lift()))
                    .unwrap_or_default();
                CellView { track, step, shade, lift, edited: !params.is_default() }
            })
            .collect();
        let (track, step) = self.cursor;
        let editor = self.sequencer.grid().get(track, step).map(|p| EditorView {
            scale: p.scale,
            drive: p.drive,
            crush: p.crush,
        });
        DisplayState {
            page: self.page,
            playing: self.transport.is_running(),
            bpm: self.transport.bpm().round() as u32,
            garden_name: self.garden.name.clone(),
            owner: self.garden.owner.clone(),
            n_tracks: layout.n_tracks,
            n_steps: layout.n_steps,
            track_labels: (0..layout.n_tracks)
                .map(|t| pitch_for_track(&layout, t).to_string())
                .collect(),
            current_step: self.sequencer.current_step(),
            cells,
            cursor: self.cursor,
            cursor_pitch: pitch_for_track(&layout, track).to_string(),
            cursor_position: bar_beat(step),
            editor,
            samples_loaded: self.bridge.sampler().roots().count(),
            entry: self.entry.clone(),
            search_term: self.search_term.clone(),
            cards: self.cards(),
            card_width: self.config.carousel.card_width as u16,
            message: self.message.clone(),
        }
    }

    fn cards(&self) -> Vec<CardView> {
        let centred = self.explore.centered_index();
        self.explore
            .visible_slots()
            .into_iter()
            .filter_map(|placed| {
                let summary = self.explore.item(placed.slot.item)?;
                Some(CardView {
                    x: placed.x,
                    name: summary.name.clone(),
                    owner: summary.owner.clone(),
                    plants: summary.plants_count,
                    created: summary.created_at.format("%Y-%m-%d").to_string(),
                    centred: centred == Some(placed.index),
                    open: summary.id == self.garden.id,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SampleId, Sampler};
    use crate::pipeline::garden::Plant;
    use crate::sequencer::{NoteName, Pitch};
    use rand::SeedableRng;

    fn bridge() -> SamplerBridge {
        let mut sampler = Sampler::new();
        sampler.add(Pitch::new(NoteName::C, 1), SampleId::next());
        SamplerBridge::new(sampler)
    }

    fn middle_in(dir: &std::path::Path, seed_plants: usize) -> Middle {
        let config = GardenConfig { seed_plants, ..Default::default() };
        let store = GardenStore::open(dir).unwrap();
        Middle::new(config, store, bridge(), StdRng::seed_from_u64(3)).unwrap()
    }

    fn triggers(cmds: &[AudioCommand]) -> usize {
        cmds.iter().filter(|c| matches!(c, AudioCommand::Trigger(_))).count()
    }

    #[test]
    fn new_project_gets_a_seeded_saved_garden() {
        let dir = tempfile::tempdir().unwrap();
        let middle = middle_in(dir.path(), 5);
        assert_eq!(middle.sequencer().grid().occupied_count(), 5);
        let store = GardenStore::open(dir.path()).unwrap();
        let saved = store.get(middle.garden().id).unwrap();
        assert_eq!(saved.plants.len(), 5);
        assert_eq!(saved.tempo, 80);
    }

    #[test]
    fn reopening_keeps_existing_garden_unseeded() {
        let dir = tempfile::tempdir().unwrap();
        let id = middle_in(dir.path(), 0).garden().id;
        let middle = middle_in(dir.path(), 5);
        assert_eq!(middle.garden().id, id);
        assert_eq!(middle.sequencer().grid().occupied_count(), 0);
    }

    #[test]
    fn toggle_plants_and_digs_up_at_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::ToggleCell);
        let ds = middle.display_state();
        assert_eq!(ds.cursor_pitch, "C1");
        assert_eq!(ds.cells.len(), 1);
        assert!(ds.editor.is_some());
        middle.handle_input(InputEvent::ToggleCell);
        assert!(middle.display_state().cells.is_empty());
    }

    #[test]
    fn playing_triggers_plants_on_the_playhead() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::ToggleCell); // C1 at step 0
        assert!(middle.tick(1.0).is_empty(), "paused transport must not play");

        middle.handle_input(InputEvent::TogglePlay);
        let cmds = middle.tick(0.01);
        assert_eq!(triggers(&cmds), 1);
        assert_eq!(middle.sequencer().current_step(), 1);
        assert!(middle.display_state().cells[0].lift >= 0.0);
    }

    #[test]
    fn cursor_clamps_tracks_and_wraps_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::MoveCursor { tracks: 5, steps: -1 });
        let ds = middle.display_state();
        assert_eq!(ds.cursor, (27, 15));
        assert_eq!(ds.cursor_position, "4.4");
    }

    #[test]
    fn tempo_stays_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        for _ in 0..100 {
            middle.handle_input(InputEvent::AdjustTempo(5));
        }
        assert_eq!(middle.display_state().bpm, 240);
        for _ in 0..100 {
            middle.handle_input(InputEvent::AdjustTempo(-5));
        }
        assert_eq!(middle.display_state().bpm, 20);
    }

    #[test]
    fn editor_needs_a_plant() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::ToggleCrush);
        assert_eq!(middle.message(), Some("No plant here"));
        middle.handle_input(InputEvent::ToggleCell);
        middle.handle_input(InputEvent::ToggleCrush);
        middle.handle_input(InputEvent::AdjustDrive(0.5));
        let editor = middle.display_state().editor.unwrap();
        assert!(editor.crush.is_some());
        assert_eq!(editor.drive, 0.5);
    }

    #[test]
    fn blank_rename_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        let before = middle.garden().name.clone();
        middle.handle_input(InputEvent::BeginRename);
        for _ in 0..before.len() {
            middle.handle_input(InputEvent::TextBackspace);
        }
        middle.handle_input(InputEvent::TextInput(' '));
        middle.handle_input(InputEvent::TextSubmit);
        assert_eq!(middle.message(), Some("Garden name cannot be empty"));
        assert_eq!(middle.garden().name, before);

        middle.handle_input(InputEvent::BeginRename);
        for c in "!".chars() {
            middle.handle_input(InputEvent::TextInput(c));
        }
        middle.handle_input(InputEvent::TextSubmit);
        assert_eq!(middle.garden().name, format!("{before}!"));
    }

    #[test]
    fn full_garden_reports_instead_of_planting() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        let capacity = middle.sequencer().layout().capacity();
        for _ in 0..capacity {
            middle.handle_input(InputEvent::RandomPlant);
        }
        assert!(middle.sequencer().grid().is_full());
        middle.handle_input(InputEvent::RandomPlant);
        assert_eq!(middle.message(), Some("The garden is full"));
    }

    #[test]
    fn explore_search_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::ToggleCell);
        let home = middle.garden().id;

        let store = GardenStore::open(dir.path()).unwrap();
        let fern = store.create("ana", "Fern Hollow").unwrap();
        store
            .update(fern.id, vec![Plant { track: 3, step: 9, params: None }], 120)
            .unwrap();

        middle.handle_input(InputEvent::TogglePage);
        assert_eq!(middle.page(), Page::Explore);
        assert_eq!(middle.explore().visible_count(), 2);

        middle.handle_input(InputEvent::BeginSearch);
        for c in "zzz".chars() {
            middle.handle_input(InputEvent::TextInput(c));
        }
        middle.handle_input(InputEvent::TextSubmit);
        assert_eq!(middle.message(), Some("No gardens found"));
        assert!(middle.display_state().cards.is_empty());

        middle.handle_input(InputEvent::BeginSearch);
        for _ in 0..3 {
            middle.handle_input(InputEvent::TextBackspace);
        }
        for c in "FERN".chars() {
            middle.handle_input(InputEvent::TextInput(c));
        }
        middle.handle_input(InputEvent::TextSubmit);
        assert_eq!(middle.explore().visible_count(), 1);

        let cmds = middle.handle_input(InputEvent::OpenCentered);
        assert!(matches!(cmds.as_slice(), [AudioCommand::Silence]));
        assert_eq!(middle.page(), Page::Garden);
        assert_eq!(middle.garden().id, fern.id);
        assert!(middle.sequencer().is_occupied(3, 9));
        assert!(!middle.transport().is_running());
        assert_eq!(middle.display_state().bpm, 120);

        // the garden we left was saved on the way out
        assert_eq!(store.get(home).unwrap().plants.len(), 1);
    }

    #[test]
    fn highlight_sits_under_the_viewport_centre() {
        let dir = tempfile::tempdir().unwrap();
        let mut middle = middle_in(dir.path(), 0);
        middle.handle_input(InputEvent::Resize { width: 78, height: 24 });
        middle.handle_input(InputEvent::TogglePage);

        let ds = middle.display_state();
        let centred: Vec<_> = ds.cards.iter().filter(|c| c.centred).collect();
        assert_eq!(centred.len(), 1);
        let card = centred[0];
        assert!(card.x <= 39.0 && 39.0 < card.x + 26.0, "centred card at x={}", card.x);
    }
}
