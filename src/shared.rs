// Types shared by the TUI and the middle layer.
//
// The TUI turns key presses into semantic `InputEvent`s and draws whatever
// `DisplayState` the middle layer hands it each frame. Everything stateful
// (grid, transport, open garden, explore carousel) lives in the middle layer.
//
// Garden page keys:
//   Space         TogglePlay
//   arrows        MoveCursor
//   Enter         ToggleCell (plant or dig up at cursor)
//   r             RandomPlant
//   [ / ]         AdjustTempo(-5 / +5)
//   - / =         AdjustScale, plant under cursor
//   , / .         AdjustDrive, plant under cursor
//   b             ToggleCrush, plant under cursor
//   s             Save
//   n             BeginRename
//   Tab           TogglePage
//   Esc           Quit
//
// Explore page keys:
//   Left / Right  ScrollCarousel
//   /             BeginSearch
//   Enter         OpenCentered
//   R             ReloadExplore
//   Tab           TogglePage
//
// While a text entry is open, printable keys become TextInput and
// Enter / Backspace / Esc become TextSubmit / TextBackspace / TextCancel.

pub const TEMPO_STEP: i32 = 5;
pub const SCALE_STEP: f32 = 0.1;
pub const DRIVE_STEP: f32 = 0.1;
pub const BEATS_PER_BAR: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Garden,
    Explore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEntry {
    Rename,
    Search,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    TogglePlay,
    MoveCursor { tracks: i32, steps: i32 },
    ToggleCell,
    RandomPlant,
    AdjustTempo(i32),

    // plant editor
    AdjustScale(f32),
    AdjustDrive(f32),
    ToggleCrush,

    Save,
    BeginRename,
    BeginSearch,
    TextInput(char),
    TextBackspace,
    TextSubmit,
    TextCancel,

    TogglePage,
    ScrollCarousel(i32), // one card step, negative = left
    OpenCentered,
    ReloadExplore,

    Resize { width: u16, height: u16 },
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellView {
    pub track: usize,
    pub step: usize,
    pub shade: usize,
    pub lift: f32,
    pub edited: bool, // has non-default effect params
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorView {
    pub scale: f32,
    pub drive: f32,
    pub crush: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub x: f64,
    pub name: String,
    pub owner: String,
    pub plants: usize,
    pub created: String,
    pub centred: bool,
    pub open: bool, // the garden currently loaded
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayState {
    pub page: Page,
    pub playing: bool,
    pub bpm: u32,
    pub garden_name: String,
    pub owner: String,
    pub n_tracks: usize,
    pub n_steps: usize,
    pub track_labels: Vec<String>, // pitch per track, top row first
    pub current_step: usize,
    pub cells: Vec<CellView>,
    pub cursor: (usize, usize),
    pub cursor_pitch: String,
    pub cursor_position: String, // bar.beat
    pub editor: Option<EditorView>, // plant under the cursor
    pub samples_loaded: usize,
    pub entry: Option<(TextEntry, String)>,
    pub search_term: String,
    pub cards: Vec<CardView>,
    pub card_width: u16,
    pub message: Option<String>,
}

/// `bar.beat` for a step, both 1-based.
pub fn bar_beat(step: usize) -> String {
    format!("{}.{}", step / BEATS_PER_BAR + 1, step % BEATS_PER_BAR + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_beat_is_one_based() {
        assert_eq!(bar_beat(0), "1.1");
        assert_eq!(bar_beat(5), "2.2");
        assert_eq!(bar_beat(15), "4.4");
    }
}
