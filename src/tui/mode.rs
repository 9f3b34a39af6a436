use crate::shared::{DisplayState, Page, TextEntry};

// state local to the tui that decides how keys resolve into semantic
// InputEvents; synced from DisplayState once per loop
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub page: Page,
    pub entry: Option<TextEntry>, // text box open, keys are typed into it
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.page = ds.page;
        self.entry = ds.entry.as_ref().map(|(kind, _)| *kind);
    }
}
