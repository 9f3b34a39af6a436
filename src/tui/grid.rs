use std::ops::Range;

use crate::shared::{CellView, DisplayState};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

const LABEL_WIDTH: usize = 4; // "C1  "

// one colour per note name, C through B
const SHADES: [Color; 7] = [
    Color::LightGreen,
    Color::Green,
    Color::LightCyan,
    Color::Cyan,
    Color::LightYellow,
    Color::Yellow,
    Color::LightMagenta,
];

// tracks are rows (highest note on top), steps are columns
pub fn draw_garden_grid(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let block = Block::bordered().title(format!(" {} ", state.garden_name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cell_width = ((inner.width as usize).saturating_sub(LABEL_WIDTH) / state.n_steps.max(1)).clamp(1, 4);
    let mut lines = grid_lines(state, cell_width, blink_on);
    // the ruler stays pinned under whichever tracks fit
    let ruler = lines.pop();
    let rows = (inner.height as usize).saturating_sub(1);
    let window = visible_tracks(state.n_tracks, rows, state.cursor.0);
    let mut shown: Vec<Line> = lines.drain(window).collect();
    shown.extend(ruler);
    frame.render_widget(Paragraph::new(shown), inner);
}

/// Tracks that fit in `rows`, centred on the cursor track where possible.
pub fn visible_tracks(n_tracks: usize, rows: usize, cursor_track: usize) -> Range<usize> {
    if rows >= n_tracks {
        return 0..n_tracks;
    }
    let start = cursor_track.saturating_sub(rows / 2).min(n_tracks - rows);
    start..start + rows
}

pub fn grid_lines(state: &DisplayState, cell_width: usize, blink_on: bool) -> Vec<Line<'static>> {
    let mut cells: Vec<Option<&CellView>> = vec![None; state.n_tracks * state.n_steps];
    for cell in &state.cells {
        if let Some(slot) = cells.get_mut(cell.track * state.n_steps + cell.step) {
            *slot = Some(cell);
        }
    }

    let mut lines = Vec::with_capacity(state.n_tracks + 1);
    for track in 0..state.n_tracks {
        let label = state.track_labels.get(track).cloned().unwrap_or_default();
        let mut spans = vec![Span::styled(
            format!("{label:<width$}", width = LABEL_WIDTH),
            Style::default().fg(Color::DarkGray),
        )];
        for step in 0..state.n_steps {
            let cell = cells[track * state.n_steps + step];
            let (glyph, mut style) = match cell {
                Some(c) => (plant_glyph(c), Style::default().fg(SHADES[c.shade % SHADES.len()])),
                None => ("·", Style::default().fg(Color::DarkGray)),
            };
            if step == state.current_step && state.playing {
                style = style.bg(Color::Rgb(40, 40, 40));
            }
            if (track, step) == state.cursor && blink_on {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("{glyph:^cell_width$}"), style));
        }
        lines.push(Line::from(spans));
    }
    lines.push(step_ruler(state, cell_width));
    lines
}

fn plant_glyph(cell: &CellView) -> &'static str {
    if cell.lift > 0.75 {
        "✿"
    } else if cell.lift > 0.0 {
        "❀"
    } else if cell.edited {
        "♣"
    } else {
        "♠"
    }
}

// beat numbers under the grid, with the playhead marked
fn step_ruler(state: &DisplayState, cell_width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for step in 0..state.n_steps {
        let text = if step == state.current_step && state.playing {
            "▲".to_string()
        } else {
            format!("{}", step % 4 + 1)
        };
        let style = if step % 4 == 0 {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{text:^cell_width$}"), style));
    }
    Line::from(spans)
}
