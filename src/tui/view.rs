use crate::shared::{DisplayState, Page, TextEntry};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::cards::draw_cards;
use super::grid::draw_garden_grid;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(8), // garden grid or explore strip
            Constraint::Length(1), // editor / help
            Constraint::Length(1), // status or text box
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    match state.page {
        Page::Garden => {
            draw_garden_grid(frame, sections[1], state, blink_on);
            draw_editor(frame, sections[2], state);
        }
        Page::Explore => {
            draw_cards(frame, sections[1], state);
            draw_help(frame, sections[2], "←/→ scroll  / search  enter open  R reload  tab garden  esc quit");
        }
    }
    draw_status(frame, sections[3], state, blink_on);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (symbol, colour) = if state.playing {
        ("▶ playing", Color::Green)
    } else {
        ("⏸ paused", Color::Yellow)
    };
    let line = Line::from(vec![
        Span::styled(" soundgarden  ", Style::default().fg(Color::LightGreen)),
        Span::styled(format!("{symbol}  "), Style::default().fg(colour)),
        Span::styled(format!("{} bpm  ", state.bpm), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{} by {}  ", state.garden_name, state.owner)),
        Span::styled(
            format!("cursor {} @ {}  ", state.cursor_pitch, state.cursor_position),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} samples", state.samples_loaded),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_editor(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = match &state.editor {
        Some(p) => Line::from(vec![
            Span::styled(" plant  ", Style::default().fg(Color::LightGreen)),
            Span::raw(format!("scale {:.2}  ", p.scale)),
            Span::raw(format!("drive {:.2}  ", p.drive)),
            Span::raw(match p.crush {
                Some(levels) => format!("crush {levels}"),
                None => "crush off".to_string(),
            }),
            Span::styled(
                "   -/= scale  ,/. drive  b crush",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        None => Line::styled(
            " space play  arrows move  enter plant  r random  [/] tempo  s save  n rename  tab explore  esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, area: Rect, text: &'static str) {
    frame.render_widget(
        Paragraph::new(Line::styled(format!(" {text}"), Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let line = match &state.entry {
        Some((kind, text)) => {
            let prompt = match kind {
                TextEntry::Rename => " name: ",
                TextEntry::Search => " search: ",
            };
            let caret = if blink_on { "█" } else { " " };
            Line::from(vec![
                Span::styled(prompt, Style::default().fg(Color::Cyan)),
                Span::raw(format!("{text}{caret}")),
            ])
        }
        None => Line::styled(
            format!(" {}", state.message.as_deref().unwrap_or("")),
            Style::default().fg(Color::Yellow),
        ),
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(state: &DisplayState, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, frame.area(), state, true)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()))
                    .collect()
            })
            .collect()
    }

    fn garden(cursor_track: usize) -> DisplayState {
        DisplayState {
            n_tracks: 28,
            n_steps: 16,
            track_labels: (0..28).map(|t| format!("T{t}")).collect(),
            cursor: (cursor_track, 0),
            ..Default::default()
        }
    }

    fn shows_track(rows: &[String], track: usize) -> bool {
        let label = format!("│T{track} ");
        rows.iter().any(|r| r.contains(&label))
    }

    #[test]
    fn bottom_track_and_ruler_fit_a_small_terminal() {
        let rows = screen(&garden(27), 80, 24);
        assert!(shows_track(&rows, 27));
        assert!(!shows_track(&rows, 0));
        // ruler sits on the last row inside the border
        assert!(rows[20].contains("1   2   3   4"));
    }

    #[test]
    fn window_scrolls_up_with_the_cursor() {
        let rows = screen(&garden(0), 80, 24);
        assert!(shows_track(&rows, 0));
        assert!(!shows_track(&rows, 27));
    }
}
