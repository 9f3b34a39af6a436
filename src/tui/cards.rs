use crate::shared::{CardView, DisplayState};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

const CARD_HEIGHT: u16 = 7;
const MIN_VISIBLE: u16 = 3; // narrower slivers aren't worth drawing

// the explore carousel: every card the middle layer says is in view
pub fn draw_cards(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let title = if state.search_term.is_empty() {
        " explore ".to_string()
    } else {
        format!(" explore: {} ", state.search_term)
    };
    let block = Block::bordered().title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let row = Rect {
        y: inner.y + inner.height.saturating_sub(CARD_HEIGHT) / 2,
        height: CARD_HEIGHT.min(inner.height),
        ..inner
    };
    for card in &state.cards {
        if let Some(rect) = card_rect(row, card.x, state.card_width) {
            draw_card(frame, rect, card);
        }
    }
}

// where a card at viewport offset `x` lands, clipped to the row
pub fn card_rect(row: Rect, x: f64, width: u16) -> Option<Rect> {
    let left = x.round() as i32;
    let right = left + width as i32;
    let clipped_left = left.max(0);
    let clipped_right = right.min(row.width as i32);
    if clipped_right - clipped_left < MIN_VISIBLE as i32 {
        return None;
    }
    Some(Rect {
        x: row.x + clipped_left as u16,
        width: (clipped_right - clipped_left) as u16,
        ..row
    })
}

fn draw_card(frame: &mut Frame, rect: Rect, card: &CardView) {
    let border = match (card.centred, card.open) {
        (true, _) => Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::Green),
        (false, false) => Style::default().fg(Color::DarkGray),
    };
    let block = Block::bordered().border_style(border);
    let body = vec![
        Line::styled(card.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::from(format!("by {}", card.owner)),
        Line::from(format!("{} plants", card.plants)),
        Line::styled(card.created.clone(), Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(body).block(block), rect);
}
