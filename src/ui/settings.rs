// ============================================================================
// Settings - Popup des clés API
// ============================================================================
// Popup centrée dessinée par-dessus le dashboard (Clear efface la zone).
// Les clés saisies sont masquées ; le statut ne montre que des booléens.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::settings::{SettingsField, Tier};
use crate::app::SettingsPanel;

const POPUP_WIDTH: u16 = 64;
const POPUP_HEIGHT: u16 = 13;

/// Zone centrée de taille fixe (réduite si le terminal est trop petit)
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Success => Color::Green,
        Tier::Warning => Color::Yellow,
        Tier::Error => Color::Red,
        Tier::Info => Color::Cyan,
    }
}

/// Ligne "libellé : ••••" pour un champ de clé
fn key_line<'a>(label: &'a str, value: &str, configured: Option<bool>, active: bool) -> Line<'a> {
    let badge = match configured {
        Some(true) => Span::styled(" [configured]", Style::default().fg(Color::Green)),
        Some(false) => Span::styled(" [not set]", Style::default().fg(Color::DarkGray)),
        None => Span::raw(""),
    };
    let label_style = if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut spans = vec![
        Span::styled(label, label_style),
        badge,
        Span::raw(": "),
        Span::styled("•".repeat(value.chars().count()), Style::default().fg(Color::White)),
    ];
    if active {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    Line::from(spans)
}

pub fn render_settings(frame: &mut Frame, panel: &SettingsPanel, area: Rect) {
    let popup = centered(area, POPUP_WIDTH, POPUP_HEIGHT);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Settings: API Keys ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Clé OpenAI
            Constraint::Length(1), // Clé Gemini
            Constraint::Length(1),
            Constraint::Min(2),    // Message
            Constraint::Length(1), // Aide
        ])
        .split(inner);

    let status = panel.status;
    frame.render_widget(
        Paragraph::new(key_line(
            "OpenAI API key",
            &panel.openai_key,
            status.map(|s| s.openai_configured),
            panel.field == SettingsField::Openai,
        )),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(key_line(
            "Gemini API key",
            &panel.gemini_key,
            status.map(|s| s.gemini_configured),
            panel.field == SettingsField::Gemini,
        )),
        chunks[1],
    );

    if let Some(message) = &panel.message {
        let paragraph = Paragraph::new(Span::styled(
            message.text.as_str(),
            Style::default().fg(tier_color(message.tier)),
        ))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[3]);
    }

    let help = Line::from(vec![
        Span::styled("[Tab]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Switch  "),
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(if panel.saving { " Saving...  " } else { " Save  " }),
        Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Close"),
    ]);
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), chunks[4]);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn draw(panel: &SettingsPanel) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render_settings(frame, panel, frame.size()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_keys_are_masked() {
        let mut panel = SettingsPanel::new(Duration::from_millis(1500));
        panel.open();
        for c in "sk-secret".chars() {
            panel.push_char(c);
        }
        let screen = draw(&panel);
        assert!(!screen.contains("sk-secret"));
        assert!(screen.contains("•••••••••"));
    }

    #[test]
    fn test_centered_popup_fits_small_terminal() {
        let popup = centered(Rect::new(0, 0, 40, 10), POPUP_WIDTH, POPUP_HEIGHT);
        assert_eq!(popup, Rect::new(0, 0, 40, 10));
    }
}
