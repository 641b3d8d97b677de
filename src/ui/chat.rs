// ============================================================================
// Chat - Panneau de conversation
// ============================================================================
// En-tête (fournisseur + modèle), historique défilant, zone de saisie.
//
// L'historique reste calé sur le dernier message : on estime la hauteur
// après retour à la ligne et on fait défiler d'autant.
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::{ChatRole, ChatTurn};
use crate::ui::dashboard::panel_block;
use crate::ui::layout::{inner, Regions};

pub fn render_chat(frame: &mut Frame, app: &App, regions: &Regions) {
    render_chat_header(frame, app, regions.chat_header);
    render_transcript(frame, &app.chat.transcript, regions.transcript);
    render_chat_input(frame, app, regions.chat_input);
}

fn render_chat_header(frame: &mut Frame, app: &App, area: Rect) {
    let model = app
        .chat
        .selected_model()
        .map(|m| m.label.as_str())
        .unwrap_or("-");

    let line = Line::from(vec![
        Span::styled(
            app.chat.provider.label(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" · "),
        Span::styled(model, Style::default().fg(Color::White)),
    ]);

    frame.render_widget(Paragraph::new(line).block(panel_block(" AI Assistant ", false)), area);
}

/// Couleur et préfixe de chaque rôle
fn role_style(role: ChatRole) -> (&'static str, Style) {
    match role {
        ChatRole::User => ("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        ChatRole::Assistant => ("AI", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        ChatRole::System => ("System", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
    }
}

/// Convertit l'historique en lignes (les "\n" du texte deviennent des lignes)
fn transcript_lines(transcript: &[ChatTurn]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for turn in transcript {
        let (prefix, style) = role_style(turn.role);
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(
                format!(" {}", turn.at.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        let text_style = if turn.role == ChatRole::System {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        lines.extend(turn.text.lines().map(|l| Line::from(Span::styled(l, text_style))));
        lines.push(Line::from(""));
    }
    lines
}

/// Hauteur estimée après retour à la ligne
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum::<usize>()
        .min(u16::MAX as usize) as u16
}

fn render_transcript(frame: &mut Frame, transcript: &[ChatTurn], area: Rect) {
    let lines = transcript_lines(transcript);
    let inner = inner(area);

    // Défilement automatique vers le bas
    let scroll = wrapped_height(&lines, inner.width).saturating_sub(inner.height);

    let paragraph = Paragraph::new(lines)
        .block(panel_block(" Conversation ", false))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_chat_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Chat;

    // Saisie désactivée pendant l'envoi
    let line = if app.chat.sending {
        Line::from(Span::styled("Thinking...", Style::default().fg(Color::DarkGray)))
    } else {
        let mut spans = vec![Span::styled(app.chat.input.as_str(), Style::default().fg(Color::White))];
        if focused {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        } else if app.chat.input.is_empty() {
            spans.push(Span::styled("Ask about the stock...", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(panel_block(" Message ", focused)), area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_lines() {
        let transcript = vec![ChatTurn::new(ChatRole::Assistant, "first\nsecond")];
        let lines = transcript_lines(&transcript);
        // en-tête + 2 lignes de texte + séparateur
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("x".repeat(25)), Line::from("")];
        assert_eq!(wrapped_height(&lines, 10), 4);
    }
}
