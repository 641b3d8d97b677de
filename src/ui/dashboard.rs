// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Ordre de dessin : les panneaux de base, puis les overlays (liste
// déroulante, popup des paramètres) qui effacent leur zone avec Clear.
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List, Clear)
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::market::MARKET_FAILURE_PLACEHOLDER;
use crate::app::{App, Focus, MarketRows, ResultsView};
use crate::ui::layout::{self, Regions, MAX_DROPDOWN_ROWS};
use crate::ui::{chart, chat, settings};

/// Dessine l'interface complète
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application (lecture seule)
pub fn render(frame: &mut Frame, app: &App) {
    let regions = layout::compute(frame.size(), app);

    render_header(frame, regions.header);
    render_market(frame, app, &regions);
    render_form(frame, app, &regions);
    render_status(frame, app, regions.status);
    render_results(frame, app.results.as_ref(), regions.results);
    chart::render_chart(frame, app.chart.as_ref(), regions.chart);
    chat::render_chat(frame, app, &regions);
    render_footer(frame, app, regions.footer);

    // Overlays
    if let Some(area) = regions.dropdown {
        render_dropdown(frame, app, area);
    }
    if app.settings.open {
        settings::render_settings(frame, &app.settings, frame.size());
    }
}

// ============================================================================
// Helpers de style
// ============================================================================

/// Bordure d'un panneau, mise en évidence s'il a le focus
pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { Color::Yellow } else { Color::Cyan };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn key_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Champ de saisie : libellé, valeur, curseur si actif
fn input_spans<'a>(label: &'a str, value: &'a str, focused: bool) -> Vec<Span<'a>> {
    let value_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(label, Style::default().fg(Color::Cyan)),
        Span::styled(value, value_style),
    ];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    spans
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Stockcast ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "AI Stock Price Prediction",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Market Watch
// ============================================================================

/// Deux lignes par ticker : symbole et prix, puis la variation
/// (verte si positive, rouge sinon)
fn render_market(frame: &mut Frame, app: &App, regions: &Regions) {
    let area = regions.market;
    let focused = app.focus == Focus::Market;
    let block = panel_block(" Market Watch ", focused);

    let items = match &app.market.rows {
        MarketRows::Loading => {
            let paragraph = Paragraph::new(Span::styled("Loading...", Style::default().fg(Color::Gray)))
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }
        MarketRows::Failed => {
            let paragraph = Paragraph::new(Span::styled(
                MARKET_FAILURE_PLACEHOLDER,
                Style::default().fg(Color::Red),
            ))
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }
        MarketRows::Loaded(items) => items,
    };

    // Le prix est aligné à droite sur la largeur intérieure
    let width = layout::inner(area).width as usize;
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let color = if item.is_positive() { Color::Green } else { Color::Red };
            let ticker = format!("{:<10}", item.ticker);
            let price_width = width.saturating_sub(ticker.chars().count());
            let heading = Line::from(vec![
                Span::styled(ticker, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("{:>w$}", item.price_label(), w = price_width),
                    Style::default().fg(Color::White),
                ),
            ]);
            let change = Line::from(Span::styled(
                format!("  {}", item.change_label()),
                Style::default().fg(color),
            ));
            ListItem::new(vec![heading, change])
        })
        .collect();

    let highlight = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let list = List::new(list_items).block(block).highlight_style(highlight);

    // Même défilement que la résolution des clics
    let mut state = ListState::default()
        .with_selected(Some(app.market.selected))
        .with_offset(regions.market_offset);
    frame.render_stateful_widget(list, area, &mut state);
}

// ============================================================================
// Formulaire de prédiction
// ============================================================================

fn render_form(frame: &mut Frame, app: &App, regions: &Regions) {
    let form = &app.form;
    let focus = app.focus;
    let block = panel_block(
        " Predict ",
        matches!(focus, Focus::Ticker | Focus::LookBack | Focus::ForecastDays | Focus::Model),
    );

    let ticker_line = Line::from(input_spans("Ticker:    ", &app.autocomplete.input, focus == Focus::Ticker));

    let mut params = input_spans("Look-back: ", &form.look_back, focus == Focus::LookBack);
    params.push(Span::raw("   "));
    params.extend(input_spans("Forecast days: ", &form.forecast_days, focus == Focus::ForecastDays));

    let model_style = if focus == Focus::Model {
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    // Bouton désactivé pendant le chargement
    let button = if form.is_loading() {
        Span::styled("[ Predicting... ]", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[ Predict ]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    };
    let model_line = Line::from(vec![
        Span::styled("Model:     ", Style::default().fg(Color::Cyan)),
        Span::styled(format!("◀ {} ▶", form.model.label()), model_style),
        Span::raw("   "),
        button,
    ]);

    let paragraph = Paragraph::new(vec![ticker_line, Line::from(params), model_line]).block(block);
    frame.render_widget(paragraph, regions.form);
}

/// Ligne d'état : erreur (rouge) ou chargement
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(error) = &app.form.error {
        Line::from(Span::styled(
            format!(" ⚠ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if app.form.is_loading() {
        Line::from(Span::styled(
            " Fetching data and training model...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

// ============================================================================
// Résultats
// ============================================================================

fn render_results(frame: &mut Frame, results: Option<&ResultsView>, area: Rect) {
    let Some(view) = results else {
        let paragraph = Paragraph::new(Span::styled(
            "Enter a ticker and press Enter to run a prediction.",
            Style::default().fg(Color::Gray),
        ))
        .block(panel_block(" Results ", false))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let label = Style::default().fg(Color::Cyan);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    // Badge : texte et bordure dans la couleur du serveur, halo en fond
    let badge = Span::styled(
        format!(" {} ", view.recommendation),
        Style::default()
            .fg(view.badge.color)
            .bg(view.badge.glow)
            .add_modifier(Modifier::BOLD),
    );

    let predicted_label = match &view.future_date {
        Some(date) => format!("Predicted ({}): ", date),
        None => "Predicted: ".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![Span::styled("Recommendation: ", label), badge]),
        Line::from(vec![
            Span::styled("Current: ", label),
            Span::styled(view.current_price.as_str(), value),
            Span::raw("   "),
            Span::styled(predicted_label, label),
            Span::styled(view.future_price.as_str(), value),
        ]),
    ];
    if let Some(horizon) = &view.horizon {
        lines.push(Line::from(Span::styled(horizon.as_str(), Style::default().fg(Color::Gray))));
    }
    lines.extend([
        Line::from(vec![
            Span::styled("RSI: ", label),
            Span::styled(view.rsi.as_str(), value),
            Span::raw("   "),
            Span::styled("SMA-50: ", label),
            Span::styled(view.sma_50.as_str(), value),
            Span::raw("   "),
            Span::styled("RMSE: ", label),
            Span::styled(view.rmse.as_str(), value),
        ]),
        Line::from(Span::styled("Signals:", label)),
    ]);
    lines.extend(
        view.signals
            .iter()
            .map(|signal| Line::from(format!("  • {}", signal))),
    );

    let title = match &view.model {
        Some(model) => format!(" Results: {} ({}) ", view.ticker, model),
        None => format!(" Results: {} ", view.ticker),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(view.badge.color))
        .title(title);

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Liste déroulante de l'autocomplétion
// ============================================================================

/// Une ligne par suggestion, dans l'ordre de `Regions::dropdown_row_at`
fn render_dropdown(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .autocomplete
        .suggestions
        .iter()
        .take(MAX_DROPDOWN_ROWS as usize)
        .enumerate()
        .map(|(index, suggestion)| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<10}", suggestion.symbol),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(suggestion.name.as_str(), Style::default().fg(Color::Gray)),
                Span::styled(format!(" ({})", suggestion.exchange), Style::default().fg(Color::DarkGray)),
            ]);
            let mut item = ListItem::new(line);
            if app.autocomplete.highlighted == Some(index) {
                item = item.style(Style::default().add_modifier(Modifier::REVERSED));
            }
            item
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    frame.render_widget(Clear, area);
    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", key_style()),
            Span::styled(
                "[Ctrl+C]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(" again to quit, or any other key to cancel ⚠", key_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Tab]", key_style()),
            Span::raw(" Focus  "),
            Span::styled("[Enter]", key_style()),
            Span::raw(" Submit  "),
            Span::styled("[↑↓]", key_style()),
            Span::raw(" Navigate  "),
            Span::styled("[F2]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Settings  "),
            Span::styled("[F3]", key_style()),
            Span::raw(" Provider  "),
            Span::styled("[F4]", key_style()),
            Span::raw(" Model  "),
            Span::styled("[Ctrl+C]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(shortcuts).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::config::Config;
    use crate::models::TickerSummaryItem;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(160, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_initial_screen() {
        let app = App::new(&Config::default());
        let screen = draw(&app);
        assert!(screen.contains("Market Watch"));
        assert!(screen.contains("Loading..."));
        assert!(screen.contains("Predict"));
    }

    #[test]
    fn test_render_market_failure_placeholder() {
        let mut app = App::new(&Config::default());
        app.market.apply(Err("boom".to_string()));
        assert!(draw(&app).contains(MARKET_FAILURE_PLACEHOLDER));
    }

    #[test]
    fn test_render_market_rows() {
        let mut app = App::new(&Config::default());
        app.market.apply(Ok(vec![TickerSummaryItem {
            ticker: "AAPL".to_string(),
            price: 189.5,
            change: 1.2,
            change_pct: 0.64,
        }]));
        let screen = draw(&app);
        assert!(screen.contains("AAPL"));
        assert!(screen.contains("$189.50"));
    }

    fn market_item(ticker: &str, price: f64, change: f64, change_pct: f64) -> TickerSummaryItem {
        TickerSummaryItem {
            ticker: ticker.to_string(),
            price,
            change,
            change_pct,
        }
    }

    #[test]
    fn test_market_rows_fit_panel() {
        let mut app = App::new(&Config::default());
        app.market.apply(Ok(vec![
            market_item("AAPL", 189.5, 1.2, 0.64),
            market_item("BTC-USD", 67234.12, -1234.56, -1.87),
        ]));

        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        let buffer = terminal.backend().buffer();

        let regions = layout::compute(Rect::new(0, 0, 160, 50), &app);
        let inner = layout::inner(regions.market);
        let row_text = |y: u16| -> String {
            (inner.x..inner.right())
                .map(|x| buffer.get(x, y).symbol())
                .collect()
        };
        let row_has_color = |y: u16, color: Color| {
            (inner.x..inner.right()).any(|x| {
                let cell = buffer.get(x, y);
                cell.symbol() != " " && cell.fg == color
            })
        };

        // Variation complète, jamais tronquée par la bordure
        assert!(row_text(inner.y).contains("$189.50"));
        assert!(row_text(inner.y + 1).contains("+1.20 (+0.64%)"));
        assert!(row_has_color(inner.y + 1, Color::Green));
        assert!(row_text(inner.y + 2).contains("$67234.12"));
        assert!(row_text(inner.y + 3).contains("-1234.56 (-1.87%)"));
        assert!(row_has_color(inner.y + 3, Color::Red));

        // Une entrée par item, rien en dessous
        let drawn = (inner.y..inner.bottom())
            .filter(|&y| !row_text(y).trim().is_empty())
            .count();
        assert_eq!(drawn, app.market.items().len() * layout::MARKET_ITEM_HEIGHT as usize);
    }

    #[test]
    fn test_market_scrolls_to_selection() {
        let mut app = App::new(&Config::default());
        let items = (0..30).map(|i| market_item(&format!("TK{}", i), 10.0, 0.5, 5.0)).collect();
        app.market.apply(Ok(items));
        app.market.selected = 29;

        let screen = draw(&app);
        assert!(screen.contains("TK29"));
        assert!(!screen.contains("TK8 "));
    }

    #[test]
    fn test_render_results_horizon() {
        let mut app = App::new(&Config::default());
        let response: crate::models::PredictionResponse = serde_json::from_str(
            r#"{
                "ticker": "AAPL", "model": "lstm",
                "dates": ["2026-10-15", "2026-10-16"], "actual_prices": [10.0, 11.0],
                "future_dates": ["2026-10-19"], "future_predictions": [12.5],
                "analysis": {"current_price": 11.0, "recommendation": "BUY", "color": "lightgreen",
                             "rsi": 55.0, "sma_50": 0.0, "signals": []},
                "metrics": {"rmse": 0.43},
                "summary": {"last_predicted_price": 12.5, "last_date": "2026-10-16",
                            "look_back": 60, "forecast_days": 1}
            }"#,
        )
        .unwrap();
        app.results = Some(ResultsView::from(&response));

        let screen = draw(&app);
        assert!(screen.contains("60d look-back → 1d forecast, last close 2026-10-16"));
        assert!(screen.contains("SMA-50: N/A"));
    }

    #[test]
    fn test_render_settings_popup() {
        let mut app = App::new(&Config::default());
        app.open_settings();
        assert!(draw(&app).contains("Settings: API Keys"));
    }
}
