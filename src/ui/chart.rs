// ============================================================================
// Chart - Graphique historique + prévision
// ============================================================================
// Deux séries sur le même axe X :
// - "Historical" (bleu) : prix réels
// - "Forecast" (vert) : prévisions, raccordées au dernier prix réel
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : une série par couleur
// 3. Axis : labels X sous-échantillonnés, labels Y en dollars
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::chart::MAX_X_LABELS;
use crate::app::ChartSeries;
use crate::models::format_currency;

const HISTORICAL_COLOR: Color = Color::Rgb(59, 130, 246);
const FORECAST_COLOR: Color = Color::Rgb(16, 185, 129);

/// Dessine le graphique de la dernière prédiction
pub fn render_chart(frame: &mut Frame, series: Option<&ChartSeries>, area: Rect) {
    let Some(series) = series else {
        render_no_data(frame, area, "No prediction yet");
        return;
    };

    let historical = ChartSeries::points(&series.historical);
    let forecast = ChartSeries::points(&series.forecast);

    let Some((min_price, max_price)) = series.y_bounds() else {
        render_no_data(frame, area, &format!("No data to display for {}", series.ticker));
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Graphique
            Constraint::Length(1), // Légende
        ])
        .split(area);

    // Marge de 5% pour que le graphique respire
    let margin = ((max_price - min_price) * 0.05).max(0.01);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let datasets = vec![
        Dataset::default()
            .name("Historical")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(HISTORICAL_COLOR))
            .data(&historical),
        Dataset::default()
            .name("Forecast")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(FORECAST_COLOR))
            .data(&forecast),
    ];

    let x_labels: Vec<Span> = series
        .axis_labels(MAX_X_LABELS)
        .into_iter()
        .map(Span::raw)
        .collect();

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, series.labels.len().saturating_sub(1).max(1) as f64])
        .labels(x_labels);

    let y_axis = Axis::default()
        .title("Price ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_currency(y_min)),
            Span::raw(format_currency((y_min + y_max) / 2.0)),
            Span::raw(format_currency(y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} Price Prediction ", series.ticker)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, chunks[0]);
    render_legend(frame, series, chunks[1]);
}

/// Légende : dernier prix réel et fin de la prévision, en dollars
fn render_legend(frame: &mut Frame, series: &ChartSeries, area: Rect) {
    let last_actual = series.historical.iter().rev().flatten().next().copied();
    let value = |v: Option<f64>| v.map(format_currency).unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled("━ Historical ", Style::default().fg(HISTORICAL_COLOR).add_modifier(Modifier::BOLD)),
        Span::raw(value(last_actual)),
        Span::raw("    "),
        Span::styled("━ Forecast ", Style::default().fg(FORECAST_COLOR).add_modifier(Modifier::BOLD)),
        Span::raw(value(series.forecast_end())),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn draw(series: Option<&ChartSeries>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| render_chart(frame, series, frame.size()))
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
    fn test_render_placeholder_without_series() {
        assert!(draw(None).contains("No prediction yet"));
    }

    #[test]
    fn test_render_legend_values() {
        let series = ChartSeries {
            ticker: "AAPL".to_string(),
            labels: vec!["d1".into(), "d2".into(), "d3".into()],
            historical: vec![Some(100.0), Some(1250.5), None],
            forecast: vec![None, Some(1250.5), Some(1300.0)],
        };
        let screen = draw(Some(&series));
        assert!(screen.contains("AAPL Price Prediction"));
        assert!(screen.contains("$1,250.50"));
        assert!(screen.contains("$1,300.00"));
    }
}
