// ============================================================================
// Vue des résultats
// ============================================================================
// Projection pure d'une PredictionResponse vers les champs affichés :
// recommandation (badge coloré), RSI, SMA-50, RMSE, prix actuel,
// prix prévu en fin d'horizon, fenêtre de la prévision et liste des signaux.
//
// Une SMA-50 à 0 signifie "pas assez d'historique" : affichée N/A.
// ============================================================================

use ratatui::style::Color;

use crate::models::{format_currency, PredictionResponse, PredictionSummary};

/// Marqueur affiché quand une valeur n'est pas disponible
pub const NOT_AVAILABLE: &str = "N/A";

/// Opacité du halo du badge (0x40 / 0xFF, comme un suffixe "#rrggbb40")
const GLOW_ALPHA: u8 = 0x40;

/// Style du badge de recommandation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    /// Couleur de la bordure et du texte
    pub color: Color,
    /// Couleur du halo : la couleur à opacité fixe sur fond noir
    pub glow: Color,
}

impl BadgeStyle {
    pub fn from_css(css: &str) -> Self {
        let (r, g, b) = parse_css_color(css);
        Self {
            color: Color::Rgb(r, g, b),
            glow: Color::Rgb(apply_alpha(r), apply_alpha(g), apply_alpha(b)),
        }
    }
}

fn apply_alpha(channel: u8) -> u8 {
    ((channel as u16 * GLOW_ALPHA as u16) / 0xFF) as u8
}

/// Convertit une couleur CSS (nom ou "#rrggbb") en RGB
///
/// Couvre les noms émis par le serveur ; toute autre valeur donne du gris.
pub fn parse_css_color(css: &str) -> (u8, u8, u8) {
    let css = css.trim().to_ascii_lowercase();

    if let Some(hex) = css.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return (r, g, b);
            }
        }
    }

    match css.as_str() {
        "green" => (0, 128, 0),
        "lightgreen" => (144, 238, 144),
        "red" => (255, 0, 0),
        "orange" => (255, 165, 0),
        "yellow" => (255, 255, 0),
        "white" => (255, 255, 255),
        _ => (128, 128, 128),
    }
}

/// Champs affichés dans le panneau de résultats
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub ticker: String,
    pub model: Option<String>,
    pub recommendation: String,
    pub badge: BadgeStyle,
    pub rsi: String,
    pub sma_50: String,
    pub rmse: String,
    pub current_price: String,
    pub future_price: String,
    /// Date du prix prévu (si fournie par le serveur)
    pub future_date: Option<String>,
    /// Fenêtre de la prévision (ex: "60d look-back → 5d forecast, last close 2026-10-16")
    pub horizon: Option<String>,
    /// Liste complète, dans l'ordre du serveur
    pub signals: Vec<String>,
}

/// Décrit la fenêtre d'entrée et l'horizon à partir du résumé serveur
fn horizon_label(summary: &PredictionSummary) -> Option<String> {
    let window = match (summary.look_back, summary.forecast_days) {
        (Some(back), Some(days)) => Some(format!("{}d look-back → {}d forecast", back, days)),
        (Some(back), None) => Some(format!("{}d look-back", back)),
        (None, Some(days)) => Some(format!("{}d forecast", days)),
        (None, None) => None,
    };
    let last_close = summary.last_date.as_ref().map(|d| format!("last close {}", d));

    let parts: Vec<String> = window.into_iter().chain(last_close).collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

impl From<&PredictionResponse> for ResultsView {
    fn from(response: &PredictionResponse) -> Self {
        let analysis = &response.analysis;
        let summary = response.summary.as_ref();

        Self {
            ticker: response.ticker.clone(),
            model: response.model.clone(),
            recommendation: analysis.recommendation.clone(),
            badge: BadgeStyle::from_css(&analysis.color),
            rsi: format!("{:.2}", analysis.rsi),
            sma_50: analysis
                .sma_50
                .filter(|v| *v != 0.0)
                .map(format_currency)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            rmse: format!("{:.2}", response.metrics.rmse),
            current_price: format_currency(analysis.current_price),
            future_price: response
                .terminal_price()
                .map(format_currency)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            future_date: summary
                .and_then(|s| s.last_predicted_date.clone())
                .or_else(|| response.future_dates.last().cloned()),
            horizon: summary.and_then(horizon_label),
            signals: analysis.signals.clone(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response(sma_50: &str, summary: &str) -> PredictionResponse {
        let json = format!(
            r#"{{
                "ticker": "NVDA", "model": "gru",
                "dates": ["d1"], "actual_prices": [1200.5],
                "future_dates": ["d2", "d3"], "future_predictions": [1210.0, 1225.129],
                "analysis": {{"current_price": 1200.5, "recommendation": "STRONG BUY",
                              "color": "green", "rsi": 28.4567, "sma_50": {},
                              "signals": ["RSI is Oversold (Buy Signal)", "Price is above 50-day SMA (Uptrend)"]}},
                "metrics": {{"rmse": 3.14159}}
                {}
            }}"#,
            sma_50, summary
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_projection() {
        let view = ResultsView::from(&response(
            "1100.0",
            r#", "summary": {"last_predicted_price": 1225.129, "last_predicted_date": "2026-10-24"}"#,
        ));
        assert_eq!(view.recommendation, "STRONG BUY");
        assert_eq!(view.rsi, "28.46");
        assert_eq!(view.sma_50, "$1,100.00");
        assert_eq!(view.rmse, "3.14");
        assert_eq!(view.current_price, "$1,200.50");
        assert_eq!(view.future_price, "$1,225.13");
        assert_eq!(view.future_date.as_deref(), Some("2026-10-24"));
        assert_eq!(view.signals.len(), 2);
        assert_eq!(view.badge.color, Color::Rgb(0, 128, 0));
    }

    #[test]
    fn test_missing_sma_and_summary() {
        let view = ResultsView::from(&response("null", ""));
        assert_eq!(view.sma_50, NOT_AVAILABLE);
        assert_eq!(view.future_price, "$1,225.13");
        assert_eq!(view.future_date.as_deref(), Some("d3"));
        assert_eq!(view.horizon, None);
    }

    #[test]
    fn test_zero_sma_is_not_available() {
        let view = ResultsView::from(&response("0.0", ""));
        assert_eq!(view.sma_50, NOT_AVAILABLE);
    }

    #[test]
    fn test_horizon_from_summary() {
        let view = ResultsView::from(&response(
            "null",
            r#", "summary": {"last_predicted_price": 1225.129, "last_date": "2026-10-16",
                              "look_back": 60, "forecast_days": 5}"#,
        ));
        assert_eq!(
            view.horizon.as_deref(),
            Some("60d look-back → 5d forecast, last close 2026-10-16")
        );

        let partial = ResultsView::from(&response(
            "null",
            r#", "summary": {"last_predicted_price": 1225.129, "forecast_days": 7}"#,
        ));
        assert_eq!(partial.horizon.as_deref(), Some("7d forecast"));
    }

    #[test]
    fn test_css_colors() {
        assert_eq!(parse_css_color("orange"), (255, 165, 0));
        assert_eq!(parse_css_color("#22C55E"), (0x22, 0xc5, 0x5e));
        assert_eq!(parse_css_color("chartreuse-ish"), (128, 128, 128));
        assert_eq!(parse_css_color("#zz0000"), (128, 128, 128));
    }

    #[test]
    fn test_glow_is_dimmed_color() {
        let badge = BadgeStyle::from_css("#ff0000");
        assert_eq!(badge.glow, Color::Rgb(0x40, 0, 0));
    }
}
