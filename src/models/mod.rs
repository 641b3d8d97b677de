// ============================================================================
// Module : models
// ============================================================================
// Contient toutes les structures de données échangées avec le serveur
// ============================================================================

pub mod chat;
pub mod market;
pub mod prediction;
pub mod settings;

// Re-exports pour simplifier les imports
// Au lieu de : use crate::models::market::TickerSummaryItem;
// On peut faire : use crate::models::TickerSummaryItem;
pub use chat::{ChatReply, ChatRequest, ChatRole, ChatTurn, ModelOption, Provider};
pub use market::{SearchResult, TickerSummaryItem};
pub use prediction::{
    Analysis, Metrics, ModelType, PredictionRequest, PredictionResponse, PredictionSummary,
    StockContext,
};
pub use settings::{SettingsStatus, SettingsUpdate};

// ============================================================================
// Formatage monétaire
// ============================================================================

/// Formate un montant en dollars US : `$1,234.56`, `-$3.10`
///
/// Même rendu que `Intl.NumberFormat('en-US', { style: 'currency' })`,
/// utilisé pour les prix, la SMA-50, l'axe Y et la légende du graphique.
pub fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    // Groupe les milliers par 3 depuis la droite
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(14.0), "$14.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-3.1), "-$3.10");
        assert_eq!(format_currency(-0.001), "$0.00");
    }
}
