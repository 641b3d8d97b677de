// ============================================================================
// Structures : TickerSummaryItem, SearchResult
// ============================================================================
// Données du bandeau "Market Watch" et de l'autocomplétion
// ============================================================================

use serde::{Deserialize, Serialize};

/// Une ligne du résumé de marché (`GET /market-summary`)
///
/// Produite par le serveur, affichée en lecture seule.
/// L'ordre d'affichage est l'ordre renvoyé par le serveur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummaryItem {
    /// Symbole (ex: "AAPL", "BTC-USD", "^GSPC")
    pub ticker: String,

    /// Dernier prix
    pub price: f64,

    /// Variation absolue depuis la clôture précédente
    pub change: f64,

    /// Variation en pourcentage
    pub change_pct: f64,
}

impl TickerSummaryItem {
    /// La variation est-elle positive ? (zéro compte comme positif)
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }

    /// Prix formaté avec 2 décimales : "$189.42"
    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// Variation signée : "+1.23 (+0.65%)" ou "-2.00 (-1.05%)"
    ///
    /// Le signe '+' n'est ajouté que pour les valeurs positives,
    /// le '-' vient du formatage du nombre lui-même.
    pub fn change_label(&self) -> String {
        let sign = if self.is_positive() { "+" } else { "" };
        format!(
            "{}{:.2} ({}{:.2}%)",
            sign, self.change, sign, self.change_pct
        )
    }
}

/// Une suggestion de l'autocomplétion (`GET /search?q=...`)
///
/// Éphémère : la liste est remplacée entièrement à chaque recherche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(change: f64, change_pct: f64) -> TickerSummaryItem {
        TickerSummaryItem {
            ticker: "AAPL".to_string(),
            price: 189.4217,
            change,
            change_pct,
        }
    }

    #[test]
    fn test_labels_positive() {
        let item = item(1.234, 0.651);
        assert!(item.is_positive());
        assert_eq!(item.price_label(), "$189.42");
        assert_eq!(item.change_label(), "+1.23 (+0.65%)");
    }

    #[test]
    fn test_labels_negative() {
        let item = item(-2.0, -1.054);
        assert!(!item.is_positive());
        assert_eq!(item.change_label(), "-2.00 (-1.05%)");
    }

    #[test]
    fn test_zero_is_positive() {
        let item = item(0.0, 0.0);
        assert!(item.is_positive());
        assert_eq!(item.change_label(), "+0.00 (+0.00%)");
    }

    #[test]
    fn test_deserialize_summary() {
        let json = r#"[{"ticker":"MSFT","price":410.5,"change":-1.5,"change_pct":-0.36}]"#;
        let items: Vec<TickerSummaryItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ticker, "MSFT");
        assert!(!items[0].is_positive());
    }
}
