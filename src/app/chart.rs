// ============================================================================
// Séries du graphique
// ============================================================================
// Construit un graphique à deux séries (historique + prévision) :
//
// 1. Historique tronqué aux 100 derniers points (affichage uniquement)
// 2. Labels X = dates historiques tronquées + dates futures
// 3. Historique = prix tronqués puis un "trou" par point futur
// 4. Prévision  = un trou par point historique puis les prévisions,
//    sauf la dernière position historique qui reçoit le dernier prix réel
//    pour que les deux courbes se rejoignent
//
// La vue est remplacée entièrement à chaque prédiction.
// ============================================================================

use tracing::warn;

use crate::models::PredictionResponse;

/// Nombre maximum de points historiques affichés
pub const DISPLAY_LIMIT: usize = 100;

/// Nombre maximum de labels sur l'axe X
pub const MAX_X_LABELS: usize = 8;

/// Données prêtes à tracer
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub ticker: String,
    /// Labels de l'axe X (historique tronqué + futur)
    pub labels: Vec<String>,
    /// Série "Historical" (None = pas de point)
    pub historical: Vec<Option<f64>>,
    /// Série "Forecast" (None = pas de point)
    pub forecast: Vec<Option<f64>>,
}

impl From<&PredictionResponse> for ChartSeries {
    fn from(response: &PredictionResponse) -> Self {
        // Les tranches sont alignées sur la plus courte des deux séries
        // si le serveur renvoie des longueurs différentes
        if !response.is_aligned() {
            warn!(
                ticker = %response.ticker,
                dates = response.dates.len(),
                prices = response.actual_prices.len(),
                future_dates = response.future_dates.len(),
                future_prices = response.future_predictions.len(),
                "Misaligned prediction series, truncating to the shortest"
            );
        }
        let history_len = response.dates.len().min(response.actual_prices.len());
        let future_len = response.future_dates.len().min(response.future_predictions.len());

        let start = history_len.saturating_sub(DISPLAY_LIMIT);
        let dates = &response.dates[start..history_len];
        let prices = &response.actual_prices[start..history_len];
        let future_dates = &response.future_dates[..future_len];
        let future_prices = &response.future_predictions[..future_len];

        let labels: Vec<String> = dates.iter().chain(future_dates.iter()).cloned().collect();

        let historical: Vec<Option<f64>> = prices
            .iter()
            .copied()
            .map(Some)
            .chain(std::iter::repeat(None).take(future_len))
            .collect();

        let mut forecast: Vec<Option<f64>> = std::iter::repeat(None)
            .take(prices.len())
            .chain(future_prices.iter().copied().map(Some))
            .collect();

        // Raccord à la frontière
        if let Some(&last_actual) = prices.last() {
            forecast[prices.len() - 1] = Some(last_actual);
        }

        Self {
            ticker: response.ticker.clone(),
            labels,
            historical,
            forecast,
        }
    }
}

impl ChartSeries {
    /// Points (x, y) d'une série, sans les trous
    pub fn points(series: &[Option<f64>]) -> Vec<(f64, f64)> {
        series
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
            .collect()
    }

    /// Bornes Y (min, max) sur les deux séries
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.historical
            .iter()
            .chain(self.forecast.iter())
            .flatten()
            .fold(None, |acc, &y| match acc {
                None => Some((y, y)),
                Some((min, max)) => Some((f64::min(min, y), f64::max(max, y))),
            })
    }

    /// Labels de l'axe X, sous-échantillonnés à `max` au plus
    ///
    /// Le premier et le dernier label sont toujours conservés.
    pub fn axis_labels(&self, max: usize) -> Vec<&str> {
        let n = self.labels.len();
        if n <= max || max < 2 {
            return self.labels.iter().take(max).map(String::as_str).collect();
        }
        (0..max)
            .map(|k| {
                let index = (k * (n - 1) + (max - 1) / 2) / (max - 1);
                self.labels[index].as_str()
            })
            .collect()
    }

    /// Dernière valeur de la prévision
    pub fn forecast_end(&self) -> Option<f64> {
        self.forecast.iter().rev().flatten().next().copied()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response(dates: usize, future: usize) -> PredictionResponse {
        let json = serde_json::json!({
            "ticker": "AAPL",
            "dates": (1..=dates).map(|i| format!("d{}", i)).collect::<Vec<_>>(),
            "actual_prices": (0..dates).map(|i| 10.0 + i as f64).collect::<Vec<_>>(),
            "future_dates": (dates + 1..=dates + future).map(|i| format!("d{}", i)).collect::<Vec<_>>(),
            "future_predictions": (0..future).map(|i| 10.0 + (dates + i) as f64).collect::<Vec<_>>(),
            "analysis": {"current_price": 1.0, "recommendation": "HOLD", "color": "gray",
                         "rsi": 50.0, "signals": []},
            "metrics": {"rmse": 1.0}
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_scenario_five_plus_two() {
        let series = ChartSeries::from(&response(5, 2));
        assert_eq!(series.labels.len(), 7);
        assert_eq!(
            series.historical,
            vec![Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(14.0), None, None]
        );
        assert_eq!(
            series.forecast,
            vec![None, None, None, None, Some(14.0), Some(15.0), Some(16.0)]
        );
    }

    #[test]
    fn test_truncates_history_to_display_limit() {
        let series = ChartSeries::from(&response(250, 5));
        assert_eq!(series.labels.len(), DISPLAY_LIMIT + 5);
        assert_eq!(series.labels[0], "d151");
        // Valeur à la frontière = dernier prix historique, exactement
        assert_eq!(series.forecast[DISPLAY_LIMIT - 1], series.historical[DISPLAY_LIMIT - 1]);
        assert_eq!(series.forecast[DISPLAY_LIMIT - 1], Some(259.0));
    }

    #[test]
    fn test_label_count_invariant() {
        for (dates, future) in [(0, 3), (1, 0), (99, 1), (100, 10), (101, 30)] {
            let series = ChartSeries::from(&response(dates, future));
            assert_eq!(series.labels.len(), dates.min(DISPLAY_LIMIT) + future);
            assert_eq!(series.historical.len(), series.labels.len());
            assert_eq!(series.forecast.len(), series.labels.len());
        }
    }

    #[test]
    fn test_misaligned_series_truncated() {
        let mut misaligned = response(4, 3);
        misaligned.actual_prices.pop();
        misaligned.future_dates.pop();
        assert!(!misaligned.is_aligned());

        let series = ChartSeries::from(&misaligned);
        assert_eq!(series.labels, vec!["d1", "d2", "d3", "d5", "d6"]);
        assert_eq!(series.forecast_end(), Some(15.0));
    }

    #[test]
    fn test_points_skip_gaps() {
        let series = ChartSeries::from(&response(2, 2));
        assert_eq!(ChartSeries::points(&series.forecast), vec![(1.0, 11.0), (2.0, 12.0), (3.0, 13.0)]);
        assert_eq!(series.y_bounds(), Some((10.0, 13.0)));
        assert_eq!(series.forecast_end(), Some(13.0));
    }

    #[test]
    fn test_axis_labels_downsampled() {
        let series = ChartSeries::from(&response(100, 5));
        let labels = series.axis_labels(MAX_X_LABELS);
        assert_eq!(labels.len(), MAX_X_LABELS);
        assert_eq!(labels[0], "d1");
        assert_eq!(labels[MAX_X_LABELS - 1], "d105");

        let short = ChartSeries::from(&response(3, 1));
        assert_eq!(short.axis_labels(MAX_X_LABELS), vec!["d1", "d2", "d3", "d4"]);
    }
}
