// ============================================================================
// Formulaire de prédiction
// ============================================================================
// State machine par soumission :
//
//   Idle → Validating → Loading → {Success, Failed} → Idle
//
// - Validating : ticker vide → message de validation, aucun appel réseau
// - Loading : bouton désactivé (pas de double soumission)
// - Fin (succès ou échec) : retour à Idle dans tous les cas
//
// Chaque requête porte un numéro de séquence : une réponse qui n'est pas
// celle de la dernière requête émise est ignorée.
// ============================================================================

use tracing::{debug, info, warn};

use crate::models::{ModelType, PredictionRequest, PredictionResponse};

/// Message affiché quand le ticker est vide
pub const EMPTY_TICKER_MESSAGE: &str = "Please enter a stock ticker.";

/// Phase courante du formulaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPhase {
    Idle,
    /// Requête `seq` en vol
    Loading { seq: u64 },
}

/// Champ du formulaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    LookBack,
    ForecastDays,
}

#[derive(Debug, Clone)]
pub struct PredictionForm {
    /// Fenêtre historique (saisie brute, chiffres uniquement)
    pub look_back: String,

    /// Horizon de prévision (saisie brute)
    pub forecast_days: String,

    /// Modèle demandé
    pub model: ModelType,

    pub phase: PredictionPhase,

    /// Erreur affichée (validation ou serveur)
    pub error: Option<String>,

    last_seq: u64,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            look_back: "60".to_string(),
            forecast_days: "5".to_string(),
            model: ModelType::default(),
            phase: PredictionPhase::Idle,
            error: None,
            last_seq: 0,
        }
    }
}

impl PredictionForm {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, PredictionPhase::Loading { .. })
    }

    /// Saisie d'un chiffre dans un champ numérique
    pub fn push_digit(&mut self, field: FormField, c: char) {
        if c.is_ascii_digit() {
            self.field_mut(field).push(c);
        }
    }

    pub fn backspace(&mut self, field: FormField) {
        self.field_mut(field).pop();
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::LookBack => &mut self.look_back,
            FormField::ForecastDays => &mut self.forecast_days,
        }
    }

    /// Soumet le formulaire
    ///
    /// Retourne `Some((seq, requête))` si une requête doit partir.
    /// L'erreur précédente est effacée avant la validation ; l'appelant
    /// cache les résultats précédents.
    pub fn submit(&mut self, ticker: &str) -> Option<(u64, PredictionRequest)> {
        if self.is_loading() {
            debug!("Prediction already in flight, ignoring submit");
            return None;
        }

        self.error = None;

        // Validating
        let ticker = ticker.trim();
        if ticker.is_empty() {
            self.error = Some(EMPTY_TICKER_MESSAGE.to_string());
            return None;
        }

        // Les bornes sont vérifiées par le serveur : on exige seulement
        // des entiers
        let look_back = match self.look_back.trim().parse::<u32>() {
            Ok(v) => v,
            Err(_) => {
                self.error = Some("Look-back window must be a whole number.".to_string());
                return None;
            }
        };
        let forecast_days = match self.forecast_days.trim().parse::<u32>() {
            Ok(v) => v,
            Err(_) => {
                self.error = Some("Forecast days must be a whole number.".to_string());
                return None;
            }
        };

        // Loading
        self.last_seq += 1;
        self.phase = PredictionPhase::Loading { seq: self.last_seq };

        let request = PredictionRequest {
            ticker: ticker.to_string(),
            look_back,
            forecast_days,
            model_type: Some(self.model),
        };
        info!(seq = self.last_seq, ticker = %request.ticker, model = self.model.label(), "Prediction submitted");
        Some((self.last_seq, request))
    }

    /// Termine une requête
    ///
    /// Retourne la réponse si elle doit être affichée (succès de la
    /// dernière requête). Une réponse périmée est ignorée sans toucher
    /// à l'état.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<Box<PredictionResponse>, String>,
    ) -> Option<Box<PredictionResponse>> {
        if seq != self.last_seq {
            debug!(seq, latest = self.last_seq, "Discarding stale prediction response");
            return None;
        }

        // Retour à Idle dans tous les cas (équivalent d'un finally)
        self.phase = PredictionPhase::Idle;

        match result {
            Ok(response) => Some(response),
            Err(message) => {
                warn!(error = %message, "Prediction failed");
                self.error = Some(message);
                None
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> Box<PredictionResponse> {
        let json = r#"{
            "ticker": "AAPL",
            "dates": ["d1"], "actual_prices": [10.0],
            "future_dates": ["d2"], "future_predictions": [11.0],
            "analysis": {"current_price": 10.0, "recommendation": "HOLD", "color": "gray",
                         "rsi": 50.0, "signals": []},
            "metrics": {"rmse": 1.0}
        }"#;
        Box::new(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_empty_ticker_is_rejected() {
        let mut form = PredictionForm::default();
        assert!(form.submit("   ").is_none());
        assert_eq!(form.error.as_deref(), Some(EMPTY_TICKER_MESSAGE));
        assert_eq!(form.phase, PredictionPhase::Idle);
    }

    #[test]
    fn test_submit_builds_trimmed_request() {
        let mut form = PredictionForm::default();
        form.error = Some("old error".to_string());
        let (seq, request) = form.submit("  AAPL ").unwrap();

        assert_eq!(seq, 1);
        assert_eq!(request.ticker, "AAPL");
        assert_eq!(request.look_back, 60);
        assert_eq!(request.forecast_days, 5);
        assert_eq!(request.model_type, Some(ModelType::Lstm));
        assert!(form.error.is_none());
        assert!(form.is_loading());
    }

    #[test]
    fn test_non_integer_fields_are_rejected() {
        let mut form = PredictionForm::default();
        form.look_back.clear();
        assert!(form.submit("AAPL").is_none());
        assert!(form.error.is_some());
        assert!(!form.is_loading());
    }

    #[test]
    fn test_no_duplicate_submission_while_loading() {
        let mut form = PredictionForm::default();
        assert!(form.submit("AAPL").is_some());
        assert!(form.submit("AAPL").is_none());
    }

    #[test]
    fn test_success_returns_to_idle() {
        let mut form = PredictionForm::default();
        let (seq, _) = form.submit("AAPL").unwrap();
        assert!(form.complete(seq, Ok(response())).is_some());
        assert_eq!(form.phase, PredictionPhase::Idle);
        assert!(form.error.is_none());
    }

    #[test]
    fn test_failure_shows_server_message_and_returns_to_idle() {
        let mut form = PredictionForm::default();
        let (seq, _) = form.submit("ZZZZ").unwrap();
        assert!(form.complete(seq, Err("No data found for ZZZZ".to_string())).is_none());
        assert_eq!(form.phase, PredictionPhase::Idle);
        assert_eq!(form.error.as_deref(), Some("No data found for ZZZZ"));
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut form = PredictionForm::default();
        let (first, _) = form.submit("AAPL").unwrap();
        form.complete(first, Err("boom".to_string()));
        let (second, _) = form.submit("MSFT").unwrap();

        // La réponse de la première requête arrive après coup
        assert!(form.complete(first, Ok(response())).is_none());
        assert_eq!(form.phase, PredictionPhase::Loading { seq: second });
    }

    #[test]
    fn test_digit_input_only() {
        let mut form = PredictionForm::default();
        form.push_digit(FormField::ForecastDays, 'x');
        form.push_digit(FormField::ForecastDays, '0');
        assert_eq!(form.forecast_days, "50");
        form.backspace(FormField::LookBack);
        assert_eq!(form.look_back, "6");
    }
}
