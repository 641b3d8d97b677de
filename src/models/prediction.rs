// ============================================================================
// Structures : PredictionRequest, PredictionResponse, StockContext
// ============================================================================
// Contrat de l'endpoint `POST /predict`
//
// CONCEPTS RUST :
// 1. Option<T> + #[serde(default)] : champs absents de la réponse
// 2. skip_serializing_if : ne pas envoyer les champs optionnels vides
// 3. From : conversion d'une réponse en contexte pour le chat
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Enum : ModelType
// ============================================================================

/// Modèles de prévision proposés par le serveur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Réseau récurrent LSTM (défaut côté serveur)
    #[default]
    Lstm,
    Gru,
    Linear,
    RandomForest,
    Xgboost,
}

impl ModelType {
    /// Tous les modèles, dans l'ordre du sélecteur
    pub const ALL: [ModelType; 5] = [
        ModelType::Lstm,
        ModelType::Gru,
        ModelType::Linear,
        ModelType::RandomForest,
        ModelType::Xgboost,
    ];

    /// Libellé affiché dans le formulaire
    pub fn label(&self) -> &'static str {
        match self {
            ModelType::Lstm => "LSTM",
            ModelType::Gru => "GRU",
            ModelType::Linear => "Linear Regression",
            ModelType::RandomForest => "Random Forest",
            ModelType::Xgboost => "XGBoost",
        }
    }

    /// Modèle suivant (cycle)
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Modèle précédent (cycle)
    pub fn previous(&self) -> Self {
        let i = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ============================================================================
// Requête
// ============================================================================

/// Corps de `POST /predict`, construit à neuf à chaque soumission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    /// Ticker non vide, sans espaces autour
    pub ticker: String,
    pub look_back: u32,
    pub forecast_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
}

// ============================================================================
// Réponse
// ============================================================================

/// Analyse technique renvoyée avec la prédiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub current_price: f64,
    /// "STRONG BUY", "BUY", "HOLD", "SELL", "STRONG SELL"
    pub recommendation: String,
    /// Couleur CSS associée (ex: "green", "orange", "#22c55e")
    pub color: String,
    pub rsi: f64,
    /// Absente quand l'historique fait moins de 50 points
    #[serde(default)]
    pub sma_50: Option<f64>,
    #[serde(default)]
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rmse: f64,
}

/// Résumé de la prévision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub last_predicted_price: f64,
    #[serde(default)]
    pub last_predicted_date: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
    #[serde(default)]
    pub look_back: Option<u32>,
    #[serde(default)]
    pub forecast_days: Option<u32>,
}

/// Réponse complète de `POST /predict`
///
/// Invariants attendus du serveur :
/// - `actual_prices.len() == dates.len()`
/// - `future_predictions.len() == future_dates.len()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub ticker: String,
    /// Modèle effectivement utilisé par le serveur
    #[serde(default)]
    pub model: Option<String>,
    pub dates: Vec<String>,
    pub actual_prices: Vec<f64>,
    pub future_dates: Vec<String>,
    pub future_predictions: Vec<f64>,
    pub analysis: Analysis,
    pub metrics: Metrics,
    #[serde(default)]
    pub summary: Option<PredictionSummary>,
}

impl PredictionResponse {
    /// Vérifie l'alignement des séries (dates <-> prix)
    pub fn is_aligned(&self) -> bool {
        self.actual_prices.len() == self.dates.len()
            && self.future_predictions.len() == self.future_dates.len()
    }

    /// Prix prévu au dernier jour de l'horizon
    ///
    /// Utilise `summary.last_predicted_price`, sinon la dernière valeur
    /// de `future_predictions`.
    pub fn terminal_price(&self) -> Option<f64> {
        self.summary
            .as_ref()
            .map(|s| s.last_predicted_price)
            .or_else(|| self.future_predictions.last().copied())
    }
}

// ============================================================================
// Contexte partagé avec le chat
// ============================================================================

/// Contexte boursier courant, envoyé avec chaque message du chat
///
/// Absent avant la première prédiction réussie, puis remplacé
/// (jamais fusionné) par chaque nouvelle prédiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockContext {
    pub ticker: String,
    pub current_price: f64,
    pub recommendation: String,
    pub rsi: f64,
    pub sma_50: Option<f64>,
    pub signals: Vec<String>,
}

impl From<&PredictionResponse> for StockContext {
    fn from(response: &PredictionResponse) -> Self {
        Self {
            ticker: response.ticker.clone(),
            current_price: response.analysis.current_price,
            recommendation: response.analysis.recommendation.clone(),
            rsi: response.analysis.rsi,
            sma_50: response.analysis.sma_50,
            signals: response.analysis.signals.clone(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
