// ============================================================================
// API Client : service de prédiction
// ============================================================================
// Appelle les endpoints REST du serveur de prédiction
//
// CONCEPTS RUST :
// 1. async/await : appels réseau non-bloquants
// 2. Result<T, E> + anyhow : erreurs avec contexte
// 3. Serde : (dé)sérialisation JSON automatique
// 4. Clone bon marché : reqwest::Client partage son pool (Arc interne)
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::models::{
    ChatReply, ChatRequest, PredictionRequest, PredictionResponse, SearchResult, SettingsStatus,
    SettingsUpdate, TickerSummaryItem,
};

/// Message affiché quand le serveur échoue sans fournir d'explication
pub const GENERIC_PREDICT_ERROR: &str = "An error occurred while fetching predictions.";
pub const GENERIC_SETTINGS_ERROR: &str = "Failed to save settings.";
pub const GENERIC_CHAT_ERROR: &str = "Failed to get a response from the assistant.";

/// Corps d'erreur applicatif : `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Réponse de `POST /settings`
#[derive(Debug, Deserialize)]
struct SaveSettingsReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// Structure : ApiClient
// ============================================================================

/// Client du service de prédiction
///
/// CONCEPT RUST : Clone
/// - reqwest::Client contient un Arc : cloner ne recrée pas de connexions
/// - Chaque tâche du worker reçoit son propre clone
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Crée un client pour l'URL de base donnée (ex: "http://127.0.0.1:5000")
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stockcast/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// `GET /market-summary`
    #[instrument(skip(self))]
    pub async fn market_summary(&self) -> Result<Vec<TickerSummaryItem>> {
        let items: Vec<TickerSummaryItem> = self.get_json("/market-summary").await?;
        info!(count = items.len(), "Market summary fetched");
        Ok(items)
    }

    /// `GET /search?q=<query>` (la requête est échappée pour l'URL)
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let results: Vec<SearchResult> = self.get_json(&search_path(query)).await?;
        debug!(count = results.len(), "Search results fetched");
        Ok(results)
    }

    /// `POST /predict`
    ///
    /// Un statut non-2xx ou un champ `error` devient une erreur dont le
    /// message est exactement celui du serveur (ou un message générique).
    /// Les échecs réseau affichent le message générique ; la cause reste
    /// dans la chaîne de contextes (logs).
    #[instrument(skip(self, request), fields(ticker = %request.ticker))]
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        debug!(?request, "Sending prediction request");
        let response = self
            .http
            .post(self.url("/predict"))
            .json(request)
            .send()
            .await
            .context(GENERIC_PREDICT_ERROR)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context(GENERIC_PREDICT_ERROR)?;

        let prediction: PredictionResponse =
            parse_app_response(status, &body, GENERIC_PREDICT_ERROR)?;
        info!(
            points = prediction.dates.len(),
            horizon = prediction.future_dates.len(),
            "Prediction received"
        );
        Ok(prediction)
    }

    /// `GET /settings`
    #[instrument(skip(self))]
    pub async fn settings_status(&self) -> Result<SettingsStatus> {
        self.get_json("/settings").await
    }

    /// `POST /settings`
    ///
    /// Les valeurs des clés ne sont jamais loggées.
    #[instrument(skip(self, update))]
    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<()> {
        debug!(
            openai = update.openai_api_key.is_some(),
            gemini = update.gemini_api_key.is_some(),
            "Saving settings"
        );
        let response = self
            .http
            .post(self.url("/settings"))
            .json(update)
            .send()
            .await
            .context(GENERIC_SETTINGS_ERROR)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context(GENERIC_SETTINGS_ERROR)?;

        let reply: SaveSettingsReply = parse_app_response(status, &body, GENERIC_SETTINGS_ERROR)?;
        if !reply.success {
            anyhow::bail!(reply.error.unwrap_or_else(|| GENERIC_SETTINGS_ERROR.to_string()));
        }
        info!("Settings saved");
        Ok(())
    }

    /// `POST /chat` : retourne le texte de l'assistant
    #[instrument(skip(self, request), fields(provider = ?request.provider, model = %request.model))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .http
            .post(self.url("/chat"))
            .json(request)
            .send()
            .await
            .context(GENERIC_CHAT_ERROR)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context(GENERIC_CHAT_ERROR)?;

        let reply: ChatReply = parse_app_response(status, &body, GENERIC_CHAT_ERROR)?;
        match reply.response {
            Some(text) => {
                info!(chars = text.len(), "Chat response received");
                Ok(text)
            }
            None => anyhow::bail!(reply.error.unwrap_or_else(|| GENERIC_CHAT_ERROR.to_string())),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// GET + vérification du statut + parsing JSON
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "Sending GET request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP vers {}", path))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, path, "Server returned error status");
            anyhow::bail!("Le serveur a retourné une erreur : HTTP {}", status);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Échec du parsing JSON de {}", path))
    }
}

/// Construit le chemin de recherche avec la requête échappée
fn search_path(query: &str) -> String {
    format!("/search?q={}", urlencoding::encode(query))
}

/// Interprète une réponse applicative (`T` ou `{error}`)
///
/// - statut non-2xx ou champ `error` présent → erreur avec le message
///   du serveur, sinon `fallback`
/// - sinon → désérialise `T`
fn parse_app_response<T: DeserializeOwned>(status: StatusCode, body: &str, fallback: &str) -> Result<T> {
    let server_error = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.trim().is_empty());

    if let Some(message) = server_error {
        error!(status = %status, error = %message, "Server reported an error");
        anyhow::bail!(message);
    }

    if !status.is_success() {
        error!(status = %status, "Server returned error status without message");
        anyhow::bail!(fallback.to_string());
    }

    // Corps illisible : erreur de parsing dans les logs, message générique à l'écran
    serde_json::from_str(body)
        .map_err(|e| anyhow::Error::new(e).context(fallback.to_string()))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_escapes_query() {
        assert_eq!(search_path("AAPL"), "/search?q=AAPL");
        assert_eq!(search_path("^GSPC & co"), "/search?q=%5EGSPC%20%26%20co");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/predict"), "http://localhost:5000/predict");
    }

    #[test]
    fn test_server_error_message_is_verbatim() {
        let err = parse_app_response::<PredictionResponse>(
            StatusCode::BAD_REQUEST,
            r#"{"error":"No data found for ticker ZZZZ"}"#,
            GENERIC_PREDICT_ERROR,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "No data found for ticker ZZZZ");
    }

    #[test]
    fn test_error_field_with_success_status() {
        let err = parse_app_response::<ChatReply>(
            StatusCode::OK,
            r#"{"error":"Please configure your OPENAI API key in settings first."}"#,
            GENERIC_CHAT_ERROR,
        )
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI API key"));
    }

    #[test]
    fn test_error_status_without_message_uses_fallback() {
        let err = parse_app_response::<PredictionResponse>(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>Internal Server Error</html>",
            GENERIC_PREDICT_ERROR,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_PREDICT_ERROR);
    }

    #[test]
    fn test_success_body_is_parsed() {
        let status: SettingsStatus = parse_app_response(
            StatusCode::OK,
            r#"{"openai_configured":true,"gemini_configured":false}"#,
            "unused",
        )
        .unwrap();
        assert!(status.openai_configured);
    }

    // CONCEPT RUST : #[tokio::test]
    // - Port 1 sur localhost : connexion refusée, aucune dépendance réseau
    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        assert!(client.market_summary().await.is_err());
        assert!(client.settings_status().await.is_err());
    }

    #[tokio::test]
    async fn test_predict_transport_failure_shows_generic_message() {
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let request = PredictionRequest {
            ticker: "AAPL".to_string(),
            look_back: 60,
            forecast_days: 5,
            model_type: None,
        };
        let error = client.predict(&request).await.unwrap_err();
        assert_eq!(error.to_string(), GENERIC_PREDICT_ERROR);
    }

    #[test]
    fn test_malformed_success_body_uses_fallback() {
        let error = parse_app_response::<SettingsStatus>(StatusCode::OK, "<html>", "fallback").unwrap_err();
        assert_eq!(error.to_string(), "fallback");
    }
}
