// ============================================================================
// Background Worker
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker
// - Le worker exécute les appels HTTP (async) sans bloquer l'UI
// - Les résultats reviennent sous forme d'AppResult
//
// Une tâche tokio par commande : une prédiction longue ne bloque ni la
// recherche ni le rafraîchissement du Market Watch.
// ============================================================================

use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::models::{
    ChatRequest, PredictionRequest, PredictionResponse, SearchResult, SettingsStatus,
    SettingsUpdate, TickerSummaryItem,
};

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Recharger le Market Watch
    FetchMarketSummary,

    /// Recherche de l'autocomplétion, étiquetée par un numéro de séquence
    Search { seq: u64, query: String },

    /// Prédiction, étiquetée par un numéro de séquence
    Predict { seq: u64, request: PredictionRequest },

    /// Lire le statut des clés API
    LoadSettings,

    /// Enregistrer les clés saisies
    SaveSettings { update: SettingsUpdate },

    /// Envoyer un message au chat
    SendChat { request: ChatRequest },
}

/// Résultats renvoyés par le worker
///
/// Les erreurs sont déjà converties en message affichable (String).
#[derive(Debug)]
pub enum AppResult {
    MarketSummary(Result<Vec<TickerSummaryItem>, String>),
    SearchResults {
        seq: u64,
        result: Result<Vec<SearchResult>, String>,
    },
    Prediction {
        seq: u64,
        result: Result<Box<PredictionResponse>, String>,
    },
    SettingsStatus(Result<SettingsStatus, String>),
    SettingsSaved(Result<(), String>),
    ChatReply(Result<String, String>),
}

/// Exécute une commande et produit son résultat
pub async fn execute(client: &ApiClient, command: AppCommand) -> AppResult {
    match command {
        AppCommand::FetchMarketSummary => {
            AppResult::MarketSummary(client.market_summary().await.map_err(|e| log_failure("market-summary", e)))
        }
        AppCommand::Search { seq, query } => AppResult::SearchResults {
            seq,
            result: client.search(&query).await.map_err(|e| log_failure("search", e)),
        },
        AppCommand::Predict { seq, request } => AppResult::Prediction {
            seq,
            result: client
                .predict(&request)
                .await
                .map(Box::new)
                .map_err(|e| log_failure("predict", e)),
        },
        AppCommand::LoadSettings => AppResult::SettingsStatus(
            client.settings_status().await.map_err(|e| log_failure("settings", e)),
        ),
        AppCommand::SaveSettings { update } => AppResult::SettingsSaved(
            client.save_settings(&update).await.map_err(|e| log_failure("settings", e)),
        ),
        AppCommand::SendChat { request } => {
            AppResult::ChatReply(client.chat(&request).await.map_err(|e| log_failure("chat", e)))
        }
    }
}

/// Log l'erreur complète (chaîne de contextes) et retourne le message affichable
fn log_failure(endpoint: &str, e: anyhow::Error) -> String {
    error!(endpoint, error = ?e, "Request failed");
    e.to_string()
}

/// Lance le worker dans un thread dédié avec son propre runtime tokio
///
/// CONCEPT : Runtime per-thread
/// - Le thread attend les commandes (recv bloquant)
/// - Chaque commande devient une tâche sur le runtime multi-thread
/// - Le thread se termine quand le Sender est droppé (fin de l'app)
pub fn spawn_background_worker(
    client: ApiClient,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> Result<thread::JoinHandle<()>> {
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let handle = thread::Builder::new()
        .name("stockcast-worker".to_string())
        .spawn(move || {
            while let Ok(command) = command_rx.recv() {
                debug!(?command, "Worker received command");
                let client = client.clone();
                let result_tx = result_tx.clone();
                runtime.spawn(async move {
                    let result = execute(&client, command).await;
                    // Le receiver peut avoir disparu si l'app quitte
                    let _ = result_tx.send(result);
                });
            }
            info!("Worker thread exiting (channel closed)");
            // Ne pas attendre les requêtes en vol (ex: entraînement en cours)
            runtime.shutdown_background();
        })
        .context("Échec du lancement du worker")?;

    Ok(handle)
}
