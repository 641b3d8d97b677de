// ============================================================================
// Module : api
// ============================================================================
// Client HTTP des cinq endpoints du service de prédiction :
// /market-summary, /search, /predict, /settings, /chat
// ============================================================================

pub mod client;

pub use client::ApiClient;
