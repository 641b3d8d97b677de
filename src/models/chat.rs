// ============================================================================
// Structures : Provider, ModelOption, ChatTurn, ChatRequest
// ============================================================================
// Contrat de `POST /chat` et historique de la conversation
// ============================================================================

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::StockContext;

// ============================================================================
// Enum : Provider
// ============================================================================

/// Fournisseurs LLM supportés par le serveur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Openai,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Openai, Provider::Gemini];

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Fournisseur suivant (cycle, touche F3)
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

/// Un modèle proposé pour un fournisseur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    /// Identifiant envoyé au serveur (ex: "gpt-4o")
    pub id: String,
    /// Libellé affiché
    pub label: String,
    /// Présélectionné quand on choisit le fournisseur
    #[serde(default)]
    pub default: bool,
}

impl ModelOption {
    pub fn new(id: &str, label: &str, default: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            default,
        }
    }
}

// ============================================================================
// Historique
// ============================================================================

/// Auteur d'un message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// Un message de l'historique (ajouté, jamais modifié ni supprimé)
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Local>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Local::now(),
        }
    }
}

// ============================================================================
// Requête / Réponse
// ============================================================================

/// Corps de `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub provider: Provider,
    pub model: String,
    pub message: String,
    pub context: StockContext,
}

/// Réponse de `POST /chat` : `{response}` ou `{error}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
