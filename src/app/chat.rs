// ============================================================================
// Chat
// ============================================================================
// Conversation avec le LLM, contextualisée par la dernière prédiction
//
// - Changer de fournisseur remplace entièrement la liste des modèles
// - Envoi : ignoré si le message est vide ; refusé (message système) si
//   aucune prédiction n'a encore été faite
// - Le message utilisateur est ajouté tout de suite (optimiste)
// - Réponse : message assistant, ou message système d'erreur (+ conseil
//   d'ouvrir les paramètres si l'erreur concerne une clé API)
// - L'historique est en ajout seul
// ============================================================================

use tracing::{debug, info, warn};

use crate::config::ChatCatalog;
use crate::models::{ChatRequest, ChatRole, ChatTurn, ModelOption, Provider, StockContext};

pub const NO_CONTEXT_MESSAGE: &str =
    "Please run a prediction first so I have stock data to discuss.";
pub const OPEN_SETTINGS_HINT: &str = "Press F2 to open Settings and configure your API key.";

/// Motifs d'erreur liés à l'autorisation ou à la configuration
const AUTH_PATTERNS: [&str; 4] = ["api key", "authentication", "unauthorized", "configure"];

/// L'erreur concerne-t-elle une clé API manquante ou invalide ?
pub fn is_auth_error(text: &str) -> bool {
    let lower = text.to_lowercase();
    AUTH_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

#[derive(Debug, Clone)]
pub struct ChatPanel {
    pub provider: Provider,
    /// Modèles du fournisseur courant
    pub models: Vec<ModelOption>,
    /// Index du modèle choisi dans `models`
    pub model_index: usize,
    pub transcript: Vec<ChatTurn>,
    pub input: String,
    /// Requête en cours : la saisie est désactivée
    pub sending: bool,
    catalog: ChatCatalog,
}

impl ChatPanel {
    pub fn new(catalog: ChatCatalog) -> Self {
        let mut panel = Self {
            provider: Provider::default(),
            models: Vec::new(),
            model_index: 0,
            transcript: Vec::new(),
            input: String::new(),
            sending: false,
            catalog,
        };
        panel.set_provider(Provider::default());
        panel
    }

    // ========================================================================
    // Fournisseur et modèle
    // ========================================================================

    /// Change de fournisseur : la liste des modèles est remplacée,
    /// le modèle par défaut du fournisseur est présélectionné
    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
        self.models = self.catalog.models(provider).to_vec();
        self.model_index = self.models.iter().position(|m| m.default).unwrap_or(0);
        debug!(?provider, models = self.models.len(), "Chat provider changed");
    }

    pub fn next_provider(&mut self) {
        self.set_provider(self.provider.next());
    }

    pub fn next_model(&mut self) {
        if !self.models.is_empty() {
            self.model_index = (self.model_index + 1) % self.models.len();
        }
    }

    pub fn selected_model(&self) -> Option<&ModelOption> {
        self.models.get(self.model_index)
    }

    // ========================================================================
    // Historique
    // ========================================================================

    pub fn push_turn(&mut self, role: ChatRole, text: impl Into<String>) {
        self.transcript.push(ChatTurn::new(role, text));
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push_turn(ChatRole::System, text);
    }

    // ========================================================================
    // Saisie et envoi
    // ========================================================================

    pub fn push_char(&mut self, c: char) {
        if !self.sending {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if !self.sending {
            self.input.pop();
        }
    }

    /// Envoie le message saisi
    ///
    /// Retourne la requête à émettre, ou None si rien ne doit partir.
    pub fn send(&mut self, context: Option<&StockContext>) -> Option<ChatRequest> {
        if self.sending {
            return None;
        }

        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        let Some(context) = context else {
            self.push_system(NO_CONTEXT_MESSAGE);
            return None;
        };

        let Some(model) = self.selected_model().map(|m| m.id.clone()) else {
            warn!(provider = ?self.provider, "No chat model configured for provider");
            self.push_system(format!("No model configured for {}.", self.provider.label()));
            return None;
        };

        // Optimiste : le message apparaît avant la réponse
        self.push_turn(ChatRole::User, message.clone());
        self.input.clear();
        self.sending = true;

        info!(provider = ?self.provider, %model, ticker = %context.ticker, "Sending chat message");
        Some(ChatRequest {
            provider: self.provider,
            model,
            message,
            context: context.clone(),
        })
    }

    /// Applique la réponse du serveur
    pub fn apply_reply(&mut self, result: Result<String, String>) {
        // Saisie réactivée dans tous les cas
        self.sending = false;

        // Le service renvoie certaines erreurs dans le texte de la réponse
        let result = match result {
            Ok(text) if text.trim_start().starts_with("Error:") => Err(text),
            other => other,
        };

        match result {
            Ok(text) => self.push_turn(ChatRole::Assistant, text),
            Err(error) => {
                warn!(%error, "Chat request failed");
                let hint = is_auth_error(&error);
                self.push_system(error);
                if hint {
                    self.push_system(OPEN_SETTINGS_HINT);
                }
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
