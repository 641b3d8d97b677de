// ============================================================================
// Paramètres (clés API)
// ============================================================================
// Popup de configuration des fournisseurs LLM
//
// - Ouverture → lecture du statut (booléens uniquement, jamais les clés)
// - Sauvegarde → au moins un champ non vide ; les champs vides ne sont
//   pas envoyés
// - Succès → champs vidés, fermeture automatique après un court délai
// - Échec → message d'erreur, la popup reste ouverte
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::models::{SettingsStatus, SettingsUpdate};

/// Niveau visuel d'un message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Success,
    Warning,
    Error,
    Info,
}

/// Message affiché dans la popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub tier: Tier,
    pub text: String,
}

impl StatusMessage {
    fn new(tier: Tier, text: impl Into<String>) -> Self {
        Self {
            tier,
            text: text.into(),
        }
    }

    /// Message correspondant au statut des fournisseurs
    pub fn for_status(status: &SettingsStatus) -> Self {
        match (status.openai_configured, status.gemini_configured) {
            (true, true) => Self::new(Tier::Success, "✓ OpenAI and Gemini API keys are configured."),
            (true, false) => Self::new(Tier::Warning, "✓ OpenAI configured. Gemini API key not set."),
            (false, true) => Self::new(Tier::Warning, "✓ Gemini configured. OpenAI API key not set."),
            (false, false) => Self::new(
                Tier::Warning,
                "No API keys configured. Add at least one key to use the AI assistant.",
            ),
        }
    }
}

/// Champ de saisie actif
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    Openai,
    Gemini,
}

#[derive(Debug, Clone)]
pub struct SettingsPanel {
    pub open: bool,
    pub status: Option<SettingsStatus>,
    pub openai_key: String,
    pub gemini_key: String,
    pub field: SettingsField,
    pub message: Option<StatusMessage>,
    pub saving: bool,
    close_delay: Duration,
    close_at: Option<Instant>,
}

impl SettingsPanel {
    pub fn new(close_delay: Duration) -> Self {
        Self {
            open: false,
            status: None,
            openai_key: String::new(),
            gemini_key: String::new(),
            field: SettingsField::default(),
            message: None,
            saving: false,
            close_delay,
            close_at: None,
        }
    }

    /// Ouvre la popup ; l'appelant lance la lecture du statut
    pub fn open(&mut self) {
        self.open = true;
        self.field = SettingsField::Openai;
        self.close_at = None;
        self.message = Some(StatusMessage::new(Tier::Info, "Checking configuration..."));
    }

    /// Ferme la popup (les saisies non enregistrées sont effacées)
    pub fn close(&mut self) {
        self.open = false;
        self.close_at = None;
        self.openai_key.clear();
        self.gemini_key.clear();
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            SettingsField::Openai => SettingsField::Gemini,
            SettingsField::Gemini => SettingsField::Openai,
        };
    }

    pub fn push_char(&mut self, c: char) {
        self.active_input().push(c);
    }

    pub fn backspace(&mut self) {
        self.active_input().pop();
    }

    fn active_input(&mut self) -> &mut String {
        match self.field {
            SettingsField::Openai => &mut self.openai_key,
            SettingsField::Gemini => &mut self.gemini_key,
        }
    }

    /// Résultat de `GET /settings`
    pub fn apply_status(&mut self, result: Result<SettingsStatus, String>) {
        match result {
            Ok(status) => {
                debug!(configured = status.configured_count(), "Settings status loaded");
                self.message = Some(StatusMessage::for_status(&status));
                self.status = Some(status);
            }
            Err(error) => {
                warn!(%error, "Failed to load settings status");
                self.message = Some(StatusMessage::new(Tier::Error, "Unable to check configuration."));
            }
        }
    }

    /// Prépare la sauvegarde
    ///
    /// Retourne None (et affiche un message) si les deux champs sont vides.
    pub fn save(&mut self) -> Option<SettingsUpdate> {
        if self.saving {
            return None;
        }
        match SettingsUpdate::from_inputs(&self.openai_key, &self.gemini_key) {
            Some(update) => {
                self.saving = true;
                self.message = Some(StatusMessage::new(Tier::Info, "Saving..."));
                Some(update)
            }
            None => {
                self.message = Some(StatusMessage::new(
                    Tier::Error,
                    "Please enter at least one API key.",
                ));
                None
            }
        }
    }

    /// Résultat de `POST /settings`
    pub fn apply_saved(&mut self, result: Result<(), String>, now: Instant) {
        self.saving = false;
        match result {
            Ok(()) => {
                info!("API keys saved");
                // Les clés ne restent jamais affichées
                self.openai_key.clear();
                self.gemini_key.clear();
                self.message = Some(StatusMessage::new(Tier::Success, "✓ Settings saved successfully!"));
                self.close_at = Some(now + self.close_delay);
            }
            Err(error) => {
                self.message = Some(StatusMessage::new(Tier::Error, error));
            }
        }
    }

    /// Fermeture automatique après sauvegarde
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.close_at {
            if now >= deadline {
                self.close();
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
