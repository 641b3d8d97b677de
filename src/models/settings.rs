// ============================================================================
// Structures : SettingsStatus, SettingsUpdate
// ============================================================================
// Contrat de `GET /settings` et `POST /settings`
//
// Les clés API sont en écriture seule : le serveur ne renvoie jamais
// leur valeur, seulement si elles sont configurées.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Statut de configuration des fournisseurs LLM (`GET /settings`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsStatus {
    #[serde(default)]
    pub openai_configured: bool,
    #[serde(default)]
    pub gemini_configured: bool,
}

impl SettingsStatus {
    /// Nombre de fournisseurs configurés (0, 1 ou 2)
    pub fn configured_count(&self) -> usize {
        usize::from(self.openai_configured) + usize::from(self.gemini_configured)
    }
}

/// Corps de `POST /settings`
///
/// Un champ absent signifie "ne pas modifier" côté serveur :
/// on n'envoie jamais de chaîne vide.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

impl SettingsUpdate {
    /// Construit une mise à jour à partir des champs saisis
    ///
    /// Retourne None si les deux champs sont vides.
    pub fn from_inputs(openai: &str, gemini: &str) -> Option<Self> {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        let update = Self {
            openai_api_key: non_empty(openai),
            gemini_api_key: non_empty(gemini),
        };

        if update.openai_api_key.is_none() && update.gemini_api_key.is_none() {
            None
        } else {
            Some(update)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_both_empty() {
        assert!(SettingsUpdate::from_inputs("", "   ").is_none());
    }

    #[test]
    fn test_update_sends_only_filled_field() {
        let update = SettingsUpdate::from_inputs("", " AIza-key ").unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("openai_api_key").is_none());
        assert_eq!(json["gemini_api_key"], "AIza-key");
    }

    #[test]
    fn test_configured_count() {
        let status = SettingsStatus {
            openai_configured: true,
            gemini_configured: false,
        };
        assert_eq!(status.configured_count(), 1);
        assert_eq!(SettingsStatus::default().configured_count(), 0);
    }
}
