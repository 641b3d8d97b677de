// ============================================================================
// Configuration
// ============================================================================
// Configuration en couches, de la plus faible à la plus forte :
//
// 1. Valeurs par défaut (Config::default())
// 2. Fichier global  : ~/.config/stockcast/config.toml
// 3. Fichier projet  : ./stockcast.toml
// 4. Fichier explicite : --config <path>
// 5. Variable d'environnement : STOCKCAST_API_URL
// 6. Option CLI : --api-url
//
// Chaque couche ne remplace que les clés qu'elle définit.
// Un fichier mal formé est ignoré et signalé (warning dans les logs) :
// une config cassée ne doit pas empêcher l'application de démarrer.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ModelOption, Provider};

// ============================================================================
// CLI
// ============================================================================

/// Client terminal pour le service de prédiction boursière
#[derive(Debug, Default, Parser)]
#[command(name = "stockcast", version, about)]
pub struct Cli {
    /// URL de base du serveur (ex: http://127.0.0.1:5000)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Fichier de configuration TOML supplémentaire
    #[arg(long)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Structure : Config
// ============================================================================

/// Configuration complète de l'application
///
/// CONCEPT RUST : #[serde(default)]
/// - Un champ absent du TOML prend la valeur de Config::default()
/// - Permet des fichiers de config partiels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL de base du serveur de prédiction
    pub api_base_url: String,

    /// Intervalle de rafraîchissement du Market Watch (secondes)
    pub market_refresh_secs: u64,

    /// Fenêtre de debounce de l'autocomplétion (millisecondes)
    pub search_debounce_ms: u64,

    /// Timeout de lecture des événements clavier = fréquence des ticks
    pub tick_rate_ms: u64,

    /// Délai avant fermeture automatique des paramètres après sauvegarde
    pub settings_close_delay_ms: u64,

    /// Timeout des requêtes HTTP (l'entraînement d'un modèle peut être long)
    pub request_timeout_secs: u64,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,

    /// Catalogue des modèles du chat, par fournisseur
    pub chat_models: ChatCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            market_refresh_secs: 60,
            search_debounce_ms: 300,
            tick_rate_ms: 50,
            settings_close_delay_ms: 1500,
            request_timeout_secs: 120,
            log_dir: PathBuf::from("./logs"),
            chat_models: ChatCatalog::default(),
        }
    }
}

impl Config {
    pub fn market_refresh(&self) -> Duration {
        Duration::from_secs(self.market_refresh_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn settings_close_delay(&self) -> Duration {
        Duration::from_millis(self.settings_close_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Catalogue des modèles du chat
// ============================================================================

/// Table {fournisseur → liste ordonnée de modèles}
///
/// Un seul modèle par fournisseur devrait avoir `default = true` ;
/// à défaut, le premier de la liste est présélectionné.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCatalog {
    pub openai: Vec<ModelOption>,
    pub gemini: Vec<ModelOption>,
}

impl ChatCatalog {
    /// Modèles disponibles pour un fournisseur
    pub fn models(&self, provider: Provider) -> &[ModelOption] {
        match provider {
            Provider::Openai => &self.openai,
            Provider::Gemini => &self.gemini,
        }
    }
}

impl Default for ChatCatalog {
    fn default() -> Self {
        Self {
            openai: vec![
                ModelOption::new("gpt-5.1", "GPT-5.1", false),
                ModelOption::new("gpt-5-mini", "GPT-5 Mini", false),
                ModelOption::new("gpt-4o", "GPT-4o", false),
                ModelOption::new("gpt-3.5-turbo", "GPT-3.5 Turbo", true),
            ],
            gemini: vec![
                ModelOption::new("gemini-3-pro-preview", "Gemini 3 Pro (Preview)", false),
                ModelOption::new("gemini-2.5-pro", "Gemini 2.5 Pro", false),
                ModelOption::new("gemini-2.5-flash", "Gemini 2.5 Flash", true),
                ModelOption::new("gemini-2.5-flash-lite", "Gemini 2.5 Flash Lite", false),
                ModelOption::new("gemini-pro", "Gemini Pro", false),
            ],
        }
    }
}

// ============================================================================
// Chargement
// ============================================================================

/// Configuration résolue et avertissements à émettre
///
/// Le chargement a lieu avant l'installation du logging : les problèmes
/// rencontrés sont retournés à l'appelant plutôt que loggés ici.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<String>,
}

/// Charge la configuration complète (toutes les couches)
pub fn load(cli: &Cli) -> LoadedConfig {
    let mut warnings = Vec::new();

    // Couches fichiers : chaque fichier ne remplace que les clés qu'il définit
    let candidates = [global_config_path(), Some(PathBuf::from("stockcast.toml")), cli.config.clone()];
    let mut layers = Vec::new();
    for path in candidates.into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        match read_layer(&path) {
            Ok(layer) => {
                debug!(path = %path.display(), "Loaded config file");
                layers.push(layer);
            }
            Err(e) => {
                warnings.push(format!("Ignoring malformed config file {}: {:#}", path.display(), e));
            }
        }
    }

    let mut config = match merge_layers(layers) {
        Ok(config) => config,
        Err(e) => {
            warnings.push(format!("Ignoring config files: {:#}", e));
            Config::default()
        }
    };

    // Variable d'environnement
    if let Ok(url) = std::env::var("STOCKCAST_API_URL") {
        if !url.trim().is_empty() {
            config.api_base_url = url.trim().to_string();
        }
    }

    // Option CLI (priorité maximale)
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }

    LoadedConfig { config, warnings }
}

/// Chemin du fichier de configuration global
fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stockcast").join("config.toml"))
}

/// Lit une couche TOML depuis un fichier
fn read_layer(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_layer(&content)
}

/// Parse une couche : les types sont vérifiés contre `Config`, puis la
/// table brute est conservée pour la fusion clé par clé
pub fn parse_layer(content: &str) -> Result<toml::Value> {
    parse_config(content)?;
    toml::from_str(content).context("Fichier de configuration TOML invalide")
}

/// Parse le contenu TOML d'un fichier de configuration
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("Fichier de configuration TOML invalide")
}

/// Fusionne les couches par-dessus les valeurs par défaut, de la plus
/// faible à la plus forte
pub fn merge_layers(layers: impl IntoIterator<Item = toml::Value>) -> Result<Config> {
    let mut merged = toml::Value::try_from(Config::default())
        .context("Échec de la sérialisation de la configuration par défaut")?;
    for layer in layers {
        merge_value(&mut merged, layer);
    }
    merged
        .try_into::<Config>()
        .context("Configuration fusionnée invalide")
}

/// Fusion récursive : les tables sont fusionnées, les autres valeurs
/// (y compris les tableaux) sont remplacées
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
