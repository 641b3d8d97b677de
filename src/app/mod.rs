// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Seul le thread UI modifie App : pas de Mutex nécessaire, le worker
//   communique uniquement par channels (AppCommand / AppResult)
//
// Le contexte boursier partagé avec le chat est un champ de App, passé
// explicitement au chat lors de l'envoi.
// ============================================================================

pub mod autocomplete;
pub mod chart;
pub mod chat;
pub mod debounce;
pub mod keymap;
pub mod market;
pub mod prediction;
pub mod results;
pub mod settings;

use std::time::Instant;

use tracing::{debug, info};

use crate::config::Config;
use crate::models::{PredictionResponse, StockContext};
use crate::worker::{AppCommand, AppResult};

pub use autocomplete::Autocomplete;
pub use chart::ChartSeries;
pub use chat::ChatPanel;
pub use market::{MarketRows, MarketWatch};
pub use prediction::{FormField, PredictionForm};
pub use results::ResultsView;
pub use settings::SettingsPanel;

// ============================================================================
// Enum : Focus
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul contrôle reçoit le clavier à la fois
// - Tab / Shift-Tab parcourent les contrôles dans l'ordre de ALL
// ============================================================================

/// Contrôle qui reçoit les touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ticker,
    LookBack,
    ForecastDays,
    Model,
    Market,
    Chat,
}

impl Focus {
    pub const ALL: [Focus; 6] = [
        Focus::Ticker,
        Focus::LookBack,
        Focus::ForecastDays,
        Focus::Model,
        Focus::Market,
        Focus::Chat,
    ];

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression → confirmation demandée
    pub confirm_quit: bool,

    pub focus: Focus,

    /// Champ ticker + suggestions
    pub autocomplete: Autocomplete,

    /// Liste "Market Watch"
    pub market: MarketWatch,

    /// Formulaire de prédiction
    pub form: PredictionForm,

    /// Résultats de la dernière prédiction (None = cachés)
    pub results: Option<ResultsView>,

    /// Graphique de la dernière prédiction (remplacé à chaque fois)
    pub chart: Option<ChartSeries>,

    /// Contexte boursier courant, lu par le chat
    pub context: Option<StockContext>,

    pub chat: ChatPanel,

    pub settings: SettingsPanel,
}

impl App {
    /// Crée l'état initial à partir de la configuration
    pub fn new(config: &Config) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            focus: Focus::Ticker,
            autocomplete: Autocomplete::new(config.search_debounce()),
            market: MarketWatch::new(config.market_refresh()),
            form: PredictionForm::default(),
            results: None,
            chart: None,
            context: None,
            chat: ChatPanel::new(config.chat_models.clone()),
            settings: SettingsPanel::new(config.settings_close_delay()),
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Tick : timers de l'application
    ///
    /// Retourne les commandes à envoyer au worker :
    /// - rafraîchissement périodique du Market Watch
    /// - recherche de l'autocomplétion après le debounce
    pub fn tick(&mut self, now: Instant) -> Vec<AppCommand> {
        let mut commands = Vec::new();

        if self.market.poll_refresh(now) {
            debug!("Market refresh due");
            commands.push(AppCommand::FetchMarketSummary);
        }

        if let Some((seq, query)) = self.autocomplete.poll_search(now) {
            commands.push(AppCommand::Search { seq, query });
        }

        self.settings.tick(now);
        commands
    }

    /// Applique un résultat du worker
    pub fn apply_result(&mut self, result: AppResult, now: Instant) {
        match result {
            AppResult::MarketSummary(result) => self.market.apply(result),
            AppResult::SearchResults { seq, result } => self.autocomplete.apply_results(seq, result),
            AppResult::Prediction { seq, result } => {
                if let Some(response) = self.form.complete(seq, result) {
                    self.show_prediction(&response);
                }
            }
            AppResult::SettingsStatus(result) => self.settings.apply_status(result),
            AppResult::SettingsSaved(result) => self.settings.apply_saved(result, now),
            AppResult::ChatReply(result) => {
                self.chat.apply_reply(result);
                // Saisie réactivée et refocalisée
                self.set_focus(Focus::Chat);
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Change le contrôle actif ; quitter le champ ticker cache la liste
    pub fn set_focus(&mut self, focus: Focus) {
        if focus != Focus::Ticker {
            self.autocomplete.hide();
        }
        self.focus = focus;
    }

    /// Soumet le formulaire de prédiction
    pub fn submit_prediction(&mut self) -> Option<AppCommand> {
        if self.form.is_loading() {
            return None;
        }

        // Résultats précédents cachés avant la validation
        self.results = None;
        self.chart = None;
        self.autocomplete.hide();

        let (seq, request) = self.form.submit(&self.autocomplete.input)?;
        Some(AppCommand::Predict { seq, request })
    }

    /// Affiche une prédiction réussie et remplace le contexte du chat
    fn show_prediction(&mut self, response: &PredictionResponse) {
        info!(ticker = %response.ticker, "Showing prediction results");
        self.results = Some(ResultsView::from(response));
        self.chart = Some(ChartSeries::from(response));
        self.context = Some(StockContext::from(response));
        self.chat.push_system(format!(
            "Loaded data for {}. Ask me anything about its analysis!",
            response.ticker
        ));
    }

    /// Copie le ticker d'une ligne du Market Watch dans le champ ticker
    /// (ne lance pas de prédiction)
    pub fn copy_market_ticker(&mut self, index: usize) {
        if let Some(ticker) = self.market.ticker_at(index).map(str::to_string) {
            debug!(%ticker, "Market ticker copied to input");
            self.market.selected = index;
            self.autocomplete.set_input(&ticker);
            self.autocomplete.hide();
        }
    }

    /// Ouvre les paramètres et lance la lecture du statut
    pub fn open_settings(&mut self) -> AppCommand {
        self.autocomplete.hide();
        self.settings.open();
        AppCommand::LoadSettings
    }

    pub fn save_settings(&mut self) -> Option<AppCommand> {
        self.settings
            .save()
            .map(|update| AppCommand::SaveSettings { update })
    }

    /// Envoie le message du chat avec le contexte courant
    pub fn send_chat(&mut self) -> Option<AppCommand> {
        self.chat
            .send(self.context.as_ref())
            .map(|request| AppCommand::SendChat { request })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
