// ============================================================================
// Market Watch
// ============================================================================
// Liste de tickers rafraîchie à intervalle fixe (60s par défaut)
//
// - Au démarrage puis toutes les 60s : fetch et remplacement complet
// - Échec : la liste est remplacée par un message d'erreur unique
//   (le contenu précédent n'est pas conservé)
// ============================================================================

use std::time::{Duration, Instant};

use tracing::warn;

use crate::models::TickerSummaryItem;

/// Contenu affiché par le widget
///
/// CONCEPT RUST : Enum pour state machine
/// - Un seul état à la fois, le rendu doit gérer les trois cas
#[derive(Debug, Clone, PartialEq)]
pub enum MarketRows {
    /// Premier chargement en cours
    Loading,
    /// Dernière liste reçue, dans l'ordre du serveur
    Loaded(Vec<TickerSummaryItem>),
    /// Échec du dernier chargement
    Failed,
}

/// Message affiché à la place de la liste en cas d'échec
pub const MARKET_FAILURE_PLACEHOLDER: &str = "Failed to load data.";

#[derive(Debug, Clone)]
pub struct MarketWatch {
    pub rows: MarketRows,

    /// Ligne sélectionnée (navigation clavier)
    pub selected: usize,

    refresh_interval: Duration,

    /// Prochaine échéance de rafraîchissement (None = immédiat)
    next_refresh: Option<Instant>,
}

impl MarketWatch {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            rows: MarketRows::Loading,
            selected: 0,
            refresh_interval,
            next_refresh: None,
        }
    }

    /// Un rafraîchissement est-il dû ? Si oui, programme le suivant.
    ///
    /// Intervalle fixe (pas adaptatif) : la prochaine échéance est
    /// calculée à partir de l'émission, pas de la réponse.
    pub fn poll_refresh(&mut self, now: Instant) -> bool {
        match self.next_refresh {
            Some(deadline) if now < deadline => false,
            _ => {
                self.next_refresh = Some(now + self.refresh_interval);
                true
            }
        }
    }

    /// Applique le résultat d'un fetch (remplacement complet)
    pub fn apply(&mut self, result: Result<Vec<TickerSummaryItem>, String>) {
        match result {
            Ok(items) => {
                self.selected = self.selected.min(items.len().saturating_sub(1));
                self.rows = MarketRows::Loaded(items);
            }
            Err(error) => {
                warn!(%error, "Market summary unavailable");
                self.rows = MarketRows::Failed;
                self.selected = 0;
            }
        }
    }

    /// Lignes affichées (vide si chargement ou échec)
    pub fn items(&self) -> &[TickerSummaryItem] {
        match &self.rows {
            MarketRows::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn navigate_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.items().len().saturating_sub(1);
        self.selected = (self.selected + 1).min(max_index);
    }

    /// Ticker de la ligne `index`, s'il existe
    pub fn ticker_at(&self, index: usize) -> Option<&str> {
        self.items().get(index).map(|item| item.ticker.as_str())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
