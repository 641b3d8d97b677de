// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================
// Calcule les zones de chaque widget à partir de la taille du terminal.
//
// Fonction pure de (taille, état) : le rendu ET la gestion des clics
// utilisent le même découpage, sans avoir à mémoriser le dernier draw.
//
//  ┌──────────────────────── header ────────────────────────┐
//  │ market │ formulaire                 │ chat (modèle)     │
//  │        │ statut (erreur/chargement) │ historique        │
//  │        │ résultats                  │                   │
//  │        │ graphique                  │ saisie            │
//  └──────────────────────── footer ────────────────────────┘
// ============================================================================

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::App;

/// Nombre maximum de suggestions visibles dans la liste déroulante
pub const MAX_DROPDOWN_ROWS: u16 = 8;

/// Hauteur d'une entrée du Market Watch (ticker + prix, puis variation)
pub const MARKET_ITEM_HEIGHT: u16 = 2;

/// Zones de l'écran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Regions {
    pub header: Rect,
    pub market: Rect,
    /// Première entrée visible du Market Watch
    pub market_offset: usize,
    pub form: Rect,
    /// Ligne du champ ticker (à l'intérieur du formulaire)
    pub ticker_input: Rect,
    /// Liste déroulante (si visible)
    pub dropdown: Option<Rect>,
    pub status: Rect,
    pub results: Rect,
    pub chart: Rect,
    pub chat_header: Rect,
    pub transcript: Rect,
    pub chat_input: Rect,
    pub footer: Rect,
}

impl Regions {
    /// Index de l'entrée du Market Watch sous le point (x, y)
    ///
    /// Deux lignes par ticker, à l'intérieur de la bordure, en tenant
    /// compte du défilement.
    pub fn market_row_at(&self, x: u16, y: u16) -> Option<usize> {
        let inner = inner(self.market);
        contains(inner, x, y).then(|| self.market_offset + ((y - inner.y) / MARKET_ITEM_HEIGHT) as usize)
    }

    /// Index de la suggestion sous le point (x, y)
    pub fn dropdown_row_at(&self, x: u16, y: u16) -> Option<usize> {
        let inner = inner(self.dropdown?);
        contains(inner, x, y).then(|| (y - inner.y) as usize)
    }
}

/// Le point (x, y) est-il dans le rectangle ?
pub fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x.saturating_add(rect.width) && y >= rect.y && y < rect.y.saturating_add(rect.height)
}

/// Zone intérieure d'un Block avec bordures
pub fn inner(rect: Rect) -> Rect {
    Rect {
        x: rect.x.saturating_add(1),
        y: rect.y.saturating_add(1),
        width: rect.width.saturating_sub(2),
        height: rect.height.saturating_sub(2),
    }
}

/// Nombre d'entrées entières visibles dans le Market Watch
pub fn market_capacity(market: Rect) -> usize {
    (inner(market).height / MARKET_ITEM_HEIGHT) as usize
}

/// Défilement du Market Watch : le moins possible, juste assez pour que
/// l'entrée sélectionnée soit la dernière visible
pub fn market_offset(selected: usize, capacity: usize) -> usize {
    selected.saturating_sub(capacity.saturating_sub(1))
}

/// Calcule toutes les zones
pub fn compute(area: Rect, app: &App) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),     // Market Watch
            Constraint::Min(40),        // Prédiction
            Constraint::Percentage(35), // Chat
        ])
        .split(rows[1]);

    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),  // Formulaire (3 lignes + bordures)
            Constraint::Length(1),  // Erreur / chargement
            Constraint::Length(10), // Résultats
            Constraint::Min(8),     // Graphique
        ])
        .split(columns[1]);

    let chat = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Fournisseur / modèle
            Constraint::Min(0),    // Historique
            Constraint::Length(3), // Saisie
        ])
        .split(columns[2]);

    let form = center[0];
    let form_inner = inner(form);
    let ticker_input = Rect {
        height: form_inner.height.min(1),
        ..form_inner
    };

    // La liste déroulante s'affiche sous le champ ticker, par-dessus
    // le reste de la colonne centrale
    let dropdown = (app.autocomplete.visible && !app.autocomplete.suggestions.is_empty()).then(|| {
        let wanted = (app.autocomplete.suggestions.len() as u16).min(MAX_DROPDOWN_ROWS) + 2;
        let top = ticker_input.y + 1;
        let available = columns[1].bottom().saturating_sub(top);
        Rect {
            x: ticker_input.x,
            y: top,
            width: ticker_input.width,
            height: wanted.min(available),
        }
    });

    Regions {
        header: rows[0],
        market: columns[0],
        market_offset: market_offset(app.market.selected, market_capacity(columns[0])),
        form,
        ticker_input,
        dropdown,
        status: center[1],
        results: center[2],
        chart: center[3],
        chat_header: chat[0],
        transcript: chat[1],
        chat_input: chat[2],
        footer: rows[2],
    }
}

// ============================================================================
// Tests
// ============================================================================
