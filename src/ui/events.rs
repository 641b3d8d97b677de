// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier/souris du terminal et produit des ticks
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Error handling avec Result
// 3. Pattern matching sur KeyCode et KeyModifiers
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

// ============================================================================
// Enum Event
// ============================================================================

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Clic souris
    Mouse(MouseEvent),

    /// Tick régulier (timers : debounce, rafraîchissement, fermeture auto)
    Tick,
}

// ============================================================================
// Structure EventHandler
// ============================================================================

/// Gestionnaire d'événements
pub struct EventHandler {
    /// Temps d'attente max d'un événement avant de produire un Tick
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(tick_rate) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release :
                // on ne garde que Press pour éviter les doublons
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Seul le clic gauche nous intéresse
                CrosstermEvent::Mouse(mouse)
                    if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) =>
                {
                    Ok(Event::Mouse(mouse))
                }

                // Autres événements (resize, release, mouvement) : le
                // prochain draw s'adapte tout seul
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Ctrl+C ou Ctrl+Q (quitter, avec confirmation)
///
/// 'q' seul ne suffit pas : les champs de saisie doivent pouvoir le recevoir.
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        is_ctrl(key) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Esc)
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
}

/// Tab : contrôle suivant
pub fn is_next_focus_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Tab)
}

/// Shift+Tab : contrôle précédent
pub fn is_previous_focus_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::BackTab)
}

pub fn is_up_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Up)
}

pub fn is_down_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Down)
}

pub fn is_left_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Left)
}

pub fn is_right_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Right)
}

/// F2 : paramètres
pub fn is_settings_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::F(2))
}

/// F3 : fournisseur du chat suivant
pub fn is_next_provider_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::F(3))
}

/// F4 : modèle du chat suivant
pub fn is_next_model_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::F(4))
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Backspace)
}

/// Extrait le caractère saisi (sans Ctrl/Alt)
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

/// Position d'un clic gauche (colonne, ligne)
pub fn get_click_position(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(mouse) => Some((mouse.column, mouse.row)),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
