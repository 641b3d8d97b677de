// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Lecture des événements clavier/souris
pub mod layout;    // Découpage de l'écran (rendu + clics)
pub mod dashboard; // Rendu de l'interface principale
pub mod chart;     // Graphique historique + prévision
pub mod chat;      // Panneau de conversation
pub mod settings;  // Popup des clés API

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
