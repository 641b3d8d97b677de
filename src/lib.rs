// ============================================================================
// Stockcast - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP du service de prédiction
pub mod app;       // État de l'application et contrôleurs
pub mod config;    // Configuration (TOML + env + CLI)
pub mod models;    // Structures de données échangées avec le serveur
pub mod ui;        // Interface utilisateur
pub mod worker;    // Commandes async exécutées en arrière-plan
