// ============================================================================
// Stockcast - Client terminal du service de prédiction boursière
// ============================================================================
// Programme TUI : Market Watch, formulaire de prédiction avec
// autocomplétion, résultats + graphique, chat contextualisé et
// popup de configuration des clés API.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle synchrone qui gère événements et rendering
// 3. Async dans sync : un worker thread possède le runtime tokio
// 4. Channels : l'UI et le worker ne partagent aucun état
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use stockcast::api::ApiClient;
use stockcast::app::App;
use stockcast::config::{self, Cli, Config};
use stockcast::ui::{events::EventHandler, layout, render};
use stockcast::worker::{spawn_background_worker, AppCommand, AppResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// - RUST_LOG surcharge le filtre par défaut
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/stockcast.log.*
/// RUST_LOG=stockcast=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "stockcast.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockcast=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Fonction main
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config::LoadedConfig { config, warnings } = config::load(&cli);

    // Si le logging échoue, on continue sans (l'app reste utilisable)
    let logging = init_logging(&config);
    if let Err(e) = &logging {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    }

    // Les problèmes de config sont connus avant le logging : on les émet maintenant
    for warning in &warnings {
        if logging.is_ok() {
            warn!("{}", warning);
        } else {
            eprintln!("⚠️  {}", warning);
        }
    }

    debug!(?config, "Effective configuration");

    let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    info!(api = %client.base_url(), "Stockcast starting up");

    // Channels UI ↔ worker
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(client, command_rx, result_tx)?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(&config);
    let events = EventHandler::new(config.tick_rate());

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // CONCEPT : Restauration même en cas d'erreur
    // - On restaure AVANT de propager l'erreur de run()
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Fermer le channel arrête le worker
    drop(command_tx);
    if worker.join().is_err() {
        warn!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// 1. Applique les résultats du worker (non bloquant)
// 2. Timers : rafraîchissement du marché, debounce, fermeture auto
// 3. Dessine
// 4. Attend un événement (au plus tick_rate) et le traite
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // Tous les résultats disponibles, sans bloquer
        loop {
            match result_rx.try_recv() {
                Ok(result) => app.apply_result(result, Instant::now()),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    anyhow::bail!("Le worker s'est arrêté");
                }
            }
        }

        send_all(command_tx, app.tick(Instant::now()))?;

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => {
                // Même découpage que le rendu pour résoudre les clics
                let area = terminal.size()?;
                let regions = layout::compute(area, app);
                let commands = app.handle_event(&event, &regions, Instant::now());
                send_all(command_tx, commands)?;
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read terminal event");
            }
        }
    }

    Ok(())
}

fn send_all(command_tx: &mpsc::Sender<AppCommand>, commands: Vec<AppCommand>) -> Result<()> {
    for command in commands {
        command_tx
            .send(command)
            .context("Le worker ne reçoit plus de commandes")?;
    }
    Ok(())
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode, écran alternatif, souris)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restaure le terminal en mode normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
