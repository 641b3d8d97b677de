// ============================================================================
// Debouncer
// ============================================================================
// Regroupe une rafale d'appels en un seul appel "trailing"
//
// Chaque appel annule l'appel en attente et programme le nouveau
// `window` plus tard avec les derniers arguments. Seul le dernier appel
// d'une rafale est déclenché.
//
// CONCEPT : Timer coopératif
// - Pas de thread ni de tâche : l'event loop appelle fire_due(now) à
//   chaque tick, comme un setTimeout vérifié par la boucle
// - Le temps est passé en paramètre : testable sans attendre
// ============================================================================

use std::time::{Duration, Instant};

/// Debouncer générique sur les arguments `T`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Enregistre un appel : remplace l'appel en attente
    pub fn call(&mut self, args: T, now: Instant) {
        self.pending = Some((args, now + self.window));
    }

    /// Annule l'appel en attente (s'il existe)
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Retourne les arguments si l'échéance est atteinte
    ///
    /// L'appel est consommé : il ne se déclenche qu'une fois.
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(args, _)| args),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_burst_fires_once_with_last_args() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        // 5 appels espacés de 100ms (< fenêtre)
        let mut fired = Vec::new();
        for (i, query) in ["A", "AA", "AAP", "AAPL", "AAPL "].iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            if let Some(args) = debouncer.fire_due(now) {
                fired.push(args);
            }
            debouncer.call(query.to_string(), now);
        }

        // Rien ne part avant la fin de la fenêtre du dernier appel
        let last_call = start + Duration::from_millis(400);
        assert_eq!(debouncer.fire_due(last_call + Duration::from_millis(299)), None);

        if let Some(args) = debouncer.fire_due(last_call + WINDOW) {
            fired.push(args);
        }
        assert_eq!(fired, vec!["AAPL ".to_string()]);

        // Consommé : ne se redéclenche pas
        assert_eq!(debouncer.fire_due(last_call + WINDOW * 10), None);
    }

    #[test]
    fn test_separate_bursts_fire_separately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.call(1, start);
        assert_eq!(debouncer.fire_due(start + WINDOW), Some(1));

        debouncer.call(2, start + Duration::from_secs(1));
        assert_eq!(debouncer.fire_due(start + Duration::from_secs(2)), Some(2));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.call("x", start);
        debouncer.cancel();
        assert_eq!(debouncer.fire_due(start + WINDOW), None);
    }
}
