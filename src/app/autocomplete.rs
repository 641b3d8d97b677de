// ============================================================================
// Autocomplétion du ticker
// ============================================================================
// Relie le champ "Ticker" à une liste de suggestions issue de /search
//
// - Saisie → debounce 300ms → recherche (sauf si le champ est vide)
// - Résultats vides → liste cachée
// - Résultats non vides → liste reconstruite entièrement
// - Sélection → symbole écrit dans le champ, liste cachée, pas de recherche
// - Erreur réseau → loggée, la liste reste dans son dernier état
// ============================================================================

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::app::debounce::Debouncer;
use crate::models::SearchResult;

/// État du champ ticker et de sa liste déroulante
#[derive(Debug, Clone)]
pub struct Autocomplete {
    /// Contenu du champ
    pub input: String,

    /// Suggestions actuellement affichées
    pub suggestions: Vec<SearchResult>,

    /// La liste déroulante est-elle visible ?
    pub visible: bool,

    /// Suggestion surlignée (navigation ↑↓)
    pub highlighted: Option<usize>,

    debouncer: Debouncer<String>,

    /// Numéro de la dernière recherche émise
    last_seq: u64,
}

impl Autocomplete {
    pub fn new(debounce: Duration) -> Self {
        Self {
            input: String::new(),
            suggestions: Vec::new(),
            visible: false,
            highlighted: None,
            debouncer: Debouncer::new(debounce),
            last_seq: 0,
        }
    }

    // ========================================================================
    // Édition du champ
    // ========================================================================

    /// Ajoute un caractère (déclenche le debounce)
    pub fn push_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.on_input_changed(now);
    }

    /// Supprime le dernier caractère (déclenche le debounce)
    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.on_input_changed(now);
        }
    }

    /// Remplace le contenu sans lancer de recherche
    /// (clic sur le Market Watch, sélection d'une suggestion)
    pub fn set_input(&mut self, value: &str) {
        self.input = value.to_string();
        self.debouncer.cancel();
        self.invalidate_pending_results();
    }

    /// Toute recherche encore en vol ne correspond plus au champ
    fn invalidate_pending_results(&mut self) {
        self.last_seq += 1;
        debug!(seq = self.last_seq, "Pending search results invalidated");
    }

    fn on_input_changed(&mut self, now: Instant) {
        self.debouncer.call(self.input.clone(), now);
    }

    // ========================================================================
    // Timer
    // ========================================================================

    /// Appelé à chaque tick : retourne (seq, requête) si une recherche
    /// doit partir
    pub fn poll_search(&mut self, now: Instant) -> Option<(u64, String)> {
        let value = self.debouncer.fire_due(now)?;

        if value.is_empty() {
            // Champ vide : on cache et on n'appelle pas le réseau
            self.invalidate_pending_results();
            self.hide();
            return None;
        }

        self.last_seq += 1;
        debug!(seq = self.last_seq, query = %value, "Search scheduled");
        Some((self.last_seq, value))
    }

    // ========================================================================
    // Résultats
    // ========================================================================

    /// Applique la réponse d'une recherche
    ///
    /// Les réponses d'une recherche dépassée (seq ancien) sont ignorées.
    pub fn apply_results(&mut self, seq: u64, result: Result<Vec<SearchResult>, String>) {
        if seq != self.last_seq {
            debug!(seq, latest = self.last_seq, "Discarding stale search results");
            return;
        }

        match result {
            Ok(results) if results.is_empty() => self.hide(),
            Ok(results) => {
                // Remplacement complet : aucune entrée périmée ne subsiste
                self.suggestions = results;
                self.highlighted = None;
                self.visible = true;
            }
            Err(error) => {
                // Mode dégradé toléré : la liste garde son dernier état
                warn!(%error, "Search failed");
            }
        }
    }

    // ========================================================================
    // Navigation et sélection
    // ========================================================================

    pub fn highlight_next(&mut self) {
        if !self.visible || self.suggestions.is_empty() {
            return;
        }
        let max = self.suggestions.len() - 1;
        self.highlighted = Some(self.highlighted.map_or(0, |i| (i + 1).min(max)));
    }

    pub fn highlight_previous(&mut self) {
        if !self.visible {
            return;
        }
        self.highlighted = match self.highlighted {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Sélectionne une suggestion : écrit le symbole et cache la liste
    ///
    /// Retourne le symbole choisi.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let symbol = self.suggestions.get(index)?.symbol.clone();
        self.set_input(&symbol);
        self.hide();
        Some(symbol)
    }

    /// Sélectionne la suggestion surlignée, s'il y en a une
    pub fn select_highlighted(&mut self) -> Option<String> {
        if !self.visible {
            return None;
        }
        self.highlighted.and_then(|i| self.select(i))
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.highlighted = None;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn result(symbol: &str) -> SearchResult {
        SearchResult {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            exchange: "NMS".to_string(),
        }
    }

    fn type_text(ac: &mut Autocomplete, text: &str, start: Instant) -> Instant {
        let mut now = start;
        for c in text.chars() {
            ac.push_char(c, now);
            now += Duration::from_millis(50);
        }
        now
    }

    #[test]
    fn test_typing_burst_issues_one_search() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        let end = type_text(&mut ac, "AAPL", start);

        assert_eq!(ac.poll_search(end), None);
        assert_eq!(ac.poll_search(end + WINDOW), Some((1, "AAPL".to_string())));
        assert_eq!(ac.poll_search(end + WINDOW * 2), None);
    }

    #[test]
    fn test_empty_input_hides_without_search() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        ac.visible = true;
        ac.suggestions = vec![result("A")];

        ac.push_char('A', start);
        ac.backspace(start + Duration::from_millis(10));

        assert_eq!(ac.poll_search(start + Duration::from_secs(1)), None);
        assert!(!ac.visible);
    }

    #[test]
    fn test_results_replace_list() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "MS", start);
        let (seq, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();

        ac.suggestions = vec![result("OLD1"), result("OLD2"), result("OLD3")];
        ac.apply_results(seq, Ok(vec![result("MSFT")]));

        assert!(ac.visible);
        assert_eq!(ac.suggestions, vec![result("MSFT")]);
    }

    #[test]
    fn test_empty_results_hide_list() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "ZZZZ", start);
        let (seq, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();
        ac.visible = true;

        ac.apply_results(seq, Ok(vec![]));
        assert!(!ac.visible);
    }

    #[test]
    fn test_error_keeps_last_state() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "GO", start);
        let (seq, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();
        ac.apply_results(seq, Ok(vec![result("GOOG")]));

        let later = start + Duration::from_secs(2);
        ac.push_char('O', later);
        let (seq, _) = ac.poll_search(later + WINDOW).unwrap();
        ac.apply_results(seq, Err("connection refused".to_string()));

        assert!(ac.visible);
        assert_eq!(ac.suggestions, vec![result("GOOG")]);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "A", start);
        let (first, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();

        let later = start + Duration::from_secs(2);
        ac.push_char('M', later);
        let (second, _) = ac.poll_search(later + WINDOW).unwrap();

        ac.apply_results(second, Ok(vec![result("AMZN")]));
        ac.apply_results(first, Ok(vec![result("A"), result("AA")]));
        assert_eq!(ac.suggestions, vec![result("AMZN")]);
    }

    #[test]
    fn test_select_writes_symbol_without_search() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "TS", start);
        let (seq, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();
        ac.apply_results(seq, Ok(vec![result("TSLA"), result("TSM")]));

        ac.highlight_next();
        ac.highlight_next();
        assert_eq!(ac.select_highlighted(), Some("TSM".to_string()));
        assert_eq!(ac.input, "TSM");
        assert!(!ac.visible);
        assert_eq!(ac.poll_search(start + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_results_after_clearing_input_stay_hidden() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        ac.push_char('A', start);
        let (seq, query) = ac.poll_search(start + WINDOW).unwrap();
        assert_eq!(query, "A");

        let later = start + Duration::from_secs(1);
        ac.backspace(later);
        assert_eq!(ac.poll_search(later + WINDOW), None);

        // La réponse pour "A" arrive après l'effacement
        ac.apply_results(seq, Ok(vec![result("AAPL"), result("AMZN")]));
        assert!(!ac.visible);
        assert!(ac.suggestions.is_empty());
    }

    #[test]
    fn test_results_after_selection_stay_hidden() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "A", start);
        let (first, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();
        ac.apply_results(first, Ok(vec![result("AMZN"), result("AMD")]));

        let later = start + Duration::from_secs(2);
        ac.push_char('M', later);
        let (in_flight, _) = ac.poll_search(later + WINDOW).unwrap();

        // Sélection avant l'arrivée de la recherche "AM"
        assert_eq!(ac.select(0), Some("AMZN".to_string()));
        ac.apply_results(in_flight, Ok(vec![result("AMZN"), result("AMD"), result("AMAT")]));

        assert!(!ac.visible);
        assert_eq!(ac.input, "AMZN");
    }

    #[test]
    fn test_market_copy_discards_in_flight_results() {
        let start = Instant::now();
        let mut ac = Autocomplete::new(WINDOW);
        type_text(&mut ac, "GO", start);
        let (seq, _) = ac.poll_search(start + Duration::from_secs(1)).unwrap();

        ac.set_input("BTC-USD");
        ac.apply_results(seq, Ok(vec![result("GOOG")]));

        assert!(!ac.visible);
        assert_eq!(ac.input, "BTC-USD");
    }
}
