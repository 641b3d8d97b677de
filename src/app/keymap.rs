// ============================================================================
// Gestion des événements → actions
// ============================================================================
// Traduit un événement clavier/souris en modification de l'état et en
// commandes pour le worker.
//
// CONCEPT RUST : Pattern matching avec guards
// - Ordre des priorités : quit → popup paramètres → raccourcis globaux
//   → contrôle qui a le focus
// ============================================================================

use std::time::Instant;

use tracing::{debug, info};

use crate::app::{App, FormField, Focus};
use crate::ui::events::{
    get_char_from_event, get_click_position, is_backspace_event, is_down_event, is_enter_event,
    is_escape_event, is_left_event, is_next_focus_event, is_next_model_event,
    is_next_provider_event, is_previous_focus_event, is_quit_event, is_right_event,
    is_settings_event, is_up_event, Event,
};
use crate::ui::layout::{contains, Regions};
use crate::worker::AppCommand;

impl App {
    /// Traite un événement et retourne les commandes à envoyer au worker
    pub fn handle_event(&mut self, event: &Event, regions: &Regions, now: Instant) -> Vec<AppCommand> {
        match event {
            Event::Tick => Vec::new(),
            Event::Mouse(_) => self.handle_click(event, regions),
            Event::Key(_) => self.handle_key(event, now),
        }
    }

    fn handle_key(&mut self, event: &Event, now: Instant) -> Vec<AppCommand> {
        // Two-step quit
        if is_quit_event(event) {
            if self.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                self.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                self.request_quit();
            }
            return Vec::new();
        }
        // Toute autre touche annule la confirmation
        self.cancel_quit();

        if self.settings.open {
            return self.handle_settings_key(event);
        }

        // Raccourcis globaux
        if is_settings_event(event) {
            info!("User opened settings");
            return vec![self.open_settings()];
        }
        if is_next_provider_event(event) {
            self.chat.next_provider();
            return Vec::new();
        }
        if is_next_model_event(event) {
            self.chat.next_model();
            return Vec::new();
        }
        if is_next_focus_event(event) {
            self.set_focus(self.focus.next());
            return Vec::new();
        }
        if is_previous_focus_event(event) {
            self.set_focus(self.focus.previous());
            return Vec::new();
        }
        if is_escape_event(event) {
            self.autocomplete.hide();
            return Vec::new();
        }

        match self.focus {
            Focus::Ticker => self.handle_ticker_key(event, now),
            Focus::LookBack => self.handle_number_key(event, FormField::LookBack),
            Focus::ForecastDays => self.handle_number_key(event, FormField::ForecastDays),
            Focus::Model => self.handle_model_key(event),
            Focus::Market => self.handle_market_key(event),
            Focus::Chat => self.handle_chat_key(event),
        }
    }

    fn handle_ticker_key(&mut self, event: &Event, now: Instant) -> Vec<AppCommand> {
        if is_down_event(event) {
            self.autocomplete.highlight_next();
        } else if is_up_event(event) {
            self.autocomplete.highlight_previous();
        } else if is_enter_event(event) {
            // Entrée sur une suggestion : sélection, sinon soumission
            if let Some(symbol) = self.autocomplete.select_highlighted() {
                debug!(%symbol, "Suggestion selected");
            } else {
                return self.submit_prediction().into_iter().collect();
            }
        } else if is_backspace_event(event) {
            self.autocomplete.backspace(now);
        } else if let Some(c) = get_char_from_event(event) {
            self.autocomplete.push_char(c, now);
        }
        Vec::new()
    }

    fn handle_number_key(&mut self, event: &Event, field: FormField) -> Vec<AppCommand> {
        if is_enter_event(event) {
            return self.submit_prediction().into_iter().collect();
        }
        if is_backspace_event(event) {
            self.form.backspace(field);
        } else if let Some(c) = get_char_from_event(event) {
            self.form.push_digit(field, c);
        }
        Vec::new()
    }

    fn handle_model_key(&mut self, event: &Event) -> Vec<AppCommand> {
        if is_enter_event(event) {
            return self.submit_prediction().into_iter().collect();
        }
        if is_left_event(event) {
            self.form.model = self.form.model.previous();
        } else if is_right_event(event) || get_char_from_event(event) == Some(' ') {
            self.form.model = self.form.model.next();
        }
        Vec::new()
    }

    fn handle_market_key(&mut self, event: &Event) -> Vec<AppCommand> {
        if is_up_event(event) {
            self.market.navigate_up();
        } else if is_down_event(event) {
            self.market.navigate_down();
        } else if is_enter_event(event) {
            self.copy_market_ticker(self.market.selected);
        }
        Vec::new()
    }

    fn handle_chat_key(&mut self, event: &Event) -> Vec<AppCommand> {
        if is_enter_event(event) {
            return self.send_chat().into_iter().collect();
        }
        if is_backspace_event(event) {
            self.chat.backspace();
        } else if let Some(c) = get_char_from_event(event) {
            self.chat.push_char(c);
        }
        Vec::new()
    }

    fn handle_settings_key(&mut self, event: &Event) -> Vec<AppCommand> {
        if is_escape_event(event) {
            self.settings.close();
        } else if is_enter_event(event) {
            return self.save_settings().into_iter().collect();
        } else if is_next_focus_event(event)
            || is_previous_focus_event(event)
            || is_up_event(event)
            || is_down_event(event)
        {
            self.settings.toggle_field();
        } else if is_backspace_event(event) {
            self.settings.backspace();
        } else if let Some(c) = get_char_from_event(event) {
            self.settings.push_char(c);
        }
        Vec::new()
    }

    // ========================================================================
    // Souris
    // ========================================================================

    fn handle_click(&mut self, event: &Event, regions: &Regions) -> Vec<AppCommand> {
        let Some((x, y)) = get_click_position(event) else {
            return Vec::new();
        };
        self.cancel_quit();

        if self.settings.open {
            return Vec::new();
        }

        // Clic sur une suggestion
        if let Some(index) = regions.dropdown_row_at(x, y) {
            if let Some(symbol) = self.autocomplete.select(index) {
                debug!(%symbol, "Suggestion clicked");
            }
            return Vec::new();
        }

        // Clic en dehors du champ et de la liste : on cache la liste
        let in_dropdown = regions.dropdown.map_or(false, |r| contains(r, x, y));
        if !contains(regions.ticker_input, x, y) && !in_dropdown {
            self.autocomplete.hide();
        }

        if contains(regions.ticker_input, x, y) {
            self.focus = Focus::Ticker;
        } else if let Some(index) = regions.market_row_at(x, y) {
            self.set_focus(Focus::Market);
            self.copy_market_ticker(index);
        } else if contains(regions.chat_input, x, y) {
            self.set_focus(Focus::Chat);
        }
        Vec::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;

    use super::*;
    use crate::config::Config;
    use crate::models::{SearchResult, TickerSummaryItem};
    use crate::ui::layout;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    fn regions(app: &App) -> Regions {
        layout::compute(Rect::new(0, 0, 160, 50), app)
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        let now = Instant::now();

        app.handle_event(&ctrl('c'), &r, now);
        assert!(app.is_running());
        // Une autre touche annule
        app.handle_event(&key(KeyCode::Char('a')), &r, now);
        assert!(!app.is_awaiting_quit_confirmation());

        app.handle_event(&ctrl('q'), &r, now);
        app.handle_event(&ctrl('q'), &r, now);
        assert!(!app.is_running());
    }

    #[test]
    fn test_enter_on_empty_ticker_sends_nothing() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        let commands = app.handle_event(&key(KeyCode::Enter), &r, Instant::now());
        assert!(commands.is_empty());
        assert!(app.form.error.is_some());
    }

    #[test]
    fn test_typing_then_enter_submits() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        let now = Instant::now();
        for c in "TSLA".chars() {
            app.handle_event(&key(KeyCode::Char(c)), &r, now);
        }
        let commands = app.handle_event(&key(KeyCode::Enter), &r, now);
        assert!(matches!(
            commands.as_slice(),
            [AppCommand::Predict { request, .. }] if request.ticker == "TSLA"
        ));

        // Une seconde soumission pendant le chargement est ignorée
        assert!(app.handle_event(&key(KeyCode::Enter), &r, now).is_empty());
    }

    #[test]
    fn test_typing_schedules_debounced_search() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        let now = Instant::now();
        app.tick(now); // premier fetch du market
        app.handle_event(&key(KeyCode::Char('N')), &r, now);
        app.handle_event(&key(KeyCode::Char('V')), &r, now + Duration::from_millis(100));

        assert!(app.tick(now + Duration::from_millis(200)).is_empty());
        assert_eq!(
            app.tick(now + Duration::from_millis(400)),
            vec![AppCommand::Search { seq: 1, query: "NV".to_string() }]
        );
    }

    #[test]
    fn test_settings_popup_captures_keys() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        let now = Instant::now();

        let commands = app.handle_event(&key(KeyCode::F(2)), &r, now);
        assert_eq!(commands, vec![AppCommand::LoadSettings]);
        assert!(app.settings.open);

        // Enter sans clé : refus, aucune commande
        assert!(app.handle_event(&key(KeyCode::Enter), &r, now).is_empty());

        app.handle_event(&key(KeyCode::Tab), &r, now);
        app.handle_event(&key(KeyCode::Char('g')), &r, now);
        assert_eq!(app.settings.gemini_key, "g");
        assert!(app.autocomplete.input.is_empty());

        let commands = app.handle_event(&key(KeyCode::Enter), &r, now);
        assert!(matches!(
            commands.as_slice(),
            [AppCommand::SaveSettings { update }] if update.openai_api_key.is_none()
        ));

        app.handle_event(&key(KeyCode::Esc), &r, now);
        assert!(!app.settings.open);
    }

    #[test]
    fn test_provider_and_model_keys() {
        let mut app = App::new(&Config::default());
        let r = regions(&app);
        app.handle_event(&key(KeyCode::F(3)), &r, Instant::now());
        assert_eq!(app.chat.provider, crate::models::Provider::Gemini);
        let before = app.chat.model_index;
        app.handle_event(&key(KeyCode::F(4)), &r, Instant::now());
        assert_ne!(app.chat.model_index, before);
    }

    #[test]
    fn test_click_outside_hides_dropdown() {
        let mut app = App::new(&Config::default());
        app.autocomplete.visible = true;
        app.autocomplete.suggestions = vec![SearchResult {
            symbol: "AMD".to_string(),
            name: "Advanced Micro Devices".to_string(),
            exchange: "NMS".to_string(),
        }];
        let r = regions(&app);

        // Clic sur le champ : la liste reste
        app.handle_event(&click(r.ticker_input.x + 2, r.ticker_input.y), &r, Instant::now());
        assert!(app.autocomplete.visible);

        // Clic dans le chat : la liste disparaît
        app.handle_event(&click(r.transcript.x + 2, r.transcript.y + 2), &r, Instant::now());
        assert!(!app.autocomplete.visible);
    }

    #[test]
    fn test_click_suggestion_selects_it() {
        let mut app = App::new(&Config::default());
        app.autocomplete.visible = true;
        app.autocomplete.suggestions = vec![SearchResult {
            symbol: "AMD".to_string(),
            name: "Advanced Micro Devices".to_string(),
            exchange: "NMS".to_string(),
        }];
        let r = regions(&app);
        let dropdown = r.dropdown.unwrap();

        app.handle_event(&click(dropdown.x + 1, dropdown.y + 1), &r, Instant::now());
        assert_eq!(app.autocomplete.input, "AMD");
        assert!(!app.autocomplete.visible);
    }

    #[test]
    fn test_click_market_row_copies_ticker() {
        let mut app = App::new(&Config::default());
        app.market.apply(Ok(vec![
            TickerSummaryItem { ticker: "AAPL".to_string(), price: 1.0, change: 0.1, change_pct: 0.1 },
            TickerSummaryItem { ticker: "ETH-USD".to_string(), price: 2.0, change: -0.1, change_pct: -0.1 },
        ]));
        let r = regions(&app);
        let inner = layout::inner(r.market);

        // Deuxième entrée : lignes 2 et 3 de la liste
        let commands = app.handle_event(&click(inner.x + 1, inner.y + 3), &r, Instant::now());
        assert!(commands.is_empty());
        assert_eq!(app.autocomplete.input, "ETH-USD");
        assert_eq!(app.focus, Focus::Market);
    }
}
