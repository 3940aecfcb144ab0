use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::celebration::Celebration;
use crate::runtime::HasiEvent;
use crate::scene::Scene;
use crate::session::{ClickOutcome, Phase, Session};
use crate::ui::play_area::PlayArea;

/// What the event loop should do after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Binds the session engine to the terminal: scenes, the measured field,
/// and the win animation.
#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub scenes: Vec<Scene>,
    pub play_area: PlayArea,
    pub celebration: Celebration,
    pub hint: bool,
    /// Full terminal size at the last draw, bounds the celebration
    pub screen: (u16, u16),
}

impl App {
    /// Creates the app and starts the first round right away.
    pub fn new(session: Session, scenes: Vec<Scene>, hint: bool) -> Self {
        let mut app = Self {
            session,
            scenes,
            play_area: PlayArea::default(),
            celebration: Celebration::new(),
            hint,
            screen: (80, 24),
        };
        app.new_round();
        app
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenes
            .get(self.session.state().background_selector() % self.scenes.len().max(1))
    }

    /// Starts a fresh round from any phase; an unfinished round is abandoned.
    pub fn new_round(&mut self) {
        self.celebration.stop();
        self.session.start(self.scenes.len());
    }

    /// Resolves a click at a terminal cell. Clicks outside the field, or
    /// before it has been drawn, never reach the session.
    pub fn click(&mut self, column: u16, row: u16) -> ClickOutcome {
        let Some(point) = self.play_area.normalize(column, row) else {
            return ClickOutcome::Ignored;
        };

        let outcome = self.session.resolve_click(point);
        if outcome == ClickOutcome::Hit {
            if let Some((x, y)) = self.play_area.cell_of(self.session.state().target()) {
                self.celebration.start(x, y, self.screen.0, self.screen.1);
            }
        }
        outcome
    }

    pub fn give_up(&mut self) -> bool {
        self.session.give_up()
    }

    pub fn set_difficulty(&mut self, level: i64) {
        self.session.set_difficulty(level);
    }

    pub fn harder(&mut self) {
        let next = self.session.state().difficulty().harder();
        self.session.set_difficulty(next.level() as i64);
    }

    pub fn easier(&mut self) {
        let next = self.session.state().difficulty().easier();
        self.session.set_difficulty(next.level() as i64);
    }

    pub fn on_tick(&mut self) {
        self.celebration.update();
    }

    /// True while something on screen changes without input
    pub fn is_animating(&self) -> bool {
        self.celebration.is_active
    }

    pub fn handle_event(&mut self, event: HasiEvent) -> Flow {
        match event {
            HasiEvent::Key(key) => self.handle_key(key),
            HasiEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Flow::Continue
            }
            HasiEvent::Tick => {
                self.on_tick();
                Flow::Continue
            }
            HasiEvent::Resize => Flow::Continue,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let outcome = self.click(mouse.column, mouse.row);
            debug!(column = mouse.column, row = mouse.row, ?outcome, "click");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }

        // ctrl+c to quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('r') => self.new_round(),
            KeyCode::Char('g') => {
                if self.session.phase() == Phase::Active {
                    self.give_up();
                }
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.harder(),
            KeyCode::Left | KeyCode::Char('-') => self.easier(),
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(level) = c.to_digit(10) {
                    self.set_difficulty(level as i64);
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ManualClock, SequenceRandom};
    use assert_matches::assert_matches;
    use ratatui::layout::Rect;

    fn create_test_app(clock: &ManualClock) -> App {
        let session = Session::new(clock.clone(), SequenceRandom::new(vec![0.5]));
        let mut app = App::new(session, Scene::all().unwrap(), true);
        app.play_area = PlayArea::new(Rect::new(0, 0, 100, 50));
        app
    }

    fn target_cell(app: &App) -> (u16, u16) {
        app.play_area.cell_of(app.session.state().target()).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_new_app_auto_starts() {
        let app = create_test_app(&ManualClock::new(0));

        assert_eq!(app.session.phase(), Phase::Active);
        assert_eq!(app.session.state().round(), 1);
        assert_eq!(app.session.state().background_selector(), 1);
        assert_eq!(app.current_scene().unwrap().name, "birch clearing");
    }

    #[test]
    fn test_click_on_target_wins_and_celebrates() {
        let clock = ManualClock::new(1000);
        let mut app = create_test_app(&clock);
        let (x, y) = target_cell(&app);
        clock.advance(1456);

        assert_matches!(app.click(x, y), ClickOutcome::Hit);
        assert_eq!(app.session.phase(), Phase::Won);
        assert_eq!(app.session.elapsed_seconds(), Some(1.46));
        assert!(app.celebration.is_active);
    }

    #[test]
    fn test_click_far_away_misses() {
        let mut app = create_test_app(&ManualClock::new(0));

        assert_matches!(app.click(0, 0), ClickOutcome::Miss);
        assert_eq!(app.session.phase(), Phase::Active);
        assert!(!app.celebration.is_active);
    }

    #[test]
    fn test_click_outside_field_is_suppressed() {
        let mut app = create_test_app(&ManualClock::new(0));
        app.play_area = PlayArea::new(Rect::new(5, 5, 10, 10));

        assert_matches!(app.click(0, 0), ClickOutcome::Ignored);
        assert_matches!(app.click(15, 5), ClickOutcome::Ignored);
    }

    #[test]
    fn test_click_before_first_draw_is_suppressed() {
        let session = Session::new(ManualClock::new(0), SequenceRandom::new(vec![0.5]));
        let mut app = App::new(session, Scene::all().unwrap(), true);

        assert_matches!(app.click(40, 12), ClickOutcome::Ignored);
        assert_eq!(app.session.phase(), Phase::Active);
    }

    #[test]
    fn test_give_up_key() {
        let mut app = create_test_app(&ManualClock::new(0));
        let target = app.session.state().target();

        assert_eq!(app.handle_key(key(KeyCode::Char('g'))), Flow::Continue);

        assert_eq!(app.session.phase(), Phase::GaveUp);
        assert_eq!(app.session.state().target(), target);
    }

    #[test]
    fn test_new_round_keys() {
        for code in [KeyCode::Char('n'), KeyCode::Char('r'), KeyCode::Enter] {
            let mut app = create_test_app(&ManualClock::new(0));
            app.give_up();

            app.handle_key(key(code));

            assert_eq!(app.session.phase(), Phase::Active);
            assert_eq!(app.session.state().round(), 2);
        }
    }

    #[test]
    fn test_new_round_stops_celebration() {
        let mut app = create_test_app(&ManualClock::new(0));
        let (x, y) = target_cell(&app);
        app.click(x, y);
        assert!(app.is_animating());

        app.new_round();

        assert!(!app.is_animating());
        assert_eq!(app.session.phase(), Phase::Active);
    }

    #[test]
    fn test_difficulty_keys() {
        let mut app = create_test_app(&ManualClock::new(0));

        app.handle_key(key(KeyCode::Char('+')));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.state().difficulty().level(), 3);

        app.handle_key(key(KeyCode::Char('-')));
        assert_eq!(app.session.state().difficulty().level(), 2);

        app.handle_key(key(KeyCode::Char('5')));
        app.handle_key(key(KeyCode::Char('=')));
        assert_eq!(app.session.state().difficulty().level(), 5);

        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.session.state().difficulty().level(), 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = create_test_app(&ManualClock::new(0));

        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Flow::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('c'))), Flow::Continue);
    }

    #[test]
    fn test_mouse_left_down_clicks() {
        let mut app = create_test_app(&ManualClock::new(0));
        let (x, y) = target_cell(&app);

        let flow = app.handle_event(HasiEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(app.session.phase(), Phase::Active);

        app.handle_event(HasiEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(app.session.phase(), Phase::Won);
    }

    #[test]
    fn test_tick_advances_celebration() {
        let mut app = create_test_app(&ManualClock::new(0));
        let (x, y) = target_cell(&app);
        app.click(x, y);

        app.handle_event(HasiEvent::Tick);

        assert!(app.celebration.elapsed > 0.0);
    }

    #[test]
    fn test_click_after_give_up_ignored() {
        let mut app = create_test_app(&ManualClock::new(0));
        app.give_up();
        let (x, y) = target_cell(&app);

        assert_matches!(app.click(x, y), ClickOutcome::Ignored);
        assert_eq!(app.session.phase(), Phase::GaveUp);
    }
}
