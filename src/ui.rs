pub mod play_area;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::{app::App, celebration::Celebration, session::Phase, util::format_seconds};

use play_area::PlayArea;

const HORIZONTAL_MARGIN: u16 = 1;
const MARKER: &str = "@";

struct Chunks {
    header: Rect,
    field: Rect,
    message: Rect,
    legend: Rect,
}

fn split(area: Rect) -> Chunks {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title and difficulty
            Constraint::Min(3),    // field
            Constraint::Length(1), // message
            Constraint::Length(1), // legend
        ])
        .split(area);

    Chunks {
        header: chunks[0],
        field: chunks[1],
        message: chunks[2],
        legend: chunks[3],
    }
}

/// Inner rectangle of the bordered field, where the target can hide
pub fn field_rect(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(split(area).field)
}

/// Measures the field for hit-testing, then renders the whole screen.
pub fn draw(app: &mut App, f: &mut Frame) {
    let area = f.area();
    app.play_area = PlayArea::new(field_rect(area));
    app.screen = (area.width, area.height);
    f.render_widget(&*app, area);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let state = self.session.state();
        let chunks = split(area);

        // header
        let level = state.difficulty().level();
        let gauge: String = (1..=crate::difficulty::Difficulty::MAX)
            .map(|step| if step <= level { '●' } else { '○' })
            .collect();
        let mut header = vec![
            Span::styled("Find the Hasi", bold_style.fg(Color::Cyan)),
            Span::styled(format!("   round {}", state.round()), dim_style),
            Span::raw("   difficulty "),
            Span::styled(gauge, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {}", level)),
        ];
        let field = Block::default().borders(Borders::ALL).inner(chunks.field);
        let play_area = PlayArea::new(field);
        // cell centres can't get close enough to every hiding place
        if play_area.is_measured() && !play_area.can_reach_every_target(state.difficulty()) {
            header.push(Span::styled(
                "   terminal too small",
                bold_style.fg(Color::Red),
            ));
        }
        Paragraph::new(Line::from(header)).render(chunks.header, buf);

        // field
        let scene = self.current_scene();
        let mut block = Block::default().borders(Borders::ALL);
        if let Some(scene) = scene {
            block = block.title(format!(" {} ", scene.name));
        }
        block.render(chunks.field, buf);

        if let Some(scene) = scene {
            for y in field.top()..field.bottom() {
                for x in field.left()..field.right() {
                    if let Some((glyph, color)) = scene.glyph_at(x - field.x, y - field.y) {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_symbol(glyph);
                            cell.set_style(Style::default().fg(color));
                        }
                    }
                }
            }
        }

        render_target(self, play_area, buf);

        // message
        let message = match state.phase() {
            Phase::NotStarted => Line::from(Span::styled("Press (n) to start", italic_style)),
            Phase::Active => Line::from(Span::styled(
                "Searching... click where the Hasi hides",
                italic_style,
            )),
            Phase::Won => Line::from(vec![
                Span::styled("You found the Hasi!", bold_style.fg(Color::Green)),
                Span::raw(time_taken(self)),
            ]),
            Phase::GaveUp => Line::from(vec![
                Span::styled("Better luck next time!", bold_style.fg(Color::Red)),
                Span::raw(" The Hasi was hiding in plain sight."),
                Span::raw(time_taken(self)),
            ]),
        };
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .render(chunks.message, buf);

        let legend = if state.phase() == Phase::Active {
            "(click) search / (g)ive up / (r)estart / (+/-) difficulty / (esc)ape"
        } else {
            "(n)ew game / (+/-) difficulty / (esc)ape"
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks.legend, buf);

        if self.celebration.is_active {
            render_celebration_particles(&self.celebration, area, buf);
        }
    }
}

fn time_taken(app: &App) -> String {
    app.session
        .elapsed_seconds()
        .map(|secs| format!(" Time taken: {} seconds", format_seconds(secs)))
        .unwrap_or_default()
}

/// Faint while searching (if hints are on), bright once found, ringed in red
/// after giving up. The marker always sits on the round's original target.
fn render_target(app: &App, field: PlayArea, buf: &mut Buffer) {
    let state = app.session.state();
    let style = match state.phase() {
        Phase::Active if app.hint => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::DIM),
        Phase::Won => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Phase::GaveUp => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        _ => return,
    };

    let Some((x, y)) = field.cell_of(state.target()) else {
        return;
    };

    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(MARKER);
        cell.set_style(style);
    }

    if state.phase() == Phase::GaveUp {
        let ring = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let rect = field.rect();
        if x > rect.left() {
            if let Some(cell) = buf.cell_mut((x - 1, y)) {
                cell.set_symbol("(");
                cell.set_style(ring);
            }
        }
        if x + 1 < rect.right() {
            if let Some(cell) = buf.cell_mut((x + 1, y)) {
                cell.set_symbol(")");
                cell.set_style(ring);
            }
        }
    }
}

/// Render celebration particles on top of the screen
fn render_celebration_particles(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::LightRed,
        Color::LightYellow,
    ];

    for particle in &celebration.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;

        if x < area.right() && y < area.bottom() {
            let color = colors[particle.color_index % colors.len()];
            let brightness = particle.brightness();

            let style = if brightness > 0.7 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if brightness > 0.3 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(&particle.symbol.to_string());
                cell.set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::session::Session;
    use crate::sources::{ManualClock, SequenceRandom};
    use ratatui::{backend::TestBackend, Terminal};

    fn create_test_app(clock: &ManualClock, hint: bool) -> App {
        let session = Session::new(clock.clone(), SequenceRandom::new(vec![0.3, 0.6]));
        App::new(session, Scene::all().unwrap(), hint)
    }

    fn render(app: &App, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn target_symbol(app: &App, area: Rect, buffer: &Buffer) -> String {
        let field = PlayArea::new(field_rect(area));
        let (x, y) = field.cell_of(app.session.state().target()).unwrap();
        buffer.cell((x, y)).unwrap().symbol().to_string()
    }

    #[test]
    fn test_render_active_round() {
        let app = create_test_app(&ManualClock::new(0), true);
        let area = Rect::new(0, 0, 100, 30);

        let buffer = render(&app, area);
        let text = buffer_text(&buffer);

        assert!(text.contains("Find the Hasi"));
        assert!(text.contains("round 1"));
        assert!(text.contains("birch clearing"));
        assert!(text.contains("Searching..."));
        assert!(text.contains("(g)ive up"));
    }

    #[test]
    fn test_hint_marker_visible_only_with_hint() {
        let area = Rect::new(0, 0, 100, 30);

        let app = create_test_app(&ManualClock::new(0), true);
        assert_eq!(target_symbol(&app, area, &render(&app, area)), MARKER);

        let app = create_test_app(&ManualClock::new(0), false);
        assert_ne!(target_symbol(&app, area, &render(&app, area)), MARKER);
    }

    #[test]
    fn test_render_won_round() {
        let clock = ManualClock::new(1000);
        let mut app = create_test_app(&clock, false);
        let area = Rect::new(0, 0, 100, 30);
        app.play_area = PlayArea::new(field_rect(area));
        let (x, y) = app.play_area.cell_of(app.session.state().target()).unwrap();
        clock.set(3456);
        app.click(x, y);

        let buffer = render(&app, area);
        let text = buffer_text(&buffer);

        assert!(text.contains("You found the Hasi!"));
        assert!(text.contains("Time taken: 2.46 seconds"));
        assert!(text.contains("(n)ew game"));
        assert!(!text.contains("(g)ive up"));
    }

    #[test]
    fn test_render_gave_up_reveals_target() {
        let mut app = create_test_app(&ManualClock::new(0), false);
        app.give_up();
        let area = Rect::new(0, 0, 100, 30);

        let buffer = render(&app, area);
        let text = buffer_text(&buffer);

        assert!(text.contains("Better luck next time!"));
        assert!(text.contains("hiding in plain sight"));
        assert_eq!(target_symbol(&app, area, &buffer), MARKER);
        assert!(text.contains("(@)"));
    }

    #[test]
    fn test_render_difficulty_gauge() {
        let mut app = create_test_app(&ManualClock::new(0), true);
        app.set_difficulty(3);

        let text = buffer_text(&render(&app, Rect::new(0, 0, 100, 30)));

        assert!(text.contains("●●●○○ 3"));
    }

    #[test]
    fn test_warns_when_terminal_too_small_for_difficulty() {
        let mut app = create_test_app(&ManualClock::new(0), true);
        let area = Rect::new(0, 0, 80, 24);

        let text = buffer_text(&render(&app, area));
        assert!(!text.contains("terminal too small"));

        app.set_difficulty(2);
        let text = buffer_text(&render(&app, area));
        assert!(text.contains("●●○○○ 2   terminal too small"));

        let text = buffer_text(&render(&app, Rect::new(0, 0, 300, 120)));
        assert!(!text.contains("terminal too small"));
    }

    #[test]
    fn test_draw_measures_play_area() {
        let mut app = create_test_app(&ManualClock::new(0), true);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|f| draw(&mut app, f)).unwrap();

        assert!(app.play_area.is_measured());
        assert_eq!(app.play_area.rect(), field_rect(Rect::new(0, 0, 80, 24)));
        assert_eq!(app.screen, (80, 24));
    }

    #[test]
    fn test_render_extreme_sizes() {
        let app = create_test_app(&ManualClock::new(0), true);
        for (w, h) in [(1, 1), (10, 3), (20, 5), (300, 100)] {
            let area = Rect::new(0, 0, w, h);
            let buffer = render(&app, area);
            assert_eq!(*buffer.area(), area);
        }
    }

    #[test]
    fn test_celebration_rendering() {
        let clock = ManualClock::new(0);
        let mut app = create_test_app(&clock, false);
        let area = Rect::new(0, 0, 80, 24);
        app.celebration.start(40, 12, 80, 24);
        assert!(app.celebration.is_active);

        let buffer = render(&app, area);

        assert_eq!(*buffer.area(), area);
    }
}
