use crate::calendar::CalendarModel;
use crate::layout::Geometry;
use crate::remind::ReminderSource;
use crate::textbox::Surface;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tracing::{debug, warn};

const TOO_SMALL: &str = "terminal too small";

pub fn run<R: ReminderSource>(source: R, poll_interval: Duration) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(source, poll_interval, today());
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

/// What one poll of the input source produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    Resize,
    Timeout,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Days(i64),
    Months(i32),
    Years(i32),
    Today,
    Reload,
    Redraw,
    ScrollNotes(isize),
    Quit,
}

impl Action {
    pub fn from_input(input: Input) -> Option<Action> {
        match input {
            Input::Resize | Input::Timeout => Some(Action::Redraw),
            Input::Key(key) => Action::from_key(key),
            Input::Ignored => None,
        }
    }

    fn from_key(key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER) {
            return None;
        }
        let action = match key.code {
            KeyCode::Char('l') => Action::Days(1),
            KeyCode::Char('h') => Action::Days(-1),
            KeyCode::Char('j') => Action::Days(7),
            KeyCode::Char('k') => Action::Days(-7),
            KeyCode::Char('f') => Action::Months(1),
            KeyCode::Char('b') => Action::Months(-1),
            KeyCode::Char('n') => Action::Years(1),
            KeyCode::Char('p') => Action::Years(-1),
            KeyCode::Char('t') => Action::Today,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('x') => Action::Redraw,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char(',') => Action::ScrollNotes(1),
            KeyCode::Char('.') => Action::ScrollNotes(-1),
            _ => return None,
        };
        Some(action)
    }
}

struct App<R> {
    calendar: CalendarModel<R>,
    screen: Buffer,
    poll_interval: Duration,
}

impl<R: ReminderSource> App<R> {
    fn new(source: R, poll_interval: Duration, today: NaiveDate) -> Self {
        App {
            calendar: CalendarModel::new(source, today),
            screen: Buffer::empty(Rect::default()),
            poll_interval,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        self.redraw(terminal.size()?)?;
        self.calendar.set_date(&mut self.screen, today())?;
        loop {
            let screen = &self.screen;
            terminal.draw(|f| blit(screen, f.buffer_mut()))?;
            let input = next_input(self.poll_interval)?;
            let now = today();
            let Some(action) = Action::from_input(input) else {
                continue;
            };
            if action == Action::Quit {
                break;
            }
            if action == Action::Redraw {
                self.redraw(terminal.size()?)?;
            }
            self.apply(action, now)?;
        }
        Ok(())
    }

    fn apply(&mut self, action: Action, today: NaiveDate) -> Result<()> {
        let screen = &mut self.screen;
        match action {
            Action::Days(days) => self.calendar.jump_days(screen, days)?,
            Action::Months(months) => self.calendar.jump_months(screen, months)?,
            Action::Years(years) => self.calendar.jump_years(screen, years)?,
            Action::Today => self.calendar.today(screen, today)?,
            Action::Reload => self.calendar.reload(screen)?,
            Action::Redraw => self.calendar.refresh(screen)?,
            Action::ScrollNotes(lines) => self.calendar.scroll_notes(screen, lines)?,
            Action::Quit => {}
        }
        Ok(())
    }

    /// Lays out the grid again for `size`; call [`CalendarModel::refresh`]
    /// afterwards to put the month back on screen.
    fn redraw(&mut self, size: Rect) -> Result<()> {
        self.screen.resize(size);
        self.screen.clear_all();
        let geometry = Geometry::compute(size.width, size.height);
        match &geometry {
            Some(g) => {
                debug!(?g, "redrawing layout");
                g.draw_grid(&mut self.screen)?;
            }
            None => {
                warn!(cols = size.width, rows = size.height, "terminal too small");
                if size.area() > 0 {
                    let notice: String = TOO_SMALL.chars().take(size.width as usize).collect();
                    self.screen.put_str(0, 0, &notice, false)?;
                }
            }
        }
        self.calendar.relocate(&mut self.screen, geometry.as_ref())?;
        Ok(())
    }
}

/// Copies the persistent screen into the frame ratatui is about to flush.
fn blit(screen: &Buffer, frame: &mut Buffer) {
    let area = screen.area.intersection(frame.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            *frame.get_mut(x, y) = screen.get(x, y).clone();
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Waits up to `timeout` for the next event. Running out of time is a normal
/// result, not an error.
fn next_input(timeout: Duration) -> Result<Input> {
    if !event::poll(timeout)? {
        return Ok(Input::Timeout);
    }
    let input = match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Input::Key(key),
        Event::Resize(..) => Input::Resize,
        _ => Input::Ignored,
    };
    Ok(input)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remind::{Reminder, SourceError};

    struct Empty;

    impl ReminderSource for Empty {
        fn fetch_month(&mut self, _month: u32, _year: i32) -> Result<Vec<Reminder>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn key(c: char) -> Input {
        Input::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(Action::from_input(key('l')), Some(Action::Days(1)));
        assert_eq!(Action::from_input(key('k')), Some(Action::Days(-7)));
        assert_eq!(Action::from_input(key('b')), Some(Action::Months(-1)));
        assert_eq!(Action::from_input(key('n')), Some(Action::Years(1)));
        assert_eq!(Action::from_input(key(',')), Some(Action::ScrollNotes(1)));
        assert_eq!(Action::from_input(key('.')), Some(Action::ScrollNotes(-1)));
        assert_eq!(Action::from_input(key('q')), Some(Action::Quit));
        assert_eq!(Action::from_input(key('z')), None);
    }

    #[test]
    fn timeouts_and_resizes_redraw() {
        assert_eq!(Action::from_input(Input::Timeout), Some(Action::Redraw));
        assert_eq!(Action::from_input(Input::Resize), Some(Action::Redraw));
        assert_eq!(Action::from_input(Input::Ignored), None);
        assert_eq!(Action::from_input(key('x')), Some(Action::Redraw));
    }

    #[test]
    fn modified_keys_are_ignored_except_ctrl_c() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let alt_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::ALT);
        assert_eq!(Action::from_input(Input::Key(ctrl_c)), Some(Action::Quit));
        assert_eq!(Action::from_input(Input::Key(alt_l)), None);
    }

    #[test]
    fn redraw_keeps_selection_and_resizes_screen() {
        let mut app = App::new(Empty, Duration::from_secs(1), date(2024, 6, 12));
        app.redraw(Rect::new(0, 0, 80, 24)).unwrap();
        app.calendar.set_date(&mut app.screen, date(2024, 6, 12)).unwrap();
        app.apply(Action::Days(1), date(2024, 6, 12)).unwrap();
        app.redraw(Rect::new(0, 0, 120, 40)).unwrap();
        app.apply(Action::Redraw, date(2024, 6, 12)).unwrap();
        assert_eq!(app.screen.area, Rect::new(0, 0, 120, 40));
        assert_eq!(app.calendar.selected(), date(2024, 6, 13));
        let lit = app.calendar.days().iter().filter(|c| c.is_highlighted()).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn today_uses_the_supplied_date() {
        let mut app = App::new(Empty, Duration::from_secs(1), date(2024, 6, 12));
        app.redraw(Rect::new(0, 0, 80, 24)).unwrap();
        app.calendar.set_date(&mut app.screen, date(2024, 6, 12)).unwrap();
        app.apply(Action::Years(3), date(2024, 6, 12)).unwrap();
        app.apply(Action::Today, date(2024, 6, 13)).unwrap();
        assert_eq!(app.calendar.selected(), date(2024, 6, 13));
    }

    #[test]
    fn tiny_terminal_shows_notice() {
        let mut app = App::new(Empty, Duration::from_secs(1), date(2024, 6, 12));
        app.redraw(Rect::new(0, 0, 12, 4)).unwrap();
        app.calendar.set_date(&mut app.screen, date(2024, 6, 12)).unwrap();
        let row: String = (0..12).map(|x| app.screen.get(x, 0).symbol().to_string()).collect();
        assert_eq!(row, "terminal too");
        app.redraw(Rect::new(0, 0, 80, 24)).unwrap();
        app.apply(Action::Redraw, date(2024, 6, 12)).unwrap();
        assert_eq!(app.calendar.days()[0].text_box().area(), Rect::new(2, 4, 8, 2));
    }
}
