use std::io::{self, stdout, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};
use log::{debug, info};
use thiserror::Error;

use crate::input::{keys, KeyCode, RawKeySource, POINTER_BUTTONS};
use crate::snake::{segment_cells, Point};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

const MIN_WIDTH: TermInt = 30;
const MIN_HEIGHT: TermInt = 10;

/// How long a key stays down after its last press when the terminal never
/// reports releases. Covers the delay before keyboard auto-repeat kicks in.
const REPEAT_WINDOW: Duration = Duration::from_millis(600);

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("terminal is {width}x{height}, need at least {}x{}", MIN_WIDTH, MIN_HEIGHT)]
    TooSmall { width: TermInt, height: TermInt },
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    enhanced_keys: bool,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(Error::TooSmall { width, height });
        }

        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None, enhanced_keys: false })
    }

    /// Takes over the terminal. Returns whether key releases will be reported.
    pub fn setup(&mut self) -> Result<bool> {
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;

        // Only terminals speaking the kitty keyboard protocol send releases.
        self.enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced_keys {
            execute!(self.stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
        }

        info!("terminal {}x{}, key release events: {}", self.width, self.height, self.enhanced_keys);
        Ok(self.enhanced_keys)
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.enhanced_keys {
            execute!(self.stdout, PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, DisableMouseCapture, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn draw_borders(&mut self) -> Result<()> {
        let (width, height) = (self.width, self.height);
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    /// Draws a turn-point path as straight runs. Each run covers both of its
    /// end points, so the corner shared by two runs is drawn by both.
    pub fn draw_path(&mut self, points: &[Point], ch: char) -> Result<()> {
        match points {
            [] => Ok(()),
            [single] => self.print_point(*single, ch),
            _ => {
                for pair in points.windows(2) {
                    for cell in segment_cells(pair[0], pair[1]) {
                        self.print_point(cell, ch)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Prints at a game position, dropping anything that falls on or outside
    /// the border.
    pub fn print_point(&mut self, pos: Point, ch: char) -> Result<()> {
        match self.interior_coords(pos) {
            Some(coords) => self.print_at(coords, ch),
            None => Ok(()),
        }
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0 - msg_width / 2, center.1 - msg_height / 2);

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back what the message was covering
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                let ch = self.screen[self.width as usize * y as usize + x as usize];
                self.print_at_no_save((x, y), ch)?;
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        if self.covered_by_message(pos) {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn interior_coords(&self, pos: Point) -> Option<Coords> {
        let inside = pos.x >= 1
            && pos.y >= 1
            && pos.x < self.width as i32 - 1
            && pos.y < self.height as i32 - 1;
        if inside { Some((pos.x as TermInt, pos.y as TermInt)) } else { None }
    }

    fn covered_by_message(&self, pos: Coords) -> bool {
        self.current_msg.as_ref().map_or(false, |msg| msg.contains(pos))
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // Messages don't go into the screen buffer so it can restore what
        // they covered
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }
}

impl Message {
    fn contains(&self, pos: Coords) -> bool {
        (self.top_left.0..self.top_left.0 + self.width).contains(&pos.0)
            && (self.top_left.1..self.top_left.1 + self.height).contains(&pos.1)
    }
}

/// Raw key state assembled from terminal events.
///
/// Terminals that never send release events only repeat presses while a
/// key is held, so a key counts as down until `REPEAT_WINDOW` passes without
/// another press. A held key then gives a single edge, at the price of a
/// quick second tap inside the window being read as the same press. The
/// first release event seen switches to tracking real releases.
pub struct TermKeys {
    down: [bool; 256],
    last_press: [Option<Instant>; 256],
    reports_release: bool,
    interrupted: bool,
}

impl TermKeys {
    pub fn new(reports_release: bool) -> Self {
        TermKeys { down: [false; 256], last_press: [None; 256], reports_release, interrupted: false }
    }

    /// Drains every pending terminal event. Call once per tick, before the
    /// input tracker samples this source.
    pub fn pump(&mut self) -> Result<()> {
        let now = Instant::now();
        if !self.reports_release {
            self.expire_presses(now);
        }

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(ev) => self.on_key(ev, now),
                Event::Mouse(ev) => self.on_mouse(ev),
                _ => {}
            }
        }

        Ok(())
    }

    /// Whether CTRL+C was seen.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Lets go of keys whose last press is older than the repeat window.
    fn expire_presses(&mut self, now: Instant) {
        for (code, down) in self.down.iter_mut().enumerate() {
            if POINTER_BUTTONS.contains(&(code as KeyCode)) {
                continue;
            }
            *down = self.last_press[code].map_or(false, |at| now.duration_since(at) < REPEAT_WINDOW);
        }
    }

    fn on_key(&mut self, ev: KeyEvent, now: Instant) {
        if is_ctrl_c(&ev) {
            self.interrupted = true;
            return;
        }

        let code = match key_code(ev.code) {
            Some(code) => code,
            None => return,
        };

        let down = match ev.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.last_press[code as usize] = Some(now);
                true
            }
            KeyEventKind::Release => {
                if !self.reports_release {
                    debug!("terminal reports key releases");
                    self.reports_release = true;
                }
                false
            }
        };
        self.down[code as usize] = down;
    }

    fn on_mouse(&mut self, ev: MouseEvent) {
        match ev.kind {
            MouseEventKind::Down(button) => self.down[mouse_code(button) as usize] = true,
            MouseEventKind::Up(button) => self.down[mouse_code(button) as usize] = false,
            _ => {}
        }
    }
}

impl RawKeySource for TermKeys {
    fn is_key_down(&self, code: KeyCode) -> bool {
        self.down[code as usize]
    }
}

fn key_code(code: event::KeyCode) -> Option<KeyCode> {
    use event::KeyCode as K;

    match code {
        K::Left => Some(keys::LEFT),
        K::Right => Some(keys::RIGHT),
        K::Up => Some(keys::UP),
        K::Down => Some(keys::DOWN),
        K::Enter => Some(keys::RETURN),
        K::Esc => Some(keys::ESCAPE),
        K::Tab => Some(keys::TAB),
        K::Backspace => Some(keys::BACKSPACE),
        K::Char(' ') => Some(keys::SPACE),
        K::Char(ch) => keys::char_key(ch),
        _ => None,
    }
}

fn mouse_code(button: MouseButton) -> KeyCode {
    match button {
        MouseButton::Left => keys::LBUTTON,
        MouseButton::Right => keys::RBUTTON,
        MouseButton::Middle => keys::MBUTTON,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == event::KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use crate::input::InputTracker;

    fn key(code: event::KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    #[test]
    fn maps_terminal_keys() {
        assert_eq!(key_code(event::KeyCode::Left), Some(keys::LEFT));
        assert_eq!(key_code(event::KeyCode::Char('a')), Some(b'A'));
        assert_eq!(key_code(event::KeyCode::Char(' ')), Some(keys::SPACE));
        assert_eq!(key_code(event::KeyCode::F(1)), None);
        assert_eq!(mouse_code(MouseButton::Left), keys::LBUTTON);
    }

    #[test]
    fn press_without_release_holds_until_release() {
        let mut keys_src = TermKeys::new(true);
        keys_src.on_key(key(event::KeyCode::Up, KeyEventKind::Press), Instant::now());
        assert!(keys_src.is_key_down(keys::UP));
        keys_src.on_key(key(event::KeyCode::Up, KeyEventKind::Repeat), Instant::now());
        assert!(keys_src.is_key_down(keys::UP));
        keys_src.on_key(key(event::KeyCode::Up, KeyEventKind::Release), Instant::now());
        assert!(!keys_src.is_key_down(keys::UP));
    }

    #[test]
    fn first_release_switches_to_release_tracking() {
        let mut keys_src = TermKeys::new(false);
        keys_src.on_key(key(event::KeyCode::Down, KeyEventKind::Release), Instant::now());
        assert!(keys_src.reports_release);
    }

    #[test]
    fn ctrl_c_interrupts() {
        let mut keys_src = TermKeys::new(false);
        let mut ev = key(event::KeyCode::Char('c'), KeyEventKind::Press);
        ev.modifiers = KeyModifiers::CONTROL;
        keys_src.on_key(ev, Instant::now());
        assert!(keys_src.interrupted());
        assert!(!keys_src.is_key_down(b'C'));
    }

    #[test]
    fn tracker_sees_terminal_press() {
        let mut keys_src = TermKeys::new(true);
        let mut tracker = InputTracker::new();
        keys_src.on_key(key(event::KeyCode::Enter, KeyEventKind::Press), Instant::now());
        tracker.update(&keys_src);
        assert!(tracker.key_pressed_now(keys::RETURN));
        tracker.update(&keys_src);
        assert!(tracker.key_is_down(keys::RETURN));
        assert!(!tracker.key_pressed_now(keys::RETURN));
    }

    #[test]
    fn held_key_without_releases_gives_one_edge() {
        let mut keys_src = TermKeys::new(false);
        let mut tracker = InputTracker::new();
        let start = Instant::now();
        let mut edges = 0;

        // Auto-repeat starts after 500ms, then fires every 40ms
        let mut repeats = vec![start];
        repeats.extend((0..10).map(|i| start + Duration::from_millis(500 + 40 * i)));

        for frame in 0..60u64 {
            let now = start + Duration::from_millis(16 * frame);
            keys_src.expire_presses(now);
            while repeats.first().map_or(false, |&at| at <= now) {
                let at = repeats.remove(0);
                keys_src.on_key(key(event::KeyCode::Char('p'), KeyEventKind::Press), at);
            }
            tracker.update(&keys_src);
            if tracker.key_pressed_now(b'P') {
                edges += 1;
            }
        }

        assert_eq!(edges, 1);
    }

    #[test]
    fn key_without_releases_lets_go_after_the_window() {
        let mut keys_src = TermKeys::new(false);
        let start = Instant::now();
        keys_src.on_key(key(event::KeyCode::Left, KeyEventKind::Press), start);

        keys_src.expire_presses(start + REPEAT_WINDOW / 2);
        assert!(keys_src.is_key_down(keys::LEFT));

        keys_src.expire_presses(start + REPEAT_WINDOW);
        assert!(!keys_src.is_key_down(keys::LEFT));
    }

    #[test]
    fn expiry_leaves_mouse_buttons_alone() {
        let mut keys_src = TermKeys::new(false);
        keys_src.down[keys::LBUTTON as usize] = true;
        keys_src.expire_presses(Instant::now());
        assert!(keys_src.is_key_down(keys::LBUTTON));
    }
}
