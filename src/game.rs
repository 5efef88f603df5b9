use std::{thread::sleep, time::Instant};

use log::{debug, info};

use crate::config::{Difficulty, GameConfig};
use crate::input::{any_key_pressed, keys, InputTracker, KeyCode, POINTER_BUTTONS};
use crate::menu::{MenuAction, StartMenu};
use crate::snake::{BodyPath, Direction::{self, *}, Point};
use crate::term::{Result, TermKeys, TermManager};

const SNAKE_BODY_CHAR: char = '█';
const PAUSE_KEY: KeyCode = b'P';
const EXIT_FRAMES: u32 = 30;

/// Keys for each direction, in the order ties are broken.
const DIRECTION_KEYS: [(Direction, [KeyCode; 2]); 4] = [
    (Left, [keys::LEFT, b'A']),
    (Right, [keys::RIGHT, b'D']),
    (Down, [keys::DOWN, b'S']),
    (Up, [keys::UP, b'W']),
];

/// The direction whose key went down this tick. Left wins over Right, which
/// wins over Down, which wins over Up.
pub fn direction_from_keys(input: &InputTracker) -> Option<Direction> {
    DIRECTION_KEYS
        .iter()
        .find(|(_, codes)| codes.iter().any(|&code| input.key_pressed_now(code)))
        .map(|(dir, _)| *dir)
}

/// A body together with its heading and step timing.
pub struct Snake {
    body: BodyPath,
    direction: Direction,
    movement_period: u32,
    movement_frames: u32,
    turn_cooldown: u32,
}

impl Snake {
    pub fn new(head: Point, length: i32, direction: Direction, movement_period: u32) -> Self {
        Snake {
            body: BodyPath::straight(head, length, direction),
            direction,
            movement_period: movement_period.max(1),
            movement_frames: 0,
            turn_cooldown: 0,
        }
    }

    pub fn body(&self) -> &BodyPath {
        &self.body
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_movement_period(&mut self, movement_period: u32) {
        self.movement_period = movement_period.max(1);
    }

    /// Advances one frame. Returns whether the body moved.
    ///
    /// A turn steps right away, then blocks further turns for half a period
    /// so alternating keys can't drag the snake along a diagonal.
    pub fn tick(&mut self, turn: Option<Direction>) -> bool {
        self.movement_frames += 1;
        self.turn_cooldown = self.turn_cooldown.saturating_sub(1);

        if let Some(dir) = turn {
            if dir != self.direction.opposite() && self.turn_cooldown == 0 {
                self.direction = dir;
                self.movement_frames = self.movement_period;
                self.turn_cooldown = self.movement_period / 2;
            }
        }

        if self.movement_frames < self.movement_period {
            return false;
        }

        self.body.move_to(self.direction);
        self.movement_frames = 0;
        true
    }
}

const READY_FRAMES: u32 = 90;

/// What the program is doing, one value per screen the player can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Intro(StartMenu),
    Menu(StartMenu),
    RoundStart { frames: u32, difficulty: Difficulty },
    Playing,
    Paused,
    Exiting(u32),
    Done,
}

impl Phase {
    /// The phase after this tick's input. `quit` is set once the player asked
    /// to leave, which wins over everything but an exit already under way.
    pub fn next(self, input: &InputTracker, quit: bool) -> Phase {
        if quit && !matches!(self, Phase::Exiting(_) | Phase::Done) {
            return Phase::Exiting(0);
        }

        match self {
            Phase::Intro(menu) => {
                if any_key_pressed(input, &POINTER_BUTTONS) {
                    Phase::Menu(menu)
                } else {
                    Phase::Intro(menu)
                }
            }
            Phase::Menu(mut menu) => match menu.handle(input) {
                Some(MenuAction::Start(difficulty)) => Phase::RoundStart { frames: 0, difficulty },
                Some(MenuAction::Exit) => Phase::Exiting(0),
                None => Phase::Menu(menu),
            },
            Phase::RoundStart { frames, difficulty } => {
                if frames + 1 >= READY_FRAMES {
                    Phase::Playing
                } else {
                    Phase::RoundStart { frames: frames + 1, difficulty }
                }
            }
            Phase::Playing if input.key_pressed_now(PAUSE_KEY) => Phase::Paused,
            Phase::Paused if input.key_pressed_now(PAUSE_KEY) => Phase::Playing,
            Phase::Exiting(frames) if frames >= EXIT_FRAMES => Phase::Done,
            Phase::Exiting(frames) => Phase::Exiting(frames + 1),
            phase => phase,
        }
    }

    /// The message shown over the board, if any.
    pub fn message(&self) -> Option<Vec<String>> {
        let lines: &[&str] = match self {
            Phase::Intro(_) => &[
                "Arrow keys or WASD to move",
                "P to pause",
                "Esc to quit",
                "",
                "Press any key to begin",
            ],
            Phase::Menu(menu) => return Some(menu.lines()),
            Phase::RoundStart { .. } => &["Get Ready!"],
            Phase::Playing => return None,
            Phase::Paused => &["Paused", "Press P to resume", "or Esc to quit"],
            Phase::Exiting(_) | Phase::Done => &["Good bye!"],
        };
        Some(lines.iter().map(|line| line.to_string()).collect())
    }

    fn name(&self) -> &'static str {
        match self {
            Phase::Intro(_) => "intro",
            Phase::Menu(_) => "menu",
            Phase::RoundStart { .. } => "round start",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Exiting(_) => "exiting",
            Phase::Done => "done",
        }
    }
}

pub struct SnakeGame {
    config: GameConfig,
    term: TermManager,
    keys: TermKeys,
    input: InputTracker,
    snake: Snake,
    phase: Phase,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        let term = TermManager::new()?;
        let (w, h) = term.get_terminal_size();
        let center = Point::new(w as i32 / 2, h as i32 / 2);
        let period = config.movement_period(config.difficulty);
        let snake = Snake::new(center, config.initial_length, Right, period);
        let phase = Phase::Intro(StartMenu::new(config.difficulty));

        Ok(SnakeGame {
            config,
            term,
            keys: TermKeys::new(false),
            input: InputTracker::new(),
            snake,
            phase,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let reports_release = self.term.setup()?;
        self.keys = TermKeys::new(reports_release);

        self.term.clear()?;
        self.term.draw_borders()?;
        self.print_snake()?;
        let message = self.phase.message();
        self.show_message(message)
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }

    /// Runs the frame loop until the player quits.
    pub fn play(&mut self) -> Result<()> {
        let frame_time = self.config.frame_time();
        let mut next_frame = Instant::now();
        info!("running at {} fps", self.config.fps);

        loop {
            let now = Instant::now();
            if next_frame > now {
                sleep(next_frame - now);
                next_frame += frame_time;
            } else {
                // Fell behind, don't try to catch up
                next_frame = now + frame_time;
            }

            self.keys.pump()?;
            self.input.update(&self.keys);

            if !self.step()? {
                return Ok(());
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Runs one frame against the freshly updated input. Returns false once
    /// the program should stop.
    fn step(&mut self) -> Result<bool> {
        let quit = self.keys.interrupted() || self.input.key_pressed_now(keys::ESCAPE);
        let prev = std::mem::replace(&mut self.phase, Phase::Done);
        let was_playing = prev == Phase::Playing;
        let prev_message = prev.message();
        let prev_name = prev.name();

        let next = prev.next(&self.input, quit);
        if next.name() != prev_name {
            info!("{} -> {}", prev_name, next.name());
        }

        let message = next.message();
        if message != prev_message {
            self.show_message(message)?;
        }

        if let Phase::RoundStart { frames: 0, difficulty } = next {
            let period = self.config.movement_period(difficulty);
            info!("{} difficulty, one step every {} frames", difficulty, period);
            self.snake.set_movement_period(period);
        }

        if was_playing && next == Phase::Playing {
            self.move_snake()?;
        }

        let done = next == Phase::Done;
        self.phase = next;
        Ok(!done)
    }

    fn show_message(&mut self, message: Option<Vec<String>>) -> Result<()> {
        match message {
            Some(lines) => {
                let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
                self.term.show_message(&lines)
            }
            None => self.term.hide_message(),
        }
    }

    fn move_snake(&mut self) -> Result<()> {
        let old_tail = self.snake.body().tail();
        if !self.snake.tick(direction_from_keys(&self.input)) {
            return Ok(());
        }

        let body = self.snake.body();
        debug!("head {:?}, {} turn points, {} steps long", body.head(), body.points().len(), body.len());

        self.term.print_point(old_tail, ' ')?;
        self.print_snake()
    }

    fn print_snake(&mut self) -> Result<()> {
        let points: Vec<Point> = self.snake.body().points().iter().copied().collect();
        self.term.draw_path(&points, SNAKE_BODY_CHAR)?;
        self.term.print_point(self.snake.body().head(), self.snake.direction().head_char())?;
        self.term.flush()
    }
}
