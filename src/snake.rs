use std::collections::VecDeque;
use std::ops::{Add, Sub};

use thiserror::Error;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Number of unit steps along an axis-aligned delta.
    fn axis_len(self) -> usize {
        (self.x.abs() + self.y.abs()) as usize
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [Right, Up, Left, Down]
    }

    pub fn unit(self) -> Point {
        match self {
            Right => Point::new(1, 0),
            Up => Point::new(0, -1),
            Left => Point::new(-1, 0),
            Down => Point::new(0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Right => Left,
            Up => Down,
            Left => Right,
            Down => Up,
        }
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }

    /// Direction of a non-zero axis-aligned delta.
    fn of_delta(delta: Point) -> Option<Direction> {
        match (delta.x.signum(), delta.y.signum()) {
            (1, 0) => Some(Right),
            (-1, 0) => Some(Left),
            (0, -1) => Some(Up),
            (0, 1) => Some(Down),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("a body path needs at least one point")]
    Empty,
    #[error("points {0:?} and {1:?} coincide")]
    ZeroLength(Point, Point),
    #[error("segment {0:?} -> {1:?} is not horizontal or vertical")]
    Diagonal(Point, Point),
}

/// Snake body stored as its turn points, tail first and head last.
///
/// Consecutive points are joined by horizontal or vertical runs, so the
/// number of stored points grows with the number of turns rather than with
/// the length of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPath {
    points: VecDeque<Point>,
}

impl BodyPath {
    /// A body of a single point. It has nothing to shrink, so its first
    /// `move_to` grows it to one step; from then on moves keep the length.
    pub fn new(seed: Point) -> Self {
        BodyPath { points: VecDeque::from(vec![seed]) }
    }

    /// A straight body of `len` unit steps that ends at `head` heading in `dir`.
    /// A `len` of zero gives a single point, see `BodyPath::new`.
    pub fn straight(head: Point, len: i32, dir: Direction) -> Self {
        let unit = dir.unit();
        let tail = Point::new(head.x - unit.x * len, head.y - unit.y * len);
        if tail == head {
            BodyPath::new(head)
        } else {
            BodyPath { points: VecDeque::from(vec![tail, head]) }
        }
    }

    pub fn from_points<I>(points: I) -> Result<Self, PathError>
    where
        I: IntoIterator,
        I::Item: Into<Point>,
    {
        let points: VecDeque<Point> = points.into_iter().map(Into::into).collect();
        if points.is_empty() {
            return Err(PathError::Empty);
        }

        for (&a, &b) in points.iter().zip(points.iter().skip(1)) {
            if a == b {
                return Err(PathError::ZeroLength(a, b));
            }
            if a.x != b.x && a.y != b.y {
                return Err(PathError::Diagonal(a, b));
            }
        }

        Ok(BodyPath { points })
    }

    pub fn points(&self) -> &VecDeque<Point> {
        &self.points
    }

    pub fn head(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn tail(&self) -> Point {
        self.points[0]
    }

    /// Length of the body in unit steps.
    pub fn len(&self) -> usize {
        self.segments().map(|(a, b)| (b - a).axis_len()).sum()
    }

    /// Number of cells the body covers.
    pub fn cell_count(&self) -> usize {
        self.len() + 1
    }

    /// Heading of the segment that ends at the head, if the body has one.
    pub fn direction(&self) -> Option<Direction> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Direction::of_delta(self.points[n - 1] - self.points[n - 2])
    }

    /// Removes one unit step from the tail end.
    pub fn shrink_tail(&mut self) {
        if self.points.len() < 2 {
            return;
        }

        let next = self.points[1];
        let tail = &mut self.points[0];
        let delta = next - *tail;
        if delta.y == 0 {
            tail.x += delta.x.signum();
        } else {
            tail.y += delta.y.signum();
        }

        if *tail == next {
            self.points.pop_front();
        }
    }

    /// Adds one unit step at the head. A step that continues the last
    /// segment still gets a point of its own.
    pub fn grow_head(&mut self, dir: Direction) {
        let new_head = self.head() + dir.unit();
        self.points.push_back(new_head);
    }

    /// Shifts the body one cell forward in `dir`, keeping its length.
    pub fn move_to(&mut self, dir: Direction) {
        self.shrink_tail();
        self.grow_head(dir);
    }

    /// Whether no two adjacent points coincide and every segment is straight.
    pub fn is_well_formed(&self) -> bool {
        !self.points.is_empty()
            && self.segments().all(|(a, b)| a != b && (a.x == b.x || a.y == b.y))
    }

    /// Every cell covered by the body from tail to head, corners listed once.
    pub fn cells(&self) -> Vec<Point> {
        let mut cells = vec![self.tail()];
        for (a, b) in self.segments() {
            cells.extend(segment_cells(a, b).skip(1));
        }
        cells
    }

    fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.iter().copied().zip(self.points.iter().copied().skip(1))
    }
}

/// Cells of the straight run from `from` to `to`, both ends included.
///
/// Walks along x when the run is horizontal and along y otherwise, the same
/// way the tail is consumed by `BodyPath::shrink_tail`.
pub fn segment_cells(from: Point, to: Point) -> impl Iterator<Item = Point> {
    let delta = to - from;
    let (step, len) = if delta.y == 0 {
        (Point::new(delta.x.signum(), 0), delta.x.abs())
    } else {
        (Point::new(0, delta.y.signum()), delta.y.abs())
    };

    (0..=len).map(move |i| Point::new(from.x + step.x * i, from.y + step.y * i))
}
