//! Game state: playfield, falling piece, rotation, line clear, score.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use thiserror::Error;

/// Window size the default grid is derived from, in pixels.
pub const WIDTH: u16 = 300;
pub const HEIGHT: u16 = 600;
/// Edge length of one grid cell, in pixels.
pub const BLOCK_SIZE: u16 = 30;

/// Number of piece colours. Colours are indices `0..PALETTE_LEN`; the background is [`Cell::Empty`].
pub const PALETTE_LEN: u8 = 6;

const MIN_GRID_WIDTH: u16 = 4;
const MIN_GRID_HEIGHT: u16 = 2;
/// Upper bounds keep the drawn board's terminal size within `u16`.
const MAX_GRID_WIDTH: u16 = 1024;
const MAX_GRID_HEIGHT: u16 = 1024;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must be at least 4 columns wide, got {0}")]
    TooNarrow(u16),
    #[error("grid must be at least 2 rows tall, got {0}")]
    TooShort(u16),
    #[error("grid must be at most 1024 columns wide, got {0}")]
    TooWide(u16),
    #[error("grid must be at most 1024 rows tall, got {0}")]
    TooTall(u16),
    #[error("block size must be non-zero")]
    ZeroBlockSize,
}

/// Grid dimensions in cells. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    width: u16,
    height: u16,
}

impl GridSize {
    pub fn new(width: u16, height: u16) -> Result<Self, GridError> {
        if width < MIN_GRID_WIDTH {
            return Err(GridError::TooNarrow(width));
        }
        if height < MIN_GRID_HEIGHT {
            return Err(GridError::TooShort(height));
        }
        if width > MAX_GRID_WIDTH {
            return Err(GridError::TooWide(width));
        }
        if height > MAX_GRID_HEIGHT {
            return Err(GridError::TooTall(height));
        }
        Ok(Self { width, height })
    }

    /// Cells that fit in a `width` x `height` pixel surface with square cells of `block` pixels.
    pub fn from_pixels(width: u16, height: u16, block: u16) -> Result<Self, GridError> {
        if block == 0 {
            return Err(GridError::ZeroBlockSize);
        }
        Self::new(width / block, height / block)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: WIDTH / BLOCK_SIZE,
            height: HEIGHT / BLOCK_SIZE,
        }
    }
}

/// Tetromino kinds (I, O, T, S, Z, L, J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::L, Self::J];

    /// Spawn orientation, row by row from the top of the bounding box.
    fn pattern(&self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
            Self::L => &[&[1, 0, 0], &[1, 1, 1]],
            Self::J => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }
}

/// Boolean cell matrix of a piece; `rows[y][x]`, origin at the top-left of the bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn of(kind: TetrominoKind) -> Self {
        let rows = kind
            .pattern()
            .iter()
            .map(|row| row.iter().map(|&b| b != 0).collect())
            .collect();
        Self { rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Clockwise quarter turn: transpose of the row-reversed matrix.
    pub fn rotated_cw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let rows = (0..w)
            .map(|x| (0..h).map(|y| self.rows[h - 1 - y][x]).collect())
            .collect();
        Self { rows }
    }

    /// Counter-clockwise quarter turn; undoes [`Shape::rotated_cw`].
    pub fn rotated_ccw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let rows = (0..w)
            .map(|x| (0..h).map(|y| self.rows[y][w - 1 - x]).collect())
            .collect();
        Self { rows }
    }

    /// Filled cells as (x, y) relative to the bounding box.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }
}

/// A piece: shape, colour index and board offset of its bounding box.
///
/// Pieces are values; moving or rotating yields a new piece and the engine
/// swaps it in whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoKind,
    shape: Shape,
    color: u8,
    x: i32,
    y: i32,
}

impl Piece {
    /// Spawn orientation, horizontally centred on a grid `grid_width` cells wide, at row 0.
    pub fn new(kind: TetrominoKind, color: u8, grid_width: usize) -> Self {
        let shape = Shape::of(kind);
        let x = (grid_width / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            color,
            x,
            y: 0,
        }
    }

    pub fn kind(&self) -> TetrominoKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Clockwise turn about the bounding-box origin; the offset is not adjusted.
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..self.clone()
        }
    }

    pub fn rotated_back(&self) -> Self {
        Self {
            shape: self.shape.rotated_ccw(),
            ..self.clone()
        }
    }

    /// Board coordinates of every filled cell. Rows may be negative while spawning.
    pub fn board_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(move |(cx, cy)| (self.x + cx, self.y + cy))
    }
}

/// Single cell: either empty or locked with a colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(u8),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Playfield: grid of cells. y=0 is top; rows are stored [0..height].
#[derive(Debug, Clone)]
pub struct Playfield {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Playfield {
    pub fn new(size: GridSize) -> Self {
        let (width, height) = (size.width(), size.height());
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// True if every filled cell of `piece` is inside the side walls, above the floor,
    /// and not on a locked cell. Cells above row 0 skip the occupancy check.
    pub fn fits(&self, piece: &Piece) -> bool {
        for (x, y) in piece.board_cells() {
            if x < 0 || x >= self.width as i32 || y >= self.height as i32 {
                return false;
            }
            if y < 0 {
                continue;
            }
            if self.get(x as usize, y as usize).is_some_and(Cell::is_filled) {
                return false;
            }
        }
        true
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| c.is_filled()))
    }

    /// Remove every full row and push an empty one in at the top for each.
    ///
    /// Full rows are collected top to bottom first, then removed in ascending
    /// order. Removing row `i` and inserting at the top leaves every row below
    /// `i` where it was, so the remaining indices stay valid.
    pub fn clear_full_rows(&mut self) -> u32 {
        let full: Vec<usize> = (0..self.height).filter(|&y| self.is_row_full(y)).collect();
        for &y in &full {
            self.rows.remove(y);
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        full.len() as u32
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }
}

/// What `lock_and_advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockOutcome {
    pub lines_cleared: u32,
    /// The promoted piece had no valid position, so grid and score were wiped.
    pub session_reset: bool,
}

/// Result of one gravity attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fell,
    Locked(LockOutcome),
}

/// Game state: playfield, current piece, next piece, score and the random source for spawning.
#[derive(Debug)]
pub struct Tetris<R = ChaCha8Rng> {
    playfield: Playfield,
    current: Piece,
    next: Piece,
    score: u32,
    rng: R,
}

impl<R: Rng> Tetris<R> {
    pub fn new(size: GridSize, mut rng: R) -> Self {
        let current = random_piece(&mut rng, size.width());
        let next = random_piece(&mut rng, size.width());
        Self {
            playfield: Playfield::new(size),
            current,
            next,
            score: 0,
            rng,
        }
    }

    /// Fresh piece of a uniformly random kind and colour at the spawn position.
    pub fn spawn_piece(&mut self) -> Piece {
        random_piece(&mut self.rng, self.playfield.width())
    }

    /// Whether the current piece, offset by (dx, dy), would be in a legal position.
    pub fn is_valid(&self, dx: i32, dy: i32) -> bool {
        self.playfield.fits(&self.current.translated(dx, dy))
    }

    /// Turn the current piece clockwise without checking the result.
    pub fn rotate(&mut self) {
        self.current = self.current.rotated();
    }

    /// Rotate, then turn back if the rotated piece does not fit. Returns whether the rotation stuck.
    pub fn try_rotate(&mut self) -> bool {
        self.rotate();
        if self.is_valid(0, 0) {
            return true;
        }
        self.current = self.current.rotated_back();
        false
    }

    pub fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if !self.is_valid(dx, dy) {
            return false;
        }
        self.current = self.current.translated(dx, dy);
        true
    }

    /// Move the piece down one row, or lock it if it cannot fall.
    pub fn step(&mut self) -> Step {
        if self.try_shift(0, 1) {
            Step::Fell
        } else {
            Step::Locked(self.lock_and_advance())
        }
    }

    /// Write the current piece into the grid, clear full rows and promote the next piece.
    ///
    /// Cells still above row 0 are dropped. If the promoted piece does not fit,
    /// grid and score are reset and the new current/next pair is kept.
    pub fn lock_and_advance(&mut self) -> LockOutcome {
        let color = self.current.color();
        for (x, y) in self.current.board_cells() {
            if x >= 0 && y >= 0 {
                self.playfield.set(x as usize, y as usize, Cell::Filled(color));
            }
        }
        let lines_cleared = self.clear_lines();

        let spawned = self.spawn_piece();
        self.current = std::mem::replace(&mut self.next, spawned);

        let session_reset = !self.is_valid(0, 0);
        if session_reset {
            self.reset();
        }
        LockOutcome {
            lines_cleared,
            session_reset,
        }
    }

    /// One point per cleared row.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.playfield.clear_full_rows();
        self.score += cleared;
        cleared
    }
}

impl<R> Tetris<R> {
    /// Empty the grid and zero the score. The pieces are left alone.
    pub fn reset(&mut self) {
        self.playfield.clear();
        self.score = 0;
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

fn random_piece<R: Rng>(rng: &mut R, grid_width: usize) -> Piece {
    let kind = TetrominoKind::ALL[rng.random_range(0..TetrominoKind::ALL.len())];
    let color = rng.random_range(0..PALETTE_LEN);
    Piece::new(kind, color, grid_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn engine(seed: u64) -> Tetris {
        Tetris::new(GridSize::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    fn piece_at(kind: TetrominoKind, x: i32, y: i32) -> Piece {
        let p = Piece::new(kind, 0, 10);
        p.translated(x - p.x(), y - p.y())
    }

    fn fill_row(pf: &mut Playfield, y: usize, color: u8) {
        for x in 0..pf.width() {
            pf.set(x, y, Cell::Filled(color));
        }
    }

    fn is_empty(pf: &Playfield) -> bool {
        pf.rows().flatten().all(|c| !c.is_filled())
    }

    fn snapshot(pf: &Playfield) -> Vec<Vec<Cell>> {
        pf.rows().map(<[Cell]>::to_vec).collect()
    }

    #[test]
    fn default_grid_is_derived_from_pixels() {
        let size = GridSize::from_pixels(WIDTH, HEIGHT, BLOCK_SIZE).unwrap();
        assert_eq!(size, GridSize::default());
        assert_eq!((size.width(), size.height()), (10, 20));
    }

    #[test]
    fn grid_size_rejects_degenerate_dimensions() {
        assert_eq!(GridSize::new(3, 20), Err(GridError::TooNarrow(3)));
        assert_eq!(GridSize::new(10, 1), Err(GridError::TooShort(1)));
        assert_eq!(GridSize::from_pixels(300, 600, 0), Err(GridError::ZeroBlockSize));
        assert_eq!(GridSize::from_pixels(90, 600, 30), Err(GridError::TooNarrow(3)));
    }

    #[test]
    fn grid_size_rejects_oversized_dimensions() {
        assert!(GridSize::new(1024, 1024).is_ok());
        assert_eq!(GridSize::new(40000, 20), Err(GridError::TooWide(40000)));
        assert_eq!(GridSize::new(10, 1025), Err(GridError::TooTall(1025)));
    }

    #[test]
    fn spawned_pieces_are_centred_at_top() {
        let mut t = engine(7);
        for _ in 0..200 {
            let p = t.spawn_piece();
            assert_eq!(p.y(), 0);
            assert_eq!(p.x(), 5 - (p.shape().width() / 2) as i32);
            assert!(p.color() < PALETTE_LEN);
            assert_eq!(p.shape(), &Shape::of(p.kind()));
        }
    }

    #[test]
    fn spawning_reaches_every_kind_and_colour() {
        let mut t = engine(11);
        let mut kinds = Vec::new();
        let mut colors = Vec::new();
        for _ in 0..500 {
            let p = t.spawn_piece();
            if !kinds.contains(&p.kind()) {
                kinds.push(p.kind());
            }
            if !colors.contains(&p.color()) {
                colors.push(p.color());
            }
        }
        assert_eq!(kinds.len(), TetrominoKind::ALL.len());
        assert_eq!(colors.len(), PALETTE_LEN as usize);
    }

    #[test]
    fn same_seed_gives_same_pieces() {
        let (a, b) = (engine(42), engine(42));
        assert_eq!(a.current(), b.current());
        assert_eq!(a.next(), b.next());
    }

    #[test]
    fn is_valid_rejects_side_walls() {
        let mut t = engine(1);
        t.current = piece_at(TetrominoKind::I, 0, 5);
        assert!(t.is_valid(0, 0));
        assert!(!t.is_valid(-1, 0));

        t.current = piece_at(TetrominoKind::I, 6, 5);
        assert!(t.is_valid(0, 0));
        assert!(!t.is_valid(1, 0));
    }

    #[test]
    fn is_valid_rejects_floor() {
        let mut t = engine(1);
        t.current = piece_at(TetrominoKind::O, 4, 18);
        assert!(t.is_valid(0, 0));
        assert!(!t.is_valid(0, 1));
    }

    #[test]
    fn is_valid_rejects_occupied_cells() {
        let mut t = engine(1);
        t.current = piece_at(TetrominoKind::T, 3, 10);
        t.playfield.set(4, 12, Cell::Filled(2));
        assert!(t.is_valid(0, 0));
        assert!(!t.is_valid(0, 1));
        assert!(t.is_valid(-2, 1));
    }

    #[test]
    fn cells_above_board_skip_occupancy_but_not_walls() {
        let mut t = engine(1);
        fill_row(&mut t.playfield, 0, 1);
        t.current = piece_at(TetrominoKind::I, 3, -1);
        assert!(t.is_valid(0, 0));
        assert!(!t.is_valid(0, 1));
        assert!(!t.is_valid(-4, 0));
        assert!(!t.is_valid(4, -5));
    }

    #[test]
    fn rotation_is_clockwise_about_origin() {
        let t = Shape::of(TetrominoKind::T).rotated_cw();
        let expected = Shape {
            rows: vec![vec![true, false], vec![true, true], vec![true, false]],
        };
        assert_eq!(t, expected);

        let i = Shape::of(TetrominoKind::I).rotated_cw();
        assert_eq!((i.width(), i.height()), (1, 4));
    }

    #[test]
    fn square_is_symmetric_under_one_rotation() {
        let o = Shape::of(TetrominoKind::O);
        assert_eq!(o.rotated_cw(), o);
    }

    #[test]
    fn rotate_keeps_offset() {
        let mut t = engine(3);
        t.current = piece_at(TetrominoKind::L, 2, 7);
        t.rotate();
        assert_eq!((t.current().x(), t.current().y()), (2, 7));
        assert_eq!(t.current().shape(), &Shape::of(TetrominoKind::L).rotated_cw());
    }

    #[test]
    fn try_rotate_reverts_blocked_rotation() {
        let mut t = engine(3);
        t.current = piece_at(TetrominoKind::I, 3, 19);
        let before = t.current().clone();
        assert!(!t.try_rotate());
        assert_eq!(t.current(), &before);
        assert!(t.is_valid(0, 0));
    }

    #[test]
    fn try_rotate_keeps_legal_rotation() {
        let mut t = engine(3);
        t.current = piece_at(TetrominoKind::T, 3, 5);
        assert!(t.try_rotate());
        assert_eq!(t.current().shape(), &Shape::of(TetrominoKind::T).rotated_cw());
    }

    #[test]
    fn try_shift_moves_only_when_valid() {
        let mut t = engine(5);
        t.current = piece_at(TetrominoKind::O, 0, 0);
        assert!(!t.try_shift(-1, 0));
        assert_eq!(t.current().x(), 0);
        assert!(t.try_shift(1, 0));
        assert!(t.try_shift(0, 1));
        assert_eq!((t.current().x(), t.current().y()), (1, 1));
    }

    #[test]
    fn clear_lines_without_full_rows_changes_nothing() {
        let mut t = engine(9);
        t.playfield.set(0, 19, Cell::Filled(1));
        t.playfield.set(9, 5, Cell::Filled(2));
        let before = snapshot(&t.playfield);
        assert_eq!(t.clear_lines(), 0);
        assert_eq!(snapshot(&t.playfield), before);
        assert_eq!(t.score(), 0);
    }

    #[test]
    fn single_full_row_shifts_rows_above() {
        let mut t = engine(9);
        for y in 0..20 {
            if y != 5 {
                t.playfield.set(y % 10, y, Cell::Filled((y % 6) as u8));
            }
        }
        fill_row(&mut t.playfield, 5, 3);
        let before = snapshot(&t.playfield);

        assert_eq!(t.clear_lines(), 1);
        let after = snapshot(&t.playfield);
        assert!(after[0].iter().all(|c| *c == Cell::Empty));
        assert_eq!(after[1..=5], before[0..5]);
        assert_eq!(after[6..], before[6..]);
        assert_eq!(t.score(), 1);
    }

    #[test]
    fn two_separate_full_rows_keep_order() {
        let mut t = engine(9);
        for y in 0..20 {
            if y != 5 && y != 7 {
                t.playfield.set(y % 10, y, Cell::Filled((y % 6) as u8));
            }
        }
        fill_row(&mut t.playfield, 5, 0);
        fill_row(&mut t.playfield, 7, 0);
        let before = snapshot(&t.playfield);

        assert_eq!(t.clear_lines(), 2);
        let after = snapshot(&t.playfield);
        assert!(after[0..2].iter().flatten().all(|c| *c == Cell::Empty));
        assert_eq!(after[2..7], before[0..5]);
        assert_eq!(after[7], before[6]);
        assert_eq!(after[8..], before[8..]);
        assert_eq!(t.score(), 2);
    }

    #[test]
    fn adjacent_full_rows_at_bottom_both_clear() {
        let mut t = engine(9);
        t.playfield.set(2, 17, Cell::Filled(4));
        fill_row(&mut t.playfield, 18, 1);
        fill_row(&mut t.playfield, 19, 2);

        assert_eq!(t.clear_lines(), 2);
        assert_eq!(t.playfield.get(2, 19), Some(Cell::Filled(4)));
        assert!(!t.playfield.is_row_full(18));
        assert!(!t.playfield.is_row_full(19));
        assert_eq!(t.score(), 2);
    }

    #[test]
    fn lock_writes_colour_and_promotes_next() {
        let mut t = engine(21);
        t.current = piece_at(TetrominoKind::O, 0, 18);
        let color = t.current().color();
        let next = t.next().clone();

        let outcome = t.lock_and_advance();
        assert_eq!(outcome, LockOutcome::default());
        for (x, y) in [(0, 18), (1, 18), (0, 19), (1, 19)] {
            assert_eq!(t.playfield().get(x, y), Some(Cell::Filled(color)));
        }
        assert_eq!(t.current(), &next);
        assert_eq!(t.score(), 0);
    }

    #[test]
    fn lock_completing_a_row_scores() {
        let mut t = engine(21);
        fill_row(&mut t.playfield, 19, 5);
        for x in 0..4 {
            t.playfield.set(x, 19, Cell::Empty);
        }
        t.current = piece_at(TetrominoKind::I, 0, 19);

        let outcome = t.lock_and_advance();
        assert_eq!(outcome.lines_cleared, 1);
        assert!(!outcome.session_reset);
        assert_eq!(t.score(), 1);
        assert!(is_empty(t.playfield()));
    }

    #[test]
    fn lock_drops_cells_above_board() {
        let mut t = engine(4);
        t.current = piece_at(TetrominoKind::I, 0, -2).rotated();

        let outcome = t.lock_and_advance();
        assert!(!outcome.session_reset);
        assert_eq!(t.playfield().get(0, 0), Some(Cell::Filled(0)));
        assert_eq!(t.playfield().get(0, 1), Some(Cell::Filled(0)));
        let filled = t.playfield().rows().flatten().filter(|c| c.is_filled()).count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn blocked_spawn_resets_grid_and_score() {
        let mut t = engine(8);
        for y in 0..2 {
            for x in 1..10 {
                t.playfield.set(x, y, Cell::Filled(0));
            }
        }
        t.score = 7;
        t.current = piece_at(TetrominoKind::O, 0, 18);
        let promoted = t.next().clone();
        let spawned = random_piece(&mut t.rng.clone(), 10);

        let outcome = t.lock_and_advance();
        assert!(outcome.session_reset);
        assert!(is_empty(t.playfield()));
        assert_eq!(t.score(), 0);
        assert_eq!(t.current(), &promoted);
        assert_eq!(t.next(), &spawned);
    }

    #[test]
    fn step_falls_then_locks() {
        let mut t = engine(13);
        let start = t.current().clone();
        assert_eq!(t.step(), Step::Fell);
        assert_eq!(t.current(), &start.translated(0, 1));

        t.current = piece_at(TetrominoKind::O, 4, 18);
        assert!(matches!(t.step(), Step::Locked(_)));
        assert!(t.playfield().get(4, 19).is_some_and(Cell::is_filled));
    }

    #[test]
    fn reset_keeps_pieces() {
        let mut t = engine(2);
        fill_row(&mut t.playfield, 10, 1);
        t.score = 3;
        let (current, next) = (t.current().clone(), t.next().clone());
        t.reset();
        assert!(is_empty(t.playfield()));
        assert_eq!(t.score(), 0);
        assert_eq!((t.current(), t.next()), (&current, &next));
    }

    fn any_kind() -> impl Strategy<Value = TetrominoKind> {
        (0..TetrominoKind::ALL.len()).prop_map(|i| TetrominoKind::ALL[i])
    }

    proptest! {
        #[test]
        fn out_of_bounds_positions_never_fit(
            kind in any_kind(),
            turns in 0..4usize,
            x in -12i32..16,
            y in -12i32..28,
        ) {
            let pf = Playfield::new(GridSize::default());
            let mut piece = piece_at(kind, x, y);
            for _ in 0..turns {
                piece = piece.rotated();
            }
            let in_bounds = piece
                .board_cells()
                .all(|(cx, cy)| (0..10).contains(&cx) && cy < 20);
            prop_assert_eq!(pf.fits(&piece), in_bounds);
        }

        #[test]
        fn four_rotations_restore_shape(kind in any_kind()) {
            let shape = Shape::of(kind);
            let turned = (0..4).fold(shape.clone(), |s, _| s.rotated_cw());
            prop_assert_eq!(turned, shape.clone());
            prop_assert_eq!(shape.rotated_cw().rotated_ccw(), shape);
        }
    }
}
