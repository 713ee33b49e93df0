//! Layout and drawing: playfield, falling piece, next preview, score, diagnostics overlay.

use crate::game::{Cell, Piece, Tetris};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Each grid cell is two terminal columns wide and one row tall, which reads as roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const CELL_SYMBOL: &str = "██";

const SIDEBAR_WIDTH: u16 = 22;

/// Preview box for the next piece, in grid cells (fits every spawn orientation).
const NEXT_PREVIEW_COLS: u16 = 4;
const NEXT_PREVIEW_ROWS: u16 = 2;

/// Shell-side state shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub show_data: bool,
    pub fps: f64,
    pub resets: u32,
    pub lines: u32,
    pub reset_notice: bool,
}

/// Playfield size in terminal cells (border + grid) for given grid dimensions.
fn playfield_pixel_size(width: usize, height: usize) -> (u16, u16) {
    let cells = |n: usize, per: u16| {
        u16::try_from(n)
            .unwrap_or(u16::MAX)
            .saturating_mul(per)
            .saturating_add(2)
    };
    (cells(width, CELL_WIDTH), cells(height, CELL_HEIGHT))
}

/// Draw the game: playfield + sidebar, centred in the frame.
pub fn draw(frame: &mut Frame, state: &Tetris, theme: &Theme, hud: &Hud) {
    let area = frame.area();
    let pf = state.playfield();
    let (pw, ph) = playfield_pixel_size(pf.width(), pf.height());
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);

    if area.width < total_w || area.height < ph {
        draw_too_small(frame, theme, area, total_w, ph);
        return;
    }

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    let board = draw_playfield(frame, state, theme, inner[0]);
    if hud.show_data {
        draw_data_overlay(frame, state, theme, hud, board);
    }
    draw_sidebar(frame, state, theme, hud, inner[1]);
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need_w: u16, need_h: u16) {
    let lines = vec![
        Line::from(Span::styled(" Terminal too small ", theme.title)),
        Line::from(Span::styled(
            format!(" need {need_w}x{need_h}, have {}x{} ", area.width, area.height),
            theme.main_fg,
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}

/// Draws border, locked cells and the falling piece. Returns the inner board rect.
fn draw_playfield(frame: &mut Frame, state: &Tetris, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blocktris ", theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    buf.set_style(board, Style::default().bg(theme.bg));

    for (y, row) in state.playfield().rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Cell::Filled(color) = *cell {
                paint_cell(buf, board, x as i32, y as i32, theme.piece_color(color));
            }
        }
    }

    let piece = state.current();
    let color = theme.piece_color(piece.color());
    for (x, y) in piece.board_cells() {
        paint_cell(buf, board, x, y, color);
    }
    board
}

/// Paint grid cell (x, y) inside `board`. Cells outside the board (e.g. above row 0) are skipped.
fn paint_cell(buf: &mut Buffer, board: Rect, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let rx = board.x + x as u16 * CELL_WIDTH;
    let ry = board.y + y as u16 * CELL_HEIGHT;
    if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
        buf.set_string(rx, ry, CELL_SYMBOL, Style::default().fg(color).bg(color));
    }
}

fn draw_data_overlay(frame: &mut Frame, state: &Tetris, theme: &Theme, hud: &Hud, board: Rect) {
    let piece = state.current();
    let style = Style::default().fg(Color::White).bg(theme.bg);
    let lines = vec![
        Line::from(Span::styled(format!("FPS: {}", hud.fps as u32), style)),
        Line::from(Span::styled(
            format!("Position: ({}, {})", piece.x(), piece.y()),
            style,
        )),
        Line::from(Span::styled(format!("Piece: {:?}", piece.kind()), style)),
        Line::from(Span::styled(format!("Lines: {}", hud.lines), style)),
        Line::from(Span::styled(format!("Resets: {}", hud.resets), style)),
    ];
    let area = Rect {
        x: board.x,
        y: board.y,
        width: board.width,
        height: (lines.len() as u16).min(board.height),
    };
    Paragraph::new(lines).render(area, frame.buffer_mut());
}

fn draw_sidebar(frame: &mut Frame, state: &Tetris, theme: &Theme, hud: &Hud, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NEXT_PREVIEW_ROWS * CELL_HEIGHT + 3), // Next (border + title + preview)
            Constraint::Length(4),                                   // Score (border + score + notice)
            Constraint::Min(0),                                      // Keys
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_layout[0], frame.buffer_mut());
    draw_next_preview(frame, theme, state.next(), next_layout[1]);

    // --- Score ---
    let score_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let score_inner = score_block.inner(chunks[1]);
    score_block.render(chunks[1], frame.buffer_mut());
    let mut score_lines = vec![Line::from(vec![
        Span::styled("Score: ", title_style),
        Span::styled(state.score().to_string(), fg_style),
    ])];
    if hud.reset_notice {
        score_lines.push(Line::from(Span::styled(
            "Board reset!",
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
        )));
    }
    Paragraph::new(Text::from(score_lines)).render(score_inner, frame.buffer_mut());

    // --- Keys ---
    let help = Style::default().fg(theme.inactive_fg);
    let keys = vec![
        Line::from(Span::styled(" ←/→ h/l  Move", help)),
        Line::from(Span::styled(" ↑ k      Rotate", help)),
        Line::from(Span::styled(" ↓ j      Drop", help)),
        Line::from(Span::styled(" q        Data", help)),
        Line::from(Span::styled(" Esc      Quit", help)),
    ];
    Paragraph::new(keys).render(chunks[2], frame.buffer_mut());
}

/// Draw the next piece centred in the preview box.
fn draw_next_preview(frame: &mut Frame, theme: &Theme, piece: &Piece, area: Rect) {
    let inner = Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(NEXT_PREVIEW_COLS * CELL_WIDTH + 2),
        height: area.height.min(NEXT_PREVIEW_ROWS * CELL_HEIGHT),
    };
    let shape = piece.shape();
    let bw = shape.width() as u16 * CELL_WIDTH;
    let bh = shape.height() as u16 * CELL_HEIGHT;
    let board = Rect {
        x: inner.x + inner.width.saturating_sub(bw) / 2,
        y: inner.y + inner.height.saturating_sub(bh) / 2,
        width: bw.min(inner.width),
        height: bh.min(inner.height),
    };
    let color = theme.piece_color(piece.color());
    for (x, y) in shape.cells() {
        paint_cell(frame.buffer_mut(), board, x, y, color);
    }
}
