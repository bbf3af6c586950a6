// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::sync::mpsc::Receiver;

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::engine::Host;
use crate::frame::Frame;
use crate::palette::{terminal_color, Rgb};
use crate::runtime::{CellSize, ColorMode};
use crate::surface::{ResizeBus, Viewport};

/// What actually reached the screen for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Shown {
    ch: char,
    fg: Option<Color>,
}

const BLANK_SHOWN: Shown = Shown { ch: ' ', fg: None };

struct LastFrame {
    cols: u16,
    rows: u16,
    cells: Vec<Shown>,
}

impl LastFrame {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK_SHOWN; cols as usize * rows as usize],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    color_mode: ColorMode,
    bg: Option<Color>,
    last: Option<LastFrame>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
    touched_rows: Vec<u16>,
}

impl Terminal {
    pub fn new(color_mode: ColorMode, background: Option<Rgb>) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            color_mode,
            bg: background.and_then(|c| terminal_color(c, color_mode)),
            last: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Forgets what is on screen so the next draw repaints everything.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    fn shown(&self, frame: &Frame, idx: usize) -> Shown {
        let cell = frame.cell_at_index(idx);
        if cell.is_blank() {
            return BLANK_SHOWN;
        }
        Shown {
            ch: cell.ch,
            fg: terminal_color(cell.ink, self.color_mode),
        }
    }

    fn queue_fg(&mut self, fg: Option<Color>) -> Result<()> {
        self.stdout
            .queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let needs_full_redraw = self
            .last
            .as_ref()
            .map(|l| l.cols != frame.cols || l.rows != frame.rows)
            .unwrap_or(true);

        let total_cells = frame.cols as usize * frame.rows as usize;
        let dirty_is_large = total_cells > 0 && frame.dirty_indices().len() >= total_cells / 3;

        self.stdout
            .queue(SetBackgroundColor(self.bg.unwrap_or(Color::Reset)))?;

        if needs_full_redraw || frame.is_dirty_all() || dirty_is_large {
            self.draw_full(frame, needs_full_redraw)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame, clear: bool) -> Result<()> {
        if clear {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = Some(LastFrame::new(frame.cols, frame.rows));
        }
        let mut last = self
            .last
            .take()
            .unwrap_or_else(|| LastFrame::new(frame.cols, frame.rows));

        let mut cur_fg: Option<Option<Color>> = None;
        for y in 0..frame.rows {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.cols {
                let idx = y as usize * frame.cols as usize + x as usize;
                let shown = self.shown(frame, idx);
                if cur_fg != Some(shown.fg) {
                    self.queue_fg(shown.fg)?;
                    cur_fg = Some(shown.fg);
                }
                self.stdout.queue(Print(shown.ch))?;
                last.cells[idx] = shown;
            }
        }
        self.last = Some(last);
        Ok(())
    }

    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let Some(mut last) = self.last.take() else {
            return Ok(());
        };
        let width = frame.cols as usize;

        if self.row_dirty.len() != frame.rows as usize {
            self.row_dirty = vec![Vec::new(); frame.rows as usize];
        }
        for r in &mut self.row_dirty {
            r.clear();
        }
        self.touched_rows.clear();

        for &idx in frame.dirty_indices() {
            let y = idx / width;
            if y >= frame.rows as usize {
                continue;
            }
            let row = &mut self.row_dirty[y];
            if row.is_empty() {
                self.touched_rows.push(y as u16);
            }
            row.push(idx);
        }
        self.touched_rows.sort_unstable();

        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_pos: Option<(u16, u16)> = None;
        let rows = std::mem::take(&mut self.touched_rows);
        for &y in &rows {
            let mut dirty = std::mem::take(&mut self.row_dirty[y as usize]);
            dirty.sort_unstable();

            let mut i = 0usize;
            while i < dirty.len() {
                let idx0 = dirty[i];
                let first = self.shown(frame, idx0);
                if last.cells[idx0] == first {
                    i += 1;
                    continue;
                }
                last.cells[idx0] = first;

                self.run_buf.clear();
                self.run_buf.push(first.ch);
                let mut run_len: u16 = 1;
                let mut prev_idx = idx0;
                let mut j = i + 1;
                while j < dirty.len() {
                    let idx1 = dirty[j];
                    if idx1 != prev_idx + 1 {
                        break;
                    }
                    let next = self.shown(frame, idx1);
                    if last.cells[idx1] == next || next.fg != first.fg {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    last.cells[idx1] = next;
                    run_len = run_len.saturating_add(1);
                    prev_idx = idx1;
                    j += 1;
                }

                let x0 = (idx0 % width) as u16;
                if cur_pos != Some((x0, y)) {
                    self.stdout.queue(cursor::MoveTo(x0, y))?;
                }
                if cur_fg != Some(first.fg) {
                    self.queue_fg(first.fg)?;
                    cur_fg = Some(first.fg);
                }
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = x0.saturating_add(run_len);
                cur_pos = (next_x < frame.cols).then_some((next_x, y));
                i = j;
            }

            dirty.clear();
            self.row_dirty[y as usize] = dirty;
        }
        self.touched_rows = rows;
        self.last = Some(last);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

/// Presents the terminal as a pixel viewport of `cols * cell.width` by
/// `rows * cell.height` and hands out `Frame` canvases.
pub struct TerminalHost {
    cell: CellSize,
    cols: u16,
    rows: u16,
    bus: ResizeBus,
}

impl TerminalHost {
    pub fn new(cell: CellSize, cols: u16, rows: u16) -> Self {
        Self {
            cell,
            cols,
            rows,
            bus: ResizeBus::new(),
        }
    }

    /// Records a terminal resize and notifies every subscribed rain.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.bus.publish(self.viewport());
    }
}

impl Host for TerminalHost {
    type Canvas = Frame;

    fn acquire_canvas(&mut self) -> Option<Frame> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        let vp = self.viewport();
        Some(Frame::new(vp.width, vp.height, self.cell))
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: u32::from(self.cols) * u32::from(self.cell.width),
            height: u32::from(self.rows) * u32::from(self.cell.height),
        }
    }

    fn subscribe_resize(&mut self) -> Receiver<Viewport> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    #[test]
    fn host_viewport_scales_cells_to_pixels() {
        let host = TerminalHost::new(CellSize { width: 8, height: 16 }, 80, 24);
        assert_eq!(host.viewport(), Viewport { width: 640, height: 384 });
    }

    #[test]
    fn zero_sized_terminal_has_no_canvas() {
        let mut host = TerminalHost::new(CellSize::default(), 0, 24);
        assert!(host.acquire_canvas().is_none());
        host.resize(80, 24);
        let frame = host.acquire_canvas().unwrap();
        assert_eq!((frame.cols, frame.rows), (80, 24));
        assert_eq!(frame.size(), (640, 384));
    }

    #[test]
    fn resize_reaches_subscribers() {
        let mut host = TerminalHost::new(CellSize::default(), 80, 24);
        let rx = host.subscribe_resize();
        host.resize(100, 30);
        assert_eq!(rx.try_recv().unwrap(), Viewport { width: 800, height: 480 });
    }
}
