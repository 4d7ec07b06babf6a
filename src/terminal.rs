//! Terminal-backed display surface.
//!
//! [`TerminalSurface`] renders decoded frames into the terminal with
//! truecolor half-block cells (one character cell carries two vertically
//! stacked pixels via `▀` with independent foreground and background
//! colors). It owns the terminal session: raw mode and the alternate screen
//! are entered on construction and restored on drop, so panics and early
//! returns leave the user's shell intact on every normal exit path.

use std::io::{BufWriter, Stdout, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use image::imageops::FilterType;

use crate::{
    display::{DisplaySurface, InputKey},
    error::FrameSiftError,
    monitor::SurfaceProbe,
    source::DecodedFrame,
};

/// A display surface rendering into the controlling terminal.
pub struct TerminalSurface {
    stdout: BufWriter<Stdout>,
    closed: Arc<AtomicBool>,
}

impl TerminalSurface {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> Result<Self, FrameSiftError> {
        // Large write buffer keeps one frame to one syscall.
        let mut stdout = BufWriter::with_capacity(1 << 20, std::io::stdout());

        terminal::enable_raw_mode().map_err(|error| FrameSiftError::Surface(error.to_string()))?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide)
            .map_err(|error| FrameSiftError::Surface(error.to_string()))?;

        Ok(Self {
            stdout,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// A cloneable liveness probe for the surface watcher.
    ///
    /// The probe shares the surface's closed flag but owns no terminal
    /// state, so the watcher thread never contends with the render loop.
    pub fn probe(&self) -> TerminalProbe {
        TerminalProbe {
            closed: Arc::clone(&self.closed),
        }
    }

    fn mark_closed(&self, error: &dyn std::fmt::Display) -> FrameSiftError {
        self.closed.store(true, Ordering::Release);
        FrameSiftError::Surface(error.to_string())
    }

    fn map_key(key: crossterm::event::KeyEvent) -> Option<InputKey> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputKey::Escape)
            }
            KeyCode::Char(character) => Some(InputKey::Char(character)),
            KeyCode::Esc => Some(InputKey::Escape),
            KeyCode::Left => Some(InputKey::Left),
            KeyCode::Right => Some(InputKey::Right),
            KeyCode::Enter => Some(InputKey::Enter),
            _ => None,
        }
    }
}

impl DisplaySurface for TerminalSurface {
    /// Render the frame scaled to the terminal grid, aspect preserved.
    ///
    /// The bottom row is reserved for the status line.
    fn show(&mut self, frame: &DecodedFrame) -> Result<(), FrameSiftError> {
        let (columns, rows) =
            terminal::size().map_err(|error| self.mark_closed(&error))?;
        let cell_rows = rows.saturating_sub(1).max(1) as u32;

        // One cell is two vertically stacked pixels.
        let resized = frame
            .image
            .resize(columns as u32, cell_rows * 2, FilterType::Triangle)
            .to_rgb8();
        let (width, height) = resized.dimensions();

        let mut line = String::with_capacity(width as usize * 40);
        for cell_row in 0..height.div_ceil(2) {
            line.clear();
            let top_y = cell_row * 2;
            let bottom_y = top_y + 1;
            for x in 0..width {
                let top = resized.get_pixel(x, top_y);
                // An odd final pixel row keeps its lower half black.
                let bottom = if bottom_y < height {
                    *resized.get_pixel(x, bottom_y)
                } else {
                    image::Rgb([0, 0, 0])
                };
                line.push_str(&format!(
                    "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2580}",
                    top[0], top[1], top[2], bottom[0], bottom[1], bottom[2],
                ));
            }
            // Reset colors, wipe the rest of the row.
            line.push_str("\x1b[0m\x1b[K");
            queue!(
                self.stdout,
                cursor::MoveTo(0, cell_row as u16),
                Print(line.as_str()),
            )
            .map_err(|error| self.mark_closed(&error))?;
        }

        self.stdout
            .flush()
            .map_err(|error| self.mark_closed(&error))
    }

    fn next_key(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<InputKey>, FrameSiftError> {
        if let Some(timeout) = timeout {
            if !event::poll(timeout).map_err(|error| self.mark_closed(&error))? {
                return Ok(None);
            }
            let next = event::read().map_err(|error| self.mark_closed(&error))?;
            if let Event::Key(key) = next {
                return Ok(Self::map_key(key));
            }
            return Ok(None);
        }

        // Block until a key arrives; resize and other events keep waiting.
        loop {
            let next = event::read().map_err(|error| self.mark_closed(&error))?;
            if let Event::Key(key) = next {
                if let Some(mapped) = Self::map_key(key) {
                    return Ok(Some(mapped));
                }
            }
        }
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && terminal::size().is_ok()
    }

    fn show_status(&mut self, line: &str) {
        let Ok((columns, rows)) = terminal::size() else {
            self.closed.store(true, Ordering::Release);
            return;
        };
        let truncated: String = line.chars().take(columns as usize).collect();
        let _ = queue!(
            self.stdout,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Print(format!("\x1b[0m{truncated}\x1b[K")),
        );
        let _ = self.stdout.flush();
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        // Best effort; the terminal may already be gone.
        let _ = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Liveness probe handed to the surface watcher.
#[derive(Clone)]
pub struct TerminalProbe {
    closed: Arc<AtomicBool>,
}

impl SurfaceProbe for TerminalProbe {
    fn is_alive(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && terminal::size().is_ok()
    }
}
