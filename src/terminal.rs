//! Terminal presentation: raw-mode display, half-block frame encoding,
//! and keyboard input. Scaling the render to the terminal grid is this
//! module's concern, not the renderer's.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::Duration;

use crate::renderer::PixelBuffer;

/// Terminal display handler with buffered output.
pub struct TerminalDisplay {
    width: u16,
    height: u16,
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;
        let height = height.saturating_sub(2); // leave room for the status line

        Ok(Self {
            width,
            height,
            buffer: BufWriter::new(stdout),
        })
    }

    /// Character cells available for the frame.
    pub fn size(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    /// Pixel dimensions to render at: one cell shows two vertical pixels.
    pub fn render_size(&self) -> (usize, usize) {
        let (width, height) = self.size();
        (width.max(10), (height * 2).max(10))
    }

    /// Present a frame plus a status line, with explicit per-line cursor
    /// positioning so a long line never corrupts the rows below it.
    pub fn present(&mut self, frame: &PixelBuffer, status: &str) -> io::Result<()> {
        let content = halfblock_frame(frame);

        // \x1b[?25l hides the cursor, \x1b[?7l disables line wrap.
        write!(self.buffer, "\x1b[?25l\x1b[?7l")?;

        for (i, line) in content.lines().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }

        // Clear leftovers from larger frames, then pin the status line.
        write!(self.buffer, "\x1b[J")?;
        let status_row = content.lines().count() + 1;
        write!(self.buffer, "\x1b[{};1H\x1b[K{}", status_row, status)?;

        write!(self.buffer, "\x1b[?25h\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Check for keyboard input.
    pub fn poll_input(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                return Ok(Some(key_event));
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

/// Encode a frame as ▀ half-blocks: two vertical pixels per cell, upper
/// pixel in the foreground color, lower in the background, with color
/// codes emitted only on change.
pub fn halfblock_frame(frame: &PixelBuffer) -> String {
    let rows = (frame.height() + 1) / 2;
    let mut out = String::with_capacity(frame.width() * rows * 15 + rows);

    let mut last_fg: Option<u8> = None;
    let mut last_bg: Option<u8> = None;

    for row in 0..rows {
        let top_y = row * 2;
        let bottom_y = top_y + 1;

        for x in 0..frame.width() {
            let [r, g, b] = frame.pixel(x, top_y);
            let fg = rgb_to_256color(r, g, b);

            let bg = if bottom_y < frame.height() {
                let [r, g, b] = frame.pixel(x, bottom_y);
                rgb_to_256color(r, g, b)
            } else {
                16 // black
            };

            let fg_changed = last_fg != Some(fg);
            let bg_changed = last_bg != Some(bg);

            if fg_changed && bg_changed {
                out.push_str(&format!("\x1b[38;5;{};48;5;{}m", fg, bg));
                last_fg = Some(fg);
                last_bg = Some(bg);
            } else if fg_changed {
                out.push_str(&format!("\x1b[38;5;{}m", fg));
                last_fg = Some(fg);
            } else if bg_changed {
                out.push_str(&format!("\x1b[48;5;{}m", bg));
                last_bg = Some(bg);
            }

            out.push('\u{2580}');
        }

        out.push('\n');
    }

    out.push_str("\x1b[0m");
    out
}

/// Map RGB to the 6x6x6 cube of the 256-color palette (colors 16-231).
fn rgb_to_256color(r: u8, g: u8, b: u8) -> u8 {
    let r6 = (r as u16 * 6 / 256) as u8;
    let g6 = (g as u16 * 6 / 256) as u8;
    let b6 = (b as u16 * 6 / 256) as u8;
    16 + 36 * r6 + 6 * g6 + b6
}

/// Viewer actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    Reset,
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// Parse keyboard input into actions.
pub fn parse_key_event(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('w') | KeyCode::Up => Action::Forward,
        KeyCode::Char('s') | KeyCode::Down => Action::Back,
        KeyCode::Char('a') | KeyCode::Left => Action::Left,
        KeyCode::Char('d') | KeyCode::Right => Action::Right,
        KeyCode::Char(']') => Action::Up,
        KeyCode::Char('[') => Action::Down,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use nalgebra::Point3;

    use super::*;
    use crate::camera::Camera;
    use crate::renderer::Renderer;
    use crate::scene::Scene;

    #[test]
    fn test_parse_key_event_quit() {
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Quit);
        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Quit);
    }

    #[test]
    fn test_parse_key_event_movement() {
        for (code, action) in [
            (KeyCode::Char('w'), Action::Forward),
            (KeyCode::Up, Action::Forward),
            (KeyCode::Char('s'), Action::Back),
            (KeyCode::Char('a'), Action::Left),
            (KeyCode::Right, Action::Right),
            (KeyCode::Char(']'), Action::Up),
            (KeyCode::Char('['), Action::Down),
            (KeyCode::Char('r'), Action::Reset),
        ] {
            assert_eq!(parse_key_event(KeyEvent::new(code, KeyModifiers::empty())), action);
        }
    }

    #[test]
    fn test_parse_key_event_none() {
        let event = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::None);
    }

    #[test]
    fn test_rgb_to_256color_cube() {
        assert_eq!(rgb_to_256color(0, 0, 0), 16);
        assert_eq!(rgb_to_256color(255, 255, 255), 231);
        assert_eq!(rgb_to_256color(0, 0, 255), 21);
        assert_eq!(rgb_to_256color(0, 0, 127), 18);
    }

    #[test]
    fn test_halfblock_frame_halves_rows() {
        let camera =
            Camera::new(Point3::new(-2.0, 0.0, 1.0), Point3::new(3.0, 0.0, 1.0)).unwrap();
        let frame = Renderer::new(8, 6, camera).unwrap().render(&Scene::new());

        let content = halfblock_frame(&frame);
        // 3 pixel-pair rows plus the trailing reset code.
        assert_eq!(content.lines().count(), 4);
        assert_eq!(content.matches('\u{2580}').count(), 8 * 3);
        assert!(content.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_halfblock_frame_odd_height_pads_black() {
        let camera =
            Camera::new(Point3::new(-2.0, 0.0, 1.0), Point3::new(3.0, 0.0, 1.0)).unwrap();
        let frame = Renderer::new(4, 5, camera).unwrap().render(&Scene::new());
        let content = halfblock_frame(&frame);
        assert_eq!(content.matches('\u{2580}').count(), 4 * 3);
    }
}
