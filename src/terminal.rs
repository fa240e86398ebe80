//! Terminal display and input handling

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Terminal display handler with buffered output
///
/// Owns raw mode, mouse capture and the alternate screen for its lifetime and
/// gives them back on drop.
pub struct TerminalDisplay {
    rows: u16,
    cols: u16,
    reserved_rows: u16,
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    /// Take over the terminal. `status_line` keeps the bottom row free for [`render`](Self::render)'s status text.
    pub fn new(status_line: bool) -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            EnableMouseCapture,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            rows,
            cols,
            reserved_rows: u16::from(status_line),
            buffer: BufWriter::new(stdout),
        })
    }

    /// Drawable area as `(rows, cols)`, excluding the status line
    pub fn get_size(&self) -> (u16, u16) {
        (self.rows.saturating_sub(self.reserved_rows), self.cols)
    }

    /// Re-read the terminal size; true when it changed
    pub fn check_resize(&mut self) -> bool {
        if let Ok((cols, rows)) = terminal::size() {
            if cols != self.cols || rows != self.rows {
                self.cols = cols;
                self.rows = rows;
                return true;
            }
        }
        false
    }

    /// Draw one frame, each line placed with explicit cursor positioning so an
    /// overlong line cannot push the rest of the frame down
    pub fn render(&mut self, content: &str, status: Option<&str>) -> io::Result<()> {
        // Disable line wrap while drawing
        write!(self.buffer, "\x1b[?7l")?;

        let mut line_count = 0;
        for (i, line) in content.lines().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
            line_count = i + 1;
        }

        // Clear whatever a larger previous frame left behind
        write!(self.buffer, "\x1b[J")?;

        if let Some(status) = status {
            write!(self.buffer, "\x1b[{};1H\x1b[K{}", line_count + 1, status)?;
        }

        write!(self.buffer, "\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Wait up to `timeout` for the next terminal event
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            return event::read().map(Some);
        }
        Ok(None)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.buffer.flush();
        restore_terminal();
    }
}

/// Undo everything [`TerminalDisplay::new`] set up. Safe to call more than once.
pub fn restore_terminal() {
    let _ = execute!(stdout(), DisableMouseCapture, cursor::Show);
    let _ = terminal::disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen);
}

/// Restore the terminal before the panic message is printed, so it lands on the
/// normal screen instead of the alternate one
pub fn install_panic_hook() {
    chain_panic_hook(restore_terminal);
}

fn chain_panic_hook<F>(restore: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}

/// Raise `flag` on SIGTERM, SIGHUP, SIGQUIT or SIGINT instead of dying on the
/// spot, so the main loop can exit and drop the [`TerminalDisplay`]
pub fn register_shutdown_signals(flag: &Arc<AtomicBool>) -> io::Result<()> {
    for &signal in signal_hook::consts::TERM_SIGNALS {
        signal_hook::flag::register(signal, Arc::clone(flag))?;
    }
    #[cfg(unix)]
    signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(flag))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_panic_hook_restores_before_reporting() {
        static RESTORED: AtomicUsize = AtomicUsize::new(0);

        chain_panic_hook(|| {
            RESTORED.fetch_add(1, Ordering::SeqCst);
        });
        let result = std::panic::catch_unwind(|| panic!("boom"));
        // Back to the default hook for the rest of the suite
        let _ = std::panic::take_hook();

        assert!(result.is_err());
        assert_eq!(RESTORED.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_shutdown_signal_sets_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        register_shutdown_signals(&flag).unwrap();

        signal_hook::low_level::raise(signal_hook::consts::SIGHUP).unwrap();
        assert!(flag.load(std::sync::atomic::Ordering::SeqCst));
    }
}
