//! Terminal lifecycle and pacing shared by the interactive modes

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, interval_at};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Slowest pacing honoured, in ticks per second
const MIN_TICKS_PER_SECOND: f32 = 0.5;

/// Frame interval for redraws (~30 FPS)
pub const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Enter raw mode and the alternate screen
pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

/// Undo [`setup_terminal`]
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Time between game ticks for a speed in ticks per second
pub fn tick_interval(speed: f32) -> Duration {
    Duration::from_secs_f32(1.0 / speed.max(MIN_TICKS_PER_SECOND))
}

/// Replace a timer with one of a new period, first firing one period from now
pub fn reschedule(timer: &mut Interval, period: Duration) {
    *timer = interval_at(Instant::now() + period, period);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_follows_speed() {
        assert_eq!(tick_interval(10.0).as_millis(), 100);
        assert!(tick_interval(24.0) < tick_interval(12.0));
    }

    #[test]
    fn test_tick_interval_clamps_slow_speeds() {
        assert_eq!(tick_interval(0.0), Duration::from_secs(2));
        assert_eq!(tick_interval(-3.0), Duration::from_secs(2));
    }
}
