//! Terminal spinner shown on stderr while a lookup is in flight.

use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(80);

/// A spinner with an elapsed-seconds counter. A disabled spinner draws
/// nothing, so callers don't need to branch on quiet mode.
pub struct Spinner {
    running: Option<(JoinHandle<()>, watch::Sender<bool>)>,
}

impl Spinner {
    /// Start spinning with `message` if `enabled` and stderr is a terminal.
    pub fn start(message: &str, enabled: bool) -> Self {
        if !enabled || !std::io::stderr().is_terminal() {
            return Self::disabled();
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let message = message.to_string();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            for frame in FRAMES.iter().cycle() {
                eprint!("\x1b[2K\r{} {}", frame, label(&message, started.elapsed()));
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = stop_rx.changed() => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            running: Some((handle, stop_tx)),
        }
    }

    /// A spinner that never draws.
    pub fn disabled() -> Self {
        Self { running: None }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        if let Some((handle, stop_tx)) = self.running {
            let _ = stop_tx.send(true);
            let _ = handle.await;
        }
    }
}

/// Spinner text; the elapsed counter appears after the first second.
fn label(message: &str, elapsed: Duration) -> String {
    match elapsed.as_secs() {
        0 => message.to_string(),
        secs => format!("{message} ({secs}s)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_single_braille_chars() {
        for frame in FRAMES {
            assert_eq!(frame.chars().count(), 1);
        }
    }

    #[test]
    fn label_shows_elapsed_after_first_second() {
        assert_eq!(label("looking up", Duration::from_millis(400)), "looking up");
        assert_eq!(label("looking up", Duration::from_millis(2300)), "looking up (2s)");
    }

    #[tokio::test]
    async fn disabled_spinner_does_nothing() {
        let spinner = Spinner::start("quiet", false);
        assert!(!spinner.is_running());
        spinner.stop().await;
    }

    #[tokio::test]
    async fn spinner_starts_and_stops_without_panic() {
        let spinner = Spinner::start("testing", true);
        tokio::time::sleep(Duration::from_millis(200)).await;
        spinner.stop().await;
    }
}
