//! A minimal terminal spinner shown while a task is in flight.

use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// A terminal spinner that runs in a background task.
///
/// Writes to stderr so answers on stdout stay clean. The label can be
/// changed while it spins, e.g. to show the latest task state.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
    label: watch::Sender<String>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (label_tx, label_rx) = watch::channel(message.to_string());

        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                let label = label_rx.borrow().clone();
                // \x1b[2K clears the line, \r returns to its start
                eprint!("\x1b[2K\r{frame} {label}");
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            cancel: cancel_tx,
            label: label_tx,
        }
    }

    /// Replace the text next to the spinner.
    pub fn set_message(&self, message: &str) {
        self.label.send_replace(message.to_string());
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}
