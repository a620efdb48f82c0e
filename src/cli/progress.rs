//! CLI-specific progress handling for swarp-route
//!
//! Search depth is shown on a stderr spinner. Solutions go to stdout, so every
//! solution block is printed with the spinner suspended.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Creates the depth spinner
pub fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Failed to create progress style"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Progress manager for a search run
pub struct ProgressManager {
    pub pb: ProgressBar,
    write_failed: AtomicBool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_spinner();
        pb.set_message(message.to_string());
        Self {
            pb,
            write_failed: AtomicBool::new(false),
        }
    }

    /// Record that routes of `route_len` transitions are now being explored
    pub fn depth_reached(&self, route_len: usize) {
        self.pb
            .set_message(format!("Searching routes of {route_len} transitions"));
    }

    /// Write a block to stdout in one piece without tearing the spinner
    pub fn print_block(&self, block: &str) {
        self.pb.suspend(|| {
            let stdout = std::io::stdout();
            self.write_block(&mut stdout.lock(), block);
        });
    }

    /// The first failed write is logged; later blocks are dropped quietly
    fn write_block<W: Write>(&self, out: &mut W, block: &str) {
        if let Err(e) = out.write_all(block.as_bytes()).and_then(|()| out.flush()) {
            if !self.write_failed.swap(true, Ordering::Relaxed) {
                warn!("Cannot write solutions to stdout: {e}");
            }
        }
    }

    /// True once any solution block failed to reach stdout
    pub fn write_failed(&self) -> bool {
        self.write_failed.load(Ordering::Relaxed)
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner_template() {
        let pb = create_spinner();
        // Spinners have no length; the template must still be valid
        assert_eq!(pb.length(), None);
        pb.finish();
    }

    #[test]
    fn test_progress_manager_messages() {
        let manager = ProgressManager::new("Test search");
        assert_eq!(manager.pb.message(), "Test search");
        manager.depth_reached(7);
        assert_eq!(manager.pb.message(), "Searching routes of 7 transitions");
        manager.finish("done");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_block_records_failure() {
        let manager = ProgressManager::new("Test search");

        let mut buffer = Vec::new();
        manager.write_block(&mut buffer, "block\n");
        assert_eq!(buffer, b"block\n");
        assert!(!manager.write_failed());

        manager.write_block(&mut BrokenPipe, "lost\n");
        manager.write_block(&mut BrokenPipe, "lost again\n");
        assert!(manager.write_failed());
        manager.finish("done");
    }
}
