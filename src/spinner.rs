use indicatif::{ProgressBar, ProgressStyle};
use inpxer_indexer::{ImportEvent, Reporter};
use std::time::Duration;

/// Terminal spinner driven by import progress.
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl Reporter for Spinner {
    fn report(&mut self, event: ImportEvent) {
        match event {
            ImportEvent::Started => {
                self.bar.enable_steady_tick(Duration::from_millis(100));
                self.bar.set_message("Indexing...");
            },
            ImportEvent::Flushed { processed } => self.bar.set_message(format!("Processed: {processed}")),
            ImportEvent::Warning(message) => self.bar.println(format!("warning: {message}")),
            ImportEvent::Failed => self.bar.abandon_with_message("Failed"),
            ImportEvent::Complete(summary) => self.bar.finish_with_message(format!("Done: {summary}")),
        }
    }
}
