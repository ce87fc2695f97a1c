//! Terminal progress bar fed by the engine

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::stream::{ProgressSink, StreamState};

const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}";

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(prefix: &str) -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, processed: u64) {
        self.bar.set_position(processed);
    }

    fn on_state(&self, state: StreamState) {
        match state {
            StreamState::DerivingKey => self.bar.set_message("deriving key"),
            StreamState::Processing { .. } => self.bar.set_message(""),
            StreamState::Completed => self.bar.set_message("done"),
            StreamState::Cancelled => self.bar.set_message("cancelled"),
            StreamState::Failed => self.bar.set_message("failed"),
            StreamState::Idle => {}
        }
    }

    fn on_file(&self, name: &str, total: u64) {
        self.bar.reset();
        self.bar.set_length(total);
        self.bar.println(name);
    }
}
