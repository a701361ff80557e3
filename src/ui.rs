// Terminal output: the upload progress bar drawn with `indicatif`.

use crate::store::{ProgressSink, Silent};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;

/// Progress bar on stdout shaped like `[----->    ]  42% (123/456 kB)`.
/// It is hidden when stdout is not a terminal.
pub struct TransferBar {
    bar: ProgressBar,
}

impl TransferBar {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        let style = ProgressStyle::with_template("[{bar:50}] {percent:>3}% ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("-> ");
        bar.set_style(style);
        TransferBar { bar }
    }
}

impl ProgressSink for TransferBar {
    fn on_progress(&self, sent: u64, total: u64) {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(sent);
        self.bar.set_message(kilobytes(sent, total));
    }

    fn finish(&self) {
        self.bar.finish();
        if !self.bar.is_hidden() {
            println!();
        }
    }
}

fn kilobytes(sent: u64, total: u64) -> String {
    format!("{}/{} kB", sent / 1024, total / 1024)
}

/// Progress sink for a run: the bar, or nothing with `--no-progress`.
pub fn progress_sink(show: bool) -> Arc<dyn ProgressSink> {
    if show {
        Arc::new(TransferBar::new())
    } else {
        Arc::new(Silent)
    }
}
