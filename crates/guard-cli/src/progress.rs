use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::ui;

static DRAW_TARGET: OnceLock<MultiProgress> = OnceLock::new();

/// Terminal feedback for a long-running step. Every method is a no-op when
/// progress is disabled (JSON output, `--quiet`, or stdout not a TTY).
pub struct Progress(Option<ProgressBar>);

impl Progress {
    /// Indeterminate spinner for single awaits (an audit, a brief).
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        Self::start(ProgressBar::new_spinner(), "{spinner:.cyan} {elapsed:>3} {msg}", message)
            .ticking()
    }

    /// Counted bar for per-document loops.
    #[must_use]
    pub fn bar(total: u64, message: &str) -> Self {
        let template = if ui::prefs().term_width.is_some_and(|cols| cols >= 80) {
            "{bar:40.cyan/blue} {pos}/{len} {msg}"
        } else {
            "{wide_bar:.cyan/blue} {pos}/{len}"
        };
        Self::start(ProgressBar::new(total), template, message)
    }

    fn start(bar: ProgressBar, template: &str, message: &str) -> Self {
        if !ui::prefs().progress {
            return Self(None);
        }
        let bar = DRAW_TARGET.get_or_init(MultiProgress::new).add(bar);
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        Self(Some(bar))
    }

    fn ticking(self) -> Self {
        if let Some(bar) = &self.0 {
            bar.enable_steady_tick(Duration::from_millis(120));
        }
        self
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.0 {
            bar.set_message(message.to_string());
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.0 {
            bar.inc(delta);
        }
    }

    /// Leave the bar on screen with a closing line.
    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.0 {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.0 {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.0 {
            bar.abandon_with_message(message.to_string());
        }
    }
}
