use indicatif::{ProgressBar, ProgressStyle};

use crate::events::{EventSink, LoadEvent, TracingSink};

/// Terminal progress bar over the resource downloads; every event is also
/// forwarded to [`TracingSink`].
pub struct ProgressSink {
    bar: ProgressBar,
    inner: TracingSink,
}

impl ProgressSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self::with_bar(bar)
    }

    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            inner: TracingSink,
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ProgressSink {
    fn emit(&self, event: LoadEvent) {
        match &event {
            LoadEvent::DownloadsStarted { files } => {
                self.bar.set_length(*files as u64);
                self.bar.set_position(0);
            }
            LoadEvent::ResourceSaved { url, .. } | LoadEvent::ResourceFailed { url, .. } => {
                self.bar.set_message(url.to_string());
                self.bar.inc(1);
            }
            LoadEvent::PageSaved { .. } => self.bar.finish_and_clear(),
            _ => {}
        }

        self.bar.suspend(|| self.inner.emit(event));
    }
}
