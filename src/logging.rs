pub mod logger;

pub mod logging_defs;
#[macro_use]
pub mod macros;

use logger::{DebugLogsCategories, PerfListener};
use logging_defs::*;
use std::cell::Cell;
use std::time::Duration;
use std::time::Instant;

/// A [`PerfListener`] that prints span events to stdout, indented by span
/// nesting.  Only spans whose [`category`] intersects `categories` are
/// reported.
#[derive(Default)]
pub struct PerfConsoleListener {
    pub categories: DebugLogsCategories,
    depth: Cell<usize>,
}

impl PerfConsoleListener {
    pub fn new(categories: DebugLogsCategories) -> PerfConsoleListener {
        PerfConsoleListener {
            categories,
            depth: Cell::new(0),
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth.get())
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl PerfListener for PerfConsoleListener {
    fn is_interested_in_span(&self, span_id: u64) -> bool {
        self.categories.intersects(category(span_id))
    }

    fn on_span_start(&self, span_id: u64, _start_time: Instant) {
        println!("{}> {}", self.indent(), name(span_id));
        self.depth.set(self.depth.get() + 1);
    }

    fn on_check_point(&self, span_id: u64, _: Instant, since_last: Duration, label: &str) {
        println!(
            "{}{} @ {label}: +{:.3} ms",
            self.indent(),
            name(span_id),
            millis(since_last)
        );
    }

    fn on_annotate(&self, span_id: u64, annotation: &str) {
        println!("{}{}: {annotation}", self.indent(), name(span_id));
    }

    fn on_span_end(&self, span_id: u64, span_duration: Duration) {
        self.depth.set(self.depth.get().saturating_sub(1));
        println!(
            "{}< {} {:.3} ms",
            self.indent(),
            name(span_id),
            millis(span_duration)
        );
    }
}
