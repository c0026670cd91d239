use bitflags::bitflags;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

bitflags! {
    /// Groups of spans a console listener can be narrowed to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugLogsCategories: u32 {
        const NONE                     = 0;
        const PIPELINE                 = 1 << 1;
        const BLOCK_WALK               = 1 << 2;
        const HARVESTING               = 1 << 3;
        const GROUPING                 = 1 << 4;
        const ALL                      = u32::MAX;
    }
}

impl Default for DebugLogsCategories {
    fn default() -> DebugLogsCategories {
        DebugLogsCategories::ALL
    }
}

/// Observer of the timing spans opened by the extraction and grouping
/// passes.  Callbacks run synchronously on the extracting thread.
pub trait PerfListener {
    /// Return whether this listener cares about the given span.  If `false`,
    /// none of the other callbacks will fire for that span.
    fn is_interested_in_span(&self, span_id: u64) -> bool;
    fn on_span_start(&self, span_id: u64, start_time: Instant);
    /// `since_last` is measured from the previous checkpoint, or from the
    /// span start for the first one.
    fn on_check_point(&self, span_id: u64, point_time: Instant, since_last: Duration, label: &str);
    fn on_annotate(&self, span_id: u64, annotation: &str);
    fn on_span_end(&self, span_id: u64, span_duration: Duration);
}

/// A shared listener handle; one listener may observe several loggers.
pub type Listener = Rc<dyn PerfListener>;

/// An open span and the listeners that asked for it.
struct OpenSpan {
    start_time: Instant,
    last_point: Instant,
    listeners: Vec<Listener>,
}

/// Tracks open spans and fans their events out to the listeners.
///
/// Not `Send`: each extraction owns its logger.  A logger without
/// listeners records nothing.
pub struct PerfLogger {
    open_spans: RefCell<HashMap<u64, OpenSpan>>,
    listeners: Vec<Listener>,
}

impl PerfLogger {
    pub fn new(listeners: Vec<Listener>) -> PerfLogger {
        PerfLogger {
            open_spans: RefCell::new(HashMap::new()),
            listeners,
        }
    }

    /// Open `span_id` for every listener interested in it.
    pub fn start(&self, span_id: u64) {
        let listeners = self
            .listeners
            .iter()
            .filter(|l| l.is_interested_in_span(span_id))
            .cloned()
            .collect::<Vec<_>>();
        if listeners.is_empty() {
            return;
        }
        let start_time = Instant::now();
        listeners
            .iter()
            .for_each(|l| l.on_span_start(span_id, start_time));
        self.open_spans.borrow_mut().insert(
            span_id,
            OpenSpan {
                start_time,
                last_point: start_time,
                listeners,
            },
        );
    }

    pub fn check_point(&self, span_id: u64, label: impl Into<String>) {
        if let Some(span) = self.open_spans.borrow_mut().get_mut(&span_id) {
            let now = Instant::now();
            let since_last = now.duration_since(span.last_point);
            let label = label.into();
            span.listeners
                .iter()
                .for_each(|l| l.on_check_point(span_id, now, since_last, &label));
            span.last_point = now;
        }
    }

    pub fn annotate(&self, span_id: u64, annotation: impl Into<String>) {
        if let Some(span) = self.open_spans.borrow().get(&span_id) {
            let annotation = annotation.into();
            span.listeners
                .iter()
                .for_each(|l| l.on_annotate(span_id, &annotation));
        }
    }

    /// Close the span and report its total duration.  Ending a span that is
    /// not open does nothing.
    pub fn end(&self, span_id: u64) {
        let Some(span) = self.open_spans.borrow_mut().remove(&span_id) else {
            return;
        };
        let duration = span.start_time.elapsed();
        span.listeners
            .iter()
            .for_each(|l| l.on_span_end(span_id, duration));
    }
}
