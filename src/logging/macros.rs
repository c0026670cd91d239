//! Span macros over [`super::logger::PerfLogger`].
//!
//! They expand to nothing useful in release builds (guarded by
//! `cfg!(debug_assertions)`).  In debug builds span boundaries are also
//! mirrored as `tracing` trace events so they line up with the diagnostic
//! events of the pass that emitted them.
//!
//! | Macro | Forwards to |
//! |---|---|
//! | `start_span!` | `PerfLogger::start` |
//! | `add_point_to_span!` | `PerfLogger::check_point` |
//! | `annotate_span!` | `PerfLogger::annotate` |
//! | `end_span!` | `PerfLogger::end` |

macro_rules! start_span {
    ($logger:ident, $span_id:ident) => {
        if cfg!(debug_assertions) {
            tracing::trace!(span = $crate::logging::logging_defs::name($span_id), "span started");
            $logger.start($span_id);
        }
    };
}

macro_rules! add_point_to_span {
    ($logger:ident, $span_id:ident, $label:expr) => {
        if cfg!(debug_assertions) {
            $logger.check_point($span_id, $label);
        }
    };
}

macro_rules! annotate_span {
    ($logger:ident, $span_id:ident, $annotation:expr) => {
        if cfg!(debug_assertions) {
            $logger.annotate($span_id, $annotation);
        }
    };
}

macro_rules! end_span {
    ($logger:ident, $span_id:ident) => {
        if cfg!(debug_assertions) {
            $logger.end($span_id);
            tracing::trace!(span = $crate::logging::logging_defs::name($span_id), "span ended");
        }
    };
}
