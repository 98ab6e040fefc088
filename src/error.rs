//! Error taxonomy for the timeline-to-patch pipeline.
//!
//! A mis-resolved node would corrupt the matrix silently, so resolution and
//! validation failures are surfaced immediately and carry enough row context
//! (`producer`, `consumer`, `date`) to locate the offending exchange.

use crate::store::NodeId;
use chrono::NaiveDateTime;
use thiserror::Error;

/// The `(producer, consumer, date)` triple identifying the timeline row an
/// error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub producer: NodeId,
    pub consumer: NodeId,
    pub date: Option<NaiveDateTime>,
}

impl std::fmt::Display for RowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.date {
            Some(date) => write!(
                f,
                "producer {}, consumer {}, date {}",
                self.producer, self.consumer, date
            ),
            None => write!(
                f,
                "producer {}, consumer {}, no date",
                self.producer, self.consumer
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    /// No candidate dates were supplied to match against.
    #[error("no candidate dates to match against")]
    EmptyInput,

    /// A timeline row has no date attribute.
    #[error("timeline row has no date ({context})")]
    MissingDateColumn { context: RowContext },

    /// An interpolation mode string that the weight calculator does not know.
    #[error("unsupported interpolation mode '{mode}'")]
    UnsupportedInterpolation { mode: String },

    /// A node reference did not resolve, or the named lookup inside a vintage
    /// dataset found no counterpart.
    #[error("could not resolve node {reference}{}", fmt_ctx(.context))]
    NodeResolution {
        reference: String,
        context: Option<RowContext>,
    },

    /// The replacement producer is not a process node.
    #[error("node {reference} is not a process and cannot produce an edge")]
    InvalidProducerKind { reference: String },

    /// The safety razor was invoked on a producer/consumer pair with no
    /// existing edge between them.
    #[error("no existing edge from producer {producer} to consumer {consumer}")]
    NoSuchEdge { producer: NodeId, consumer: NodeId },

    /// A structural invariant was broken: weights not summing to 1, a
    /// synthetic-id collision, or an unannotated row reaching the compiler.
    #[error("invariant violation: {reason}{}", fmt_ctx(.context))]
    InvariantViolation {
        reason: String,
        context: Option<RowContext>,
    },
}

fn fmt_ctx(context: &Option<RowContext>) -> String {
    match context {
        Some(ctx) => format!(" ({ctx})"),
        None => String::new(),
    }
}
