//! Metrics declaration and recording.

use crate::transcode::Outcome;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of processed bodies by outcome.
    pub static ref RESPONSES_COUNTER: &'static str = {
        metrics::describe_counter!(
            "recode_responses_total",
            "Total number of response bodies processed, by outcome."
        );
        "recode_responses_total"
    };
    /// Track number of UTF-8 bytes produced by decoding.
    pub static ref TRANSCODED_BYTES_COUNTER: &'static str = {
        metrics::describe_counter!(
            "recode_transcoded_bytes_total",
            metrics::Unit::Bytes,
            "Total number of UTF-8 bytes produced by transcoding."
        );
        "recode_transcoded_bytes_total"
    };
}

/// Record the outcome of a single transcode call.
///
/// `len` is the length of the returned body.
///
/// When the `metrics` feature is disabled, this function is a no-op.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_transcode(outcome: Outcome, len: usize) {
    metrics::counter!(*RESPONSES_COUNTER, "outcome" => outcome.as_str()).increment(1);
    if outcome == Outcome::Transcoded {
        metrics::counter!(*TRANSCODED_BYTES_COUNTER).increment(len as u64);
    }
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_transcode(_outcome: Outcome, _len: usize) {}
