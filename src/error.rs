use thiserror::Error;

/// Session-lifecycle errors callers are expected to match on. Everything else
/// in the pipeline is either recovered locally (dropped frames) or expressed
/// as an explicit outcome state rather than an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A new query must not start while one is streaming on the same
    /// transcript. Independent transcripts are unaffected.
    #[error("a query is already in flight on this transcript")]
    QueryInFlight,
}
