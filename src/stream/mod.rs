// ============================================================================
// Stream assembly: wire frames in, transcript turns out
// ============================================================================
//
// The decoder owns bytes and frame boundaries; the session owns meaning. A
// caller feeds arbitrary transport chunks to `FrameDecoder::ingest` and hands
// each emitted frame to `Session::apply_frame` against its transcript.

pub mod decoder;
pub mod session;

pub use decoder::{FrameDecoder, StreamFrame};
pub use session::{Progress, Session};
