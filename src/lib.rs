// Library exports for chartstream

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod format;
pub mod normalize;
pub mod request;
pub mod stream;

// Chart pipeline modules
pub mod ir;
pub mod render;
pub mod resolve;
pub mod transform;

pub use data::{AnalyticalResult, ChartConfig, ChartPayload, Message, Row, Transcript};
pub use error::SessionError;
pub use ir::{ChartKind, RenderOutcome};
pub use render::render_chart;
pub use stream::{FrameDecoder, Session, StreamFrame};
