use nom::{branch::alt, bytes::complete::tag, combinator::{map, rest}, sequence::preceded, IResult};
use serde_json::Value;
use tracing::debug;

/// One decoded (event name, payload) unit from the wire protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFrame {
    /// The announced event name, if an `event:` line preceded the data line.
    pub event: Option<String>,
    pub payload: Value,
}

#[derive(Debug, PartialEq)]
enum WireLine<'a> {
    Event(&'a str),
    Data(&'a str),
    Noise,
}

fn parse_wire_line(input: &str) -> IResult<&str, WireLine<'_>> {
    alt((
        map(preceded(tag("event:"), rest), |r: &str| {
            WireLine::Event(r.trim())
        }),
        map(preceded(tag("data:"), rest), WireLine::Data),
        map(rest, |_| WireLine::Noise),
    ))(input)
}

/// Bare JSON rejects the IEEE specials some producers emit; they carry no
/// information a chart can use, so they become nulls before parsing.
fn sanitize_json(raw: &str) -> String {
    raw.replace("-Infinity", "null")
        .replace("Infinity", "null")
        .replace("NaN", "null")
}

/// Single-pass state machine over an incrementally delivered event stream.
///
/// Feed it network chunks as they arrive; it hands back every frame that
/// completed inside the chunk. Bytes after the last line terminator stay
/// buffered, so frames (and multi-byte characters) may span any number of
/// reads. A line of malformed JSON drops only that frame and the stream
/// carries on. Blank-line separators are tolerated but not required.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    current_event: Option<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder::default()
    }

    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let mut line = String::from_utf8_lossy(&line_bytes[..pos]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(frame) = self.handle_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn handle_line(&mut self, line: &str) -> Option<StreamFrame> {
        match parse_wire_line(line) {
            Ok((_, WireLine::Event(name))) => {
                self.current_event = Some(name.to_string());
                None
            }
            Ok((_, WireLine::Data(raw))) => match serde_json::from_str(&sanitize_json(raw)) {
                Ok(payload) => Some(StreamFrame {
                    event: self.current_event.take(),
                    payload,
                }),
                Err(err) => {
                    debug!(%err, "dropping malformed data frame");
                    None
                }
            },
            _ => None,
        }
    }
}
