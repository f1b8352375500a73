use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use chartstream::data::{ChartConfig, ChartPayload, Row, Transcript};
use chartstream::render::render_chart;
use chartstream::stream::{FrameDecoder, Session};
use chartstream::csv_reader;

#[derive(Parser, Debug)]
#[command(name = "chartstream")]
#[command(about = "Assemble streamed analysis transcripts and compile chart descriptions", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded event stream into a transcript
    Assemble {
        /// The user query the stream answers
        #[arg(long)]
        query: String,
        /// Recorded stream file, '-' for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Compile rows plus an optional chart config into a chart description
    Render {
        /// Row data: CSV (with headers) or a JSON array of objects, '-' for stdin
        #[arg(default_value = "-")]
        input: String,
        /// Chart config as a JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Chart type tag, e.g. vertical_bar_chart or pie_chart
        #[arg(long = "chart-type")]
        chart_type: Option<String>,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Assemble { query, input } => assemble(&query, &input),
        Command::Render {
            input,
            config,
            chart_type,
            title,
        } => render(&input, config.as_deref(), chart_type, title),
    }
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if path == "-" {
        io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Failed to open {}", path))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}", path))?;
    }
    Ok(bytes)
}

fn assemble(query: &str, input: &str) -> Result<()> {
    let bytes = read_input(input)?;

    let mut transcript = Transcript::new();
    transcript.begin_query(query)?;
    let mut session = Session::new();
    let mut decoder = FrameDecoder::new();

    'replay: for chunk in bytes.chunks(4096) {
        for frame in decoder.ingest(chunk) {
            session.apply_frame(&mut transcript, &frame);
            if session.is_done() {
                break 'replay;
            }
        }
    }
    if !session.is_done() {
        session.abort(&mut transcript, "the stream ended before completion");
    }

    let out = serde_json::to_string_pretty(&transcript)?;
    writeln!(io::stdout(), "{}", out).context("Failed to write transcript")?;
    Ok(())
}

fn render(
    input: &str,
    config_path: Option<&std::path::Path>,
    chart_type: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let bytes = read_input(input)?;
    let data = parse_rows(&bytes)?;

    let chart_config: ChartConfig = match config_path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse chart config {}", path.display()))?
        }
        None => ChartConfig::default(),
    };

    let payload = ChartPayload {
        title,
        chart_type,
        data,
        chart_config,
    };
    let outcome = render_chart(&payload);
    let out = serde_json::to_string_pretty(&outcome)?;
    writeln!(io::stdout(), "{}", out).context("Failed to write chart description")?;
    Ok(())
}

/// Accepts either a JSON array of objects or headered CSV, sniffed from the
/// first non-whitespace byte.
fn parse_rows(bytes: &[u8]) -> Result<Vec<Row>> {
    let looks_like_json = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'[');
    if looks_like_json {
        serde_json::from_slice(bytes).context("Failed to parse JSON row array")
    } else if bytes.is_empty() {
        bail!("No input rows given");
    } else {
        csv_reader::read_csv(bytes)
    }
}
