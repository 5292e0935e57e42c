use crate::graph::Graph;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Suppress human output when `LSIF_MONIKER_QUIET` is set
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("LSIF_MONIKER_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// Serialization of the finished graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON element per line
    #[default]
    Line,
    /// A single JSON array
    Json,
}

/// Write every element of `graph` in id order
pub fn write_graph<W: Write>(writer: &mut W, graph: &Graph, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Line => {
            for element in graph.elements() {
                serde_json::to_writer(&mut *writer, element)?;
                writer.write_all(b"\n")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, graph.elements())?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}
