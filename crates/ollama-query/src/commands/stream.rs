//! Printing streamed responses as they arrive.

use std::fmt::Debug;
use std::io::Write;

use console::Style;
use ollama_query_client::{Result as ClientResult, StreamRecord};

use super::{CONTEXT_KEY, Metadata, Verbosity};

/// What a printed stream produced.
#[derive(Debug, Default)]
pub struct StreamSummary {
    /// Number of fragments written, including empty ones.
    pub fragments: usize,
    /// Whether the completion record was seen.
    pub completed: bool,
    /// Metadata to hand back to the dispatch loop.
    pub metadata: Option<Metadata>,
}

/// Write each record's fragment to `out` as soon as it is decoded.
///
/// Stops at the completion record, then prints a statistics line and returns
/// the continuation token (if any) under [`CONTEXT_KEY`]. A failure reported
/// by the stream is logged and ends printing without failing the action;
/// only errors writing to `out` are returned.
pub fn print_stream<I, T>(
    records: I,
    out: &mut dyn Write,
    style: &Style,
    verbosity: Verbosity,
) -> std::io::Result<StreamSummary>
where
    I: IntoIterator<Item = ClientResult<T>>,
    T: StreamRecord + Debug,
{
    let mut summary = StreamSummary::default();

    for record in records {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, "Response stream failed");
                writeln!(out)?;
                return Ok(summary);
            }
        };

        write!(out, "{}", style.apply_to(record.fragment()))?;
        out.flush()?;
        summary.fragments += 1;

        if record.is_done() {
            summary.completed = true;
            writeln!(out)?;
            writeln!(out, "{}", Style::new().dim().apply_to(record.timings()))?;
            if verbosity.is_verbose() {
                tracing::debug!(?record, "Final stream record");
            }
            // An empty token leaves the session's token alone.
            if let Some(context) = record.context().filter(|c| !c.is_empty()) {
                summary.metadata = Some(context_metadata(context));
            }
            break;
        }
    }

    Ok(summary)
}

fn context_metadata(context: &[i64]) -> Metadata {
    // Serializing a slice of integers cannot fail.
    let encoded = serde_json::to_string(context).unwrap_or_else(|_| "[]".to_string());
    Metadata::from([(CONTEXT_KEY.to_string(), encoded)])
}
