//! Generate command: stream a completion, carrying context between calls.

use console::Style;
use ollama_query_client::GenerateRequest;

use super::stream::print_stream;
use super::{ActionResult, Session, require_args};

const USAGE: &str = "generate <model_name> <prompt>";

/// `generate <model> <prompt...>`
///
/// Replays the session's continuation token when there is one and returns the
/// new token under `context` for the dispatch loop to store.
pub fn run(session: &mut Session, args: &[String]) -> ActionResult {
    require_args(args, 2, USAGE)?;
    let prompt = args[1..].join(" ");

    let request = GenerateRequest::new(&args[0], prompt).with_context(session.context());
    let stream = session.client().generate().stream(&request)?;

    let verbosity = session.verbosity();
    let summary = print_stream(stream, &mut session.out, &Style::new().green(), verbosity)?;
    tracing::debug!(fragments = summary.fragments, "Generation finished");
    if !summary.completed {
        tracing::warn!("Response ended before the completion record; context unchanged");
    }
    Ok(summary.metadata)
}
