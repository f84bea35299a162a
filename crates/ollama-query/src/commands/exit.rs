//! Exit command.

use super::{ActionResult, EXIT_KEY, Metadata, Session};

/// `exit`: ask the dispatch loop to stop.
pub fn run(_session: &mut Session, _args: &[String]) -> ActionResult {
    Ok(Some(Metadata::from([(EXIT_KEY.to_string(), "0".to_string())])))
}
