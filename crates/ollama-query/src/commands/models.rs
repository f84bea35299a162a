//! Model listing and inspection commands.

use std::io::Write;

use chrono::DateTime;
use console::style;

use super::{ActionResult, Session, require_args, rule};

const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `ls`: models available on the server.
pub fn list(session: &mut Session, _args: &[String]) -> ActionResult {
    let models = session.client().models().list()?;
    let out = &mut session.out;

    writeln!(out, "{}", rule())?;
    if models.is_empty() {
        writeln!(out, "No models available.")?;
        return Ok(None);
    }

    writeln!(out, "{:<30} {:<7} {:<7} {}", "Name", "Params", "Quant", "Size (MB)")?;
    for model in &models {
        writeln!(
            out,
            "{:<30} {:<7} {:<7} {}",
            model.name,
            model.details.parameter_size,
            model.details.quantization_level,
            model.size_mb()
        )?;
    }
    Ok(None)
}

/// `ps`: models currently loaded in memory.
pub fn ps(session: &mut Session, _args: &[String]) -> ActionResult {
    let models = session.client().models().running()?;
    let out = &mut session.out;

    writeln!(out, "{}", rule())?;
    if models.is_empty() {
        writeln!(out, "No models found.")?;
        return Ok(None);
    }

    writeln!(out, "{:<30} {:<30} {:>19}", "Name", "Model", "Expires")?;
    for model in &models {
        let expires = model.expires_at.as_deref().map(format_expiry).unwrap_or_default();
        writeln!(out, "{:<30} {:<30} {:>19}", model.name, model.model, expires)?;
    }
    Ok(None)
}

/// `show <name>`: details of one model.
pub fn show(session: &mut Session, args: &[String]) -> ActionResult {
    require_args(args, 1, "show <name>")?;
    let name = &args[0];
    let info = session.client().models().show(name)?;
    let out = &mut session.out;
    let details = &info.details;

    writeln!(out, "{}", rule())?;
    writeln!(out, "{}", style(name).bold())?;
    writeln!(out, "  {:<14} {}", "Family:", details.family)?;
    writeln!(out, "  {:<14} {}", "Format:", details.format)?;
    writeln!(out, "  {:<14} {}", "Parameters:", details.parameter_size)?;
    writeln!(out, "  {:<14} {}", "Quantization:", details.quantization_level)?;
    if let Some(modified) = &info.modified_at {
        writeln!(out, "  {:<14} {}", "Modified:", format_expiry(modified))?;
    }
    if !info.capabilities.is_empty() {
        writeln!(out, "  {:<14} {}", "Capabilities:", info.capabilities.join(", "))?;
    }
    if !info.parameters.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", style("Parameters").bold())?;
        for line in info.parameters.lines() {
            writeln!(out, "  {}", line.trim())?;
        }
    }
    Ok(None)
}

/// Render a server timestamp, falling back to the raw text.
fn format_expiry(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format(EXPIRY_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}
