//! Model listing for `qllama list`.

use std::io::{self, Write};

use crate::core::config::Config;
use crate::models::all_models;

/// Prints every registered model with its family, modalities and the name
/// it is served under, noting config overrides.
pub fn write_model_list<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    writeln!(out, "Available models:")?;
    for entry in all_models() {
        writeln!(out, "  - {}", entry.id)?;
        writeln!(
            out,
            "      {} ({}): {}",
            entry.family.label(),
            entry.family.modalities().join(", "),
            entry.description
        )?;
        match config.served_model_override(entry.id) {
            Some(served) => writeln!(
                out,
                "      served as {served} (from config, default {})",
                entry.served_model
            )?,
            None => writeln!(out, "      served as {}", entry.served_model)?,
        }
    }
    Ok(())
}

pub fn list_models() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let stdout = io::stdout();
    write_model_list(&mut stdout.lock(), &config)?;
    Ok(())
}
