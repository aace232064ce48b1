use std::io::{self, Write};
use std::path::Path;

use crate::core::config::data::{path_display, Config};
use crate::core::config::defaults::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::core::generation::{
    DEFAULT_DEVICE, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};

fn line<W: Write, T: std::fmt::Display>(
    out: &mut W,
    key: &str,
    value: Option<T>,
    default: impl std::fmt::Display,
) -> io::Result<()> {
    match value {
        Some(value) => writeln!(out, "  {key}: {value}"),
        None => writeln!(out, "  {key}: {default} (default)"),
    }
}

impl Config {
    pub fn print_all<W: Write>(&self, out: &mut W, path: &Path) -> io::Result<()> {
        writeln!(out, "Current configuration ({}):", path_display(path))?;
        line(out, "endpoint", self.endpoint.as_deref(), DEFAULT_ENDPOINT)?;
        match &self.api_key_env {
            Some(var) => {
                let status = if self.api_key().is_some() { "set" } else { "not set" };
                writeln!(out, "  api-key-env: {var} ({status})")?;
            }
            None => writeln!(out, "  api-key-env: (unset)")?,
        }
        line(out, "device", self.device.as_deref(), DEFAULT_DEVICE)?;
        line(out, "temperature", self.temperature, DEFAULT_TEMPERATURE)?;
        line(out, "max-tokens", self.max_tokens, DEFAULT_MAX_TOKENS)?;
        line(out, "top-p", self.top_p, DEFAULT_TOP_P)?;
        line(
            out,
            "do-sample",
            self.do_sample.map(|on| if on { "on" } else { "off" }),
            "on",
        )?;
        match self.system_prompt() {
            Some(prompt) => writeln!(out, "  system-prompt: {prompt:?}")?,
            None => writeln!(out, "  system-prompt: (unset)")?,
        }
        line(
            out,
            "request-timeout",
            self.request_timeout_secs.map(|secs| format!("{secs}s")),
            format!("{DEFAULT_REQUEST_TIMEOUT_SECS}s"),
        )?;

        if self.options.is_empty() {
            writeln!(out, "  options: (none set)")?;
        } else {
            writeln!(out, "  options:")?;
            for (key, value) in &self.options {
                writeln!(out, "    {key} = {value}")?;
            }
        }

        let served: Vec<_> = self
            .models
            .iter()
            .filter_map(|(id, entry)| entry.served_model.as_deref().map(|name| (id, name)))
            .collect();
        if served.is_empty() {
            writeln!(out, "  served-models: (none set)")?;
        } else {
            writeln!(out, "  served-models:")?;
            for (id, name) in served {
                writeln!(out, "    {id}: {name}")?;
            }
        }
        Ok(())
    }
}
