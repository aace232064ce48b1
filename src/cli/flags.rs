//! Per-message generation flags typed at the end of a prompt line.
//!
//! `describe <image:cat.jpg> --temperature 0.2 --max-tokens 128` sends
//! `describe <image:cat.jpg>` with those two overrides. Only a trailing run
//! of recognised flags is taken; anything earlier stays in the prompt.

use crate::backend::validate_device;
use crate::core::generation::{GenerationConfigError, GenerationOverrides};

/// Splits `line` into the prompt and the overrides from its trailing flags.
///
/// A run that is well-formed but carries a bad value (`--temperature hot`)
/// is an error rather than prompt text.
pub fn split_trailing_flags(
    line: &str,
) -> Result<(&str, GenerationOverrides), GenerationConfigError> {
    let tokens = tokenize(line);
    let start = (0..tokens.len())
        .find(|&k| is_flag_run(&tokens[k..]))
        .unwrap_or(tokens.len());

    let Some(&(offset, _)) = tokens.get(start) else {
        return Ok((line, GenerationOverrides::default()));
    };

    let mut overrides = GenerationOverrides::default();
    let mut rest = tokens[start..].iter().map(|&(_, token)| token);
    while let Some(token) = rest.next() {
        let Some((name, inline)) = parse_flag_token(token) else {
            continue;
        };
        let value = match (inline, GenerationOverrides::flag_takes_value(name)) {
            (Some(value), _) => Some(value),
            (None, Some(true)) => rest.next(),
            (None, _) => None,
        };
        overrides.apply_flag(name, value)?;
    }

    if let Some(device) = &overrides.device {
        validate_device(device).map_err(|_| GenerationConfigError::InvalidValue {
            flag: "device".to_string(),
            value: device.clone(),
        })?;
    }

    Ok((line[..offset].trim_end(), overrides))
}

/// Whitespace-separated tokens with their byte offsets.
fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(begin)) => {
                tokens.push((begin, &line[begin..index]));
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(begin) = start {
        tokens.push((begin, &line[begin..]));
    }
    tokens
}

/// `--name` or `--name=value`.
fn parse_flag_token(token: &str) -> Option<(&str, Option<&str>)> {
    let body = token.strip_prefix("--")?;
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };
    (!name.is_empty()).then_some((name, value))
}

fn is_flag_run(tokens: &[(usize, &str)]) -> bool {
    let mut index = 0;
    while index < tokens.len() {
        let Some((name, inline)) = parse_flag_token(tokens[index].1) else {
            return false;
        };
        match (GenerationOverrides::flag_takes_value(name), inline) {
            (Some(true), None) => match tokens.get(index + 1) {
                Some((_, value)) if !value.starts_with("--") => index += 1,
                _ => return false,
            },
            (Some(true), Some(_)) | (Some(false), None) => {}
            (Some(false), Some(_)) | (None, _) => return false,
        }
        index += 1;
    }
    !tokens.is_empty()
}
