//! Inline media tags in user input.
//!
//! Users attach media by writing `<image:LOCATOR>` or `<video:LOCATOR>` anywhere
//! in a line. [`resolve`] splits a line into ordered [`ContentPart`]s without
//! touching the filesystem or network; locators are only classified as local
//! paths or `http(s)` URLs.
//!
//! Anything that does not form a complete tag (unknown kind, empty locator,
//! missing `>`) stays in the text untouched, so angle brackets in ordinary
//! prose are never lost.

use crate::core::message::{ContentPart, MediaKind, MediaReference};

/// Splits `raw_text` into text and media parts, in input order.
///
/// Whitespace separating text from an adjacent tag is dropped, and runs that
/// are empty or whitespace-only produce no part at all. Text that does not
/// border a tag is kept verbatim.
pub fn resolve(raw_text: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    let mut run_start = 0;
    let mut cursor = 0;
    let mut after_tag = false;

    while let Some(offset) = raw_text[cursor..].find('<') {
        let open = cursor + offset;
        match parse_tag(&raw_text[open..]) {
            Some((reference, len)) => {
                push_text(&mut parts, &raw_text[run_start..open], after_tag, true);
                parts.push(ContentPart::media(reference));
                cursor = open + len;
                run_start = cursor;
                after_tag = true;
            }
            None => cursor = open + 1,
        }
    }

    push_text(&mut parts, &raw_text[run_start..], after_tag, false);
    parts
}

/// Parses one tag at the start of `input` (which begins with `<`), returning
/// the reference and the byte length of the tag.
fn parse_tag(input: &str) -> Option<(MediaReference, usize)> {
    let body = input.strip_prefix('<')?;
    let colon = body.find(':')?;
    let kind = MediaKind::from_tag(&body[..colon])?;

    let rest = &body[colon + 1..];
    let close = rest.find(['>', '<', '\n', '\r'])?;
    if !rest[close..].starts_with('>') {
        return None;
    }

    let locator = rest[..close].trim();
    if locator.is_empty() {
        return None;
    }

    let len = 1 + colon + 1 + close + 1;
    Some((MediaReference::new(kind, locator, &input[..len]), len))
}

fn push_text(parts: &mut Vec<ContentPart>, run: &str, trim_start: bool, trim_end: bool) {
    let mut text = run;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if text.trim().is_empty() {
        return;
    }
    parts.push(ContentPart::text(text));
}
