//! Input utilities for the interactive prompt.

/// Sanitize one line of typed or piped input.
///
/// Tabs become single spaces and every other control character is dropped,
/// so stray escape sequences or a trailing `\r` from Windows line endings
/// never reach the media tag resolver.
pub fn sanitize_line(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push(' '),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}

/// Whether the line asks to leave the session.
pub fn is_quit_command(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "exit" | "quit" | "/exit" | "/quit"
    )
}
