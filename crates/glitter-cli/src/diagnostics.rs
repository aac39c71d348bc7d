//! Pretty-prints `Diagnostic`s to stderr: level, message, the offending
//! source line, and a caret underline beneath the span — colored by
//! severity via `colored::Colorize` (the same crate and call style the
//! `cabin` interpreter uses for its own token/error output).

use colored::{Color, Colorize};

use glitter_util::{Diagnostic, Level};

pub fn print_diagnostic(source: &str, diagnostic: &Diagnostic, use_color: bool) {
    let level_color = match diagnostic.level {
        Level::Error => Color::Red,
        Level::Warning => Color::Yellow,
        Level::Note => Color::Cyan,
    };

    let header = format!("{}: {}", diagnostic.level, diagnostic.message);
    let header = if use_color { header.color(level_color).bold().to_string() } else { header };
    eprintln!("{header}");

    let Some(line_text) = source.lines().nth(diagnostic.span.line.saturating_sub(1) as usize) else {
        return;
    };
    let location = format!(
        "  --> {}:{}",
        diagnostic.span.file().display(),
        diagnostic.span.line
    );
    eprintln!("{}", if use_color { location.dimmed().to_string() } else { location });
    eprintln!("   | {line_text}");

    let column = column_of(source, diagnostic.span.start, diagnostic.span.line);
    let underline_len = diagnostic.span.len.max(1);
    let caret = format!("   | {}{}", " ".repeat(column), "^".repeat(underline_len));
    eprintln!("{}", if use_color { caret.color(level_color).to_string() } else { caret });
}

/// Byte offset of `start` within its own line, used to position the caret.
fn column_of(source: &str, start: usize, line: u32) -> usize {
    let mut line_start = 0;
    for (idx, text) in source.lines().enumerate() {
        if idx as u32 + 1 == line {
            line_start = text.as_ptr() as usize - source.as_ptr() as usize;
            break;
        }
    }
    start.saturating_sub(line_start)
}
