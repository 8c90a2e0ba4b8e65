//! Terminal output helpers: colored notes, a small table renderer, and the
//! incremental writer used for streamed replies.

use std::io::Write;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Color unless `NO_COLOR` is set or the terminal is dumb.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

/// Strip ANSI SGR sequences.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn note(color: &str, glyph: &str, plain: &str, msg: &str) -> String {
    if supports_color() {
        format!("{color}{BOLD}{glyph}{RESET} {msg}")
    } else {
        format!("{plain}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note(CYAN, "i", "INFO", msg));
}

pub fn note_warn(msg: &str) {
    println!("{}", note(YELLOW, "!", "WARN", msg));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", note(RED, "x", "ERROR", msg));
}

pub fn note_success(msg: &str) {
    println!("{}", note(GREEN, "ok", "OK", msg));
}

/// Render `rows` as left-aligned columns under `headers`.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let pad = |cell: &str, width: usize| {
        let visible = strip_ansi(cell).chars().count();
        format!("{cell}{}", " ".repeat(width.saturating_sub(visible)))
    };

    let mut out = String::new();
    let header: Vec<String> = headers.iter().zip(&widths).map(|(h, w)| pad(h, *w)).collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end()));
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}\n", sep.join("  ")));
    for row in rows {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ").trim_end()));
    }
    out
}

/// Write one chunk and flush so partial replies show up immediately.
pub fn stream_write(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_table() {
        let rows = vec![
            vec!["backend".to_string(), format!("{GREEN}up{RESET}")],
            vec!["probe".to_string(), "down".to_string()],
        ];
        let table = render_table(&["Check", "State"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "  Check    State");
        assert_eq!(lines[1], "  -------  -----");
        assert!(lines[2].contains("backend"));
        assert_eq!(lines[3], "  probe    down");
    }

    #[test]
    fn stream_write_appends() {
        let mut out = Vec::new();
        stream_write(&mut out, "Hel").unwrap();
        stream_write(&mut out, "lo").unwrap();
        assert_eq!(out, b"Hello");
    }
}
