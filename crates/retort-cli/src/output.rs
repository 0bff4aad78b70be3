//! Output formatting utilities.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::Serialize;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and key-value listings.
    Pretty,
    /// Raw JSON, one document per command.
    Json,
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a table header with the given columns.
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", style(header).bold());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    println!("{}", "-".repeat(total_width.saturating_sub(1)));
}

/// Prints a table row with the given values.
pub fn print_table_row(values: &[(&str, usize)]) {
    let row: String = values
        .iter()
        .map(|(val, width)| format_cell(val, *width))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", row);
}

/// Pads or truncates one cell to its column width. Server-supplied names
/// can be non-ASCII, so truncation counts characters, not bytes.
fn format_cell(val: &str, width: usize) -> String {
    if val.chars().count() > width {
        let prefix: String = val.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", prefix)
    } else {
        format!("{:<width$}", val, width = width)
    }
}

/// Prints a key-value pair with consistent formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("{:<16}{}", format!("{}:", key), value);
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Prints an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Formats an optional timestamp for table display.
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Format bytes into human-readable size
pub fn format_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Masks a token for display, keeping the first and last four characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 12 {
        "*".repeat(chars.len())
    } else {
        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("rk_1234567890abcd"), "rk_1...abcd");
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_mask_token_multibyte() {
        assert_eq!(mask_token("トークンとーくん12345"), "トークン...2345");
        assert_eq!(mask_token("ひみつ"), "***");
    }

    #[test]
    fn test_cell_truncation_is_char_aware() {
        assert_eq!(format_cell("実験データセット微調整パイプライン", 8), "実験データ...");
        assert_eq!(format_cell("a-very-long-ascii-identifier", 10), "a-very-...");
        assert_eq!(format_cell("short", 8), "short   ");
    }

    #[test]
    fn test_table_row_accepts_multibyte_values() {
        print_table_row(&[("実験データセット微調整パイプライン", 32), ("日本語ジョブ", 4)]);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None), "-");

        let ts = DateTime::parse_from_rfc3339("2024-05-01T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(Some(ts)), "2024-05-01 10:30:00");
    }
}
