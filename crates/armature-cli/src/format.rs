// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Console formatting for build and serve summaries.
//!
//! Everything user-facing is colorized, human-readable text; there is no
//! machine-readable output mode. The `format_*` functions are pure and
//! return strings; the `print_*` wrappers write to stdout.

use armature::BuildResult;
use console::style;
use std::io::Write;

/// Uppercases the first character of a message.
pub fn uppercase_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Formats one project error for display.
pub fn format_error(message: &str) -> String {
    format!("{}\n{}", style("Error").red(), uppercase_first(message))
}

/// Formats one project warning for display.
pub fn format_warning(message: &str) -> String {
    format!("{}\n{}", style("WARNING").yellow(), uppercase_first(message))
}

/// Renders a byte count in a human scale: base-1024 steps, one decimal.
pub fn file_size(bytes: u64) -> String {
    const UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}

/// Plural suffix for a count: empty for one, "s" above.
pub fn plural_s(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

/// Clears the terminal display, scrollback included.
pub fn clear_console() {
    print!("\x1B[2J\x1B[3J\x1B[H");
    let _ = std::io::stdout().flush();
}

/// Prints the one-shot build summary.
///
/// Order: errors, warnings, elapsed time, counts, then every emitted asset
/// column-aligned to the longest name with its human-scaled size.
pub fn print_build_summary(result: &BuildResult) {
    if result.has_errors() {
        let rendered: Vec<String> = result.errors.iter().map(|e| format_error(e)).collect();
        println!("{}", rendered.join("\n\n"));
        println!();
    }

    if result.has_warnings() {
        let rendered: Vec<String> = result.warnings.iter().map(|w| format_warning(w)).collect();
        println!("{}", rendered.join("\n\n"));
        println!();
    }

    let elapsed = format!("{:.1}s", result.elapsed.as_secs_f64());
    println!("Built in {}", style(elapsed).cyan());
    if result.has_errors() {
        let count = result.errors.len();
        println!("{}", style(format!("{} Error{}", count, plural_s(count))).red());
    }
    if result.has_warnings() {
        let count = result.warnings.len();
        println!(
            "{}",
            style(format!("{} Warning{}", count, plural_s(count))).yellow()
        );
    }

    println!();

    let widest = result
        .assets
        .iter()
        .map(|asset| asset.name.len())
        .max()
        .unwrap_or(0);
    for asset in &result.assets {
        println!(
            "{} {}",
            style(format!("{:<widest$}", asset.name)).cyan(),
            file_size(asset.size)
        );
    }

    println!();
}

/// Clears the display and prints the per-pass serve status.
///
/// Errors take precedence over warnings; a clean pass prints the good
/// status with no further detail.
pub fn print_serve_status(url: &str, result: &BuildResult) {
    clear_console();
    println!("Serving on {}", style(url).cyan());
    println!();

    if result.has_errors() {
        println!("{}", style("👎 Bad").red());
        println!();
        let rendered: Vec<String> = result.errors.iter().map(|e| format_error(e)).collect();
        println!("{}", rendered.join("\n\n"));
    } else if result.has_warnings() {
        println!("{}", style("🤔 Uncertain").yellow());
        println!();
        let rendered: Vec<String> = result.warnings.iter().map(|w| format_warning(w)).collect();
        println!("{}", rendered.join("\n\n"));
    } else {
        println!("{}", style("👍 Good").green());
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_scales_by_1024() {
        assert_eq!(file_size(0), "0.0 B");
        assert_eq!(file_size(1536), "1.5 kB");
        assert_eq!(file_size(1_048_576), "1.0 MB");
        assert_eq!(file_size(1023), "1023.0 B");
        assert_eq!(file_size(1024), "1.0 kB");
    }

    #[test]
    fn plural_suffix_only_above_one() {
        assert_eq!(format!("{} Error{}", 1, plural_s(1)), "1 Error");
        assert_eq!(format!("{} Error{}", 2, plural_s(2)), "2 Errors");
        assert_eq!(format!("{} Warning{}", 5, plural_s(5)), "5 Warnings");
    }

    #[test]
    fn messages_are_uppercased_first() {
        assert_eq!(uppercase_first("module not found"), "Module not found");
        assert_eq!(uppercase_first(""), "");
        assert!(format_error("broken import").contains("Broken import"));
        assert!(format_warning("unused export").contains("Unused export"));
    }
}
