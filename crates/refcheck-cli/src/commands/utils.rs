//! Utils - Shared Output Helpers
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use colored::Colorize;

// =============================================================================
// Output
// =============================================================================

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a failure message
pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a header
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Formats extents as `[a, b, c]`.
pub fn format_dims(dims: &[usize]) -> String {
    let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dims() {
        assert_eq!(format_dims(&[3, 3]), "[3, 3]");
        assert_eq!(format_dims(&[]), "[]");
    }
}
