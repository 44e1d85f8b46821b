use colored::Colorize;

pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Errors go to stderr so listings stay pipeable.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// One listing row: a bold name followed by dimmed detail.
pub fn row(name: &str, detail: &str) {
    println!("  • {} {}", name.bold(), detail.dimmed());
}

/// Indented continuation line under a row.
pub fn sub(msg: &str) {
    println!("      {msg}");
}
