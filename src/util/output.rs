use std::io::{self, Write};

use console::style;

/// `--no-color` turns styling off for both streams before anything is
/// printed.
pub fn set_colors(enabled: bool) {
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{} {}", style("warning:").yellow().bold(), message);
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{} {}", style("error:").red().bold(), message);
}
