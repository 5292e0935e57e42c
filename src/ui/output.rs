//! Human-readable progress lines.
//!
//! Everything goes to stderr: stdout is reserved for the emitted graph.

use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    eprintln!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    eprintln!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(icon: &str, label: &str, value: &str) {
    eprintln!(
        "{} {}: {}",
        icon.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value.style(theme().identifier.clone())
    );
}

pub fn section(title: &str) {
    eprintln!();
    eprintln!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn timing(elapsed: &str) {
    eprintln!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    eprintln!("  {} {}", label.style(theme().dim.clone()), value);
}
