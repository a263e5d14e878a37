//! Console prefixes shared by the printers. Colors are disabled by `NO_COLOR`.

use owo_colors::OwoColorize;

pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors() {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

pub fn warn_prefix() -> String {
    if use_colors() {
        "⟦warn⟧".yellow().bold().to_string()
    } else {
        "⟦warn⟧".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors() {
        "⟦note⟧".cyan().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}

pub fn info_prefix() -> String {
    if use_colors() {
        "⟦info⟧".blue().bold().to_string()
    } else {
        "⟦info⟧".to_string()
    }
}
