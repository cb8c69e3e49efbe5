// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders: medium grey
    pub const CONTEXT: u8 = 245;
    /// Secondary text: darker grey
    pub const MUTED: u8 = 240;
    /// Pipeline stage names: soft cyan
    pub const STAGE: u8 = 80;
    pub const SUCCESS: u8 = 114;
    pub const FAILURE: u8 = 174;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

pub fn success(text: &str) -> String {
    paint(codes::SUCCESS, text)
}

pub fn failure(text: &str) -> String {
    paint(codes::FAILURE, text)
}

pub fn stage(text: &str) -> String {
    paint(codes::STAGE, text)
}

/// Connection state of a pool slot, padded to `width` before painting so
/// escape codes don't skew table alignment.
pub fn worker_state(connected: bool, width: usize) -> String {
    let padded = if connected {
        format!("{:<width$}", "connected")
    } else {
        format!("{:<width$}", "disconnected")
    };
    paint(if connected { codes::SUCCESS } else { codes::MUTED }, &padded)
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
