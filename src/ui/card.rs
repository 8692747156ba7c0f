//! Card rendering.
//!
//! The card fills the screen with the theme background and centers a
//! "Change Theme" button drawn with the foreground as its fill and the
//! primary color as its label.

use crate::store::{RequestState, StoreState};
use crate::theme::Color;
use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};

pub const BUTTON_LABEL: &str = "Change Theme";
pub const KEY_HINTS: &str = "space/enter: change theme  1-9: preset  q: quit";

const BUTTON_PADDING: u16 = 3;

/// Where the card's pieces land for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub button_col: u16,
    pub button_row: u16,
    pub button_width: u16,
    pub status_row: u16,
    pub hints_row: u16,
}

/// Center the button; status sits two rows below it, hints on the last row.
pub fn card_layout(cols: u16, rows: u16) -> CardLayout {
    let label_width = BUTTON_LABEL.chars().count() as u16;
    let button_width = (label_width + BUTTON_PADDING * 2).min(cols.max(1));
    let button_col = cols.saturating_sub(button_width) / 2;
    let button_row = rows.saturating_sub(3) / 2;
    CardLayout {
        button_col,
        button_row,
        button_width,
        status_row: (button_row + 4).min(rows.saturating_sub(2)),
        hints_row: rows.saturating_sub(1),
    }
}

/// Human-readable request status for the line under the button.
pub fn status_text(state: &StoreState) -> String {
    match &state.request {
        RequestState::Idle => String::new(),
        RequestState::Pending => "fetching a new theme…".to_string(),
        RequestState::Fulfilled => state.theme.to_string(),
        RequestState::Rejected(err) => format!("could not change theme: {}", err.message()),
    }
}

pub fn to_terminal_color(color: Color) -> crossterm::style::Color {
    crossterm::style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Draw the full-screen card for `state`.
pub fn render_card<W: Write>(
    out: &mut W,
    state: &StoreState,
    (cols, rows): (u16, u16),
    color: bool,
) -> io::Result<()> {
    let layout = card_layout(cols, rows);
    let theme = state.theme;

    if color {
        out.queue(SetBackgroundColor(to_terminal_color(theme.background)))?;
    }
    out.queue(Clear(ClearType::All))?;

    let blank = " ".repeat(layout.button_width as usize);
    let label = center(BUTTON_LABEL, layout.button_width as usize);
    for (offset, text) in [&blank, &label, &blank].into_iter().enumerate() {
        out.queue(MoveTo(layout.button_col, layout.button_row + offset as u16))?;
        if color {
            out.queue(SetBackgroundColor(to_terminal_color(theme.foreground)))?;
            out.queue(SetForegroundColor(to_terminal_color(theme.primary)))?;
            out.queue(SetAttribute(Attribute::Bold))?;
        }
        out.queue(Print(text))?;
    }

    if color {
        out.queue(SetAttribute(Attribute::Reset))?;
        out.queue(SetBackgroundColor(to_terminal_color(theme.background)))?;
        out.queue(SetForegroundColor(to_terminal_color(theme.foreground)))?;
    }
    let status = status_text(state);
    if !status.is_empty() {
        out.queue(MoveTo(
            centered_col(&status, cols),
            layout.status_row,
        ))?;
        out.queue(Print(&status))?;
    }
    out.queue(MoveTo(centered_col(KEY_HINTS, cols), layout.hints_row))?;
    out.queue(Print(KEY_HINTS))?;

    if color {
        out.queue(ResetColor)?;
    }
    out.flush()
}

/// Plain, line-oriented summary used outside the full-screen card.
pub fn write_summary<W: Write>(out: &mut W, state: &StoreState, color: bool) -> io::Result<()> {
    let theme = state.theme;
    for (name, value) in [
        ("background", theme.background),
        ("foreground", theme.foreground),
        ("primary", theme.primary),
    ] {
        if color {
            out.queue(SetBackgroundColor(to_terminal_color(value)))?;
            out.queue(Print("   "))?;
            out.queue(ResetColor)?;
            out.queue(Print(" "))?;
        }
        writeln!(out, "{name:<11} {value}")?;
    }
    writeln!(out, "{:<11} {}", "request", state.request.label())?;
    if let RequestState::Rejected(err) = &state.request {
        writeln!(out, "{:<11} {}", "error", err.message())?;
    }
    out.flush()
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn centered_col(text: &str, cols: u16) -> u16 {
    let len = text.chars().count().min(u16::MAX as usize) as u16;
    cols.saturating_sub(len) / 2
}
