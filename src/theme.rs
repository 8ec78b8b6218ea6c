//! Catppuccin Mocha accents for REPL syntax highlighting.

use nu_ansi_term::{Color, Style};

const SURFACE2: Color = Color::Rgb(108, 112, 134);
const RED: Color = Color::Rgb(243, 139, 168);
const GREEN: Color = Color::Rgb(166, 227, 161);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const PEACH: Color = Color::Rgb(250, 179, 135);
const TEAL: Color = Color::Rgb(148, 226, 213);
const SKY: Color = Color::Rgb(137, 220, 235);

/// > <   => SKY/TEAL (movement)
/// + -   => GREEN/RED (data modification)
/// . ,   => YELLOW/PEACH (I/O)
/// [ ]   => MAUVE (flow control)
/// other => SURFACE2 (comments)
pub fn style_for(ch: char) -> Style {
    let color = match ch {
        '>' => SKY,
        '<' => TEAL,
        '+' => GREEN,
        '-' => RED,
        '.' => YELLOW,
        ',' => PEACH,
        '[' | ']' => MAUVE,
        _ => return Style::new().fg(SURFACE2),
    };
    Style::new().fg(color).bold()
}
