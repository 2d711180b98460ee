//! Text styles: named colors, terminal colors, RGB and emphasis, emitted as
//! ANSI SGR escape sequences.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Emphasis: u8 {
        const BOLD          = 1 << 0;
        const ITALIC        = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// 24-bit color.
    Rgb(u8, u8, u8),
    /// 4-bit terminal color: base index 0-7 plus a bright flag.
    Terminal { index: u8, bright: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub color: Option<ColorSpec>,
    pub background: bool,
    pub emphasis: Emphasis,
}

/// Named 24-bit colors recognized in `{!NAME}` fields. A subset of the
/// classic X11 list; names are matched exactly.
pub static NAMED_COLORS: &[(&str, u32)] = &[
    ("ALICE_BLUE", 0xF0F8FF),
    ("ANTIQUE_WHITE", 0xFAEBD7),
    ("AQUA", 0x00FFFF),
    ("AQUAMARINE", 0x7FFFD4),
    ("AZURE", 0xF0FFFF),
    ("BEIGE", 0xF5F5DC),
    ("BLACK", 0x000000),
    ("BLUE", 0x0000FF),
    ("BLUE_VIOLET", 0x8A2BE2),
    ("BROWN", 0xA52A2A),
    ("CHOCOLATE", 0xD2691E),
    ("CORAL", 0xFF7F50),
    ("CORNFLOWER_BLUE", 0x6495ED),
    ("CRIMSON", 0xDC143C),
    ("CYAN", 0x00FFFF),
    ("DARK_BLUE", 0x00008B),
    ("DARK_CYAN", 0x008B8B),
    ("DARK_GRAY", 0xA9A9A9),
    ("DARK_GREEN", 0x006400),
    ("DARK_MAGENTA", 0x8B008B),
    ("DARK_ORANGE", 0xFF8C00),
    ("DARK_RED", 0x8B0000),
    ("DARK_VIOLET", 0x9400D3),
    ("DEEP_PINK", 0xFF1493),
    ("DEEP_SKY_BLUE", 0x00BFFF),
    ("DODGER_BLUE", 0x1E90FF),
    ("FIRE_BRICK", 0xB22222),
    ("FOREST_GREEN", 0x228B22),
    ("FUCHSIA", 0xFF00FF),
    ("GOLD", 0xFFD700),
    ("GRAY", 0x808080),
    ("GREEN", 0x00FF00),
    ("GREEN_YELLOW", 0xADFF2F),
    ("HOT_PINK", 0xFF69B4),
    ("INDIGO", 0x4B0082),
    ("IVORY", 0xFFFFF0),
    ("KHAKI", 0xF0E68C),
    ("LAVENDER", 0xE6E6FA),
    ("LIME", 0x00FF00),
    ("LIME_GREEN", 0x32CD32),
    ("MAGENTA", 0xFF00FF),
    ("MAROON", 0x800000),
    ("MIDNIGHT_BLUE", 0x191970),
    ("NAVY", 0x000080),
    ("OLIVE", 0x808000),
    ("ORANGE", 0xFFA500),
    ("ORANGE_RED", 0xFF4500),
    ("ORCHID", 0xDA70D6),
    ("PINK", 0xFFC0CB),
    ("PLUM", 0xDDA0DD),
    ("PURPLE", 0x800080),
    ("RED", 0xFF0000),
    ("ROYAL_BLUE", 0x4169E1),
    ("SALMON", 0xFA8072),
    ("SEA_GREEN", 0x2E8B57),
    ("SIENNA", 0xA0522D),
    ("SILVER", 0xC0C0C0),
    ("SKY_BLUE", 0x87CEEB),
    ("SLATE_GRAY", 0x708090),
    ("SPRING_GREEN", 0x00FF7F),
    ("STEEL_BLUE", 0x4682B4),
    ("TEAL", 0x008080),
    ("TOMATO", 0xFF6347),
    ("TURQUOISE", 0x40E0D0),
    ("VIOLET", 0xEE82EE),
    ("WHEAT", 0xF5DEB3),
    ("WHITE", 0xFFFFFF),
    ("YELLOW", 0xFFFF00),
    ("YELLOW_GREEN", 0x9ACD32),
];

/// 4-bit terminal colors for `{!tNAME}` fields, in SGR index order.
pub static TERMINAL_COLORS: &[&str] = &[
    "BLACK", "RED", "GREEN", "YELLOW", "BLUE", "MAGENTA", "CYAN", "WHITE",
];

pub fn lookup_named_color(name: &str) -> Option<ColorSpec> {
    NAMED_COLORS
        .iter()
        .find(|&&(n, _)| n == name)
        .map(|&(_, rgb)| ColorSpec::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

pub fn lookup_terminal_color(name: &str) -> Option<ColorSpec> {
    let (bright, base) = match name.strip_prefix("BRIGHT_") {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    TERMINAL_COLORS
        .iter()
        .position(|&n| n == base)
        .map(|index| ColorSpec::Terminal {
            index: index as u8,
            bright,
        })
}

/// Render a style as its SGR byte sequence. An all-empty style resets.
pub fn style_to_ansi(style: &TextStyle, out: &mut String) {
    use std::fmt::Write;

    if style.color.is_none() && style.emphasis.is_empty() {
        out.push_str("\x1b[0m");
        return;
    }

    if let Some(color) = style.color {
        match color {
            ColorSpec::Rgb(r, g, b) => {
                let layer = if style.background { 48 } else { 38 };
                let _ = write!(out, "\x1b[{layer};2;{r:03};{g:03};{b:03}m");
            }
            ColorSpec::Terminal { index, bright } => {
                let base = match (style.background, bright) {
                    (false, false) => 30,
                    (false, true) => 90,
                    (true, false) => 40,
                    (true, true) => 100,
                };
                let _ = write!(out, "\x1b[{}m", base + index as u16);
            }
        }
    }

    for (flag, code) in [
        (Emphasis::BOLD, 1),
        (Emphasis::ITALIC, 3),
        (Emphasis::UNDERLINE, 4),
        (Emphasis::STRIKETHROUGH, 9),
    ] {
        if style.emphasis.contains(flag) {
            let _ = write!(out, "\x1b[{code}m");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(style: TextStyle) -> String {
        let mut s = String::new();
        style_to_ansi(&style, &mut s);
        s
    }

    #[test]
    fn named_colors_emit_24_bit_sgr() {
        let style = TextStyle {
            color: lookup_named_color("BLUE"),
            ..Default::default()
        };
        assert_eq!(render(style), "\x1b[38;2;000;000;255m");
    }

    #[test]
    fn background_marker_switches_layer() {
        let style = TextStyle {
            color: lookup_named_color("RED"),
            background: true,
            ..Default::default()
        };
        assert_eq!(render(style), "\x1b[48;2;255;000;000m");
    }

    #[test]
    fn terminal_colors_use_4_bit_codes() {
        let fg = TextStyle {
            color: lookup_terminal_color("RED"),
            ..Default::default()
        };
        assert_eq!(render(fg), "\x1b[31m");

        let bg = TextStyle {
            color: lookup_terminal_color("CYAN"),
            background: true,
            ..Default::default()
        };
        assert_eq!(render(bg), "\x1b[46m");

        let bright = TextStyle {
            color: lookup_terminal_color("BRIGHT_GREEN"),
            ..Default::default()
        };
        assert_eq!(render(bright), "\x1b[92m");

        let bright_bg = TextStyle {
            color: lookup_terminal_color("BRIGHT_MAGENTA"),
            background: true,
            ..Default::default()
        };
        assert_eq!(render(bright_bg), "\x1b[105m");
    }

    #[test]
    fn emphasis_codes() {
        for (flag, expected) in [
            (Emphasis::BOLD, "\x1b[1m"),
            (Emphasis::ITALIC, "\x1b[3m"),
            (Emphasis::UNDERLINE, "\x1b[4m"),
            (Emphasis::STRIKETHROUGH, "\x1b[9m"),
        ] {
            let style = TextStyle {
                emphasis: flag,
                ..Default::default()
            };
            assert_eq!(render(style), expected);
        }
    }

    #[test]
    fn empty_style_resets() {
        assert_eq!(render(TextStyle::default()), "\x1b[0m");
    }

    #[test]
    fn unknown_names_fail_lookup() {
        assert_eq!(lookup_named_color("IMAGINARYCOLOR"), None);
        assert_eq!(lookup_terminal_color("MAUVE"), None);
    }
}
