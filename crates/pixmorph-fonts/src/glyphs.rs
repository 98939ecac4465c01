//! 5x7 block glyphs.
//!
//! Every glyph is 7 rows of 5 cells; `█` is ink, anything else is blank.

/// Glyph height in cells.
pub const GLYPH_HEIGHT: usize = 7;

/// Glyph width in cells.
pub const GLYPH_WIDTH: usize = 5;

pub type Glyph = [&'static str; GLYPH_HEIGHT];

/// Drawn for characters the font does not cover.
pub const UNKNOWN: Glyph = [
    " ███ ",
    "█   █",
    "    █",
    "   █ ",
    "  █  ",
    "     ",
    "  █  ",
];

pub const SPACE: Glyph = [
    "     ", "     ", "     ", "     ", "     ", "     ", "     ",
];

/// Digits 0-9.
pub const DIGITS: [Glyph; 10] = [
    // 0
    [
        " ███ ",
        "█   █",
        "█  ██",
        "█ █ █",
        "██  █",
        "█   █",
        " ███ ",
    ],
    // 1
    [
        "  █  ",
        " ██  ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
        " ███ ",
    ],
    // 2
    [
        " ███ ",
        "█   █",
        "    █",
        "   █ ",
        "  █  ",
        " █   ",
        "█████",
    ],
    // 3
    [
        "█████",
        "   █ ",
        "  █  ",
        "   █ ",
        "    █",
        "█   █",
        " ███ ",
    ],
    // 4
    [
        "   █ ",
        "  ██ ",
        " █ █ ",
        "█  █ ",
        "█████",
        "   █ ",
        "   █ ",
    ],
    // 5
    [
        "█████",
        "█    ",
        "████ ",
        "    █",
        "    █",
        "█   █",
        " ███ ",
    ],
    // 6
    [
        "  ██ ",
        " █   ",
        "█    ",
        "████ ",
        "█   █",
        "█   █",
        " ███ ",
    ],
    // 7
    [
        "█████",
        "    █",
        "   █ ",
        "  █  ",
        " █   ",
        " █   ",
        " █   ",
    ],
    // 8
    [
        " ███ ",
        "█   █",
        "█   █",
        " ███ ",
        "█   █",
        "█   █",
        " ███ ",
    ],
    // 9
    [
        " ███ ",
        "█   █",
        "█   █",
        " ████",
        "    █",
        "   █ ",
        " ██  ",
    ],
];

/// Letters A-Z.
pub const LETTERS: [Glyph; 26] = [
    // A
    [
        " ███ ",
        "█   █",
        "█   █",
        "█████",
        "█   █",
        "█   █",
        "█   █",
    ],
    // B
    [
        "████ ",
        "█   █",
        "█   █",
        "████ ",
        "█   █",
        "█   █",
        "████ ",
    ],
    // C
    [
        " ███ ",
        "█   █",
        "█    ",
        "█    ",
        "█    ",
        "█   █",
        " ███ ",
    ],
    // D
    [
        "███  ",
        "█  █ ",
        "█   █",
        "█   █",
        "█   █",
        "█  █ ",
        "███  ",
    ],
    // E
    [
        "█████",
        "█    ",
        "█    ",
        "████ ",
        "█    ",
        "█    ",
        "█████",
    ],
    // F
    [
        "█████",
        "█    ",
        "█    ",
        "████ ",
        "█    ",
        "█    ",
        "█    ",
    ],
    // G
    [
        " ███ ",
        "█   █",
        "█    ",
        "█ ███",
        "█   █",
        "█   █",
        " ████",
    ],
    // H
    [
        "█   █",
        "█   █",
        "█   █",
        "█████",
        "█   █",
        "█   █",
        "█   █",
    ],
    // I
    [
        " ███ ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
        " ███ ",
    ],
    // J
    [
        "  ███",
        "   █ ",
        "   █ ",
        "   █ ",
        "   █ ",
        "█  █ ",
        " ██  ",
    ],
    // K
    [
        "█   █",
        "█  █ ",
        "█ █  ",
        "██   ",
        "█ █  ",
        "█  █ ",
        "█   █",
    ],
    // L
    [
        "█    ",
        "█    ",
        "█    ",
        "█    ",
        "█    ",
        "█    ",
        "█████",
    ],
    // M
    [
        "█   █",
        "██ ██",
        "█ █ █",
        "█ █ █",
        "█   █",
        "█   █",
        "█   █",
    ],
    // N
    [
        "█   █",
        "█   █",
        "██  █",
        "█ █ █",
        "█  ██",
        "█   █",
        "█   █",
    ],
    // O
    [
        " ███ ",
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        " ███ ",
    ],
    // P
    [
        "████ ",
        "█   █",
        "█   █",
        "████ ",
        "█    ",
        "█    ",
        "█    ",
    ],
    // Q
    [
        " ███ ",
        "█   █",
        "█   █",
        "█   █",
        "█ █ █",
        "█  █ ",
        " ██ █",
    ],
    // R
    [
        "████ ",
        "█   █",
        "█   █",
        "████ ",
        "█ █  ",
        "█  █ ",
        "█   █",
    ],
    // S
    [
        " ████",
        "█    ",
        "█    ",
        " ███ ",
        "    █",
        "    █",
        "████ ",
    ],
    // T
    [
        "█████",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
    ],
    // U
    [
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        " ███ ",
    ],
    // V
    [
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        "█   █",
        " █ █ ",
        "  █  ",
    ],
    // W
    [
        "█   █",
        "█   █",
        "█   █",
        "█ █ █",
        "█ █ █",
        "█ █ █",
        " █ █ ",
    ],
    // X
    [
        "█   █",
        "█   █",
        " █ █ ",
        "  █  ",
        " █ █ ",
        "█   █",
        "█   █",
    ],
    // Y
    [
        "█   █",
        "█   █",
        " █ █ ",
        "  █  ",
        "  █  ",
        "  █  ",
        "  █  ",
    ],
    // Z
    [
        "█████",
        "    █",
        "   █ ",
        "  █  ",
        " █   ",
        "█    ",
        "█████",
    ],
];

/// Look up the glyph for a character. Lowercase letters share the uppercase
/// shapes.
pub fn glyph(ch: char) -> &'static Glyph {
    match ch.to_ascii_uppercase() {
        c @ 'A'..='Z' => &LETTERS[(c as u8 - b'A') as usize],
        c @ '0'..='9' => &DIGITS[(c as u8 - b'0') as usize],
        ' ' => &SPACE,
        '.' => &[
            "     ", "     ", "     ", "     ", "     ", " ██  ", " ██  ",
        ],
        ',' => &[
            "     ", "     ", "     ", "     ", " ██  ", "  █  ", " █   ",
        ],
        ':' => &[
            "     ", " ██  ", " ██  ", "     ", " ██  ", " ██  ", "     ",
        ],
        '!' => &[
            "  █  ", "  █  ", "  █  ", "  █  ", "  █  ", "     ", "  █  ",
        ],
        '-' => &[
            "     ", "     ", "     ", "█████", "     ", "     ", "     ",
        ],
        '\'' => &[
            "  █  ", "  █  ", " █   ", "     ", "     ", "     ", "     ",
        ],
        '/' => &[
            "    █", "    █", "   █ ", "  █  ", " █   ", "█    ", "█    ",
        ],
        '+' => &[
            "     ", "  █  ", "  █  ", "█████", "  █  ", "  █  ", "     ",
        ],
        '#' => &[
            " █ █ ", " █ █ ", "█████", " █ █ ", "█████", " █ █ ", " █ █ ",
        ],
        '<' => &[
            "   █ ", "  █  ", " █   ", "█    ", " █   ", "  █  ", "   █ ",
        ],
        '>' => &[
            " █   ", "  █  ", "   █ ", "    █", "   █ ", "  █  ", " █   ",
        ],
        _ => &UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_glyphs() -> impl Iterator<Item = &'static Glyph> {
        let chars = ('A'..='Z').chain('0'..='9').chain(" .,:!-'/+#<>?".chars());
        chars.map(glyph)
    }

    #[test]
    fn glyphs_are_five_cells_wide() {
        for g in all_glyphs() {
            for row in g {
                assert_eq!(row.chars().count(), GLYPH_WIDTH, "{g:?}");
            }
        }
    }

    #[test]
    fn lowercase_shares_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('z'), glyph('Z'));
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(glyph('~'), &UNKNOWN);
        assert_eq!(glyph('é'), &UNKNOWN);
    }
}
