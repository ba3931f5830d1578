// src/color/palette.rs
use super::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub color: Color,
}

/// The closed palette offered for background and object colors. Declaration
/// order is the tie-break order for [`nearest`].
pub static PALETTE: [PaletteColor; 9] = [
    PaletteColor {
        name: "White",
        color: Color::from_rgb(0xFF, 0xFF, 0xFF),
    },
    PaletteColor {
        name: "Black",
        color: Color::from_rgb(0x00, 0x00, 0x00),
    },
    PaletteColor {
        name: "Red",
        color: Color::from_rgb(0xFF, 0x00, 0x00),
    },
    PaletteColor {
        name: "Orange",
        color: Color::from_rgb(0xFF, 0x95, 0x00),
    },
    PaletteColor {
        name: "Yellow",
        color: Color::from_rgb(0xFF, 0xCC, 0x00),
    },
    PaletteColor {
        name: "Green",
        color: Color::from_rgb(0x34, 0xC7, 0x59),
    },
    PaletteColor {
        name: "Blue",
        color: Color::from_rgb(0x00, 0x7A, 0xFF),
    },
    PaletteColor {
        name: "Purple",
        color: Color::from_rgb(0x9D, 0x00, 0xFF),
    },
    PaletteColor {
        name: "Pink",
        color: Color::from_rgb(0xFF, 0x14, 0x93),
    },
];

/// Plain Euclidean distance over the three 8-bit channels.
pub fn distance(a: Color, b: Color) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

pub fn nearest(color: Color) -> (&'static PaletteColor, f64) {
    nearest_in(&PALETTE, color)
}

/// Panics on an empty slice; [`PALETTE`] is non-empty by construction.
fn nearest_in(palette: &[PaletteColor], color: Color) -> (&PaletteColor, f64) {
    let mut best = &palette[0];
    let mut best_distance = distance(color, best.color);
    for entry in &palette[1..] {
        let d = distance(color, entry.color);
        // strict comparison keeps the earliest entry on ties
        if d < best_distance {
            best = entry;
            best_distance = d;
        }
    }
    (best, best_distance)
}

pub fn lookup(color: Color) -> Option<&'static PaletteColor> {
    PALETTE.iter().find(|entry| entry.color == color)
}
