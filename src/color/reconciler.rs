// src/color/reconciler.rs
//
// Colors coming out of image analysis are snapped onto the palette when they
// sit within `SNAP_THRESHOLD`; anything farther away is kept as a custom color.
// Manually picked colors never pass through here: an explicit user choice is
// authoritative and is stored exactly as picked.
use super::Color;
use super::palette;
use indexmap::IndexSet;

/// Maximum channel distance (out of ~441.7) at which an analysed color is
/// snapped to its nearest palette entry.
pub const SNAP_THRESHOLD: f64 = 60.0;

pub fn reconcile_one(raw: Color, threshold: f64) -> Color {
    let (entry, d) = palette::nearest(raw);
    if d <= threshold { entry.color } else { raw }
}

/// Reconciles each color, then drops duplicates keeping first-seen order.
pub fn reconcile_many(raws: &[Color], threshold: f64) -> Vec<Color> {
    raws.iter()
        .map(|raw| reconcile_one(*raw, threshold))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Outbound representation: palette entries become their lowercase name,
/// custom colors stay as their `#RRGGBB` code. Applied the same way to
/// manual and analysed colors.
pub fn format_for_request<'a, I>(colors: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Color>,
{
    colors
        .into_iter()
        .map(|color| match color.palette_entry() {
            Some(entry) => entry.name.to_lowercase(),
            None => color.hex(),
        })
        .collect()
}
