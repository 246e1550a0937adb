use bevy::prelude::*;

pub const BOARD: Color = Color::srgb(0.86, 0.92, 1.0);
pub const SLOT: Color = Color::srgb(0.94, 0.96, 1.0);
pub const INK: Color = Color::srgb(0.12, 0.16, 0.22);
pub const MUTED: Color = Color::srgb(0.42, 0.45, 0.5);
pub const SCORE_POPUP: Color = Color::srgb(0.15, 0.39, 0.92);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileColors {
    pub background: Color,
    pub text: Color,
}

/// Tile colours warm up from rose to green as the value doubles. Anything
/// past 2048 falls back to blue.
pub fn tile_colors(value: u32) -> TileColors {
    let (background, text) = match value {
        2 => ((255, 241, 242), (225, 29, 72)),
        4 => ((255, 228, 230), (225, 29, 72)),
        8 => ((255, 247, 237), (234, 88, 12)),
        16 => ((255, 237, 213), (234, 88, 12)),
        32 => ((255, 251, 235), (217, 119, 6)),
        64 => ((254, 243, 199), (217, 119, 6)),
        128 => ((254, 252, 232), (202, 138, 4)),
        256 => ((254, 249, 195), (202, 138, 4)),
        512 => ((247, 254, 231), (101, 163, 13)),
        1024 => ((236, 252, 203), (101, 163, 13)),
        2048 => ((240, 253, 244), (22, 163, 74)),
        _ => ((239, 246, 255), (96, 165, 250)),
    };
    TileColors {
        background: Color::srgb_u8(background.0, background.1, background.2),
        text: Color::srgb_u8(text.0, text.1, text.2),
    }
}

/// Shrinks the label so five and six digit values still fit a cell.
pub fn tile_font_size(value: u32, cell_size: f32) -> f32 {
    let scale = match value {
        0..=99 => 0.5,
        100..=999 => 0.42,
        1000..=9999 => 0.34,
        _ => 0.27,
    };
    cell_size * scale
}
