use crate::rendering::data::Color32;

pub(crate) const WIN_TITLE: &str = "Palette Sprites";

pub const DEFAULT_CELL_SIZE: u32 = 8;
pub const DEFAULT_PALETTE_SIZE: usize = 16;
/// one byte per sheet pixel addresses at most this many slots
pub const MAX_PALETTE_SIZE: usize = 256;
pub const DEFAULT_SCREEN_WIDTH: u32 = 128;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 128;
/// integer upscaling factor from screen pixels to window pixels
pub const DEFAULT_PIXEL_SCALE: u32 = 4;
/// frame ticks per second driven by the host
pub const DEFAULT_TICK_RATE: f64 = 60.0;

/// two triangles without an index buffer
pub const VERTICES_PER_QUAD: usize = 6;
/// float components per vertex for position, uv and flip attributes
pub(crate) const COMPONENTS_PER_VERTEX: usize = 2;

pub(crate) const ATLAS_TEXTURE_UNIT: u32 = 0;
pub(crate) const PALETTE_TEXTURE_UNIT: u32 = 1;

// shader interface names
pub const POSITION_ATTRIB: &str = "a_position";
pub const UV_ATTRIB: &str = "a_uv";
pub const FLIP_ATTRIB: &str = "a_flip";
pub const ATLAS_UNIFORM: &str = "u_atlas";
pub const PALETTE_UNIFORM: &str = "u_palette";
pub const RESOLUTION_UNIFORM: &str = "u_resolution";
pub const PALETTE_SIZE_UNIFORM: &str = "u_palette_size";

/// the classic 16 color fantasy console palette
pub const PICO8_PALETTE: [Color32; 16] = [
    Color32::from_rgb(0x00, 0x00, 0x00), // black
    Color32::from_rgb(0x1d, 0x2b, 0x53), // dark blue
    Color32::from_rgb(0x7e, 0x25, 0x53), // dark purple
    Color32::from_rgb(0x00, 0x87, 0x51), // dark green
    Color32::from_rgb(0xab, 0x52, 0x36), // brown
    Color32::from_rgb(0x5f, 0x57, 0x4f), // dark grey
    Color32::from_rgb(0xc2, 0xc3, 0xc7), // light grey
    Color32::from_rgb(0xff, 0xf1, 0xe8), // white
    Color32::from_rgb(0xff, 0x00, 0x4d), // red
    Color32::from_rgb(0xff, 0xa3, 0x00), // orange
    Color32::from_rgb(0xff, 0xec, 0x27), // yellow
    Color32::from_rgb(0x00, 0xe4, 0x36), // green
    Color32::from_rgb(0x29, 0xad, 0xff), // blue
    Color32::from_rgb(0x83, 0x76, 0x9c), // lavender
    Color32::from_rgb(0xff, 0x77, 0xa8), // pink
    Color32::from_rgb(0xff, 0xcc, 0xaa), // peach
];
