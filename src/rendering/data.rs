use crate::error::RendererError;
use crate::glm;
use crate::utils::constants::{MAX_PALETTE_SIZE, PICO8_PALETTE};
use crate::utils::file::load_rgba_image;
use crate::utils::tools::color_distance_sq;
use itertools::Itertools;
use std::path::Path;

/// efficient 32bit color representation
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq, Hash)]
pub struct Color32([u8; 4]);

impl Color32 {
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::from_rgba(0, 0, 0, 0);
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, RendererError> {
        let digits = hex.trim().trim_start_matches('#');
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(RendererError::InvalidColor(hex.to_string()));
        }
        let channels = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| RendererError::InvalidColor(hex.to_string()))?;
        let alpha = channels.get(3).copied().unwrap_or(255);
        Ok(Self::from_rgba(channels[0], channels[1], channels[2], alpha))
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }

    /// the raw rgba bytes as uploaded to a texel
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0
    }

    /// converts to a float rgba vector
    pub fn to_vec4(&self) -> glm::Vec4 {
        let r = self.r() as f32 / 255.0;
        let g = self.g() as f32 / 255.0;
        let b = self.b() as f32 / 255.0;
        let a = self.a() as f32 / 255.0;

        glm::vec4(r, g, b, a)
    }
}

impl Default for Color32 {
    fn default() -> Self {
        Self::BLACK
    }
}

/// ordered, index-addressed color table
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color32>,
}

impl Palette {
    pub fn new(colors: Vec<Color32>) -> Self {
        Self { colors }
    }

    /// the classic 16 color fantasy console palette
    pub fn pico8() -> Self {
        Self::new(PICO8_PALETTE.to_vec())
    }

    /// builds a palette from hex color literals
    pub fn from_hex(literals: &[&str]) -> Result<Self, RendererError> {
        let colors = literals
            .iter()
            .map(|hex| Color32::from_hex(hex))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(colors))
    }

    /// builds an opaque palette from packed `r, g, b` triples
    pub fn from_rgb_bytes(bytes: &[u8]) -> Result<Self, RendererError> {
        if bytes.len() % 3 != 0 {
            return Err(RendererError::InvalidColor(format!(
                "{} bytes are not a sequence of rgb triples",
                bytes.len()
            )));
        }
        let colors = bytes
            .iter()
            .copied()
            .tuples()
            .map(|(r, g, b)| Color32::from_rgb(r, g, b))
            .collect();
        Ok(Self::new(colors))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<Color32> {
        self.colors.get(slot).copied()
    }

    /// overwrites one slot
    pub fn set(&mut self, slot: usize, color: Color32) -> Result<(), RendererError> {
        let size = self.len();
        let entry = self
            .colors
            .get_mut(slot)
            .ok_or(RendererError::InvalidPaletteSlot { slot, size })?;
        *entry = color;
        Ok(())
    }

    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    /// the color a stored pixel index resolves to (indices past the end clamp to the last slot like the texture sampler)
    pub fn resolve(&self, index: u8) -> Color32 {
        let slot = (index as usize).min(self.len().saturating_sub(1));
        self.get(slot).unwrap_or(Color32::TRANSPARENT)
    }

    /// finds the slot holding the color closest to `color` among the byte-addressable slots
    pub fn nearest_slot(&self, color: Color32) -> Option<u8> {
        self.colors
            .iter()
            .take(MAX_PALETTE_SIZE)
            .position_min_by_key(|entry| color_distance_sq(**entry, color))
            .and_then(|slot| u8::try_from(slot).ok())
    }

    /// packs the colors into rgba texel data
    pub fn to_texels(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.to_bytes()).collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::pico8()
    }
}

/// indexed-pixel image partitioned into square cells
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    cell_size: u32,
}

impl SpriteSheet {
    /// wraps raw palette indices (one byte per pixel, row-major)
    pub fn new(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        cell_size: u32,
    ) -> Result<Self, RendererError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RendererError::SheetSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        if cell_size == 0 || cell_size > width || cell_size > height {
            return Err(RendererError::InvalidCellSize {
                cell_size,
                width,
                height,
            });
        }
        if width % cell_size != 0 || height % cell_size != 0 {
            log::warn!(
                "sprite sheet {width}x{height} is not a multiple of the cell size {cell_size}, trailing pixels are unreachable"
            );
        }
        Ok(Self {
            pixels,
            width,
            height,
            cell_size,
        })
    }

    /// decodes an image and maps every pixel to its nearest palette slot
    pub fn from_image_bytes(
        bytes: &[u8],
        palette: &Palette,
        cell_size: u32,
    ) -> Result<Self, RendererError> {
        let image = stb_image::image::load_from_memory_with_depth(bytes, 4, false);
        let (rgba, width, height) = load_rgba_image(image)?;
        Self::quantize(&rgba, width, height, palette, cell_size)
    }

    /// loads an image file and maps every pixel to its nearest palette slot
    pub fn from_image_file(
        path: impl AsRef<Path>,
        palette: &Palette,
        cell_size: u32,
    ) -> Result<Self, RendererError> {
        let image = stb_image::image::load_with_depth(path, 4, false);
        let (rgba, width, height) = load_rgba_image(image)?;
        Self::quantize(&rgba, width, height, palette, cell_size)
    }

    fn quantize(
        rgba: &[u8],
        width: u32,
        height: u32,
        palette: &Palette,
        cell_size: u32,
    ) -> Result<Self, RendererError> {
        if palette.is_empty() {
            return Err(RendererError::InvalidPaletteSize(0));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| {
                let color = Color32::from_rgba(px[0], px[1], px[2], px[3]);
                palette.nearest_slot(color).unwrap_or(0)
            })
            .collect();
        Self::new(pixels, width, height, cell_size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn grid_cols(&self) -> u32 {
        self.width / self.cell_size
    }

    pub fn grid_rows(&self) -> u32 {
        self.height / self.cell_size
    }

    /// number of addressable cells
    pub fn cell_count(&self) -> u32 {
        self.grid_cols() * self.grid_rows()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// palette index at pixel `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// counts pixels that index past the end of a palette of `palette_size` colors
    pub fn out_of_range_pixels(&self, palette_size: usize) -> usize {
        self.pixels
            .iter()
            .filter(|&&p| p as usize >= palette_size)
            .count()
    }

    /// resolves every pixel through the palette into rgba bytes (for previews)
    pub fn expand(&self, palette: &Palette) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&index| palette.resolve(index).to_bytes())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(
            Color32::from_hex("#1D2B53").unwrap(),
            Color32::from_rgb(0x1d, 0x2b, 0x53)
        );
        assert_eq!(
            Color32::from_hex("ff004d80").unwrap(),
            Color32::from_rgba(0xff, 0x00, 0x4d, 0x80)
        );
        assert!(matches!(
            Color32::from_hex("#12345"),
            Err(RendererError::InvalidColor(_))
        ));
        assert!(Color32::from_hex("#zz0000").is_err());
    }

    #[test]
    fn palette_from_rgb_bytes() {
        let palette = Palette::from_rgb_bytes(&[0, 0, 0, 255, 241, 232]).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(1), Some(Color32::from_rgb(255, 241, 232)));
        assert!(Palette::from_rgb_bytes(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn palette_set_and_resolve() {
        let mut palette = Palette::pico8();
        assert_eq!(palette.len(), 16);
        palette.set(3, Color32::RED).unwrap();
        assert_eq!(palette.resolve(3), Color32::RED);
        assert_eq!(palette.resolve(200), palette.get(15).unwrap());
        assert_eq!(
            palette.set(16, Color32::RED),
            Err(RendererError::InvalidPaletteSlot { slot: 16, size: 16 })
        );
        assert_eq!(palette.to_texels().len(), 64);
    }

    #[test]
    fn nearest_slot_picks_closest_color() {
        let palette = Palette::new(vec![Color32::BLACK, Color32::WHITE, Color32::RED]);
        assert_eq!(palette.nearest_slot(Color32::from_rgb(250, 10, 5)), Some(2));
        assert_eq!(palette.nearest_slot(Color32::from_rgb(20, 20, 20)), Some(0));
    }

    #[test]
    fn nearest_slot_ignores_unaddressable_slots() {
        let mut colors = vec![Color32::BLACK; 300];
        colors[10] = Color32::from_rgb(200, 0, 0);
        colors[280] = Color32::RED;
        let palette = Palette::new(colors);
        assert_eq!(palette.nearest_slot(Color32::RED), Some(10));
        assert_eq!(Palette::new(Vec::new()).nearest_slot(Color32::RED), None);
    }

    #[test]
    fn sheet_validation() {
        let sheet = SpriteSheet::new(vec![0; 128 * 128], 128, 128, 8).unwrap();
        assert_eq!(sheet.grid_cols(), 16);
        assert_eq!(sheet.grid_rows(), 16);
        assert_eq!(sheet.cell_count(), 256);
        assert_eq!(
            SpriteSheet::new(vec![0; 10], 4, 4, 2),
            Err(RendererError::SheetSizeMismatch {
                expected: 16,
                actual: 10
            })
        );
        assert!(matches!(
            SpriteSheet::new(vec![0; 16], 4, 4, 0),
            Err(RendererError::InvalidCellSize { .. })
        ));
        assert!(matches!(
            SpriteSheet::new(vec![0; 16], 4, 4, 8),
            Err(RendererError::InvalidCellSize { .. })
        ));
    }

    #[test]
    fn sheet_expand_and_range_check() {
        let palette = Palette::new(vec![Color32::BLACK, Color32::WHITE]);
        let sheet = SpriteSheet::new(vec![0, 1, 1, 7], 2, 2, 1).unwrap();
        assert_eq!(sheet.pixel(1, 1), Some(7));
        assert_eq!(sheet.pixel(2, 0), None);
        assert_eq!(sheet.out_of_range_pixels(2), 1);
        let rgba = sheet.expand(&palette);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
    }
}
