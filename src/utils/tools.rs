use crate::glm;
use crate::rendering::data::Color32;

/// Horizontal palette texture coordinate of the texel center for `index` (mirrors the fragment shader).
pub fn palette_texel_u(index: usize, palette_size: usize) -> f32 {
    (index as f32 + 0.5) / palette_size as f32
}

/// Recovers the stored byte from a normalized single channel sample (mirrors the fragment shader).
pub fn sample_to_index(sample: f32) -> u8 {
    (sample * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Maps a pixel-space position to clip space, flipping the y axis (mirrors the vertex shader).
pub fn clip_space(position: &glm::Vec2, resolution: &glm::Vec2) -> glm::Vec2 {
    let normalized = position.component_div(resolution) * 2.0 - glm::vec2(1.0, 1.0);
    glm::vec2(normalized.x, -normalized.y)
}

/// Squared euclidean distance between two colors in rgba space.
pub(crate) fn color_distance_sq(a: Color32, b: Color32) -> u32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(a.r(), b.r()) + d(a.g(), b.g()) + d(a.b(), b.b()) + d(a.a(), b.a())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_lookup_hits_texel_centers() {
        assert_eq!(palette_texel_u(0, 16), 0.03125);
        assert_eq!(palette_texel_u(15, 16), 0.96875);
        for index in 0..16 {
            let texel = (palette_texel_u(index, 16) * 16.0).floor() as usize;
            assert_eq!(texel, index);
        }
    }

    #[test]
    fn samples_round_to_stored_bytes() {
        for byte in 0..=255u8 {
            assert_eq!(sample_to_index(byte as f32 / 255.0), byte);
        }
        assert_eq!(sample_to_index(4.4 / 255.0), 4);
        assert_eq!(sample_to_index(4.6 / 255.0), 5);
    }

    #[test]
    fn clip_space_flips_y() {
        let resolution = glm::vec2(128.0, 128.0);
        assert_eq!(clip_space(&glm::vec2(0.0, 0.0), &resolution), glm::vec2(-1.0, 1.0));
        assert_eq!(clip_space(&glm::vec2(128.0, 128.0), &resolution), glm::vec2(1.0, -1.0));
        assert_eq!(clip_space(&glm::vec2(64.0, 32.0), &resolution), glm::vec2(0.0, 0.5));
    }
}
