use crate::engine::Host;
use crate::error::RendererError;
use crate::rendering::context::{BlendMode, GraphicsContext};
use crate::rendering::data::{Color32, Palette, SpriteSheet};
use crate::rendering::sprite_renderer::Renderer;
use crate::utils::constants::*;
use winit::dpi::LogicalSize;
use winit::window::WindowAttributes;

/// configuration for a sprite renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RendererAttributes {
    /// cell size used by `build_renderer`; a prebuilt `SpriteSheet` keeps its own
    pub cell_size: u32,
    pub palette_size: usize,
    pub screen_width: u32,
    pub screen_height: u32,
    /// flush automatically once this many sprites are queued (unbounded if `None`)
    pub max_batch_sprites: Option<usize>,
    pub blend: BlendMode,
    pub vertex_source: Option<String>,
    pub fragment_source: Option<String>,
}

impl RendererAttributes {
    /// creates the default attributes (8px cells, 16 colors, 128x128 screen)
    pub fn new() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            palette_size: DEFAULT_PALETTE_SIZE,
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            max_batch_sprites: None,
            blend: BlendMode::Alpha,
            vertex_source: None,
            fragment_source: None,
        }
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// the pixel resolution sprite positions are given in
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_max_batch_sprites(mut self, max: Option<usize>) -> Self {
        self.max_batch_sprites = max;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// replaces the built-in two-stage lookup shaders
    pub fn with_shader_sources(mut self, vertex: &str, fragment: &str) -> Self {
        self.vertex_source = Some(vertex.to_string());
        self.fragment_source = Some(fragment.to_string());
        self
    }

    /// builds a renderer from raw palette indices laid out row-major
    pub fn build_renderer<C: GraphicsContext>(
        &self,
        context: C,
        sheet_bytes: Vec<u8>,
        sheet_width: u32,
        sheet_height: u32,
        palette: &Palette,
    ) -> Result<Renderer<C>, RendererError> {
        let sheet = SpriteSheet::new(sheet_bytes, sheet_width, sheet_height, self.cell_size)?;
        Renderer::init(context, &sheet, palette, self)
    }
}

impl Default for RendererAttributes {
    fn default() -> Self {
        Self::new()
    }
}

/// configuration for the window host driving a sprite app
#[derive(Debug, Clone, PartialEq)]
pub struct HostAttributes {
    pub title: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub pixel_scale: u32,
    /// ticks per second
    pub tick_rate: f64,
    pub use_vsync: bool,
    pub resizable: bool,
    pub clear_color: Color32,
}

impl HostAttributes {
    /// creates the default attributes (128x128 screen at 4x scale, 60 ticks per second)
    pub fn new() -> Self {
        Self {
            title: WIN_TITLE.to_string(),
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            pixel_scale: DEFAULT_PIXEL_SCALE,
            tick_rate: DEFAULT_TICK_RATE,
            use_vsync: true,
            resizable: true,
            clear_color: Color32::BLACK,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// the logical pixel resolution of the sprite screen
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_pixel_scale(mut self, scale: u32) -> Self {
        self.pixel_scale = scale.max(1);
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_vsync(mut self, flag: bool) -> Self {
        self.use_vsync = flag;
        self
    }

    pub fn with_resizable(mut self, flag: bool) -> Self {
        self.resizable = flag;
        self
    }

    pub fn with_clear_color(mut self, color: Color32) -> Self {
        self.clear_color = color;
        self
    }

    /// renderer attributes matching this host's screen
    pub fn renderer_attributes(&self) -> RendererAttributes {
        RendererAttributes::new().with_screen_size(self.screen_width, self.screen_height)
    }

    /// generates the winit window attributes
    pub(crate) fn generate_win_attrs(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(
                self.screen_width * self.pixel_scale,
                self.screen_height * self.pixel_scale,
            ))
            .with_resizable(self.resizable)
    }

    /// builds the host
    pub fn build_host(self) -> Host {
        Host::new(self)
    }
}

impl Default for HostAttributes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_defaults() {
        let attributes = RendererAttributes::default();
        assert_eq!(attributes.cell_size, 8);
        assert_eq!(attributes.palette_size, 16);
        assert_eq!((attributes.screen_width, attributes.screen_height), (128, 128));
        assert_eq!(attributes.max_batch_sprites, None);
        assert_eq!(attributes.blend, BlendMode::Alpha);
    }

    #[test]
    fn host_attributes_feed_renderer_resolution() {
        let host = HostAttributes::new()
            .with_screen_size(320, 180)
            .with_pixel_scale(0);
        assert_eq!(host.pixel_scale, 1);
        let attributes = host.renderer_attributes();
        assert_eq!((attributes.screen_width, attributes.screen_height), (320, 180));
    }
}
