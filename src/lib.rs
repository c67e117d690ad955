pub mod engine;
pub mod engine_builder;
pub mod error;
pub mod rendering;
pub mod systems;
pub mod utils;

pub use env_logger;
pub use itertools;
pub use log;
pub use nalgebra_glm as glm;
pub use stb_image;
pub use winit;

/// All features that are very common to use.
pub mod prelude {
    pub use crate::engine::{Host, SpriteApp};
    pub use crate::engine_builder::{HostAttributes, RendererAttributes};
    pub use crate::error::RendererError;
    pub use crate::glm;
    pub use crate::log;
    pub use crate::rendering::context::{BlendMode, GlContext, GraphicsContext};
    pub use crate::rendering::data::{Color32, Palette, SpriteSheet};
    pub use crate::rendering::sprite_batch::{SpriteRequest, UvRect};
    pub use crate::rendering::sprite_renderer::{FramePhase, Renderer, RendererState};
    pub use crate::utils::constants::*;
}
