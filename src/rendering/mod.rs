pub mod context;
pub mod data;
pub mod shader;
pub mod sprite_batch;
pub mod sprite_renderer;
pub mod texture;
