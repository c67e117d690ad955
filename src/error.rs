use crate::rendering::context::ShaderStage;
use thiserror::Error;

/// all failure modes of the renderer and its resources
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RendererError {
    #[error("failed to create texture: {0}")]
    TextureCreation(String),
    #[error("failed to create vertex buffer")]
    BufferCreation,
    #[error("failed to create {0} shader object")]
    ShaderCreation(ShaderStage),
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("program linking failed: {0}")]
    ProgramLink(String),
    #[error("shader program has no active attribute `{0}`")]
    MissingAttribute(&'static str),
    #[error("shader program has no active uniform `{0}`")]
    MissingUniform(&'static str),
    #[error("palette has {actual} colors, expected exactly {expected}")]
    PaletteSizeMismatch { expected: usize, actual: usize },
    #[error("palette size {0} is outside 1..=256 (sprite sheets store one byte per pixel)")]
    InvalidPaletteSize(usize),
    #[error("palette slot {slot} out of range for a palette of size {size}")]
    InvalidPaletteSlot { slot: usize, size: usize },
    #[error("sprite sheet holds {actual} bytes, expected {expected}")]
    SheetSizeMismatch { expected: usize, actual: usize },
    #[error("cell size {cell_size} does not fit a {width}x{height} sprite sheet")]
    InvalidCellSize {
        cell_size: u32,
        width: u32,
        height: u32,
    },
    #[error("invalid color literal: {0}")]
    InvalidColor(String),
    #[error("could not load image: {0}")]
    ImageLoad(String),
    #[error("renderer has already been disposed")]
    Disposed,
}
