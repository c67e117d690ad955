use crate::engine_builder::RendererAttributes;
use crate::error::RendererError;
use crate::glm;
use crate::rendering::context::{BlendMode, BufferId, GraphicsContext};
use crate::rendering::data::{Color32, Palette, SpriteSheet};
use crate::rendering::shader::ShaderProgram;
use crate::rendering::sprite_batch::{SpriteBatcher, SpriteRequest};
use crate::rendering::texture::{PaletteTexture, TextureAtlas};
use crate::utils::constants::*;
use crate::utils::file::{SPRITE_FRAG, SPRITE_VERT};

/// where an active renderer is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Accumulating,
    Flushed,
}

/// lifecycle of a renderer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    ContextBound,
    ProgramReady,
    ResourcesLoaded,
    Active(FramePhase),
    Disposed,
}

/// everything the renderer owns on the gpu
struct GpuResources {
    program: ShaderProgram,
    atlas: TextureAtlas,
    palette: PaletteTexture,
    position_buffer: BufferId,
    uv_buffer: BufferId,
    flip_buffer: Option<BufferId>,
}

impl GpuResources {
    fn release(self, ctx: &mut impl GraphicsContext) {
        ctx.delete_buffer(self.position_buffer);
        ctx.delete_buffer(self.uv_buffer);
        if let Some(flip_buffer) = self.flip_buffer {
            ctx.delete_buffer(flip_buffer);
        }
        self.palette.release(ctx);
        self.atlas.release(ctx);
        self.program.release(ctx);
    }
}

/// indexed-palette sprite renderer drawing each frame's sprites with a single draw call
pub struct Renderer<C: GraphicsContext> {
    context: C,
    resources: Option<GpuResources>,
    batcher: SpriteBatcher,
    state: RendererState,
    resolution: glm::Vec2,
    max_batch_sprites: Option<usize>,
    blend: BlendMode,
    draw_calls: usize,
}

impl<C: GraphicsContext> Renderer<C> {
    /// uploads the sheet and palette and compiles the sprite program
    pub fn init(
        context: C,
        sheet: &SpriteSheet,
        palette: &Palette,
        attributes: &RendererAttributes,
    ) -> Result<Self, RendererError> {
        let mut renderer = Self {
            context,
            resources: None,
            batcher: SpriteBatcher::new(sheet, false),
            state: RendererState::Uninitialized,
            resolution: glm::vec2(
                attributes.screen_width as f32,
                attributes.screen_height as f32,
            ),
            max_batch_sprites: attributes.max_batch_sprites,
            blend: attributes.blend,
            draw_calls: 0,
        };
        renderer.transition(RendererState::ContextBound);

        if attributes.palette_size == 0 || attributes.palette_size > MAX_PALETTE_SIZE {
            return Err(RendererError::InvalidPaletteSize(attributes.palette_size));
        }
        if palette.len() != attributes.palette_size {
            return Err(RendererError::PaletteSizeMismatch {
                expected: attributes.palette_size,
                actual: palette.len(),
            });
        }
        if attributes.cell_size != sheet.cell_size() {
            log::warn!(
                "renderer configured for {}px cells but the sheet uses {}px cells, using the sheet's",
                attributes.cell_size,
                sheet.cell_size()
            );
        }
        let out_of_range = sheet.out_of_range_pixels(attributes.palette_size);
        if out_of_range > 0 {
            log::warn!(
                "{out_of_range} sprite sheet pixels index past the {} color palette",
                attributes.palette_size
            );
        }

        let ctx = &mut renderer.context;
        let program = ShaderProgram::sprite(
            ctx,
            attributes.vertex_source.as_deref().unwrap_or(SPRITE_VERT),
            attributes.fragment_source.as_deref().unwrap_or(SPRITE_FRAG),
        )?;
        renderer.transition(RendererState::ProgramReady);

        let resources = Self::load_resources(
            &mut renderer.context,
            program,
            sheet,
            palette,
            attributes.palette_size,
        )?;
        renderer.batcher = SpriteBatcher::new(sheet, resources.flip_buffer.is_some());
        renderer.resources = Some(resources);
        renderer.transition(RendererState::ResourcesLoaded);

        renderer.bind_static_uniforms();
        renderer.transition(RendererState::Active(FramePhase::Accumulating));
        log::info!(
            "sprite renderer ready: {}x{} sheet, {} cells, {} colors",
            sheet.width(),
            sheet.height(),
            sheet.cell_count(),
            attributes.palette_size
        );
        Ok(renderer)
    }

    /// uploads textures and creates buffers, releasing whatever was created on failure
    fn load_resources(
        ctx: &mut C,
        program: ShaderProgram,
        sheet: &SpriteSheet,
        palette: &Palette,
        palette_size: usize,
    ) -> Result<GpuResources, RendererError> {
        let atlas = match TextureAtlas::upload(ctx, sheet) {
            Ok(atlas) => atlas,
            Err(e) => {
                program.release(ctx);
                return Err(e);
            }
        };
        let palette = match PaletteTexture::upload(ctx, palette, palette_size) {
            Ok(palette) => palette,
            Err(e) => {
                atlas.release(ctx);
                program.release(ctx);
                return Err(e);
            }
        };

        let mut buffers = Vec::with_capacity(3);
        let buffer_count = if program.has_flip_attribute() { 3 } else { 2 };
        for _ in 0..buffer_count {
            match ctx.create_buffer() {
                Ok(buffer) => buffers.push(buffer),
                Err(e) => {
                    for buffer in buffers {
                        ctx.delete_buffer(buffer);
                    }
                    palette.release(ctx);
                    atlas.release(ctx);
                    program.release(ctx);
                    return Err(e);
                }
            }
        }

        Ok(GpuResources {
            program,
            atlas,
            palette,
            position_buffer: buffers[0],
            uv_buffer: buffers[1],
            flip_buffer: buffers.get(2).copied(),
        })
    }

    /// sampler units and palette size never change after init
    fn bind_static_uniforms(&mut self) {
        let Some(res) = self.resources.as_ref() else {
            return;
        };
        let ctx = &mut self.context;
        ctx.use_program(res.program.id);
        if let Some(atlas) = res.program.get_unif(ATLAS_UNIFORM) {
            ctx.set_uniform_i32(atlas, ATLAS_TEXTURE_UNIT as i32);
        }
        if let Some(palette) = res.program.get_unif(PALETTE_UNIFORM) {
            ctx.set_uniform_i32(palette, PALETTE_TEXTURE_UNIT as i32);
        }
        if let Some(palette_size) = res.program.get_unif(PALETTE_SIZE_UNIFORM) {
            ctx.set_uniform_f32(palette_size, res.palette.size() as f32);
        }
        if let Some(resolution) = res.program.get_unif(RESOLUTION_UNIFORM) {
            ctx.set_uniform_vec2(resolution, self.resolution);
        }
    }

    fn transition(&mut self, state: RendererState) {
        log::trace!("renderer state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// queues a single unflipped cell at pixel position `(x, y)`
    pub fn sprite(&mut self, index: u32, x: f32, y: f32) {
        self.draw(SpriteRequest::new(index, x, y));
    }

    /// queues a sprite; nothing is drawn until the next flush
    pub fn draw(&mut self, request: SpriteRequest) {
        if self.state == RendererState::Disposed {
            log::warn!("sprite {} submitted to a disposed renderer", request.index);
            return;
        }
        if let Some(max) = self.max_batch_sprites {
            if self.batcher.sprite_count() >= max {
                log::trace!("batch reached {max} sprites, flushing early");
                if let Err(e) = self.flush() {
                    log::error!("automatic flush failed: {e}");
                }
            }
        }
        self.batcher.push(&request);
        self.state = RendererState::Active(FramePhase::Accumulating);
    }

    /// uploads the batch and draws it with one draw call, then empties it
    pub fn flush(&mut self) -> Result<(), RendererError> {
        let Some(res) = self.resources.as_ref() else {
            return Err(RendererError::Disposed);
        };
        if self.batcher.is_empty() {
            return Ok(());
        }
        let ctx = &mut self.context;

        ctx.use_program(res.program.id);
        if let Some(resolution) = res.program.get_unif(RESOLUTION_UNIFORM) {
            ctx.set_uniform_vec2(resolution, self.resolution);
        }
        ctx.set_blend(self.blend);
        ctx.bind_texture(ATLAS_TEXTURE_UNIT, res.atlas.id());
        ctx.bind_texture(PALETTE_TEXTURE_UNIT, res.palette.id());

        let components = COMPONENTS_PER_VERTEX as i32;
        ctx.upload_buffer(res.position_buffer, self.batcher.positions());
        if let Some(position) = res.program.get_attr(POSITION_ATTRIB) {
            ctx.bind_attribute(res.position_buffer, position, components);
        }
        ctx.upload_buffer(res.uv_buffer, self.batcher.uvs());
        if let Some(uv) = res.program.get_attr(UV_ATTRIB) {
            ctx.bind_attribute(res.uv_buffer, uv, components);
        }
        if let (Some(flip_buffer), Some(flip)) =
            (res.flip_buffer, res.program.get_attr(FLIP_ATTRIB))
        {
            ctx.upload_buffer(flip_buffer, self.batcher.flips());
            ctx.bind_attribute(flip_buffer, flip, components);
        }

        let vertex_count = self.batcher.vertex_count();
        ctx.draw_triangles(vertex_count);
        self.draw_calls += 1;
        log::trace!(
            "flushed {} sprites ({} vertices)",
            self.batcher.sprite_count(),
            vertex_count
        );

        self.batcher.clear();
        self.state = RendererState::Active(FramePhase::Flushed);
        Ok(())
    }

    /// changes one palette slot for every following flush
    pub fn set_palette_color(&mut self, slot: usize, color: Color32) -> Result<(), RendererError> {
        let res = self.resources.as_mut().ok_or(RendererError::Disposed)?;
        res.palette.set_color(&mut self.context, slot, color)
    }

    /// replaces the whole palette for every following flush
    pub fn apply_palette(&mut self, palette: &Palette) -> Result<(), RendererError> {
        let res = self.resources.as_mut().ok_or(RendererError::Disposed)?;
        res.palette.apply_palette(&mut self.context, palette)
    }

    /// the palette currently resident on the gpu
    pub fn palette(&self) -> Option<&Palette> {
        self.resources.as_ref().map(|res| res.palette.palette())
    }

    /// changes the pixel resolution sprite positions are mapped from
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        log::debug!("renderer resolution set to {width}x{height}");
        self.resolution = glm::vec2(width as f32, height as f32);
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.resolution.x as u32, self.resolution.y as u32)
    }

    /// releases every gpu resource, discarding any pending batch
    pub fn dispose(&mut self) {
        if let Some(res) = self.resources.take() {
            if !self.batcher.is_empty() {
                log::debug!(
                    "discarding {} unflushed sprites",
                    self.batcher.sprite_count()
                );
            }
            res.release(&mut self.context);
            log::debug!("sprite renderer disposed");
        }
        self.batcher.clear();
        if self.state != RendererState::Disposed {
            self.transition(RendererState::Disposed);
        }
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    /// the geometry queued since the last flush
    pub fn batch(&self) -> &SpriteBatcher {
        &self.batcher
    }

    /// number of draw calls issued over the renderer's lifetime
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

impl<C: GraphicsContext> Drop for Renderer<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}
