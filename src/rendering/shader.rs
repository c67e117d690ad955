use crate::error::RendererError;
use crate::rendering::context::{GraphicsContext, ProgramId, ShaderStage};
use crate::utils::constants::*;
use crate::utils::file::{SPRITE_FRAG, SPRITE_VERT};
use std::collections::HashMap;

/// shader program to use to render
#[derive(Debug)]
pub struct ShaderProgram {
    pub id: ProgramId,
    uniform_locations: HashMap<&'static str, i32>,
    attrib_locations: HashMap<&'static str, u32>,
}

impl ShaderProgram {
    /// compiles and links a program from vertex and fragment source
    pub fn compile(
        ctx: &mut impl GraphicsContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RendererError> {
        let vs = ctx.compile_shader(ShaderStage::Vertex, vertex_source)?;
        let fs = match ctx.compile_shader(ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(e) => {
                ctx.delete_shader(vs);
                return Err(e);
            }
        };
        let id = ctx.link_program(vs, fs)?;
        log::debug!("linked shader program {}", id.0);

        Ok(Self {
            id,
            uniform_locations: HashMap::new(),
            attrib_locations: HashMap::new(),
        })
    }

    /// compiles the program and resolves the sprite pipeline interface
    pub fn sprite(
        ctx: &mut impl GraphicsContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RendererError> {
        let mut program = Self::compile(ctx, vertex_source, fragment_source)?;
        if let Err(e) = program.add_sprite_locations(ctx) {
            program.release(ctx);
            return Err(e);
        }
        Ok(program)
    }

    /// the built-in two-stage palette lookup program
    pub fn sprite_default(ctx: &mut impl GraphicsContext) -> Result<Self, RendererError> {
        Self::sprite(ctx, SPRITE_VERT, SPRITE_FRAG)
    }

    fn add_sprite_locations(&mut self, ctx: &mut impl GraphicsContext) -> Result<(), RendererError> {
        self.add_attr_location(ctx, POSITION_ATTRIB)?;
        self.add_attr_location(ctx, UV_ATTRIB)?;
        if !self.try_add_attr_location(ctx, FLIP_ATTRIB) {
            log::trace!("program {} has no flip attribute", self.id.0);
        }

        self.add_unif_location(ctx, ATLAS_UNIFORM)?;
        self.add_unif_location(ctx, PALETTE_UNIFORM)?;
        self.add_unif_location(ctx, RESOLUTION_UNIFORM)?;
        // custom shaders may bake the palette size in
        self.try_add_unif_location(ctx, PALETTE_SIZE_UNIFORM);
        Ok(())
    }

    /// sets a required uniform location
    pub fn add_unif_location(
        &mut self,
        ctx: &mut impl GraphicsContext,
        name: &'static str,
    ) -> Result<(), RendererError> {
        self.try_add_unif_location(ctx, name)
            .then_some(())
            .ok_or(RendererError::MissingUniform(name))
    }

    /// sets an optional uniform location, returns wether it exists
    pub fn try_add_unif_location(
        &mut self,
        ctx: &mut impl GraphicsContext,
        name: &'static str,
    ) -> bool {
        match ctx.uniform_location(self.id, name) {
            Some(unif) => {
                self.uniform_locations.insert(name, unif);
                true
            }
            None => false,
        }
    }

    /// sets a required attrib location
    pub fn add_attr_location(
        &mut self,
        ctx: &mut impl GraphicsContext,
        name: &'static str,
    ) -> Result<(), RendererError> {
        self.try_add_attr_location(ctx, name)
            .then_some(())
            .ok_or(RendererError::MissingAttribute(name))
    }

    /// sets an optional attrib location, returns wether it exists
    pub fn try_add_attr_location(
        &mut self,
        ctx: &mut impl GraphicsContext,
        name: &'static str,
    ) -> bool {
        match ctx.attrib_location(self.id, name) {
            Some(attr) => {
                self.attrib_locations.insert(name, attr);
                true
            }
            None => false,
        }
    }

    /// gets an uniform location
    pub fn get_unif(&self, name: &str) -> Option<i32> {
        self.uniform_locations.get(name).copied()
    }

    /// gets an attrib location
    pub fn get_attr(&self, name: &str) -> Option<u32> {
        self.attrib_locations.get(name).copied()
    }

    /// wether the program consumes per-vertex flip markers
    pub fn has_flip_attribute(&self) -> bool {
        self.attrib_locations.contains_key(FLIP_ATTRIB)
    }

    /// deletes the program on the gpu
    pub fn release(self, ctx: &mut impl GraphicsContext) {
        ctx.delete_program(self.id);
        log::debug!("deleted shader program {}", self.id.0);
    }
}
