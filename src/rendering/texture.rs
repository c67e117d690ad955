use crate::error::RendererError;
use crate::rendering::context::{
    GraphicsContext, TextureDesc, TextureFormat, TextureId, TextureRegion,
};
use crate::rendering::data::{Color32, Palette, SpriteSheet};

/// single channel texture holding the indexed sprite sheet
#[derive(Debug)]
pub struct TextureAtlas {
    id: TextureId,
    desc: TextureDesc,
}

impl TextureAtlas {
    /// uploads the sheet's palette indices one byte per texel
    pub fn upload(
        ctx: &mut impl GraphicsContext,
        sheet: &SpriteSheet,
    ) -> Result<Self, RendererError> {
        // rows of widths that are not a multiple of 4 are read with 1 byte alignment
        let desc = TextureDesc::new(sheet.width(), sheet.height(), TextureFormat::R8);
        let id = ctx.create_texture(&desc, sheet.pixels())?;
        log::debug!(
            "uploaded {}x{} sprite atlas ({} cells of {}px)",
            sheet.width(),
            sheet.height(),
            sheet.cell_count(),
            sheet.cell_size()
        );
        Ok(Self { id, desc })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn release(self, ctx: &mut impl GraphicsContext) {
        ctx.delete_texture(self.id);
    }
}

/// `palette_size x 1` rgba texture resolving palette indices to colors
#[derive(Debug)]
pub struct PaletteTexture {
    id: TextureId,
    desc: TextureDesc,
    palette: Palette,
}

impl PaletteTexture {
    /// uploads the palette, which must hold exactly `palette_size` colors
    pub fn upload(
        ctx: &mut impl GraphicsContext,
        palette: &Palette,
        palette_size: usize,
    ) -> Result<Self, RendererError> {
        check_size(palette, palette_size)?;
        let desc = TextureDesc::new(palette_size as u32, 1, TextureFormat::Rgba8);
        let id = ctx.create_texture(&desc, &palette.to_texels())?;
        log::debug!("uploaded {palette_size} color palette");
        Ok(Self {
            id,
            desc,
            palette: palette.clone(),
        })
    }

    /// overwrites exactly one texel in place
    pub fn set_color(
        &mut self,
        ctx: &mut impl GraphicsContext,
        slot: usize,
        color: Color32,
    ) -> Result<(), RendererError> {
        self.palette.set(slot, color)?;
        let region = TextureRegion {
            x: slot as u32,
            y: 0,
            width: 1,
            height: 1,
        };
        ctx.update_texture(self.id, &self.desc, region, &color.to_bytes());
        Ok(())
    }

    /// replaces every texel in one update
    pub fn apply_palette(
        &mut self,
        ctx: &mut impl GraphicsContext,
        palette: &Palette,
    ) -> Result<(), RendererError> {
        check_size(palette, self.size())?;
        let region = TextureRegion {
            x: 0,
            y: 0,
            width: self.desc.width,
            height: 1,
        };
        ctx.update_texture(self.id, &self.desc, region, &palette.to_texels());
        self.palette = palette.clone();
        Ok(())
    }

    /// the colors currently resident on the gpu
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn size(&self) -> usize {
        self.desc.width as usize
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn release(self, ctx: &mut impl GraphicsContext) {
        ctx.delete_texture(self.id);
    }
}

fn check_size(palette: &Palette, palette_size: usize) -> Result<(), RendererError> {
    if palette.len() != palette_size {
        return Err(RendererError::PaletteSizeMismatch {
            expected: palette_size,
            actual: palette.len(),
        });
    }
    Ok(())
}
