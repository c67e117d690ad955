use crate::error::RendererError;
use stb_image::image::LoadResult;

// directory paths
macro_rules! shader_path {
    ($file:literal) => {
        concat!(
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/"),
            $file
        )
    };
}

// shader files
pub(crate) const SPRITE_VERT: &str = include_str!(shader_path!("sprite.vert"));
pub(crate) const SPRITE_FRAG: &str = include_str!(shader_path!("sprite.frag"));

/// unpacks a decoded image into `(rgba bytes, width, height)`
pub(crate) fn load_rgba_image(result: LoadResult) -> Result<(Vec<u8>, u32, u32), RendererError> {
    match result {
        LoadResult::ImageU8(image) => {
            if image.data.len() != image.width * image.height * 4 {
                return Err(RendererError::ImageLoad(format!(
                    "expected rgba data for a {}x{} image",
                    image.width, image.height
                )));
            }
            log::debug!("decoded {}x{} image", image.width, image.height);
            Ok((image.data, image.width as u32, image.height as u32))
        }
        LoadResult::ImageF32(_) => Err(RendererError::ImageLoad(String::from(
            "hdr images cannot hold palette indices",
        ))),
        LoadResult::Error(message) => Err(RendererError::ImageLoad(message)),
    }
}
