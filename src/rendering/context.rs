use crate::error::RendererError;
use crate::glm;
use gl::types::*;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::ptr;

const MAX_PENDING_ERRORS: usize = 16;

/// handle to a texture owned by a graphics context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// handle to a vertex buffer owned by a graphics context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// handle to a single compiled shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// the two programmable stages the sprite pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// pixel layout of texture data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// one byte per pixel, sampled through the red channel
    R8,
    Rgba8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// describes a 2D texture; filtering is always nearest with clamp-to-edge wrapping and no mipmaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// row alignment in bytes used when reading the upload data
    pub unpack_alignment: i32,
}

impl TextureDesc {
    /// creates a description with the tightest row alignment the data allows
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        let row_bytes = width as usize * format.bytes_per_pixel();
        let unpack_alignment = if row_bytes % 4 == 0 { 4 } else { 1 };
        Self {
            width,
            height,
            format,
            unpack_alignment,
        }
    }

    /// number of bytes a full upload of this texture takes
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// a rectangular texel region for partial texture updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// how fragments are combined with the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// straight alpha blending (src_alpha, 1 - src_alpha)
    #[default]
    Alpha,
    Opaque,
}

/// the graphics primitives the sprite renderer consumes
pub trait GraphicsContext {
    /// creates a texture and uploads its full contents
    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        data: &[u8],
    ) -> Result<TextureId, RendererError>;
    /// overwrites a sub-region of an existing texture without reallocating it
    fn update_texture(
        &mut self,
        texture: TextureId,
        desc: &TextureDesc,
        region: TextureRegion,
        data: &[u8],
    );
    /// binds a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    fn delete_texture(&mut self, texture: TextureId);

    fn create_buffer(&mut self) -> Result<BufferId, RendererError>;
    /// streams vertex data into a persistent buffer, growing it if needed
    fn upload_buffer(&mut self, buffer: BufferId, data: &[f32]);
    /// feeds a float attribute with `components` values per vertex from a buffer
    fn bind_attribute(&mut self, buffer: BufferId, location: u32, components: i32);
    fn delete_buffer(&mut self, buffer: BufferId);

    /// compiles one shader stage, surfacing the driver log on failure
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, RendererError>;
    fn delete_shader(&mut self, shader: ShaderId);
    /// links both stages into a program and releases the stage objects
    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, RendererError>;
    fn delete_program(&mut self, program: ProgramId);
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<i32>;
    fn use_program(&mut self, program: ProgramId);
    fn set_uniform_i32(&mut self, location: i32, value: i32);
    fn set_uniform_f32(&mut self, location: i32, value: f32);
    fn set_uniform_vec2(&mut self, location: i32, value: glm::Vec2);

    fn set_blend(&mut self, mode: BlendMode);
    /// draws `vertex_count` vertices as an independent triangle list
    fn draw_triangles(&mut self, vertex_count: usize);
}

/// OpenGL 3.3 core implementation (requires a current context with loaded function pointers)
pub struct GlContext {
    vao: GLuint,
    buffer_capacities: HashMap<BufferId, usize>,
}

impl GlContext {
    /// creates the context wrapper and its vertex array object
    pub fn new() -> Self {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);
        }
        log::debug!("created gl context wrapper (vao {vao})");
        Self {
            vao,
            buffer_capacities: HashMap::new(),
        }
    }
}

impl Default for GlContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

impl GraphicsContext for GlContext {
    fn create_texture(
        &mut self,
        desc: &TextureDesc,
        data: &[u8],
    ) -> Result<TextureId, RendererError> {
        if data.len() < desc.byte_len() {
            return Err(RendererError::TextureCreation(format!(
                "{} bytes given for a {}x{} texture",
                data.len(),
                desc.width,
                desc.height
            )));
        }
        let (internal, format) = gl_formats(desc.format);
        let mut tex_id = 0;
        unsafe {
            gl::GenTextures(1, &mut tex_id);
            if tex_id == 0 {
                return Err(RendererError::TextureCreation(String::from(
                    "no texture name available",
                )));
            }
            gl::BindTexture(gl::TEXTURE_2D, tex_id);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, desc.unpack_alignment);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, 0);
            let stale = drain_errors(|| gl::GetError());
            if stale > 0 {
                log::warn!("discarded {stale} pending gl errors before texture upload");
            }
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                internal as GLint,
                desc.width as GLint,
                desc.height as GLint,
                0,
                format,
                gl::UNSIGNED_BYTE,
                data.as_ptr() as *const GLvoid,
            );
            let error = gl::GetError();
            if error != gl::NO_ERROR {
                gl::DeleteTextures(1, &tex_id);
                return Err(RendererError::TextureCreation(format!(
                    "gl error 0x{error:x}"
                )));
            }
        }
        log::debug!(
            "created {}x{} {:?} texture {tex_id}",
            desc.width,
            desc.height,
            desc.format
        );
        Ok(TextureId(tex_id))
    }

    fn update_texture(
        &mut self,
        texture: TextureId,
        desc: &TextureDesc,
        region: TextureRegion,
        data: &[u8],
    ) {
        let (_, format) = gl_formats(desc.format);
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, texture.0);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, desc.unpack_alignment);
            gl::TexSubImage2D(
                gl::TEXTURE_2D,
                0,
                region.x as GLint,
                region.y as GLint,
                region.width as GLsizei,
                region.height as GLsizei,
                format,
                gl::UNSIGNED_BYTE,
                data.as_ptr() as *const GLvoid,
            );
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, texture.0);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        unsafe {
            gl::DeleteTextures(1, &texture.0);
        }
    }

    fn create_buffer(&mut self) -> Result<BufferId, RendererError> {
        let mut vbo = 0;
        unsafe {
            gl::GenBuffers(1, &mut vbo);
        }
        if vbo == 0 {
            return Err(RendererError::BufferCreation);
        }
        self.buffer_capacities.insert(BufferId(vbo), 0);
        Ok(BufferId(vbo))
    }

    fn upload_buffer(&mut self, buffer: BufferId, data: &[f32]) {
        let size = std::mem::size_of_val(data);
        let capacity = self.buffer_capacities.entry(buffer).or_insert(0);
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer.0);
            if size > *capacity {
                // grow the buffer to fit the current batch
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    size as GLsizeiptr,
                    data.as_ptr() as *const GLvoid,
                    gl::STREAM_DRAW,
                );
                log::debug!("grew vertex buffer {} to {} bytes", buffer.0, size);
                *capacity = size;
            } else {
                gl::BufferSubData(
                    gl::ARRAY_BUFFER,
                    0,
                    size as GLsizeiptr,
                    data.as_ptr() as *const GLvoid,
                );
            }
        }
    }

    fn bind_attribute(&mut self, buffer: BufferId, location: u32, components: i32) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer.0);
            gl::EnableVertexAttribArray(location);
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE as GLboolean,
                0,
                ptr::null(),
            );
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffer_capacities.remove(&buffer);
        unsafe {
            gl::DeleteBuffers(1, &buffer.0);
        }
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, RendererError> {
        let ty = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        let c_str = CString::new(source.as_bytes()).map_err(|_| RendererError::ShaderCompile {
            stage,
            log: String::from("shader source contains a nul byte"),
        })?;
        unsafe {
            let shader = gl::CreateShader(ty);
            if shader == 0 {
                return Err(RendererError::ShaderCreation(stage));
            }
            gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
            gl::CompileShader(shader);

            let mut status = gl::FALSE as GLint;
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
            if status != (gl::TRUE as GLint) {
                let mut len = 0;
                gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetShaderInfoLog(
                    shader,
                    len,
                    ptr::null_mut(),
                    buf.as_mut_ptr() as *mut GLchar,
                );
                gl::DeleteShader(shader);
                return Err(RendererError::ShaderCompile {
                    stage,
                    log: info_log_to_string(buf),
                });
            }
            Ok(ShaderId(shader))
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        unsafe {
            gl::DeleteShader(shader.0);
        }
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, RendererError> {
        unsafe {
            let program = gl::CreateProgram();
            if program == 0 {
                gl::DeleteShader(vertex.0);
                gl::DeleteShader(fragment.0);
                return Err(RendererError::ProgramLink(String::from(
                    "could not create program object",
                )));
            }
            gl::AttachShader(program, vertex.0);
            gl::AttachShader(program, fragment.0);
            gl::BindFragDataLocation(program, 0, c"out_color".as_ptr());
            gl::LinkProgram(program);

            gl::DetachShader(program, fragment.0);
            gl::DetachShader(program, vertex.0);
            gl::DeleteShader(fragment.0);
            gl::DeleteShader(vertex.0);

            let mut status = gl::FALSE as GLint;
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
            if status != (gl::TRUE as GLint) {
                let mut len: GLint = 0;
                gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetProgramInfoLog(
                    program,
                    len,
                    ptr::null_mut(),
                    buf.as_mut_ptr() as *mut GLchar,
                );
                gl::DeleteProgram(program);
                return Err(RendererError::ProgramLink(info_log_to_string(buf)));
            }
            Ok(ProgramId(program))
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        unsafe {
            gl::DeleteProgram(program.0);
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let c_name = CString::new(name).ok()?;
        let attr = unsafe { gl::GetAttribLocation(program.0, c_name.as_ptr()) };
        u32::try_from(attr).ok()
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<i32> {
        let c_name = CString::new(name).ok()?;
        let unif = unsafe { gl::GetUniformLocation(program.0, c_name.as_ptr()) };
        (unif >= 0).then_some(unif)
    }

    fn use_program(&mut self, program: ProgramId) {
        unsafe {
            gl::UseProgram(program.0);
        }
    }

    fn set_uniform_i32(&mut self, location: i32, value: i32) {
        unsafe {
            gl::Uniform1i(location, value);
        }
    }

    fn set_uniform_f32(&mut self, location: i32, value: f32) {
        unsafe {
            gl::Uniform1f(location, value);
        }
    }

    fn set_uniform_vec2(&mut self, location: i32, value: glm::Vec2) {
        unsafe {
            gl::Uniform2f(location, value.x, value.y);
        }
    }

    fn set_blend(&mut self, mode: BlendMode) {
        unsafe {
            match mode {
                BlendMode::Alpha => {
                    gl::Enable(gl::BLEND);
                    gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
                }
                BlendMode::Opaque => gl::Disable(gl::BLEND),
            }
        }
    }

    fn draw_triangles(&mut self, vertex_count: usize) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(gl::TRIANGLES, 0, vertex_count as GLsizei);
        }
    }
}

/// maps a texture format to the (internal format, data format) pair
fn gl_formats(format: TextureFormat) -> (GLenum, GLenum) {
    match format {
        TextureFormat::R8 => (gl::R8, gl::RED),
        TextureFormat::Rgba8 => (gl::RGBA8, gl::RGBA),
    }
}

/// converts a driver info log into a string without the trailing null character
fn info_log_to_string(mut buf: Vec<u8>) -> String {
    while buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// pops queued errors until the queue reports none, returns how many were dropped
fn drain_errors(mut next_error: impl FnMut() -> GLenum) -> usize {
    // a lost context keeps reporting the same error, so the loop is bounded
    (0..MAX_PENDING_ERRORS)
        .take_while(|_| next_error() != gl::NO_ERROR)
        .count()
}
