use crate::engine_builder::HostAttributes;
use crate::rendering::data::Color32;
use gl::types::GLsizei;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use std::error::Error;
use std::ffi::{CStr, CString};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

/// holds the window and the opengl context the renderer draws into
pub struct VideoSystem {
    config_template: ConfigTemplateBuilder,
    display_builder: DisplayBuilder,
    not_current_gl_context: Option<NotCurrentContext>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    window: Option<Window>,
    stored_config: HostAttributes,
    pub(crate) clock: FrameClock,
}

impl VideoSystem {
    /// creates a new video system
    pub(crate) fn new(config: HostAttributes) -> Self {
        let window_attributes = config.generate_win_attrs();
        let config_template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));

        Self {
            config_template,
            display_builder,
            not_current_gl_context: None,
            gl_context: None,
            gl_surface: None,
            window: None,
            clock: FrameClock::new(config.tick_rate),
            stored_config: config,
        }
    }

    /// called when the application is resumed, acquires window and context
    pub(crate) fn on_resumed(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let (mut window, gl_config) = self.display_builder.clone().build(
            event_loop,
            self.config_template.clone(),
            gl_config_picker,
        )?;

        log::info!("Picked a config with {} samples", gl_config.num_samples());

        let raw_window_handle = window
            .as_ref()
            .and_then(|window| window.window_handle().ok())
            .map(|handle| handle.as_raw());

        let gl_display = gl_config.display();

        // the sprite shaders target glsl 330 core
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(raw_window_handle);

        let not_current_gl_context = match self.not_current_gl_context.take() {
            Some(context) => context,
            None => unsafe { gl_display.create_context(&gl_config, &context_attributes)? },
        };

        let window = match window.take() {
            Some(window) => window,
            None => glutin_winit::finalize_window(
                event_loop,
                self.stored_config.generate_win_attrs(),
                &gl_config,
            )?,
        };

        let attrs = window.build_surface_attributes(Default::default())?;
        let gl_surface = unsafe {
            gl_config
                .display()
                .create_window_surface(&gl_config, &attrs)?
        };

        // the context needs to be current for function loading and resource creation
        let gl_context = not_current_gl_context.make_current(&gl_surface)?;

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });
        log_gl_config();

        let size = window.inner_size();
        self.gl_context = Some(gl_context);
        self.gl_surface = Some(gl_surface);
        self.window = Some(window);
        self.resize(size.width, size.height);

        let vsync = if self.stored_config.use_vsync {
            self.enable_vsync()
        } else {
            self.disable_vsync()
        };
        if let Err(e) = vsync {
            log::warn!("Error setting vsync: {e}");
        }

        Ok(())
    }

    /// called when the application is suspended
    pub(crate) fn on_suspended(&mut self) {
        // only raised on Android, where the native window may disappear at any moment
        log::info!("Android window removed");

        self.gl_surface = None;
        self.window = None;
        if let Some(gl_context) = self.gl_context.take() {
            match gl_context.make_not_current() {
                Ok(context) => self.not_current_gl_context = Some(context),
                Err(e) => log::error!("could not release gl context: {e}"),
            }
        }
    }

    /// enables vsync for opengl
    pub fn enable_vsync(&mut self) -> Result<(), String> {
        log::debug!("enabled vsync");
        self.set_swap_interval(SwapInterval::Wait(NonZeroU32::MIN))
    }

    /// disables vsync for opengl
    pub fn disable_vsync(&mut self) -> Result<(), String> {
        log::debug!("disabled vsync");
        self.set_swap_interval(SwapInterval::DontWait)
    }

    fn set_swap_interval(&self, interval: SwapInterval) -> Result<(), String> {
        if let (Some(gl_surface), Some(gl_context)) =
            (self.gl_surface.as_ref(), self.gl_context.as_ref())
        {
            return gl_surface
                .set_swap_interval(gl_context, interval)
                .map_err(|err| err.to_string());
        }
        Err(String::from("no current gl surface"))
    }

    /// resizes the surface and stretches the viewport over the whole window
    pub(crate) fn resize(&self, width: u32, height: u32) {
        // some platforms like EGL require resizing the surface explicitly
        if let (Some(gl_surface), Some(gl_context), Some(width_nz), Some(height_nz)) = (
            self.gl_surface.as_ref(),
            self.gl_context.as_ref(),
            NonZeroU32::new(width),
            NonZeroU32::new(height),
        ) {
            gl_surface.resize(gl_context, width_nz, height_nz);
            unsafe {
                gl::Viewport(0, 0, width as GLsizei, height as GLsizei);
            }
            log::trace!("viewport resized to {width}x{height}");
        }
    }

    /// clears the framebuffer before a frame is drawn
    pub(crate) fn clear_screen(&self) {
        let color = self.stored_config.clear_color.to_vec4();
        unsafe {
            gl::ClearColor(color.x, color.y, color.z, color.w);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// the color the screen is cleared to
    pub fn clear_color(&self) -> Color32 {
        self.stored_config.clear_color
    }

    /// call the opengl window swap
    pub(crate) fn swap_window(&self) {
        if let (Some(gl_surface), Some(gl_context)) =
            (self.gl_surface.as_ref(), self.gl_context.as_ref())
        {
            if let Err(e) = gl_surface.swap_buffers(gl_context) {
                log::error!("buffer swap failed: {e}");
            }
        }
    }

    /// requests a redraw of the winit window
    pub(crate) fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    /// wether window and context are available
    pub(crate) fn is_ready(&self) -> bool {
        self.gl_context.is_some() && self.window.is_some()
    }

    /// changes the title bar text in the window
    pub fn set_window_title(&self, title: &str) {
        if let Some(window) = self.window.as_ref() {
            window.set_title(title);
        }
    }
}

/// fixed cadence scheduler deciding when the next frame tick is due
#[derive(Debug, Clone)]
pub struct FrameClock {
    tick_interval: Duration,
    last_tick: Option<Instant>,
    current_fps: f64,
}

impl FrameClock {
    /// creates a clock ticking `tick_rate` times per second
    pub fn new(tick_rate: f64) -> Self {
        let tick_interval = if tick_rate > 0.0 {
            Duration::from_secs_f64(1.0 / tick_rate)
        } else {
            Duration::ZERO
        };
        Self {
            tick_interval,
            last_tick: None,
            current_fps: 0.0,
        }
    }

    /// checks wether a tick should happen at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_tick
            .map_or(true, |last| now.duration_since(last) >= self.tick_interval)
    }

    /// the instant the next tick becomes due
    pub fn next_tick(&self, now: Instant) -> Instant {
        self.last_tick.map_or(now, |last| last + self.tick_interval)
    }

    /// records that a tick happened at `now`
    pub fn mark(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            let elapsed = now.duration_since(last).as_secs_f64();
            if elapsed > 0.0 {
                self.current_fps = 1.0 / elapsed;
            }
        }
        self.last_tick = Some(now);
    }

    /// gets the measured ticks per second
    #[inline]
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }
}

/// prints info about the used gl renderer
fn log_gl_config() {
    if let Some(renderer) = get_gl_string(gl::RENDERER) {
        log::info!("Running on {}", renderer.to_string_lossy());
    }
    if let Some(version) = get_gl_string(gl::VERSION) {
        log::info!("OpenGL Version {}", version.to_string_lossy());
    }
    if let Some(shaders_version) = get_gl_string(gl::SHADING_LANGUAGE_VERSION) {
        log::info!("Shaders version on {}", shaders_version.to_string_lossy());
    }
}

/// find the config with the maximum number of samples
fn gl_config_picker(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("display offered no gl configs")
}

/// retrieves a string value from gl
fn get_gl_string(variant: gl::types::GLenum) -> Option<&'static CStr> {
    unsafe {
        let s = gl::GetString(variant);
        (!s.is_null()).then(|| CStr::from_ptr(s.cast()))
    }
}
