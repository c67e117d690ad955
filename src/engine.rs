use crate::engine_builder::HostAttributes;
use crate::error::RendererError;
use crate::rendering::context::GlContext;
use crate::rendering::sprite_renderer::Renderer;
use crate::systems::video_system::VideoSystem;
use std::error::Error;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

/// window host that drives a sprite app at a fixed tick rate
pub struct Host {
    renderer: Option<Renderer<GlContext>>,
    app: Option<Box<dyn SpriteApp>>,
    exit_state: Option<Result<(), Box<dyn Error>>>,
    video_system: VideoSystem,
    attributes: HostAttributes,
}

impl Host {
    /// host setup on startup
    pub(crate) fn new(attributes: HostAttributes) -> Self {
        Self {
            renderer: None,
            app: None,
            exit_state: Some(Ok(())),
            video_system: VideoSystem::new(attributes.clone()),
            attributes,
        }
    }

    /// runs the main loop until the window is closed
    pub fn run(&mut self, app: impl SpriteApp + 'static) -> Result<(), Box<dyn Error>> {
        self.app = Some(Box::new(app));
        let event_loop = EventLoop::new()?;
        event_loop.run_app(self)?;
        self.exit_state.take().unwrap_or(Ok(()))
    }

    /// access to the host's video system
    pub fn video_system(&self) -> &VideoSystem {
        &self.video_system
    }

    /// creates the renderer through the app once a context is current
    fn init_renderer(&mut self) -> Result<(), RendererError> {
        if self.renderer.is_some() {
            return Ok(());
        }
        if let Some(app) = self.app.as_mut() {
            let renderer = app.init(GlContext::new(), &self.attributes)?;
            self.renderer = Some(renderer);
        }
        Ok(())
    }

    /// one frame: clear, let the app queue sprites, draw them, present
    fn on_frame_redraw(&mut self) {
        let (Some(app), Some(renderer)) = (self.app.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        self.video_system.clock.mark(Instant::now());
        self.video_system.clear_screen();

        app.tick(renderer);
        if let Err(e) = renderer.flush() {
            log::error!("frame flush failed: {e}");
        }

        self.video_system.swap_window();
    }

    /// stops the loop with the given result
    fn exit_with(&mut self, event_loop: &ActiveEventLoop, state: Result<(), Box<dyn Error>>) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        self.exit_state = Some(state);
        event_loop.exit();
    }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.video_system.on_resumed(event_loop) {
            log::error!("could not acquire a gl context: {e}");
            self.exit_with(event_loop, Err(e));
            return;
        }
        if let Err(e) = self.init_renderer() {
            log::error!("could not create the sprite renderer: {e}");
            self.exit_with(event_loop, Err(Box::new(e)));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = self.app.as_mut() {
            app.on_window_event(&event);
        }
        match event {
            WindowEvent::CloseRequested => self.exit_with(event_loop, Ok(())),
            WindowEvent::Resized(size) => self.video_system.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.on_frame_redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.video_system.is_ready() {
            return;
        }
        let now = Instant::now();
        if self.video_system.clock.is_due(now) {
            self.video_system.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(
            self.video_system.clock.next_tick(now),
        ));
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.video_system.on_suspended();
    }
}

/// all necessary app functionality to run with the host
pub trait SpriteApp {
    /// builds the renderer once the gl context is current
    fn init(
        &mut self,
        context: GlContext,
        attributes: &HostAttributes,
    ) -> Result<Renderer<GlContext>, RendererError>;
    /// queues this frame's sprites; the host flushes afterwards
    fn tick(&mut self, renderer: &mut Renderer<GlContext>);
    /// observe raw window events (input etc.)
    fn on_window_event(&mut self, _event: &WindowEvent) {}
}
