use palette_sprites::engine::SpriteApp;
use palette_sprites::engine_builder::HostAttributes;
use palette_sprites::error::RendererError;
use palette_sprites::rendering::context::GlContext;
use palette_sprites::rendering::data::{Color32, Palette, SpriteSheet};
use palette_sprites::rendering::sprite_batch::SpriteRequest;
use palette_sprites::rendering::sprite_renderer::Renderer;
use palette_sprites::winit::event::{ElementState, WindowEvent};
use palette_sprites::winit::keyboard::{Key, NamedKey};

const SHEET_SIZE: u32 = 128;
const CELL_SIZE: u32 = 8;
const ACTOR_COUNT: usize = 64;
const CYCLE_EVERY: u32 = 4;

struct Actor {
    cell: u32,
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
}

pub struct App {
    actors: Vec<Actor>,
    palette: Palette,
    ticks: u32,
    cycling: bool,
}

impl App {
    pub fn new() -> Self {
        let actors = (0..ACTOR_COUNT)
            .map(|i| {
                let f = i as f32;
                Actor {
                    cell: i as u32 * 3,
                    x: (f * 37.0) % 120.0,
                    y: (f * 53.0) % 120.0,
                    dx: 0.5 + (f * 0.37) % 1.0,
                    dy: 0.25 + (f * 0.61) % 1.0,
                }
            })
            .collect();
        Self {
            actors,
            palette: Palette::pico8(),
            ticks: 0,
            cycling: true,
        }
    }

    /// rotates the colors 1..=15, slot 0 stays the background
    fn rotate_palette(&mut self) {
        let mut colors = self.palette.colors().to_vec();
        colors[1..].rotate_left(1);
        self.palette = Palette::new(colors);
    }
}

/// rings around each cell's center, shifted by the cell index
fn ring_sheet() -> Vec<u8> {
    let mut pixels = vec![0u8; (SHEET_SIZE * SHEET_SIZE) as usize];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let (x, y) = (i as u32 % SHEET_SIZE, i as u32 / SHEET_SIZE);
        let cell = (y / CELL_SIZE) * (SHEET_SIZE / CELL_SIZE) + x / CELL_SIZE;
        let dx = (x % CELL_SIZE) as i32 * 2 - 7;
        let dy = (y % CELL_SIZE) as i32 * 2 - 7;
        let ring = ((dx * dx + dy * dy) as f32).sqrt() as u32 / 2;
        *pixel = if ring > 3 {
            0
        } else {
            ((ring + cell) % 15 + 1) as u8
        };
    }
    pixels
}

impl SpriteApp for App {
    fn init(
        &mut self,
        context: GlContext,
        attributes: &HostAttributes,
    ) -> Result<Renderer<GlContext>, RendererError> {
        let sheet = SpriteSheet::new(ring_sheet(), SHEET_SIZE, SHEET_SIZE, CELL_SIZE)?;
        let renderer_attributes = attributes
            .renderer_attributes()
            .with_cell_size(CELL_SIZE)
            .with_max_batch_sprites(Some(4096));
        Renderer::init(context, &sheet, &self.palette, &renderer_attributes)
    }

    fn tick(&mut self, renderer: &mut Renderer<GlContext>) {
        self.ticks += 1;
        if self.cycling && self.ticks % CYCLE_EVERY == 0 {
            self.rotate_palette();
            if let Err(e) = renderer.apply_palette(&self.palette) {
                log::error!("palette cycle failed: {e}");
            }
        }
        // slot 8 pulses between its own color and white
        let pulse = if (self.ticks / 15) % 2 == 0 {
            self.palette.resolve(8)
        } else {
            Color32::WHITE
        };
        if let Err(e) = renderer.set_palette_color(8, pulse) {
            log::error!("palette pulse failed: {e}");
        }

        let (width, height) = renderer.screen_size();
        let max_x = (width - CELL_SIZE) as f32;
        let max_y = (height - CELL_SIZE) as f32;
        for actor in self.actors.iter_mut() {
            actor.x += actor.dx;
            actor.y += actor.dy;
            if actor.x <= 0.0 || actor.x >= max_x {
                actor.dx = -actor.dx;
                actor.x = actor.x.clamp(0.0, max_x);
            }
            if actor.y <= 0.0 || actor.y >= max_y {
                actor.dy = -actor.dy;
                actor.y = actor.y.clamp(0.0, max_y);
            }
            renderer.draw(
                SpriteRequest::new(actor.cell, actor.x, actor.y)
                    .with_flip(actor.dx < 0.0, actor.dy < 0.0),
            );
        }
        // a 2x2 cell banner in the corner
        renderer.draw(SpriteRequest::new(0, 0.0, 0.0).with_size(2, 2));
    }

    fn on_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.logical_key == Key::Named(NamedKey::Space)
            {
                self.cycling = !self.cycling;
                log::info!("palette cycling {}", if self.cycling { "on" } else { "off" });
            }
        }
    }
}
