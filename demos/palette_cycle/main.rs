use crate::app::*;
use env_logger::Env;
use palette_sprites::engine_builder::HostAttributes;
use palette_sprites::rendering::data::Color32;
use std::error::Error;

mod app;

fn main() -> Result<(), Box<dyn Error>> {
    let env = Env::default()
        .filter_or("LOG_LVL", "info")
        .write_style_or("LOG_STYLE", "always");
    env_logger::init_from_env(env); // only for testing purposes (not necessary)

    let app = App::new();
    let mut host = HostAttributes::new()
        .with_title("Palette Cycle")
        .with_screen_size(128, 128)
        .with_pixel_scale(5)
        .with_tick_rate(30.0)
        .with_resizable(false)
        .with_clear_color(Color32::from_rgb(0x1d, 0x2b, 0x53))
        .build_host();

    host.run(app)
}
