pub use color::{ease_in_out_cubic, interp_hue, lerp, Hsl, Rgb};
pub use config::{BackdropSettings, ConfigError, ConfigFile, ConfigManager};
pub use driver::{BackdropDriver, DriverState};
pub use palette::{Palette, ScrollColors};
pub use surface::{BackdropSink, Viewport};

mod color;
mod config;
mod driver;
mod palette;
mod surface;
