pub mod display;
pub mod setup;

pub use display::sync_sensor_visibility;
pub use setup::setup;
