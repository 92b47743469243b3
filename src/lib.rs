pub mod climb;
pub mod input;
pub mod player;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod ui;
pub mod world;

pub mod settings;
pub mod debug;
