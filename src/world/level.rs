//! Level descriptions loaded from RON.
//!
//! A level is a list of boxes plus a spawn point. Files live under
//! `data/levels/`; the first one that parses is used, otherwise the built-in
//! training course below.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ron_loader::load_ron_files;
use crate::world::{Climbable, Surface};

pub const LEVELS_DIR: &str = "data/levels";

/// One axis-aligned box of level geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBlock {
    pub center: [f32; 3],
    pub size: [f32; 3],
    #[serde(default)]
    pub climbable: bool,
    #[serde(default = "LevelBlock::default_color")]
    pub color: [f32; 3], // sRGB, 0..1
}

impl LevelBlock {
    fn default_color() -> [f32; 3] { [0.55, 0.55, 0.6] }

    fn new(center: [f32; 3], size: [f32; 3], climbable: bool) -> Self {
        let color = if climbable { [0.62, 0.45, 0.3] } else { Self::default_color() };
        Self { center, size, climbable, color }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 { Vec3::from(self.center) }

    #[must_use]
    pub fn size(&self) -> Vec3 { Vec3::from(self.size) }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default = "Level::default_spawn")]
    pub spawn: [f32; 3],
    pub blocks: Vec<LevelBlock>,
}

impl Level {
    fn default_spawn() -> [f32; 3] { [0.0, 1.5, 4.0] }

    #[must_use]
    pub fn spawn_point(&self) -> Vec3 { Vec3::from(self.spawn) }
}

impl Default for Level {
    fn default() -> Self {
        Self {
            name: "training course".to_string(),
            spawn: Self::default_spawn(),
            blocks: vec![
                // ground
                LevelBlock::new([0.0, -0.5, 0.0], [60.0, 1.0, 60.0], false),
                // climbing wall with a ledge on top
                LevelBlock::new([0.0, 3.0, -4.0], [6.0, 6.0, 1.0], true),
                LevelBlock::new([0.0, 6.25, -6.0], [6.0, 0.5, 5.0], false),
                // short wall to hop
                LevelBlock::new([8.0, 1.0, -2.0], [4.0, 2.0, 1.0], true),
                // narrow pillar, too thin for all four sensors
                LevelBlock::new([-7.0, 4.0, -3.0], [0.2, 8.0, 0.2], true),
            ],
        }
    }
}

/// Load the first level found in `path`, falling back to the built-in one.
#[must_use]
pub fn load_level_from_dir(path: &str) -> Level {
    let levels: Vec<Level> = load_ron_files(path);
    levels.into_iter().next().unwrap_or_default()
}

/// Spawn the collision side of every block. Returns the spawned entities
/// in block order so callers can attach visuals.
pub fn spawn_level_geometry(commands: &mut Commands, level: &Level) -> Vec<Entity> {
    level
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let mut e = commands.spawn((
                Name::new(format!("LevelBlock{i}")),
                Surface::new(block.size()),
                SpatialBundle::from_transform(Transform::from_translation(block.center())),
            ));
            if block.climbable {
                e.insert(Climbable);
            }
            e.id()
        })
        .collect()
}
