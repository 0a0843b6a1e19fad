// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod physics;
pub mod utils;

pub mod model;

pub use config::{ConfigError, TerrainConfig, WorldConfig};
pub use model::world::{
    generate_world, Block, BlockLookup, Chunk, EmptyWorld, Manager, MaterialError, TextureIndexes,
};
pub use utils::{ChunkCoord, Mesh, WorldCoord};
