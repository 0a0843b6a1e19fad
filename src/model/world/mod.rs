pub mod block;
pub mod chunk;
pub mod manager;
pub mod meshing;
pub mod terrain;
pub mod texture;

pub use block::{Block, BlockType};
pub use chunk::{BlockLookup, Chunk, ChunkColliders, EmptyWorld, CHUNK_SIZE, CHUNK_SIZE2, CHUNK_SIZE3};
pub use manager::{BuildSummary, Manager, RayHit};
pub use meshing::BlockFace;
pub use terrain::{generate_world, TerrainGenerator};
pub use texture::{MaterialError, TextureIndexes};
