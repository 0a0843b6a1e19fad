// MODEL: landscape data
pub mod world;

pub use world::{Block, BlockLookup, Chunk, Manager, CHUNK_SIZE, CHUNK_SIZE2, CHUNK_SIZE3};
