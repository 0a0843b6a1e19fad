use noise::{Clamp, Fbm, MultiFractal, NoiseFn, OpenSimplex, ScaleBias, Select};
use tracing::info;

use super::block::{BlockType, BLOCK_TYPE_DIRT, BLOCK_TYPE_GRASS, BLOCK_TYPE_STONES};
use super::chunk::{Chunk, CHUNK_SIZE};
use super::manager::Manager;
use crate::config::{TerrainConfig, WorldConfig};
use crate::utils::ChunkCoord;

type Layer = Fbm<OpenSimplex>;
type Flattened = Clamp<f64, ScaleBias<f64, Layer, 2>, 2>;
type Mixer = Select<f64, Flattened, Layer, Layer, 2>;

/// 2D height field: rolling hills with flattened plains mixed in.
pub struct TerrainGenerator {
    mixer: Mixer,
    horizontal_scale: f64,
}

impl TerrainGenerator {
    pub fn new(config: &TerrainConfig) -> Self {
        let low = Layer::new(config.seed)
            .set_octaves(config.low_octaves)
            .set_persistence(config.low_persistence)
            .set_lacunarity(config.low_lacunarity)
            .set_frequency(config.low_frequency);

        let control = Layer::new(config.seed)
            .set_octaves(config.control_octaves)
            .set_persistence(config.control_persistence)
            .set_lacunarity(config.control_lacunarity)
            .set_frequency(config.control_frequency);

        let scaled = ScaleBias::<f64, Layer, 2>::new(low.clone())
            .set_scale(config.flatten_scale)
            .set_bias(config.flatten_bias);
        let flattened = Flattened::new(scaled).set_bounds(-1.0, 1.0);

        let mixer = Mixer::new(flattened, low, control)
            .set_bounds(config.select_lower, config.select_upper)
            .set_falloff(config.select_falloff);

        Self {
            mixer,
            horizontal_scale: config.horizontal_scale,
        }
    }

    /// Raw noise in roughly `[-1, 1]`.
    pub fn sample(&self, world_x: isize, world_z: isize) -> f64 {
        self.mixer.get([
            world_x as f64 * self.horizontal_scale,
            world_z as f64 * self.horizontal_scale,
        ])
    }

    /// Surface height in blocks; everything below it is ground.
    pub fn height_at(&self, world_x: isize, world_z: isize, land_scale: i32) -> i32 {
        ((self.sample(world_x, world_z) * 0.5 + 0.5) * land_scale as f64) as i32
    }

    /// Fills a chunk from the height field.
    ///
    /// World `y == 0` is always stone. Under the surface the first block is
    /// grass, the next two dirt, the rest stone.
    pub fn populate_chunk(&self, chunk: &mut Chunk, land_scale: i32) {
        let origin = chunk.coord().to_world_coord();

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let height = self.height_at(origin.0 + x as isize, origin.2 + z as isize, land_scale) as isize;

                for y in 0..CHUNK_SIZE {
                    let world_y = origin.1 + y as isize;
                    if let Some(block_type) = layer_at(world_y, height) {
                        chunk.set_block(x, y, z, block_type);
                    }
                }
            }
        }
    }
}

fn layer_at(world_y: isize, height: isize) -> Option<BlockType> {
    if world_y == 0 {
        return Some(BLOCK_TYPE_STONES);
    }
    match height - world_y {
        depth if depth <= 0 => None,
        1 => Some(BLOCK_TYPE_GRASS),
        2 | 3 => Some(BLOCK_TYPE_DIRT),
        _ => Some(BLOCK_TYPE_STONES),
    }
}

/// Builds a populated world with colliders, meshes are left to the caller.
///
/// Only the lowest chunk layers needed to hold `land_scale` are generated.
pub fn generate_world(config: &WorldConfig) -> Manager {
    let generator = TerrainGenerator::new(&config.terrain);
    let mut manager = Manager::with_extents(config.extents, config.origin);

    let land_scale = config.land_scale.max(1) as usize;
    let layers = land_scale.div_ceil(CHUNK_SIZE).clamp(1, config.extents[1]);
    info!(extents = ?config.extents, layers, land_scale, "generating world");

    let origin = config.origin;
    for y in 0..layers {
        for x in 0..config.extents[0] {
            for z in 0..config.extents[2] {
                let coord = ChunkCoord(origin.0 + x as isize, origin.1 + y as isize, origin.2 + z as isize);
                let mut chunk = Box::new(Chunk::new(coord));
                generator.populate_chunk(&mut chunk, config.land_scale);
                chunk.update_colliders();
                manager.register_chunk(chunk);
            }
        }
    }

    info!(chunks = manager.chunk_count(), "world generated");
    manager
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::world::block::BLOCK_TYPE_EMPTY;

    #[test]
    fn layers_follow_depth_below_surface() {
        assert_eq!(layer_at(0, 0), Some(BLOCK_TYPE_STONES));
        assert_eq!(layer_at(0, 10), Some(BLOCK_TYPE_STONES));
        assert_eq!(layer_at(10, 10), None);
        assert_eq!(layer_at(9, 10), Some(BLOCK_TYPE_GRASS));
        assert_eq!(layer_at(8, 10), Some(BLOCK_TYPE_DIRT));
        assert_eq!(layer_at(7, 10), Some(BLOCK_TYPE_DIRT));
        assert_eq!(layer_at(6, 10), Some(BLOCK_TYPE_STONES));
        assert_eq!(layer_at(1, 10), Some(BLOCK_TYPE_STONES));
    }

    #[test]
    fn heights_stay_within_land_scale() {
        let generator = TerrainGenerator::new(&TerrainConfig::default());
        for x in (-40..40).step_by(7) {
            for z in (-40..40).step_by(5) {
                let h = generator.height_at(x, z, 24);
                assert!((-12..=36).contains(&h), "height {} at {},{}", h, x, z);
            }
        }
    }

    #[test]
    fn same_seed_same_terrain() {
        let a = TerrainGenerator::new(&TerrainConfig::default());
        let b = TerrainGenerator::new(&TerrainConfig::default());
        assert_eq!(a.sample(13, -7), b.sample(13, -7));
    }

    #[test]
    fn populated_chunk_has_a_stone_floor_and_grass_on_top() {
        let generator = TerrainGenerator::new(&TerrainConfig::default());
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        generator.populate_chunk(&mut chunk, 24);

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                assert_eq!(chunk.block_at(x, 0, z).block_type, BLOCK_TYPE_STONES);

                let height = generator.height_at(x as isize, z as isize, 24);
                if (2..CHUNK_SIZE as i32).contains(&height) {
                    let top = (height - 1) as usize;
                    assert_eq!(chunk.block_at(x, top, z).block_type, BLOCK_TYPE_GRASS);
                    assert_eq!(chunk.block_at(x, height as usize, z).block_type, BLOCK_TYPE_EMPTY);
                }
            }
        }
    }

    #[test]
    fn generated_world_fills_the_needed_layers() {
        let config = WorldConfig {
            extents: [2, 3, 1],
            land_scale: 20,
            ..WorldConfig::default()
        };
        let manager = generate_world(&config);
        // 20 blocks need two layers of 16
        assert_eq!(manager.chunk_count(), 2 * 2);
        assert!(manager.chunk_at(&ChunkCoord(1, 1, 0)).is_some());
        assert!(manager.chunk_at(&ChunkCoord(0, 2, 0)).is_none());
        assert!(manager.chunks().all(|c| c.colliders().is_some()));
        assert!(manager.get_height_at(3, 3) >= 0);
    }
}
