use glam::Vec3;
use tracing::debug;

use super::block::{Block, BlockType};
use super::texture::TextureIndexes;
use crate::physics::{Aabb, CollisionCube};
use crate::utils::{BlockCoord, ChunkCoord, Mesh, WorldCoord};

/// Edge length of a chunk in blocks.
pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE2: usize = CHUNK_SIZE * CHUNK_SIZE;
pub const CHUNK_SIZE3: usize = CHUNK_SIZE2 * CHUNK_SIZE;

/// Answers "what block is at this world position" while a chunk builds its
/// geometry. `None` means nothing is known there and is treated as air.
pub trait BlockLookup {
    fn block_at_world(&self, coord: &WorldCoord) -> Option<Block>;
}

/// A lookup where every position is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWorld;

impl BlockLookup for EmptyWorld {
    fn block_at_world(&self, _coord: &WorldCoord) -> Option<Block> {
        None
    }
}

/// Static landscape colliders plus plain boxes mirroring them for ray casts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkColliders {
    pub colliders: Vec<CollisionCube>,
    pub boxes: Vec<Aabb>,
}

impl ChunkColliders {
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

/// A contiguous stretch of blocking blocks along Z, `start_z..=end_z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CollisionRun {
    x: isize,
    y: isize,
    start_z: isize,
    end_z: isize,
}

impl CollisionRun {
    fn length(&self) -> f32 {
        (self.end_z - self.start_z + 1) as f32
    }

    fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.start_z as f32 + self.length() / 2.0,
        )
    }

    fn half_size(&self) -> Vec3 {
        Vec3::new(0.5, 0.5, self.length() / 2.0)
    }
}

/// A cube of `CHUNK_SIZE³` blocks at a chunk coordinate, with lazily built
/// mesh and collider caches.
///
/// Caches are never touched by block writes; call [`Chunk::invalidate`] (or
/// one of its narrower siblings) after a batch of edits.
pub struct Chunk {
    coord: ChunkCoord,
    blocks: [Block; CHUNK_SIZE3],

    /// whole-chunk box in world space, independent of contents
    bounds: Aabb,

    mesh: Option<Mesh>,
    colliders: Option<ChunkColliders>,

    /// slot in the owning manager, set on registration
    owner_slot: Option<usize>,
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("non_empty", &self.count_non_empty())
            .field("has_mesh", &self.mesh.is_some())
            .field("has_colliders", &self.colliders.is_some())
            .field("owner_slot", &self.owner_slot)
            .finish()
    }
}

impl Chunk {
    /// creates a new empty chunk
    pub fn new(coord: ChunkCoord) -> Self {
        let origin = coord.to_world_coord();
        let size = CHUNK_SIZE as f32;
        Self {
            coord,
            blocks: [Block::EMPTY; CHUNK_SIZE3],
            bounds: Aabb::new(
                Vec3::new(origin.0 as f32, origin.1 as f32, origin.2 as f32),
                Vec3::ZERO,
                Vec3::splat(size),
            ),
            mesh: None,
            colliders: None,
            owner_slot: None,
        }
    }

    /// Copy of the block data only: no caches, not registered anywhere.
    pub fn clone_blocks(&self) -> Self {
        let mut chunk = Self::new(self.coord);
        chunk.blocks = self.blocks;
        chunk
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn owner_slot(&self) -> Option<usize> {
        self.owner_slot
    }

    pub(crate) fn set_owner_slot(&mut self, slot: Option<usize>) {
        self.owner_slot = slot;
    }

    pub fn world_coord_of(&self, x: usize, y: usize, z: usize) -> WorldCoord {
        self.coord.to_world_coord().offset(x as isize, y as isize, z as isize)
    }

    pub fn block_at(&self, x: usize, y: usize, z: usize) -> &Block {
        &self.blocks[BlockCoord(x, y, z).get_block_idx()]
    }

    pub fn block_at_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Block {
        &mut self.blocks[BlockCoord(x, y, z).get_block_idx()]
    }

    pub fn get_block(&self, coord: &BlockCoord) -> Block {
        self.blocks[coord.get_block_idx()]
    }

    /// Writes a block type. Does not touch cached mesh or colliders.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        self.block_at_mut(x, y, z).block_type = block_type;
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.is_empty())
    }

    pub fn count_non_empty(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_empty()).count()
    }

    /// Chunk-local visibility test.
    ///
    /// Blocks on the six boundary planes always count as visible; whether they
    /// are really covered depends on the neighbouring chunk, which is resolved
    /// per face during meshing.
    pub fn is_block_visible(&self, x: usize, y: usize, z: usize) -> bool {
        if !self.block_at(x, y, z).is_visible() {
            return false;
        }

        if BlockCoord(x, y, z).is_on_boundary() {
            return true;
        }

        !self.block_at(x, y + 1, z).is_visible()
            || !self.block_at(x, y - 1, z).is_visible()
            || !self.block_at(x + 1, y, z).is_visible()
            || !self.block_at(x - 1, y, z).is_visible()
            || !self.block_at(x, y, z + 1).is_visible()
            || !self.block_at(x, y, z - 1).is_visible()
    }

    pub fn is_block_movement_blocking(&self, x: usize, y: usize, z: usize) -> bool {
        self.block_at(x, y, z).is_movement_blocking()
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Returns the cached mesh, building it first if there is none.
    pub fn get_mesh(&mut self, lookup: &dyn BlockLookup, textures: &TextureIndexes) -> &Mesh {
        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => self.compute_mesh(lookup, textures),
        };
        self.mesh.insert(mesh)
    }

    pub(crate) fn store_mesh(&mut self, mesh: Mesh) -> &Mesh {
        self.mesh.insert(mesh)
    }

    pub fn colliders(&self) -> Option<&ChunkColliders> {
        self.colliders.as_ref()
    }

    pub(crate) fn store_colliders(&mut self, colliders: ChunkColliders) -> &ChunkColliders {
        self.colliders.insert(colliders)
    }

    /// Rebuilds the collider cache from the current blocks.
    pub fn update_colliders(&mut self) -> &ChunkColliders {
        let colliders = self.compute_colliders();
        self.store_colliders(colliders)
    }

    pub fn invalidate_mesh(&mut self) {
        self.mesh = None;
    }

    pub fn invalidate_colliders(&mut self) {
        self.colliders = None;
    }

    pub fn invalidate(&mut self) {
        self.invalidate_mesh();
        self.invalidate_colliders();
    }

    /// Releases everything derived from the block data.
    pub fn unload(&mut self) {
        if self.mesh.is_some() || self.colliders.is_some() {
            debug!(coord = ?self.coord, "releasing chunk caches");
        }
        self.invalidate();
    }

    /// Builds one static box per maximal run of blocking blocks along Z.
    ///
    /// X and Y are never merged, so a solid chunk yields `CHUNK_SIZE²` boxes.
    pub fn compute_colliders(&self) -> ChunkColliders {
        let mut runs = Vec::new();

        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let mut start_z: Option<usize> = None;
                for z in 0..CHUNK_SIZE {
                    if self.is_block_movement_blocking(x, y, z) {
                        let start = *start_z.get_or_insert(z);
                        if z == CHUNK_SIZE - 1 {
                            runs.push((x, y, start, z));
                            start_z = None;
                        }
                    } else if let Some(start) = start_z.take() {
                        runs.push((x, y, start, z - 1));
                    }
                }
            }
        }

        let origin = self.coord.to_world_coord();
        let mut result = ChunkColliders {
            colliders: Vec::with_capacity(runs.len()),
            boxes: Vec::with_capacity(runs.len()),
        };
        for (x, y, start_z, end_z) in runs {
            let run = CollisionRun {
                x: origin.0 + x as isize,
                y: origin.1 + y as isize,
                start_z: origin.2 + start_z as isize,
                end_z: origin.2 + end_z as isize,
            };
            let (center, half) = (run.center(), run.half_size());
            result.colliders.push(CollisionCube::new_static(center, half));
            result.boxes.push(Aabb::new(center, -half, half));
        }

        debug!(coord = ?self.coord, colliders = result.len(), "built chunk colliders");
        result
    }
}

/// A standalone chunk can serve as its own neighbour context.
impl BlockLookup for Chunk {
    fn block_at_world(&self, coord: &WorldCoord) -> Option<Block> {
        if coord.to_chunk_coord() != self.coord {
            return None;
        }
        Some(self.get_block(&coord.to_block_coord()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::world::block::{BLOCK_TYPE_DIRT, BLOCK_TYPE_GRASS, BLOCK_TYPE_STONES};

    fn textures() -> TextureIndexes {
        [("Grass", 0), ("Dirt", 1), ("Stones", 2)].into_iter().collect()
    }

    #[test]
    fn set_then_read_round_trips_everywhere() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    let t = ((x + 2 * y + 3 * z) % 4) as BlockType;
                    chunk.set_block(x, y, z, t);
                }
            }
        }
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    let t = ((x + 2 * y + 3 * z) % 4) as BlockType;
                    assert_eq!(chunk.block_at(x, y, z).block_type, t);
                }
            }
        }
    }

    #[test]
    fn block_at_mut_writes_in_place() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        chunk.block_at_mut(1, 2, 3).block_type = BLOCK_TYPE_DIRT;
        assert_eq!(chunk.get_block(&BlockCoord(1, 2, 3)), Block::new(BLOCK_TYPE_DIRT));
        assert_eq!(chunk.count_non_empty(), 1);
    }

    #[test]
    fn empty_blocks_are_invisible_and_passable() {
        let chunk = Chunk::new(ChunkCoord(0, 0, 0));
        assert!(chunk.is_empty());
        assert!(!chunk.is_block_visible(0, 0, 0));
        assert!(!chunk.is_block_visible(7, 7, 7));
        assert!(!chunk.is_block_movement_blocking(7, 7, 7));
    }

    #[test]
    fn boundary_blocks_are_always_visible() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        // fill everything: every interior block is covered, every boundary block is not
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    chunk.set_block(x, y, z, BLOCK_TYPE_STONES);
                }
            }
        }
        assert!(chunk.is_block_visible(0, 5, 5));
        assert!(chunk.is_block_visible(5, CHUNK_SIZE - 1, 5));
        assert!(chunk.is_block_visible(5, 5, 0));
        assert!(!chunk.is_block_visible(5, 5, 5));
        assert!(!chunk.is_block_visible(1, 1, 1));
    }

    #[test]
    fn interior_block_visible_once_a_neighbour_is_removed() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        for y in 4..7 {
            for x in 4..7 {
                for z in 4..7 {
                    chunk.set_block(x, y, z, BLOCK_TYPE_GRASS);
                }
            }
        }
        assert!(!chunk.is_block_visible(5, 5, 5));
        chunk.set_block(5, 5, 6, 0);
        assert!(chunk.is_block_visible(5, 5, 5));
        assert!(chunk.is_block_movement_blocking(5, 5, 5));
    }

    #[test]
    fn single_run_of_five_makes_one_collider() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        for z in 4..9 {
            chunk.set_block(2, 3, z, BLOCK_TYPE_DIRT);
        }
        let colliders = chunk.compute_colliders();
        assert_eq!(colliders.len(), 1);
        let cube = colliders.colliders[0];
        assert_eq!(cube.half_size, Vec3::new(0.5, 0.5, 2.5));
        assert_eq!(cube.position, Vec3::new(2.5, 3.5, 4.0 + 2.5));
        assert!(cube.has_infinite_mass());
        assert_eq!(colliders.boxes[0], cube.to_aabb());
    }

    #[test]
    fn separated_runs_make_separate_colliders() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        for z in [0, 1, 2, 4, 5, 6] {
            chunk.set_block(0, 0, z, BLOCK_TYPE_STONES);
        }
        let colliders = chunk.compute_colliders();
        assert_eq!(colliders.len(), 2);
        assert_eq!(colliders.boxes[0].world_min().z, 0.0);
        assert_eq!(colliders.boxes[0].world_max().z, 3.0);
        assert_eq!(colliders.boxes[1].world_min().z, 4.0);
        assert_eq!(colliders.boxes[1].world_max().z, 7.0);
    }

    #[test]
    fn run_touching_column_end_is_closed() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        for z in 10..CHUNK_SIZE {
            chunk.set_block(1, 1, z, BLOCK_TYPE_STONES);
        }
        let colliders = chunk.compute_colliders();
        assert_eq!(colliders.len(), 1);
        assert_eq!(colliders.colliders[0].half_size.z, 3.0);
        assert_eq!(colliders.boxes[0].world_max().z, CHUNK_SIZE as f32);
    }

    #[test]
    fn neighbouring_columns_are_not_merged() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        chunk.set_block(0, 0, 0, BLOCK_TYPE_STONES);
        chunk.set_block(1, 0, 0, BLOCK_TYPE_STONES);
        chunk.set_block(0, 1, 0, BLOCK_TYPE_STONES);
        assert_eq!(chunk.compute_colliders().len(), 3);
        assert!(Chunk::new(ChunkCoord(0, 0, 0)).compute_colliders().is_empty());
    }

    #[test]
    fn colliders_are_in_world_space() {
        let mut chunk = Chunk::new(ChunkCoord(1, 0, 2));
        chunk.set_block(0, 0, 0, BLOCK_TYPE_GRASS);
        let colliders = chunk.update_colliders().clone();
        assert_eq!(colliders.boxes[0].world_min(), Vec3::new(16.0, 0.0, 32.0));
        assert_eq!(chunk.colliders(), Some(&colliders));
        chunk.invalidate_colliders();
        assert!(chunk.colliders().is_none());
    }

    #[test]
    fn bounds_cover_the_whole_chunk() {
        let chunk = Chunk::new(ChunkCoord(1, 0, 2));
        assert_eq!(chunk.bounds().world_min(), Vec3::new(16.0, 0.0, 32.0));
        assert_eq!(chunk.bounds().world_max(), Vec3::new(32.0, 16.0, 48.0));
    }

    #[test]
    fn mesh_cache_survives_edits_until_invalidated() {
        let mut chunk = Chunk::new(ChunkCoord(0, 0, 0));
        chunk.set_block(3, 3, 3, BLOCK_TYPE_GRASS);
        assert_eq!(chunk.get_mesh(&EmptyWorld, &textures()).face_count, 6);

        chunk.set_block(8, 8, 8, BLOCK_TYPE_GRASS);
        assert_eq!(chunk.mesh().map(|m| m.face_count), Some(6));

        chunk.invalidate_mesh();
        assert!(chunk.mesh().is_none());
        assert_eq!(chunk.get_mesh(&EmptyWorld, &textures()).face_count, 12);
    }

    #[test]
    fn clone_blocks_drops_caches_and_owner() {
        let mut chunk = Chunk::new(ChunkCoord(2, 0, 0));
        chunk.set_block(0, 0, 0, BLOCK_TYPE_DIRT);
        chunk.set_owner_slot(Some(4));
        chunk.update_colliders();
        chunk.get_mesh(&EmptyWorld, &textures());

        let copy = chunk.clone_blocks();
        assert_eq!(copy.coord(), ChunkCoord(2, 0, 0));
        assert_eq!(copy.block_at(0, 0, 0).block_type, BLOCK_TYPE_DIRT);
        assert!(copy.mesh().is_none());
        assert!(copy.colliders().is_none());
        assert!(copy.owner_slot().is_none());

        chunk.unload();
        assert!(chunk.mesh().is_none() && chunk.colliders().is_none());
    }

    #[test]
    fn chunk_answers_lookups_only_for_its_own_volume() {
        let mut chunk = Chunk::new(ChunkCoord(1, 0, 0));
        chunk.set_block(0, 0, 0, BLOCK_TYPE_STONES);
        assert_eq!(chunk.block_at_world(&WorldCoord(16, 0, 0)), Some(Block::new(BLOCK_TYPE_STONES)));
        assert_eq!(chunk.block_at_world(&WorldCoord(17, 0, 0)), Some(Block::EMPTY));
        assert_eq!(chunk.block_at_world(&WorldCoord(15, 0, 0)), None);
    }
}
