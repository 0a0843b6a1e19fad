use glam::Vec3;
use tracing::{debug, warn};

use super::block::{Block, BlockType};
use super::chunk::{BlockLookup, Chunk, CHUNK_SIZE};
use super::texture::TextureIndexes;
use crate::utils::{BlockCoord, ChunkCoord, Mesh, WorldCoord};

/// First collider box hit by [`Manager::raycast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// distance along the ray, in units of the ray direction
    pub distance: f32,
    pub point: Vec3,
    pub chunk: ChunkCoord,
    /// index into the chunk's collider list
    pub collider: usize,
}

/// Totals from [`Manager::rebuild_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub chunks: usize,
    pub faces: usize,
    pub colliders: usize,
}

/// Owns a bounded box of chunks, addressed by chunk coordinate.
///
/// Slots are linearized `ly * sx * sz + lx * sz + lz` over the local chunk
/// coordinate, which differs from the block order inside a chunk.
#[derive(Debug)]
pub struct Manager {
    /// chunk coordinate of the slot at local `(0,0,0)`
    origin: ChunkCoord,
    /// number of chunks along each axis
    extents: [usize; 3],
    slots: Vec<Option<Box<Chunk>>>,
}

impl Manager {
    /// A cube of `size³` chunks.
    pub fn new(size: usize, origin: ChunkCoord) -> Self {
        Self::with_extents([size; 3], origin)
    }

    pub fn with_extents(extents: [usize; 3], origin: ChunkCoord) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(extents[0] * extents[1] * extents[2], || None);
        Self { origin, extents, slots }
    }

    pub fn origin(&self) -> ChunkCoord {
        self.origin
    }

    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    /// Local chunk coordinate, or `None` outside the managed box.
    fn local_coord(&self, coord: &ChunkCoord) -> Option<[usize; 3]> {
        let local = [coord.0 - self.origin.0, coord.1 - self.origin.1, coord.2 - self.origin.2];
        let mut out = [0; 3];
        for axis in 0..3 {
            if local[axis] < 0 || local[axis] >= self.extents[axis] as isize {
                return None;
            }
            out[axis] = local[axis] as usize;
        }
        Some(out)
    }

    fn slot_index(&self, [lx, ly, lz]: [usize; 3]) -> usize {
        let [sx, _, sz] = self.extents;
        ly * sx * sz + lx * sz + lz
    }

    /// Slot a chunk at `coord` would occupy.
    pub fn slot_of(&self, coord: &ChunkCoord) -> Option<usize> {
        self.local_coord(coord).map(|local| self.slot_index(local))
    }

    /// Stores the chunk and returns its slot, or hands it back when it lies
    /// outside the managed box. An occupied slot is overwritten.
    pub fn try_register_chunk(&mut self, mut chunk: Box<Chunk>) -> Result<usize, Box<Chunk>> {
        let coord = chunk.coord();
        let Some(slot) = self.slot_of(&coord) else {
            debug!(?coord, "chunk outside manager, not registered");
            return Err(chunk);
        };

        if self.slots[slot].is_some() {
            warn!(?coord, slot, "replacing an already registered chunk");
        }

        chunk.set_owner_slot(Some(slot));
        self.slots[slot] = Some(chunk);
        debug!(?coord, slot, "registered chunk");
        Ok(slot)
    }

    pub fn register_chunk(&mut self, chunk: Box<Chunk>) -> bool {
        self.try_register_chunk(chunk).is_ok()
    }

    /// Registers every chunk it can, returns how many were accepted.
    pub fn register_chunks(&mut self, chunks: impl IntoIterator<Item = Box<Chunk>>) -> usize {
        chunks.into_iter().map(|c| self.register_chunk(c)).filter(|ok| *ok).count()
    }

    pub fn unload_chunk(&mut self, coord: &ChunkCoord) -> Option<Box<Chunk>> {
        let slot = self.slot_of(coord)?;
        let mut chunk = self.slots[slot].take()?;
        chunk.unload();
        chunk.set_owner_slot(None);
        debug!(?coord, slot, "unloaded chunk");
        Some(chunk)
    }

    pub fn chunk_at(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.slots[self.slot_of(coord)?].as_deref()
    }

    pub fn chunk_at_mut(&mut self, coord: &ChunkCoord) -> Option<&mut Chunk> {
        let slot = self.slot_of(coord)?;
        self.slots[slot].as_deref_mut()
    }

    /// Populated chunks in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().count()
    }

    /// Owning slot plus chunk-local coordinate of a world block, if it lies
    /// inside the managed volume.
    fn locate(&self, world: &WorldCoord) -> Option<(usize, BlockCoord)> {
        let slot = self.slot_of(&world.to_chunk_coord())?;
        Some((slot, world.to_block_coord()))
    }

    /// The block and its chunk, or `None` outside the managed volume or when
    /// the owning slot is empty.
    pub fn get_block_at(&self, x: isize, y: isize, z: isize) -> Option<(&Block, &Chunk)> {
        let (slot, BlockCoord(bx, by, bz)) = self.locate(&WorldCoord(x, y, z))?;
        let chunk = self.slots[slot].as_deref()?;
        Some((chunk.block_at(bx, by, bz), chunk))
    }

    pub fn get_block_at_mut(&mut self, x: isize, y: isize, z: isize) -> Option<&mut Block> {
        let (slot, BlockCoord(bx, by, bz)) = self.locate(&WorldCoord(x, y, z))?;
        let chunk = self.slots[slot].as_deref_mut()?;
        Some(chunk.block_at_mut(bx, by, bz))
    }

    /// Writes one block, creating and registering its chunk first if the slot
    /// is empty. Caches are left alone.
    ///
    /// Returns `None` when the block lies outside the managed volume.
    pub fn set_block_at(&mut self, x: isize, y: isize, z: isize, block_type: BlockType) -> Option<&mut Chunk> {
        let world = WorldCoord(x, y, z);
        let (slot, BlockCoord(bx, by, bz)) = self.locate(&world)?;

        let chunk = self.slots[slot].get_or_insert_with(|| {
            let coord = world.to_chunk_coord();
            debug!(?coord, slot, "creating chunk for block write");
            let mut chunk = Box::new(Chunk::new(coord));
            chunk.set_owner_slot(Some(slot));
            chunk
        });
        chunk.set_block(bx, by, bz, block_type);
        Some(&mut **chunk)
    }

    /// World Y of the topmost non-empty block in a column, `0` if there is
    /// none. `local_x` and `local_z` are block offsets from the manager's
    /// minimum corner. Unloaded chunks count as empty.
    pub fn get_height_at(&self, local_x: usize, local_z: usize) -> isize {
        let (cx, cz) = (local_x / CHUNK_SIZE, local_z / CHUNK_SIZE);
        if cx >= self.extents[0] || cz >= self.extents[2] {
            return 0;
        }
        let (bx, bz) = (local_x % CHUNK_SIZE, local_z % CHUNK_SIZE);

        let base_y = self.origin.1 * CHUNK_SIZE as isize;
        let mut height = 0;
        for ly in 0..self.extents[1] {
            let Some(chunk) = self.slots[self.slot_index([cx, ly, cz])].as_deref() else {
                continue;
            };
            for y in 0..CHUNK_SIZE {
                if !chunk.block_at(bx, y, bz).is_empty() {
                    height = base_y + (ly * CHUNK_SIZE + y) as isize;
                }
            }
        }
        height
    }

    /// Rebuilds one chunk's mesh with this manager as neighbour context.
    pub fn rebuild_mesh(&mut self, coord: &ChunkCoord, textures: &TextureIndexes) -> Option<&Mesh> {
        let slot = self.slot_of(coord)?;
        let mesh = self.slots[slot].as_deref()?.compute_mesh(&*self, textures);
        self.slots[slot].as_deref_mut().map(|c| c.store_mesh(mesh))
    }

    /// Cached mesh for a chunk, built on first request.
    pub fn mesh_for(&mut self, coord: &ChunkCoord, textures: &TextureIndexes) -> Option<&Mesh> {
        if self.chunk_at(coord)?.mesh().is_none() {
            return self.rebuild_mesh(coord, textures);
        }
        self.chunk_at(coord).and_then(Chunk::mesh)
    }

    pub fn rebuild_colliders(&mut self, coord: &ChunkCoord) -> Option<usize> {
        Some(self.chunk_at_mut(coord)?.update_colliders().len())
    }

    /// Rebuilds mesh and colliders of every populated chunk.
    pub fn rebuild_all(&mut self, textures: &TextureIndexes) -> BuildSummary {
        let mut summary = BuildSummary::default();
        for slot in 0..self.slots.len() {
            let Some(chunk) = self.slots[slot].as_deref() else {
                continue;
            };
            let mesh = chunk.compute_mesh(&*self, textures);
            let colliders = chunk.compute_colliders();

            summary.chunks += 1;
            summary.faces += mesh.face_count as usize;
            summary.colliders += colliders.len();

            if let Some(chunk) = self.slots[slot].as_deref_mut() {
                chunk.store_mesh(mesh);
                chunk.store_colliders(colliders);
            }
        }
        debug!(?summary, "rebuilt all chunks");
        summary
    }

    /// Nearest hit against the cached collider boxes within `max_distance`.
    ///
    /// Chunks without cached colliders are not considered.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;

        for chunk in self.chunks() {
            let Some(colliders) = chunk.colliders() else {
                continue;
            };
            match chunk.bounds().intersect_ray(origin, dir) {
                Some(t) if t <= max_distance => {}
                _ => continue,
            }

            for (i, aabb) in colliders.boxes.iter().enumerate() {
                let Some(t) = aabb.intersect_ray(origin, dir) else {
                    continue;
                };
                if t > max_distance || best.is_some_and(|b| b.distance <= t) {
                    continue;
                }
                best = Some(RayHit {
                    distance: t,
                    point: origin + dir * t,
                    chunk: chunk.coord(),
                    collider: i,
                });
            }
        }
        best
    }
}

impl BlockLookup for Manager {
    fn block_at_world(&self, coord: &WorldCoord) -> Option<Block> {
        self.get_block_at(coord.0, coord.1, coord.2).map(|(block, _)| *block)
    }
}
