use crate::model::world::block::BlockType;
use crate::model::{CHUNK_SIZE, CHUNK_SIZE2};
use bytemuck::{Pod, Zeroable};

/// Interleaved position / normal / uv, the layout the GPU sink uploads verbatim.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Per-vertex integer attributes stored in their own buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct VertexCombo {
    /// slot in the texture array
    pub material_index: u32,
    /// bit 0: an edge neighbour is solid, bit 1: the corner neighbour is solid
    pub ao_flags: u32,
}

/// CPU-side chunk geometry, handed to the renderer as plain buffers.
///
/// Vertex positions are chunk-local; `location` is the world position of the
/// chunk's minimum corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub combos: Vec<VertexCombo>,
    pub indices: Vec<u32>,
    /// number of emitted quads (two triangles each)
    pub face_count: u32,
    pub location: [f32; 3],
    /// block types that had no texture slot during the build
    pub unmapped_block_types: Vec<BlockType>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pre-sizes every buffer for `faces` quads.
    pub fn with_face_capacity(faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(faces * 4),
            combos: Vec::with_capacity(faces * 4),
            indices: Vec::with_capacity(faces * 6),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> u32 {
        self.face_count * 2
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn combo_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.combos)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Moves vertices from chunk-local space to world space.
    pub fn offset_vertices_by(&mut self, coord: &ChunkCoord) {
        let coord = coord.to_world_coord();
        for v in self.vertices.iter_mut() {
            v.pos[0] += coord.0 as f32;
            v.pos[1] += coord.1 as f32;
            v.pos[2] += coord.2 as f32;
        }
        self.location = [0.0; 3];
    }
}

/// coordinates of a block in world space
#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub struct WorldCoord(pub isize, pub isize, pub isize);

impl WorldCoord {
    pub fn offset(&self, dx: isize, dy: isize, dz: isize) -> WorldCoord {
        WorldCoord(self.0 + dx, self.1 + dy, self.2 + dz)
    }

    /// Chunk that contains this block.
    pub fn to_chunk_coord(&self) -> ChunkCoord {
        ChunkCoord(
            self.0.div_euclid(CHUNK_SIZE as isize),
            self.1.div_euclid(CHUNK_SIZE as isize),
            self.2.div_euclid(CHUNK_SIZE as isize),
        )
    }

    /// Chunk-local coordinates
    pub fn to_block_coord(&self) -> BlockCoord {
        BlockCoord(
            self.0.rem_euclid(CHUNK_SIZE as isize) as usize,
            self.1.rem_euclid(CHUNK_SIZE as isize) as usize,
            self.2.rem_euclid(CHUNK_SIZE as isize) as usize,
        )
    }
}

// coordinates of a chunk in chunk space
#[derive(Debug, Default, Eq, Hash, PartialEq, Clone, Copy)]
pub struct ChunkCoord(pub isize, pub isize, pub isize);

impl ChunkCoord {
    /// The minimum corner of the chunk in world block coordinates.
    pub fn to_world_coord(&self) -> WorldCoord {
        WorldCoord(
            self.0 * CHUNK_SIZE as isize,
            self.1 * CHUNK_SIZE as isize,
            self.2 * CHUNK_SIZE as isize,
        )
    }
}

/// Chunk-local block coordinates (0-15 for each component)
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BlockCoord(pub usize, pub usize, pub usize);

impl BlockCoord {
    /// Offset into a chunk's block array: Y-major, then X, then Z.
    ///
    /// `(0,0,5) -> 5`, `(1,0,0) -> 16`, `(0,1,0) -> 256`.
    pub fn get_block_idx(&self) -> usize {
        debug_assert!(
            self.0 < CHUNK_SIZE && self.1 < CHUNK_SIZE && self.2 < CHUNK_SIZE,
            "block coordinate {:?} outside chunk",
            self
        );
        self.1 * CHUNK_SIZE2 + self.0 * CHUNK_SIZE + self.2
    }

    pub fn is_on_boundary(&self) -> bool {
        let max = CHUNK_SIZE - 1;
        self.0 == 0 || self.1 == 0 || self.2 == 0 || self.0 == max || self.1 == max || self.2 == max
    }
}
