use tracing::{debug, error};

use super::block::BlockType;
use super::chunk::{BlockLookup, Chunk, CHUNK_SIZE};
use super::texture::TextureIndexes;
use crate::utils::{Mesh, Vertex, VertexCombo, WorldCoord};

/// The six faces of a block cube, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFace {
    Front,
    Right,
    Top,
    Left,
    Bottom,
    Back,
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Front,
        BlockFace::Right,
        BlockFace::Top,
        BlockFace::Left,
        BlockFace::Bottom,
        BlockFace::Back,
    ];

    /// Offset to the block this face looks at.
    pub fn direction(self) -> [isize; 3] {
        match self {
            BlockFace::Front => [0, 0, 1],
            BlockFace::Right => [1, 0, 0],
            BlockFace::Top => [0, 1, 0],
            BlockFace::Left => [-1, 0, 0],
            BlockFace::Bottom => [0, -1, 0],
            BlockFace::Back => [0, 0, -1],
        }
    }

    pub fn normal(self) -> [f32; 3] {
        let [x, y, z] = self.direction();
        [x as f32, y as f32, z as f32]
    }

    /// Quad corners relative to the block's minimum corner, wound so that
    /// `[0,1,2, 2,3,0]` faces outwards.
    pub fn corners(self) -> [[f32; 3]; 4] {
        match self {
            BlockFace::Front => [[1.0, 1.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
            BlockFace::Right => [[1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            BlockFace::Top => [[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
            BlockFace::Left => [[0.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            BlockFace::Bottom => [[1.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            BlockFace::Back => [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
        }
    }

    /// For each corner: two edge neighbours, then the diagonal corner neighbour.
    pub fn occlusion_offsets(self) -> &'static [[[isize; 3]; 3]; 4] {
        &AO_OFFSETS[self as usize]
    }
}

const FACE_UVS: [[f32; 2]; 4] = [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]];
const FACE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const AO_EDGE: u32 = 1 << 0;
const AO_CORNER: u32 = 1 << 1;

#[rustfmt::skip]
const AO_OFFSETS: [[[[isize; 3]; 3]; 4]; 6] = [
    // front
    [
        [[0, 1, 1], [1, 0, 1], [1, 1, 1]],
        [[0, 1, 1], [-1, 0, 1], [-1, 1, 1]],
        [[0, -1, 1], [-1, 0, 1], [-1, -1, 1]],
        [[0, -1, 1], [1, 0, 1], [1, -1, 1]],
    ],
    // right
    [
        [[1, 1, 0], [1, 0, -1], [1, 1, -1]],
        [[1, 1, 0], [1, 0, 1], [1, 1, 1]],
        [[1, -1, 0], [1, 0, 1], [1, -1, 1]],
        [[1, -1, 0], [1, 0, -1], [1, -1, -1]],
    ],
    // top
    [
        [[0, 1, -1], [1, 1, 0], [1, 1, -1]],
        [[0, 1, -1], [-1, 1, 0], [-1, 1, -1]],
        [[0, 1, 1], [-1, 1, 0], [-1, 1, 1]],
        [[0, 1, 1], [1, 1, 0], [1, 1, 1]],
    ],
    // left
    [
        [[-1, 1, 0], [-1, 0, 1], [-1, 1, 1]],
        [[-1, 1, 0], [-1, 0, -1], [-1, 1, -1]],
        [[-1, -1, 0], [-1, 0, -1], [-1, -1, -1]],
        [[-1, -1, 0], [-1, 0, 1], [-1, -1, 1]],
    ],
    // bottom
    [
        [[0, -1, 1], [1, -1, 0], [1, -1, 1]],
        [[0, -1, 1], [-1, -1, 0], [-1, -1, 1]],
        [[0, -1, -1], [-1, -1, 0], [-1, -1, -1]],
        [[0, -1, -1], [1, -1, 0], [1, -1, -1]],
    ],
    // back
    [
        [[0, 1, -1], [-1, 0, -1], [-1, 1, -1]],
        [[0, 1, -1], [1, 0, -1], [1, 1, -1]],
        [[0, -1, -1], [1, 0, -1], [1, -1, -1]],
        [[0, -1, -1], [-1, 0, -1], [-1, -1, -1]],
    ],
];

fn is_visible_at(lookup: &dyn BlockLookup, coord: &WorldCoord) -> bool {
    lookup.block_at_world(coord).map_or(false, |b| b.is_visible())
}

fn ambient_occlusion(lookup: &dyn BlockLookup, block: &WorldCoord, offsets: &[[isize; 3]; 3]) -> u32 {
    let at = |[dx, dy, dz]: [isize; 3]| is_visible_at(lookup, &block.offset(dx, dy, dz));

    let mut flags = 0;
    if at(offsets[0]) || at(offsets[1]) {
        flags |= AO_EDGE;
    }
    if at(offsets[2]) {
        flags |= AO_CORNER;
    }
    flags
}

impl Chunk {
    /// Builds the chunk's render geometry without touching any cache.
    ///
    /// `lookup` resolves neighbours across chunk borders: a face is dropped
    /// when the block it looks at is known and visible. Vertex positions are
    /// chunk-local; the chunk origin goes into `Mesh::location`.
    pub fn compute_mesh(&self, lookup: &dyn BlockLookup, textures: &TextureIndexes) -> Mesh {
        let mut visible = Vec::new();
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    if self.is_block_visible(x, y, z) {
                        visible.push((x, y, z));
                    }
                }
            }
        }

        let mut mesh = Mesh::with_face_capacity(visible.len() * BlockFace::ALL.len());
        let origin = self.coord().to_world_coord();
        mesh.location = [origin.0 as f32, origin.1 as f32, origin.2 as f32];

        for (x, y, z) in visible {
            let block_type = self.block_at(x, y, z).block_type;
            let world = self.world_coord_of(x, y, z);
            let offset = [x as f32, y as f32, z as f32];

            for face in BlockFace::ALL {
                let [dx, dy, dz] = face.direction();
                if is_visible_at(lookup, &world.offset(dx, dy, dz)) {
                    continue;
                }

                let material_index = resolve_material(textures, block_type, &mut mesh.unmapped_block_types);
                let base = mesh.face_count * 4;
                let normal = face.normal();

                for (i, corner) in face.corners().iter().enumerate() {
                    mesh.vertices.push(Vertex {
                        pos: [corner[0] + offset[0], corner[1] + offset[1], corner[2] + offset[2]],
                        normal,
                        uv: FACE_UVS[i],
                    });
                    mesh.combos.push(VertexCombo {
                        material_index,
                        ao_flags: ambient_occlusion(lookup, &world, &face.occlusion_offsets()[i]),
                    });
                }
                mesh.indices.extend(FACE_INDICES.iter().map(|i| base + i));
                mesh.face_count += 1;
            }
        }

        debug!(
            coord = ?self.coord(),
            faces = mesh.face_count,
            triangles = mesh.triangle_count(),
            "built chunk mesh"
        );
        mesh
    }
}

/// Unmapped types are reported once per build and drawn with slot 0.
fn resolve_material(textures: &TextureIndexes, block_type: BlockType, unmapped: &mut Vec<BlockType>) -> u32 {
    match textures.resolve(block_type) {
        Ok(slot) => slot,
        Err(err) => {
            if !unmapped.contains(&block_type) {
                error!("{}", err);
                unmapped.push(block_type);
            }
            0
        }
    }
}
