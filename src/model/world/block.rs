/// Material tag of a block. `0` is air; every other value is a distinct material.
pub type BlockType = u32;

pub const BLOCK_TYPE_EMPTY: BlockType = 0;
pub const BLOCK_TYPE_GRASS: BlockType = 1;
pub const BLOCK_TYPE_STONES: BlockType = 2;
pub const BLOCK_TYPE_DIRT: BlockType = 3;

/// A single cell of the landscape grid. Carries nothing but its type.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Block {
    pub block_type: BlockType,
}

impl Block {
    pub const EMPTY: Block = Block { block_type: BLOCK_TYPE_EMPTY };

    pub fn new(block_type: BlockType) -> Self {
        Self { block_type }
    }

    pub fn is_empty(self) -> bool {
        self.block_type == BLOCK_TYPE_EMPTY
    }

    /// Whether the block is drawn at all.
    pub fn is_visible(self) -> bool {
        self.block_type != BLOCK_TYPE_EMPTY
    }

    /// Whether entities collide with the block. Currently the same test as
    /// [`Block::is_visible`]; the two are expected to diverge (e.g. glass).
    pub fn is_movement_blocking(self) -> bool {
        self.block_type != BLOCK_TYPE_EMPTY
    }

    /// Name used to look the block's texture up in a texture array.
    pub fn material_name(self) -> Option<&'static str> {
        material_name(self.block_type)
    }
}

pub fn material_name(block_type: BlockType) -> Option<&'static str> {
    match block_type {
        BLOCK_TYPE_GRASS => Some("Grass"),
        BLOCK_TYPE_STONES => Some("Stones"),
        BLOCK_TYPE_DIRT => Some("Dirt"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_is_neither_visible_nor_blocking() {
        let b = Block::EMPTY;
        assert!(b.is_empty());
        assert!(!b.is_visible());
        assert!(!b.is_movement_blocking());
        assert_eq!(Block::default(), Block::EMPTY);
    }

    #[test]
    fn any_positive_type_is_solid() {
        for t in [BLOCK_TYPE_GRASS, BLOCK_TYPE_DIRT, 77] {
            let b = Block::new(t);
            assert!(b.is_visible());
            assert!(b.is_movement_blocking());
        }
    }

    #[test]
    fn only_known_types_have_material_names() {
        assert_eq!(Block::new(BLOCK_TYPE_STONES).material_name(), Some("Stones"));
        assert_eq!(Block::new(77).material_name(), None);
        assert_eq!(Block::EMPTY.material_name(), None);
    }
}
