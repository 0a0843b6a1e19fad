use std::collections::HashMap;
use std::fmt;

use super::block::{material_name, BlockType};

/// A block type could not be turned into a texture-array slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// the block type has no material name at all
    NoMaterialName { block_type: BlockType },
    /// the material exists but the caller's texture array has no slot for it
    Unmapped { block_type: BlockType, material: &'static str },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialError::NoMaterialName { block_type } => {
                write!(f, "no mapping for block type ({}) to a texture index", block_type)
            }
            MaterialError::Unmapped { block_type, material } => {
                write!(f, "material {:?} of block type ({}) is not in the texture array", material, block_type)
            }
        }
    }
}

impl std::error::Error for MaterialError {}

impl MaterialError {
    pub fn block_type(&self) -> BlockType {
        match self {
            MaterialError::NoMaterialName { block_type } | MaterialError::Unmapped { block_type, .. } => *block_type,
        }
    }
}

/// Material name -> texture-array slot, supplied by whoever owns the textures.
#[derive(Debug, Clone, Default)]
pub struct TextureIndexes {
    slots: HashMap<String, u32>,
}

impl TextureIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: impl Into<String>, slot: u32) -> Option<u32> {
        self.slots.insert(material.into(), slot)
    }

    pub fn get(&self, material: &str) -> Option<u32> {
        self.slots.get(material).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn resolve(&self, block_type: BlockType) -> Result<u32, MaterialError> {
        let material = material_name(block_type).ok_or(MaterialError::NoMaterialName { block_type })?;
        self.get(material).ok_or(MaterialError::Unmapped { block_type, material })
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for TextureIndexes {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(|(name, slot)| (name.into(), slot)).collect(),
        }
    }
}
