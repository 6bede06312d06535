use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl Default for BlockId {
    fn default() -> Self {
        BlockId::AIR
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::AIR => write!(f, "Air"),
            BlockId::WATER => write!(f, "Water"),
            BlockId::SAND => write!(f, "Sand"),
            BlockId::GRASS => write!(f, "Grass"),
            BlockId::DIRT => write!(f, "Dirt"),
            BlockId::STONE => write!(f, "Stone"),
            _ => write!(f, "Block({})", self.0),
        }
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const WATER: BlockId = BlockId(1);
    pub const SAND: BlockId = BlockId(2);
    pub const GRASS: BlockId = BlockId(3);
    pub const DIRT: BlockId = BlockId(4);
    pub const STONE: BlockId = BlockId(5);

    /// Every block kind the terrain stage can emit
    pub const ALL: [BlockId; 6] = [
        BlockId::AIR,
        BlockId::WATER,
        BlockId::SAND,
        BlockId::GRASS,
        BlockId::DIRT,
        BlockId::STONE,
    ];

    /// Create a new BlockId from a raw u16 value
    pub const fn new(id: u16) -> Self {
        BlockId(id)
    }

    /// Neighbouring solid faces are drawn against transparent blocks
    pub const fn is_transparent(self) -> bool {
        matches!(self, BlockId::AIR | BlockId::WATER)
    }

    pub const fn is_water(self) -> bool {
        self.0 == BlockId::WATER.0
    }

    pub const fn is_air(self) -> bool {
        self.0 == BlockId::AIR.0
    }

    /// Full opaque cube: culls and is culled by its neighbours
    pub const fn is_solid(self) -> bool {
        !self.is_transparent()
    }

    /// Flat colour used when no texture is supplied for the block
    pub fn base_color(self) -> [u8; 4] {
        match self {
            BlockId::STONE => [128, 128, 128, 255],
            BlockId::DIRT => [140, 102, 76, 255],
            BlockId::GRASS => [76, 178, 76, 255],
            BlockId::SAND => [230, 217, 153, 255],
            BlockId::WATER => [51, 102, 204, 200],
            _ => [204, 204, 204, 255],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_attributes() {
        assert!(BlockId::AIR.is_transparent());
        assert!(BlockId::WATER.is_transparent());
        assert!(!BlockId::WATER.is_solid());
        for block in [BlockId::SAND, BlockId::GRASS, BlockId::DIRT, BlockId::STONE] {
            assert!(block.is_solid(), "{} should be solid", block);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(BlockId::STONE.to_string(), "Stone");
        assert_eq!(BlockId::new(99).to_string(), "Block(99)");
    }
}
