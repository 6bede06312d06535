/// One of the six axis-aligned faces of a voxel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFace {
    Front,  // -Z
    Back,   // +Z
    Left,   // -X
    Right,  // +X
    Top,    // +Y
    Bottom, // -Y
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Front,
        BlockFace::Back,
        BlockFace::Left,
        BlockFace::Right,
        BlockFace::Top,
        BlockFace::Bottom,
    ];

    /// Voxel step towards the neighbour sharing this face
    pub const fn offset(self) -> [i32; 3] {
        match self {
            BlockFace::Front => [0, 0, -1],
            BlockFace::Back => [0, 0, 1],
            BlockFace::Left => [-1, 0, 0],
            BlockFace::Right => [1, 0, 0],
            BlockFace::Top => [0, 1, 0],
            BlockFace::Bottom => [0, -1, 0],
        }
    }

    pub fn normal(self) -> [f32; 3] {
        let [x, y, z] = self.offset();
        [x as f32, y as f32, z as f32]
    }

    /// Quad corners relative to the voxel's minimum corner.
    ///
    /// Order matches the atlas UV winding (top-left, top-right, bottom-right,
    /// bottom-left) and the `0,1,2 / 0,2,3` triangle split.
    pub const fn corners(self) -> [[f32; 3]; 4] {
        const C0: [f32; 3] = [0.0, 0.0, 0.0];
        const C1: [f32; 3] = [0.0, 0.0, 1.0];
        const C2: [f32; 3] = [0.0, 1.0, 0.0];
        const C3: [f32; 3] = [0.0, 1.0, 1.0];
        const C4: [f32; 3] = [1.0, 0.0, 0.0];
        const C5: [f32; 3] = [1.0, 0.0, 1.0];
        const C6: [f32; 3] = [1.0, 1.0, 0.0];
        const C7: [f32; 3] = [1.0, 1.0, 1.0];

        match self {
            BlockFace::Front => [C0, C4, C6, C2],
            BlockFace::Back => [C5, C1, C3, C7],
            BlockFace::Left => [C1, C0, C2, C3],
            BlockFace::Right => [C4, C5, C7, C6],
            BlockFace::Top => [C2, C6, C7, C3],
            BlockFace::Bottom => [C1, C5, C4, C0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_lie_on_face_plane() {
        for face in BlockFace::ALL {
            let [ox, oy, oz] = face.offset();
            for corner in face.corners() {
                // A +axis face sits at 1.0 on that axis, a -axis face at 0.0
                let check = |step: i32, value: f32| match step {
                    1 => value == 1.0,
                    -1 => value == 0.0,
                    _ => true,
                };
                assert!(check(ox, corner[0]) && check(oy, corner[1]) && check(oz, corner[2]));
            }
        }
    }

    #[test]
    fn test_offsets_are_unit_and_distinct() {
        let mut seen = std::collections::HashSet::new();
        for face in BlockFace::ALL {
            let o = face.offset();
            assert_eq!(o.iter().map(|v| v.abs()).sum::<i32>(), 1);
            assert!(seen.insert(o));
        }
    }
}
