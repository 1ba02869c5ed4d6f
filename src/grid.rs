use crate::SimError;
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid3 {
    width: usize,
    height: usize,
    depth: usize,
}

impl Grid3 {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        assert!(depth > 0, "depth must be > 0");
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn try_new(width: usize, height: usize, depth: usize) -> Result<Self, SimError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(SimError::InvalidDimensions {
                dims: UVec3::new(width as u32, height as u32, depth as u32),
            });
        }
        Ok(Self::new(width, height, depth))
    }

    pub fn cube(len: usize) -> Self {
        Self::new(len, len, len)
    }

    pub fn from_dims(dims: UVec3) -> Result<Self, SimError> {
        Self::try_new(dims.x as usize, dims.y as usize, dims.z as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dims(&self) -> UVec3 {
        UVec3::new(self.width as u32, self.height as u32, self.depth as u32)
    }

    pub fn size(&self) -> usize {
        self.width * self.height * self.depth
    }

    pub fn contains(&self, gid: UVec3) -> bool {
        (gid.x as usize) < self.width && (gid.y as usize) < self.height && (gid.z as usize) < self.depth
    }

    pub fn idx(&self, gid: UVec3) -> usize {
        debug_assert!(self.contains(gid));
        (gid.z as usize * self.height + gid.y as usize) * self.width + gid.x as usize
    }

    pub fn coord(&self, i: usize) -> UVec3 {
        debug_assert!(i < self.size());
        let x = i % self.width;
        let y = (i / self.width) % self.height;
        let z = i / (self.width * self.height);
        UVec3::new(x as u32, y as u32, z as u32)
    }

    pub fn clamp_coord(&self, x: i32, y: i32, z: i32) -> UVec3 {
        let cx = x.clamp(0, self.width as i32 - 1);
        let cy = y.clamp(0, self.height as i32 - 1);
        let cz = z.clamp(0, self.depth as i32 - 1);
        UVec3::new(cx as u32, cy as u32, cz as u32)
    }

    pub fn is_boundary(&self, gid: UVec3) -> bool {
        gid.x == 0
            || gid.y == 0
            || gid.z == 0
            || gid.x as usize + 1 >= self.width
            || gid.y as usize + 1 >= self.height
            || gid.z as usize + 1 >= self.depth
    }

    pub fn is_interior(&self, gid: UVec3) -> bool {
        self.contains(gid) && !self.is_boundary(gid)
    }

    pub fn cell_center(&self, gid: UVec3) -> Vec3 {
        (gid.as_vec3() + Vec3::splat(0.5)) / self.dims().as_vec3()
    }

    pub fn normalized_to_index(&self, uvw: Vec3) -> Vec3 {
        uvw * self.dims().as_vec3() - Vec3::splat(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_and_coord_round_trip() {
        let grid = Grid3::new(3, 4, 5);
        let gid = UVec3::new(2, 1, 3);
        let i = grid.idx(gid);
        assert_eq!(i, (3 * 4 + 1) * 3 + 2);
        assert_eq!(grid.coord(i), gid);
    }

    #[test]
    fn boundary_covers_every_face() {
        let grid = Grid3::cube(4);
        assert!(grid.is_boundary(UVec3::new(0, 2, 2)));
        assert!(grid.is_boundary(UVec3::new(3, 2, 2)));
        assert!(grid.is_boundary(UVec3::new(2, 0, 2)));
        assert!(grid.is_boundary(UVec3::new(2, 3, 2)));
        assert!(grid.is_boundary(UVec3::new(2, 2, 0)));
        assert!(grid.is_boundary(UVec3::new(2, 2, 3)));
        assert!(grid.is_interior(UVec3::new(1, 2, 1)));
        assert!(!grid.is_interior(UVec3::new(4, 1, 1)));
    }

    #[test]
    fn cell_center_is_normalized() {
        let grid = Grid3::new(4, 2, 8);
        let center = grid.cell_center(UVec3::new(0, 1, 7));
        assert_eq!(center, Vec3::new(0.125, 0.75, 0.9375));
        let index = grid.normalized_to_index(center);
        assert!((index - Vec3::new(0.0, 1.0, 7.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn try_new_rejects_empty_axis() {
        assert!(matches!(
            Grid3::try_new(4, 0, 4),
            Err(SimError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn clamp_coord_stays_in_grid() {
        let grid = Grid3::new(3, 3, 3);
        assert_eq!(grid.clamp_coord(-1, 5, 1), UVec3::new(0, 2, 1));
    }
}
