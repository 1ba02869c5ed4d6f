use crate::field::{should_parallel, Field3, ScalarField3};
use glam::Vec3;
use rayon::prelude::*;

pub type VecField3 = Field3<Vec3>;

impl Field3<Vec3> {
    pub fn max_speed(&self) -> f32 {
        let data = self.as_slice();
        if should_parallel(data.len()) {
            data.par_iter()
                .map(|value| value.length())
                .reduce(|| 0.0_f32, f32::max)
        } else {
            data.iter().map(|value| value.length()).fold(0.0_f32, f32::max)
        }
    }

    pub fn energy(&self) -> f32 {
        let data = self.as_slice();
        if should_parallel(data.len()) {
            data.par_iter().map(|value| value.length_squared()).sum()
        } else {
            data.iter().map(|value| value.length_squared()).sum()
        }
    }

    pub fn component(&self, axis: usize) -> ScalarField3 {
        assert!(axis < 3, "axis must be 0, 1 or 2");
        ScalarField3::from_fn(self.grid(), |gid| self.get(gid)[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid3;
    use glam::UVec3;

    #[test]
    fn component_extracts_axis() {
        let field = VecField3::from_fn(Grid3::cube(3), |gid| {
            Vec3::new(gid.x as f32, gid.y as f32, gid.z as f32)
        });
        let y = field.component(1);
        assert_eq!(y.get(UVec3::new(0, 2, 1)), 2.0);
    }

    #[test]
    fn max_speed_and_energy() {
        let field = VecField3::new(Grid3::new(2, 1, 1), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(field.max_speed(), 5.0);
        assert_eq!(field.energy(), 50.0);
    }
}
