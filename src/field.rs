use crate::grid::Grid3;
use glam::{UVec3, Vec3};
use rayon::prelude::*;
use std::ops::{Add, Mul, Sub};
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("SMOKE_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

pub(crate) fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

pub trait Voxel:
    Copy + Default + PartialEq + Send + Sync + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
}

impl<T> Voxel for T where
    T: Copy
        + Default
        + PartialEq
        + Send
        + Sync
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<f32, Output = T>
{
}

fn lerp<T: Voxel>(a: T, b: T, t: f32) -> T {
    a + (b - a) * t
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field3<T> {
    grid: Grid3,
    data: Vec<T>,
}

pub type ScalarField3 = Field3<f32>;

impl<T: Voxel> Field3<T> {
    pub fn new(grid: Grid3, fill: T) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn zeros(grid: Grid3) -> Self {
        Self::new(grid, T::default())
    }

    pub fn from_data(grid: Grid3, data: Vec<T>) -> Self {
        assert_eq!(data.len(), grid.size(), "field data mismatch");
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid3, f: impl Fn(UVec3) -> T + Sync) -> Self {
        let mut field = Self::zeros(grid);
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid3 {
        self.grid
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, gid: UVec3) -> T {
        self.data[self.grid.idx(gid)]
    }

    pub fn try_get(&self, gid: UVec3) -> Option<T> {
        if self.grid.contains(gid) {
            Some(self.get(gid))
        } else {
            None
        }
    }

    pub fn set(&mut self, gid: UVec3, value: T) {
        let i = self.grid.idx(gid);
        self.data[i] = value;
    }

    pub fn sample_clamped(&self, x: i32, y: i32, z: i32) -> T {
        self.get(self.grid.clamp_coord(x, y, z))
    }

    pub fn sample_linear(&self, pos: Vec3) -> T {
        // Anything past one cell outside the grid samples the edge anyway.
        let pos = pos.clamp(Vec3::NEG_ONE, self.grid.dims().as_vec3());
        let base = pos.floor();
        let t = pos - base;
        let x0 = base.x as i32;
        let y0 = base.y as i32;
        let z0 = base.z as i32;
        let c000 = self.sample_clamped(x0, y0, z0);
        let c100 = self.sample_clamped(x0 + 1, y0, z0);
        let c010 = self.sample_clamped(x0, y0 + 1, z0);
        let c110 = self.sample_clamped(x0 + 1, y0 + 1, z0);
        let c001 = self.sample_clamped(x0, y0, z0 + 1);
        let c101 = self.sample_clamped(x0 + 1, y0, z0 + 1);
        let c011 = self.sample_clamped(x0, y0 + 1, z0 + 1);
        let c111 = self.sample_clamped(x0 + 1, y0 + 1, z0 + 1);
        let c00 = lerp(c000, c100, t.x);
        let c10 = lerp(c010, c110, t.x);
        let c01 = lerp(c001, c101, t.x);
        let c11 = lerp(c011, c111, t.x);
        let c0 = lerp(c00, c10, t.y);
        let c1 = lerp(c01, c11, t.y);
        lerp(c0, c1, t.z)
    }

    pub fn sample_normalized(&self, uvw: Vec3) -> T {
        self.sample_linear(self.grid.normalized_to_index(uvw))
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_grid(other);
        self.data.copy_from_slice(&other.data);
    }

    pub fn fill_with_index(&mut self, f: impl Fn(UVec3) -> T + Sync) {
        let grid = self.grid;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                *value = f(grid.coord(i));
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                *value = f(grid.coord(i));
            }
        }
    }

    pub fn update_with_index(&mut self, f: impl Fn(UVec3, T) -> T + Sync) {
        let grid = self.grid;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                *value = f(grid.coord(i), *value);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                *value = f(grid.coord(i), *value);
            }
        }
    }

    pub fn map_with_index(&self, f: impl Fn(UVec3, T) -> T + Sync) -> Self {
        let mut out = self.clone();
        out.update_with_index(f);
        out
    }

    pub fn run_pass(&mut self, source: &Self, kernel: impl Fn(UVec3) -> Option<T> + Sync) {
        self.assert_same_grid(source);
        let grid = self.grid;
        let previous = &source.data;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                *value = kernel(grid.coord(i)).unwrap_or(previous[i]);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                *value = kernel(grid.coord(i)).unwrap_or(previous[i]);
            }
        }
    }

    pub(crate) fn assert_same_grid(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

impl Field3<f32> {
    pub fn sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().sum()
        } else {
            self.data.iter().sum()
        }
    }

    pub fn abs_sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value.abs()).sum()
        } else {
            self.data.iter().map(|value| value.abs()).sum()
        }
    }

    pub fn max_abs(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .map(|value| value.abs())
                .reduce(|| 0.0_f32, f32::max)
        } else {
            self.data
                .iter()
                .map(|value| value.abs())
                .fold(0.0_f32, f32::max)
        }
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        let mut min_value = *first;
        let mut max_value = *first;
        for value in iter {
            min_value = min_value.min(*value);
            max_value = max_value.max(*value);
        }
        (min_value, max_value)
    }
}
