use crate::pressure::PressureConfig;
use crate::source::SourceConfig;
use crate::vec_field::VecField3;
use crate::{Grid3, SimError};
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum VelocityPreset {
    #[default]
    Still,
    Tornado { strength: f32 },
}

impl VelocityPreset {
    pub fn build(&self, grid: Grid3) -> VecField3 {
        match *self {
            VelocityPreset::Still => VecField3::zeros(grid),
            VelocityPreset::Tornado { strength } => {
                let dims = grid.dims().as_vec3();
                let center = (dims - Vec3::ONE) * 0.5;
                let reach = (dims.x.min(dims.z) * 0.5).max(1.0);
                VecField3::from_fn(grid, |gid| {
                    let offset = gid.as_vec3() - center;
                    let radial = Vec3::new(offset.x, 0.0, offset.z);
                    let r = radial.length();
                    let falloff = (1.0 - r / reach).max(0.0);
                    let tangent = Vec3::new(-offset.z, 0.0, offset.x) / r.max(1e-6);
                    (tangent + Vec3::Y * 0.5) * (strength * falloff)
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dimensions: UVec3,
    pub source: SourceConfig,
    pub pressure: PressureConfig,
    pub projection: Projection,
    pub initial_velocity: VelocityPreset,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dimensions: UVec3::splat(64),
            source: SourceConfig::default(),
            pressure: PressureConfig::default(),
            projection: Projection::Enabled,
            initial_velocity: VelocityPreset::Still,
        }
    }
}

impl SimConfig {
    pub fn grid(&self) -> Result<Grid3, SimError> {
        Grid3::from_dims(self.dimensions)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.grid()?;
        self.source.validate()?;
        self.pressure.validate()?;
        if let VelocityPreset::Tornado { strength } = self.initial_velocity {
            if !strength.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "tornado strength {strength} is not finite"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    pub dt: f32,
    pub dimensions: UVec3,
    pub inject: bool,
    pub box_min: Vec3,
    pub box_max: Vec3,
}

impl StepParams {
    pub fn new(dt: f32, dimensions: UVec3, inject: bool) -> Self {
        Self {
            dt,
            dimensions,
            inject,
            box_min: Vec3::ZERO,
            box_max: Vec3::ONE,
        }
    }

    pub fn from_duration(dt: Duration, dimensions: UVec3, inject: bool) -> Self {
        Self::new(dt.as_secs_f32(), dimensions, inject)
    }

    pub fn with_bounds(mut self, box_min: Vec3, box_max: Vec3) -> Self {
        self.box_min = box_min;
        self.box_max = box_max;
        self
    }
}
