use crate::store::FieldStore;
use crate::SimError;
use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

const SIGMA_PER_RADIUS: f32 = 0.35;
const EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub center: Vec3,
    pub radius: f32,
    pub peak: f32,
    pub strength: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            center: Vec3::new(32.0, 16.0, 32.0),
            radius: 4.0,
            peak: 1.0,
            strength: 5.0,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.center.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "source center {} is not finite",
                self.center
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "source radius {} must be finite and >= 0",
                self.radius
            )));
        }
        if !self.peak.is_finite() || self.peak < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "source peak {} must be finite and >= 0",
                self.peak
            )));
        }
        if !self.strength.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "source strength {} is not finite",
                self.strength
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SourceInjector {
    config: SourceConfig,
    sigma: f32,
}

impl SourceInjector {
    pub fn new(config: SourceConfig) -> Result<Self, SimError> {
        config.validate()?;
        let sigma = (SIGMA_PER_RADIUS * config.radius).max(EPSILON);
        Ok(Self { config, sigma })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn contribution(&self, pos: Vec3) -> (f32, Vec3) {
        let offset = pos - self.config.center;
        let d2 = offset.length_squared();
        if d2 >= self.config.radius * self.config.radius {
            return (0.0, Vec3::ZERO);
        }
        let density = self.config.peak * (-d2 / (2.0 * self.sigma * self.sigma)).exp();
        let direction = offset / d2.sqrt().max(EPSILON);
        (density, direction * self.config.strength)
    }

    pub fn inject(&self, gid: UVec3) -> (f32, Vec3) {
        self.contribution(gid.as_vec3())
    }

    pub fn inject_pass(&self, store: &mut FieldStore, enabled: bool) {
        let (read, write) = store.density_source.split();
        write.run_pass(read, |gid| {
            Some(if enabled { self.inject(gid).0 } else { 0.0 })
        });
        let (read, write) = store.force_source.split();
        write.run_pass(read, |gid| {
            Some(if enabled { self.inject(gid).1 } else { Vec3::ZERO })
        });
        store.density_source.swap();
        store.force_source.swap();
    }

    pub fn clear_pass(store: &mut FieldStore) {
        let (read, write) = store.density_source.split();
        write.run_pass(read, |_| Some(0.0));
        let (read, write) = store.force_source.split();
        write.run_pass(read, |_| Some(Vec3::ZERO));
        store.density_source.swap();
        store.force_source.swap();
    }
}
