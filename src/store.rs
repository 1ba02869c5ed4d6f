use crate::field::ScalarField3;
use crate::grid::Grid3;
use crate::ping_pong::PingPong;
use crate::vec_field::VecField3;
use crate::SimError;
use glam::{UVec3, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarField {
    Density,
    Pressure,
    Divergence,
    DensitySource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorField {
    Velocity,
    ForceSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldId {
    Scalar(ScalarField),
    Vector(VectorField),
}

impl From<ScalarField> for FieldId {
    fn from(field: ScalarField) -> Self {
        FieldId::Scalar(field)
    }
}

impl From<VectorField> for FieldId {
    fn from(field: VectorField) -> Self {
        FieldId::Vector(field)
    }
}

#[derive(Clone, Debug)]
pub struct FieldStore {
    grid: Grid3,
    pub(crate) velocity: PingPong<VecField3>,
    pub(crate) density: PingPong<ScalarField3>,
    pub(crate) pressure: PingPong<ScalarField3>,
    pub(crate) divergence: PingPong<ScalarField3>,
    pub(crate) density_source: PingPong<ScalarField3>,
    pub(crate) force_source: PingPong<VecField3>,
}

impl FieldStore {
    pub fn new(grid: Grid3) -> Self {
        let scalar = || PingPong::splat(ScalarField3::zeros(grid));
        let vector = || PingPong::splat(VecField3::zeros(grid));
        Self {
            grid,
            velocity: vector(),
            density: scalar(),
            pressure: scalar(),
            divergence: scalar(),
            density_source: scalar(),
            force_source: vector(),
        }
    }

    pub fn grid(&self) -> Grid3 {
        self.grid
    }

    pub fn scalar(&self, field: ScalarField) -> &PingPong<ScalarField3> {
        match field {
            ScalarField::Density => &self.density,
            ScalarField::Pressure => &self.pressure,
            ScalarField::Divergence => &self.divergence,
            ScalarField::DensitySource => &self.density_source,
        }
    }

    pub fn scalar_mut(&mut self, field: ScalarField) -> &mut PingPong<ScalarField3> {
        match field {
            ScalarField::Density => &mut self.density,
            ScalarField::Pressure => &mut self.pressure,
            ScalarField::Divergence => &mut self.divergence,
            ScalarField::DensitySource => &mut self.density_source,
        }
    }

    pub fn vector(&self, field: VectorField) -> &PingPong<VecField3> {
        match field {
            VectorField::Velocity => &self.velocity,
            VectorField::ForceSource => &self.force_source,
        }
    }

    pub fn vector_mut(&mut self, field: VectorField) -> &mut PingPong<VecField3> {
        match field {
            VectorField::Velocity => &mut self.velocity,
            VectorField::ForceSource => &mut self.force_source,
        }
    }

    pub fn read_scalar(&self, field: ScalarField, gid: UVec3) -> Option<f32> {
        self.scalar(field).read().try_get(gid)
    }

    pub fn read_vector(&self, field: VectorField, gid: UVec3) -> Option<Vec3> {
        self.vector(field).read().try_get(gid)
    }

    pub fn write_scalar(&mut self, field: ScalarField, gid: UVec3, value: f32) -> Result<(), SimError> {
        self.check_bounds(gid)?;
        self.scalar_mut(field).write().set(gid, value);
        Ok(())
    }

    pub fn write_vector(&mut self, field: VectorField, gid: UVec3, value: Vec3) -> Result<(), SimError> {
        self.check_bounds(gid)?;
        self.vector_mut(field).write().set(gid, value);
        Ok(())
    }

    pub fn swap(&mut self, field: impl Into<FieldId>) {
        match field.into() {
            FieldId::Scalar(field) => self.scalar_mut(field).swap(),
            FieldId::Vector(field) => self.vector_mut(field).swap(),
        }
    }

    pub fn reset(&mut self) {
        for buffers in [
            &mut self.density,
            &mut self.pressure,
            &mut self.divergence,
            &mut self.density_source,
        ] {
            let (a, b) = buffers.both_mut();
            a.fill(0.0);
            b.fill(0.0);
        }
        for buffers in [&mut self.velocity, &mut self.force_source] {
            let (a, b) = buffers.both_mut();
            a.fill(Vec3::ZERO);
            b.fill(Vec3::ZERO);
        }
    }

    pub(crate) fn seed_velocity(&mut self, velocity: &VecField3) {
        let (a, b) = self.velocity.both_mut();
        a.copy_from(velocity);
        b.copy_from(velocity);
    }

    pub fn density(&self) -> &ScalarField3 {
        self.density.read()
    }

    pub fn velocity(&self) -> &VecField3 {
        self.velocity.read()
    }

    pub fn pressure(&self) -> &ScalarField3 {
        self.pressure.read()
    }

    pub fn divergence(&self) -> &ScalarField3 {
        self.divergence.read()
    }

    pub fn density_source(&self) -> &ScalarField3 {
        self.density_source.read()
    }

    pub fn force_source(&self) -> &VecField3 {
        self.force_source.read()
    }

    fn check_bounds(&self, gid: UVec3) -> Result<(), SimError> {
        if self.grid.contains(gid) {
            Ok(())
        } else {
            Err(SimError::OutOfBounds {
                coord: gid,
                dims: self.grid.dims(),
            })
        }
    }
}
