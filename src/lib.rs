mod advect;
mod divergence;
mod error;
mod field;
mod forces;
mod grid;
mod params;
mod ping_pong;
mod pressure;
mod sim;
mod source;
mod store;
mod vec_field;

pub use advect::{advect, advect_into, advect_pass, advect_voxel};
pub use divergence::{divergence, divergence_into, divergence_pass, divergence_voxel};
pub use error::SimError;
pub use field::{Field3, ScalarField3, Voxel};
pub use forces::{
    apply_forces_into, apply_sources_pass, deposit_density_into, pressure_gradient, project_into,
    project_pass,
};
pub use grid::Grid3;
pub use params::{Projection, SimConfig, StepParams, VelocityPreset};
pub use ping_pong::PingPong;
pub use pressure::{
    jacobi_step, jacobi_voxel, residual, JacobiSolver, PressureConfig, SolveReport, SolverState,
};
pub use sim::{Simulation, Stage, StepOutcome, StepReport};
pub use source::{SourceConfig, SourceInjector};
pub use store::{FieldId, FieldStore, ScalarField, VectorField};
pub use vec_field::VecField3;
