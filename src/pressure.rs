use crate::field::ScalarField3;
use crate::ping_pong::PingPong;
use crate::store::FieldStore;
use crate::SimError;
use glam::UVec3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    pub iterations: usize,
    pub tolerance: Option<f32>,
    pub warm_start: bool,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            tolerance: None,
            warm_start: false,
        }
    }
}

impl PressureConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        match self.tolerance {
            Some(tol) if !tol.is_finite() || tol < 0.0 => Err(SimError::InvalidConfig(format!(
                "pressure tolerance {tol} must be finite and >= 0"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    Seed,
    Iterate(usize),
    Done,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveReport {
    pub iterations: usize,
    pub residual: Option<f32>,
}

fn neighbor_sum(field: &ScalarField3, gid: UVec3) -> f32 {
    field.get(gid - UVec3::X)
        + field.get(gid + UVec3::X)
        + field.get(gid - UVec3::Y)
        + field.get(gid + UVec3::Y)
        + field.get(gid - UVec3::Z)
        + field.get(gid + UVec3::Z)
}

pub fn jacobi_voxel(pressure: &ScalarField3, divergence: &ScalarField3, gid: UVec3) -> Option<f32> {
    if !pressure.grid().is_interior(gid) {
        return None;
    }
    Some((neighbor_sum(pressure, gid) - divergence.get(gid)) / 6.0)
}

pub fn jacobi_step(out: &mut ScalarField3, pressure: &ScalarField3, divergence: &ScalarField3) {
    assert_eq!(pressure.grid(), divergence.grid(), "divergence grid mismatch");
    out.run_pass(pressure, |gid| jacobi_voxel(pressure, divergence, gid));
}

pub fn residual(pressure: &ScalarField3, divergence: &ScalarField3) -> f32 {
    let grid = pressure.grid();
    let r = ScalarField3::from_fn(grid, |gid| {
        if !grid.is_interior(gid) {
            return 0.0;
        }
        let laplacian = neighbor_sum(pressure, gid) - 6.0 * pressure.get(gid);
        laplacian - divergence.get(gid)
    });
    r.max_abs()
}

#[derive(Clone, Debug)]
pub struct JacobiSolver {
    config: PressureConfig,
    state: SolverState,
}

impl JacobiSolver {
    pub fn new(config: PressureConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            state: SolverState::Seed,
        })
    }

    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn seed(&mut self, pressure: &mut PingPong<ScalarField3>) {
        if !self.config.warm_start {
            let (read, write) = pressure.split();
            let grid = read.grid();
            write.run_pass(read, |gid| grid.is_interior(gid).then_some(0.0));
            pressure.swap();
        }
        self.state = if self.config.iterations == 0 {
            SolverState::Done
        } else {
            SolverState::Iterate(0)
        };
    }

    pub fn iterate(
        &mut self,
        pressure: &mut PingPong<ScalarField3>,
        divergence: &ScalarField3,
    ) -> SolverState {
        let SolverState::Iterate(k) = self.state else {
            return self.state;
        };
        let (read, write) = pressure.split();
        jacobi_step(write, read, divergence);
        pressure.swap();
        let done = k + 1 >= self.config.iterations || self.converged(pressure.read(), divergence);
        self.state = if done {
            SolverState::Done
        } else {
            SolverState::Iterate(k + 1)
        };
        self.state
    }

    pub fn solve(
        &mut self,
        pressure: &mut PingPong<ScalarField3>,
        divergence: &ScalarField3,
    ) -> SolveReport {
        self.state = SolverState::Seed;
        self.seed(pressure);
        let mut iterations = 0;
        while let SolverState::Iterate(_) = self.state {
            self.iterate(pressure, divergence);
            iterations += 1;
        }
        let residual = self
            .config
            .tolerance
            .map(|_| residual(pressure.read(), divergence));
        SolveReport {
            iterations,
            residual,
        }
    }

    pub fn solve_pass(&mut self, store: &mut FieldStore) -> SolveReport {
        let divergence = store.divergence.read();
        self.solve(&mut store.pressure, divergence)
    }

    fn converged(&self, pressure: &ScalarField3, divergence: &ScalarField3) -> bool {
        match self.config.tolerance {
            Some(tol) => residual(pressure, divergence) <= tol,
            None => false,
        }
    }
}
