use crate::advect::advect_pass;
use crate::divergence::divergence_pass;
use crate::field::ScalarField3;
use crate::forces::{apply_sources_pass, project_pass};
use crate::params::{Projection, SimConfig, StepParams};
use crate::pressure::{JacobiSolver, SolveReport};
use crate::source::SourceInjector;
use crate::store::FieldStore;
use crate::vec_field::VecField3;
use crate::{Grid3, SimError};
use glam::Vec3;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    InjectSources,
    Advect,
    ApplyForces,
    ComputeDivergence,
    SolvePressure,
    ProjectVelocity,
    ClearSources,
    SwapBuffers,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::InjectSources,
        Stage::Advect,
        Stage::ApplyForces,
        Stage::ComputeDivergence,
        Stage::SolvePressure,
        Stage::ProjectVelocity,
        Stage::ClearSources,
        Stage::SwapBuffers,
    ];

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::InjectSources => Some(Stage::Advect),
            Stage::Advect => Some(Stage::ApplyForces),
            Stage::ApplyForces => Some(Stage::ComputeDivergence),
            Stage::ComputeDivergence => Some(Stage::SolvePressure),
            Stage::SolvePressure => Some(Stage::ProjectVelocity),
            Stage::ProjectVelocity => Some(Stage::ClearSources),
            Stage::ClearSources => Some(Stage::SwapBuffers),
            Stage::SwapBuffers => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    pub solve: SolveReport,
    pub max_speed: f32,
    pub total_density: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    Completed(StepReport),
    /// Stopped before `at` ran. Earlier passes are kept and the sources are
    /// cleared, but the tick is not counted. `at: SwapBuffers` means every
    /// pass ran and only the counter bump was skipped.
    Abandoned { at: Stage },
}

#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimConfig,
    grid: Grid3,
    store: FieldStore,
    injector: SourceInjector,
    solver: JacobiSolver,
    tick: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let grid = config.grid()?;
        let injector = SourceInjector::new(config.source)?;
        let solver = JacobiSolver::new(config.pressure)?;
        let mut store = FieldStore::new(grid);
        store.seed_velocity(&config.initial_velocity.build(grid));

        log::info!(
            "simulation grid {}x{}x{}, {} jacobi iterations, projection {:?}, initial velocity {:?}",
            grid.width(),
            grid.height(),
            grid.depth(),
            config.pressure.iterations,
            config.projection,
            config.initial_velocity
        );
        if config.projection == Projection::Disabled {
            log::warn!("pressure projection disabled; velocity keeps its divergence");
        }
        let center = config.source.center;
        if center.cmplt(Vec3::ZERO).any() || center.cmpgt(grid.dims().as_vec3()).any() {
            log::warn!("source center {center} lies outside the grid");
        }

        Ok(Self {
            config,
            grid,
            store,
            injector,
            solver,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid3 {
        self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn density(&self) -> &ScalarField3 {
        self.store.density()
    }

    pub fn velocity(&self) -> &VecField3 {
        self.store.velocity()
    }

    pub fn pressure(&self) -> &ScalarField3 {
        self.store.pressure()
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.store
            .seed_velocity(&self.config.initial_velocity.build(self.grid));
        self.tick = 0;
        log::info!("simulation reset");
    }

    pub fn step(&mut self, params: &StepParams) -> Result<StepReport, SimError> {
        self.check_params(params)?;
        let tick = self.tick;
        let mut solve = SolveReport::default();
        for stage in Stage::ALL {
            self.run_stage(stage, params, &mut solve);
        }
        Ok(self.finish(tick, solve))
    }

    pub fn step_cancellable(
        &mut self,
        params: &StepParams,
        cancel: &AtomicBool,
    ) -> Result<StepOutcome, SimError> {
        self.step_with(params, |_| cancel.load(Ordering::Relaxed))
    }

    pub fn step_with(
        &mut self,
        params: &StepParams,
        mut abandon: impl FnMut(Stage) -> bool,
    ) -> Result<StepOutcome, SimError> {
        self.check_params(params)?;
        let tick = self.tick;
        let mut solve = SolveReport::default();
        for stage in Stage::ALL {
            if abandon(stage) {
                SourceInjector::clear_pass(&mut self.store);
                log::warn!("tick {tick} abandoned before {stage:?}");
                return Ok(StepOutcome::Abandoned { at: stage });
            }
            self.run_stage(stage, params, &mut solve);
        }
        Ok(StepOutcome::Completed(self.finish(tick, solve)))
    }

    fn check_params(&self, params: &StepParams) -> Result<(), SimError> {
        let expected = self.grid.dims();
        if params.dimensions != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                found: params.dimensions,
            });
        }
        debug_assert!(params.dt.is_finite(), "non-finite dt {}", params.dt);
        Ok(())
    }

    fn run_stage(&mut self, stage: Stage, params: &StepParams, solve: &mut SolveReport) {
        match stage {
            Stage::InjectSources => self.injector.inject_pass(&mut self.store, params.inject),
            Stage::Advect => advect_pass(&mut self.store, params.dt),
            Stage::ApplyForces => apply_sources_pass(&mut self.store),
            Stage::ComputeDivergence => divergence_pass(&mut self.store),
            Stage::SolvePressure => *solve = self.solver.solve_pass(&mut self.store),
            Stage::ProjectVelocity => {
                if self.config.projection == Projection::Enabled {
                    project_pass(&mut self.store);
                }
            }
            Stage::ClearSources => SourceInjector::clear_pass(&mut self.store),
            // Every pass already published its output; this commits the tick.
            Stage::SwapBuffers => self.tick += 1,
        }
    }

    fn finish(&self, tick: u64, solve: SolveReport) -> StepReport {
        let report = StepReport {
            tick,
            solve,
            max_speed: self.store.velocity().max_speed(),
            total_density: self.store.density().sum(),
        };
        log::debug!(
            "tick {} done: {} jacobi iterations, residual {:?}, max speed {:.4}, density {:.4}",
            report.tick,
            report.solve.iterations,
            report.solve.residual,
            report.max_speed,
            report.total_density
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advect::advect;
    use crate::divergence::divergence;
    use crate::params::VelocityPreset;
    use crate::pressure::PressureConfig;
    use crate::source::SourceConfig;
    use glam::UVec3;

    fn config(size: u32, center: Vec3) -> SimConfig {
        SimConfig {
            dimensions: UVec3::splat(size),
            source: SourceConfig {
                center,
                ..SourceConfig::default()
            },
            ..SimConfig::default()
        }
    }

    fn boundary_values(field: &ScalarField3) -> Vec<f32> {
        let grid = field.grid();
        (0..grid.size())
            .map(|i| grid.coord(i))
            .filter(|gid| grid.is_boundary(*gid))
            .map(|gid| field.get(gid))
            .collect()
    }

    #[test]
    fn stages_run_in_pipeline_order() {
        let mut order = vec![Stage::InjectSources];
        while let Some(next) = order[order.len() - 1].next() {
            order.push(next);
        }
        assert_eq!(order, Stage::ALL);
    }

    #[test]
    fn single_injection_then_advection_only() {
        let mut sim = Simulation::new(config(8, Vec3::ONE)).unwrap();
        let dims = UVec3::splat(8);

        let report = sim.step(&StepParams::new(0.1, dims, true)).unwrap();
        assert_eq!(report.tick, 0);
        assert_eq!(sim.tick(), 1);
        assert_eq!(sim.density().get(UVec3::ONE), 1.0);
        assert_eq!(sim.density().get(UVec3::splat(7)), 0.0);
        assert_eq!(sim.store().density_source().abs_sum(), 0.0);
        assert_eq!(sim.store().force_source().max_speed(), 0.0);

        let density = sim.density().clone();
        let velocity = sim.velocity().clone();
        let expected = advect(&density, &velocity, 0.1);
        let report = sim.step(&StepParams::new(0.1, dims, false)).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(sim.store().density_source().abs_sum(), 0.0);
        assert_eq!(sim.store().force_source().max_speed(), 0.0);
        assert_eq!(sim.density(), &expected);
    }

    #[test]
    fn boundary_pressure_and_density_survive_ticks() {
        let mut cfg = config(16, Vec3::splat(8.0));
        cfg.initial_velocity = VelocityPreset::Tornado { strength: 5.0 };
        let mut sim = Simulation::new(cfg).unwrap();
        let grid = sim.grid();
        let marked = |gid: UVec3| if grid.is_boundary(gid) { 0.7 } else { 0.0 };
        for buffers in [&mut sim.store.pressure, &mut sim.store.density] {
            let (a, b) = buffers.both_mut();
            a.fill_with_index(marked);
            b.fill_with_index(marked);
        }
        let pressure = boundary_values(sim.pressure());
        let density = boundary_values(sim.density());

        for _ in 0..3 {
            sim.step(&StepParams::new(0.1, grid.dims(), true)).unwrap();
            assert_eq!(boundary_values(sim.pressure()), pressure);
            assert_eq!(boundary_values(sim.density()), density);
        }
    }

    #[test]
    fn emitter_on_boundary_leaves_boundary_density() {
        let mut sim = Simulation::new(config(8, Vec3::ONE)).unwrap();
        let before = boundary_values(sim.density());
        sim.step(&StepParams::new(0.1, UVec3::splat(8), true)).unwrap();
        assert_eq!(boundary_values(sim.density()), before);
        assert_eq!(sim.density().get(UVec3::new(0, 1, 1)), 0.0);
        assert_eq!(sim.density().get(UVec3::ONE), 1.0);
        sim.step(&StepParams::new(0.1, UVec3::splat(8), true)).unwrap();
        assert_eq!(boundary_values(sim.density()), before);
    }

    #[test]
    fn abandoned_before_swap_ran_every_pass() {
        let mut sim = Simulation::new(config(8, Vec3::splat(4.0))).unwrap();
        let params = StepParams::new(0.1, UVec3::splat(8), true);
        let outcome = sim
            .step_with(&params, |stage| stage == Stage::SwapBuffers)
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Abandoned {
                at: Stage::SwapBuffers
            }
        );
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.density().get(UVec3::splat(4)), 1.0);
        assert!(sim.velocity().max_speed() > 0.0);
    }

    #[test]
    fn projection_reduces_velocity_divergence() {
        let run = |projection| {
            let mut cfg = config(16, Vec3::splat(8.0));
            cfg.projection = projection;
            cfg.pressure = PressureConfig {
                iterations: 80,
                ..PressureConfig::default()
            };
            let mut sim = Simulation::new(cfg).unwrap();
            sim.step(&StepParams::new(0.1, UVec3::splat(16), true))
                .unwrap();
            divergence(sim.velocity()).abs_sum()
        };
        let projected = run(Projection::Enabled);
        let raw = run(Projection::Disabled);
        assert!(raw > 0.0);
        assert!(projected < raw * 0.5, "divergence {raw} -> {projected}");
    }

    #[test]
    fn mismatched_dimensions_run_nothing() {
        let mut sim = Simulation::new(config(8, Vec3::splat(4.0))).unwrap();
        let err = sim
            .step(&StepParams::new(0.1, UVec3::new(8, 8, 9), true))
            .unwrap_err();
        assert_eq!(
            err,
            SimError::DimensionMismatch {
                expected: UVec3::splat(8),
                found: UVec3::new(8, 8, 9),
            }
        );
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.density().abs_sum(), 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config(8, Vec3::splat(4.0));
        cfg.source.radius = -1.0;
        assert!(matches!(
            Simulation::new(cfg),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn cancelled_before_start_leaves_fields_alone() {
        let mut sim = Simulation::new(config(8, Vec3::splat(4.0))).unwrap();
        let cancel = AtomicBool::new(true);
        let outcome = sim
            .step_cancellable(&StepParams::new(0.1, UVec3::splat(8), true), &cancel)
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Abandoned {
                at: Stage::InjectSources
            }
        );
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.density().abs_sum(), 0.0);
    }

    #[test]
    fn abandoned_tick_clears_sources_without_rollback() {
        let mut sim = Simulation::new(config(8, Vec3::splat(4.0))).unwrap();
        let params = StepParams::new(0.1, UVec3::splat(8), true);
        let outcome = sim
            .step_with(&params, |stage| stage == Stage::ComputeDivergence)
            .unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Abandoned {
                at: Stage::ComputeDivergence
            }
        );
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.store().density_source().abs_sum(), 0.0);
        assert_eq!(sim.store().force_source().max_speed(), 0.0);
        assert_eq!(sim.density().get(UVec3::splat(4)), 1.0);

        let cancel = AtomicBool::new(false);
        match sim.step_cancellable(&params, &cancel).unwrap() {
            StepOutcome::Completed(report) => assert_eq!(report.tick, 0),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut cfg = config(8, Vec3::splat(4.0));
        cfg.initial_velocity = VelocityPreset::Tornado { strength: 2.0 };
        let mut sim = Simulation::new(cfg).unwrap();
        let initial = sim.velocity().clone();
        sim.step(&StepParams::new(0.1, UVec3::splat(8), true))
            .unwrap();
        assert_ne!(sim.velocity(), &initial);
        sim.reset();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.velocity(), &initial);
        assert_eq!(sim.density().abs_sum(), 0.0);
        assert_eq!(sim.pressure().abs_sum(), 0.0);
    }
}
