use crate::field::ScalarField3;
use crate::store::FieldStore;
use crate::vec_field::VecField3;
use glam::{UVec3, Vec3};

pub fn apply_forces_into(out: &mut VecField3, velocity: &VecField3, force: &VecField3) {
    force.assert_same_grid(velocity);
    out.run_pass(velocity, |gid| Some(velocity.get(gid) + force.get(gid)));
}

pub fn deposit_density_into(out: &mut ScalarField3, density: &ScalarField3, source: &ScalarField3) {
    source.assert_same_grid(density);
    let grid = density.grid();
    out.run_pass(density, |gid| {
        grid.is_interior(gid)
            .then(|| density.get(gid) + source.get(gid))
    });
}

pub fn apply_sources_pass(store: &mut FieldStore) {
    let (velocity, velocity_out) = store.velocity.split();
    apply_forces_into(velocity_out, velocity, store.force_source.read());
    let (density, density_out) = store.density.split();
    deposit_density_into(density_out, density, store.density_source.read());
    store.velocity.swap();
    store.density.swap();
}

pub fn pressure_gradient(pressure: &ScalarField3, gid: UVec3) -> Vec3 {
    Vec3::new(
        pressure.get(gid + UVec3::X) - pressure.get(gid - UVec3::X),
        pressure.get(gid + UVec3::Y) - pressure.get(gid - UVec3::Y),
        pressure.get(gid + UVec3::Z) - pressure.get(gid - UVec3::Z),
    ) * 0.5
}

pub fn project_into(out: &mut VecField3, velocity: &VecField3, pressure: &ScalarField3) {
    assert_eq!(velocity.grid(), pressure.grid(), "pressure grid mismatch");
    let grid = velocity.grid();
    out.run_pass(velocity, |gid| {
        grid.is_interior(gid)
            .then(|| velocity.get(gid) - pressure_gradient(pressure, gid))
    });
}

pub fn project_pass(store: &mut FieldStore) {
    let (velocity, velocity_out) = store.velocity.split();
    project_into(velocity_out, velocity, store.pressure.read());
    store.velocity.swap();
}
