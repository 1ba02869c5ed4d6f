use crate::field::{Field3, Voxel};
use crate::store::FieldStore;
use crate::vec_field::VecField3;
use glam::UVec3;

pub fn advect_voxel<T: Voxel>(field: &Field3<T>, velocity: &VecField3, gid: UVec3, dt: f32) -> Option<T> {
    if !field.grid().is_interior(gid) {
        return None;
    }
    let pos = gid.as_vec3();
    let v = velocity.sample_linear(pos);
    Some(field.sample_linear(pos - v * dt))
}

pub fn advect_into<T: Voxel>(out: &mut Field3<T>, field: &Field3<T>, velocity: &VecField3, dt: f32) {
    assert_eq!(field.grid(), velocity.grid(), "velocity grid mismatch");
    if dt == 0.0 {
        out.copy_from(field);
        return;
    }
    out.run_pass(field, |gid| advect_voxel(field, velocity, gid, dt));
}

pub fn advect<T: Voxel>(field: &Field3<T>, velocity: &VecField3, dt: f32) -> Field3<T> {
    let mut out = field.clone();
    advect_into(&mut out, field, velocity, dt);
    out
}

pub fn advect_pass(store: &mut FieldStore, dt: f32) {
    let (velocity, velocity_out) = store.velocity.split();
    let (density, density_out) = store.density.split();
    advect_into(density_out, density, velocity, dt);
    advect_into(velocity_out, velocity, velocity, dt);
    store.density.swap();
    store.velocity.swap();
}
