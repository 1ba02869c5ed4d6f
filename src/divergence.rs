use crate::field::ScalarField3;
use crate::store::FieldStore;
use crate::vec_field::VecField3;
use glam::UVec3;

pub fn divergence_voxel(velocity: &VecField3, gid: UVec3) -> Option<f32> {
    if !velocity.grid().is_interior(gid) {
        return None;
    }
    let ddx = velocity.get(gid + UVec3::X).x - velocity.get(gid - UVec3::X).x;
    let ddy = velocity.get(gid + UVec3::Y).y - velocity.get(gid - UVec3::Y).y;
    let ddz = velocity.get(gid + UVec3::Z).z - velocity.get(gid - UVec3::Z).z;
    Some((ddx + ddy + ddz) * 0.5)
}

pub fn divergence_into(out: &mut ScalarField3, velocity: &VecField3) {
    assert_eq!(out.grid(), velocity.grid(), "velocity grid mismatch");
    out.fill_with_index(|gid| divergence_voxel(velocity, gid).unwrap_or(0.0));
}

pub fn divergence(velocity: &VecField3) -> ScalarField3 {
    let mut out = ScalarField3::zeros(velocity.grid());
    divergence_into(&mut out, velocity);
    out
}

pub fn divergence_pass(store: &mut FieldStore) {
    let velocity = store.velocity.read();
    divergence_into(store.divergence.write(), velocity);
    store.divergence.swap();
}
