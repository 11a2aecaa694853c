//! Hex grid: layout, per-cell instanced buffers and the prism geometry.
//!
//! Cells are not objects. A cell is an index into parallel arrays: the
//! instanced transform buffer, the instanced color buffer, the phase table
//! and the freeze latches. Slot count is fixed when the grid is built; a
//! different size means a new `Grid`.

use crate::camera::{Camera, Ray};
use crate::color::Rgb;
use crate::constants::{CAMERA_Z_DISTANCE, MESH_Z_OFFSET};
use crate::phase::{Phase, PhaseTable};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::Rng;
use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

/// Row/column arrangement of a pointy-top hex grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    /// Hex circumradius used for spacing.
    pub size: f32,
}

impl GridLayout {
    pub fn new(rows: u32, cols: u32, size: f32) -> Self {
        Self { rows, cols, size }
    }

    /// Fill the frustum slice at the tile plane.
    pub fn for_camera(camera: &Camera, size: f32) -> Self {
        let unit = 3f32.sqrt() * size;
        let width = camera.visible_width_at_depth(CAMERA_Z_DISTANCE);
        let height = camera.visible_height_at_depth(CAMERA_Z_DISTANCE);
        let cols = (width / unit).floor().max(0.0) as u32;
        let rows = (height / (size * 2.0)).floor().max(0.0) as u32;
        Self { rows, cols, size }
    }

    /// Horizontal distance between neighbouring cell centres.
    #[inline]
    pub fn unit(&self) -> f32 {
        3f32.sqrt() * self.size
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Rest position of the cell at `index` (row-major).
    pub fn cell_center(&self, index: usize) -> Vec3 {
        let cols = self.cols.max(1) as usize;
        let r = (index / cols) as f32;
        let c = (index % cols) as f32;
        let shift = if (index / cols) % 2 == 0 { 0.0 } else { 0.5 };
        Vec3::new(self.unit() * (c - shift), self.size * 1.5 * r, 0.0)
    }

    /// Point the camera and lights aim at.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.unit() * 0.5 * self.cols as f32,
            self.size * 0.5 * (self.rows as f32 + 1.0),
        )
    }
}

/// Six-sided prism with its axis along z and a vertex pointing along +y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexGeometry {
    pub radius: f32,
    pub depth: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl HexGeometry {
    pub fn new(radius: f32, depth: f32) -> Self {
        Self { radius, depth }
    }

    #[inline]
    fn apothem(&self) -> f32 {
        self.radius * FRAC_PI_6.cos()
    }

    pub fn bounding_radius(&self) -> f32 {
        (self.radius * self.radius + 0.25 * self.depth * self.depth).sqrt()
    }

    fn corner(&self, i: usize) -> Vec2 {
        let a = FRAC_PI_6 + FRAC_PI_3 * i as f32;
        Vec2::new(a.cos(), a.sin()) * self.radius
    }

    /// Entry distance of a ray given in prism-local space. The direction may
    /// be unnormalized; `t` is in its units. Rays starting inside miss.
    pub fn intersect_local(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let half = self.depth * 0.5;
        let apothem = self.apothem();
        let slabs = [
            (Vec3::Z, half),
            (Vec3::X, apothem),
            (Vec3::new(FRAC_PI_3.cos(), FRAC_PI_3.sin(), 0.0), apothem),
            (
                Vec3::new((2.0 * FRAC_PI_3).cos(), (2.0 * FRAC_PI_3).sin(), 0.0),
                apothem,
            ),
        ];
        for (n, extent) in slabs {
            let o = origin.dot(n);
            let d = dir.dot(n);
            if d.abs() < 1e-9 {
                if o < -extent || o > extent {
                    return None;
                }
                continue;
            }
            let t0 = (-extent - o) / d;
            let t1 = (extent - o) / d;
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
            if t_min > t_max {
                return None;
            }
        }
        (t_min >= 0.0).then_some(t_min)
    }

    /// Flat-shaded prism mesh: two caps and six side quads.
    pub fn mesh(&self) -> (Vec<MeshVertex>, Vec<u16>) {
        let half = self.depth * 0.5;
        let mut vertices = Vec::with_capacity(38);
        let mut indices = Vec::with_capacity(72);

        for (z, normal) in [(half, Vec3::Z), (-half, Vec3::NEG_Z)] {
            let base = vertices.len() as u16;
            vertices.push(MeshVertex {
                position: [0.0, 0.0, z],
                normal: normal.to_array(),
            });
            for i in 0..6 {
                let c = self.corner(i);
                vertices.push(MeshVertex {
                    position: [c.x, c.y, z],
                    normal: normal.to_array(),
                });
            }
            for i in 0..6u16 {
                let a = base + 1 + i;
                let b = base + 1 + (i + 1) % 6;
                if normal.z > 0.0 {
                    indices.extend_from_slice(&[base, a, b]);
                } else {
                    indices.extend_from_slice(&[base, b, a]);
                }
            }
        }

        for i in 0..6 {
            let a = self.corner(i);
            let b = self.corner((i + 1) % 6);
            let mid = FRAC_PI_6 + FRAC_PI_3 * (i as f32 + 0.5);
            let n = [mid.cos(), mid.sin(), 0.0];
            let base = vertices.len() as u16;
            for p in [
                [a.x, a.y, -half],
                [b.x, b.y, -half],
                [b.x, b.y, half],
                [a.x, a.y, half],
            ] {
                vertices.push(MeshVertex {
                    position: p,
                    normal: n,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (vertices, indices)
    }
}

/// Decomposed local transform of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPose {
    pub position: Vec3,
    pub scale: Vec3,
    /// Euler angles, XYZ order.
    pub rotation: Vec3,
}

impl CellPose {
    /// Resting pose at `center`: z 0, unit scale, no rotation.
    pub fn rest(center: Vec3) -> Self {
        Self {
            position: Vec3::new(center.x, center.y, 0.0),
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.position)
    }

    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, q, position) = m.to_scale_rotation_translation();
        let (x, y, z) = q.to_euler(EulerRot::XYZ);
        Self {
            position,
            scale,
            rotation: Vec3::new(x, y, z),
        }
    }

    /// Component-wise interpolation of the animated channels.
    pub fn lerp(&self, to: &CellPose, t: f32) -> CellPose {
        CellPose {
            position: self.position.lerp(to.position, t),
            scale: self.scale.lerp(to.scale, t),
            rotation: self.rotation.lerp(to.rotation, t),
        }
    }
}

/// GPU layout of one instance: model matrix plus color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub transforms: bool,
    pub colors: bool,
}

impl DirtyFlags {
    pub fn any(&self) -> bool {
        self.transforms || self.colors
    }
}

pub struct Grid {
    layout: GridLayout,
    geometry: HexGeometry,
    mesh_offset: Vec3,
    centers: Vec<Vec3>,
    transforms: Vec<Mat4>,
    colors: Vec<Rgb>,
    phases: PhaseTable,
    frozen: Vec<bool>,
    dirty: DirtyFlags,
}

impl Grid {
    pub fn build<R: Rng + ?Sized>(
        layout: GridLayout,
        geometry: HexGeometry,
        base_color: Rgb,
        rng: &mut R,
    ) -> Self {
        let count = layout.cell_count();
        let mut centers = Vec::with_capacity(count);
        let mut transforms = Vec::with_capacity(count);
        let mut phases = PhaseTable::with_capacity(count);
        for i in 0..count {
            let center = layout.cell_center(i);
            centers.push(center);
            transforms.push(CellPose::rest(center).matrix());
            phases.generate(i, rng);
        }
        log::debug!(
            "[grid] built {}x{} ({} cells)",
            layout.rows,
            layout.cols,
            count
        );
        Self {
            layout,
            geometry,
            mesh_offset: Vec3::new(0.0, 0.0, MESH_Z_OFFSET),
            centers,
            transforms,
            colors: vec![base_color; count],
            phases,
            frozen: vec![false; count],
            dirty: DirtyFlags {
                transforms: true,
                colors: true,
            },
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn geometry(&self) -> &HexGeometry {
        &self.geometry
    }

    pub fn mesh_offset(&self) -> Vec3 {
        self.mesh_offset
    }

    pub fn phases(&self) -> &PhaseTable {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn rest_pose(&self, index: usize) -> Option<CellPose> {
        self.centers.get(index).map(|c| CellPose::rest(*c))
    }

    pub fn transform(&self, index: usize) -> Option<&Mat4> {
        self.transforms.get(index)
    }

    /// Instance transform including the mesh offset.
    pub fn world_transform(&self, index: usize) -> Option<Mat4> {
        self.transforms
            .get(index)
            .map(|m| Mat4::from_translation(self.mesh_offset) * *m)
    }

    /// Decompose the current instance transform.
    pub fn pose(&self, index: usize) -> Option<CellPose> {
        self.transforms.get(index).map(CellPose::from_matrix)
    }

    pub fn set_pose(&mut self, index: usize, pose: &CellPose) {
        if let Some(m) = self.transforms.get_mut(index) {
            *m = pose.matrix();
            self.dirty.transforms = true;
        }
    }

    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn set_color(&mut self, index: usize, color: Rgb) {
        if let Some(c) = self.colors.get_mut(index) {
            *c = color;
            self.dirty.colors = true;
        }
    }

    pub fn is_frozen(&self, index: usize) -> bool {
        self.frozen.get(index).copied().unwrap_or(false)
    }

    /// Flip the freeze latch; returns the new state.
    pub fn toggle_frozen(&mut self, index: usize) -> bool {
        match self.frozen.get_mut(index) {
            Some(f) => {
                *f = !*f;
                *f
            }
            None => false,
        }
    }

    /// Nearest instance hit by a world-space ray, with its distance.
    pub fn raycast(&self, ray: &Ray) -> Option<(usize, f32)> {
        let bound = self.geometry.bounding_radius();
        let mut best: Option<(usize, f32)> = None;
        for (i, m) in self.transforms.iter().enumerate() {
            let world = Mat4::from_translation(self.mesh_offset) * *m;
            let (scale, _, center) = world.to_scale_rotation_translation();
            if ray_sphere(ray.origin, ray.direction, center, bound * scale.max_element())
                .is_none()
            {
                continue;
            }
            let inv = world.inverse();
            let o = inv.transform_point3(ray.origin);
            let d = inv.transform_vector3(ray.direction);
            if let Some(t) = self.geometry.intersect_local(o, d) {
                match best {
                    Some((_, bt)) if t >= bt => {}
                    _ => best = Some((i, t)),
                }
            }
        }
        best
    }

    /// Pack both instanced buffers for upload.
    pub fn write_instances(&self, out: &mut Vec<InstanceRaw>) {
        out.clear();
        out.extend(
            self.transforms
                .iter()
                .zip(self.colors.iter())
                .map(|(m, c)| InstanceRaw {
                    model: (Mat4::from_translation(self.mesh_offset) * *m).to_cols_array_2d(),
                    color: [c.r, c.g, c.b, 1.0],
                }),
        );
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Read and clear the dirty flags; called once per render.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn odd_rows_shift_half_a_unit() {
        let layout = GridLayout::new(2, 3, 1.0);
        let unit = layout.unit();
        assert_eq!(layout.cell_center(0), Vec3::ZERO);
        assert!((layout.cell_center(2).x - 2.0 * unit).abs() < 1e-6);
        let first_odd = layout.cell_center(3);
        assert!((first_odd.x + 0.5 * unit).abs() < 1e-6);
        assert!((first_odd.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn layout_fills_the_frustum() {
        let cam = Camera::new(70.0, 16.0 / 9.0);
        let layout = GridLayout::for_camera(&cam, 1.0);
        assert!(layout.rows > 0 && layout.cols > layout.rows);
        let w = cam.visible_width_at_depth(CAMERA_Z_DISTANCE);
        assert!(layout.cols as f32 * layout.unit() <= w);
    }

    #[test]
    fn prism_hit_from_front_and_miss_beside() {
        let hex = HexGeometry::new(1.0, 0.2);
        let t = hex.intersect_local(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((t.unwrap() - 4.9).abs() < 1e-5);
        // inside the circumcircle but outside the flat side
        assert!(hex
            .intersect_local(Vec3::new(0.95, 0.0, 5.0), Vec3::NEG_Z)
            .is_none());
        // pointy direction reaches further
        assert!(hex
            .intersect_local(Vec3::new(0.0, 0.95, 5.0), Vec3::NEG_Z)
            .is_some());
    }

    #[test]
    fn mesh_is_closed_prism() {
        let (v, i) = HexGeometry::new(1.0, 0.2).mesh();
        assert_eq!(v.len(), 38);
        assert_eq!(i.len(), 72);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn pose_matrix_round_trip() {
        let pose = CellPose {
            position: Vec3::new(1.0, 2.0, 0.3),
            scale: Vec3::new(1.0, 1.0, 1.2),
            rotation: Vec3::new(0.4, -0.2, 0.1),
        };
        let back = CellPose::from_matrix(&pose.matrix());
        assert!((back.position - pose.position).length() < 1e-5);
        assert!((back.scale - pose.scale).length() < 1e-5);
        assert!((back.rotation - pose.rotation).length() < 1e-4);
    }

    #[test]
    fn freeze_latch_toggles_and_ignores_bad_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::build(
            GridLayout::new(1, 2, 1.0),
            HexGeometry::new(0.9, 0.2),
            Rgb::BLACK,
            &mut rng,
        );
        assert!(grid.toggle_frozen(1));
        assert!(!grid.toggle_frozen(1));
        assert!(!grid.toggle_frozen(99));
        assert!(!grid.is_frozen(99));
    }
}
