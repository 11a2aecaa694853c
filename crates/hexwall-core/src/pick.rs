//! Pointer to cell resolution.

use crate::camera::Camera;
use crate::grid::{CellPose, Grid};
use glam::Vec2;

/// A resolved cell together with its pose at the time of the hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub pose: CellPose,
    pub distance: f32,
}

/// Ray picker with last-hit deduplication for continuous input.
#[derive(Clone, Debug, Default)]
pub struct IntersectionResolver {
    last_hit: Option<usize>,
}

impl IntersectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest cell under `ndc`.
    ///
    /// With `repeat` unset, hitting the same cell as the previous hit reports
    /// nothing. Missing camera or grid is a silent miss. Cell 0 is an
    /// ordinary hit.
    pub fn resolve(
        &mut self,
        ndc: Vec2,
        camera: Option<&Camera>,
        grid: Option<&Grid>,
        repeat: bool,
    ) -> Option<Hit> {
        let (camera, grid) = (camera?, grid?);
        let ray = camera.ray_from_ndc(ndc);
        let (index, distance) = grid.raycast(&ray)?;
        if !repeat && self.last_hit == Some(index) {
            return None;
        }
        self.last_hit = Some(index);
        let pose = grid.pose(index)?;
        log::trace!("[pick] cell {} at {:.3}", index, distance);
        Some(Hit {
            index,
            pose,
            distance,
        })
    }

    pub fn last_hit(&self) -> Option<usize> {
        self.last_hit
    }

    pub fn reset(&mut self) {
        self.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::grid::{GridLayout, HexGeometry};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> (Camera, Grid) {
        let mut rng = StdRng::seed_from_u64(3);
        let layout = GridLayout::new(3, 4, 1.0);
        let mut camera = Camera::new(70.0, 1.0);
        let c = layout.center();
        camera.center_on(c.x, c.y);
        let grid = Grid::build(layout, HexGeometry::new(0.9, 0.2), Rgb::BLACK, &mut rng);
        (camera, grid)
    }

    fn ndc_of(camera: &Camera, grid: &Grid, index: usize) -> Vec2 {
        let world = grid.world_transform(index).unwrap().w_axis.truncate();
        let clip = camera.view_projection() * world.extend(1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn cell_zero_is_a_hit() {
        let (camera, grid) = scene();
        let mut r = IntersectionResolver::new();
        let hit = r
            .resolve(ndc_of(&camera, &grid, 0), Some(&camera), Some(&grid), false)
            .unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(r.last_hit(), Some(0));
    }

    #[test]
    fn hover_dedups_click_repeats() {
        let (camera, grid) = scene();
        let ndc = ndc_of(&camera, &grid, 5);
        let mut r = IntersectionResolver::new();
        assert!(r.resolve(ndc, Some(&camera), Some(&grid), false).is_some());
        assert!(r.resolve(ndc, Some(&camera), Some(&grid), false).is_none());
        let again = r.resolve(ndc, Some(&camera), Some(&grid), true).unwrap();
        assert_eq!(again.index, 5);
        assert_eq!(again.pose, grid.pose(5).unwrap());
    }

    #[test]
    fn missing_resources_miss() {
        let (camera, grid) = scene();
        let mut r = IntersectionResolver::new();
        assert!(r.resolve(Vec2::ZERO, None, Some(&grid), true).is_none());
        assert!(r.resolve(Vec2::ZERO, Some(&camera), None, true).is_none());
        assert_eq!(r.last_hit(), None);
    }
}
