//! Per-cell phase offsets used to desynchronize animations across the grid.

use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Random offsets drawn once when a cell is created.
///
/// `x`, `y`, `z` lie in \[-π, π) and `depth` in \[0, 2π).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Phase {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub depth: f32,
}

impl Phase {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(-PI..PI),
            y: rng.gen_range(-PI..PI),
            z: rng.gen_range(-PI..PI),
            depth: rng.gen_range(0.0..TAU),
        }
    }
}

/// Phases in cell index order. Consumers index by position, so entries are
/// only ever appended while a grid is being built.
#[derive(Clone, Debug, Default)]
pub struct PhaseTable {
    phases: Vec<Phase>,
}

impl PhaseTable {
    pub fn with_capacity(cells: usize) -> Self {
        Self {
            phases: Vec::with_capacity(cells),
        }
    }

    /// Generate the phase for `cell_index`, which must be the next index.
    pub fn generate<R: Rng + ?Sized>(&mut self, cell_index: usize, rng: &mut R) -> Phase {
        debug_assert_eq!(
            cell_index,
            self.phases.len(),
            "phases must be generated in cell order"
        );
        let phase = Phase::random(rng);
        self.phases.push(phase);
        phase
    }

    #[inline]
    pub fn get(&self, cell_index: usize) -> Option<&Phase> {
        self.phases.get(cell_index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter()
    }
}
