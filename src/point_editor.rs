//! Drag-to-edit for the output values of a LUT.
//!
//! The editor only knows screen positions through a projection supplied by
//! the caller, so it can be driven by a plot widget or by tests alike.

use log::trace;

use crate::lut::{LutPoint, LutTable};

pub const DEFAULT_HIT_RADIUS: f32 = 10.0;
pub const MIN_HIT_RADIUS: f32 = 2.0;
pub const MAX_HIT_RADIUS: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct PointEditor {
    state: DragState,
    hit_radius: f32,
}

impl Default for PointEditor {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_RADIUS)
    }
}

impl PointEditor {
    pub fn new(hit_radius: f32) -> Self {
        Self {
            state: DragState::Idle,
            hit_radius: hit_radius.clamp(MIN_HIT_RADIUS, MAX_HIT_RADIUS),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn hit_radius(&self) -> f32 {
        self.hit_radius
    }

    pub fn set_hit_radius(&mut self, radius: f32) {
        self.hit_radius = radius.clamp(MIN_HIT_RADIUS, MAX_HIT_RADIUS);
    }

    /// Handle a button press at `pointer` (screen space).
    ///
    /// Starts dragging the nearest point within the hit radius, otherwise
    /// goes idle. Returns the selected index.
    pub fn press<F>(&mut self, table: &LutTable, pointer: [f32; 2], to_screen: F) -> Option<usize>
    where
        F: Fn(LutPoint) -> [f32; 2],
    {
        let hit = nearest_point(table, pointer, self.hit_radius, to_screen);
        self.state = match hit {
            Some(index) => DragState::Dragging { index },
            None => DragState::Idle,
        };
        trace!("press at {pointer:?} -> {:?}", self.state);
        hit
    }

    /// Handle pointer motion with the pointer's value-space y.
    /// Returns true if the table changed.
    pub fn motion(&mut self, table: &mut LutTable, y: f64) -> bool {
        let DragState::Dragging { index } = self.state else {
            return false;
        };
        if !y.is_finite() {
            return false;
        }
        table.set_y(index, y)
    }

    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Index of the point closest to `pointer` within `radius`; ties go to the
/// earliest point.
pub fn nearest_point<F>(table: &LutTable, pointer: [f32; 2], radius: f32, to_screen: F) -> Option<usize>
where
    F: Fn(LutPoint) -> [f32; 2],
{
    let mut best: Option<(usize, f32)> = None;
    for (index, point) in table.iter().enumerate() {
        let [sx, sy] = to_screen(*point);
        let dist = ((sx - pointer[0]).powi(2) + (sy - pointer[1]).powi(2)).sqrt();
        if dist > radius || dist.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((index, dist));
        }
    }
    best.map(|(index, _)| index)
}
