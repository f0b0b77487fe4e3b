//! Action.
use serde::{Deserialize, Serialize};

/// An index into the action vocabulary of an environment.
///
/// Object-interaction actions may carry relative coordinates `[x, y]` of the
/// point on the egocentric frame to interact with. When `coord` is `None`,
/// the environment chooses the point by itself.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Index into the action vocabulary.
    pub index: usize,

    /// Relative interaction coordinates.
    pub coord: Option<[f32; 2]>,
}

impl Action {
    /// Constructs an action without coordinates.
    pub fn new(index: usize) -> Self {
        Self { index, coord: None }
    }

    /// Attaches interaction coordinates, clamped into the unit square.
    pub fn with_coord(mut self, x: f32, y: f32) -> Self {
        self.coord = Some([clamp_unit(x), clamp_unit(y)]);
        self
    }
}

impl From<usize> for Action {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.5
    } else {
        v.max(0.0).min(1.0)
    }
}
