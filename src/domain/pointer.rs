/// Pointer state shared by all particles of one effect.
///
/// Each axis is tracked separately; an axis is `None` while the pointer is
/// outside the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Influence threshold, compared against a squared distance
    pub radius: f64,
}

impl Pointer {
    pub fn new(radius: f64) -> Self {
        Self { x: None, y: None, radius }
    }

    pub fn set(&mut self, x: f64, y: f64) {
        self.x = Some(x);
        self.y = Some(y);
    }

    pub fn clear(&mut self) {
        self.x = None;
        self.y = None;
    }

    /// Vector from `(x, y)` to the pointer.
    ///
    /// A missing axis yields `radius` instead of a difference, which keeps the
    /// pseudo-distance fixed and non-zero while the pointer is away.
    #[inline]
    pub fn offset_from(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = self.x.map_or(self.radius, |px| px - x);
        let dy = self.y.map_or(self.radius, |py| py - y);
        (dx, dy)
    }
}
