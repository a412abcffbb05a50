use super::color::{Paint, Rgb};
use super::pointer::Pointer;

/// A square point mass that is repelled by the pointer and springs back to
/// the place it was sampled from.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Current drawn position
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Edge length of the drawn square
    pub size: f64,
    /// Fraction of the offset to origin recovered per tick
    pub ease: f64,
    /// Per-tick velocity multiplier
    pub friction: f64,

    // Fixed at construction
    origin_x: f64,
    origin_y: f64,
    color: Rgb,
}

impl Particle {
    pub fn new(x: f64, y: f64, color: Rgb, size: f64, ease: f64, friction: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size,
            ease,
            friction,
            origin_x: x.floor(),
            origin_y: y.floor(),
            color,
        }
    }

    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Advance one tick: pointer repulsion, velocity damping, spring to origin.
    ///
    /// `ease` and `friction` are not clamped; values outside (0, 1] diverge
    /// or stop damping. A pointer exactly on the particle gives an infinite
    /// force and non-finite position.
    #[inline]
    pub fn update(&mut self, pointer: &Pointer) {
        let (dx, dy) = pointer.offset_from(self.x, self.y);
        let distance = dx * dx + dy * dy;
        let force = -pointer.radius / distance;

        // Squared distance against the plain radius, kept as effects were tuned to it
        if distance < pointer.radius {
            let angle = dy.atan2(dx);
            self.vx += force * angle.cos();
            self.vy += force * angle.sin();
        }

        self.vx *= self.friction;
        self.vy *= self.friction;
        self.x += self.vx + (self.origin_x - self.x) * self.ease;
        self.y += self.vy + (self.origin_y - self.y) * self.ease;
    }

    /// Rounded position is back on the origin.
    #[inline]
    pub fn is_at_rest(&self) -> bool {
        round_half_up(self.x) == self.origin_x && round_half_up(self.y) == self.origin_y
    }

    /// Fill for the next draw: the sampled colour at rest, otherwise the trail
    /// colour when one is configured.
    #[inline]
    pub fn paint<'a>(&self, trail: Option<&'a str>) -> Paint<'a> {
        match trail {
            Some(css) if !self.is_at_rest() => Paint::Css(css),
            _ => Paint::Rgb(self.color),
        }
    }
}

/// Rounds halves towards positive infinity, the way browser `Math.round` does.
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
