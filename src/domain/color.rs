use std::fmt;

/// Colour sampled from the source at a particle's origin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// What to fill a shape with: a sampled colour or a caller-supplied CSS colour
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint<'a> {
    Rgb(Rgb),
    Css(&'a str),
}

impl<'a> From<Rgb> for Paint<'a> {
    fn from(rgb: Rgb) -> Self {
        Paint::Rgb(rgb)
    }
}
