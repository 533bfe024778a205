use std::fmt;

/// Smaller pad dimension is widened by this factor before capping.
const MIN_DIMENSION_FACTOR: f64 = 1.2;

// ─── Point ───────────────────────────────────────────────────────────

/// A position in millimeters, after unit conversion and mirroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Key used to detect repeated flashes of the same pad.
    ///
    /// Positions that agree to two decimal places share a tag.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X {:7.2}      Y {:7.2}", self.x, self.y)
    }
}

// ─── Bounding Box ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BBox {
    pub fn empty() -> Self {
        Self {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: f64::NEG_INFINITY,
            maxy: f64::NEG_INFINITY,
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_point(p.x, p.y);
        }
        bbox
    }

    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.minx = self.minx.min(x);
        self.miny = self.miny.min(y);
        self.maxx = self.maxx.max(x);
        self.maxy = self.maxy.max(y);
    }

    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx || self.miny > self.maxy
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn center(&self) -> Point {
        Point::new((self.minx + self.maxx) / 2.0, (self.miny + self.maxy) / 2.0)
    }

    /// Stencil hole size for a pad filling this box.
    pub fn pad_size(&self) -> f64 {
        pad_size(self.width(), self.height())
    }
}

/// Estimate a round hole size for a `width` x `height` pad.
///
/// Takes the smaller of the area-equivalent size and 1.2x the narrow side,
/// so elongated pads don't get a hole wider than the pad itself.
pub fn pad_size(width: f64, height: f64) -> f64 {
    let area_size = (width * height).sqrt();
    let max_size = width.min(height) * MIN_DIMENSION_FACTOR;
    max_size.min(area_size)
}

// ─── Aperture ────────────────────────────────────────────────────────

/// A pad shape and every place it was flashed.
///
/// Apertures synthesized from G36/G37 contours have no name.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    pub name: Option<String>,
    /// Diameter-equivalent size in millimeters.
    pub size: f64,
    pub positions: Vec<Point>,
}

impl Aperture {
    pub fn named(name: impl Into<String>, size: f64) -> Self {
        Self {
            name: Some(name.into()),
            size,
            positions: Vec::new(),
        }
    }

    pub fn contour(size: f64, center: Point) -> Self {
        Self {
            name: None,
            size,
            positions: vec![center],
        }
    }
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name.as_deref().unwrap_or("(contour)"))?;
        writeln!(f, "size: {:.2}", self.size)?;
        writeln!(f, "occurences: {}", self.positions.len())?;
        for p in &self.positions {
            writeln!(f, "{p}")?;
        }
        Ok(())
    }
}

// ─── Drill Bin ───────────────────────────────────────────────────────

/// All hits to be drilled with one physical bit.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillBin {
    /// Nominal bit diameter in millimeters.
    pub size: f64,
    pub positions: Vec<Point>,
}

impl DrillBin {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            positions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Plunge depth for this bit: half the diameter plus 0.5 mm, below zero.
    pub fn drill_depth(&self) -> f64 {
        -(self.size / 2.0 + 0.5)
    }
}
