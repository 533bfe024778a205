use crate::types::Point;

const MM_PER_INCH: f64 = 25.4;

/// Unit system announced by the format comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Units {
    Millimeters,
    #[default]
    Inches,
}

/// Converts raw Gerber integers and aperture dimensions to millimeters.
#[derive(Debug, Clone)]
pub struct CoordinateConverter {
    /// `10^decimal_places`; raw coordinates are divided by this.
    pub decimal_divider: f64,
    pub units: Units,
    /// Bottom-layer drawings are flipped horizontally.
    pub mirror_x: bool,
}

impl Default for CoordinateConverter {
    fn default() -> Self {
        Self {
            decimal_divider: 1e6,
            units: Units::default(),
            mirror_x: false,
        }
    }
}

impl CoordinateConverter {
    pub fn set_decimal_places(&mut self, places: u8) {
        self.decimal_divider = 10f64.powi(i32::from(places));
    }

    /// Scale a length in file units (aperture dimension) to mm.
    pub fn length_to_mm(&self, value: f64) -> f64 {
        match self.units {
            Units::Millimeters => value,
            Units::Inches => value * MM_PER_INCH,
        }
    }

    /// Convert a raw coordinate pair to a position in mm.
    pub fn to_point(&self, raw_x: i64, raw_y: i64) -> Point {
        let x = self.length_to_mm(raw_x as f64 / self.decimal_divider);
        let y = self.length_to_mm(raw_y as f64 / self.decimal_divider);
        if self.mirror_x {
            Point::new(-x, y)
        } else {
            Point::new(x, y)
        }
    }
}
