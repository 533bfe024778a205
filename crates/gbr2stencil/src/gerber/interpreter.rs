use std::collections::HashSet;

use log::{debug, warn};

use crate::error::StencilError;
use crate::types::{Aperture, BBox, Point};

use super::apertures::{ApertureId, ApertureTable};
use super::commands::{self, GerberCommand};
use super::coord::CoordinateConverter;
use super::lexer::{self, GerberLine};

/// Output from interpreting a single Gerber file.
#[derive(Debug, Default)]
pub struct GerberOutput {
    /// Apertures in ascending size.
    pub apertures: Vec<Aperture>,
    /// Flashes and contours dropped because their position was already taken.
    pub duplicates: usize,
}

impl GerberOutput {
    pub fn position_count(&self) -> usize {
        self.apertures.iter().map(|a| a.positions.len()).sum()
    }
}

/// Gerber line state machine. Walks lines and collects pad positions.
struct Interpreter {
    converter: CoordinateConverter,
    apertures: ApertureTable,
    current: Option<ApertureId>,
    region_active: bool,
    region_points: Vec<Point>,
    seen_positions: HashSet<String>,
    duplicates: usize,
}

impl Interpreter {
    fn new(mirror_x: bool) -> Self {
        Self {
            converter: CoordinateConverter {
                mirror_x,
                ..Default::default()
            },
            apertures: ApertureTable::default(),
            current: None,
            region_active: false,
            region_points: Vec::new(),
            seen_positions: HashSet::new(),
            duplicates: 0,
        }
    }

    fn process_line(&mut self, line_no: usize, text: &str) -> Result<(), StencilError> {
        let Some(line) = lexer::classify(text) else {
            return Ok(());
        };

        // Inside a region only vertices and the closing G37 matter
        if self.region_active
            && !matches!(line, GerberLine::Coordinate(_) | GerberLine::RegionEnd)
        {
            return Ok(());
        }

        let cmd = commands::parse_line(line_no, line)?;
        self.process(line_no, cmd)
    }

    fn process(&mut self, line_no: usize, cmd: GerberCommand) -> Result<(), StencilError> {
        match cmd {
            GerberCommand::FormatSpec {
                decimal_places,
                units,
            } => {
                self.converter.set_decimal_places(decimal_places);
                self.converter.units = units;
            }
            GerberCommand::ApertureDefine { name, template } => {
                let size = self.converter.length_to_mm(template.size());
                self.apertures.define(Aperture::named(name, size));
            }
            GerberCommand::SelectAperture(name) => {
                let id = self
                    .apertures
                    .lookup(&name)
                    .ok_or(StencilError::UnknownAperture {
                        line: line_no,
                        name,
                    })?;
                self.current = Some(id);
            }
            GerberCommand::Operation(code) => {
                warn!("Gerber: line {line_no}: ignoring bare operation code D0{code}");
            }
            GerberCommand::Coordinate { x, y } => {
                let pos = self.converter.to_point(x, y);
                if self.region_active {
                    self.region_points.push(pos);
                } else {
                    self.do_flash(line_no, pos)?;
                }
            }
            GerberCommand::RegionBegin => {
                self.region_points.clear();
                self.region_active = true;
            }
            GerberCommand::RegionEnd => {
                if self.region_active {
                    self.flush_region_end(line_no)?;
                }
                self.region_active = false;
            }
        }
        Ok(())
    }

    fn do_flash(&mut self, line_no: usize, pos: Point) -> Result<(), StencilError> {
        let id = self.current.ok_or_else(|| {
            StencilError::format(line_no, "flash before any aperture was selected")
        })?;

        if self.claim_position(&pos) {
            self.apertures.add_position(id, pos);
        }
        Ok(())
    }

    /// Replace the collected outline with a single pad at its bounding-box center.
    fn flush_region_end(&mut self, line_no: usize) -> Result<(), StencilError> {
        let points = std::mem::take(&mut self.region_points);
        let bbox = BBox::from_points(&points);
        if bbox.is_empty() {
            return Err(StencilError::format(line_no, "contour has no points"));
        }

        let size = bbox.pad_size();
        if size <= 0.0 {
            return Err(StencilError::format(
                line_no,
                format!("degenerate contour ({} points, zero area)", points.len()),
            ));
        }

        let center = bbox.center();
        if self.claim_position(&center) {
            self.apertures.define(Aperture::contour(size, center));
        }
        Ok(())
    }

    /// Record a position, returning false if it was already taken.
    fn claim_position(&mut self, pos: &Point) -> bool {
        if self.seen_positions.insert(pos.tag()) {
            true
        } else {
            debug!("Gerber: dropping duplicate flash at {pos}");
            self.duplicates += 1;
            false
        }
    }

    fn finish(self) -> GerberOutput {
        if self.region_active {
            warn!(
                "Gerber: discarding unterminated contour with {} points",
                self.region_points.len()
            );
        }

        let apertures = self.apertures.into_sorted();
        for aperture in &apertures {
            debug!("{aperture}");
        }

        GerberOutput {
            apertures,
            duplicates: self.duplicates,
        }
    }
}

/// Interpret Gerber text line by line into pad apertures.
///
/// With `mirror_x` set every X coordinate is negated (bottom layer).
pub fn interpret(content: &str, mirror_x: bool) -> Result<GerberOutput, StencilError> {
    let mut interp = Interpreter::new(mirror_x);

    for (idx, line) in content.lines().enumerate() {
        interp.process_line(idx + 1, line)?;
    }

    Ok(interp.finish())
}
