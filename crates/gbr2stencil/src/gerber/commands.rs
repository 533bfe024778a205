use crate::error::StencilError;
use crate::types::pad_size;

use super::coord::Units;
use super::lexer::GerberLine;

/// Finer precision than this is not produced by any Gerber writer.
const MAX_DECIMAL_PLACES: u8 = 9;

/// Aperture shape template from an %AD command. Dimensions are in file units.
#[derive(Debug, Clone, PartialEq)]
pub enum ApertureTemplate {
    Circle { diameter: f64 },
    Rectangle { x_size: f64, y_size: f64 },
    Obround { x_size: f64, y_size: f64 },
}

impl ApertureTemplate {
    /// Diameter-equivalent stencil hole size, in file units.
    pub fn size(&self) -> f64 {
        match self {
            ApertureTemplate::Circle { diameter } => *diameter,
            ApertureTemplate::Rectangle { x_size, y_size }
            | ApertureTemplate::Obround { x_size, y_size } => pad_size(*x_size, *y_size),
        }
    }
}

/// A fully parsed Gerber line.
#[derive(Debug, Clone, PartialEq)]
pub enum GerberCommand {
    /// `G04 Gerber Fmt` - coordinate precision and units
    FormatSpec { decimal_places: u8, units: Units },
    /// %AD - Aperture definition
    ApertureDefine {
        name: String,
        template: ApertureTemplate,
    },
    /// Dnn (n >= 10) - Select aperture
    SelectAperture(String),
    /// D01..D09 on their own line - operation codes, no aperture involved
    Operation(u32),
    /// X..Y.. - Flash, or a contour vertex inside a region
    Coordinate { x: i64, y: i64 },
    /// G36 - Begin region
    RegionBegin,
    /// G37 - End region
    RegionEnd,
}

/// Parse a classified line. `line_no` is only used for error reporting.
pub fn parse_line(line_no: usize, line: GerberLine<'_>) -> Result<GerberCommand, StencilError> {
    let parsed = match line {
        GerberLine::FormatSpec(rest) => parse_format_spec(rest),
        GerberLine::ApertureDefine(rest) => parse_aperture_define(rest),
        GerberLine::SelectAperture(word) => Ok(parse_select(word)),
        GerberLine::Coordinate(word) => parse_coordinate(word),
        GerberLine::RegionBegin => Ok(GerberCommand::RegionBegin),
        GerberLine::RegionEnd => Ok(GerberCommand::RegionEnd),
    };
    parsed.map_err(|reason| StencilError::format(line_no, reason))
}

/// Parse the format comment. Example: `2.6, Leading zero omitted, Abs format (unit mm)*`
fn parse_format_spec(rest: &str) -> Result<GerberCommand, String> {
    let (_, fraction) = rest
        .split_once('.')
        .ok_or_else(|| format!("format spec: missing '.' in: {rest}"))?;
    let digits: String = fraction
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let decimal_places = digits
        .parse::<u8>()
        .ok()
        .filter(|places| *places <= MAX_DECIMAL_PLACES)
        .ok_or_else(|| format!("format spec: incorrect number format: {rest}"))?;

    let units = if rest.contains("(unit mm)") {
        Units::Millimeters
    } else {
        Units::Inches
    };

    Ok(GerberCommand::FormatSpec {
        decimal_places,
        units,
    })
}

/// Parse %AD command after the prefix. Example: `D10C,0.500000*%` or `D11R,1.2X0.6*%`
fn parse_aperture_define(rest: &str) -> Result<GerberCommand, String> {
    let (head, params) = rest
        .split_once(',')
        .ok_or_else(|| format!("AD: missing dimensions in: {rest}"))?;

    let mut chars = head.chars();
    let shape = chars
        .next_back()
        .ok_or_else(|| format!("AD: missing aperture name in: {rest}"))?;
    let name = chars.as_str();
    if name.is_empty() {
        return Err(format!("AD: missing aperture name in: {rest}"));
    }

    let dims = params
        .trim_end_matches('%')
        .trim_end_matches('*')
        .split('X')
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| format!("AD {name}: bad dimension: {p}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let template = match shape {
        'C' => ApertureTemplate::Circle { diameter: dims[0] },
        'R' | 'O' => {
            if dims.len() < 2 {
                return Err(format!("AD {name}: need x_size and y_size"));
            }
            if shape == 'R' {
                ApertureTemplate::Rectangle {
                    x_size: dims[0],
                    y_size: dims[1],
                }
            } else {
                ApertureTemplate::Obround {
                    x_size: dims[0],
                    y_size: dims[1],
                }
            }
        }
        other => return Err(format!("AD {name}: unknown aperture shape '{other}'")),
    };

    if template.size() <= 0.0 || !template.size().is_finite() {
        return Err(format!("AD {name}: aperture size must be positive"));
    }

    Ok(GerberCommand::ApertureDefine {
        name: name.to_string(),
        template,
    })
}

/// `D10*` selects aperture D10; `D01*`..`D09*` are operation codes.
fn parse_select(word: &str) -> GerberCommand {
    let name = word.trim_end_matches('*');
    match name[1..].parse::<u32>() {
        Ok(code) if code < 10 => GerberCommand::Operation(code),
        _ => GerberCommand::SelectAperture(name.to_string()),
    }
}

/// Parse `X<int>Y<int>[D<op>]*`. The operation code is ignored.
fn parse_coordinate(word: &str) -> Result<GerberCommand, String> {
    let coords = word
        .split(['D', '*'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('X');
    let (x, y) = coords
        .split_once('Y')
        .ok_or_else(|| format!("coordinate: missing Y in: {word}"))?;

    let x = x
        .parse::<i64>()
        .map_err(|_| format!("coordinate: bad X value: {x}"))?;
    let y = y
        .parse::<i64>()
        .map_err(|_| format!("coordinate: bad Y value: {y}"))?;

    Ok(GerberCommand::Coordinate { x, y })
}
