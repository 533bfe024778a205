/// Prefix of the KiCad-style format comment carrying precision and units.
pub const FORMAT_SPEC_PREFIX: &str = "G04 Gerber Fmt ";

/// A Gerber line, classified by its prefix.
///
/// The payload borrows the remainder of the line after the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GerberLine<'a> {
    /// `G04 Gerber Fmt 2.6, ... (unit mm)*`
    FormatSpec(&'a str),
    /// `%ADD10C,0.500000*%` (payload starts at the aperture name)
    ApertureDefine(&'a str),
    /// `D10*` (payload is the whole word, terminator included)
    SelectAperture(&'a str),
    /// `X100000Y200000D03*`
    Coordinate(&'a str),
    /// `G36*`
    RegionBegin,
    /// `G37*`
    RegionEnd,
}

/// Classify one line of input. Unrecognized lines yield `None`.
pub fn classify(line: &str) -> Option<GerberLine<'_>> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(FORMAT_SPEC_PREFIX) {
        return Some(GerberLine::FormatSpec(rest));
    }
    if let Some(rest) = line.strip_prefix("%AD") {
        return Some(GerberLine::ApertureDefine(rest));
    }
    if line.starts_with('D') {
        return Some(GerberLine::SelectAperture(line));
    }
    if line.starts_with('X') {
        return Some(GerberLine::Coordinate(line));
    }
    if line.starts_with("G36*") {
        return Some(GerberLine::RegionBegin);
    }
    if line.starts_with("G37*") {
        return Some(GerberLine::RegionEnd);
    }
    None
}
