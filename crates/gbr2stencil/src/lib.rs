pub mod drill;
pub mod error;
pub mod gcode;
pub mod gerber;
pub mod optimizer;
pub mod types;

use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use error::StencilError;
use gcode::GcodeParams;
use optimizer::PathOptimizer;
use types::{Aperture, DrillBin};

/// Appended to the input file stem to name the program.
pub const OUTPUT_EXTENSION: &str = ".Stencil.ngc";

/// Marker in an input path that denotes a bottom-layer drawing.
const BOTTOM_LAYER_MARKER: &str = "-B.";

#[derive(Debug, Clone)]
pub struct StencilOptions {
    /// Negate X for bottom-layer drawings.
    pub mirror_x: bool,
    /// Seed for the path optimizer's restarts.
    pub seed: u64,
    pub max_restarts: usize,
    pub gcode: GcodeParams,
}

impl Default for StencilOptions {
    fn default() -> Self {
        Self {
            mirror_x: false,
            seed: 0x5EED,
            max_restarts: optimizer::MAX_RESTARTS,
            gcode: GcodeParams::default(),
        }
    }
}

impl StencilOptions {
    /// Options for `path`, mirrored if the path marks it as a bottom layer.
    pub fn for_input(path: &Path) -> Self {
        Self {
            mirror_x: is_bottom_layer(path),
            ..Default::default()
        }
    }
}

/// Everything produced for one input.
#[derive(Debug, Clone)]
pub struct StencilJob {
    /// Parsed apertures in ascending size.
    pub apertures: Vec<Aperture>,
    /// One bin per catalog drill, ascending, hits in drilling order.
    pub bins: Vec<DrillBin>,
    pub duplicates: usize,
    pub program: String,
}

/// True when the path marks a bottom-layer drawing (`-B.` anywhere in it).
pub fn is_bottom_layer(path: &Path) -> bool {
    path.to_string_lossy().contains(BOTTOM_LAYER_MARKER)
}

/// `dir/board-F.Paste.gbr` -> `dir/board-F.Stencil.ngc`
pub fn output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_EXTENSION}"))
}

/// Order every bin's hits. Bins are independent and each gets its own rng
/// seeded from its catalog index, so the result does not depend on scheduling.
pub fn optimize_bins(bins: &mut [DrillBin], seed: u64, max_restarts: usize) {
    let optimizer = PathOptimizer::new(max_restarts);
    bins.par_iter_mut().enumerate().for_each(|(idx, bin)| {
        if bin.positions.len() > 2 {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(idx as u64));
            bin.positions = optimizer.optimize(&bin.positions, &mut rng);
        }
    });
}

/// Run the whole pipeline on in-memory Gerber text.
pub fn convert_str(content: &str, opts: &StencilOptions) -> Result<StencilJob, StencilError> {
    let parsed = gerber::parse(content, opts.mirror_x)?;

    let mut bins = drill::classify(&parsed.apertures, &drill::DRILL_SIZES);
    optimize_bins(&mut bins, opts.seed, opts.max_restarts);
    for bin in bins.iter().filter(|b| !b.is_empty()) {
        info!("drill {:.1} mm: {} hits", bin.size, bin.positions.len());
    }

    let program = gcode::emit_gcode(&bins, &opts.gcode);

    Ok(StencilJob {
        apertures: parsed.apertures,
        bins,
        duplicates: parsed.duplicates,
        program,
    })
}

/// Read `input`, convert it, and write the program next to it.
///
/// Returns the path written.
pub fn convert(input: &Path, opts: &StencilOptions) -> Result<PathBuf, StencilError> {
    let content = std::fs::read_to_string(input)?;
    let job = convert_str(&content, opts)?;

    let output = output_path(input);
    std::fs::write(&output, job.program)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use approx::assert_abs_diff_eq;

    const SCENARIO: &str = "\
G04 #@! TF.GenerationSoftware,KiCad,Pcbnew,5.1.5*
G04 Gerber Fmt 2.6, Leading zero omitted, Abs format (unit mm)*
%MOMM*%
%LPD*%
G04 APERTURE LIST*
%ADD10C,0.500000*%
G04 APERTURE END LIST*
D10*
X100000Y200000D03*
X100000Y200000D03*
M02*
";

    #[test]
    fn test_is_bottom_layer() {
        assert!(is_bottom_layer(Path::new("board-B.Paste.gbr")));
        assert!(is_bottom_layer(Path::new("out/board-B.Paste.gbr")));
        assert!(!is_bottom_layer(Path::new("board-F.Paste.gbr")));
        // The whole path is checked, directories included
        assert!(is_bottom_layer(Path::new("some-B.dir/board-F.Paste.gbr")));
        assert!(!is_bottom_layer(Path::new("some-F.dir/board-F.Paste.gbr")));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("board-F.Paste.gbr")),
            PathBuf::from("board-F.Stencil.ngc")
        );
        assert_eq!(
            output_path(Path::new("gerbers/v1.2/board-B.Paste.gbr")),
            PathBuf::from("gerbers/v1.2/board-B.Stencil.ngc")
        );
        assert_eq!(
            output_path(Path::new("paste")),
            PathBuf::from("paste.Stencil.ngc")
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let job = convert_str(SCENARIO, &StencilOptions::default()).unwrap();

        assert_eq!(job.duplicates, 1);
        let filled: Vec<_> = job.bins.iter().filter(|b| !b.is_empty()).collect();
        assert_eq!(filled.len(), 1);
        assert_abs_diff_eq!(filled[0].size, 0.5);
        assert_eq!(filled[0].positions.len(), 1);
        assert_abs_diff_eq!(filled[0].positions[0].x, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(filled[0].positions[0].y, 0.2, epsilon = 1e-12);

        assert_eq!(job.program.matches("(MSG, Change tool bit").count(), 1);
        assert!(job.program.contains("drill size 0.500000 mm"));
        assert_eq!(job.program.matches("G00 X").count(), 1);
        assert!(job.program.contains("G00 X0.100000 Y0.200000\n"));
        assert_eq!(job.program.matches("G01 Z-0.750000").count(), 1);
    }

    #[test]
    fn test_bottom_layer_mirrors() {
        let opts = StencilOptions {
            mirror_x: true,
            ..Default::default()
        };
        let job = convert_str(SCENARIO, &opts).unwrap();
        assert!(job.program.contains("G00 X-0.100000 Y0.200000\n"));
    }

    #[test]
    fn test_position_count_is_preserved() {
        let input = "\
G04 Gerber Fmt 2.6, Leading zero omitted, Abs format (unit mm)*
%ADD10C,0.300000*%
%ADD11R,1.000000X0.800000*%
%ADD12O,0.600000X2.000000*%
D10*
X0Y0D03*
X1000000Y0D03*
X2000000Y3000000D03*
D11*
X5000000Y5000000D03*
X1000000Y0D03*
X6000000Y5000000D03*
D12*
X9000000Y1000000D03*
G36*
X0Y9000000D02*
X400000Y9000000D01*
X400000Y9400000D01*
X0Y9400000D01*
G37*
";
        let job = convert_str(input, &StencilOptions::default()).unwrap();
        let parsed: usize = job.apertures.iter().map(|a| a.positions.len()).sum();
        let binned: usize = job.bins.iter().map(|b| b.positions.len()).sum();
        assert_eq!(job.duplicates, 1);
        assert_eq!(parsed, 7);
        assert_eq!(binned, parsed);
        // 1.0 x 0.8 rectangle -> sqrt(0.8) ~ 0.894 -> 0.9 drill
        let d11 = job.bins.iter().find(|b| (b.size - 0.9).abs() < 1e-9).unwrap();
        assert_eq!(d11.positions.len(), 2);
        // 0.4 mm square contour -> 0.4 drill, centered
        let contour = job.bins.iter().find(|b| (b.size - 0.4).abs() < 1e-9).unwrap();
        assert_eq!(contour.positions.len(), 1);
        assert_abs_diff_eq!(contour.positions[0].x, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(contour.positions[0].y, 9.2, epsilon = 1e-9);
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut input = String::from(
            "G04 Gerber Fmt 2.6, Leading zero omitted, Abs format (unit mm)*\n%ADD10C,0.500000*%\nD10*\n",
        );
        for i in 0..40i64 {
            let x = (i * 7919) % 50_000_000;
            let y = (i * 104_729) % 30_000_000;
            input.push_str(&format!("X{x}Y{y}D03*\n"));
        }
        let opts = StencilOptions {
            max_restarts: 8,
            ..Default::default()
        };
        let a = convert_str(&input, &opts).unwrap();
        let b = convert_str(&input, &opts).unwrap();
        assert_eq!(a.program, b.program);
    }

    #[test]
    fn test_optimize_bins_keeps_points() {
        let mut bins = vec![DrillBin::new(0.3), DrillBin::new(0.4)];
        bins[1].positions = vec![
            Point::new(5.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        optimize_bins(&mut bins, 1, 10);
        assert!(bins[0].is_empty());
        assert_eq!(bins[1].positions.len(), 3);
        assert_abs_diff_eq!(optimizer::tour_length(&bins[1].positions), 5.0);
    }

    #[test]
    fn test_convert_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("board-B.Paste.gbr");
        std::fs::write(&input, SCENARIO).unwrap();

        let written = convert(&input, &StencilOptions::for_input(&input)).unwrap();
        assert_eq!(written, dir.path().join("board-B.Stencil.ngc"));
        let program = std::fs::read_to_string(&written).unwrap();
        assert!(program.starts_with("G94 "));
        assert!(program.contains("G00 X-0.100000 Y0.200000\n"));
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert(&dir.path().join("nope.gbr"), &StencilOptions::default()).unwrap_err();
        assert!(matches!(err, StencilError::Io(_)));
    }

    #[test]
    fn test_convert_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.gbr");
        std::fs::write(&input, "%ADD10C,0.5*%\nD11*\n").unwrap();
        let err = convert(&input, &StencilOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "line 2: aperture D11 is not defined");
        assert!(!dir.path().join("bad.Stencil.ngc").exists());
    }
}
