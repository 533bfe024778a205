use crate::types::DrillBin;

/// Machine constants baked into the program.
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeParams {
    /// Spindle speed (RPM)
    pub spindle_speed: f64,
    /// Maximum path deviation allowed by G64 blending (mm)
    pub path_tolerance: f64,
    /// Safe Z in machine coordinates, used with G53 (mm)
    pub machine_safe_z: f64,
    /// Clearance height above the stencil between hits (mm)
    pub clearance_z: f64,
    /// Height the bit is pulled back to after the plunge (mm)
    pub chip_clear_z: f64,
    /// Plunge and pull-back feed (mm/min)
    pub plunge_rate: f64,
    /// X in machine coordinates to park at for tool changes (mm)
    pub park_x: f64,
}

impl Default for GcodeParams {
    fn default() -> Self {
        Self {
            spindle_speed: 10000.0,
            path_tolerance: 0.01,
            machine_safe_z: -2.0,
            clearance_z: 2.0,
            chip_clear_z: 0.5,
            plunge_rate: 100.0,
            park_x: -189.0,
        }
    }
}

/// Emit the drilling program for `bins`, which must already be in ascending
/// size order with each bin's positions in drilling order. Empty bins are skipped.
///
/// Layout: a fixed header, then per drill bit a tool-change stop, one rapid
/// move and drill cycle per hit, and a retract.
pub fn emit_gcode(bins: &[DrillBin], params: &GcodeParams) -> String {
    let hits: usize = bins.iter().map(|b| b.positions.len()).sum();
    let mut out = String::with_capacity(512 + hits * 128);

    push_header(&mut out, params);

    for bin in bins.iter().filter(|b| !b.is_empty()) {
        push_tool_change(&mut out, bin.size);
        let depth = bin.drill_depth();
        for p in &bin.positions {
            out.push_str(&format!("G00 X{:.6} Y{:.6}\n", p.x, p.y));
            push_drill_cycle(&mut out, depth, params);
        }
        push_retract(&mut out, params);
    }

    out
}

fn push_header(out: &mut String, params: &GcodeParams) {
    out.push_str("G94 ( Millimeters per minute feed rate. )\n");
    out.push_str("G21 ( Units == Millimeters. )\n");
    out.push('\n');
    out.push_str("G90 ( Absolute coordinates. )\n");
    out.push_str(&format!(
        "S{:.0} ( RPM spindle speed. )\n",
        params.spindle_speed
    ));
    out.push_str(&format!(
        "G64 P{:.5} ( set maximum deviation from commanded toolpath )\n",
        params.path_tolerance
    ));
    out.push('\n');
    out.push_str("G04 P0 ( dwell for no time -- G64 should not smooth over this point )\n");
    out.push_str(&format!(
        "G53 G00 Z{:.1} ( retract )\n",
        params.machine_safe_z
    ));
}

fn push_tool_change(out: &mut String, size: f64) {
    out.push('\n');
    out.push_str(&format!("(MSG, Change tool bit to drill size {size:.6} mm)\n"));
    out.push_str("M0      (Temporary machine stop.)\n");
    out.push_str("M3      (Spindle on clockwise.)\n");
}

fn push_drill_cycle(out: &mut String, depth: f64, params: &GcodeParams) {
    out.push_str(&format!("G00 Z{:.5}\n", params.clearance_z));
    out.push_str(&format!("G01 Z{:.6} F{:.5}\n", depth, params.plunge_rate));
    out.push_str(&format!(
        "G01 Z{:.5} F{:.5}\n",
        params.chip_clear_z, params.plunge_rate
    ));
    out.push_str(&format!("G00 Z{:.5} ( retract )\n", params.clearance_z));
}

fn push_retract(out: &mut String, params: &GcodeParams) {
    out.push_str(&format!("G53 G00 Z{:.1}\n", params.machine_safe_z));
    out.push_str(&format!("G53 G00 X{:.1}\n", params.park_x));
    out.push_str("M5      (Spindle stop.)\n");
}
