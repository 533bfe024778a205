use log::warn;

use crate::types::{Aperture, DrillBin};

/// Drill bits on hand, in ascending order (mm).
pub const DRILL_SIZES: [f64; 10] = [0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.1, 1.2];

/// Index of the catalog size closest to `size`. Ties go to the earlier entry.
///
/// Returns `None` only for an empty catalog.
pub fn nearest_size(catalog: &[f64], size: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, nominal) in catalog.iter().enumerate() {
        let diff = (nominal - size).abs();
        if best.is_none_or(|(_, best_diff)| diff < best_diff) {
            best = Some((idx, diff));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Snap every aperture to its nearest drill and collect the hits per drill.
///
/// Returns one bin per catalog entry, in catalog order, including empty ones.
pub fn classify(apertures: &[Aperture], catalog: &[f64]) -> Vec<DrillBin> {
    let mut bins: Vec<DrillBin> = catalog.iter().map(|&size| DrillBin::new(size)).collect();
    let step = catalog_step(catalog);

    for aperture in apertures {
        let Some(idx) = nearest_size(catalog, aperture.size) else {
            continue;
        };
        let bin = &mut bins[idx];
        if (bin.size - aperture.size).abs() > step {
            warn!(
                "aperture {} ({:.3} mm) is far from the nearest drill ({:.1} mm)",
                aperture.name.as_deref().unwrap_or("(contour)"),
                aperture.size,
                bin.size
            );
        }
        bin.positions.extend_from_slice(&aperture.positions);
    }

    bins
}

/// Largest gap between neighbouring catalog sizes.
fn catalog_step(catalog: &[f64]) -> f64 {
    catalog
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}
