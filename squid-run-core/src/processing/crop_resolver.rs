//! Output geometry resolution: centered crop of the sensor frame.
//!
//! Pure math, no side effects. Identical inputs always give identical
//! percentages.

use crate::models::geometry::{CropGeometry, Resolution};

/// Compute the centered crop that gives `output`'s aspect ratio.
///
/// - `sensor`: largest capture size, in either orientation.
/// - `output`: encoded frame size.
///
/// The sensor frame is laid out in the output's orientation before cropping,
/// so how the device is held does not change the result. The relatively wider
/// dimension is cropped symmetrically. Degenerate sizes give
/// [`CropGeometry::FULL`].
pub fn resolve_crop(sensor: Resolution, output: Resolution) -> CropGeometry {
    if sensor.is_empty() || output.is_empty() {
        return CropGeometry::FULL;
    }

    let source = sensor.oriented(output.orientation());

    let source_aspect = source.aspect();
    let target_aspect = output.aspect();

    if source_aspect > target_aspect {
        let width_fraction = (source.height as f64 * target_aspect) / source.width as f64;
        let (offset, width) = centered(width_fraction);
        CropGeometry {
            offset_x_percent: offset,
            offset_y_percent: 0.0,
            width_percent: width,
            height_percent: CropGeometry::MAX_PERCENT,
        }
    } else {
        let height_fraction = (source.width as f64 / target_aspect) / source.height as f64;
        let (offset, height) = centered(height_fraction);
        CropGeometry {
            offset_x_percent: 0.0,
            offset_y_percent: offset,
            width_percent: CropGeometry::MAX_PERCENT,
            height_percent: height,
        }
    }
}

/// Offset and extent percentages for a centered span covering `fraction`.
fn centered(fraction: f64) -> (f64, f64) {
    let percent = fraction * 100.0;
    if percent >= CropGeometry::MAX_PERCENT {
        return (0.0, CropGeometry::MAX_PERCENT);
    }
    ((100.0 - percent) / 2.0, percent)
}
