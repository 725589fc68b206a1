// SPDX-License-Identifier: MPL-2.0
//! Presentation geometry.
//!
//! Decoded frames are rescaled to `native × zoom`, then every scaled pixel is
//! blitted as a `magnify × magnify` block. The part of the scaled frame that
//! is drawn is clamped so that, once magnified, it fits the surface.

/// Resolved presentation geometry, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub zoom: u32,
    pub magnify: u32,
    /// Scaler output width (`native_width * zoom`).
    pub scaled_width: u32,
    /// Scaler output height (`native_height * zoom`).
    pub scaled_height: u32,
    /// Scaled columns drawn per row, before magnification.
    pub render_width: u32,
    /// Scaled rows drawn, before magnification.
    pub render_height: u32,
}

/// Resolves the presentation geometry.
///
/// `requested_magnify` of `None` or `Some(0)` selects the automatic value
/// `surface_rows / native_height`. The automatic value deliberately uses the
/// un-zoomed native height while the clamps below use zoomed extents; this
/// asymmetry is pinned behaviour. Zoom and magnify are floored to 1.
pub fn resolve(
    native_width: u32,
    native_height: u32,
    zoom: u32,
    requested_magnify: Option<u32>,
    surface_cols: u32,
    surface_rows: u32,
) -> Geometry {
    let zoom = zoom.max(1);
    let magnify = match requested_magnify {
        Some(m) if m > 0 => m,
        _ => surface_rows.checked_div(native_height).unwrap_or(1),
    }
    .max(1);

    let scaled_width = native_width.saturating_mul(zoom);
    let scaled_height = native_height.saturating_mul(zoom);

    Geometry {
        zoom,
        magnify,
        scaled_width,
        scaled_height,
        render_width: scaled_width.min(surface_cols / magnify),
        render_height: scaled_height.min(surface_rows / magnify),
    }
}
