//! Aspect-ratio-preserving target sizes.
//!
//! The longer side of the source maps to the target; the shorter side is
//! scaled by the same ratio. Upscaling is allowed.

/// Errors from target size computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// A source or target dimension was zero
    #[error("Invalid image dimension: {width}x{height} into {target}")]
    InvalidDimension { width: u32, height: u32, target: u32 },
}

/// Compute the size that fits `source_width x source_height` into a
/// `target_width` square, keeping the aspect ratio.
///
/// Each side is rounded to the nearest pixel (halves round up) and is at
/// least 1.
///
/// ```ignore
/// assert_eq!(compute_target_size(1920, 1080, 100)?, (100, 56));
/// ```
pub fn compute_target_size(
    source_width: u32,
    source_height: u32,
    target_width: u32,
) -> Result<(u32, u32), FitError> {
    if source_width == 0 || source_height == 0 || target_width == 0 {
        return Err(FitError::InvalidDimension {
            width: source_width,
            height: source_height,
            target: target_width,
        });
    }

    let longest = source_width.max(source_height);
    Ok((
        scale_side(source_width, target_width, longest),
        scale_side(source_height, target_width, longest),
    ))
}

/// `round(side * target / longest)`, min 1, in integer arithmetic.
fn scale_side(side: u32, target: u32, longest: u32) -> u32 {
    let (side, target, longest) = (u128::from(side), u128::from(target), u128::from(longest));
    let scaled = (2 * side * target + longest) / (2 * longest);
    // side <= longest, so scaled <= target and always fits
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}
