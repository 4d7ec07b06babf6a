//! Deterministic output file naming.
//!
//! [`variant_file_name`] is a pure function from
//! `(base name, frame index, format, optional quality)` to a file name.
//! Determinism is load-bearing: re-running an extraction must map every
//! frame variant onto the identical path so runs are idempotent.

use crate::export::ExportFormat;

/// Compute the file name for one exported frame variant.
///
/// The layout is `<base>_frame_<index, zero-padded to 6 digits>` followed by
/// `_<FORMAT>_QUALITY=<q>` when a quality level applies, and the format's
/// extension. Lossless formats never carry a quality suffix.
///
/// # Example
///
/// ```
/// use framesift::{ExportFormat, variant_file_name};
///
/// assert_eq!(
///     variant_file_name("clip", 42, ExportFormat::Jpeg, Some(90)),
///     "clip_frame_000042_JPEG_QUALITY=90.jpg",
/// );
/// assert_eq!(
///     variant_file_name("clip", 42, ExportFormat::Png, None),
///     "clip_frame_000042.png",
/// );
/// ```
pub fn variant_file_name(
    base_name: &str,
    frame_index: u64,
    format: ExportFormat,
    quality: Option<u8>,
) -> String {
    match quality {
        Some(quality) => format!(
            "{base_name}_frame_{frame_index:06}_{}_QUALITY={quality}.{}",
            format.quality_label(),
            format.extension(),
        ),
        None => format!(
            "{base_name}_frame_{frame_index:06}.{}",
            format.extension(),
        ),
    }
}
