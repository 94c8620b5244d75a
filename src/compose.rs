use crate::error::Error;
use crate::raster::RasterImage;
use image::imageops::{self, FilterType};
use image::RgbaImage;

//===========================================================================//

/// Derives a square icon canvas of `target_size` pixels per side from an
/// arbitrarily-sized source image.
///
/// The source is scaled by a uniform factor of
/// `min(target/width, target/height)`, preserving its aspect ratio exactly
/// and never exceeding the target in either dimension.  It is resampled
/// with a Catmull-Rom kernel and composited centered onto a fully
/// transparent canvas.  Fractional centering offsets are truncated,
/// favoring the top and left.  The source is never mutated.
pub fn compose(
    source: &RasterImage,
    target_size: u32,
) -> Result<RasterImage, Error> {
    if target_size == 0 {
        invalid_input!("icon size must be nonzero");
    }
    if source.width() == 0 || source.height() == 0 {
        invalid_input!(
            "source image has a zero dimension ({}x{})",
            source.width(),
            source.height()
        );
    }
    let scale = f64::min(
        target_size as f64 / source.width() as f64,
        target_size as f64 / source.height() as f64,
    );
    let scaled_width =
        ((source.width() as f64 * scale).round() as u32).max(1);
    let scaled_height =
        ((source.height() as f64 * scale).round() as u32).max(1);
    debug_assert!(scaled_width <= target_size);
    debug_assert!(scaled_height <= target_size);
    let base = match RgbaImage::from_raw(
        source.width(),
        source.height(),
        source.rgba_data().to_vec(),
    ) {
        Some(base) => base,
        None => encoding_error!("pixel buffer does not match dimensions"),
    };
    let scaled =
        imageops::resize(&base, scaled_width, scaled_height, FilterType::CatmullRom);
    // A new RgbaImage is zero-filled, i.e. fully transparent.
    let mut canvas = RgbaImage::new(target_size, target_size);
    let x = ((target_size - scaled_width) / 2) as i64;
    let y = ((target_size - scaled_height) / 2) as i64;
    imageops::replace(&mut canvas, &scaled, x, y);
    Ok(RasterImage::from_rgba_data(
        target_size,
        target_size,
        canvas.into_raw(),
    ))
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::compose;
    use crate::raster::RasterImage;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            rgba.extend_from_slice(&color);
        }
        RasterImage::from_rgba_data(width, height, rgba)
    }

    fn pixel(image: &RasterImage, x: u32, y: u32) -> [u8; 4] {
        let start = (4 * (y * image.width() + x)) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&image.rgba_data()[start..start + 4]);
        out
    }

    #[test]
    fn output_is_square() {
        let source = solid(100, 37, [1, 2, 3, 255]);
        for &size in &[1u32, 7, 16, 64, 256, 300] {
            let canvas = compose(&source, size).unwrap();
            assert_eq!(canvas.width(), size);
            assert_eq!(canvas.height(), size);
        }
    }

    #[test]
    fn wide_source_is_letterboxed() {
        // A 4x2 source fits a 4x4 canvas as 4x2 content centered at y=1,
        // leaving the first and last rows transparent.
        let source = solid(4, 2, [200, 10, 10, 255]);
        let canvas = compose(&source, 4).unwrap();
        for x in 0..4 {
            assert_eq!(pixel(&canvas, x, 0), [0, 0, 0, 0]);
            assert_eq!(pixel(&canvas, x, 1), [200, 10, 10, 255]);
            assert_eq!(pixel(&canvas, x, 2), [200, 10, 10, 255]);
            assert_eq!(pixel(&canvas, x, 3), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn tall_source_is_pillarboxed() {
        let source = solid(2, 4, [10, 200, 10, 255]);
        let canvas = compose(&source, 4).unwrap();
        for y in 0..4 {
            assert_eq!(pixel(&canvas, 0, y), [0, 0, 0, 0]);
            assert_eq!(pixel(&canvas, 1, y), [10, 200, 10, 255]);
            assert_eq!(pixel(&canvas, 2, y), [10, 200, 10, 255]);
            assert_eq!(pixel(&canvas, 3, y), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn odd_padding_favors_top_left() {
        // 5x2 content on a 5x5 canvas: the vertical offset truncates to
        // floor((5 - 2) / 2) = 1, leaving one padding row above and two
        // below.
        let source = solid(5, 2, [7, 7, 7, 255]);
        let canvas = compose(&source, 5).unwrap();
        assert_eq!(pixel(&canvas, 2, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&canvas, 2, 1), [7, 7, 7, 255]);
        assert_eq!(pixel(&canvas, 2, 2), [7, 7, 7, 255]);
        assert_eq!(pixel(&canvas, 2, 3), [0, 0, 0, 0]);
        assert_eq!(pixel(&canvas, 2, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn small_source_is_upscaled_to_fit() {
        let source = solid(1, 1, [50, 60, 70, 255]);
        let canvas = compose(&source, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(pixel(&canvas, x, y), [50, 60, 70, 255]);
            }
        }
    }

    #[test]
    fn extreme_aspect_ratio_keeps_one_pixel() {
        // Scaling a 1000x1 strip down to 16 would round the height to zero;
        // it must be clamped to a single row instead.
        let source = solid(1000, 1, [9, 9, 9, 255]);
        let canvas = compose(&source, 16).unwrap();
        assert_eq!(canvas.width(), 16);
        assert_eq!(canvas.height(), 16);
        let mut opaque_rows = 0;
        for y in 0..16 {
            if pixel(&canvas, 8, y)[3] != 0 {
                opaque_rows += 1;
            }
        }
        assert_eq!(opaque_rows, 1);
    }

    #[test]
    fn zero_target_size_is_rejected() {
        let source = solid(4, 4, [0, 0, 0, 255]);
        assert!(matches!(
            compose(&source, 0),
            Err(crate::Error::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_dimension_source_is_rejected() {
        let source = RasterImage::from_rgba_data(0, 5, Vec::new());
        assert!(matches!(
            compose(&source, 16),
            Err(crate::Error::InvalidInput(_))
        ));
    }
}

//===========================================================================//
