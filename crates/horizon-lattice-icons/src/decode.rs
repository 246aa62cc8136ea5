//! Decoding backends used by the icon sources.
//!
//! The pipeline treats decoding as an opaque, fallible, synchronous service
//! that runs on the worker thread. Two capabilities are needed:
//!
//! - [`RasterDecoder`] turns encoded bitmap bytes (PNG and friends) into
//!   pixels. The default is [`ImageDecoder`], backed by the `image` crate.
//! - [`VectorRasterizer`] renders vector markup at a display scale. The
//!   default is [`SvgRasterizer`], backed by `resvg`.
//!
//! Both produce straight-alpha RGBA8 [`IconImage`]s.

use resvg::tiny_skia;
use resvg::usvg;

use crate::error::{IconError, IconResult};
use crate::icon_image::IconImage;

/// Decodes encoded bitmap bytes.
pub trait RasterDecoder: Send + Sync {
    /// Decode `bytes`. `name_hint` identifies the icon in errors and logs.
    fn decode(&self, name_hint: &str, bytes: &[u8]) -> IconResult<IconImage>;
}

/// Renders vector source data.
pub trait VectorRasterizer: Send + Sync {
    /// Render `source` at its natural size multiplied by `display_scale`.
    fn render(&self, source: &[u8], display_scale: f32) -> IconResult<IconImage>;
}

/// [`RasterDecoder`] backed by the `image` crate.
///
/// Accepts every format enabled in the `image` dependency and guesses the
/// format from the data.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl RasterDecoder for ImageDecoder {
    fn decode(&self, name_hint: &str, bytes: &[u8]) -> IconResult<IconImage> {
        let decoded = image::load_from_memory(bytes).map_err(|source| IconError::ImageDecode {
            name: name_hint.to_string(),
            source,
        })?;
        IconImage::from_rgba_image(decoded.to_rgba8())
    }
}

/// [`VectorRasterizer`] backed by `resvg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgRasterizer;

impl SvgRasterizer {
    /// Get the natural size of an SVG document.
    pub fn natural_size(source: &[u8]) -> IconResult<(f32, f32)> {
        let tree = parse(source)?;
        let size = tree.size();
        Ok((size.width(), size.height()))
    }
}

impl VectorRasterizer for SvgRasterizer {
    fn render(&self, source: &[u8], display_scale: f32) -> IconResult<IconImage> {
        let tree = parse(source)?;
        let natural = tree.size();

        // Truncate like an integer conversion; NaN and negatives become zero
        let width = (natural.width() * display_scale) as u32;
        let height = (natural.height() * display_scale) as u32;
        if width == 0 || height == 0 {
            return Err(IconError::InvalidDimensions { width, height });
        }

        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            IconError::Rasterize(format!("cannot allocate a {width}x{height} pixmap"))
        })?;

        let transform = tiny_skia::Transform::from_scale(
            width as f32 / natural.width(),
            height as f32 / natural.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha
        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let color = px.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect::<Vec<_>>();

        IconImage::from_rgba(width, height, pixels)
    }
}

fn parse(source: &[u8]) -> IconResult<usvg::Tree> {
    let options = usvg::Options::default();
    Ok(usvg::Tree::from_data(source, &options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIRCLE_SVG: &[u8] = br#"
        <svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
            <circle cx="12" cy="12" r="10" fill="red"/>
        </svg>
    "#;

    const HALF_ALPHA_SVG: &[u8] = br#"
        <svg xmlns="http://www.w3.org/2000/svg" width="4" height="4">
            <rect width="4" height="4" fill="blue" fill-opacity="0.5"/>
        </svg>
    "#;

    #[test]
    fn test_natural_size() {
        assert_eq!(SvgRasterizer::natural_size(CIRCLE_SVG).unwrap(), (24.0, 24.0));
    }

    #[test]
    fn test_render_scaled() {
        let image = SvgRasterizer.render(CIRCLE_SVG, 2.0).unwrap();
        assert_eq!(image.size(), (48, 48));

        // Center pixel is inside the circle
        let [r, g, b, a] = image.pixel(24, 24).unwrap();
        assert!(r > 200, "red channel should be high");
        assert!(g < 50 && b < 50);
        assert!(a > 200, "alpha should be opaque");

        // Corner is outside
        assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_render_truncates_size() {
        let image = SvgRasterizer.render(CIRCLE_SVG, 1.25).unwrap();
        assert_eq!(image.size(), (30, 30));

        let image = SvgRasterizer.render(CIRCLE_SVG, 0.99).unwrap();
        assert_eq!(image.size(), (23, 23));
    }

    #[test]
    fn test_render_straight_alpha() {
        let image = SvgRasterizer.render(HALF_ALPHA_SVG, 1.0).unwrap();
        let [r, g, b, a] = image.pixel(1, 1).unwrap();
        assert_eq!(r, 0);
        assert_eq!(g, 0);
        assert!(b > 250, "blue should be unpremultiplied, got {b}");
        assert!((120..=135).contains(&a));
    }

    #[test]
    fn test_render_zero_size() {
        assert!(matches!(
            SvgRasterizer.render(CIRCLE_SVG, 0.0),
            Err(IconError::InvalidDimensions { width: 0, height: 0 })
        ));
        assert!(SvgRasterizer.render(CIRCLE_SVG, -1.0).is_err());
    }

    #[test]
    fn test_render_oversized() {
        // Row size overflows before any allocation happens
        assert!(matches!(
            SvgRasterizer.render(CIRCLE_SVG, 3.0e7),
            Err(IconError::Rasterize(_))
        ));
    }

    #[test]
    fn test_render_invalid_svg() {
        assert!(matches!(
            SvgRasterizer.render(b"not valid svg", 1.0),
            Err(IconError::SvgParse(_))
        ));
    }

    #[test]
    fn test_image_decoder_png() {
        let mut rgba = image::RgbaImage::new(3, 5);
        rgba.put_pixel(2, 4, image::Rgba([9, 8, 7, 255]));
        let mut bytes = Vec::new();
        rgba.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let image = ImageDecoder.decode("dot", &bytes).unwrap();
        assert_eq!(image.size(), (3, 5));
        assert_eq!(image.pixel(2, 4), Some([9, 8, 7, 255]));
    }

    #[test]
    fn test_image_decoder_garbage() {
        let err = ImageDecoder.decode("broken", b"\x00\x01garbage").unwrap_err();
        assert!(matches!(err, IconError::ImageDecode { ref name, .. } if name == "broken"));
    }
}
