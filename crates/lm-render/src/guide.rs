//! Guide compositor: burns glow + core strokes for linear lights into a copy
//! of the source photo.
//!
//! The guide is consumed only by the remote model. It shows *where* a light
//! fixture runs and *how* it should read (visible strip vs concealed cove),
//! independently of the text prompt.
//!
//! ```text
//! source ──decode──► base pixmap
//!                      │  glow layer (front) ─blur σ_f─┐
//!                      │  glow layer (back)  ─blur σ_b─┤
//!                      ◄──────────── composite ─────────┘
//!                      │  core strokes
//!                      └──encode (source format)──► guide bytes
//! ```
//!
//! Scenes without a linear light return the source bytes untouched.

use crate::error::{RenderError, RenderResult};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use kurbo::{BezPath, PathEl, Point};
use lm_core::model::{ImageData, InstallSide, Scene, SceneElement, ScenePoint, Shape};
use std::borrow::Cow;
use std::io::Cursor;
use tiny_skia::{
    IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

// ─── Style ───────────────────────────────────────────────────────────────

/// Stroke parameters for one install side, relative to `max(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub glow_width: f32,
    pub glow_sigma: f32,
    pub glow_alpha: f32,
    pub core_width: f32,
    pub core_alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideStyle {
    pub front: StrokeStyle,
    pub back: StrokeStyle,
    /// Lower bound for the core stroke in pixels.
    pub min_core_px: f32,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            front: StrokeStyle {
                glow_width: 0.025,
                glow_sigma: 0.012,
                glow_alpha: 0.55,
                core_width: 0.006,
                core_alpha: 1.0,
            },
            back: StrokeStyle {
                glow_width: 0.05,
                glow_sigma: 0.025,
                glow_alpha: 0.45,
                core_width: 0.006,
                core_alpha: 0.7,
            },
            min_core_px: 1.5,
        }
    }
}

impl GuideStyle {
    pub fn for_side(&self, side: InstallSide) -> &StrokeStyle {
        match side {
            InstallSide::Front => &self.front,
            InstallSide::Back => &self.back,
        }
    }
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Composite the guide for `scene` onto `source`.
///
/// Returns `Cow::Borrowed(source)` when the scene has no linear light.
pub fn compose_guide<'a>(
    source: &'a [u8],
    scene: &Scene,
    style: &GuideStyle,
) -> RenderResult<Cow<'a, [u8]>> {
    let lights: Vec<&SceneElement> = scene.iter().filter(|e| e.is_linear_light()).collect();
    if lights.is_empty() {
        log::debug!("guide: no linear lights, forwarding source unchanged");
        return Ok(Cow::Borrowed(source));
    }

    let format = image::guess_format(source).map_err(RenderError::Decode)?;
    let decoded = image::load_from_memory_with_format(source, format).map_err(RenderError::Decode)?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage);
    }
    let had_alpha = decoded.color().has_alpha();

    let mut base = pixmap_from_rgba(decoded.to_rgba8())?;
    let extent = width.max(height) as f32;

    for side in [InstallSide::Front, InstallSide::Back] {
        let side_lights: Vec<&SceneElement> = lights
            .iter()
            .copied()
            .filter(|e| e.install_side() == Some(side))
            .collect();
        if side_lights.is_empty() {
            continue;
        }
        let s = style.for_side(side);
        let mut glow = Pixmap::new(width, height).ok_or(RenderError::EmptyImage)?;
        for light in &side_lights {
            stroke_light(&mut glow, light, width, height, s.glow_width * extent, s.glow_alpha);
        }
        let glow = blur_pixmap(glow, s.glow_sigma * extent)?;
        base.draw_pixmap(
            0,
            0,
            glow.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    for light in &lights {
        let side = light.install_side().unwrap_or_default();
        let s = style.for_side(side);
        let core = (s.core_width * extent).max(style.min_core_px);
        stroke_light(&mut base, light, width, height, core, s.core_alpha);
    }

    log::debug!("guide: composited {} linear lights onto {width}x{height} {format:?}", lights.len());
    encode(base, format, had_alpha).map(Cow::Owned)
}

/// `compose_guide` over an [`ImageData`]; the MIME type follows the source.
pub fn compose_guide_image(
    source: &ImageData,
    scene: &Scene,
    style: &GuideStyle,
) -> RenderResult<ImageData> {
    match compose_guide(&source.bytes, scene, style)? {
        Cow::Borrowed(_) => Ok(source.clone()),
        Cow::Owned(bytes) => Ok(ImageData::new(source.mime_type.clone(), bytes)),
    }
}

/// Pixel dimensions of an encoded image without a full decode.
pub fn image_dimensions(bytes: &[u8]) -> RenderResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::Decode(image::ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(RenderError::Decode)
}

/// MIME type sniffed from the encoded bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> RenderResult<&'static str> {
    let format = image::guess_format(bytes).map_err(RenderError::Decode)?;
    Ok(format.to_mime_type())
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Pixel-space path for a linear element. Freehand points are smoothed with
/// midpoint quadratics; segments are a single line.
pub fn light_path(shape: &Shape, width: u32, height: u32) -> Option<BezPath> {
    let to_px = |p: ScenePoint| {
        Point::new(
            p.x as f64 / 100.0 * width as f64,
            p.y as f64 / 100.0 * height as f64,
        )
    };
    let mut bez = BezPath::new();
    match shape {
        Shape::Point { .. } => return None,
        Shape::Segment { start, end } => {
            bez.move_to(to_px(*start));
            bez.line_to(to_px(*end));
        }
        Shape::Path { points } => {
            let px: Vec<Point> = points.iter().map(|p| to_px(*p)).collect();
            bez.move_to(px[0]);
            for i in 1..px.len() - 1 {
                bez.quad_to(px[i], px[i].midpoint(px[i + 1]));
            }
            bez.line_to(px[px.len() - 1]);
        }
    }
    Some(bez)
}

fn to_skia_path(bez: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn stroke_light(
    target: &mut Pixmap,
    light: &SceneElement,
    width: u32,
    height: u32,
    stroke_width: f32,
    alpha: f32,
) {
    let Some(path) = light_path(&light.shape, width, height).and_then(|b| to_skia_path(&b)) else {
        log::trace!("guide: {} has no drawable path", light.id);
        return;
    };
    let [r, g, b] = kelvin_to_rgb(light.kelvin().unwrap_or(lm_core::DEFAULT_KELVIN));
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: stroke_width.max(0.5),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    target.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

// ─── Colour ──────────────────────────────────────────────────────────────

/// Approximate sRGB colour of a black-body light source.
pub fn kelvin_to_rgb(kelvin: u32) -> [u8; 3] {
    let t = kelvin.clamp(1000, 40000) as f64 / 100.0;
    let r = if t <= 66.0 {
        255.0
    } else {
        329.698727446 * (t - 60.0).powf(-0.1332047592)
    };
    let g = if t <= 66.0 {
        99.4708025861 * t.ln() - 161.1195681661
    } else {
        288.1221695283 * (t - 60.0).powf(-0.0755148492)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.5177312231 * (t - 10.0).ln() - 305.0447927307
    };
    [r, g, b].map(|c| c.clamp(0.0, 255.0).round() as u8)
}

// ─── Pixel plumbing ──────────────────────────────────────────────────────

fn pixmap_from_rgba(rgba: ImageBuffer<Rgba<u8>, Vec<u8>>) -> RenderResult<Pixmap> {
    let (w, h) = rgba.dimensions();
    let size = IntSize::from_wh(w, h).ok_or(RenderError::EmptyImage)?;
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or(RenderError::EmptyImage)
}

fn rgba_from_pixmap(pixmap: Pixmap) -> RenderResult<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    let (w, h) = (pixmap.width(), pixmap.height());
    let mut data = pixmap.take();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    ImageBuffer::from_raw(w, h, data).ok_or(RenderError::EmptyImage)
}

/// Gaussian blur of a premultiplied layer.
fn blur_pixmap(layer: Pixmap, sigma: f32) -> RenderResult<Pixmap> {
    if sigma < 0.5 {
        return Ok(layer);
    }
    let (w, h) = (layer.width(), layer.height());
    let size = IntSize::from_wh(w, h).ok_or(RenderError::EmptyImage)?;
    let buf: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(w, h, layer.take()).ok_or(RenderError::EmptyImage)?;
    let blurred = image::imageops::blur(&buf, sigma);
    Pixmap::from_vec(blurred.into_raw(), size).ok_or(RenderError::EmptyImage)
}

fn encode(pixmap: Pixmap, format: ImageFormat, keep_alpha: bool) -> RenderResult<Vec<u8>> {
    let rgba = DynamicImage::ImageRgba8(rgba_from_pixmap(pixmap)?);
    let image = match format {
        ImageFormat::Png | ImageFormat::WebP if keep_alpha => rgba,
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(rgba.to_rgb8())
        }
        other => return Err(RenderError::UnsupportedFormat(format!("{other:?}"))),
    };
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).map_err(RenderError::Encode)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lm_core::model::ElementKind;
    use pretty_assertions::assert_eq;

    fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn light(shape: Shape, side: InstallSide) -> SceneElement {
        SceneElement::new(
            ElementKind::Lighting {
                kelvin: 3000,
                install_side: side,
            },
            "strip",
            shape,
        )
    }

    #[test]
    fn scene_without_linear_lights_is_forwarded_unchanged() {
        let src = png(8, 8, [10, 20, 30]);
        let lamp = SceneElement::new(
            ElementKind::lighting(),
            "lamp",
            Shape::point(ScenePoint::new(50.0, 50.0)),
        );
        let scene = Scene::from_elements(vec![lamp]);
        let out = compose_guide(&src, &scene, &GuideStyle::default()).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), src.as_slice());
    }

    #[test]
    fn segment_light_is_burned_in() {
        let src = png(64, 32, [0, 0, 0]);
        let scene = Scene::from_elements(vec![light(
            Shape::segment(ScenePoint::new(10.0, 50.0), ScenePoint::new(90.0, 50.0)),
            InstallSide::Front,
        )]);
        let out = compose_guide(&src, &scene, &GuideStyle::default()).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert!(!decoded.color().has_alpha());
        let guide = decoded.to_rgb8();
        assert_eq!(guide.dimensions(), (64, 32));
        let on_line = guide.get_pixel(32, 16);
        let far = guide.get_pixel(32, 1);
        assert!(on_line[0] > 150, "core stroke should be bright, got {on_line:?}");
        assert!(far[0] < on_line[0]);
    }

    #[test]
    fn back_install_core_is_dimmer() {
        let src = png(64, 64, [0, 0, 0]);
        let seg = Shape::segment(ScenePoint::new(10.0, 50.0), ScenePoint::new(90.0, 50.0));
        let front = compose_guide(
            &src,
            &Scene::from_elements(vec![light(seg.clone(), InstallSide::Front)]),
            &GuideStyle::default(),
        )
        .unwrap();
        let back = compose_guide(
            &src,
            &Scene::from_elements(vec![light(seg, InstallSide::Back)]),
            &GuideStyle::default(),
        )
        .unwrap();
        let f = image::load_from_memory(&front).unwrap().to_rgb8();
        let b = image::load_from_memory(&back).unwrap().to_rgb8();
        assert!(b.get_pixel(32, 32)[0] < f.get_pixel(32, 32)[0]);
    }

    #[test]
    fn freehand_path_is_smoothed_with_midpoint_quads() {
        let shape = Shape::path(vec![
            ScenePoint::new(0.0, 0.0),
            ScenePoint::new(50.0, 0.0),
            ScenePoint::new(50.0, 50.0),
            ScenePoint::new(100.0, 50.0),
        ])
        .unwrap();
        let bez = light_path(&shape, 100, 100).unwrap();
        let els = bez.elements();
        assert_eq!(els.len(), 4);
        assert_eq!(els[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(
            els[1],
            PathEl::QuadTo(Point::new(50.0, 0.0), Point::new(50.0, 25.0))
        );
        assert_eq!(
            els[2],
            PathEl::QuadTo(Point::new(50.0, 50.0), Point::new(75.0, 50.0))
        );
        assert_eq!(els[3], PathEl::LineTo(Point::new(100.0, 50.0)));
    }

    #[test]
    fn kelvin_colours_shift_from_warm_to_cool() {
        let warm = kelvin_to_rgb(2000);
        let cool = kelvin_to_rgb(9000);
        assert_eq!(warm[0], 255);
        assert!(warm[2] < cool[2]);
        assert_eq!(kelvin_to_rgb(6600), [255, 255, 255]);
    }

    #[test]
    fn corrupt_source_is_a_decode_error() {
        let scene = Scene::from_elements(vec![light(
            Shape::segment(ScenePoint::new(0.0, 0.0), ScenePoint::new(10.0, 10.0)),
            InstallSide::Front,
        )]);
        let err = compose_guide(b"not an image", &scene, &GuideStyle::default()).unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }

    #[test]
    fn dimensions_and_mime_are_sniffed() {
        let src = png(12, 7, [1, 2, 3]);
        assert_eq!(image_dimensions(&src).unwrap(), (12, 7));
        assert_eq!(sniff_mime_type(&src).unwrap(), "image/png");
    }
}
