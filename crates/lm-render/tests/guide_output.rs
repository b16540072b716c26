//! Integration tests: scene + source image → guide image.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lm_core::model::{
    ElementKind, ImageData, InstallSide, Scene, SceneElement, ScenePoint, Shape,
};
use lm_render::{GuideStyle, HitRadius, compose_guide_image, hit_test, sniff_mime_type};
use pretty_assertions::assert_eq;

fn encoded(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([20, 20, 20]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn strip(kelvin: u32, side: InstallSide, shape: Shape) -> SceneElement {
    SceneElement::new(
        ElementKind::Lighting {
            kelvin,
            install_side: side,
        },
        "strip",
        shape,
    )
}

#[test]
fn jpeg_source_yields_jpeg_guide() {
    let source = ImageData::new("image/jpeg", encoded(ImageFormat::Jpeg, 80, 60));
    let scene = Scene::from_elements(vec![
        strip(
            2700,
            InstallSide::Front,
            Shape::segment(ScenePoint::new(10.0, 20.0), ScenePoint::new(90.0, 20.0)),
        ),
        strip(
            6500,
            InstallSide::Back,
            Shape::path(vec![
                ScenePoint::new(10.0, 80.0),
                ScenePoint::new(50.0, 60.0),
                ScenePoint::new(90.0, 80.0),
            ])
            .unwrap(),
        ),
    ]);

    let guide = compose_guide_image(&source, &scene, &GuideStyle::default()).unwrap();
    assert_eq!(guide.mime_type, "image/jpeg");
    assert_eq!(sniff_mime_type(&guide.bytes).unwrap(), "image/jpeg");
    assert_ne!(guide.bytes, source.bytes);

    let decoded = image::load_from_memory(&guide.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (80, 60));
    let lit = decoded.get_pixel(40, 12);
    let dark = decoded.get_pixel(40, 36);
    assert!(lit[0] > dark[0], "{lit:?} vs {dark:?}");
}

#[test]
fn point_lights_leave_the_source_untouched() {
    let source = ImageData::new("image/png", encoded(ImageFormat::Png, 16, 16));
    let scene = Scene::from_elements(vec![SceneElement::new(
        ElementKind::lighting(),
        "pendant",
        Shape::point(ScenePoint::new(50.0, 10.0)),
    )]);
    let guide = compose_guide_image(&source, &scene, &GuideStyle::default()).unwrap();
    assert_eq!(guide, source);
}

#[test]
fn topmost_element_wins_the_hit() {
    let under = SceneElement::new(
        ElementKind::Plant,
        "fern",
        Shape::point(ScenePoint::new(50.0, 50.0)),
    );
    let over = SceneElement::new(
        ElementKind::Animal,
        "cat",
        Shape::point(ScenePoint::new(51.0, 50.0)),
    );
    let over_id = over.id;
    let scene = Scene::from_elements(vec![under, over]);
    let radius = HitRadius { x: 2.0, y: 2.0 };

    let hit = hit_test(&scene, ScenePoint::new(50.5, 50.0), radius).unwrap();
    assert_eq!(hit.id, over_id);
    assert!(hit_test(&scene, ScenePoint::new(10.0, 10.0), radius).is_none());
}
