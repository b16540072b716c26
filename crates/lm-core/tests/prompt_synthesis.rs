//! Integration tests: scene → prompt (lm-core).
//!
//! Exercises the synthesizer as a pure function over scenes loaded the way
//! a saved scene dump would be.

use lm_core::*;
use pretty_assertions::assert_eq;

const SCENE_JSON: &str = r#"{
    "elements": [
        { "id": "person_a", "kind": "person", "pose": "standing", "label": "man",
          "shape": { "type": "point", "at": { "x": 80, "y": 50 } } },
        { "id": "lighting_a", "kind": "lighting", "kelvin": 2700, "install_side": "back",
          "label": "cove light",
          "shape": { "type": "segment", "start": { "x": 5, "y": 10 }, "end": { "x": 95, "y": 10 } } },
        { "id": "lighting_b", "kind": "lighting", "label": "",
          "shape": { "type": "path", "points": [ { "x": 50, "y": 90 }, { "x": 60, "y": 80 }, { "x": 50, "y": 50 } ] } }
    ]
}"#;

fn tagged(kind: ElementKind, tag: Option<u8>, x: f32) -> SceneElement {
    let mut el = SceneElement::new(kind, "", Shape::point(ScenePoint::new(x, 50.0)));
    el.reference_image = tag.map(|t| ImageData::new("image/jpeg", vec![t]));
    el
}

#[test]
fn loaded_scene_describes_every_element() {
    let scene: Scene = serde_json::from_str(SCENE_JSON).unwrap();
    let out = synthesize(&PromptSettings::default(), &scene, OutputKind::Image);

    let expected = "Include exactly: \
        a standing man placed right area, \
        a cove light as backlighting/cove lighting concealed behind the surface \
        from top left area to top right area (Light Color Temperature strictly: 2700 Kelvin), \
        a light as direct surface installation following the marked path \
        from bottom area to exact center (Light Color Temperature strictly: 3000 Kelvin).";
    assert!(out.text.contains(expected), "{}", out.text);
    assert!(out.text.contains(
        "Render light only along the marked guide lines; do not add stray light elsewhere."
    ));
    assert!(out.references.is_empty());
}

#[test]
fn same_scene_same_prompt() {
    let scene: Scene = serde_json::from_str(SCENE_JSON).unwrap();
    let settings = PromptSettings {
        base_text: "An attic bedroom".into(),
        mood: Mood::Evening,
        enhancements: vec![Enhancement::Lighting],
        ..PromptSettings::default()
    };
    let a = synthesize(&settings, &scene, OutputKind::Video);
    let b = synthesize(&settings, &scene.clone(), OutputKind::Video);
    assert_eq!(a.text, b.text);
}

#[test]
fn reference_ordinals_follow_bearing_elements() {
    // R _ R _ _ R: the third bearer is #3 and third in the list.
    let pattern = [Some(10u8), None, Some(20), None, None, Some(30)];
    let elements: Vec<SceneElement> = pattern
        .iter()
        .enumerate()
        .map(|(i, tag)| tagged(ElementKind::Plant, *tag, i as f32 * 10.0))
        .collect();
    let bearers: Vec<ElementId> = elements
        .iter()
        .filter(|e| e.reference_image.is_some())
        .map(|e| e.id)
        .collect();
    let scene = Scene::from_elements(elements);

    let out = synthesize(&PromptSettings::default(), &scene, OutputKind::Image);
    let ordinals: Vec<usize> = out.references.iter().map(|r| r.ordinal).collect();
    let owners: Vec<ElementId> = out.references.iter().map(|r| r.element).collect();
    let tags: Vec<u8> = out.reference_images().iter().map(|i| i.bytes[0]).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert_eq!(owners, bearers);
    assert_eq!(tags, vec![10, 20, 30]);
    for n in 1..=3 {
        assert!(out.text.contains(&format!("(use reference image #{n} for its appearance)")));
    }
    assert!(!out.text.contains("#4"));
}

#[test]
fn out_of_range_coordinates_clamp_on_load() {
    let json = r#"{ "elements": [
        { "id": "plant_far", "kind": "plant", "label": "palm",
          "shape": { "type": "point", "at": { "x": 250, "y": -10 } } }
    ] }"#;
    let scene: Scene = serde_json::from_str(json).unwrap();
    assert_eq!(scene.elements[0].anchor(), ScenePoint::new(100.0, 0.0));
    let out = synthesize(&PromptSettings::default(), &scene, OutputKind::Image);
    assert!(out.text.contains("a palm placed top right area"));
}
