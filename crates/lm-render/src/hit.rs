//! Hit testing: pointer position → element handle.
//!
//! Walks elements back to front (last added = topmost) and reports the first
//! pin handle within the hit radius. Radii are given per axis in percent
//! units because the image box is rarely square.

use lm_core::ElementId;
use lm_core::model::{Handle, Scene, ScenePoint, Shape};

/// Hit radius in percent units along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRadius {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ElementId,
    pub handle: Handle,
}

/// Find the topmost handle at `p`. Returns `None` on background.
pub fn hit_test(scene: &Scene, p: ScenePoint, radius: HitRadius) -> Option<Hit> {
    for element in scene.elements.iter().rev() {
        // End handles are checked first so a short segment can still be stretched.
        if let Shape::Segment { end, .. } = element.shape
            && within(p, end, radius)
        {
            return Some(Hit {
                id: element.id,
                handle: Handle::End,
            });
        }
        if within(p, element.anchor(), radius) {
            return Some(Hit {
                id: element.id,
                handle: Handle::Start,
            });
        }
        if let Shape::Path { points } = &element.shape
            && points.last().is_some_and(|last| within(p, *last, radius))
        {
            return Some(Hit {
                id: element.id,
                handle: Handle::End,
            });
        }
    }
    None
}

fn within(p: ScenePoint, target: ScenePoint, radius: HitRadius) -> bool {
    if radius.x <= 0.0 || radius.y <= 0.0 {
        return false;
    }
    let dx = (p.x - target.x) / radius.x;
    let dy = (p.y - target.y) / radius.y;
    dx * dx + dy * dy <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lm_core::model::{ElementKind, SceneElement};

    const R: HitRadius = HitRadius { x: 2.0, y: 3.0 };

    #[test]
    fn hit_topmost_point() {
        let a = SceneElement::new(ElementKind::Plant, "a", Shape::point(ScenePoint::new(50.0, 50.0)));
        let b = SceneElement::new(ElementKind::Plant, "b", Shape::point(ScenePoint::new(51.0, 50.0)));
        let b_id = b.id;
        let scene = Scene::from_elements(vec![a, b]);
        let hit = hit_test(&scene, ScenePoint::new(50.5, 50.0), R).unwrap();
        assert_eq!(hit.id, b_id);
        assert_eq!(hit.handle, Handle::Start);
    }

    #[test]
    fn miss_on_background() {
        let a = SceneElement::new(ElementKind::Plant, "a", Shape::point(ScenePoint::new(50.0, 50.0)));
        let scene = Scene::from_elements(vec![a]);
        assert!(hit_test(&scene, ScenePoint::new(10.0, 10.0), R).is_none());
        // Elliptical radius: 2.5 in x exceeds rx = 2
        assert!(hit_test(&scene, ScenePoint::new(52.5, 50.0), R).is_none());
        assert!(hit_test(&scene, ScenePoint::new(50.0, 52.5), R).is_some());
    }

    #[test]
    fn segment_end_handle() {
        let seg = SceneElement::new(
            ElementKind::lighting(),
            "strip",
            Shape::segment(ScenePoint::new(10.0, 10.0), ScenePoint::new(40.0, 10.0)),
        );
        let scene = Scene::from_elements(vec![seg]);
        let hit = hit_test(&scene, ScenePoint::new(39.0, 11.0), R).unwrap();
        assert_eq!(hit.handle, Handle::End);
        let hit = hit_test(&scene, ScenePoint::new(10.5, 10.0), R).unwrap();
        assert_eq!(hit.handle, Handle::Start);
    }
}
