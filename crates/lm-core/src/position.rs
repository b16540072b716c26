//! 3×3 position buckets used to describe where an element sits in the image.
//!
//! Thresholds are symmetric at 35 and 65 percent. Values exactly on a
//! threshold belong to the middle/center bucket.

use crate::model::ScenePoint;

const LOW: f32 = 35.0;
const HIGH: f32 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

impl Vertical {
    pub fn of(y: f32) -> Self {
        if y < LOW {
            Vertical::Top
        } else if y > HIGH {
            Vertical::Bottom
        } else {
            Vertical::Middle
        }
    }

    fn word(self) -> &'static str {
        match self {
            Vertical::Top => "top",
            Vertical::Middle => "middle",
            Vertical::Bottom => "bottom",
        }
    }
}

impl Horizontal {
    pub fn of(x: f32) -> Self {
        if x < LOW {
            Horizontal::Left
        } else if x > HIGH {
            Horizontal::Right
        } else {
            Horizontal::Center
        }
    }

    fn word(self) -> &'static str {
        match self {
            Horizontal::Left => "left",
            Horizontal::Center => "center",
            Horizontal::Right => "right",
        }
    }
}

/// Describe a percentage coordinate as one of nine fixed labels.
pub fn position_descriptor(x: f32, y: f32) -> String {
    match (Vertical::of(y), Horizontal::of(x)) {
        (Vertical::Middle, Horizontal::Center) => "exact center".to_string(),
        (Vertical::Middle, h) => format!("{} area", h.word()),
        (v, Horizontal::Center) => format!("{} area", v.word()),
        (v, h) => format!("{} {} area", v.word(), h.word()),
    }
}

pub fn describe_point(p: ScenePoint) -> String {
    position_descriptor(p.x, p.y)
}
