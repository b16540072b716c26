//! Scene manifests: a JSON description of a source image, its annotations
//! and the generation settings. Paths are relative to the manifest file.

use anyhow::{Context as _, bail};
use lm_core::ElementId;
use lm_core::model::{
    DEFAULT_KELVIN, ElementKind, ImageData, InstallSide, Pose, Scene, SceneElement, ScenePoint,
    Shape,
};
use lm_gen::GenerationSettings;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub image: PathBuf,
    #[serde(flatten)]
    pub settings: GenerationSettings,
    #[serde(default)]
    pub elements: Vec<ManifestElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindName {
    Person,
    Animal,
    Vehicle,
    Plant,
    Lighting,
    Furniture,
}

#[derive(Debug, Deserialize)]
pub struct ManifestElement {
    /// Optional stable id; a fresh one is generated otherwise.
    pub id: Option<String>,
    pub kind: KindName,
    #[serde(default)]
    pub label: String,
    pub pose: Option<Pose>,
    pub kelvin: Option<u32>,
    pub install_side: Option<InstallSide>,
    pub at: Option<ScenePoint>,
    pub from: Option<ScenePoint>,
    pub to: Option<ScenePoint>,
    pub path: Option<Vec<ScenePoint>>,
    pub reference_image: Option<PathBuf>,
}

/// A manifest with every referenced file read.
#[derive(Debug)]
pub struct LoadedManifest {
    pub source: ImageData,
    pub scene: Scene,
    pub settings: GenerationSettings,
}

impl Manifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parse manifest")
    }

    pub fn load(path: &Path) -> anyhow::Result<LoadedManifest> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        let manifest = Self::from_json(&json)
            .with_context(|| format!("in '{}'", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.resolve(base)
    }

    /// Read the source and reference images relative to `base`.
    pub fn resolve(self, base: &Path) -> anyhow::Result<LoadedManifest> {
        let source = read_image(&base.join(&self.image))?;
        let mut elements = Vec::with_capacity(self.elements.len());
        let mut seen = HashSet::new();
        for (i, entry) in self.elements.iter().enumerate() {
            let mut element = entry
                .to_element()
                .with_context(|| format!("element #{i}"))?;
            if !seen.insert(element.id) {
                bail!("element #{i}: duplicate id '{}'", element.id);
            }
            if let Some(rel) = &entry.reference_image {
                element.reference_image = Some(read_image(&base.join(rel))?);
            }
            elements.push(element);
        }
        log::debug!("manifest: {} elements", elements.len());
        Ok(LoadedManifest {
            source,
            scene: Scene::from_elements(elements),
            settings: self.settings,
        })
    }
}

impl ManifestElement {
    /// Build the scene element, without its reference image.
    pub fn to_element(&self) -> anyhow::Result<SceneElement> {
        let kind = match self.kind {
            KindName::Person => ElementKind::Person {
                pose: self.pose.unwrap_or_default(),
            },
            KindName::Animal => ElementKind::Animal,
            KindName::Vehicle => ElementKind::Vehicle,
            KindName::Plant => ElementKind::Plant,
            KindName::Lighting => ElementKind::Lighting {
                kelvin: self.kelvin.unwrap_or(DEFAULT_KELVIN),
                install_side: self.install_side.unwrap_or_default(),
            },
            KindName::Furniture => ElementKind::Furniture,
        };
        if self.pose.is_some() && self.kind != KindName::Person {
            log::warn!("pose ignored on {}", kind.name());
        }
        if (self.kelvin.is_some() || self.install_side.is_some()) && self.kind != KindName::Lighting
        {
            log::warn!("lighting attributes ignored on {}", kind.name());
        }

        let clamp = |p: &ScenePoint| ScenePoint::new(p.x, p.y);
        let shape = match (&self.at, &self.from, &self.to, &self.path) {
            (Some(at), None, None, None) => Shape::point(clamp(at)),
            (None, Some(from), Some(to), None) => Shape::segment(clamp(from), clamp(to)),
            (None, None, None, Some(points)) => {
                let Some(shape) = Shape::path(points.iter().map(clamp).collect()) else {
                    bail!("a path needs at least two points");
                };
                shape
            }
            _ => bail!("give exactly one of `at`, `from`+`to`, or `path`"),
        };

        let mut element = SceneElement::new(kind, self.label.clone(), shape);
        if let Some(id) = &self.id {
            element.id = ElementId::intern(id);
        }
        Ok(element)
    }
}

fn read_image(path: &Path) -> anyhow::Result<ImageData> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let mime = lm_render::sniff_mime_type(&bytes)
        .with_context(|| format!("unrecognised image '{}'", path.display()))?;
    Ok(ImageData::new(mime, bytes))
}
