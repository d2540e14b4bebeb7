//! Handoff to the glTF parser.
//!
//! The parser receives the entry buffer, and pulls every external buffer and
//! image through a [`ResourceScope`]. Loading is a single-shot future that
//! yields either a [`Scene`] or an error.

use std::future::Future;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use corelib::{IntakeError, IntakeResult};
use glam::{Mat4, Vec3};

use crate::{
    config::RenderHints,
    intake::Intake,
    paths,
    resolve::{HandleRegistry, ResourceScope},
};

/// Axis-aligned bounding box in scene space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// What the parser built, summarized for the viewer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: usize,
    pub meshes: usize,
    pub primitives: usize,
    pub vertices: usize,
    pub materials: usize,
    pub textures: usize,
    pub animations: usize,
    /// `None` when the displayed scene has no geometry.
    pub bounds: Option<Aabb>,
}

impl Scene {
    pub fn has_animations(&self) -> bool {
        self.animations > 0
    }
}

/// Turns an entry buffer into a [`Scene`].
pub trait SceneLoader {
    /// `path` is the entry's Buffer Set key; sub-resources come from `scope`.
    fn load(
        &self,
        path: &str,
        entry: &[u8],
        scope: &ResourceScope<'_>,
    ) -> impl Future<Output = IntakeResult<Scene>>;
}

/// [`SceneLoader`] backed by the `gltf` crate. Handles both `.glb` and `.gltf`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GltfSceneLoader;

impl SceneLoader for GltfSceneLoader {
    async fn load(
        &self,
        path: &str,
        entry: &[u8],
        scope: &ResourceScope<'_>,
    ) -> IntakeResult<Scene> {
        let gltf = gltf::Gltf::from_slice(entry).map_err(|e| IntakeError::parse(path, e))?;
        let document = &gltf.document;

        let mut buffers: Vec<Bytes> = Vec::with_capacity(document.buffers().len());
        for buffer in document.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .as_deref()
                    .map(Bytes::copy_from_slice)
                    .ok_or_else(|| IntakeError::parse(path, "binary chunk is missing"))?,
                gltf::buffer::Source::Uri(uri) => fetch(path, uri, scope)?,
            };
            if data.len() < buffer.length() {
                return Err(IntakeError::parse(
                    path,
                    format!(
                        "buffer {} holds {} bytes, {} declared",
                        buffer.index(),
                        data.len(),
                        buffer.length()
                    ),
                ));
            }
            buffers.push(data);
        }

        for image in document.images() {
            if let gltf::image::Source::Uri { uri, .. } = image.source() {
                fetch(path, uri, scope)?;
            }
        }

        let mut scene = Scene {
            nodes: document.nodes().count(),
            meshes: document.meshes().count(),
            materials: document.materials().count(),
            textures: document.textures().count(),
            animations: document.animations().count(),
            ..Scene::default()
        };

        if let Some(root) = document.default_scene().or_else(|| document.scenes().next()) {
            scene.name = root.name().map(str::to_owned);
            for node in root.nodes() {
                visit_node(&node, Mat4::IDENTITY, &buffers, &mut scene);
            }
        }

        Ok(scene)
    }
}

/// Fetch a buffer or image URI: embedded data URIs are decoded in place,
/// anything else must be among the dropped files.
fn fetch(path: &str, uri: &str, scope: &ResourceScope<'_>) -> IntakeResult<Bytes> {
    match uri.strip_prefix("data:") {
        Some(data_uri) => decode_data_uri(data_uri).map_err(|reason| IntakeError::parse(path, reason)),
        None => scope.resolve(uri),
    }
}

fn decode_data_uri(data_uri: &str) -> Result<Bytes, String> {
    let (header, payload) = data_uri
        .split_once(',')
        .ok_or_else(|| "data URI without payload".to_owned())?;
    if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .map(Bytes::from)
            .map_err(|e| format!("invalid base64 in data URI: {e}"))
    } else {
        let raw = urlencoding::decode_binary(payload.as_bytes()).into_owned();
        Ok(Bytes::from(raw))
    }
}

fn visit_node(node: &gltf::Node<'_>, parent: Mat4, buffers: &[Bytes], scene: &mut Scene) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            scene.primitives += 1;
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b[..]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            for position in positions {
                scene.vertices += 1;
                let p = world.transform_point3(Vec3::from(position));
                match scene.bounds.as_mut() {
                    Some(bounds) => bounds.grow(p),
                    None => scene.bounds = Some(Aabb::point(p)),
                }
            }
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, scene);
    }
}

/// Load the intake's entry asset with `loader`.
///
/// The resource scope opened for the load is released before this returns,
/// on success and on failure.
pub async fn generate_scene<L: SceneLoader>(
    intake: &Intake,
    hints: &RenderHints,
    registry: &HandleRegistry,
    loader: &L,
) -> IntakeResult<Scene> {
    let buffers = intake.buffers();
    let entry_key = hints.entry_key(intake.entry());
    let entry = buffers
        .get(&entry_key)
        .ok_or_else(|| IntakeError::MissingResource {
            uri: entry_key.clone(),
        })?;

    // A lone file is parsed without a base path.
    let base = if buffers.len() == 1 {
        ""
    } else {
        paths::base_dir(&entry_key)
    };

    let result = {
        let scope = intake.resolver(base, registry);
        let result = loader.load(&entry_key, entry, &scope).await;
        log::debug!(
            "Scene load of '{}' used {} resource(s) from '{}'",
            entry_key,
            scope.issued(),
            scope.base()
        );
        result
    };

    match &result {
        Ok(scene) => log::info!(
            "Loaded '{}': {} node(s), {} mesh(es), {} vertices, animations={}",
            entry_key,
            scene.nodes,
            scene.meshes,
            scene.vertices,
            scene.has_animations()
        ),
        Err(err) => log::warn!("Loading '{}' failed: {}", entry_key, err),
    }
    result
}
