//! Loading the building models.
//!
//! Every building exists twice: the original under `<root>/model_original/`
//! and the renewed one under `<root>/model_renew/`, both with the same file
//! name. A building whose original cannot be loaded is left out of the tour.
//! A building without a renewed model is still shown but never swaps.

use anyhow::Context;
use futures::future::{LocalBoxFuture, join, join_all};

use crate::{data_structures::scene_graph::SceneNode, swap::Variant};

pub mod model;

/// File names of the buildings shown by default, in path order.
pub const DEFAULT_MODEL_NAMES: [&str; 43] = [
    "a11.glb", "a2.glb", "a22.glb", "a23.glb", "a4.glb", "a5.glb", "a6.glb", "a7.glb",
    "b11.glb", "b2.glb", "b23.glb", "b24.glb", "b25.glb", "b3.glb", "b7.glb", "b8.glb",
    "c10.glb", "c19.glb", "c26.glb", "c27.glb", "c29.glb", "c32.glb", "c37.glb", "c39.glb",
    "c40.glb", "c41.glb", "c42.glb", "c44.glb", "c45.glb", "c47.glb", "d1.glb", "d15.glb",
    "d16.glb", "d19.glb", "d22.glb", "d27.glb", "d28.glb", "d31.glb", "d33.glb", "d34.glb",
    "d38.glb", "d48.glb", "d7.glb",
];

/// Source of model hierarchies. Futures are not `Send` so the same loader
/// works with the browser's fetch.
pub trait AssetLoader {
    fn load<'a>(&'a self, name: &'a str, variant: Variant)
    -> LocalBoxFuture<'a, anyhow::Result<SceneNode>>;
}

/// Loads glTF files from disk, or over http on the web.
#[derive(Clone, Debug)]
pub struct GltfLoader {
    pub root: String,
}

impl GltfLoader {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &str, variant: Variant) -> String {
        let dir = match variant {
            Variant::Original => "model_original",
            Variant::Renewed => "model_renew",
        };
        let root = self.root.trim_end_matches('/');
        if root.is_empty() {
            format!("{}/{}", dir, name)
        } else {
            format!("{}/{}/{}", root, dir, name)
        }
    }
}

impl AssetLoader for GltfLoader {
    fn load<'a>(
        &'a self,
        name: &'a str,
        variant: Variant,
    ) -> LocalBoxFuture<'a, anyhow::Result<SceneNode>> {
        Box::pin(async move { model::load_model_gltf(&self.path_for(name, variant)).await })
    }
}

#[derive(Clone, Debug)]
pub struct LoadedAsset {
    pub name: String,
    pub original: SceneNode,
    pub renewal: Option<SceneNode>,
}

/// Successfully loaded buildings, in the order they were requested.
pub type LoadedAssets = Vec<LoadedAsset>;

/// Loads the original and renewed variant of every name concurrently.
///
/// Never fails: broken originals are logged and skipped, broken or missing
/// renewals only disable swapping for that building.
pub async fn load_assets<L, S>(loader: &L, names: &[S]) -> LoadedAssets
where
    L: AssetLoader + ?Sized,
    S: AsRef<str>,
{
    let originals = join_all(
        names
            .iter()
            .map(|name| loader.load(name.as_ref(), Variant::Original)),
    );
    let renewals = join_all(
        names
            .iter()
            .map(|name| loader.load(name.as_ref(), Variant::Renewed)),
    );
    let (originals, renewals) = join(originals, renewals).await;

    let mut assets = Vec::with_capacity(names.len());
    for ((name, original), renewal) in names.iter().zip(originals).zip(renewals) {
        let name = name.as_ref();
        let original = match original.with_context(|| format!("loading original asset {}", name)) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("{:#}", e);
                continue;
            }
        };
        let renewal = match renewal {
            Ok(node) => Some(node),
            Err(e) => {
                log::info!("{} has no renewed model, it will not swap: {:#}", name, e);
                None
            }
        };
        assets.push(LoadedAsset {
            name: name.to_string(),
            original,
            renewal,
        });
    }
    log::info!(
        "loaded {} of {} buildings, {} with a renewed model",
        assets.len(),
        names.len(),
        assets.iter().filter(|asset| asset.renewal.is_some()).count()
    );
    assets
}
