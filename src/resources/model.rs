use std::io::{BufReader, Cursor};

use anyhow::Context;

use crate::data_structures::{
    instance::Instance,
    scene_graph::{Mesh, SceneNode},
};

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window to resolve asset urls against")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("page origin unavailable: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    Ok(base.join(file_name)?)
}

/// Reads a file relative to the working directory (native) or fetches it
/// relative to the page origin (wasm).
pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = std::fs::read(file_name).with_context(|| format!("reading {}", file_name))?;

    Ok(data)
}

/// Loads a `.glb`/`.gltf` file into a node hierarchy. Only node transforms,
/// positions and indices are read; materials stay with the renderer.
pub async fn load_model_gltf(file_name: &str) -> anyhow::Result<SceneNode> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_reader = BufReader::new(Cursor::new(gltf_bytes));
    let gltf = gltf::Gltf::from_reader(gltf_reader)
        .with_context(|| format!("parsing {}", file_name))?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(&sibling(file_name, uri)).await?;
                buffer_data.push(bin);
            }
        }
    }

    let mut models = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            models.push(to_scene_node(node, &buffer_data));
        }
    }

    let mut root = if models.len() == 1 {
        models.remove(0)
    } else {
        let mut root = SceneNode::container(file_name);
        root.children = models;
        root
    };
    root.name = file_name.to_string();
    Ok(root)
}

fn to_scene_node(node: gltf::scene::Node, buf: &[Vec<u8>]) -> SceneNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Instance {
        position: translation.into(),
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    };

    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node {}", node.index()));

    let mesh = node.mesh().map(|mesh| {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));
            let base = positions.len() as u32;
            if let Some(vertex_attribute) = reader.read_positions() {
                positions.extend(vertex_attribute);
            }
            match reader.read_indices() {
                Some(read) => indices.extend(read.into_u32().map(|i| i + base)),
                // non-indexed primitive: every three vertices form a triangle
                None => indices.extend(base..positions.len() as u32),
            }
        }
        Mesh::new(mesh.name().unwrap_or(name.as_str()), positions, indices)
    });

    SceneNode {
        name,
        transform,
        mesh,
        children: node
            .children()
            .map(|child| to_scene_node(child, buf))
            .collect(),
        visible: true,
    }
}

/// Resolves `uri` against the directory `file_name` lives in.
fn sibling(file_name: &str, uri: &str) -> String {
    match file_name.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, uri),
        None => uri.to_string(),
    }
}
