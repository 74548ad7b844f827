//! Scene graph and the scene collaborator interface.
//!
//! The tour never rasterizes anything itself. It only adds and removes
//! objects, toggles their visibility and reads their transforms and vertex
//! positions. [`Scene`] is that surface; [`SceneGraph`] is the in-memory
//! implementation a renderer walks every frame.

use std::collections::BTreeMap;

use cgmath::Point3;

use crate::data_structures::instance::Instance;

/// Handle of a root object that was added to a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Raw geometry of a single mesh in its local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
        }
    }
}

/// A node of a loaded asset: an optional mesh, a local transform and children.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Instance,
    pub mesh: Option<Mesh>,
    pub children: Vec<SceneNode>,
    pub visible: bool,
}

impl SceneNode {
    /// A node without geometry, used to group children.
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Instance::default(),
            mesh: None,
            children: Vec::new(),
            visible: true,
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::container(name)
        }
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of vertices in this node and all of its descendants.
    pub fn vertex_count(&self) -> usize {
        self.mesh.as_ref().map_or(0, |m| m.positions.len())
            + self
                .children
                .iter()
                .map(SceneNode::vertex_count)
                .sum::<usize>()
    }

    /// Every vertex of the hierarchy moved into world space.
    ///
    /// The node's own transform is treated as its world transform, which is
    /// the case for root objects added to a [`Scene`].
    pub fn world_positions(&self) -> Vec<Point3<f32>> {
        let mut out = Vec::with_capacity(self.vertex_count());
        self.collect_world_positions(&Instance::default(), &mut out);
        out
    }

    fn collect_world_positions(&self, parent: &Instance, out: &mut Vec<Point3<f32>>) {
        let world = parent * &self.transform;
        if let Some(mesh) = &self.mesh {
            out.extend(
                mesh.positions
                    .iter()
                    .map(|&p| world.transform_point(p.into())),
            );
        }
        for child in &self.children {
            child.collect_world_positions(&world, out);
        }
    }
}

/// What the tour needs from whoever owns the renderable scene.
pub trait Scene {
    fn add(&mut self, node: SceneNode) -> NodeId;

    fn remove(&mut self, id: NodeId) -> Option<SceneNode>;

    fn get(&self, id: NodeId) -> Option<&SceneNode>;

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode>;
}

/// Flat list of root objects keyed by insertion order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Root objects a renderer should draw this frame.
    pub fn visible(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.iter().filter(|(_, node)| node.visible)
    }
}

impl Scene for SceneGraph {
    fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&id)
    }

    fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }
}
