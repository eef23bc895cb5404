//! Object-type trees for attribute-scoped access checks.
//!
//! A tree is built fresh for each authorization decision and lists every
//! GUID-scoped right the pending operation needs: one node per touched
//! attribute or class, optionally nested under the attribute's declared
//! attribute set so that a single coarse object ACE covering the set
//! satisfies the whole group. Nodes live in an arena with a GUID index, so
//! duplicate insertions merge their masks instead of re-scanning siblings.

use std::collections::HashMap;

use dirsec_dtyp::{AccessMask, Guid};

/// Index of a node within its [`ObjectTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    guid: Option<Guid>,
    required: AccessMask,
    parent: Option<NodeId>,
}

/// The set of GUID-scoped rights one operation requires.
///
/// The root node carries no GUID and stands for the object itself; every
/// other node is a class, attribute set, or attribute. The operation is
/// granted only when every node's required mask is granted in that node's
/// scope.
#[derive(Debug, Clone)]
pub struct ObjectTree {
    nodes: Vec<Node>,
    by_guid: HashMap<Guid, NodeId>,
}

impl ObjectTree {
    /// Creates a tree whose root requires `required` on the object itself.
    pub fn new(required: AccessMask) -> ObjectTree {
        ObjectTree {
            nodes: vec![Node {
                guid: None,
                required,
                parent: None,
            }],
            by_guid: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds bits to the object-level requirement.
    pub fn require_on_object(&mut self, mask: AccessMask) {
        self.nodes[0].required |= mask;
    }

    /// Inserts a GUID-scoped requirement under `parent`, merging (OR-ing)
    /// the mask into an existing node if the GUID is already present.
    pub fn insert(&mut self, parent: NodeId, guid: Guid, required: AccessMask) -> NodeId {
        if let Some(&id) = self.by_guid.get(&guid) {
            self.nodes[id.0].required |= required;
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            guid: Some(guid),
            required,
            parent: Some(parent),
        });
        self.by_guid.insert(guid, id);
        id
    }

    /// All node ids, root first.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn guid(&self, id: NodeId) -> Option<Guid> {
        self.nodes[id.0].guid
    }

    pub fn required(&self, id: NodeId) -> AccessMask {
        self.nodes[id.0].required
    }

    /// Whether an ACE restricted to `object_type` covers node `id`: it
    /// does when the GUID names the node itself or any of its ancestors.
    pub fn in_scope(&self, id: NodeId, object_type: Guid) -> bool {
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            let node = &self.nodes[node_id.0];
            if node.guid == Some(object_type) {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has at least its root node.
    pub fn is_empty(&self) -> bool {
        false
    }
}
