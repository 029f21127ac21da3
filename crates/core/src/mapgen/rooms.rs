//! Binary space partition of an open arena into rooms, for the room-based layout.
//!
//! Rooms live in an arena keyed by [`RoomId`]; children point back at their
//! parent by key, which is how wall thickness is pushed down to the leaves.

use slotmap::{SlotMap, new_key_type};

use crate::config::RetryLimit;
use crate::types::{Rect, WorldPoint};

use super::sampler::{ExclusionZone, ObjectKind, PlacedObject, PositionSampler};
use super::seed::GenRng;

/// Minimum distance between a base centre and anything sampled in the room layout.
pub const BASE_CLEARANCE: f64 = 4.0;

const EDGE_EPSILON: f64 = 1e-9;

new_key_type! {
    pub struct RoomId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Split by a vertical line at an `x` coordinate.
    X,
    /// Split by a horizontal line at a `z` coordinate.
    Z,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Split {
    pub axis: Axis,
    pub at: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomNode {
    /// Area carved out by the partition.
    pub bounds: Rect,
    /// `bounds` minus the walls on edges shared with siblings and ancestors' siblings.
    pub interior: Rect,
    pub parent: Option<RoomId>,
    pub children: Option<(RoomId, RoomId)>,
    pub split: Option<Split>,
    pub depth: u32,
}

impl RoomNode {
    fn leaf(bounds: Rect, parent: Option<RoomId>, depth: u32) -> Self {
        Self { bounds, interior: bounds, parent, children: None, split: None, depth }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct RoomTree {
    nodes: SlotMap<RoomId, RoomNode>,
    root: RoomId,
}

impl RoomTree {
    /// Recursively halves the longer side at a random position, keeping both
    /// halves at least `min_size` wide, until `max_depth` or no split fits.
    pub fn split(bounds: Rect, min_size: f64, max_depth: u32, rng: &mut GenRng) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(RoomNode::leaf(bounds, None, 0));
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            let node = &nodes[id];
            if node.depth >= max_depth {
                continue;
            }
            let (bounds, depth) = (node.bounds, node.depth);
            let axis = if bounds.width() >= bounds.depth() { Axis::X } else { Axis::Z };
            let (low, high) = match axis {
                Axis::X => (bounds.min.x, bounds.max.x),
                Axis::Z => (bounds.min.z, bounds.max.z),
            };
            let slack = (high - low) - 2.0 * min_size;
            if slack < 0.0 {
                continue;
            }
            let at = low + min_size + slack * rng.unit_f64();
            let (first, second) = match axis {
                Axis::X => (
                    Rect::new(bounds.min, WorldPoint::new(at, bounds.max.z)),
                    Rect::new(WorldPoint::new(at, bounds.min.z), bounds.max),
                ),
                Axis::Z => (
                    Rect::new(bounds.min, WorldPoint::new(bounds.max.x, at)),
                    Rect::new(WorldPoint::new(bounds.min.x, at), bounds.max),
                ),
            };
            let first_id = nodes.insert(RoomNode::leaf(first, Some(id), depth + 1));
            let second_id = nodes.insert(RoomNode::leaf(second, Some(id), depth + 1));
            let node = &mut nodes[id];
            node.children = Some((first_id, second_id));
            node.split = Some(Split { axis, at });
            pending.push(second_id);
            pending.push(first_id);
        }

        Self { nodes, root }
    }

    pub fn root(&self) -> RoomId {
        self.root
    }

    pub fn node(&self, id: RoomId) -> Option<&RoomNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaves in depth-first order, first child before second.
    pub fn leaves(&self) -> Vec<RoomId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.nodes.get(id).and_then(|node| node.children) {
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => leaves.push(id),
            }
        }
        leaves
    }

    /// Trims each room's interior by half of `thickness` on every edge it
    /// shares with a split line of one of its ancestors.
    pub fn shrink_for_walls(&mut self, thickness: f64) {
        let half = thickness / 2.0;
        let ids: Vec<RoomId> = self.nodes.keys().collect();
        for id in ids {
            let mut interior = self.nodes[id].bounds;
            let mut parent = self.nodes[id].parent;
            while let Some(ancestor) = parent {
                let Some(ancestor_node) = self.nodes.get(ancestor) else { break };
                if let Some(split) = ancestor_node.split {
                    trim_edge(&mut interior, split, half);
                }
                parent = ancestor_node.parent;
            }
            self.nodes[id].interior = interior;
        }
    }

    /// One wall rectangle per split line, spanning the split room.
    pub fn interior_walls(&self, thickness: f64) -> Vec<Rect> {
        let half = thickness / 2.0;
        self.nodes
            .values()
            .filter_map(|node| {
                let split = node.split?;
                let bounds = node.bounds;
                Some(match split.axis {
                    Axis::X => Rect::new(
                        WorldPoint::new(split.at - half, bounds.min.z),
                        WorldPoint::new(split.at + half, bounds.max.z),
                    ),
                    Axis::Z => Rect::new(
                        WorldPoint::new(bounds.min.x, split.at - half),
                        WorldPoint::new(bounds.max.x, split.at + half),
                    ),
                })
            })
            .collect()
    }

    /// Picks up to `count` distinct leaves and returns their interior centres.
    pub fn place_bases(&self, count: usize, rng: &mut GenRng) -> Vec<(RoomId, WorldPoint)> {
        let mut remaining = self.leaves();
        let mut bases = Vec::with_capacity(count.min(remaining.len()));
        while bases.len() < count && !remaining.is_empty() {
            let id = remaining.swap_remove(rng.below(remaining.len()));
            bases.push((id, self.nodes[id].interior.center()));
        }
        bases
    }

    /// Unbounded sampler restricted to the interiors of `allowed` rooms, with the
    /// split walls as obstacles and every base kept `BASE_CLEARANCE` away.
    pub fn sampler(
        &self,
        allowed: &[RoomId],
        bases: &[WorldPoint],
        thickness: f64,
    ) -> PositionSampler {
        let rooms =
            allowed.iter().filter_map(|&id| self.node(id)).map(|node| node.interior).collect();
        let arena = self.nodes[self.root].bounds;
        let mut sampler = PositionSampler::new(arena, RetryLimit::Unbounded)
            .with_rooms(rooms)
            .with_walls(self.interior_walls(thickness));
        for &center in bases {
            sampler.exclude(ExclusionZone { center, clearance: BASE_CLEARANCE });
            sampler.register(PlacedObject { center, radius: 0.0, kind: ObjectKind::Base });
        }
        sampler
    }
}

fn trim_edge(interior: &mut Rect, split: Split, half: f64) {
    match split.axis {
        Axis::X => {
            if (interior.max.x - split.at).abs() < EDGE_EPSILON {
                interior.max.x -= half;
            } else if (interior.min.x - split.at).abs() < EDGE_EPSILON {
                interior.min.x += half;
            }
        }
        Axis::Z => {
            if (interior.max.z - split.at).abs() < EDGE_EPSILON {
                interior.max.z -= half;
            } else if (interior.min.z - split.at).abs() < EDGE_EPSILON {
                interior.min.z += half;
            }
        }
    }
}
