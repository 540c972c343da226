use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::config::LayoutConfig;
use crate::error::GraphError;
use crate::geometry::Rect;
use crate::layout::{ArrangeReport, arrange_boxes};

/// Stable opaque key of a box inside a [`BoxGraph`].
///
/// Arena slots are recycled but every reuse bumps the slot generation, so a
/// handle kept across `remove_box` or `clear` simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxHandle {
    index: usize,
    generation: u32,
}

impl BoxHandle {
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone)]
struct Slot<K, C> {
    generation: u32,
    entry: Option<GraphBox<K, C>>,
}

/// One node of the graph: caller content, geometry and adjacency.
#[derive(Debug, Clone)]
pub struct GraphBox<K, C> {
    id: K,
    content: C,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    to: Vec<BoxHandle>,
    from: Vec<BoxHandle>,
}

impl<K, C> GraphBox<K, C> {
    fn new(id: K, content: C) -> Self {
        Self {
            id,
            content,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            to: Vec::new(),
            from: Vec::new(),
        }
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Sets the rendered size. Must happen before `arrange`; the layout engine
    /// never changes it.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Successors, left to right once the graph has been arranged.
    pub fn to(&self) -> &[BoxHandle] {
        &self.to
    }

    /// Predecessors, left to right once the graph has been arranged.
    pub fn from(&self) -> &[BoxHandle] {
        &self.from
    }
}

/// Arena of boxes with symmetric `to`/`from` adjacency.
#[derive(Debug, Clone)]
pub struct BoxGraph<K, C> {
    slots: Vec<Slot<K, C>>,
    free: Vec<usize>,
    order: Vec<BoxHandle>,
    index: HashMap<K, BoxHandle>,
}

impl<K, C> Default for BoxGraph<K, C> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, C> BoxGraph<K, C>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_box(&mut self, id: K, content: C) -> Result<BoxHandle, GraphError> {
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateId(format!("{id:?}")));
        }
        let entry = Some(GraphBox::new(id.clone(), content));
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.entry = entry;
                BoxHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                BoxHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.index.insert(id, handle);
        self.order.push(handle);
        Ok(handle)
    }

    /// Adds the edge `id1 -> id2`. Linking an existing edge is a no-op.
    pub fn link_boxes(&mut self, id1: &K, id2: &K) -> Result<(), GraphError> {
        let src = self.require(id1)?;
        let dst = self.require(id2)?;
        if src == dst {
            return Err(GraphError::SelfLoop(format!("{id1:?}")));
        }
        self.link(src, dst);
        Ok(())
    }

    fn require(&self, id: &K) -> Result<BoxHandle, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownId(format!("{id:?}")))
    }

    fn link(&mut self, src: BoxHandle, dst: BoxHandle) {
        if let Some(b) = self.get_mut(src) {
            if !b.to.contains(&dst) {
                b.to.push(dst);
            }
        }
        if let Some(b) = self.get_mut(dst) {
            if !b.from.contains(&src) {
                b.from.push(src);
            }
        }
    }

    /// Detaches the box from every neighbor and hands it back to the caller.
    pub fn remove_box(&mut self, handle: BoxHandle) -> Option<GraphBox<K, C>> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let removed = slot.entry.take()?;
        self.free.push(handle.index);
        self.order.retain(|h| *h != handle);
        self.index.remove(&removed.id);
        for &next in &removed.to {
            if let Some(b) = self.get_mut(next) {
                b.from.retain(|h| *h != handle);
            }
        }
        for &prev in &removed.from {
            if let Some(b) = self.get_mut(prev) {
                b.to.retain(|h| *h != handle);
            }
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                self.free.push(index);
            }
        }
        self.order.clear();
        self.index.clear();
    }

    pub fn handle_of(&self, id: &K) -> Option<BoxHandle> {
        self.index.get(id).copied()
    }

    /// Places every box with the default [`LayoutConfig`].
    pub fn arrange(&mut self) -> ArrangeReport {
        self.arrange_with(&LayoutConfig::default())
    }

    pub fn arrange_with(&mut self, config: &LayoutConfig) -> ArrangeReport {
        arrange_boxes(self, config)
    }
}

impl<K, C> BoxGraph<K, C> {
    pub fn get(&self, handle: BoxHandle) -> Option<&GraphBox<K, C>> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, handle: BoxHandle) -> Option<&mut GraphBox<K, C>> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Live handles in insertion order.
    pub fn handles(&self) -> &[BoxHandle] {
        &self.order
    }

    pub fn boxes(&self) -> impl Iterator<Item = (BoxHandle, &GraphBox<K, C>)> + '_ {
        self.order
            .iter()
            .filter_map(|&h| self.get(h).map(|b| (h, b)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.boxes().map(|(_, b)| b.to.len()).sum()
    }

    /// Bounding rectangle of every box, `None` on an empty graph.
    pub fn bounds(&self) -> Option<Rect> {
        self.boxes()
            .map(|(_, b)| b.rect())
            .reduce(|acc, r| acc.union(&r))
    }

    /// Whether `dst` can be reached from `src` through boxes of `allowed`.
    ///
    /// Each step drops the box it leaves from `allowed`, which keeps the
    /// search finite on cycles but also means a path that loops back through
    /// `src` on another branch is never explored.
    pub fn can_reach(
        &self,
        src: BoxHandle,
        dst: BoxHandle,
        allowed: &HashSet<BoxHandle>,
    ) -> bool {
        if !allowed.contains(&src) || !allowed.contains(&dst) {
            return false;
        }
        self.reach_from(src, dst, allowed)
    }

    fn reach_from(&self, src: BoxHandle, dst: BoxHandle, allowed: &HashSet<BoxHandle>) -> bool {
        let Some(b) = self.get(src) else {
            return false;
        };
        let mut narrowed = allowed.clone();
        narrowed.remove(&src);
        for &next in &b.to {
            if !allowed.contains(&next) {
                continue;
            }
            if next == dst || self.reach_from(next, dst, &narrowed) {
                return true;
            }
        }
        false
    }

    /// Sorts every adjacency list by the neighbor's `x`, left to right.
    pub(crate) fn sort_adjacency_by_x(&mut self) {
        let xs: HashMap<BoxHandle, f32> = self.boxes().map(|(h, b)| (h, b.x)).collect();
        let key = |h: &BoxHandle| xs.get(h).copied().unwrap_or(0.0);
        for slot in self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut()) {
            slot.to.sort_by(|a, b| key(a).total_cmp(&key(b)));
            slot.from.sort_by(|a, b| key(a).total_cmp(&key(b)));
        }
    }
}
