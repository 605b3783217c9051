//! The collision world

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::collections::HashSet;

use super::{Collision, CollisionItem};
use crate::chain::KinematicChain;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Links of the current chain plus the registered static obstacles.
///
/// Items are evaluated in registration order, links first.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    links: Vec<CollisionItem>,

    obstacles: Vec<CollisionItem>,

    /// Pairs of names allowed to intersect, stored in sorted order
    ignore_pairs: HashSet<(String, String)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static obstacle, replacing any existing item of the same name in place.
    pub fn add_obstacle(&mut self, item: CollisionItem) {
        match self.obstacles.iter_mut().find(|o| o.name == item.name) {
            Some(existing) => *existing = item,
            None => self.obstacles.push(item),
        }
    }

    /// Remove every link and obstacle. Ignore pairs are kept.
    pub fn clear(&mut self) {
        self.links.clear();
        self.obstacles.clear();
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Allow the two named items to intersect.
    pub fn add_ignore_pair(&mut self, a: &str, b: &str) {
        self.ignore_pairs.insert(Self::pair_key(a, b));
    }

    pub fn obstacles(&self) -> &[CollisionItem] {
        &self.obstacles
    }

    pub fn links(&self) -> &[CollisionItem] {
        &self.links
    }

    /// Rebuild the link items from the chain's current joint positions.
    ///
    /// Link `i` runs from the end of link `i - 1` (the base origin for the first link) to joint
    /// `i`, is named after joint `i`, and ignores link `i + 1` since the two always touch.
    pub fn refresh_links(&mut self, chain: &KinematicChain, radius_mm: f64) {
        self.links.clear();

        let positions = chain.joint_positions();
        let mut start = nalgebra::Vector3::zeros();

        for (i, end) in positions.iter().enumerate() {
            let mut item = CollisionItem::new(chain.joint(i).name(), start, *end, radius_mm);

            if i + 1 < chain.len() {
                item = item.ignoring(chain.joint(i + 1).name());
            }

            self.links.push(item);
            start = *end;
        }
    }

    /// Find the first colliding pair of items.
    pub fn evaluate(&self) -> Option<Collision> {
        let items: Vec<&CollisionItem> = self.links.iter().chain(self.obstacles.iter()).collect();

        for (i, a) in items.iter().enumerate() {
            for b in items[i + 1..].iter() {
                if self.is_ignored(a, b) {
                    continue;
                }

                if let Some((point_a, point_b)) = a.intersect(b) {
                    trace!("Collision between {} and {}", a.name, b.name);
                    return Some(Collision {
                        item_a: a.name.clone(),
                        item_b: b.name.clone(),
                        point_a,
                        point_b,
                    });
                }
            }
        }

        None
    }

    fn is_ignored(&self, a: &CollisionItem, b: &CollisionItem) -> bool {
        a.name == b.name
            || a.ignores(b)
            || self.ignore_pairs.contains(&Self::pair_key(&a.name, &b.name))
    }

    fn pair_key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}
