//! Actor graph ordering
//!
//! The connection graph from the config, reduced to names and edges. Its
//! one job is producing a safe activation order: consumers before the
//! producers that feed them, so no actor starts sending into a peer that
//! is not running yet. Stopping uses the exact reverse.

use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Directed actor graph keyed by actor name
#[derive(Debug, Default)]
pub struct Topology {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// `(from, to)` pairs; `from` sends messages to `to`
    edges: Vec<(usize, usize)>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; adding the same name again is a no-op
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(name.to_owned());
        self.index.insert(name.to_owned(), idx);
        idx
    }

    /// Add a message-flow edge, creating missing nodes on the way
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges.push((from, to));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Activation order: every actor appears after all actors it sends to
    ///
    /// Insertion order breaks ties, so the result is deterministic for a
    /// given config.
    ///
    /// # Errors
    ///
    /// [`PipelineError::CycleDetected`] when the graph is not a DAG.
    pub fn sorted(&self) -> Result<Vec<String>> {
        // Kahn's algorithm over reversed edges: a node is ready once all
        // of its downstream peers are placed.
        let mut pending = vec![0usize; self.nodes.len()];
        for &(from, _) in &self.edges {
            pending[from] += 1;
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut placed = vec![false; self.nodes.len()];
        while order.len() < self.nodes.len() {
            let next = (0..self.nodes.len()).find(|&i| !placed[i] && pending[i] == 0);
            let Some(next) = next else {
                let stuck = (0..self.nodes.len())
                    .find(|&i| !placed[i])
                    .expect("unplaced node must exist");
                return Err(PipelineError::CycleDetected {
                    actor: self.nodes[stuck].clone(),
                });
            };
            placed[next] = true;
            order.push(self.nodes[next].clone());
            for &(from, to) in &self.edges {
                if to == next {
                    pending[from] -= 1;
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
#[path = "topology_test.rs"]
mod topology_test;
