//! Dependency graph for board tasks
//!
//! A directed graph of task ids: an edge `tail -> head` means the task
//! `tail` depends on `head` finishing no later than it does. Edge heads are
//! deliberately unchecked — they may reference tasks that were never added
//! or have since been removed, and placement validation reports those as
//! missing dependencies rather than rejecting them here.
//!
//! Primary storage is an insertion-ordered adjacency map so dangling heads
//! survive; petgraph is used for derived queries (topological order).

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("can't add edge from \"{0}\" to itself")]
    InvalidEdge(String),

    #[error("can't add edge from \"{tail}\" to \"{head}\" because vertex \"{tail}\" does not exist")]
    UnknownVertex { tail: String, head: String },

    #[error("dependency edges form a cycle")]
    Cycle,
}

/// A directed dependency graph over task ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// Vertex insertion order (drives edge snapshot and wire ordering)
    order: Vec<String>,

    /// Adjacency: one entry per vertex; heads may dangle
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a graph from its wire form, one edge per listed head
    pub fn from_edges<I, H>(entries: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (String, H)>,
        H: IntoIterator<Item = String>,
    {
        let mut graph = Self::new();
        for (tail, heads) in entries {
            graph.add_vertex(&tail);
            for head in heads {
                graph.add_edge(&tail, &head)?;
            }
        }
        Ok(graph)
    }

    /// Adds a vertex; idempotent
    pub fn add_vertex(&mut self, id: &str) {
        if !self.edges.contains_key(id) {
            self.order.push(id.to_string());
            self.edges.insert(id.to_string(), Vec::new());
        }
    }

    /// Removes a vertex and its own edge list; no-op if absent.
    ///
    /// Edges from other tails pointing at the removed id are left in place.
    pub fn remove_vertex(&mut self, id: &str) {
        if self.edges.remove(id).is_some() {
            self.order.retain(|v| v != id);
        }
    }

    /// Adds an edge `tail -> head`; duplicate edges are suppressed.
    ///
    /// The tail must already be a vertex; the head is not checked.
    pub fn add_edge(&mut self, tail: &str, head: &str) -> Result<(), GraphError> {
        if tail == head {
            return Err(GraphError::InvalidEdge(tail.to_string()));
        }
        let heads = self
            .edges
            .get_mut(tail)
            .ok_or_else(|| GraphError::UnknownVertex {
                tail: tail.to_string(),
                head: head.to_string(),
            })?;
        if !heads.iter().any(|h| h == head) {
            heads.push(head.to_string());
        }
        Ok(())
    }

    /// Removes an edge; returns whether it was present
    pub fn remove_edge(&mut self, tail: &str, head: &str) -> bool {
        match self.edges.get_mut(tail) {
            Some(heads) => {
                let before = heads.len();
                heads.retain(|h| h != head);
                heads.len() != before
            }
            None => false,
        }
    }

    /// Returns true if the id is a vertex
    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Vertex ids in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Edge snapshot: `(tail, heads)` pairs in vertex insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order.iter().filter_map(|tail| {
            self.edges
                .get(tail)
                .map(|heads| (tail.as_str(), heads.as_slice()))
        })
    }

    /// Direct dependency ids of a vertex (dangling heads included)
    pub fn heads(&self, tail: &str) -> &[String] {
        self.edges.get(tail).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Vertices ordered so every dependency precedes its dependents.
    ///
    /// Edges whose head is not a vertex are ignored; a cyclic edge set is
    /// reported rather than prevented at insertion.
    pub fn topological_order(&self) -> Result<Vec<String>, GraphError> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for id in &self.order {
            nodes.insert(id, graph.add_node(id));
        }
        for (tail, heads) in self.edges() {
            for head in heads {
                // Dependency first: head -> tail
                if let (Some(&h), Some(&t)) = (nodes.get(head.as_str()), nodes.get(tail)) {
                    graph.add_edge(h, t, ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|idx| graph[idx].to_string())
                .collect()),
            Err(_) => Err(GraphError::Cycle),
        }
    }
}

impl fmt::Display for DependencyGraph {
    /// Canonical wire form: a JSON map from tail to its head array
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (tail, heads) in self.edges() {
            map.serialize_entry(tail, heads)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DependencyGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GraphVisitor;

        impl<'de> Visitor<'de> for GraphVisitor {
            type Value = DependencyGraph;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from task id to an array of dependency ids")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                DependencyGraph::from_edges(entries).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(GraphVisitor)
    }
}
