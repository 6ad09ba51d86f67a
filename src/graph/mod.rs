//! Repository graph model, filtering and the offline placeholder.

mod filter;
mod sample;
mod types;
mod wire;

pub use filter::{NodeFilter, compute_visible, counts_by_type, empty_counts};
pub use sample::placeholder_graph;
pub use types::{GraphEdge, GraphNode, NodeType, RepoGraph};
pub use wire::{WireEndpoint, WireGraph, WireLink, WireNode};
