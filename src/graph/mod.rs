//! Graph projections of validated tables.
//!
//! - elements: flat node/edge records for the HTML view
//! - multigraph: petgraph multigraph for GEXF export and counts
//!
//! Neither projection re-validates; callers run `validate` first.

pub mod elements;
pub mod multigraph;

pub use elements::{Element, ElementGroup, build_elements};
pub use multigraph::{MultiGraph, build_multigraph};
