use super::types::{NodeType, RepoGraph};

/// A small, well-formed graph shown when the analysis service cannot be used.
pub fn placeholder_graph(name: impl Into<String>) -> RepoGraph {
	let mut graph = RepoGraph::new(name);
	for (id, label, node_type) in [
		("1", "index.js", NodeType::File),
		("2", "App", NodeType::Class),
		("3", "renderComponent", NodeType::Function),
		("4", "utils", NodeType::Module),
		("5", "components", NodeType::Module),
		("6", "styles.css", NodeType::File),
		("7", "api.js", NodeType::File),
		("8", "Button", NodeType::Class),
		("9", "fetchData", NodeType::Function),
	] {
		graph.add_node(id, label, node_type);
	}
	for (source, target) in [
		("1", "2"),
		("2", "3"),
		("1", "4"),
		("4", "9"),
		("2", "5"),
		("5", "8"),
		("2", "6"),
		("7", "9"),
	] {
		graph.connect(source, target, 1.0);
	}
	graph
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::counts_by_type;

	#[test]
	fn placeholder_is_complete() {
		let graph = placeholder_graph("Uploaded sample");
		assert_eq!(graph.name, "Uploaded sample");
		assert_eq!(graph.nodes.len(), 9);
		assert_eq!(graph.edges.len(), 8);
		assert!(graph.is_consistent());
		assert!(counts_by_type(&graph).values().all(|&c| c > 0));
	}
}
