pub mod bitset;
pub mod graph;
pub mod shortest_path;
