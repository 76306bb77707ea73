// Capacity planning for wireless mesh access networks.
// A MeshGraph holds the network (one root/PoP, demand-bearing leaves and
// relays, links with distance and throughput). DistanceMetrics reports
// the distance structure of a connected graph, and AllocationPlanner
// greedily routes every vertex's demand to the root, consuming link
// throughput as it goes. Link throughputs come from the link budget model
// via prepare_graph.

pub mod dsa;
pub mod linear_algebra;
pub mod mesh_network;
pub mod scientific_computing;

pub use dsa::graph::{Edge, EdgeId, GraphError, MeshGraph, Vertex, VertexKind};
pub use mesh_network::config::{Demand, PlanningRequest, StatsMode, WeightPolicy};
pub use mesh_network::creation::{LinkRecord, graph_from_links};
pub use mesh_network::error::{PlanError, Shortfall};
pub use mesh_network::metrics::DistanceMetrics;
pub use mesh_network::observer::{NoopObserver, PlanObserver, TracingObserver};
pub use mesh_network::planner::{AllocationPlanner, PlanReport, Route};
pub use mesh_network::preparation::{PreparationReport, RootHeadroom, prepare_graph, prepare_largest_component};
pub use mesh_network::scenario::{Scenario, ScenarioConfig, random_mesh};
pub use scientific_computing::link_budget::{Carrier, LinkBudgetConfig, LinkEstimate};
pub use mesh_network::{PlanningOutcome, plan_network};
