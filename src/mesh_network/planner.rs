// Greedy bandwidth allocation towards the root.
// Vertices are served one at a time in a fixed priority order. Each one
// takes a hop-shortest path on the graph as it is *now*, its demand is
// subtracted from every edge on that path, and edges that can no longer
// carry that demand are deleted before the next vertex is served. There is
// no backtracking: the first edge that cannot absorb a demand ends the run.

use serde::Serialize;

use crate::dsa::graph::{Edge, EdgeId, GraphError, MeshGraph};
use crate::dsa::shortest_path::{DenseIndex, bfs_hops, shortest_hop_path};
use crate::mesh_network::error::{EdgeAttribute, PlanError, Result, Shortfall};
use crate::mesh_network::observer::{NoopObserver, PlanObserver};

// Sort key of one vertex, taken on the graph before any allocation.
#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct OrderEntry {
    pub vertex:usize,
    pub demand:f64,
    // number of hop-shortest paths to the root
    pub multiplicity:u64,
    // hop length of those paths
    pub path_len:usize,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Route {
    pub vertex:usize,
    pub demand:f64,
    // vertex -> root
    pub edges:Vec<EdgeId>,
    // starts at vertex, ends at the root
    pub vertices:Vec<usize>,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct RemovedEdge {
    pub edge:Edge,
    // vertex whose allocation exhausted the edge
    pub removed_by:usize,
}

#[derive(Clone,Debug,Default,PartialEq,Serialize)]
pub struct PlanReport {
    pub order:Vec<OrderEntry>,
    // in processing order
    pub routes:Vec<Route>,
    pub removed_edges:Vec<RemovedEdge>,
}

impl PlanReport {
    pub fn route_of(&self,vertex:usize) -> Option<&Route> {
        self.routes.iter().find(|r| r.vertex == vertex)
    }
    pub fn removed(&self,edge:EdgeId) -> Option<&RemovedEdge> {
        self.removed_edges.iter().find(|r| r.edge.id() == edge)
    }
    pub fn processing_order(&self) -> Vec<usize> {
        self.order.iter().map(|e| e.vertex).collect()
    }
}

// highest demand, fewest alternatives, longest path, smallest id
fn sort_order(order:&mut [OrderEntry]) {
    order.sort_by(|a,b| b.demand.total_cmp(&a.demand)
        .then_with(|| a.multiplicity.cmp(&b.multiplicity))
        .then_with(|| b.path_len.cmp(&a.path_len))
        .then_with(|| a.vertex.cmp(&b.vertex)));
}

// Holds the graph exclusively for one planning run.
// On success the graph carries the residual throughputs and every non-root
// vertex its route. A vertex is committed whole or not at all, but a failure
// does not undo the vertices served before it: their decrements and removals
// stay in the graph, which then is no valid plan.
pub struct AllocationPlanner<'g,O:PlanObserver = NoopObserver> {
    graph:&'g mut MeshGraph,
    observer:O,
}

impl<'g> AllocationPlanner<'g,NoopObserver> {
    pub fn new(graph:&'g mut MeshGraph) -> Self {
        Self {graph,observer:NoopObserver}
    }
}

impl<'g,O:PlanObserver> AllocationPlanner<'g,O> {
    pub fn with_observer(graph:&'g mut MeshGraph,observer:O) -> Self {
        Self {graph,observer}
    }

    // root id, connected, every edge has a throughput
    fn validate(&self) -> Result<usize> {
        let root = self.graph.root().ok_or(PlanError::MissingRoot)?;
        if !self.graph.is_connected() {
            return Err(PlanError::DisconnectedGraph{components:self.graph.connected_components().len()});
        }
        for id in self.graph.edge_ids() {
            let Some(edge) = self.graph.edge(id) else {continue};
            if !edge.throughput().is_some_and(|t| t.is_finite() && t >= 0.0) {
                return Err(PlanError::MissingWeights{edge:id,endpoints:edge.endpoints(),
                    attribute:EdgeAttribute::Throughput});
            }
        }
        Ok(root)
    }

    fn compute_order(&self,root:usize) -> Result<Vec<OrderEntry>> {
        // one bfs from the root gives hop length and path count of everyone
        let index = DenseIndex::from(&*self.graph);
        let layers = bfs_hops(self.graph,&index,root);
        let mut order = Vec::with_capacity(index.len().saturating_sub(1));
        for (i,vertex) in index.ids().iter().enumerate() {
            if *vertex == root {continue}
            let Some(path_len) = layers.dist[i] else {
                return Err(PlanError::DisconnectedGraph{components:self.graph.connected_components().len()});
            };
            let demand = self.graph.vertex(*vertex).map_or(0.0,|v| v.demand());
            order.push(OrderEntry {vertex:*vertex,demand,multiplicity:layers.count[i],path_len});
        }
        sort_order(&mut order);
        Ok(order)
    }

    // The order vertices would be served in, without touching the graph.
    pub fn processing_order(&self) -> Result<Vec<OrderEntry>> {
        let root = self.validate()?;
        self.compute_order(root)
    }

    pub fn run(mut self) -> Result<PlanReport> {
        let root = self.validate()?;
        let order = self.compute_order(root)?;
        self.observer.order_computed(&order);

        let mut report = PlanReport {order,..Default::default()};
        for i in 0..report.order.len() {
            let entry = report.order[i];
            match self.allocate(entry,root,&mut report.removed_edges) {
                Ok(route) => {
                    self.observer.vertex_routed(&route);
                    report.routes.push(route);
                }
                Err(error) => {
                    self.observer.allocation_failed(&error);
                    return Err(error);
                }
            }
        }
        Ok(report)
    }

    fn allocate(&mut self,entry:OrderEntry,root:usize,removed:&mut Vec<RemovedEdge>) -> Result<Route> {
        let vertex = entry.vertex;
        let demand = entry.demand;
        let path = shortest_hop_path(self.graph,vertex,root).ok_or(PlanError::AllocationInfeasible {
            vertex,
            shortfall:Shortfall::Unreachable{root},
        })?;
        self.observer.path_selected(vertex,&path);

        // zero demand is routed but consumes nothing
        if demand > 0.0 {
            // whole path is checked before any of it is committed
            for (hop,edge_id) in path.edges.iter().enumerate() {
                let edge = self.graph.edge(*edge_id).ok_or(GraphError::UnknownEdge{edge:*edge_id})?;
                let available = edge.throughput().unwrap_or(0.0);
                if available <= demand {
                    return Err(PlanError::AllocationInfeasible {
                        vertex,
                        shortfall:Shortfall::Throughput {
                            edge:*edge_id,
                            endpoints:(path.vertices[hop],path.vertices[hop + 1]),
                            available,
                            required:demand,
                        },
                    });
                }
            }
            for edge_id in path.edges.iter() {
                let edge = self.graph.edge_mut(*edge_id).ok_or(GraphError::UnknownEdge{edge:*edge_id})?;
                let remaining = edge.consume(demand);
                self.observer.edge_consumed(vertex,edge,demand);

                if remaining < demand {
                    let edge = self.graph.remove_edge(*edge_id)?;
                    self.observer.edge_removed(vertex,&edge);
                    removed.push(RemovedEdge {edge,removed_by:vertex});
                }
            }
        }

        if let Some(v) = self.graph.vertex_mut(vertex) {
            v.set_route(path.edges.clone(),path.vertices.clone());
        }
        Ok(Route {vertex,demand,edges:path.edges,vertices:path.vertices})
    }
}
