// Turns a distance graph into a plannable one: every link gets the
// throughput and capacity of its link budget, every leaf the uniform demand,
// and the root links are checked against the total demand.

use serde::Serialize;

use crate::dsa::graph::{EdgeId, MeshGraph, VertexKind};
use crate::mesh_network::error::{EdgeAttribute, PlanError, Result};
use crate::mesh_network::observer::PlanObserver;
use crate::scientific_computing::link_budget::{LinkBudgetConfig, LinkEstimate, estimate};

// Throughput of the links at the root against what the leaves ask for.
// Falling short does not stop planning, the planner will fail on its own
// if the shortage matters.
#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct RootHeadroom {
    // sum over root incident edges, Mbps
    pub root_throughput:f64,
    // leaves times demand, Mbps
    pub required:f64,
    pub leaves:usize,
}

impl RootHeadroom {
    pub fn is_sufficient(&self) -> bool {
        self.root_throughput >= self.required
    }
    pub fn margin(&self) -> f64 {
        self.root_throughput - self.required
    }
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PreparationReport {
    // ascending by edge id
    pub estimates:Vec<(EdgeId,LinkEstimate)>,
    pub headroom:RootHeadroom,
}

// Sets throughput and capacity of every edge from its distance and
// demand on every leaf. All links are estimated before anything is
// written, a link without distance or outside the model and an invalid
// demand leave the graph as it was.
pub fn prepare_graph<O:PlanObserver>(graph:&mut MeshGraph,config:&LinkBudgetConfig,demand:f64,mut observer:O)
    -> Result<PreparationReport>
{
    let root = graph.root().ok_or(PlanError::MissingRoot)?;

    let mut estimates = Vec::with_capacity(graph.edges_len());
    for id in graph.edge_ids() {
        let Some(edge) = graph.edge(id) else {continue};
        let distance = edge.weight().ok_or(PlanError::MissingWeights {
            edge:id,
            endpoints:edge.endpoints(),
            attribute:EdgeAttribute::Weight,
        })?;
        estimates.push((id,estimate(distance,config)?));
    }

    let leaves:Vec<usize> = graph.vertices()
        .filter(|v| v.kind() == VertexKind::Leaf)
        .map(|v| v.id())
        .collect();
    for leaf in leaves.iter() {
        graph.set_demand(*leaf,demand)?;
    }

    let mut root_throughput = 0.0;
    for (id,link) in estimates.iter() {
        let Some(edge) = graph.edge_mut(*id) else {continue};
        edge.set_throughput(link.throughput)?;
        edge.set_capacity(link.capacity)?;
        observer.link_estimated(edge,link);
        if edge.other(root).is_some() {
            root_throughput += link.throughput;
        }
    }

    let headroom = RootHeadroom {root_throughput,required:leaves.len() as f64*demand,leaves:leaves.len()};
    observer.root_headroom(&headroom);
    Ok(PreparationReport {estimates,headroom})
}

pub fn prepare_largest_component(graph:&MeshGraph) -> Result<MeshGraph> {
    let largest = graph.largest_component();
    if largest.root().is_none() {
        return Err(PlanError::MissingRoot);
    }
    Ok(largest)
}

#[cfg(test)]
mod tests {
    use super::{RootHeadroom, prepare_graph, prepare_largest_component};
    use crate::dsa::graph::{GraphError, MeshGraph, VertexKind};
    use crate::mesh_network::error::{EdgeAttribute, PlanError};
    use crate::mesh_network::observer::{NoopObserver, PlanObserver};
    use crate::scientific_computing::link_budget::{Carrier, LinkBudgetConfig, LinkBudgetError, LinkEstimate, estimate};

    fn distances(n:usize,links:&[(usize,usize,f64)]) -> MeshGraph {
        let mut g = MeshGraph::new();
        g.push_vertex(0,VertexKind::Root).unwrap();
        for i in 1..n {g.push_vertex(i,VertexKind::Leaf).unwrap();}
        for (a,b,d) in links {g.push_edge(*a,*b,Some(*d)).unwrap();}
        g
    }

    #[test]
    fn test_link_budget_applied_to_every_edge() {
        let mut g = distances(4,&[(0,1,100.0),(1,2,400.0),(0,3,1000.0)]);
        let config = LinkBudgetConfig::default();
        let report = prepare_graph(&mut g,&config,50.0,NoopObserver).unwrap();

        assert_eq!(report.estimates.len(),3);
        for (id,link) in report.estimates.iter() {
            let edge = g.edge(*id).unwrap();
            let expected = estimate(edge.weight().unwrap(),&config).unwrap();
            assert_eq!(*link,expected);
            assert_eq!(edge.throughput(),Some(expected.throughput));
            assert_eq!(edge.capacity(),Some(expected.capacity));
        }
        // longer links never get more throughput
        let near = g.edge(g.edge_between(0,1).unwrap()).unwrap().throughput().unwrap();
        let far = g.edge(g.edge_between(0,3).unwrap()).unwrap().throughput().unwrap();
        assert!(near >= far);

        for v in 1..4 {
            assert_eq!(g.vertex(v).unwrap().demand(),50.0);
        }
        assert_eq!(g.vertex(0).unwrap().demand(),0.0);
    }

    #[test]
    fn test_root_headroom() {
        let mut g = distances(3,&[(0,1,100.0),(1,2,100.0)]);
        let config = LinkBudgetConfig::default();
        let link = estimate(100.0,&config).unwrap();

        let report = prepare_graph(&mut g,&config,100.0,NoopObserver).unwrap();
        assert_eq!(report.headroom,RootHeadroom {root_throughput:link.throughput,required:200.0,leaves:2});
        assert!(report.headroom.is_sufficient());

        // not enough at the root is reported, not fatal
        let demand = link.throughput;
        let report = prepare_graph(&mut g,&config,demand,NoopObserver).unwrap();
        assert!(!report.headroom.is_sufficient());
        assert_eq!(report.headroom.margin(),-demand);
        assert_eq!(g.vertex(2).unwrap().demand(),demand);
    }

    #[test]
    fn test_relays_carry_no_demand() {
        let mut g = distances(2,&[(0,1,100.0)]);
        g.push_vertex(5,VertexKind::Relay).unwrap();
        g.push_edge(1,5,Some(50.0)).unwrap();
        let report = prepare_graph(&mut g,&LinkBudgetConfig::default(),20.0,NoopObserver).unwrap();
        assert_eq!(g.vertex(5).unwrap().demand(),0.0);
        assert_eq!(report.headroom.leaves,1);
    }

    #[test]
    fn test_failures_leave_graph_untouched() {
        let mut g = distances(3,&[(0,1,100.0)]);
        g.push_edge(1,2,None).unwrap();
        let err = prepare_graph(&mut g,&LinkBudgetConfig::default(),10.0,NoopObserver).unwrap_err();
        assert_eq!(err,PlanError::MissingWeights{edge:1,endpoints:(1,2),attribute:EdgeAttribute::Weight});
        assert_eq!(g.edge(0).unwrap().throughput(),None);
        assert_eq!(g.vertex(1).unwrap().demand(),0.0);

        let mut g = distances(2,&[(0,1,100.0)]);
        let config = LinkBudgetConfig {carrier:Carrier::Ghz140,..Default::default()};
        assert_eq!(prepare_graph(&mut g,&config,10.0,NoopObserver),
            Err(PlanError::LinkBudget(LinkBudgetError::UnsupportedCarrier{carrier:Carrier::Ghz140})));

        let mut g = distances(2,&[(0,1,0.0)]);
        assert!(matches!(prepare_graph(&mut g,&LinkBudgetConfig::default(),10.0,NoopObserver),
            Err(PlanError::LinkBudget(LinkBudgetError::InvalidDistance{..}))));
        assert_eq!(g.edge(0).unwrap().throughput(),None);

        let mut g = distances(2,&[(0,1,100.0)]);
        assert_eq!(prepare_graph(&mut g,&LinkBudgetConfig::default(),-1.0,NoopObserver),
            Err(PlanError::Graph(GraphError::InvalidDemand{vertex:1,demand:-1.0})));
        assert_eq!(g.edge(0).unwrap().throughput(),None);
    }

    #[derive(Default)]
    struct Counter {
        links:usize,
        headroom:Option<RootHeadroom>,
    }

    impl PlanObserver for Counter {
        fn link_estimated(&mut self,_edge:&crate::dsa::graph::Edge,_estimate:&LinkEstimate) {
            self.links += 1;
        }
        fn root_headroom(&mut self,headroom:&RootHeadroom) {
            self.headroom = Some(*headroom);
        }
    }

    #[test]
    fn test_observer_sees_every_link() {
        let mut g = distances(4,&[(0,1,100.0),(1,2,100.0),(2,3,100.0),(0,3,200.0)]);
        let mut counter = Counter::default();
        let report = prepare_graph(&mut g,&LinkBudgetConfig::default(),10.0,&mut counter).unwrap();
        assert_eq!(counter.links,4);
        assert_eq!(counter.headroom,Some(report.headroom));
    }

    #[test]
    fn test_largest_component() {
        let g = distances(6,&[(0,1,10.0),(1,2,10.0),(3,4,10.0)]);
        let largest = prepare_largest_component(&g).unwrap();
        assert_eq!(largest.vertex_ids(),vec![0,1,2]);
        assert_eq!(largest.root(),Some(0));
        assert_eq!(g.unconnected_vertices(),vec![3,4,5]);

        // root stranded in the smaller part
        let g = distances(5,&[(0,1,10.0),(2,3,10.0),(3,4,10.0)]);
        assert_eq!(prepare_largest_component(&g).unwrap_err(),PlanError::MissingRoot);
    }
}
