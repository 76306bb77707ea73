// capacity planning on a wireless mesh access network
// one root (PoP) aggregates the traffic of every leaf (CPE);
// links carry a distance and, after preparation, a throughput that
// the planner consumes while routing each leaf towards the root

pub mod config;
pub mod creation;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod planner;
pub mod preparation;
pub mod scenario;

use serde::Serialize;

use crate::dsa::graph::MeshGraph;
use config::PlanningRequest;
use error::Result;
use metrics::DistanceMetrics;
use observer::PlanObserver;
use planner::{AllocationPlanner, PlanReport};

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct PlanningOutcome {
    // distance structure of the graph before allocation, when requested
    pub metrics:Option<DistanceMetrics>,
    pub report:PlanReport,
}

// Applies the request's demands, optionally measures the graph and then runs
// the allocation. Routes of an earlier run are discarded first.
pub fn plan_network<O:PlanObserver>(graph:&mut MeshGraph,request:&PlanningRequest,mut observer:O)
    -> Result<PlanningOutcome>
{
    request.demand.apply(graph)?;
    graph.clear_routes();

    let metrics = if request.diagnostics {
        let metrics = DistanceMetrics::compute(graph,request.weights)?;
        observer.metrics_computed(&metrics,request.stats);
        Some(metrics)
    } else {
        None
    };

    let report = AllocationPlanner::with_observer(graph,&mut observer).run()?;
    Ok(PlanningOutcome {metrics,report})
}
