use crate::dsa::graph::Edge;
use crate::dsa::shortest_path::HopPath;
use crate::mesh_network::config::StatsMode;
use crate::mesh_network::error::PlanError;
use crate::mesh_network::metrics::DistanceMetrics;
use crate::mesh_network::planner::{OrderEntry, Route};
use crate::mesh_network::preparation::RootHeadroom;
use crate::scientific_computing::link_budget::LinkEstimate;

// Receives the decisions of the metrics engine, the preparation step and
// the planner. Every hook defaults to doing nothing; results never depend
// on what an observer does.
pub trait PlanObserver {
    fn order_computed(&mut self,_order:&[OrderEntry]) {}
    fn path_selected(&mut self,_vertex:usize,_path:&HopPath) {}
    // edge as it is after the decrement
    fn edge_consumed(&mut self,_vertex:usize,_edge:&Edge,_demand:f64) {}
    fn edge_removed(&mut self,_vertex:usize,_edge:&Edge) {}
    fn vertex_routed(&mut self,_route:&Route) {}
    fn allocation_failed(&mut self,_error:&PlanError) {}
    fn link_estimated(&mut self,_edge:&Edge,_estimate:&LinkEstimate) {}
    fn root_headroom(&mut self,_headroom:&RootHeadroom) {}
    fn metrics_computed(&mut self,_metrics:&DistanceMetrics,_mode:StatsMode) {}
}

impl<O:PlanObserver + ?Sized> PlanObserver for &mut O {
    fn order_computed(&mut self,order:&[OrderEntry]) {
        (**self).order_computed(order)
    }
    fn path_selected(&mut self,vertex:usize,path:&HopPath) {
        (**self).path_selected(vertex,path)
    }
    fn edge_consumed(&mut self,vertex:usize,edge:&Edge,demand:f64) {
        (**self).edge_consumed(vertex,edge,demand)
    }
    fn edge_removed(&mut self,vertex:usize,edge:&Edge) {
        (**self).edge_removed(vertex,edge)
    }
    fn vertex_routed(&mut self,route:&Route) {
        (**self).vertex_routed(route)
    }
    fn allocation_failed(&mut self,error:&PlanError) {
        (**self).allocation_failed(error)
    }
    fn link_estimated(&mut self,edge:&Edge,estimate:&LinkEstimate) {
        (**self).link_estimated(edge,estimate)
    }
    fn root_headroom(&mut self,headroom:&RootHeadroom) {
        (**self).root_headroom(headroom)
    }
    fn metrics_computed(&mut self,metrics:&DistanceMetrics,mode:StatsMode) {
        (**self).metrics_computed(metrics,mode)
    }
}

#[derive(Clone,Copy,Debug,Default)]
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}

// Forwards every decision to tracing. Per edge events are debug,
// per vertex and per run events info, shortfalls warn/error.
#[derive(Clone,Copy,Debug,Default)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn order_computed(&mut self,order:&[OrderEntry]) {
        tracing::info!(vertices = order.len(),"processing order computed");
        for (rank,entry) in order.iter().enumerate() {
            tracing::debug!(rank,vertex = entry.vertex,demand = entry.demand,
                multiplicity = entry.multiplicity,path_len = entry.path_len,"ordered");
        }
    }
    fn path_selected(&mut self,vertex:usize,path:&HopPath) {
        tracing::debug!(vertex,hops = path.hops(),path = ?path.vertices,"shortest path selected");
    }
    fn edge_consumed(&mut self,vertex:usize,edge:&Edge,demand:f64) {
        tracing::debug!(vertex,edge = edge.id(),endpoints = ?edge.endpoints(),demand,
            remaining = ?edge.throughput(),"throughput committed");
    }
    fn edge_removed(&mut self,vertex:usize,edge:&Edge) {
        tracing::info!(vertex,edge = edge.id(),endpoints = ?edge.endpoints(),weight = ?edge.weight(),
            remaining = ?edge.throughput(),"edge exhausted and removed");
    }
    fn vertex_routed(&mut self,route:&Route) {
        tracing::info!(vertex = route.vertex,demand = route.demand,route = ?route.vertices,"vertex routed");
    }
    fn allocation_failed(&mut self,error:&PlanError) {
        tracing::error!(%error,"allocation failed");
    }
    fn link_estimated(&mut self,edge:&Edge,estimate:&LinkEstimate) {
        tracing::info!(edge = edge.id(),endpoints = ?edge.endpoints(),distance = ?edge.weight(),
            path_loss = estimate.path_loss,throughput = estimate.throughput,
            capacity = estimate.capacity,"link budget");
    }
    fn root_headroom(&mut self,headroom:&RootHeadroom) {
        if headroom.is_sufficient() {
            tracing::info!(available = headroom.root_throughput,required = headroom.required,
                "root links support the total demand");
        } else {
            tracing::warn!(available = headroom.root_throughput,required = headroom.required,
                "root links do not have enough throughput for the total demand");
        }
    }
    fn metrics_computed(&mut self,metrics:&DistanceMetrics,mode:StatsMode) {
        let summary = metrics.summary(mode);
        tracing::info!(?mode,radius = summary.radius,diameter = summary.diameter,
            characteristic_path_length = metrics.characteristic_path_length(),
            avg_hop_count = metrics.avg_hop_count(),"distance metrics");
        if let Some(root) = metrics.root_summary() {
            tracing::info!(degree = root.degree,eccentricity = root.eccentricity,
                betweenness = root.betweenness,"root metrics");
        }
        tracing::debug!(eccentricity = ?summary.eccentricity,degree = ?metrics.degree(),
            betweenness = ?metrics.betweenness(),"per vertex metrics");
        tracing::trace!("distance matrix\n{}",metrics.distances());
        tracing::trace!("hop count matrix\n{}",metrics.hops());
    }
}
