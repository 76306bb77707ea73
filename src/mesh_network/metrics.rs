// All-pairs distance statistics of a connected mesh.
// Rows and columns of every matrix and every per-vertex vector follow
// ascending vertex id; DistanceMetrics::vertex_ids is the mapping.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dsa::graph::{EdgeId, MeshGraph, ROOT};
use crate::dsa::shortest_path::{DenseIndex, bfs_hops, shortest_path_tree};
use crate::linear_algebra::matrix::Matrix;
use crate::mesh_network::config::{StatsMode, WeightPolicy};
use crate::mesh_network::error::{EdgeAttribute, PlanError, Result};
use crate::scientific_computing::statistics;

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct DistanceMetrics {
    vertex_ids:Vec<usize>,
    distances:Matrix,
    hops:Matrix,
    eccentricity:Vec<f64>,
    radius:f64,
    diameter:f64,
    avg_path_length:Vec<f64>,
    characteristic_path_length:f64,
    hop_eccentricity:Vec<f64>,
    hop_radius:f64,
    hop_diameter:f64,
    avg_hop_length:Vec<f64>,
    avg_hop_count:f64,
    characteristic_hop_count:f64,
    degree:Vec<usize>,
    betweenness:Vec<f64>,
    // ascending by edge id
    edge_betweenness:Vec<(EdgeId,f64)>,
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct EccentricitySummary<'a> {
    pub eccentricity:&'a [f64],
    pub radius:f64,
    pub diameter:f64,
}

#[derive(Clone,Copy,Debug,PartialEq,Serialize)]
pub struct RootSummary {
    pub degree:usize,
    pub eccentricity:f64,
    pub hop_eccentricity:f64,
    pub avg_path_length:f64,
    pub avg_hop_length:f64,
    pub betweenness:f64,
}

struct Extremes {
    eccentricity:Vec<f64>,
    radius:f64,
    diameter:f64,
    averages:Vec<f64>,
}

// eccentricity = row maxima, averages = column sums over n-1
fn extremes(matrix:&Matrix,n:usize) -> Result<Extremes> {
    let empty = || PlanError::EmptyGraph{vertices:n};
    let mut eccentricity = Vec::with_capacity(n);
    for row in matrix.rows() {
        eccentricity.push(statistics::max(row).ok_or_else(empty)?);
    }
    let radius = statistics::min(&eccentricity).ok_or_else(empty)?;
    let diameter = statistics::max(&eccentricity).ok_or_else(empty)?;
    let averages = matrix.col_sums().into_iter().map(|sum| sum/(n - 1) as f64).collect();
    Ok(Extremes {eccentricity,radius,diameter,averages})
}

impl DistanceMetrics {
    // Fails with EmptyGraph below two vertices, DisconnectedGraph when
    // some pair is unreachable and MissingWeights when an edge has no
    // weight and policy does not allow unit weights.
    pub fn compute(graph:&MeshGraph,policy:WeightPolicy) -> Result<Self> {
        let n = graph.nodes_len();
        if n < 2 {
            return Err(PlanError::EmptyGraph{vertices:n});
        }
        if !graph.is_connected() {
            return Err(PlanError::DisconnectedGraph{components:graph.connected_components().len()});
        }
        if policy == WeightPolicy::Required {
            for id in graph.edge_ids() {
                let Some(edge) = graph.edge(id) else {continue};
                if edge.weight().is_none() {
                    return Err(PlanError::MissingWeights{edge:id,endpoints:edge.endpoints(),
                        attribute:EdgeAttribute::Weight});
                }
            }
        }

        let index = DenseIndex::from(graph);
        let mut distances = Matrix::zeros(n,n);
        let mut hops = Matrix::zeros(n,n);
        let mut betweenness = vec![0.0;n];
        let mut edge_totals:BTreeMap<EdgeId,f64> = graph.edge_ids().into_iter().map(|id| (id,0.0)).collect();
        for (row,source) in index.ids().iter().enumerate() {
            let tree = shortest_path_tree(graph,&index,*source,|edge| edge.weight().unwrap_or(1.0));
            tree.accumulate(&mut betweenness,&mut edge_totals);
            distances.set_row(row,&tree.dist)?;

            let layers = bfs_hops(graph,&index,*source);
            let mut hop_row = Vec::with_capacity(n);
            for d in layers.dist {
                // connectivity was checked above
                let d = d.ok_or(PlanError::DisconnectedGraph{components:graph.connected_components().len()})?;
                hop_row.push(d as f64);
            }
            hops.set_row(row,&hop_row)?;
        }
        debug_assert!(distances.is_symmetric(1e-9));
        debug_assert!(hops.is_symmetric(0.0));

        let weighted = extremes(&distances,n)?;
        let hop = extremes(&hops,n)?;
        let empty = || PlanError::EmptyGraph{vertices:n};
        let characteristic_path_length = statistics::median(&weighted.averages).ok_or_else(empty)?;
        let avg_hop_count = statistics::mean(&hop.averages).ok_or_else(empty)?;
        let characteristic_hop_count = statistics::median(&hop.averages).ok_or_else(empty)?;
        let degree = index.ids().iter().map(|id| graph.degree(*id).unwrap_or(0)).collect();
        // every unordered pair was counted from both ends
        for b in betweenness.iter_mut() {
            *b /= 2.0;
        }
        let edge_betweenness = edge_totals.into_iter().map(|(id,total)| (id,total/2.0)).collect();

        Ok(Self {
            vertex_ids:index.ids().to_vec(),
            distances,
            hops,
            eccentricity:weighted.eccentricity,
            radius:weighted.radius,
            diameter:weighted.diameter,
            avg_path_length:weighted.averages,
            characteristic_path_length,
            hop_eccentricity:hop.eccentricity,
            hop_radius:hop.radius,
            hop_diameter:hop.diameter,
            avg_hop_length:hop.averages,
            avg_hop_count,
            characteristic_hop_count,
            degree,
            betweenness,
            edge_betweenness,
        })
    }

    pub fn vertex_ids(&self) -> &[usize] {
        &self.vertex_ids
    }
    pub fn index_of(&self,vertex:usize) -> Option<usize> {
        self.vertex_ids.binary_search(&vertex).ok()
    }
    // weighted distance matrix D
    pub fn distances(&self) -> &Matrix {
        &self.distances
    }
    // hop count matrix H
    pub fn hops(&self) -> &Matrix {
        &self.hops
    }
    pub fn distance(&self,a:usize,b:usize) -> Option<f64> {
        self.distances.get(self.index_of(a)?,self.index_of(b)?).ok()
    }
    pub fn hop_distance(&self,a:usize,b:usize) -> Option<f64> {
        self.hops.get(self.index_of(a)?,self.index_of(b)?).ok()
    }
    pub fn eccentricity(&self) -> &[f64] {
        &self.eccentricity
    }
    pub fn radius(&self) -> f64 {
        self.radius
    }
    pub fn diameter(&self) -> f64 {
        self.diameter
    }
    pub fn avg_path_length(&self) -> &[f64] {
        &self.avg_path_length
    }
    pub fn characteristic_path_length(&self) -> f64 {
        self.characteristic_path_length
    }
    pub fn hop_eccentricity(&self) -> &[f64] {
        &self.hop_eccentricity
    }
    pub fn hop_radius(&self) -> f64 {
        self.hop_radius
    }
    pub fn hop_diameter(&self) -> f64 {
        self.hop_diameter
    }
    pub fn avg_hop_length(&self) -> &[f64] {
        &self.avg_hop_length
    }
    pub fn avg_hop_count(&self) -> f64 {
        self.avg_hop_count
    }
    pub fn characteristic_hop_count(&self) -> f64 {
        self.characteristic_hop_count
    }
    pub fn degree(&self) -> &[usize] {
        &self.degree
    }
    // weighted shortest paths through each vertex, endpoints excluded
    pub fn betweenness(&self) -> &[f64] {
        &self.betweenness
    }
    pub fn edge_betweenness(&self) -> &[(EdgeId,f64)] {
        &self.edge_betweenness
    }
    pub fn edge_betweenness_of(&self,edge:EdgeId) -> Option<f64> {
        let i = self.edge_betweenness.binary_search_by_key(&edge,|(id,_)| *id).ok()?;
        Some(self.edge_betweenness[i].1)
    }

    pub fn summary(&self,mode:StatsMode) -> EccentricitySummary<'_> {
        match mode {
            StatsMode::Weighted => EccentricitySummary {
                eccentricity:&self.eccentricity,
                radius:self.radius,
                diameter:self.diameter,
            },
            StatsMode::HopCount => EccentricitySummary {
                eccentricity:&self.hop_eccentricity,
                radius:self.hop_radius,
                diameter:self.hop_diameter,
            },
        }
    }

    // Figures of the PoP, None if the graph has no vertex 0.
    pub fn root_summary(&self) -> Option<RootSummary> {
        let i = self.index_of(ROOT)?;
        Some(RootSummary {
            degree:self.degree[i],
            eccentricity:self.eccentricity[i],
            hop_eccentricity:self.hop_eccentricity[i],
            avg_path_length:self.avg_path_length[i],
            avg_hop_length:self.avg_hop_length[i],
            betweenness:self.betweenness[i],
        })
    }
}
