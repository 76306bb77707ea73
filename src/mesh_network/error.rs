use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::dsa::graph::{EdgeId, GraphError};
use crate::linear_algebra::matrix::MatrixError;
use crate::scientific_computing::link_budget::LinkBudgetError;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub enum EdgeAttribute {
    Weight,
    Throughput,
}

impl Display for EdgeAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeAttribute::Weight => write!(f,"weight"),
            EdgeAttribute::Throughput => write!(f,"throughput"),
        }
    }
}

// Why a vertex's demand could not be committed.
#[derive(Clone,Debug,PartialEq,Serialize)]
pub enum Shortfall {
    // endpoints is oriented from the vertex towards the root
    Throughput{edge:EdgeId,endpoints:(usize,usize),available:f64,required:f64},
    // earlier edge removals cut the vertex off
    Unreachable{root:usize},
}

impl Shortfall {
    // Missing Mbps on the offending edge, None when the root is unreachable.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Shortfall::Throughput{available,required,..} => Some(required - available),
            Shortfall::Unreachable{..} => None,
        }
    }
    pub fn edge(&self) -> Option<EdgeId> {
        match self {
            Shortfall::Throughput{edge,..} => Some(*edge),
            Shortfall::Unreachable{..} => None,
        }
    }
}

impl Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shortfall::Throughput{edge,endpoints:(a,b),available,required} => write!(f,
                "link ({a},{b}) [edge {edge}] has {available} Mbps left, {required} Mbps required, short by {}",
                required - available),
            Shortfall::Unreachable{root} => write!(f,"no path to root {root} is left"),
        }
    }
}

#[derive(Error,Debug,Clone,PartialEq)]
pub enum PlanError {
    #[error("Graph is not connected, it falls apart into {components} components")]
    DisconnectedGraph{components:usize},
    #[error("Edge {edge} {endpoints:?} has no {attribute}")]
    MissingWeights{edge:EdgeId,endpoints:(usize,usize),attribute:EdgeAttribute},
    #[error("Vertex {vertex} cannot be allocated: {shortfall}")]
    AllocationInfeasible{vertex:usize,shortfall:Shortfall},
    #[error("Graph has {vertices} vertices, distance statistics need at least 2")]
    EmptyGraph{vertices:usize},
    #[error("Graph has no root vertex")]
    MissingRoot,
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    LinkBudget(#[from] LinkBudgetError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type Result<T> = std::result::Result<T,PlanError>;
