use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dsa::graph::{GraphError, MeshGraph, VertexKind};

// Required throughput per vertex, Mbps.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demand {
    // the same demand on every leaf
    Uniform(f64),
    // explicit demands, vertices not listed keep theirs
    PerVertex(BTreeMap<usize,f64>),
}

impl Demand {
    pub fn apply(&self,graph:&mut MeshGraph) -> Result<(),GraphError> {
        match self {
            Demand::Uniform(t) => {
                let leaves:Vec<usize> = graph.vertex_ids().into_iter()
                    .filter(|id| graph.vertex(*id).is_some_and(|v| v.kind() == VertexKind::Leaf))
                    .collect();
                for leaf in leaves {
                    graph.set_demand(leaf,*t)?;
                }
            }
            Demand::PerVertex(demands) => {
                for (vertex,t) in demands {
                    graph.set_demand(*vertex,*t)?;
                }
            }
        }
        Ok(())
    }
}

// Which distance flavour DistanceMetrics::summary reports.
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    #[default]
    Weighted,
    HopCount,
}

#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    // every edge must carry a weight
    #[default]
    Required,
    // edges without a weight count as 1
    UnitFallback,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct PlanningRequest {
    pub demand:Demand,
    // reporting only, allocation always routes by hop count
    #[serde(default)]
    pub stats:StatsMode,
    #[serde(default)]
    pub weights:WeightPolicy,
    // compute distance metrics of the input graph before planning
    #[serde(default)]
    pub diagnostics:bool,
}

impl PlanningRequest {
    pub fn new(demand:Demand) -> Self {
        Self {demand,stats:StatsMode::default(),weights:WeightPolicy::default(),diagnostics:false}
    }
    pub fn with_diagnostics(mut self,stats:StatsMode) -> Self {
        self.diagnostics = true;
        self.stats = stats;
        self
    }
}
