// Random geometric meshes for simulations: the root sits in the centre of a
// square area, leaves are scattered uniformly, and every pair closer than the
// maximum link distance gets a line-of-sight link weighted by its length.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dsa::graph::{MeshGraph, ROOT, VertexKind};
use crate::mesh_network::error::Result;
use crate::scientific_computing::link_budget::LinkBudgetError;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub leaves:usize,
    // metres
    pub area_side:f64,
    // metres, longer links are not created
    pub max_link_distance:f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {leaves:50,area_side:1000.0,max_link_distance:300.0}
    }
}

#[derive(Clone,Debug)]
pub struct Scenario {
    pub graph:MeshGraph,
    // (x, y) in metres, indexed by vertex id
    pub positions:Vec<(f64,f64)>,
}

impl Scenario {
    pub fn distance(&self,a:usize,b:usize) -> Option<f64> {
        let (xa,ya) = self.positions.get(a)?;
        let (xb,yb) = self.positions.get(b)?;
        Some((xa - xb).hypot(ya - yb))
    }
}

fn check_length(length:f64) -> Result<()> {
    if !length.is_finite() || length <= 0.0 {
        return Err(LinkBudgetError::InvalidDistance{distance:length}.into());
    }
    Ok(())
}

// Vertex 0 is the root, 1..=leaves are leaves. Coincident points get no
// link. The result may be disconnected.
pub fn random_mesh<R:Rng>(config:&ScenarioConfig,rng:&mut R) -> Result<Scenario> {
    check_length(config.area_side)?;
    check_length(config.max_link_distance)?;

    let centre = config.area_side/2.0;
    let mut positions = Vec::with_capacity(config.leaves + 1);
    positions.push((centre,centre));
    for _ in 0..config.leaves {
        positions.push((rng.random_range(0.0..config.area_side),rng.random_range(0.0..config.area_side)));
    }

    let mut graph = MeshGraph::with_capacity(positions.len());
    graph.push_vertex(ROOT,VertexKind::Root)?;
    for id in 1..positions.len() {
        graph.push_vertex(id,VertexKind::Leaf)?;
    }
    for a in 0..positions.len() {
        let (xa,ya) = positions[a];
        for (b,(xb,yb)) in positions.iter().enumerate().skip(a + 1) {
            let d = (xa - xb).hypot(ya - yb);
            if d > 0.0 && d <= config.max_link_distance {
                graph.push_edge(a,b,Some(d))?;
            }
        }
    }
    Ok(Scenario {graph,positions})
}
