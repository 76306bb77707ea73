use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type HashSet<K> = std::collections::hash_set::HashSet<K,nohash::BuildNoHashHasher<usize>>;

pub type EdgeId = usize;

// Id of the aggregation vertex by convention.
pub const ROOT:usize = 0;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum GraphError {
    #[error("Vertex {vertex} does not exist")]
    UnknownVertex{vertex:usize},
    #[error("Edge {edge} does not exist")]
    UnknownEdge{edge:EdgeId},
    #[error("Vertex {vertex} was inserted twice")]
    DuplicateVertex{vertex:usize},
    #[error("Link ({a},{b}) already present as edge {existing}")]
    DuplicateEdge{a:usize,b:usize,existing:EdgeId},
    #[error("Link ({vertex},{vertex}) would be a self loop")]
    SelfLoop{vertex:usize},
    #[error("Link ({a},{b}) has weight {weight}, weights must be finite and >= 0")]
    InvalidWeight{a:usize,b:usize,weight:f64},
    #[error("Edge {edge} would get throughput {throughput}, throughputs must be finite and >= 0")]
    InvalidThroughput{edge:EdgeId,throughput:f64},
    #[error("Edge {edge} would get capacity {capacity}, capacities must be finite and >= 0")]
    InvalidCapacity{edge:EdgeId,capacity:f64},
    #[error("Vertex {vertex} has demand {demand}, demands must be finite and >= 0")]
    InvalidDemand{vertex:usize,demand:f64},
    #[error("Vertex {vertex} declared as root, but {existing} already is the root")]
    RootConflict{vertex:usize,existing:usize},
    #[error("Vertex {vertex} declared as {kind:?}, but it already is a {existing:?}")]
    KindConflict{vertex:usize,kind:VertexKind,existing:VertexKind},
}

pub type Result<T> = std::result::Result<T,GraphError>;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    // aggregation point (PoP)
    #[serde(alias = "PoP")]
    Root,
    // demand bearing access device (CPE)
    #[serde(alias = "CPE")]
    Leaf,
    // intermediate device (EDGE node)
    #[serde(alias = "EDGE")]
    Relay,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Vertex {
    id:usize,
    kind:VertexKind,
    // Mbps
    demand:f64,
    // written by the planner, vertex -> root
    route_edges:Vec<EdgeId>,
    route_vertices:Vec<usize>,
}

impl Vertex {
    fn new(id:usize,kind:VertexKind) -> Self {
        Self {id,kind,demand:0.0,route_edges:vec![],route_vertices:vec![]}
    }
    pub fn id(&self) -> usize {
        self.id
    }
    pub fn kind(&self) -> VertexKind {
        self.kind
    }
    pub fn demand(&self) -> f64 {
        self.demand
    }
    pub fn route_edges(&self) -> &[EdgeId] {
        &self.route_edges
    }
    pub fn route_vertices(&self) -> &[usize] {
        &self.route_vertices
    }
    pub fn is_routed(&self) -> bool {
        !self.route_vertices.is_empty()
    }
    pub(crate) fn set_route(&mut self,edges:Vec<EdgeId>,vertices:Vec<usize>) {
        self.route_edges = edges;
        self.route_vertices = vertices;
    }
    pub(crate) fn clear_route(&mut self) {
        self.route_edges.clear();
        self.route_vertices.clear();
    }
}

// An undirected link. weight is the physical distance and never changes
// once the edge exists, throughput is the residual usable rate.
#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Edge {
    id:EdgeId,
    endpoints:(usize,usize),
    weight:Option<f64>,
    throughput:Option<f64>,
    capacity:Option<f64>,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }
    pub fn endpoints(&self) -> (usize,usize) {
        self.endpoints
    }
    pub fn other(&self,vertex:usize) -> Option<usize> {
        let (a,b) = self.endpoints;
        if a == vertex {return Some(b)}
        if b == vertex {return Some(a)}
        None
    }
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }
    pub fn throughput(&self) -> Option<f64> {
        self.throughput
    }
    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }
    pub fn set_throughput(&mut self,throughput:f64) -> Result<()> {
        if !throughput.is_finite() || throughput < 0.0 {
            return Err(GraphError::InvalidThroughput{edge:self.id,throughput});
        }
        self.throughput = Some(throughput);
        Ok(())
    }
    pub fn set_capacity(&mut self,capacity:f64) -> Result<()> {
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(GraphError::InvalidCapacity{edge:self.id,capacity});
        }
        self.capacity = Some(capacity);
        Ok(())
    }
    // caller checked that throughput is present and large enough
    pub(crate) fn consume(&mut self,amount:f64) -> f64 {
        let remaining = self.throughput.unwrap_or(0.0) - amount;
        self.throughput = Some(remaining);
        remaining
    }
}

// Undirected, weighted, mutable mesh graph with typed vertices.
// Vertex ids are chosen by the caller and stay stable. Edge ids are handed
// out in insertion order and are never reused, even after removal.
#[derive(Clone,Debug)]
pub struct MeshGraph {
    vertices:HashMap<usize,Vertex>,
    edges:HashMap<EdgeId,Edge>,
    // vertex -> (neighbour -> connecting edge)
    adjacency:HashMap<usize,HashMap<usize,EdgeId>>,
    next_edge:EdgeId,
    root:Option<usize>,
}

impl Default for MeshGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshGraph {
    pub fn new() -> Self {
        Self {
            vertices:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            edges:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            adjacency:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            next_edge:0,
            root:None,
        }
    }
    pub fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        Self {
            vertices:HashMap::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default()),
            edges:HashMap::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default()),
            adjacency:HashMap::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default()),
            next_edge:0,
            root:None,
        }
    }
    pub fn shrink_to_fit(&mut self) {
        self.vertices.shrink_to_fit();
        self.edges.shrink_to_fit();
        self.adjacency.shrink_to_fit();
        for neighbours in self.adjacency.values_mut() {
            neighbours.shrink_to_fit();
        }
    }
    pub fn nodes_len(&self) -> usize {
        self.vertices.len()
    }
    pub fn edges_len(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        if self.nodes_len() == 0 {
            debug_assert!(self.edges_len() == 0);
            return true;
        }
        false
    }
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn push_vertex(&mut self,id:usize,kind:VertexKind) -> Result<()> {
        if self.vertices.contains_key(&id) {
            return Err(GraphError::DuplicateVertex{vertex:id});
        }
        if kind == VertexKind::Root {
            if let Some(existing) = self.root {
                return Err(GraphError::RootConflict{vertex:id,existing});
            }
            self.root = Some(id);
        }
        self.vertices.insert(id,Vertex::new(id,kind));
        self.adjacency.insert(id,HashMap::with_hasher(nohash::BuildNoHashHasher::default()));
        Ok(())
    }

    pub fn push_edge(&mut self,a:usize,b:usize,weight:Option<f64>) -> Result<EdgeId> {
        if a == b {
            return Err(GraphError::SelfLoop{vertex:a});
        }
        for node in [a,b] {
            if !self.vertices.contains_key(&node) {
                return Err(GraphError::UnknownVertex{vertex:node});
            }
        }
        if let Some(w) = weight {
            if !w.is_finite() || w < 0.0 {
                return Err(GraphError::InvalidWeight{a,b,weight:w});
            }
        }
        // (a,b) and (b,a) are the same link
        if let Some(existing) = self.edge_between(a,b) {
            return Err(GraphError::DuplicateEdge{a,b,existing});
        }

        let id = self.next_edge;
        self.next_edge += 1;
        self.edges.insert(id,Edge {id,endpoints:(a,b),weight,throughput:None,capacity:None});
        if let Some(adj) = self.adjacency.get_mut(&a) {adj.insert(b,id);}
        if let Some(adj) = self.adjacency.get_mut(&b) {adj.insert(a,id);}

        #[cfg(debug_assertions)]
        self.assert_edge(id);
        Ok(id)
    }

    pub fn remove_edge(&mut self,id:EdgeId) -> Result<Edge> {
        let edge = self.edges.remove(&id).ok_or(GraphError::UnknownEdge{edge:id})?;
        let (a,b) = edge.endpoints;
        if let Some(adj) = self.adjacency.get_mut(&a) {adj.remove(&b);}
        if let Some(adj) = self.adjacency.get_mut(&b) {adj.remove(&a);}
        Ok(edge)
    }

    pub fn vertex(&self,id:usize) -> Option<&Vertex> {
        self.vertices.get(&id)
    }
    pub(crate) fn vertex_mut(&mut self,id:usize) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }
    pub fn edge(&self,id:EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }
    pub fn edge_mut(&mut self,id:EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }
    pub fn edge_between(&self,a:usize,b:usize) -> Option<EdgeId> {
        self.adjacency.get(&a)?.get(&b).copied()
    }

    pub fn set_demand(&mut self,vertex:usize,demand:f64) -> Result<()> {
        if !demand.is_finite() || demand < 0.0 {
            return Err(GraphError::InvalidDemand{vertex,demand});
        }
        let v = self.vertices.get_mut(&vertex).ok_or(GraphError::UnknownVertex{vertex})?;
        v.demand = demand;
        Ok(())
    }

    pub fn clear_routes(&mut self) {
        for v in self.vertices.values_mut() {
            v.clear_route();
        }
    }

    // Neighbours of vertex with the connecting edge, ascending by vertex id.
    pub fn neighbours(&self,vertex:usize) -> Option<Vec<(usize,EdgeId)>> {
        let mut adj:Vec<(usize,EdgeId)> = self.adjacency.get(&vertex)?
            .iter().map(|(n,e)| (*n,*e)).collect();
        adj.sort_unstable();
        Some(adj)
    }
    pub fn degree(&self,vertex:usize) -> Option<usize> {
        self.adjacency.get(&vertex).map(|adj| adj.len())
    }

    pub fn vertex_ids(&self) -> Vec<usize> {
        let mut ids:Vec<usize> = self.vertices.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids:Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
    // unordered
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }
    // unordered
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    // iterative dfs, returns the visit order
    pub fn dfs(&self,start:usize) -> Option<Vec<usize>> {
        if !self.vertices.contains_key(&start) {
            return None;
        }
        let mut visited:HashSet<usize> = HashSet::with_capacity_and_hasher(
            self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut stack = Vec::with_capacity(self.nodes_len());
        let mut order = Vec::with_capacity(self.nodes_len());
        stack.push(start);
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);
            // reversed so the smallest neighbour is visited first
            for (next,_) in self.neighbours(current)?.into_iter().rev() {
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
        Some(order)
    }

    // Connected components, largest first. Ties go to the component holding
    // the smaller vertex id. Each component is sorted ascending.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut seen:HashSet<usize> = HashSet::with_capacity_and_hasher(
            self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut components = vec![];
        for id in self.vertex_ids() {
            if seen.contains(&id) {continue}
            let Some(mut component) = self.dfs(id) else {continue};
            seen.extend(component.iter().copied());
            component.sort_unstable();
            components.push(component);
        }
        components.sort_by(|a,b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
        components
    }

    pub fn is_connected(&self) -> bool {
        if self.nodes_len() <= 1 {return true}
        let Some(start) = self.vertices.keys().next() else {return true};
        self.dfs(*start).is_some_and(|order| order.len() == self.nodes_len())
    }

    // Subgraph induced by the largest connected component. Ids, attributes
    // and routes are kept.
    pub fn largest_component(&self) -> MeshGraph {
        match self.connected_components().first() {
            Some(component) => self.induced_subgraph(component),
            None => MeshGraph::new(),
        }
    }

    // Vertices outside the largest component, i.e. the ones that still need
    // a link before they can be planned.
    pub fn unconnected_vertices(&self) -> Vec<usize> {
        let mut rest:Vec<usize> = self.connected_components().into_iter().skip(1).flatten().collect();
        rest.sort_unstable();
        rest
    }

    pub fn induced_subgraph(&self,ids:&[usize]) -> MeshGraph {
        let keep:HashSet<usize> = ids.iter().copied()
            .filter(|id| self.vertices.contains_key(id)).collect();
        let mut sub = MeshGraph::with_capacity(keep.len());
        for id in keep.iter() {
            if let Some(v) = self.vertices.get(id) {
                if v.kind == VertexKind::Root {sub.root = Some(*id)}
                sub.vertices.insert(*id,v.clone());
                sub.adjacency.insert(*id,HashMap::with_hasher(nohash::BuildNoHashHasher::default()));
            }
        }
        for edge in self.edges.values() {
            let (a,b) = edge.endpoints;
            if !keep.contains(&a) || !keep.contains(&b) {continue}
            sub.edges.insert(edge.id,edge.clone());
            if let Some(adj) = sub.adjacency.get_mut(&a) {adj.insert(b,edge.id);}
            if let Some(adj) = sub.adjacency.get_mut(&b) {adj.insert(a,edge.id);}
        }
        sub.next_edge = self.next_edge;
        sub.shrink_to_fit();
        sub
    }

    #[cfg(debug_assertions)]
    fn assert_edge(&self,id:EdgeId) {
        let edge = self.edges.get(&id).expect("edge was just inserted");
        let (a,b) = edge.endpoints;
        assert_eq!(self.adjacency.get(&a).and_then(|adj| adj.get(&b)),Some(&id),
            "Edge {id} ({a},{b}) missing from {a}'s adjacency");
        assert_eq!(self.adjacency.get(&b).and_then(|adj| adj.get(&a)),Some(&id),
            "Edge {id} ({a},{b}) missing from {b}'s adjacency");
    }
}

// Builds an unweighted topology. Vertex 0 becomes the root, every other
// endpoint a leaf. Duplicate links and self loops are skipped.
impl<B:Borrow<(usize,usize)>> FromIterator<B> for MeshGraph {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size_estimation = match iter.size_hint() {
            (_,Some(n)) => {n},
            (n,None) => {n}
        };
        let mut new_graph = Self::with_capacity(size_estimation);
        for pair in iter {
            let (a,b) = *pair.borrow();
            for node in [a,b] {
                if new_graph.vertices.contains_key(&node) {continue}
                let kind = if node == ROOT {VertexKind::Root} else {VertexKind::Leaf};
                // cannot conflict, only id 0 is ever a root here
                let _ = new_graph.push_vertex(node,kind);
            }
            let _ = new_graph.push_edge(a,b,None);
        }
        new_graph.shrink_to_fit();
        new_graph
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::{GraphError, MeshGraph, VertexKind, ROOT};

    fn chain(len:usize) -> MeshGraph {
        let mut g = MeshGraph::new();
        g.push_vertex(ROOT,VertexKind::Root).unwrap();
        for i in 1..len {
            g.push_vertex(i,VertexKind::Leaf).unwrap();
            g.push_edge(i-1,i,Some(10.0)).unwrap();
        }
        g
    }

    #[test]
    fn test_duplicate_edge_either_orientation() {
        let mut g = chain(3);
        let err = g.push_edge(1,0,Some(5.0)).unwrap_err();
        assert_eq!(err,GraphError::DuplicateEdge{a:1,b:0,existing:0});
        assert_eq!(g.edges_len(),2);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut g = chain(2);
        assert!(matches!(g.push_vertex(5,VertexKind::Root),Err(GraphError::RootConflict{vertex:5,existing:0})));
        assert!(matches!(g.push_vertex(1,VertexKind::Leaf),Err(GraphError::DuplicateVertex{vertex:1})));
        assert!(matches!(g.push_edge(1,1,None),Err(GraphError::SelfLoop{vertex:1})));
        assert!(matches!(g.push_edge(0,9,None),Err(GraphError::UnknownVertex{vertex:9})));
        g.push_vertex(2,VertexKind::Relay).unwrap();
        assert!(matches!(g.push_edge(0,2,Some(-1.0)),Err(GraphError::InvalidWeight{..})));
        assert!(matches!(g.push_edge(0,2,Some(f64::NAN)),Err(GraphError::InvalidWeight{..})));
        assert!(matches!(g.set_demand(2,-3.0),Err(GraphError::InvalidDemand{..})));
    }

    #[test]
    fn test_rejects_unusable_throughput() {
        let mut g = chain(2);
        let edge = g.edge_mut(0).unwrap();
        assert!(matches!(edge.set_throughput(f64::NAN),Err(GraphError::InvalidThroughput{edge:0,..})));
        assert_eq!(edge.set_throughput(f64::INFINITY),Err(GraphError::InvalidThroughput{edge:0,throughput:f64::INFINITY}));
        assert_eq!(edge.set_throughput(-1.0),Err(GraphError::InvalidThroughput{edge:0,throughput:-1.0}));
        assert_eq!(edge.throughput(),None);
        assert!(matches!(edge.set_capacity(f64::NAN),Err(GraphError::InvalidCapacity{edge:0,..})));
        assert_eq!(edge.capacity(),None);

        edge.set_throughput(0.0).unwrap();
        edge.set_capacity(12.5).unwrap();
        assert_eq!(edge.throughput(),Some(0.0));
        assert_eq!(edge.capacity(),Some(12.5));
    }

    #[test]
    fn test_remove_edge_updates_adjacency() {
        let mut g = chain(3);
        let id = g.edge_between(2,1).unwrap();
        let removed = g.remove_edge(id).unwrap();
        assert_eq!(removed.endpoints(),(1,2));
        assert_eq!(g.edge_between(1,2),None);
        assert_eq!(g.degree(2),Some(0));
        assert!(!g.is_connected());
        assert!(matches!(g.remove_edge(id),Err(GraphError::UnknownEdge{..})));
        // ids are not reused
        g.push_edge(1,2,Some(3.0)).unwrap();
        assert_eq!(g.edge_between(1,2),Some(2));
    }

    #[test]
    fn test_components() {
        let edges:[(usize,usize);8] = [(0,1),(1,2),(2,0),(3,4),(5,6),(6,7),(7,5),(7,8)];
        let g:MeshGraph = edges.iter().collect();
        let components = g.connected_components();
        assert_eq!(components,vec![vec![5,6,7,8],vec![0,1,2],vec![3,4]]);
        assert_eq!(g.unconnected_vertices(),vec![0,1,2,3,4]);

        let largest = g.largest_component();
        assert_eq!(largest.vertex_ids(),vec![5,6,7,8]);
        assert_eq!(largest.edges_len(),4);
        assert!(largest.is_connected());
        assert_eq!(largest.root(),None);
    }

    #[test]
    fn test_dfs_visits_smaller_neighbour_first() {
        let edges:[(usize,usize);4] = [(0,2),(0,1),(1,3),(2,3)];
        let g:MeshGraph = edges.iter().collect();
        assert_eq!(g.dfs(0).unwrap(),vec![0,1,3,2]);
        assert_eq!(g.dfs(42),None);
    }

    #[test]
    fn test_random_undirected_edge_count() {
        let mut rng = rand::rng();
        let edge_len:usize = rng.random_range(100..1000);
        let mut unique:std::collections::HashSet<(usize,usize)> = std::collections::HashSet::new();
        let mut pairs:Vec<(usize,usize)> = vec![];
        for _ in 0..edge_len {
            let a = rng.random_range(0..300);
            let b = rng.random_range(0..300);
            pairs.push((a,b));
            if a != b {unique.insert((a.min(b),a.max(b)));}
        }
        let g:MeshGraph = pairs.iter().collect();
        assert_eq!(g.edges_len(),unique.len());
        let total:usize = g.vertex_ids().iter().map(|v| g.degree(*v).unwrap()).sum();
        assert_eq!(total,2*g.edges_len());
    }
}
