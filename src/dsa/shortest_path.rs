// Shortest path queries over MeshGraph.
// weighted: dijkstra from one source with path counts, hop count: bfs with path counting,
// plus the single hop-shortest path used by the planner

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

use crate::dsa::bitset::BitSet;
use crate::dsa::graph::{Edge, EdgeId, MeshGraph};

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;

// Maps vertex ids onto 0..n, ascending by id.
#[derive(Clone,Debug)]
pub struct DenseIndex {
    ids:Vec<usize>,
    position:HashMap<usize,usize>,
}

impl From<&MeshGraph> for DenseIndex {
    fn from(value: &MeshGraph) -> Self {
        let ids = value.vertex_ids();
        let mut position = HashMap::with_capacity_and_hasher(ids.len(),nohash::BuildNoHashHasher::default());
        for (index,id) in ids.iter().enumerate() {
            position.insert(*id,index);
        }
        Self {ids,position}
    }
}

impl DenseIndex {
    pub fn len(&self) -> usize {
        self.ids.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }
    pub fn id_of(&self,index:usize) -> Option<usize> {
        self.ids.get(index).copied()
    }
    pub fn index_of(&self,id:usize) -> Option<usize> {
        self.position.get(&id).copied()
    }
}

// min-heap entry, smallest distance pops first
struct Tentative {
    dist:f64,
    index:usize,
}

impl Ord for Tentative {
    fn cmp(&self, other: &Self) -> Ordering {
        other.dist.total_cmp(&self.dist).then_with(|| other.index.cmp(&self.index))
    }
}
impl PartialOrd for Tentative {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Tentative {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Tentative {}

// weighted shortest path dag of one source, all vectors indexed like index.
// sigma counts the shortest paths reaching a vertex, preds holds every
// (predecessor, edge) on one of them and order is the settle order.
// unreachable vertices stay at f64::INFINITY with sigma 0
#[derive(Clone,Debug)]
pub struct ShortestPathTree {
    pub source:usize,
    pub dist:Vec<f64>,
    pub sigma:Vec<f64>,
    pub preds:Vec<Vec<(usize,EdgeId)>>,
    pub order:Vec<usize>,
}

// relative tolerance under which two path lengths count as equal
const TIE:f64 = 1e-10;

fn same_length(a:f64,b:f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= TIE*a.abs().max(b.abs()).max(1.0)
}

impl ShortestPathTree {
    // brandes dependency accumulation. adds the share of this source's
    // shortest paths running through every other vertex and every edge;
    // summing over all sources counts each unordered pair twice
    pub fn accumulate(&self,vertex:&mut [f64],edge:&mut BTreeMap<EdgeId,f64>) {
        let mut delta = vec![0.0;self.dist.len()];
        for w in self.order.iter().rev() {
            for (v,edge_id) in self.preds[*w].iter() {
                let share = self.sigma[*v]/self.sigma[*w]*(1.0 + delta[*w]);
                *edge.entry(*edge_id).or_insert(0.0) += share;
                delta[*v] += share;
            }
            if *w != self.source {
                vertex[*w] += delta[*w];
            }
        }
    }
}

// weight must return a finite value >= 0
pub fn shortest_path_tree<W>(graph:&MeshGraph,index:&DenseIndex,source:usize,weight:W) -> ShortestPathTree
    where W:Fn(&Edge) -> f64
{
    let n = index.len();
    let mut tree = ShortestPathTree {
        source:index.index_of(source).unwrap_or(n),
        dist:vec![f64::INFINITY;n],
        sigma:vec![0.0;n],
        preds:vec![vec![];n],
        order:Vec::with_capacity(n),
    };
    let start = tree.source;
    if start >= n {
        return tree;
    }
    let mut settled = BitSet::with_len(n);
    let mut heap = BinaryHeap::with_capacity(n);

    tree.dist[start] = 0.0;
    tree.sigma[start] = 1.0;
    heap.push(Tentative {dist:0.0,index:start});

    while let Some(Tentative {index:current,..}) = heap.pop() {
        if !settled.insert(current) {
            continue;
        }
        tree.order.push(current);
        let d = tree.dist[current];
        let paths = tree.sigma[current];
        let Some(id) = index.id_of(current) else {continue};
        let Some(neighbours) = graph.neighbours(id) else {continue};
        for (next,edge_id) in neighbours {
            let Some(next_index) = index.index_of(next) else {continue};
            if settled.contains(next_index) {continue}
            let Some(edge) = graph.edge(edge_id) else {continue};
            let candidate = d + weight(edge);
            if same_length(candidate,tree.dist[next_index]) {
                tree.sigma[next_index] += paths;
                tree.preds[next_index].push((current,edge_id));
            } else if candidate < tree.dist[next_index] {
                tree.dist[next_index] = candidate;
                tree.sigma[next_index] = paths;
                tree.preds[next_index].clear();
                tree.preds[next_index].push((current,edge_id));
                heap.push(Tentative {dist:candidate,index:next_index});
            }
        }
    }
    debug_assert_eq!(tree.order.len(),settled.count_ones());
    tree
}

// Hop distances from one source together with the number of distinct
// hop-shortest paths reaching each vertex (saturating).
#[derive(Clone,Debug)]
pub struct HopLayers {
    pub dist:Vec<Option<usize>>,
    pub count:Vec<u64>,
}

pub fn bfs_hops(graph:&MeshGraph,index:&DenseIndex,source:usize) -> HopLayers {
    let mut dist = vec![None;index.len()];
    let mut count = vec![0u64;index.len()];
    let Some(start) = index.index_of(source) else {return HopLayers {dist,count}};

    let mut queue = VecDeque::with_capacity(index.len());
    dist[start] = Some(0);
    count[start] = 1;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let Some(d) = dist[current] else {continue};
        let Some(id) = index.id_of(current) else {continue};
        let Some(neighbours) = graph.neighbours(id) else {continue};
        for (next,_) in neighbours {
            let Some(next_index) = index.index_of(next) else {continue};
            match dist[next_index] {
                None => {
                    dist[next_index] = Some(d + 1);
                    count[next_index] = count[current];
                    queue.push_back(next_index);
                }
                Some(nd) if nd == d + 1 => {
                    count[next_index] = count[next_index].saturating_add(count[current]);
                }
                Some(_) => {}
            }
        }
    }
    HopLayers {dist,count}
}

// One path, vertices[0] is the start and edges[i] joins
// vertices[i] and vertices[i+1].
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct HopPath {
    pub vertices:Vec<usize>,
    pub edges:Vec<EdgeId>,
}

impl HopPath {
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

// hop-shortest path between two vertices. among equally short paths the
// lexicographically smallest vertex sequence wins: each step goes to the
// smallest-id neighbour one hop closer to the target
pub fn shortest_hop_path(graph:&MeshGraph,from:usize,to:usize) -> Option<HopPath> {
    graph.vertex(from)?;
    graph.vertex(to)?;
    if from == to {
        return Some(HopPath {vertices:vec![from],edges:vec![]});
    }

    // bfs from the target, stops as soon as `from` is discovered;
    // every vertex closer to the target is final by then
    let mut dist:HashMap<usize,usize> = HashMap::with_capacity_and_hasher(
        graph.nodes_len(),nohash::BuildNoHashHasher::default());
    let mut queue = VecDeque::new();
    dist.insert(to,0);
    queue.push_back(to);
    'search: while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        for (next,_) in graph.neighbours(current)? {
            if dist.contains_key(&next) {continue}
            dist.insert(next,d + 1);
            if next == from {break 'search}
            queue.push_back(next);
        }
    }

    let mut remaining = *dist.get(&from)?;
    let mut vertices = Vec::with_capacity(remaining + 1);
    let mut edges = Vec::with_capacity(remaining);
    let mut current = from;
    vertices.push(current);
    while remaining > 0 {
        let (next,edge) = graph.neighbours(current)?.into_iter()
            .find(|(n,_)| dist.get(n) == Some(&(remaining - 1)))?;
        vertices.push(next);
        edges.push(edge);
        current = next;
        remaining -= 1;
    }
    debug_assert_eq!(current,to);
    Some(HopPath {vertices,edges})
}
