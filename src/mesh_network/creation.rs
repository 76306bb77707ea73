// Builds a MeshGraph from line-of-sight link records as a site survey
// delivers them: one record per link and direction, endpoints typed.

use serde::{Deserialize, Serialize};

use crate::dsa::graph::{GraphError, MeshGraph, VertexKind};

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct LinkRecord {
    pub a:usize,
    pub a_kind:VertexKind,
    pub b:usize,
    pub b_kind:VertexKind,
    // metres
    pub distance:f64,
}

impl LinkRecord {
    pub fn new(a:(usize,VertexKind),b:(usize,VertexKind),distance:f64) -> Self {
        Self {a:a.0,a_kind:a.1,b:b.0,b_kind:b.1,distance}
    }
}

fn ensure_vertex(graph:&mut MeshGraph,id:usize,kind:VertexKind) -> Result<(),GraphError> {
    match graph.vertex(id) {
        Some(v) if v.kind() == kind => Ok(()),
        Some(v) => Err(GraphError::KindConflict{vertex:id,kind,existing:v.kind()}),
        None => graph.push_vertex(id,kind),
    }
}

// Vertices are created on first sight. A link seen again, in either
// direction, is skipped and the first record's distance is kept.
pub fn graph_from_links<I>(records:I) -> Result<MeshGraph,GraphError>
    where I:IntoIterator<Item = LinkRecord>
{
    let records = records.into_iter();
    let mut graph = MeshGraph::with_capacity(records.size_hint().0);
    for record in records {
        ensure_vertex(&mut graph,record.a,record.a_kind)?;
        ensure_vertex(&mut graph,record.b,record.b_kind)?;
        match graph.push_edge(record.a,record.b,Some(record.distance)) {
            Ok(_) | Err(GraphError::DuplicateEdge{..}) => {}
            Err(e) => return Err(e),
        }
    }
    graph.shrink_to_fit();
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::{LinkRecord, graph_from_links};
    use crate::dsa::graph::{GraphError, VertexKind};

    const POP:VertexKind = VertexKind::Root;
    const CPE:VertexKind = VertexKind::Leaf;

    #[test]
    fn test_symmetric_records_collapse() {
        let records = vec![
            LinkRecord::new((0,POP),(1,CPE),120.0),
            LinkRecord::new((1,CPE),(0,POP),120.0),
            LinkRecord::new((1,CPE),(2,CPE),80.0),
            LinkRecord::new((2,CPE),(1,CPE),95.0),
            LinkRecord::new((2,CPE),(0,POP),300.0),
        ];
        let g = graph_from_links(records).unwrap();
        assert_eq!(g.nodes_len(),3);
        assert_eq!(g.edges_len(),3);
        assert_eq!(g.root(),Some(0));
        assert_eq!(g.vertex(2).unwrap().kind(),CPE);
        // first record wins
        let e12 = g.edge_between(2,1).unwrap();
        assert_eq!(g.edge(e12).unwrap().weight(),Some(80.0));
        assert_eq!(g.edge(e12).unwrap().throughput(),None);
    }

    #[test]
    fn test_inconsistent_records() {
        let records = vec![
            LinkRecord::new((0,POP),(1,CPE),10.0),
            LinkRecord::new((1,VertexKind::Relay),(2,CPE),10.0),
        ];
        assert_eq!(graph_from_links(records).unwrap_err(),
            GraphError::KindConflict{vertex:1,kind:VertexKind::Relay,existing:CPE});

        let records = vec![
            LinkRecord::new((0,POP),(1,CPE),10.0),
            LinkRecord::new((2,POP),(1,CPE),10.0),
        ];
        assert_eq!(graph_from_links(records).unwrap_err(),GraphError::RootConflict{vertex:2,existing:0});

        let records = vec![LinkRecord::new((0,POP),(1,CPE),-4.0)];
        assert!(matches!(graph_from_links(records),Err(GraphError::InvalidWeight{..})));

        let records = vec![LinkRecord::new((1,CPE),(1,CPE),4.0)];
        assert_eq!(graph_from_links(records).unwrap_err(),GraphError::SelfLoop{vertex:1});
    }

    #[test]
    fn test_survey_device_names() {
        let json = r#"[
            {"a":0,"a_kind":"PoP","b":3,"b_kind":"CPE","distance":42.5},
            {"a":3,"a_kind":"leaf","b":7,"b_kind":"EDGE","distance":17.0}
        ]"#;
        let records:Vec<LinkRecord> = serde_json::from_str(json).unwrap();
        let g = graph_from_links(records).unwrap();
        assert_eq!(g.vertex_ids(),vec![0,3,7]);
        assert_eq!(g.vertex(7).unwrap().kind(),VertexKind::Relay);
        assert!(g.is_connected());
    }
}
