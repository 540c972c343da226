use crate::graph::BoxGraph;
use crate::layout::ArrangeReport;
use crate::routing::{EdgeRoute, RouteKind, Viewport};
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub viewport: Viewport,
    pub report: ArrangeReport,
    pub boxes: Vec<BoxDump>,
    pub routes: Vec<RouteDump>,
}

#[derive(Debug, Serialize)]
pub struct BoxDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub to: Vec<String>,
    pub from: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub from: String,
    pub to: String,
    pub kind: RouteKind,
    pub segments: Vec<[f32; 4]>,
}

impl LayoutDump {
    pub fn from_graph<K: Display, C>(
        graph: &BoxGraph<K, C>,
        routes: &[EdgeRoute],
        viewport: Viewport,
        report: ArrangeReport,
    ) -> Self {
        let name = |h| {
            graph
                .get(h)
                .map(|b| b.id().to_string())
                .unwrap_or_default()
        };
        let boxes = graph
            .boxes()
            .map(|(_, b)| BoxDump {
                id: b.id().to_string(),
                x: b.x(),
                y: b.y(),
                width: b.width(),
                height: b.height(),
                to: b.to().iter().map(|h| name(*h)).collect(),
                from: b.from().iter().map(|h| name(*h)).collect(),
            })
            .collect();
        let routes = routes
            .iter()
            .map(|edge| RouteDump {
                from: name(edge.from),
                to: name(edge.to),
                kind: edge.route.kind,
                segments: edge
                    .route
                    .segments
                    .iter()
                    .map(|s| [s.x1, s.y1, s.x2, s.y2])
                    .collect(),
            })
            .collect();
        let bounds = graph.bounds().unwrap_or_default();

        LayoutDump {
            width: bounds.width,
            height: bounds.height,
            viewport,
            report,
            boxes,
            routes,
        }
    }
}

/// Pretty JSON to `path`, or stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::routing::route_graph;

    #[test]
    fn dump_names_neighbors_by_id() {
        let mut graph: BoxGraph<String, ()> = BoxGraph::new();
        for id in ["head", "body", "exit"] {
            let h = graph.create_box(id.to_string(), ()).unwrap();
            graph.get_mut(h).unwrap().set_size(50.0, 20.0);
        }
        graph.link_boxes(&"head".into(), &"body".into()).unwrap();
        graph.link_boxes(&"body".into(), &"exit".into()).unwrap();
        let report = graph.arrange();
        let viewport = Viewport::fit(graph.bounds(), 640.0, 480.0);
        let routes = route_graph(&graph, &viewport, &RouteConfig::default());
        let dump = LayoutDump::from_graph(&graph, &routes, viewport, report);

        assert_eq!(dump.boxes.len(), 3);
        assert_eq!(dump.boxes[1].from, vec!["head"]);
        assert_eq!(dump.boxes[1].to, vec!["exit"]);
        assert_eq!(dump.routes.len(), 2);
        assert_eq!(dump.routes[0].from, "head");
        assert_eq!(dump.routes[0].kind, RouteKind::Direct);

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["routes"][1]["to"], "exit");
        assert_eq!(json["report"]["hits"]["Column"], 1);
    }
}
