use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::RenderConfig;
use crate::graph::BoxGraph;

/// Text shown inside a box. The layout engine never looks at it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxLabel {
    pub lines: Vec<String>,
}

impl BoxLabel {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFile {
    boxes: Vec<BoxEntry>,
    #[serde(default)]
    edges: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoxEntry {
    id: String,
    label: Option<String>,
    lines: Option<Vec<String>>,
    width: Option<f32>,
    height: Option<f32>,
}

/// Box size for `lines` in a monospace cell grid.
///
/// Widths are forced odd so the centered arrow anchor lands on a whole unit.
pub fn measure_lines(lines: &[String], config: &RenderConfig) -> (f32, f32) {
    let columns = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut width = (columns as f32 * config.char_width + config.text_padding).round();
    if (width as i64) % 2 == 0 {
        width += 1.0;
    }
    let height = lines.len() as f32 * config.line_height + config.text_padding;
    (width, height)
}

/// Builds a graph from a JSON5 description:
///
/// ```json5
/// {
///   boxes: [{ id: "entry", label: "push rbp" }, { id: "exit", lines: ["ret"] }],
///   edges: [["entry", "exit"]],
/// }
/// ```
pub fn parse_graph(source: &str, config: &RenderConfig) -> Result<BoxGraph<String, BoxLabel>> {
    let file: GraphFile = json5::from_str(source).context("invalid graph description")?;
    let mut graph = BoxGraph::new();
    for entry in file.boxes {
        let label = match (entry.lines, entry.label) {
            (Some(lines), _) => BoxLabel { lines },
            (None, Some(text)) => BoxLabel::new(&text),
            (None, None) => BoxLabel::new(&entry.id),
        };
        let (auto_w, auto_h) = measure_lines(&label.lines, config);
        let handle = graph.create_box(entry.id, label)?;
        if let Some(b) = graph.get_mut(handle) {
            b.set_size(entry.width.unwrap_or(auto_w), entry.height.unwrap_or(auto_h));
        }
    }
    for (src, dst) in &file.edges {
        graph
            .link_boxes(src, dst)
            .with_context(|| format!("edge {src} -> {dst}"))?;
    }
    Ok(graph)
}
