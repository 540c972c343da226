use crate::config::RenderConfig;
use crate::graph::{BoxGraph, BoxHandle};
use crate::input::BoxLabel;
use crate::routing::{EdgeRoute, RouteKind, Viewport};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// How an arrow is painted. Picked by the renderer, never by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowRole {
    /// Touches the selected box.
    Highlighted,
    /// The source has a single successor.
    Unconditional,
    /// One of several ways out of the source.
    Conditional,
}

pub fn arrow_role<K, C>(
    graph: &BoxGraph<K, C>,
    edge: &EdgeRoute,
    selected: Option<BoxHandle>,
) -> ArrowRole {
    if selected.is_some_and(|s| s == edge.from || s == edge.to) {
        return ArrowRole::Highlighted;
    }
    match graph.get(edge.from).map(|b| b.to().len()) {
        Some(1) => ArrowRole::Unconditional,
        _ => ArrowRole::Conditional,
    }
}

fn arrow_color(role: ArrowRole, theme: &Theme) -> &str {
    match role {
        ArrowRole::Highlighted => &theme.arrow_highlight,
        ArrowRole::Unconditional => &theme.arrow_unconditional,
        ArrowRole::Conditional => &theme.arrow_conditional,
    }
}

/// Paints boxes and routes as seen through `viewport`.
///
/// Arrows go first so boxes stay on top of them.
pub fn render_svg<K>(
    graph: &BoxGraph<K, BoxLabel>,
    routes: &[EdgeRoute],
    viewport: &Viewport,
    theme: &Theme,
    config: &RenderConfig,
    selected: Option<BoxHandle>,
) -> String {
    let width = viewport.width.max(1.0);
    let height = viewport.height.max(1.0);
    let zoom = viewport.zoom;
    let mut svg = String::new();

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );

    for edge in routes {
        if edge.route.kind == RouteKind::Culled {
            continue;
        }
        let color = arrow_color(arrow_role(graph, edge, selected), theme);
        let _ = write!(svg, "<g stroke=\"{color}\" stroke-width=\"1\" fill=\"none\">");
        for s in &edge.route.segments {
            let _ = write!(
                svg,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
                s.x1, s.y1, s.x2, s.y2
            );
        }
        svg.push_str("</g>");
    }

    let shadow = config.shadow_offset * zoom;
    let font_size = theme.font_size * zoom;
    let line_height = config.line_height * zoom;
    for (handle, b) in graph.boxes() {
        let r = viewport.project(b.rect());
        if r.x >= width || r.y >= height || r.right() <= 0.0 || r.bottom() <= 0.0 {
            continue;
        }
        let fill = if selected == Some(handle) {
            &theme.box_selected_fill
        } else {
            &theme.box_fill
        };
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            r.x + shadow,
            r.y + shadow,
            r.width,
            r.height,
            theme.box_border
        );
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            r.x, r.y, r.width, r.height, fill, theme.box_border
        );
        if b.content().lines.is_empty() {
            continue;
        }
        let text_x = r.x + config.text_padding / 2.0 * zoom;
        let text_y = r.y + config.text_padding / 2.0 * zoom;
        let _ = write!(
            svg,
            "<text x=\"{text_x:.2}\" y=\"{text_y:.2}\" font-family=\"{}\" font-size=\"{font_size:.2}\" fill=\"{}\" xml:space=\"preserve\">",
            escape_xml(&theme.font_family),
            theme.text_color
        );
        for (idx, line) in b.content().lines.iter().enumerate() {
            let dy = if idx == 0 { line_height * 0.8 } else { line_height };
            let _ = write!(
                svg,
                "<tspan x=\"{text_x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
                escape_xml(line)
            );
        }
        svg.push_str("</text>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|f| f.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "monospace".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
