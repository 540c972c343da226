#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod routing;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, RouteConfig};
pub use error::GraphError;
pub use geometry::Rect;
pub use graph::{BoxGraph, BoxHandle, GraphBox};
pub use input::{BoxLabel, parse_graph};
pub use layout::{ArrangeReport, RuleKind};
pub use routing::{RouteKind, RouteResult, Segment, Slot, Viewport, compute_route, route_graph};
pub use theme::Theme;
