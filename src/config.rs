use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Chrome around every singleton group, so merged siblings stay apart.
    pub group_margin_left: f32,
    pub group_margin_top: f32,
    pub group_extra_width: f32,
    pub group_extra_height: f32,
    /// Height reserved per incident edge when a fan of siblings is laid out.
    pub fan_reserve: f32,
    /// Extra height given to the body of an if-then, split top/bottom.
    pub branch_pad: f32,
    /// Left edge of the if-then body relative to the origin.
    pub branch_indent: f32,
    pub split_extra_width: f32,
    pub split_offset: f32,
    /// Upper bound on rule passes; `None` derives it from the graph size.
    pub max_passes: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group_margin_left: 8.0,
            group_margin_top: 8.0,
            group_extra_width: 16.0,
            group_extra_height: 18.0,
            fan_reserve: 16.0,
            branch_pad: 16.0,
            branch_indent: 8.0,
            split_extra_width: 128.0,
            split_offset: 64.0,
            max_passes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Stub length at both ends and clearance kept around boxes.
    pub margin: f32,
    /// Horizontal gap between parallel arrows sharing an endpoint.
    pub fan_spacing: f32,
    /// Coordinates beyond this magnitude are scaled back in.
    pub coord_limit: f32,
    /// Offset of the doubled horizontal legs of detour routes.
    pub emphasis_offset: f32,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            margin: 8.0,
            fan_spacing: 4.0,
            coord_limit: 28672.0,
            emphasis_offset: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Monospace cell used to size boxes from their text lines.
    pub char_width: f32,
    pub line_height: f32,
    pub text_padding: f32,
    pub shadow_offset: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            char_width: 8.0,
            line_height: 16.0,
            text_padding: 2.0,
            shadow_offset: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub route: RouteConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    route: Option<RouteConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    box_fill: Option<String>,
    box_selected_fill: Option<String>,
    box_border: Option<String>,
    text_color: Option<String>,
    arrow_highlight: Option<String>,
    arrow_conditional: Option<String>,
    arrow_unconditional: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    group_margin_left: Option<f32>,
    group_margin_top: Option<f32>,
    group_extra_width: Option<f32>,
    group_extra_height: Option<f32>,
    fan_reserve: Option<f32>,
    branch_pad: Option<f32>,
    branch_indent: Option<f32>,
    split_extra_width: Option<f32>,
    split_offset: Option<f32>,
    max_passes: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteConfigFile {
    margin: Option<f32>,
    fan_spacing: Option<f32>,
    coord_limit: Option<f32>,
    emphasis_offset: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    char_width: Option<f32>,
    line_height: Option<f32>,
    text_padding: Option<f32>,
    shadow_offset: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme {other:?}"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.box_fill {
            theme.box_fill = v;
        }
        if let Some(v) = vars.box_selected_fill {
            theme.box_selected_fill = v;
        }
        if let Some(v) = vars.box_border {
            theme.box_border = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.arrow_highlight {
            theme.arrow_highlight = v;
        }
        if let Some(v) = vars.arrow_conditional {
            theme.arrow_conditional = v;
        }
        if let Some(v) = vars.arrow_unconditional {
            theme.arrow_unconditional = v;
        }
    }

    if let Some(file) = parsed.layout {
        let layout = &mut config.layout;
        if let Some(v) = file.group_margin_left {
            layout.group_margin_left = v;
        }
        if let Some(v) = file.group_margin_top {
            layout.group_margin_top = v;
        }
        if let Some(v) = file.group_extra_width {
            layout.group_extra_width = v;
        }
        if let Some(v) = file.group_extra_height {
            layout.group_extra_height = v;
        }
        if let Some(v) = file.fan_reserve {
            layout.fan_reserve = v;
        }
        if let Some(v) = file.branch_pad {
            layout.branch_pad = v;
        }
        if let Some(v) = file.branch_indent {
            layout.branch_indent = v;
        }
        if let Some(v) = file.split_extra_width {
            layout.split_extra_width = v;
        }
        if let Some(v) = file.split_offset {
            layout.split_offset = v;
        }
        if file.max_passes.is_some() {
            layout.max_passes = file.max_passes;
        }
    }

    if let Some(file) = parsed.route {
        let route = &mut config.route;
        if let Some(v) = file.margin {
            route.margin = v;
        }
        if let Some(v) = file.fan_spacing {
            route.fan_spacing = v;
        }
        if let Some(v) = file.coord_limit {
            route.coord_limit = v.abs().max(1.0);
        }
        if let Some(v) = file.emphasis_offset {
            route.emphasis_offset = v;
        }
    }

    if let Some(file) = parsed.render {
        let render = &mut config.render;
        if let Some(v) = file.width {
            render.width = v;
        }
        if let Some(v) = file.height {
            render.height = v;
        }
        if let Some(v) = file.char_width {
            render.char_width = v;
        }
        if let Some(v) = file.line_height {
            render.line_height = v;
        }
        if let Some(v) = file.text_padding {
            render.text_padding = v;
        }
        if let Some(v) = file.shadow_offset {
            render.shadow_offset = v;
        }
    }

    Ok(config)
}
