use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub box_fill: String,
    pub box_selected_fill: String,
    pub box_border: String,
    pub text_color: String,
    /// Arrows touching the selected box.
    pub arrow_highlight: String,
    /// Arrows leaving a box with several successors.
    pub arrow_conditional: String,
    /// Arrows leaving a box with a single successor.
    pub arrow_unconditional: String,
}

impl Theme {
    /// Pale blue canvas, white boxes, green/blue arrows.
    pub fn classic() -> Self {
        Self {
            font_family: "courier, monospace".to_string(),
            font_size: 13.0,
            background: "#CCCCFF".to_string(),
            box_fill: "#FFFFFF".to_string(),
            box_selected_fill: "#DDDDDD".to_string(),
            box_border: "#000000".to_string(),
            text_color: "#000000".to_string(),
            arrow_highlight: "#FF0000".to_string(),
            arrow_conditional: "#008800".to_string(),
            arrow_unconditional: "#000088".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "JetBrains Mono, Menlo, Consolas, monospace".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            box_fill: "#F8FAFF".to_string(),
            box_selected_fill: "#E3EAF7".to_string(),
            box_border: "#7A8AA6".to_string(),
            text_color: "#1C2430".to_string(),
            arrow_highlight: "#E5484D".to_string(),
            arrow_conditional: "#30A46C".to_string(),
            arrow_unconditional: "#3E63DD".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
