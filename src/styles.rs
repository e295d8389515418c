use serde::{Deserialize, Serialize};

pub const GRIDDED_CROSS_SECTION_MONIKER: &str = "griddedCrossSection";

/// Style whose cross sections are all given on one common energy grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedCrossSection {
    pub label: String,
    #[serde(default)]
    pub derived_from: String,
    /// Common incident energy grid.
    pub grid: Vec<f64>,
}

/// A processing style of the document (`<styles>` node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Style {
    #[serde(rename = "evaluated")]
    Evaluated {
        label: String,
        #[serde(default)]
        library: String,
        #[serde(default)]
        version: String,
    },
    #[serde(rename = "crossSectionReconstructed")]
    CrossSectionReconstructed { label: String, derived_from: String },
    #[serde(rename = "griddedCrossSection")]
    GriddedCrossSection(GriddedCrossSection),
    #[serde(rename = "heated")]
    Heated {
        label: String,
        derived_from: String,
        temperature: f64,
    },
    #[serde(rename = "multiGroup")]
    MultiGroup { label: String, derived_from: String },
}

impl Style {
    pub fn label(&self) -> &str {
        match self {
            Style::Evaluated { label, .. }
            | Style::CrossSectionReconstructed { label, .. }
            | Style::Heated { label, .. }
            | Style::MultiGroup { label, .. } => label,
            Style::GriddedCrossSection(gridded) => &gridded.label,
        }
    }

    pub fn moniker(&self) -> &'static str {
        match self {
            Style::Evaluated { .. } => "evaluated",
            Style::CrossSectionReconstructed { .. } => "crossSectionReconstructed",
            Style::GriddedCrossSection(_) => GRIDDED_CROSS_SECTION_MONIKER,
            Style::Heated { .. } => "heated",
            Style::MultiGroup { .. } => "multiGroup",
        }
    }
}

/// Ordered list of processing styles shared by every reaction of a protare.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Styles {
    styles: Vec<Style>,
}

impl Styles {
    pub fn new(styles: Vec<Style>) -> Self {
        Styles { styles }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    pub fn get(&self, label: &str) -> Option<&Style> {
        self.styles.iter().find(|style| style.label() == label)
    }

    /// Every style with the given moniker, in document order.
    pub fn find_all_of_moniker(&self, moniker: &str) -> Vec<&Style> {
        self.styles
            .iter()
            .filter(|style| style.moniker() == moniker)
            .collect()
    }

    /// The first griddedCrossSection style, if any.
    pub fn gridded_cross_section(&self) -> Option<&GriddedCrossSection> {
        self.styles.iter().find_map(|style| match style {
            Style::GriddedCrossSection(gridded) => Some(gridded),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_and_find() {
        let json = r#"[
            {"type": "evaluated", "label": "eval", "library": "ENDF/B", "version": "8.0.1"},
            {"type": "crossSectionReconstructed", "label": "recon", "derived_from": "eval"},
            {"type": "griddedCrossSection", "label": "recon_grid", "derived_from": "recon", "grid": [1e-5, 1.0, 2.0]},
            {"type": "multiGroup", "label": "MultiGroup", "derived_from": "recon"}
        ]"#;
        let styles: Styles = serde_json::from_str(json).unwrap();
        assert_eq!(styles.iter().count(), 4);
        assert_eq!(styles.find_all_of_moniker("griddedCrossSection").len(), 1);
        assert!(styles.find_all_of_moniker("heated").is_empty());
        let gridded = styles.gridded_cross_section().unwrap();
        assert_eq!(gridded.label, "recon_grid");
        assert_eq!(gridded.grid, vec![1e-5, 1.0, 2.0]);
        assert_eq!(styles.get("MultiGroup").unwrap().moniker(), "multiGroup");
    }

    #[test]
    fn test_no_gridded_style() {
        let styles = Styles::new(vec![Style::Evaluated {
            label: "eval".to_string(),
            library: String::new(),
            version: String::new(),
        }]);
        assert!(styles.gridded_cross_section().is_none());
    }
}
