// A projectile + target evaluation and its list of reactions
use crate::config::{Config, Settings};
use crate::error::{ReactionError, Result};
use crate::particles::{MultiGroupSettings, Particles};
use crate::reaction::{ProtareContext, Reaction, ReactionBuilder, ReactionNode};
use crate::styles::Styles;
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

fn default_threshold_factor() -> f64 {
    1.0
}

/// Document form of a [`Protare`] (the `<reactionSuite>` node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtareNode {
    pub projectile: String,
    pub target: String,
    /// Converts a center-of-mass Q threshold to a lab frame threshold,
    /// usually `(m_projectile + m_target) / m_target`.
    #[serde(default = "default_threshold_factor")]
    pub threshold_factor: f64,
    #[serde(default)]
    pub styles: Styles,
    pub reactions: Vec<ReactionNode>,
}

/// A projectile/target pair with its processing styles and reactions.
#[derive(Debug, Clone)]
pub struct Protare {
    projectile: String,
    target: String,
    threshold_factor: f64,
    styles: Styles,
    reactions: Vec<Reaction>,
}

impl Protare {
    /// Build every reaction of `node`. Reaction labels must be unique.
    pub fn from_node(settings: &Settings, node: ProtareNode) -> Result<Self> {
        let context = ProtareContext {
            threshold_factor: node.threshold_factor,
            styles: &node.styles,
        };

        let mut labels = HashSet::new();
        let mut reactions = Vec::with_capacity(node.reactions.len());
        for reaction_node in node.reactions {
            if !labels.insert(reaction_node.label.clone()) {
                return Err(ReactionError::DuplicateReactionLabel(reaction_node.label));
            }
            reactions.push(Reaction::from_node(settings, reaction_node, &context)?);
        }

        debug!(
            projectile = %node.projectile,
            target = %node.target,
            reactions = reactions.len(),
            "loaded protare"
        );
        Ok(Protare {
            projectile: node.projectile,
            target: node.target,
            threshold_factor: node.threshold_factor,
            styles: node.styles,
            reactions,
        })
    }

    pub fn from_json_str(settings: &Settings, json: &str) -> Result<Self> {
        let node: ProtareNode = serde_json::from_str(json)?;
        Protare::from_node(settings, node)
    }

    /// Read a protare from a JSON file using the global default settings.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Config::global().settings();
        let text = std::fs::read_to_string(path.as_ref())?;
        Protare::from_json_str(&settings, &text)
    }

    pub fn to_node(&self) -> ProtareNode {
        ProtareNode {
            projectile: self.projectile.clone(),
            target: self.target.clone(),
            threshold_factor: self.threshold_factor,
            styles: self.styles.clone(),
            reactions: self.reactions.iter().map(Reaction::to_node).collect(),
        }
    }

    pub fn projectile(&self) -> &str {
        &self.projectile
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn threshold_factor(&self) -> f64 {
        self.threshold_factor
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn reaction(&self, label: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|reaction| reaction.label() == label)
    }

    /// First reaction with the given ENDF MT.
    pub fn reaction_by_mt(&self, endf_mt: i32) -> Option<&Reaction> {
        self.reactions
            .iter()
            .find(|reaction| reaction.endf_mt() == endf_mt)
    }

    pub fn has_fission(&self) -> bool {
        self.reactions.iter().any(Reaction::has_fission)
    }

    /// Replace a reaction's output channel during post-processing.
    pub fn replace_reaction<F>(&mut self, label: &str, fixup: F) -> Result<()>
    where
        F: FnOnce(&mut ReactionBuilder) -> Result<()>,
    {
        let index = self
            .reactions
            .iter()
            .position(|reaction| reaction.label() == label)
            .ok_or_else(|| ReactionError::LabelNotFound {
                moniker: "reactions".to_string(),
                label: label.to_string(),
            })?;
        let mut builder = self.reactions[index].clone().into_builder();
        fixup(&mut builder)?;
        self.reactions[index] = builder.build();
        Ok(())
    }

    /// Sum of the multi-group cross sections of all reactions.
    pub fn multi_group_cross_section(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for reaction in &self.reactions {
            vector.try_add(&reaction.multi_group_cross_section(settings, particles)?)?;
        }
        Ok(vector)
    }

    /// Gain of `product_id` summed over all reactions, the projectile being this protare's.
    pub fn multi_group_gain(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for reaction in &self.reactions {
            vector.try_add(&reaction.multi_group_gain(
                settings,
                particles,
                product_id,
                &self.projectile,
            )?)?;
        }
        Ok(vector)
    }

    pub fn multi_group_deposition_energy(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for reaction in &self.reactions {
            vector.try_add(&reaction.multi_group_deposition_energy(settings, particles)?)?;
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseMode;

    const DOC: &str = r#"{
        "projectile": "n",
        "target": "O16",
        "threshold_factor": 1.0625,
        "styles": [
            {"type": "evaluated", "label": "eval"},
            {"type": "griddedCrossSection", "label": "recon", "derived_from": "eval", "grid": [1e-5, 1.0, 4.0, 20.0]}
        ],
        "reactions": [
            {
                "label": "n + O16",
                "ENDF_MT": 2,
                "crossSection": [
                    {"type": "gridded1d", "label": "MultiGroup", "data": [3.0, 2.0]}
                ],
                "outputChannel": {"genre": "twoBody", "Q": [{"type": "constant1d", "label": "eval", "value": 0.0}]},
                "availableEnergy": [{"type": "gridded1d", "label": "MultiGroup", "data": [1.0, 1.0]}],
                "availableMomentum": [{"type": "gridded1d", "label": "MultiGroup", "data": [1.0, 1.0]}]
            },
            {
                "label": "n + He4 + C12",
                "ENDF_MT": 22,
                "crossSection": [
                    {"type": "Ys1d", "label": "recon", "start": 2, "ys": [0.0, 0.1]},
                    {"type": "gridded1d", "label": "MultiGroup", "data": [0.0, 0.5]}
                ],
                "outputChannel": {"genre": "NBody", "Q": [{"type": "constant1d", "label": "eval", "value": -2.0}]},
                "availableEnergy": [{"type": "gridded1d", "label": "MultiGroup", "data": [0.0, 2.0]}],
                "availableMomentum": [{"type": "gridded1d", "label": "MultiGroup", "data": [0.0, 1.0]}]
            }
        ]
    }"#;

    #[test]
    fn test_load_from_json() {
        let protare = Protare::from_json_str(&Settings::default(), DOC).unwrap();
        assert_eq!(protare.projectile(), "n");
        assert_eq!(protare.reactions().len(), 2);
        let alpha = protare.reaction_by_mt(22).unwrap();
        assert_eq!(alpha.energy_threshold(), 2.125);
        assert_eq!(alpha.cross_section_threshold(), 4.0);
        assert!(!protare.has_fission());

        let settings = MultiGroupSettings::new("MultiGroup");
        let total = protare
            .multi_group_cross_section(&settings, &Particles::new())
            .unwrap();
        assert_eq!(total.as_slice(), &[3.0, 2.5]);

        // no transportable particles: everything available is deposited
        let deposition = protare
            .multi_group_deposition_energy(&settings, &Particles::new())
            .unwrap();
        assert_eq!(deposition.as_slice(), &[1.0, 3.0]);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut node: ProtareNode = serde_json::from_str(DOC).unwrap();
        node.reactions[1].label = node.reactions[0].label.clone();
        assert!(matches!(
            Protare::from_node(&Settings::default(), node),
            Err(ReactionError::DuplicateReactionLabel(ref label)) if label == "n + O16"
        ));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        let ragged = DOC.replace(
            r#""outputChannel": {"genre": "twoBody","#,
            r#""outputChannel": {"genre": "twoBody", "products": [{"label": "n", "pid": "n",
                "product_matrices": [{"label": "MultiGroup", "legendre": [[[1.0, 0.0], [0.5]]]}]}],"#,
        );
        assert!(matches!(
            Protare::from_json_str(&Settings::default(), &ragged),
            Err(ReactionError::RaggedMatrix { row: 1, .. })
        ));

        let empty_q = DOC.replace(
            r#"{"type": "constant1d", "label": "eval", "value": -2.0}"#,
            r#"{"type": "XYs1d", "label": "eval", "x": [], "y": []}"#,
        );
        assert!(matches!(
            Protare::from_json_str(&Settings::default(), &empty_q),
            Err(ReactionError::EmptyForm { ref label }) if label == "eval"
        ));
    }

    #[test]
    fn test_mismatched_reactions_do_not_sum() {
        let uneven = DOC.replace(r#""data": [0.0, 0.5]"#, r#""data": [0.0, 0.5, 0.25]"#);
        let protare = Protare::from_json_str(&Settings::default(), &uneven).unwrap();
        let settings = MultiGroupSettings::new("MultiGroup");
        assert!(matches!(
            protare.multi_group_cross_section(&settings, &Particles::new()),
            Err(ReactionError::SizeMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_read_only_parse() {
        let protare =
            Protare::from_json_str(&Settings::new(ParseMode::ReadOnly), DOC).unwrap();
        assert_eq!(protare.reaction_by_mt(22).unwrap().energy_threshold(), 0.0);
    }

    #[test]
    fn test_node_round_trip() {
        let protare = Protare::from_json_str(&Settings::default(), DOC).unwrap();
        let json = serde_json::to_string(&protare.to_node()).unwrap();
        let again = Protare::from_json_str(&Settings::default(), &json).unwrap();
        assert_eq!(again.reactions(), protare.reactions());
    }
}
