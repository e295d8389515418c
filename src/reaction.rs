use crate::classification::{classify, Classification};
use crate::config::Settings;
use crate::error::{ReactionError, Result};
use crate::function::Function1d;
use crate::output_channel::{OutputChannel, OutputChannelNode, ProductData, OUTPUT_CHANNEL_MONIKER};
use crate::particles::{MultiGroupSettings, Particles, ELECTRON_MASS_MEV, NEUTRON, PHOTON};
use crate::styles::Styles;
use crate::suite::{
    Ancestor, Suite, AVAILABLE_ENERGY_MONIKER, AVAILABLE_MOMENTUM_MONIKER, CROSS_SECTION_MONIKER,
    DOUBLE_DIFFERENTIAL_CROSS_SECTION_MONIKER,
};
use crate::threshold::{self, ThresholdInputs};
use crate::vector::{Matrix, Vector};
use crate::writer::WriteInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

pub const REACTION_MONIKER: &str = "reaction";

/// Labels containing this text are electromagnetic pair production.
const PAIR_PRODUCTION_TAG: &str = "pair production";

// MTs whose reactions are fission: total, first, second, third and fourth chance
const FISSION_MTS: [i32; 5] = [18, 19, 20, 21, 38];

// Continuous-energy product data for this MT are known to be converted
// incorrectly upstream; the reaction reports no product data.
const CONTINUOUS_ENERGY_SKIPPED_MT: i32 = 516;

/// Document form of a reaction. Field order is the order used on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionNode {
    pub label: String,
    #[serde(rename = "ENDF_MT")]
    pub endf_mt: i32,
    #[serde(rename = "fissionGenre", default, skip_serializing_if = "String::is_empty")]
    pub fission_genre: String,
    #[serde(rename = "doubleDifferentialCrossSection", default)]
    pub double_differential_cross_section: Vec<Function1d>,
    #[serde(rename = "crossSection", default)]
    pub cross_section: Vec<Function1d>,
    #[serde(rename = "outputChannel")]
    pub output_channel: OutputChannelNode,
    #[serde(rename = "availableEnergy", default)]
    pub available_energy: Vec<Function1d>,
    #[serde(rename = "availableMomentum", default)]
    pub available_momentum: Vec<Function1d>,
}

/// Protare-level data every reaction reads during construction.
#[derive(Debug, Clone, Copy)]
pub struct ProtareContext<'a> {
    /// Scales the Q-value threshold into the projectile's lab frame.
    pub threshold_factor: f64,
    pub styles: &'a Styles,
}

/// A node found by [`Reaction::find_in_ancestry`].
#[derive(Debug, Clone, Copy)]
pub enum AncestryItem<'a> {
    Suite(&'a Suite),
    OutputChannel(&'a OutputChannel),
}

/// One reaction of a protare: its cross section data, its products and the
/// multi-group quantities derived from them.
///
/// A `Reaction` is immutable once built; every query takes `&self`, so one
/// record can be shared between threads. The output channel is replaced
/// through [`ReactionBuilder`] only.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    label: String,
    endf_mt: i32,
    classification: Classification,
    fission_genre: String,
    is_pair_production: bool,
    energy_threshold: f64,
    cross_section_threshold: f64,
    double_differential_cross_section: Suite,
    cross_section: Suite,
    available_energy: Suite,
    available_momentum: Suite,
    output_channel: OutputChannel,
    output_channel_replaced: bool,
}

impl Reaction {
    /// Build a reaction from its document node.
    ///
    /// Thresholds are resolved unless `settings` asks for an outline or
    /// read-only parse, in which case both stay at 0.0.
    pub fn from_node(
        settings: &Settings,
        node: ReactionNode,
        context: &ProtareContext<'_>,
    ) -> Result<Self> {
        let mut reaction = Reaction::assemble(
            node.label,
            node.endf_mt,
            node.fission_genre,
            Suite::with_forms(
                DOUBLE_DIFFERENTIAL_CROSS_SECTION_MONIKER,
                node.double_differential_cross_section,
            ),
            Suite::with_forms(CROSS_SECTION_MONIKER, node.cross_section),
            Suite::with_forms(AVAILABLE_ENERGY_MONIKER, node.available_energy),
            Suite::with_forms(AVAILABLE_MOMENTUM_MONIKER, node.available_momentum),
            OutputChannel::from_node(node.output_channel)?,
        );

        if settings.parse_mode.requires_full_data() {
            let q_form = reaction.output_channel.q_form()?;
            let thresholds = threshold::resolve(&ThresholdInputs {
                parse_mode: settings.parse_mode,
                q_form,
                threshold_factor: context.threshold_factor,
                gridded_cross_section: context.styles.gridded_cross_section(),
                cross_section: &reaction.cross_section,
            })
            .map_err(|err| {
                warn!(label = %reaction.label, error = %err, "threshold resolution failed");
                err
            })?;
            reaction.energy_threshold = thresholds.energy;
            reaction.cross_section_threshold = thresholds.cross_section;
        }

        debug!(
            label = %reaction.label,
            endf_mt = reaction.endf_mt,
            endl_c = reaction.classification.category,
            endl_s = reaction.classification.sub_category,
            "constructed reaction"
        );
        Ok(reaction)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        label: String,
        endf_mt: i32,
        fission_genre: String,
        double_differential_cross_section: Suite,
        cross_section: Suite,
        available_energy: Suite,
        available_momentum: Suite,
        output_channel: OutputChannel,
    ) -> Self {
        let classification = classify(endf_mt);
        if !classification.ok {
            warn!(label = %label, endf_mt, "ENDF MT outside the ENDL mapping");
        }
        let is_pair_production = label.contains(PAIR_PRODUCTION_TAG);
        let mut reaction = Reaction {
            label,
            endf_mt,
            classification,
            fission_genre,
            is_pair_production,
            energy_threshold: 0.0,
            cross_section_threshold: 0.0,
            double_differential_cross_section,
            cross_section,
            available_energy,
            available_momentum,
            output_channel,
            output_channel_replaced: false,
        };
        let ancestor = reaction.as_ancestor();
        reaction
            .double_differential_cross_section
            .set_ancestor(ancestor.clone());
        reaction.cross_section.set_ancestor(ancestor.clone());
        reaction.available_energy.set_ancestor(ancestor.clone());
        reaction.available_momentum.set_ancestor(ancestor.clone());
        reaction.output_channel.set_ancestor(ancestor);
        reaction
    }

    fn as_ancestor(&self) -> Ancestor {
        Ancestor::new(REACTION_MONIKER, &self.label)
    }

    /// Open the record for post-processing (output channel replacement).
    pub fn into_builder(self) -> ReactionBuilder {
        ReactionBuilder { reaction: self }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn endf_mt(&self) -> i32 {
        self.endf_mt
    }

    pub fn endl_c(&self) -> i32 {
        self.classification.category
    }

    pub fn endl_s(&self) -> i32 {
        self.classification.sub_category
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn fission_genre(&self) -> &str {
        &self.fission_genre
    }

    pub fn is_pair_production(&self) -> bool {
        self.is_pair_production
    }

    pub fn energy_threshold(&self) -> f64 {
        self.energy_threshold
    }

    pub fn cross_section_threshold(&self) -> f64 {
        self.cross_section_threshold
    }

    pub fn double_differential_cross_section(&self) -> &Suite {
        &self.double_differential_cross_section
    }

    pub fn cross_section(&self) -> &Suite {
        &self.cross_section
    }

    pub fn available_energy(&self) -> &Suite {
        &self.available_energy
    }

    pub fn available_momentum(&self) -> &Suite {
        &self.available_momentum
    }

    pub fn output_channel(&self) -> &OutputChannel {
        &self.output_channel
    }

    /// True for total fission and its first through fourth chance parts.
    pub fn has_fission(&self) -> bool {
        FISSION_MTS.contains(&self.endf_mt)
    }

    /// Look up a child node by its moniker.
    pub fn find_in_ancestry(&self, moniker: &str) -> Option<AncestryItem<'_>> {
        match moniker {
            DOUBLE_DIFFERENTIAL_CROSS_SECTION_MONIKER => {
                Some(AncestryItem::Suite(&self.double_differential_cross_section))
            }
            CROSS_SECTION_MONIKER => Some(AncestryItem::Suite(&self.cross_section)),
            AVAILABLE_ENERGY_MONIKER => Some(AncestryItem::Suite(&self.available_energy)),
            AVAILABLE_MOMENTUM_MONIKER => Some(AncestryItem::Suite(&self.available_momentum)),
            OUTPUT_CHANNEL_MONIKER => Some(AncestryItem::OutputChannel(&self.output_channel)),
            _ => None,
        }
    }

    /// Unique ids of all products, optionally only those in `particles`.
    pub fn product_ids(&self, particles: &Particles, transportables_only: bool) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        self.output_channel
            .product_ids(&mut ids, particles, transportables_only);
        ids
    }

    /// Highest Legendre order of the product matrix for `product_id`, -1 if none.
    pub fn maximum_legendre_order(&self, settings: &MultiGroupSettings, product_id: &str) -> i32 {
        if self.is_pair_production && product_id == PHOTON {
            return 0;
        }
        self.output_channel
            .maximum_legendre_order(settings, product_id)
    }

    pub fn multi_group_cross_section(
        &self,
        settings: &MultiGroupSettings,
        _particles: &Particles,
    ) -> Result<Vector> {
        Ok(self.cross_section.gridded(&settings.label)?.clone())
    }

    /// Cross section weighted multiplicity of `product_id`.
    pub fn multi_group_multiplicity(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        if self.is_pair_production && product_id == PHOTON {
            return Ok(self.multi_group_cross_section(settings, particles)? * 2.0);
        }
        self.output_channel
            .multi_group_multiplicity(settings, particles, product_id)
    }

    /// Transfer matrix of `product_id` for Legendre order `order`.
    ///
    /// Pair production puts both annihilation photons of every incident
    /// group into the outgoing photon group holding the electron rest mass.
    pub fn multi_group_product_matrix(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
        order: usize,
    ) -> Result<Matrix> {
        if self.is_pair_production && product_id == PHOTON && order == 0 {
            let production = self.multi_group_cross_section(settings, particles)? * 2.0;
            let multi_group = particles.multi_group(PHOTON)?;
            let Some(column) = multi_group.multi_group_index_from_energy(ELECTRON_MASS_MEV, true)
            else {
                return Ok(Matrix::default());
            };
            let columns = multi_group.number_of_groups().max(column + 1);
            let mut matrix = Matrix::zeros(production.len(), columns);
            for (row, value) in production.iter().enumerate() {
                matrix.set(row, column, *value);
            }
            return Ok(matrix);
        }
        self.output_channel
            .multi_group_product_matrix(settings, particles, product_id, order)
    }

    /// Neutron transfer matrix of a fission reaction, 0x0 otherwise.
    pub fn multi_group_fission_matrix(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        order: usize,
    ) -> Result<Matrix> {
        if !self.has_fission() {
            return Ok(Matrix::default());
        }
        self.multi_group_product_matrix(settings, particles, NEUTRON, order)
    }

    pub fn multi_group_available_energy(
        &self,
        settings: &MultiGroupSettings,
        _particles: &Particles,
    ) -> Result<Vector> {
        Ok(self.available_energy.gridded(&settings.label)?.clone())
    }

    pub fn multi_group_available_momentum(
        &self,
        settings: &MultiGroupSettings,
        _particles: &Particles,
    ) -> Result<Vector> {
        Ok(self.available_momentum.gridded(&settings.label)?.clone())
    }

    /// Cross section weighted average energy carried away by `product_id`.
    pub fn multi_group_average_energy(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        if self.is_pair_production && product_id == PHOTON {
            return Ok(self.multi_group_cross_section(settings, particles)? * (2.0 * ELECTRON_MASS_MEV));
        }
        self.output_channel
            .multi_group_average_energy(settings, particles, product_id)
    }

    pub fn multi_group_average_momentum(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        self.output_channel
            .multi_group_average_momentum(settings, particles, product_id)
    }

    /// Available energy minus the average energy of every particle in
    /// `particles`. Energy of untracked products is deposited locally.
    pub fn multi_group_deposition_energy(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
    ) -> Result<Vector> {
        let mut vector = self.multi_group_available_energy(settings, particles)?;
        for product_id in particles.ids() {
            vector.try_sub(&self.multi_group_average_energy(settings, particles, product_id)?)?;
        }
        Ok(vector)
    }

    pub fn multi_group_deposition_momentum(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
    ) -> Result<Vector> {
        let mut vector = self.multi_group_available_momentum(settings, particles)?;
        for product_id in particles.ids() {
            vector.try_sub(&self.multi_group_average_momentum(settings, particles, product_id)?)?;
        }
        Ok(vector)
    }

    /// Net production of `product_id`; the projectile's own removal is
    /// subtracted when the product is the projectile.
    pub fn multi_group_gain(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
        projectile_id: &str,
    ) -> Result<Vector> {
        let mut vector = self.multi_group_multiplicity(settings, particles, product_id)?;
        if product_id == projectile_id {
            vector.try_sub(&self.multi_group_cross_section(settings, particles)?)?;
        }
        Ok(vector)
    }

    /// Average energy, momentum and gain of `product_id` at incident `energy`.
    pub fn continuous_energy_product_data(&self, product_id: &str, energy: f64) -> ProductData {
        if self.endf_mt == CONTINUOUS_ENERGY_SKIPPED_MT {
            trace!(label = %self.label, "skipping continuous energy product data");
            return ProductData::default();
        }
        self.output_channel
            .continuous_energy_product_data(product_id, energy)
    }

    /// Write this reaction as a `<reaction>` node.
    pub fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        let indent2 = write_info.incremental_indent(indent);
        let mut attributes = WriteInfo::add_attribute("label", &self.label);
        attributes += &WriteInfo::add_attribute("ENDF_MT", &self.endf_mt.to_string());
        if !self.fission_genre.is_empty() {
            attributes += &WriteInfo::add_attribute("fissionGenre", &self.fission_genre);
        }
        write_info.add_node_starter(indent, REACTION_MONIKER, &attributes);

        self.double_differential_cross_section
            .to_xml_list(write_info, &indent2);
        self.cross_section.to_xml_list(write_info, &indent2);
        self.output_channel.to_xml_list(write_info, &indent2);
        self.available_energy.to_xml_list(write_info, &indent2);
        self.available_momentum.to_xml_list(write_info, &indent2);

        write_info.add_node_ender(REACTION_MONIKER);
    }

    pub fn to_node(&self) -> ReactionNode {
        ReactionNode {
            label: self.label.clone(),
            endf_mt: self.endf_mt,
            fission_genre: self.fission_genre.clone(),
            double_differential_cross_section: self
                .double_differential_cross_section
                .forms()
                .to_vec(),
            cross_section: self.cross_section.forms().to_vec(),
            output_channel: self.output_channel.to_node(),
            available_energy: self.available_energy.forms().to_vec(),
            available_momentum: self.available_momentum.forms().to_vec(),
        }
    }
}

/// Mutable phase of a [`Reaction`].
///
/// Used to assemble a reaction in code and by post-processing passes that
/// swap a reaction's output channel. The output channel may be replaced at
/// most once over the life of a record.
#[derive(Debug, Clone)]
pub struct ReactionBuilder {
    reaction: Reaction,
}

impl ReactionBuilder {
    /// Start a reaction without thresholds; use [`Reaction::from_node`] to
    /// have them resolved.
    pub fn new(label: &str, endf_mt: i32, output_channel: OutputChannel) -> Self {
        ReactionBuilder {
            reaction: Reaction::assemble(
                label.to_string(),
                endf_mt,
                String::new(),
                Suite::new(DOUBLE_DIFFERENTIAL_CROSS_SECTION_MONIKER),
                Suite::new(CROSS_SECTION_MONIKER),
                Suite::new(AVAILABLE_ENERGY_MONIKER),
                Suite::new(AVAILABLE_MOMENTUM_MONIKER),
                output_channel,
            ),
        }
    }

    pub fn fission_genre(mut self, fission_genre: &str) -> Self {
        self.reaction.fission_genre = fission_genre.to_string();
        self
    }

    pub fn cross_section(mut self, form: Function1d) -> Self {
        self.reaction.cross_section.add(form);
        self
    }

    pub fn double_differential_cross_section(mut self, form: Function1d) -> Self {
        self.reaction.double_differential_cross_section.add(form);
        self
    }

    pub fn available_energy(mut self, form: Function1d) -> Self {
        self.reaction.available_energy.add(form);
        self
    }

    pub fn available_momentum(mut self, form: Function1d) -> Self {
        self.reaction.available_momentum.add(form);
        self
    }

    /// Swap in a new output channel, returning the old one.
    pub fn replace_output_channel(&mut self, output_channel: OutputChannel) -> Result<OutputChannel> {
        if self.reaction.output_channel_replaced {
            return Err(ReactionError::OutputChannelAlreadyReplaced(
                self.reaction.label.clone(),
            ));
        }
        let mut output_channel = output_channel;
        output_channel.set_ancestor(self.reaction.as_ancestor());
        let previous = std::mem::replace(&mut self.reaction.output_channel, output_channel);
        self.reaction.output_channel_replaced = true;
        debug!(label = %self.reaction.label, "replaced output channel");
        Ok(previous)
    }

    pub fn build(self) -> Reaction {
        self.reaction
    }
}
