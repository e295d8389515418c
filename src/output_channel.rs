use crate::error::{ReactionError, Result};
use crate::function::Function1d;
use crate::particles::{MultiGroupSettings, Particles};
use crate::suite::{
    Ancestor, Suite, AVERAGE_PRODUCT_ENERGY_MONIKER, AVERAGE_PRODUCT_MOMENTUM_MONIKER,
    MULTIPLICITY_MONIKER, Q_MONIKER,
};
use crate::vector::{Matrix, Vector};
use crate::writer::WriteInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

pub const OUTPUT_CHANNEL_MONIKER: &str = "outputChannel";
pub const PRODUCT_MONIKER: &str = "product";
pub const PRODUCT_MATRICES_MONIKER: &str = "productMatrices";

/// Kind of output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChannelKind {
    /// Two products, kinematics fixed by the Q-value.
    #[default]
    #[serde(rename = "twoBody")]
    TwoBody,
    /// Several products sharing the available energy.
    #[serde(rename = "NBody")]
    NBody,
    /// Fission: prompt products plus delayed neutron groups.
    #[serde(rename = "fission")]
    Fission,
}

impl EmissionMode {
    pub fn keyword(self) -> &'static str {
        match self {
            EmissionMode::Prompt => "prompt",
            EmissionMode::Delayed => "delayed",
            EmissionMode::Total => "total",
        }
    }
}

impl ChannelKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ChannelKind::TwoBody => "twoBody",
            ChannelKind::NBody => "NBody",
            ChannelKind::Fission => "fission",
        }
    }
}

/// Emission mode of a product (prompt, delayed, total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    #[default]
    Prompt,
    Delayed,
    Total,
}

/// Multi-group transfer matrices of one product for one style, one matrix
/// per Legendre order starting at order 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatrixNode {
    pub label: String,
    pub legendre: Vec<Vec<Vec<f64>>>,
}

/// Document form of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductNode {
    pub label: String,
    pub pid: String,
    #[serde(default)]
    pub emission_mode: EmissionMode,
    /// Decay rate of a delayed neutron precursor group in 1/s.
    #[serde(default)]
    pub decay_rate: f64,
    #[serde(default)]
    pub multiplicity: Vec<Function1d>,
    #[serde(default)]
    pub average_product_energy: Vec<Function1d>,
    #[serde(default)]
    pub average_product_momentum: Vec<Function1d>,
    #[serde(default)]
    pub product_matrices: Vec<ProductMatrixNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_channel: Option<Box<OutputChannelNode>>,
}

/// Document form of an [`OutputChannel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputChannelNode {
    #[serde(default)]
    pub genre: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(rename = "Q")]
    pub q: Vec<Function1d>,
    #[serde(default)]
    pub products: Vec<ProductNode>,
}

/// Average product data at one continuous incident energy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProductData {
    pub energy: f64,
    pub momentum: f64,
    pub gain: f64,
}

impl std::ops::AddAssign for ProductData {
    fn add_assign(&mut self, rhs: ProductData) {
        self.energy += rhs.energy;
        self.momentum += rhs.momentum;
        self.gain += rhs.gain;
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TransferMatrices {
    label: String,
    orders: Vec<Matrix>,
}

impl TransferMatrices {
    fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        let indent2 = write_info.incremental_indent(indent);
        let indent3 = write_info.incremental_indent(&indent2);
        let attributes = WriteInfo::add_attribute("label", &self.label);
        write_info.add_node_starter(indent, "gridded3d", &attributes);
        for (order, matrix) in self.orders.iter().enumerate() {
            let mut attributes = WriteInfo::add_attribute("order", &order.to_string());
            attributes += &WriteInfo::add_attribute("rows", &matrix.rows().to_string());
            attributes += &WriteInfo::add_attribute("columns", &matrix.columns().to_string());
            write_info.add_node_starter(&indent2, "matrix", &attributes);
            for row in 0..matrix.rows() {
                write_info.add_values(&indent3, matrix.row(row));
            }
            write_info.add_node_ender("matrix");
        }
        write_info.add_node_ender("gridded3d");
    }
}

/// A reaction product, optionally decaying through its own output channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    label: String,
    pid: String,
    emission_mode: EmissionMode,
    decay_rate: f64,
    multiplicity: Suite,
    average_energy: Suite,
    average_momentum: Suite,
    transfer_matrices: Vec<TransferMatrices>,
    output_channel: Option<Box<OutputChannel>>,
}

impl Product {
    /// Build a product and its decay channel. Ragged transfer matrices are
    /// rejected.
    pub fn from_node(node: ProductNode) -> Result<Self> {
        let mut transfer_matrices = Vec::with_capacity(node.product_matrices.len());
        for matrices in node.product_matrices {
            let orders = matrices
                .legendre
                .iter()
                .map(|rows| Matrix::from_rows(rows))
                .collect::<Result<Vec<_>>>()
                .map_err(|err| {
                    warn!(
                        product = %node.label,
                        style = %matrices.label,
                        error = %err,
                        "bad product matrix"
                    );
                    err
                })?;
            transfer_matrices.push(TransferMatrices {
                label: matrices.label,
                orders,
            });
        }
        let output_channel = match node.output_channel {
            Some(channel) => Some(Box::new(OutputChannel::from_node(*channel)?)),
            None => None,
        };
        let mut product = Product {
            label: node.label,
            pid: node.pid,
            emission_mode: node.emission_mode,
            decay_rate: node.decay_rate,
            multiplicity: Suite::with_forms(MULTIPLICITY_MONIKER, node.multiplicity),
            average_energy: Suite::with_forms(
                AVERAGE_PRODUCT_ENERGY_MONIKER,
                node.average_product_energy,
            ),
            average_momentum: Suite::with_forms(
                AVERAGE_PRODUCT_MOMENTUM_MONIKER,
                node.average_product_momentum,
            ),
            transfer_matrices,
            output_channel,
        };
        product.set_parent(&Ancestor::new(OUTPUT_CHANNEL_MONIKER, ""));
        Ok(product)
    }

    /// Re-point the product's suites and decay channel below `parent`.
    fn set_parent(&mut self, parent: &Ancestor) {
        let ancestor = parent.child(PRODUCT_MONIKER, &self.label);
        self.multiplicity.set_ancestor(ancestor.clone());
        self.average_energy.set_ancestor(ancestor.clone());
        self.average_momentum.set_ancestor(ancestor.clone());
        if let Some(channel) = self.output_channel.as_mut() {
            channel.set_ancestor(ancestor);
        }
    }

    pub fn to_node(&self) -> ProductNode {
        ProductNode {
            label: self.label.clone(),
            pid: self.pid.clone(),
            emission_mode: self.emission_mode,
            decay_rate: self.decay_rate,
            multiplicity: self.multiplicity.forms().to_vec(),
            average_product_energy: self.average_energy.forms().to_vec(),
            average_product_momentum: self.average_momentum.forms().to_vec(),
            product_matrices: self
                .transfer_matrices
                .iter()
                .map(|matrices| ProductMatrixNode {
                    label: matrices.label.clone(),
                    legendre: matrices.orders.iter().map(Matrix::to_rows).collect(),
                })
                .collect(),
            output_channel: self
                .output_channel
                .as_ref()
                .map(|channel| Box::new(channel.to_node())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn emission_mode(&self) -> EmissionMode {
        self.emission_mode
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    pub fn multiplicity(&self) -> &Suite {
        &self.multiplicity
    }

    pub fn output_channel(&self) -> Option<&OutputChannel> {
        self.output_channel.as_deref()
    }

    fn orders(&self, label: &str) -> Option<&[Matrix]> {
        self.transfer_matrices
            .iter()
            .find(|matrices| matrices.label == label)
            .map(|matrices| matrices.orders.as_slice())
    }

    fn continuous_energy_data(&self, energy: f64) -> ProductData {
        let at = |suite: &Suite| {
            suite
                .first()
                .ok()
                .and_then(|form| form.evaluate(energy))
                .unwrap_or(0.0)
        };
        ProductData {
            energy: at(&self.average_energy),
            momentum: at(&self.average_momentum),
            gain: at(&self.multiplicity),
        }
    }

    fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        let indent2 = write_info.incremental_indent(indent);
        let mut attributes = WriteInfo::add_attribute("label", &self.label);
        attributes += &WriteInfo::add_attribute("pid", &self.pid);
        if self.emission_mode != EmissionMode::Prompt {
            attributes += &WriteInfo::add_attribute("emissionMode", self.emission_mode.keyword());
        }
        if self.decay_rate != 0.0 {
            attributes += &WriteInfo::add_attribute("decayRate", &self.decay_rate.to_string());
        }
        write_info.add_node_starter(indent, PRODUCT_MONIKER, &attributes);
        self.multiplicity.to_xml_list(write_info, &indent2);
        self.average_energy.to_xml_list(write_info, &indent2);
        self.average_momentum.to_xml_list(write_info, &indent2);
        if !self.transfer_matrices.is_empty() {
            let indent3 = write_info.incremental_indent(&indent2);
            write_info.add_node_starter(&indent2, PRODUCT_MATRICES_MONIKER, "");
            for matrices in &self.transfer_matrices {
                matrices.to_xml_list(write_info, &indent3);
            }
            write_info.add_node_ender(PRODUCT_MATRICES_MONIKER);
        }
        if let Some(channel) = &self.output_channel {
            channel.to_xml_list(write_info, &indent2);
        }
        write_info.add_node_ender(PRODUCT_MONIKER);
    }
}

/// The products of a reaction and the Q-value that links them.
///
/// Queries mirror the ones on [`crate::Reaction`] and recurse into the
/// decay channels of products.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputChannel {
    kind: ChannelKind,
    process: Option<String>,
    q: Suite,
    products: Vec<Product>,
    ancestor: Option<Ancestor>,
}

impl OutputChannel {
    pub fn new(kind: ChannelKind, q: Vec<Function1d>, products: Vec<Product>) -> Self {
        let mut channel = OutputChannel {
            kind,
            process: None,
            q: Suite::with_forms(Q_MONIKER, q),
            products,
            ancestor: None,
        };
        channel.attach_children();
        channel
    }

    pub fn from_node(node: OutputChannelNode) -> Result<Self> {
        let products = node
            .products
            .into_iter()
            .map(Product::from_node)
            .collect::<Result<Vec<_>>>()?;
        let mut channel = OutputChannel::new(node.genre, node.q, products);
        channel.process = node.process;
        Ok(channel)
    }

    pub fn to_node(&self) -> OutputChannelNode {
        OutputChannelNode {
            genre: self.kind,
            process: self.process.clone(),
            q: self.q.forms().to_vec(),
            products: self.products.iter().map(Product::to_node).collect(),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn process(&self) -> Option<&str> {
        self.process.as_deref()
    }

    pub fn q(&self) -> &Suite {
        &self.q
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn ancestor(&self) -> Option<&Ancestor> {
        self.ancestor.as_ref()
    }

    /// Point this channel back at the node that owns it. The Q suite and
    /// the products are re-pointed below the new path.
    pub fn set_ancestor(&mut self, ancestor: Ancestor) {
        self.ancestor = Some(ancestor);
        self.attach_children();
    }

    fn attach_children(&mut self) {
        let own = match &self.ancestor {
            Some(parent) => parent.child(OUTPUT_CHANNEL_MONIKER, ""),
            None => Ancestor::new(OUTPUT_CHANNEL_MONIKER, ""),
        };
        self.q.set_ancestor(own.clone());
        for product in &mut self.products {
            product.set_parent(&own);
        }
    }

    /// The form the Q-value is evaluated from (the first in the Q suite).
    pub fn q_form(&self) -> Result<&Function1d> {
        self.q.first()
    }

    /// Whether `product` contributes to multi-group quantities.
    fn includes(&self, product: &Product, settings: &MultiGroupSettings) -> bool {
        match self.kind {
            ChannelKind::Fission => {
                product.emission_mode != EmissionMode::Delayed || settings.delayed_neutrons
            }
            ChannelKind::TwoBody | ChannelKind::NBody => true,
        }
    }

    fn matching<'a>(
        &'a self,
        settings: &'a MultiGroupSettings,
        product_id: &'a str,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |product| product.pid == product_id && self.includes(product, settings))
    }

    fn decay_channels(&self) -> impl Iterator<Item = &OutputChannel> {
        self.products
            .iter()
            .filter_map(|product| product.output_channel.as_deref())
    }

    pub fn product_ids(
        &self,
        ids: &mut BTreeSet<String>,
        particles: &Particles,
        transportables_only: bool,
    ) {
        for product in &self.products {
            if !transportables_only || particles.contains(&product.pid) {
                ids.insert(product.pid.clone());
            }
            if let Some(channel) = &product.output_channel {
                channel.product_ids(ids, particles, transportables_only);
            }
        }
    }

    /// Highest Legendre order of the transfer matrices for `product_id`,
    /// or -1 when no product has matrices under the settings' label.
    pub fn maximum_legendre_order(&self, settings: &MultiGroupSettings, product_id: &str) -> i32 {
        let own = self
            .matching(settings, product_id)
            .filter_map(|product| product.orders(&settings.label))
            .map(|orders| orders.len() as i32 - 1)
            .max()
            .unwrap_or(-1);
        self.decay_channels()
            .map(|channel| channel.maximum_legendre_order(settings, product_id))
            .fold(own, i32::max)
    }

    pub fn multi_group_multiplicity(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for product in self.matching(settings, product_id) {
            vector.try_add(product.multiplicity.gridded(&settings.label)?)?;
        }
        for channel in self.decay_channels() {
            vector.try_add(&channel.multi_group_multiplicity(settings, particles, product_id)?)?;
        }
        Ok(vector)
    }

    /// Sum of the order `order` transfer matrices of every matching
    /// product. Products whose data stop below `order` contribute nothing.
    pub fn multi_group_product_matrix(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
        order: usize,
    ) -> Result<Matrix> {
        let mut matrix = Matrix::default();
        for product in self.matching(settings, product_id) {
            let orders = product.orders(&settings.label).ok_or_else(|| {
                ReactionError::LabelNotFound {
                    moniker: format!("{}[@label='{}']/productMatrix", PRODUCT_MONIKER, product.label),
                    label: settings.label.clone(),
                }
            })?;
            if let Some(m) = orders.get(order) {
                matrix.try_add(m)?;
            }
        }
        for channel in self.decay_channels() {
            matrix.try_add(&channel.multi_group_product_matrix(
                settings, particles, product_id, order,
            )?)?;
        }
        Ok(matrix)
    }

    pub fn multi_group_average_energy(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for product in self.matching(settings, product_id) {
            vector.try_add(product.average_energy.gridded(&settings.label)?)?;
        }
        for channel in self.decay_channels() {
            vector.try_add(&channel.multi_group_average_energy(settings, particles, product_id)?)?;
        }
        Ok(vector)
    }

    pub fn multi_group_average_momentum(
        &self,
        settings: &MultiGroupSettings,
        particles: &Particles,
        product_id: &str,
    ) -> Result<Vector> {
        let mut vector = Vector::default();
        for product in self.matching(settings, product_id) {
            vector.try_add(product.average_momentum.gridded(&settings.label)?)?;
        }
        for channel in self.decay_channels() {
            vector.try_add(&channel.multi_group_average_momentum(settings, particles, product_id)?)?;
        }
        Ok(vector)
    }

    /// Continuous-energy average energy, momentum and gain of `product_id`
    /// at incident `energy`, read from the first form of each product suite.
    pub fn continuous_energy_product_data(&self, product_id: &str, energy: f64) -> ProductData {
        let mut data = ProductData::default();
        for product in &self.products {
            if product.pid == product_id {
                data += product.continuous_energy_data(energy);
            }
            if let Some(channel) = &product.output_channel {
                data += channel.continuous_energy_product_data(product_id, energy);
            }
        }
        data
    }

    pub(crate) fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        let indent2 = write_info.incremental_indent(indent);
        let mut attributes = WriteInfo::add_attribute("genre", self.kind.keyword());
        if let Some(process) = &self.process {
            attributes += &WriteInfo::add_attribute("process", process);
        }
        write_info.add_node_starter(indent, OUTPUT_CHANNEL_MONIKER, &attributes);
        self.q.to_xml_list(write_info, &indent2);
        if !self.products.is_empty() {
            let indent3 = write_info.incremental_indent(&indent2);
            write_info.add_node_starter(&indent2, "products", "");
            for product in &self.products {
                product.to_xml_list(write_info, &indent3);
            }
            write_info.add_node_ender("products");
        }
        write_info.add_node_ender(OUTPUT_CHANNEL_MONIKER);
    }
}
