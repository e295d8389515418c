//! Reaction records of GNDS nuclear data and the multi-group transport
//! quantities (cross sections, multiplicities, transfer matrices, energy and
//! momentum deposition, gains) derived from them.
mod classification;
mod config;
mod error;
mod function;
mod output_channel;
mod particles;
mod protare;
mod reaction;
mod styles;
mod suite;
mod threshold;
mod vector;
mod writer;

pub use classification::{classify, Classification, MAXIMUM_ENDF_MT};
pub use config::{Config, ParseMode, Settings, CONFIG};
pub use error::{ReactionError, Result};
pub use function::Function1d;
pub use output_channel::{
    ChannelKind, EmissionMode, OutputChannel, OutputChannelNode, Product, ProductData,
    ProductMatrixNode, ProductNode,
};
pub use particles::{
    MultiGroup, MultiGroupSettings, Particle, Particles, ELECTRON, ELECTRON_MASS_MEV, NEUTRON,
    PHOTON,
};
pub use protare::{Protare, ProtareNode};
pub use reaction::{AncestryItem, ProtareContext, Reaction, ReactionBuilder, ReactionNode};
pub use styles::{GriddedCrossSection, Style, Styles};
pub use suite::{Ancestor, Suite};
pub use threshold::{resolve as resolve_thresholds, ThresholdInputs, Thresholds};
pub use vector::{Matrix, Vector};
pub use writer::WriteInfo;
