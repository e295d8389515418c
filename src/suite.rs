use crate::error::{ReactionError, Result};
use crate::function::Function1d;
use crate::vector::Vector;
use crate::writer::WriteInfo;

pub const DOUBLE_DIFFERENTIAL_CROSS_SECTION_MONIKER: &str = "doubleDifferentialCrossSection";
pub const CROSS_SECTION_MONIKER: &str = "crossSection";
pub const AVAILABLE_ENERGY_MONIKER: &str = "availableEnergy";
pub const AVAILABLE_MOMENTUM_MONIKER: &str = "availableMomentum";
pub const Q_MONIKER: &str = "Q";
pub const MULTIPLICITY_MONIKER: &str = "multiplicity";
pub const AVERAGE_PRODUCT_ENERGY_MONIKER: &str = "averageProductEnergy";
pub const AVERAGE_PRODUCT_MOMENTUM_MONIKER: &str = "averageProductMomentum";

/// Non-owning link from a suite to the node that contains it.
///
/// Only identifies the parent (its moniker, label and the path above it) so
/// a suite can build its document path; it never keeps the parent alive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ancestor {
    pub moniker: String,
    pub label: String,
    /// Path of the node above this one, empty at the top.
    pub parent: String,
}

impl Ancestor {
    pub fn new(moniker: &str, label: &str) -> Self {
        Ancestor {
            moniker: moniker.to_string(),
            label: label.to_string(),
            parent: String::new(),
        }
    }

    /// An ancestor nested below this one.
    pub fn child(&self, moniker: &str, label: &str) -> Self {
        Ancestor {
            parent: self.xlink(),
            ..Ancestor::new(moniker, label)
        }
    }

    /// Path of the ancestor node, e.g. `reaction[@label='n + Fe56']`.
    pub fn xlink(&self) -> String {
        let node = if self.label.is_empty() {
            self.moniker.clone()
        } else {
            format!("{}[@label='{}']", self.moniker, self.label)
        };
        if self.parent.is_empty() {
            node
        } else {
            format!("{}/{}", self.parent, node)
        }
    }
}

/// Label-indexed collection of function forms, one per processing style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Suite {
    moniker: String,
    forms: Vec<Function1d>,
    ancestor: Option<Ancestor>,
}

impl Suite {
    pub fn new(moniker: &str) -> Self {
        Suite {
            moniker: moniker.to_string(),
            forms: Vec::new(),
            ancestor: None,
        }
    }

    pub fn with_forms(moniker: &str, forms: Vec<Function1d>) -> Self {
        Suite {
            moniker: moniker.to_string(),
            forms,
            ancestor: None,
        }
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    /// Forms in document order.
    pub fn forms(&self) -> &[Function1d] {
        &self.forms
    }

    pub fn into_forms(self) -> Vec<Function1d> {
        self.forms
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Add a form; a form with the same label replaces the old one.
    pub fn add(&mut self, form: Function1d) {
        match self.forms.iter_mut().find(|f| f.label() == form.label()) {
            Some(existing) => *existing = form,
            None => self.forms.push(form),
        }
    }

    pub fn set_ancestor(&mut self, ancestor: Ancestor) {
        self.ancestor = Some(ancestor);
    }

    pub fn ancestor(&self) -> Option<&Ancestor> {
        self.ancestor.as_ref()
    }

    /// Document path of this suite, relative to its ancestor when attached.
    pub fn xlink(&self) -> String {
        match &self.ancestor {
            Some(ancestor) => format!("{}/{}", ancestor.xlink(), self.moniker),
            None => self.moniker.clone(),
        }
    }

    pub fn get(&self, label: &str) -> Result<&Function1d> {
        self.forms
            .iter()
            .find(|form| form.label() == label)
            .ok_or_else(|| ReactionError::LabelNotFound {
                moniker: self.xlink(),
                label: label.to_string(),
            })
    }

    /// The first (evaluated) form.
    pub fn first(&self) -> Result<&Function1d> {
        self.forms
            .first()
            .ok_or_else(|| ReactionError::EmptySuite(self.xlink()))
    }

    /// Multi-group data stored under `label`.
    pub fn gridded(&self, label: &str) -> Result<&Vector> {
        match self.get(label)? {
            Function1d::Gridded1d { data, .. } => Ok(data),
            other => Err(self.unexpected(other, "gridded1d")),
        }
    }

    /// `(start, ys)` of the Ys1d stored under `label`.
    pub fn ys1d(&self, label: &str) -> Result<(usize, &[f64])> {
        match self.get(label)? {
            Function1d::Ys1d { start, ys, .. } => Ok((*start, ys.as_slice())),
            other => Err(self.unexpected(other, "Ys1d")),
        }
    }

    fn unexpected(&self, form: &Function1d, expected: &'static str) -> ReactionError {
        ReactionError::UnexpectedForm {
            moniker: self.xlink(),
            label: form.label().to_string(),
            expected,
            found: form.moniker(),
        }
    }

    pub(crate) fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        if self.forms.is_empty() {
            return;
        }
        let indent2 = write_info.incremental_indent(indent);
        write_info.add_node_starter(indent, &self.moniker, "");
        for form in &self.forms {
            form.to_xml_list(write_info, &indent2);
        }
        write_info.add_node_ender(&self.moniker);
    }
}
