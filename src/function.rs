use crate::vector::Vector;
use crate::writer::WriteInfo;
use serde::{Deserialize, Serialize};

/// One-dimensional function forms stored in a [`crate::Suite`].
///
/// Each form carries the label of the processing style it belongs to
/// (e.g. "eval", "recon", "MultiGroup_1").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Function1d {
    /// A value that is constant over its domain.
    #[serde(rename = "constant1d")]
    Constant1d {
        label: String,
        value: f64,
        #[serde(default)]
        domain_min: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain_max: Option<f64>,
    },
    /// Point-wise data with lin-lin interpolation.
    #[serde(rename = "XYs1d")]
    XYs1d {
        label: String,
        x: Vec<f64>,
        y: Vec<f64>,
    },
    /// Values on an externally defined grid starting at index `start`.
    #[serde(rename = "Ys1d")]
    Ys1d {
        label: String,
        start: usize,
        ys: Vec<f64>,
    },
    /// Multi-group data, one value per group.
    #[serde(rename = "gridded1d")]
    Gridded1d { label: String, data: Vector },
    /// Piecewise function made of consecutive regions.
    #[serde(rename = "regions1d")]
    Regions1d {
        label: String,
        regions: Vec<Function1d>,
    },
}

impl Function1d {
    pub fn constant(label: &str, value: f64) -> Self {
        Function1d::Constant1d {
            label: label.to_string(),
            value,
            domain_min: 0.0,
            domain_max: None,
        }
    }

    pub fn xys(label: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Function1d::XYs1d {
            label: label.to_string(),
            x,
            y,
        }
    }

    pub fn ys(label: &str, start: usize, ys: Vec<f64>) -> Self {
        Function1d::Ys1d {
            label: label.to_string(),
            start,
            ys,
        }
    }

    pub fn gridded(label: &str, data: Vec<f64>) -> Self {
        Function1d::Gridded1d {
            label: label.to_string(),
            data: Vector::new(data),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Function1d::Constant1d { label, .. }
            | Function1d::XYs1d { label, .. }
            | Function1d::Ys1d { label, .. }
            | Function1d::Gridded1d { label, .. }
            | Function1d::Regions1d { label, .. } => label,
        }
    }

    /// Node name of this form in the document.
    pub fn moniker(&self) -> &'static str {
        match self {
            Function1d::Constant1d { .. } => "constant1d",
            Function1d::XYs1d { .. } => "XYs1d",
            Function1d::Ys1d { .. } => "Ys1d",
            Function1d::Gridded1d { .. } => "gridded1d",
            Function1d::Regions1d { .. } => "regions1d",
        }
    }

    /// Upper end of the domain, if the form defines one by itself.
    pub fn domain_max(&self) -> Option<f64> {
        match self {
            Function1d::Constant1d { domain_max, .. } => Some(domain_max.unwrap_or(f64::INFINITY)),
            Function1d::XYs1d { x, .. } => x.last().copied(),
            Function1d::Regions1d { regions, .. } => {
                regions.last().and_then(|region| region.domain_max())
            }
            Function1d::Ys1d { .. } | Function1d::Gridded1d { .. } => None,
        }
    }

    /// Evaluate at `x`.
    ///
    /// Returns `None` for forms that need an external grid to be evaluated
    /// (`Ys1d`, `Gridded1d`) and for empty point-wise data. Point-wise data
    /// are clamped to the first/last value outside their domain.
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        match self {
            Function1d::Constant1d { value, .. } => Some(*value),
            Function1d::XYs1d { x: xs, y: ys, .. } => interpolate_lin_lin(xs, ys, x),
            Function1d::Regions1d { regions, .. } => {
                let region = regions
                    .iter()
                    .find(|region| region.domain_max().map_or(false, |max| x <= max))
                    .or_else(|| regions.last())?;
                region.evaluate(x)
            }
            Function1d::Ys1d { .. } | Function1d::Gridded1d { .. } => None,
        }
    }

    pub(crate) fn to_xml_list(&self, write_info: &mut WriteInfo, indent: &str) {
        let mut attributes = WriteInfo::add_attribute("label", self.label());
        match self {
            Function1d::Constant1d {
                value,
                domain_min,
                domain_max,
                ..
            } => {
                attributes += &WriteInfo::add_attribute("value", &value.to_string());
                attributes += &WriteInfo::add_attribute("domainMin", &domain_min.to_string());
                if let Some(domain_max) = domain_max {
                    attributes += &WriteInfo::add_attribute("domainMax", &domain_max.to_string());
                }
                write_info.add_node_starter_ender(indent, self.moniker(), &attributes);
            }
            Function1d::XYs1d { x, y, .. } => {
                let pairs: Vec<f64> = x
                    .iter()
                    .zip(y.iter())
                    .flat_map(|(a, b)| [*a, *b])
                    .collect();
                let indent2 = write_info.incremental_indent(indent);
                write_info.add_node_starter(indent, self.moniker(), &attributes);
                write_info.add_values(&indent2, &pairs);
                write_info.add_node_ender(self.moniker());
            }
            Function1d::Ys1d { start, ys, .. } => {
                attributes += &WriteInfo::add_attribute("start", &start.to_string());
                let indent2 = write_info.incremental_indent(indent);
                write_info.add_node_starter(indent, self.moniker(), &attributes);
                write_info.add_values(&indent2, ys);
                write_info.add_node_ender(self.moniker());
            }
            Function1d::Gridded1d { data, .. } => {
                let indent2 = write_info.incremental_indent(indent);
                write_info.add_node_starter(indent, self.moniker(), &attributes);
                write_info.add_values(&indent2, data.as_slice());
                write_info.add_node_ender(self.moniker());
            }
            Function1d::Regions1d { regions, .. } => {
                write_info.add_node_starter(indent, self.moniker(), &attributes);
                let indent2 = write_info.incremental_indent(indent);
                for region in regions {
                    region.to_xml_list(write_info, &indent2);
                }
                write_info.add_node_ender(self.moniker());
            }
        }
    }
}

/// Lin-lin interpolation on sorted `x`, clamped at both ends.
fn interpolate_lin_lin(x: &[f64], y: &[f64], x_new: f64) -> Option<f64> {
    let n = x.len().min(y.len());
    if n == 0 {
        return None;
    }
    if n == 1 || x_new <= x[0] {
        return Some(y[0]);
    }
    if x_new >= x[n - 1] {
        return Some(y[n - 1]);
    }

    // largest i with x[i] <= x_new
    let i = x[..n].partition_point(|&xi| xi <= x_new) - 1;
    let (x1, x2) = (x[i], x[i + 1]);
    let (y1, y2) = (y[i], y[i + 1]);
    if x2 == x1 {
        return Some(y2);
    }
    Some(y1 + (x_new - x1) * (y2 - y1) / (x2 - x1))
}
