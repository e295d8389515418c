use crate::config::ParseMode;
use crate::error::{ReactionError, Result};
use crate::function::Function1d;
use crate::styles::GriddedCrossSection;
use crate::suite::Suite;
use tracing::debug;

/// Energy thresholds of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    /// Threshold from the Q-value, scaled by the protare threshold factor.
    pub energy: f64,
    /// First energy at which the cross section is tabulated (non-zero).
    pub cross_section: f64,
}

/// Everything threshold resolution reads from the reaction and its protare.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdInputs<'a> {
    pub parse_mode: ParseMode,
    pub q_form: &'a Function1d,
    pub threshold_factor: f64,
    pub gridded_cross_section: Option<&'a GriddedCrossSection>,
    pub cross_section: &'a Suite,
}

/// Q-value at zero incident energy. Only constant and XYs1d Q forms are supported.
fn q_at_zero(q_form: &Function1d) -> Result<f64> {
    match q_form {
        Function1d::Constant1d { value, .. } => Ok(*value),
        Function1d::XYs1d { label, .. } => {
            q_form
                .evaluate(0.0)
                .ok_or_else(|| ReactionError::EmptyForm {
                    label: label.clone(),
                })
        }
        Function1d::Ys1d { label, .. }
        | Function1d::Gridded1d { label, .. }
        | Function1d::Regions1d { label, .. } => Err(ReactionError::UnsupportedQForm {
            label: label.clone(),
        }),
    }
}

/// Determine the energy and cross section thresholds of a reaction.
///
/// Outline and read-only parses leave both thresholds at zero. An
/// endothermic reaction (Q < 0) gets `energy = factor * -Q`; its
/// cross section threshold comes from the first grid point of the gridded
/// cross section style when that style is usable, else it equals `energy`.
pub fn resolve(inputs: &ThresholdInputs<'_>) -> Result<Thresholds> {
    let mut thresholds = Thresholds::default();
    if !inputs.parse_mode.requires_full_data() {
        return Ok(thresholds);
    }

    let mut q = -q_at_zero(inputs.q_form)?;
    if q <= 0.0 {
        q = 0.0;
    }
    thresholds.energy = inputs.threshold_factor * q;

    if q > 0.0 {
        thresholds.cross_section = match inputs.gridded_cross_section {
            Some(gridded) if inputs.parse_mode != ParseMode::MultiGroupOnly => {
                let (start, _) = inputs.cross_section.ys1d(&gridded.label)?;
                *gridded
                    .grid
                    .get(start)
                    .ok_or(ReactionError::GridIndexOutOfRange {
                        index: start,
                        len: gridded.grid.len(),
                    })?
            }
            _ => thresholds.energy,
        };
    }

    debug!(
        energy_threshold = thresholds.energy,
        cross_section_threshold = thresholds.cross_section,
        "resolved thresholds"
    );
    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::CROSS_SECTION_MONIKER;

    fn gridded() -> GriddedCrossSection {
        GriddedCrossSection {
            label: "recon".to_string(),
            derived_from: "eval".to_string(),
            grid: vec![1e-5, 1.0, 5.0, 10.0, 20.0],
        }
    }

    fn cross_section() -> Suite {
        Suite::with_forms(
            CROSS_SECTION_MONIKER,
            vec![
                Function1d::xys("eval", vec![5.0, 20.0], vec![0.0, 1.0]),
                Function1d::ys("recon", 2, vec![0.0, 0.3, 0.6, 1.0]),
            ],
        )
    }

    fn inputs<'a>(
        parse_mode: ParseMode,
        q_form: &'a Function1d,
        gridded: Option<&'a GriddedCrossSection>,
        suite: &'a Suite,
    ) -> ThresholdInputs<'a> {
        ThresholdInputs {
            parse_mode,
            q_form,
            threshold_factor: 2.0,
            gridded_cross_section: gridded,
            cross_section: suite,
        }
    }

    #[test]
    fn test_constant_q_without_gridded_style() {
        let q = Function1d::constant("eval", -5.0);
        let suite = cross_section();
        let t = resolve(&inputs(ParseMode::All, &q, None, &suite)).unwrap();
        assert_eq!(t.energy, 10.0);
        assert_eq!(t.cross_section, 10.0);
    }

    #[test]
    fn test_gridded_style_sets_cross_section_threshold() {
        let q = Function1d::constant("eval", -5.0);
        let suite = cross_section();
        let g = gridded();
        let t = resolve(&inputs(ParseMode::All, &q, Some(&g), &suite)).unwrap();
        assert_eq!(t.energy, 10.0);
        assert_eq!(t.cross_section, 5.0);
    }

    #[test]
    fn test_multi_group_only_ignores_gridded_style() {
        let q = Function1d::constant("eval", -5.0);
        let suite = cross_section();
        let g = gridded();
        let t = resolve(&inputs(ParseMode::MultiGroupOnly, &q, Some(&g), &suite)).unwrap();
        assert_eq!(t.cross_section, 10.0);
    }

    #[test]
    fn test_exothermic_and_zero_q() {
        let suite = cross_section();
        let g = gridded();
        for value in [0.0, 3.2e6] {
            let q = Function1d::constant("eval", value);
            let t = resolve(&inputs(ParseMode::All, &q, Some(&g), &suite)).unwrap();
            assert_eq!(t, Thresholds::default());
        }
    }

    #[test]
    fn test_xys_q_evaluated_at_zero() {
        let q = Function1d::xys("eval", vec![0.0, 10.0], vec![-1.5, -1.0]);
        let suite = cross_section();
        let t = resolve(&inputs(ParseMode::All, &q, None, &suite)).unwrap();
        assert_eq!(t.energy, 3.0);
        assert_eq!(t.cross_section, 3.0);
    }

    #[test]
    fn test_outline_and_read_only_skip() {
        // even an unsupported form is not looked at
        let q = Function1d::gridded("MultiGroup", vec![-1.0]);
        let suite = cross_section();
        for mode in [ParseMode::Outline, ParseMode::ReadOnly] {
            let t = resolve(&inputs(mode, &q, None, &suite)).unwrap();
            assert_eq!(t, Thresholds::default());
        }
    }

    #[test]
    fn test_unsupported_q_form() {
        let q = Function1d::gridded("MultiGroup", vec![-1.0]);
        let suite = cross_section();
        match resolve(&inputs(ParseMode::All, &q, None, &suite)) {
            Err(ReactionError::UnsupportedQForm { label }) => assert_eq!(label, "MultiGroup"),
            other => panic!("expected UnsupportedQForm, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_xys_q_is_an_error() {
        let q = Function1d::xys("eval", vec![], vec![]);
        let suite = cross_section();
        match resolve(&inputs(ParseMode::All, &q, None, &suite)) {
            Err(ReactionError::EmptyForm { label }) => assert_eq!(label, "eval"),
            other => panic!("expected EmptyForm, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_ys1d_propagates() {
        let q = Function1d::constant("eval", -5.0);
        let suite = Suite::with_forms(CROSS_SECTION_MONIKER, vec![]);
        let g = gridded();
        assert!(matches!(
            resolve(&inputs(ParseMode::All, &q, Some(&g), &suite)),
            Err(ReactionError::LabelNotFound { .. })
        ));
    }

    #[test]
    fn test_start_past_grid_end() {
        let q = Function1d::constant("eval", -5.0);
        let suite = Suite::with_forms(
            CROSS_SECTION_MONIKER,
            vec![Function1d::ys("recon", 9, vec![1.0])],
        );
        let g = gridded();
        assert!(matches!(
            resolve(&inputs(ParseMode::All, &q, Some(&g), &suite)),
            Err(ReactionError::GridIndexOutOfRange { index: 9, len: 5 })
        ));
    }
}
