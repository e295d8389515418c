/// ENDL C values for ENDF MT 1 through 49, indexed by `mt - 1`.
/// Negative entries are reserved/unused ENDL slots, 0 means no ENDL category.
static MT_1_49_TO_C: [i32; 49] = [
    1, 10, -3, -4, -5, 0, 0, 0, 0, -10, //
    32, 0, 0, 0, 0, 12, 13, 15, 15, 15, //
    15, 26, 36, 33, -25, 0, -27, 20, 27, -30, //
    0, 22, 24, 25, -35, -36, 14, 15, 0, 0, //
    29, 16, 0, 17, 34, 0, 0, 0, 0,
];

/// ENDL C values for ENDF MT 101 through 200, indexed by `mt - 101`.
static MT_101_200_TO_C: [i32; 100] = [
    -101, 46, 40, 41, 42, 44, 45, 37, -109, 0, //
    18, 48, -113, -114, 19, 39, 47, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, -152, -153, -154, 43, -156, -157, 23, 31, -160, //
    -161, -162, -163, -164, -165, -166, -167, -168, -169, -170, //
    -171, -172, -173, -174, -175, -176, -177, -178, -179, -180, //
    -181, -182, -183, -184, -185, -186, -187, -188, 28, -190, //
    -191, -192, 38, -194, -195, -196, -197, -198, -199, -200,
];

/// Highest ENDF MT value the ENDL mapping knows about.
pub const MAXIMUM_ENDF_MT: i32 = 891;

/// ENDL (C, S) pair derived from an ENDF MT value.
///
/// `ok` is false only when the MT lies outside `1..=891`. An MT inside the
/// range that has no ENDL counterpart still reports `ok` with C = S = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub category: i32,
    pub sub_category: i32,
    pub ok: bool,
}

impl Classification {
    fn new(category: i32, sub_category: i32) -> Self {
        Classification {
            category,
            sub_category,
            ok: true,
        }
    }

    fn invalid() -> Self {
        Classification {
            category: 0,
            sub_category: 0,
            ok: false,
        }
    }
}

/// Map an ENDF MT value onto its legacy ENDL C and S values.
pub fn classify(mt: i32) -> Classification {
    if mt <= 0 || mt > MAXIMUM_ENDF_MT {
        return Classification::invalid();
    }

    match mt {
        1..=49 => Classification::new(MT_1_49_TO_C[(mt - 1) as usize], 0),
        50..=91 => Classification::new(11, if mt == 91 { 0 } else { 1 }),
        101..=200 => Classification::new(MT_101_200_TO_C[(mt - 101) as usize], 0),
        452 | 455 | 456 | 458 => Classification::new(15, if mt == 455 { 7 } else { 0 }),
        502..=572 => {
            let category = match mt {
                502 => 71,
                504 => 72,
                515..=517 => 74,
                522 => 73,
                _ => 0,
            };
            Classification::new(category, 0)
        }
        600..=849 => {
            // 50 wide bins, the last MT of each bin is the continuum (S = 0)
            let category = match mt {
                600..=649 => 40,
                650..=699 => 41,
                700..=749 => 42,
                750..=799 => 44,
                _ => 45,
            };
            let sub_category = if mt % 50 == 49 { 0 } else { 1 };
            Classification::new(category, sub_category)
        }
        875..=891 => Classification::new(12, if mt == 891 { 0 } else { 1 }),
        _ => Classification::new(0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(mt: i32) -> (i32, i32, bool) {
        let c = classify(mt);
        (c.category, c.sub_category, c.ok)
    }

    #[test]
    fn test_out_of_domain() {
        assert_eq!(pair(0), (0, 0, false));
        assert_eq!(pair(-7), (0, 0, false));
        assert_eq!(pair(892), (0, 0, false));
        assert_eq!(pair(900), (0, 0, false));
    }

    #[test]
    fn test_low_mt_table() {
        assert_eq!(pair(1), (1, 0, true));
        assert_eq!(pair(2), (10, 0, true));
        assert_eq!(pair(3), (-3, 0, true));
        assert_eq!(pair(16), (12, 0, true));
        assert_eq!(pair(18), (15, 0, true));
        assert_eq!(pair(28), (20, 0, true));
        assert_eq!(pair(45), (34, 0, true));
        assert_eq!(pair(49), (0, 0, true));
    }

    #[test]
    fn test_discrete_inelastic_levels() {
        assert_eq!(pair(50), (11, 1, true));
        assert_eq!(pair(51), (11, 1, true));
        assert_eq!(pair(90), (11, 1, true));
        assert_eq!(pair(91), (11, 0, true));
    }

    #[test]
    fn test_gap_between_tables() {
        for mt in 92..=100 {
            assert_eq!(pair(mt), (0, 0, true), "MT {}", mt);
        }
    }

    #[test]
    fn test_high_mt_table() {
        assert_eq!(pair(101), (-101, 0, true));
        assert_eq!(pair(102), (46, 0, true));
        assert_eq!(pair(103), (40, 0, true));
        assert_eq!(pair(111), (18, 0, true));
        assert_eq!(pair(155), (43, 0, true));
        assert_eq!(pair(158), (23, 0, true));
        assert_eq!(pair(189), (28, 0, true));
        assert_eq!(pair(193), (38, 0, true));
        assert_eq!(pair(200), (-200, 0, true));
    }

    #[test]
    fn test_fission_nubar_codes() {
        assert_eq!(pair(452), (15, 0, true));
        assert_eq!(pair(455), (15, 7, true));
        assert_eq!(pair(456), (15, 0, true));
        assert_eq!(pair(458), (15, 0, true));
        assert_eq!(pair(453), (0, 0, true));
    }

    #[test]
    fn test_atomic_codes() {
        assert_eq!(pair(502), (71, 0, true));
        assert_eq!(pair(504), (72, 0, true));
        assert_eq!(pair(515), (74, 0, true));
        assert_eq!(pair(516), (74, 0, true));
        assert_eq!(pair(517), (74, 0, true));
        assert_eq!(pair(522), (73, 0, true));
        assert_eq!(pair(503), (0, 0, true));
        assert_eq!(pair(572), (0, 0, true));
    }

    #[test]
    fn test_charged_particle_bins() {
        assert_eq!(pair(600), (40, 1, true));
        assert_eq!(pair(649), (40, 0, true));
        assert_eq!(pair(650), (41, 1, true));
        assert_eq!(pair(699), (41, 0, true));
        assert_eq!(pair(700), (42, 1, true));
        assert_eq!(pair(749), (42, 0, true));
        assert_eq!(pair(750), (44, 1, true));
        assert_eq!(pair(799), (44, 0, true));
        assert_eq!(pair(800), (45, 1, true));
        assert_eq!(pair(849), (45, 0, true));
        assert_eq!(pair(850), (0, 0, true));
        assert_eq!(pair(874), (0, 0, true));
        assert_eq!(pair(875), (12, 1, true));
        assert_eq!(pair(891), (12, 0, true));
    }

    #[test]
    fn test_classification_is_pure() {
        for mt in -5..=900 {
            assert_eq!(classify(mt), classify(mt));
        }
    }
}
