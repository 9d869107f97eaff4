//! Boost compounds and the body part each one enhances.

use crate::PartKind;

/// Energy a lab spends per boosted part.
pub const LAB_BOOST_ENERGY: u32 = 20;
/// Mineral a lab spends per boosted part.
pub const LAB_BOOST_MINERAL: u32 = 30;

const BOOSTS: &[(PartKind, &[&str])] = &[
    (
        PartKind::Work,
        &[
            "UO", "UHO2", "XUHO2", "LH", "LH2O", "XLH2O", "ZH", "ZH2O", "XZH2O", "GH", "GH2O",
            "XGH2O",
        ],
    ),
    (PartKind::Attack, &["UH", "UH2O", "XUH2O"]),
    (PartKind::RangedAttack, &["KO", "KHO2", "XKHO2"]),
    (PartKind::Heal, &["LO", "LHO2", "XLHO2"]),
    (PartKind::Carry, &["KH", "KH2O", "XKH2O"]),
    (PartKind::Move, &["ZO", "ZHO2", "XZHO2"]),
    (PartKind::Tough, &["GO", "GHO2", "XGHO2"]),
];

pub fn is_boost_compound(mineral: &str) -> bool {
    boost_part(mineral).is_some()
}

/// Part type a compound boosts.
pub fn boost_part(mineral: &str) -> Option<PartKind> {
    BOOSTS
        .iter()
        .find(|(_, compounds)| compounds.contains(&mineral))
        .map(|(part, _)| *part)
}
