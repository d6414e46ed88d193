//! Rotation Catalogue (C1) — enumerates rotation codes and classifies each
//! into the category groups the decision model and requirement sync read.
//!
//! The catalogue is the only process-wide state in the crate (see the
//! "Global state" design note): a fixed, read-only table populated once.

use std::sync::OnceLock;

/// One rotation code a resident can be assigned to for a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationCode {
    /// Floor team A.
    A,
    /// Floor team B.
    B,
    /// Floor team C.
    C,
    /// Floor team D.
    D,
    /// Senior-only supplemental floor team.
    G,
    /// ICU day.
    Icu,
    /// ICU day, secondary variant (counts identically to `Icu`).
    IcuE,
    /// ICU night.
    IcuN,
    /// Night float.
    Nf,
    /// Swing shift (contributes to both NF and ICU night for cap purposes).
    Swing,
    /// Internal-medicine clinic.
    Clinic,
    /// Internal-medicine clinic, secondary variant (counts identically to `Clinic`).
    ClinicStar,
    /// Transitional-year clinic channel, reserved for TY residents.
    TyClinic,
    /// Emergency department.
    Ed,
    /// Cardiology elective.
    Cardio,
    /// Cardiology elective, Ramirez-restricted variant.
    CardioRam,
    /// Cardiology elective, HCA-affiliated variant.
    CardioHca,
    /// Infectious disease elective.
    IdRot,
    /// Neurology elective.
    Neuro,
    /// Geriatrics elective (senior-only).
    Geriatrics,
    /// Vacation week.
    Vacation,
    /// Holiday-only "off" marker; permitted only on weeks 26 and 27.
    IcuH,
    /// General surgery, permitted only for TY/anesthesia-track residents.
    GenSurg,
    /// Terminal anesthesia elective block.
    Elective,
    /// Generic elective rotation (e.g. palliative, GI, pulm, nephro, ...).
    GenericElective(GenericElective),
}

/// A generic elective code that contributes only to the ELECTIVE category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GenericElective {
    Palliative,
    Gi,
    HemOnc,
    Endo,
    Rheuma,
    Pulm,
    Sicu,
    Dermatology,
    Nephro,
    Plastic,
    PainManagement,
}

/// The cumulative/annual requirement category a week contributes to.
///
/// A single rotation code may contribute to more than one category (e.g.
/// `Nf` contributes to FLOORS for requirement purposes, see [`crate::sync`]),
/// so this is distinct from the rotation code itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Floors,
    Icu,
    IcuNight,
    Clinic,
    TyClinic,
    Ed,
    Cardio,
    Id,
    Neuro,
    Geriatrics,
    GenSurg,
    Elective,
    Nf,
    Swing,
    Vacation,
}

/// Which role may be assigned a rotation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePermission {
    SeniorOnly,
    InternOnly,
    Either,
}

/// A PGY/track eligibility fence beyond the basic senior/intern role split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityFence {
    /// No additional restriction.
    None,
    /// Only TY residents.
    TyOnly,
    /// Only TY residents on the `anesthesia` track.
    TyAnesthesiaOnly,
    /// Never TY residents.
    NonTyOnly,
    /// Never a TY resident outside the `neurology` track; non-TY residents
    /// are unrestricted.
    NeurologyTyExcludesOthers,
}

/// Catalogue metadata for one rotation code.
#[derive(Debug, Clone, Copy)]
pub struct RotationMeta {
    pub code: RotationCode,
    /// Every category this code's weeks are credited toward.
    pub categories: &'static [Category],
    pub is_night: bool,
    pub holiday_only: bool,
    pub role: RolePermission,
    pub fence: EligibilityFence,
}

macro_rules! meta {
    ($code:expr, [$($cat:expr),*], night = $night:expr, holiday_only = $holiday:expr, role = $role:expr, fence = $fence:expr) => {
        RotationMeta {
            code: $code,
            categories: &[$($cat),*],
            is_night: $night,
            holiday_only: $holiday,
            role: $role,
            fence: $fence,
        }
    };
}

fn build_catalogue() -> Vec<RotationMeta> {
    use Category::*;
    use EligibilityFence::*;
    use RolePermission::*;
    use RotationCode::*;

    vec![
        meta!(A, [Floors], night = false, holiday_only = false, role = Either, fence = None),
        meta!(B, [Floors], night = false, holiday_only = false, role = Either, fence = None),
        meta!(C, [Floors], night = false, holiday_only = false, role = Either, fence = None),
        meta!(D, [Floors], night = false, holiday_only = false, role = Either, fence = None),
        meta!(G, [Floors], night = false, holiday_only = false, role = SeniorOnly, fence = None),
        meta!(Icu, [Icu], night = false, holiday_only = false, role = Either, fence = None),
        meta!(IcuE, [Icu], night = false, holiday_only = false, role = Either, fence = None),
        meta!(IcuN, [IcuNight], night = true, holiday_only = false, role = Either, fence = None),
        meta!(Nf, [Nf], night = true, holiday_only = false, role = Either, fence = None),
        meta!(Swing, [Swing], night = true, holiday_only = false, role = Either, fence = None),
        meta!(Clinic, [Clinic], night = false, holiday_only = false, role = Either, fence = NonTyOnly),
        meta!(ClinicStar, [Clinic], night = false, holiday_only = false, role = Either, fence = NonTyOnly),
        meta!(TyClinic, [TyClinic], night = false, holiday_only = false, role = Either, fence = TyOnly),
        meta!(Ed, [Ed], night = false, holiday_only = false, role = Either, fence = None),
        meta!(Cardio, [Cardio], night = false, holiday_only = false, role = Either, fence = None),
        meta!(CardioRam, [Cardio], night = false, holiday_only = false, role = Either, fence = None),
        meta!(CardioHca, [Cardio], night = false, holiday_only = false, role = Either, fence = None),
        meta!(IdRot, [Id], night = false, holiday_only = false, role = Either, fence = None),
        meta!(Neuro, [Neuro], night = false, holiday_only = false, role = Either, fence = NeurologyTyExcludesOthers),
        meta!(Geriatrics, [Geriatrics], night = false, holiday_only = false, role = SeniorOnly, fence = None),
        meta!(Vacation, [Vacation], night = false, holiday_only = false, role = Either, fence = None),
        meta!(IcuH, [], night = false, holiday_only = true, role = Either, fence = None),
        meta!(GenSurg, [GenSurg], night = false, holiday_only = false, role = Either, fence = TyAnesthesiaOnly),
        meta!(Elective, [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Palliative), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Gi), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::HemOnc), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Endo), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Rheuma), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Pulm), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Sicu), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Dermatology), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Nephro), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::Plastic), [Elective], night = false, holiday_only = false, role = Either, fence = None),
        meta!(GenericElective(GenericElective::PainManagement), [Elective], night = false, holiday_only = false, role = Either, fence = None),
    ]
}

fn catalogue() -> &'static [RotationMeta] {
    static CATALOGUE: OnceLock<Vec<RotationMeta>> = OnceLock::new();
    CATALOGUE.get_or_init(build_catalogue)
}

/// Returns metadata for every rotation code in the catalogue, in a stable
/// order that doubles as the CP-SAT integer-domain index order.
pub fn all() -> &'static [RotationMeta] {
    catalogue()
}

/// Returns the catalogue index for a rotation code (its position in [`all`]).
pub fn index_of(code: RotationCode) -> usize {
    all()
        .iter()
        .position(|m| m.code == code)
        .expect("every RotationCode variant is present in the catalogue")
}

/// Returns the rotation code at a catalogue index.
pub fn code_at(index: usize) -> RotationCode {
    all()[index].code
}

/// Returns the catalogue indices of every code belonging to `category`.
pub fn indices_in_category(category: Category) -> Vec<usize> {
    all()
        .iter()
        .enumerate()
        .filter(|(_, m)| m.categories.contains(&category))
        .map(|(i, _)| i)
        .collect()
}

/// Returns the catalogue indices of the floor-team codes A, B, C, D.
pub fn floor_abcd_indices() -> Vec<usize> {
    [RotationCode::A, RotationCode::B, RotationCode::C, RotationCode::D]
        .into_iter()
        .map(index_of)
        .collect()
}

/// Returns the catalogue indices of the floor+night supergroup (H11):
/// A, B, C, D, G, NF, SWING.
pub fn floor_supergroup_indices() -> Vec<usize> {
    [
        RotationCode::A,
        RotationCode::B,
        RotationCode::C,
        RotationCode::D,
        RotationCode::G,
        RotationCode::Nf,
        RotationCode::Swing,
    ]
    .into_iter()
    .map(index_of)
    .collect()
}

/// Returns the catalogue indices of night codes (NF, ICU_N), used by H9.
pub fn night_indices() -> Vec<usize> {
    [RotationCode::Nf, RotationCode::IcuN]
        .into_iter()
        .map(index_of)
        .collect()
}

/// Returns the catalogue indices of the night-plus-swing cap group, used by H9's
/// objective-level staggering and by requirement sync.
pub fn night_plus_swing_indices() -> Vec<usize> {
    [RotationCode::Nf, RotationCode::IcuN, RotationCode::Swing]
        .into_iter()
        .map(index_of)
        .collect()
}

/// Returns the catalogue indices of ICU day-or-night codes, used by H10.
pub fn icu_day_or_night_indices() -> Vec<usize> {
    [RotationCode::Icu, RotationCode::IcuE, RotationCode::IcuN]
        .into_iter()
        .map(index_of)
        .collect()
}

/// Returns the catalogue indices of the two clinic codes (CLINIC, CLINIC*).
pub fn clinic_indices() -> Vec<usize> {
    [RotationCode::Clinic, RotationCode::ClinicStar]
        .into_iter()
        .map(index_of)
        .collect()
}

/// Returns the catalogue indices contributing to the requirement category
/// `CORE_ELECTIVES` (CARDIO, ID, NEURO, GERIATRICS, ED), used by H14/H15.
pub fn core_elective_indices(category: Category) -> Vec<usize> {
    match category {
        Category::Cardio => [RotationCode::Cardio, RotationCode::CardioRam, RotationCode::CardioHca]
            .into_iter()
            .map(index_of)
            .collect(),
        other => indices_in_category(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_no_duplicate_codes() {
        let codes: Vec<_> = all().iter().map(|m| m.code).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codes.len(), sorted.len());
    }

    #[test]
    fn index_of_and_code_at_round_trip() {
        for (i, m) in all().iter().enumerate() {
            assert_eq!(index_of(m.code), i);
            assert_eq!(code_at(i), m.code);
        }
    }

    #[test]
    fn icu_h_is_holiday_only() {
        let meta = all().iter().find(|m| m.code == RotationCode::IcuH).unwrap();
        assert!(meta.holiday_only);
    }

    #[test]
    fn gen_surg_is_fenced_to_ty_anesthesia() {
        let meta = all().iter().find(|m| m.code == RotationCode::GenSurg).unwrap();
        assert_eq!(meta.fence, EligibilityFence::TyAnesthesiaOnly);
    }

    #[test]
    fn geriatrics_is_senior_only() {
        let meta = all().iter().find(|m| m.code == RotationCode::Geriatrics).unwrap();
        assert_eq!(meta.role, RolePermission::SeniorOnly);
    }

    #[test]
    fn floor_abcd_indices_has_four_entries() {
        assert_eq!(floor_abcd_indices().len(), 4);
    }

    #[test]
    fn clinic_codes_both_map_to_clinic_category() {
        let idxs = clinic_indices();
        for i in idxs {
            assert!(all()[i].categories.contains(&Category::Clinic));
        }
    }
}
