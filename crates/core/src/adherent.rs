//! Member ("adherent") value types and the `nax` display code.

use crate::types::{text_enum, DbId};

/// Width of the zero-padded member display code.
pub const NAX_WIDTH: usize = 6;

text_enum! {
    /// Sex recorded on the membership card.
    Sexe("sexe") {
        Homme => "homme",
        Femme => "femme",
    }
}

text_enum! {
    /// Employment status of the member.
    Statut("statut") {
        Actif => "actif",
        Retraite => "retraite",
    }
}

text_enum! {
    /// Rights category (`a_droit`). Governs the state of the member's cotisation.
    RightsCategory("a_droit") {
        AyantDroit => "ayant_droit",
        SansDroit => "sans_droit",
    }
}

text_enum! {
    /// Employer organisation, also used for the cotisation section.
    Organisme("organisme") {
        Anp => "anp",
        MarsaMaroc => "marsa_maroc",
        Modep => "modep",
    }
}

impl RightsCategory {
    pub fn has_rights(self) -> bool {
        self == Self::AyantDroit
    }
}

/// Display code derived from the member id, e.g. `42` -> `"000042"`.
///
/// Ids wider than [`NAX_WIDTH`] digits are rendered unpadded.
pub fn format_nax(id: DbId) -> String {
    format!("{id:0width$}", width = NAX_WIDTH)
}

/// Parse a `nax` filter value into the member id it encodes.
///
/// Leading zeros are accepted. Returns `None` for anything that is not a
/// non-negative integer, so callers can turn a malformed filter into an
/// empty result instead of an error.
pub fn parse_nax(value: &str) -> Option<DbId> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
