//! Reimbursement claim ("soin") value types.

use crate::types::text_enum;

/// Beneficiary recorded when the caller does not specify one.
pub const DEFAULT_BENEFICIARY: &str = "Adherent";

text_enum! {
    /// Processing status of the claim dossier.
    DossierStatus("statut_dossier") {
        Recu => "recu",
        Rejet => "rejet",
    }
}
