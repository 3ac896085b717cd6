//! Reimbursement claim ("soin") entity model and DTOs.

use mutuelle_core::soin::DossierStatus;
use mutuelle_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::adherent::Adherent;
use super::check_amount;

/// A row from the `soins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Soin {
    pub id: DbId,
    pub adherent_id: DbId,
    pub num_recu: String,
    #[sqlx(try_from = "String")]
    pub statut_dossier: DossierStatus,
    pub montant_dossier: Decimal,
    pub type_beneficier: String,
    pub date_soin: Date,
    pub date_fin_soin: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A claim with its owning member embedded, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SoinWithAdherent {
    #[serde(flatten)]
    pub soin: Soin,
    pub adherent: Adherent,
}

/// DTO for creating a claim.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSoin {
    pub adherent_id: DbId,
    #[validate(length(min = 1, max = 50))]
    pub num_recu: String,
    pub statut_dossier: DossierStatus,
    #[validate(custom(function = "check_amount"))]
    pub montant_dossier: Decimal,
    /// Defaults to `Adherent` when omitted.
    #[validate(length(min = 1, max = 100))]
    pub type_beneficier: Option<String>,
    pub date_soin: Date,
    pub date_fin_soin: Date,
}

/// DTO for updating a claim. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_update_amount"))]
pub struct UpdateSoin {
    pub adherent_id: Option<DbId>,
    #[validate(length(min = 1, max = 50))]
    pub num_recu: Option<String>,
    pub statut_dossier: Option<DossierStatus>,
    pub montant_dossier: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub type_beneficier: Option<String>,
    pub date_soin: Option<Date>,
    pub date_fin_soin: Option<Date>,
}

fn check_update_amount(input: &UpdateSoin) -> Result<(), ValidationError> {
    match &input.montant_dossier {
        Some(amount) => check_amount(amount),
        None => Ok(()),
    }
}

/// Query filters for `GET /soins`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoinFilter {
    /// Exact member `cin`.
    #[serde(rename = "adherent__cin")]
    pub adherent_cin: Option<String>,
    /// Case-insensitive substring of the member's last name.
    #[serde(rename = "adherent__nom")]
    pub adherent_nom: Option<String>,
    /// Case-insensitive substring of the member's first name.
    #[serde(rename = "adherent__prenom")]
    pub adherent_prenom: Option<String>,
    /// Exact member `nax`.
    #[serde(rename = "adherent__nax")]
    pub adherent_nax: Option<String>,
    /// Case-insensitive substring of the receipt number.
    pub num_recu: Option<String>,
    pub statut_dossier: Option<DossierStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
