//! Contribution ("cotisation") entity model and DTOs.

use mutuelle_core::adherent::RightsCategory;
use mutuelle_core::cotisation::CotisationStatus;
use mutuelle_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::double_option;

/// A row from the `cotisations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cotisation {
    pub id: DbId,
    pub adherent_id: DbId,
    #[sqlx(try_from = "String")]
    pub cotisation: CotisationStatus,
    /// Copy of the owning member's `cin`.
    pub cin: String,
    pub date_debut: Option<Date>,
    /// Always derived from `date_debut`.
    pub date_fin: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A cotisation joined with the member fields shown next to it in listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CotisationDetail {
    pub id: DbId,
    pub adherent_id: DbId,
    pub nom: String,
    pub prenom: String,
    pub cin: String,
    pub nax: String,
    pub rib: String,
    pub date_recrutement: Option<Date>,
    #[sqlx(try_from = "String")]
    pub a_droit: RightsCategory,
    #[sqlx(try_from = "String")]
    pub cotisation: CotisationStatus,
    pub date_debut: Option<Date>,
    pub date_fin: Option<Date>,
}

/// DTO for creating a cotisation explicitly through the API.
///
/// `cin` is copied from the member; `date_fin` is computed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCotisation {
    pub adherent_id: DbId,
    pub cotisation: CotisationStatus,
    pub date_debut: Option<Date>,
}

/// DTO for updating a cotisation. Absent fields are left unchanged.
///
/// `date_debut: null` clears the window. Any `date_fin` sent by the caller
/// is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCotisation {
    pub cotisation: Option<CotisationStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_debut: Option<Option<Date>>,
}

/// Query filters for `GET /cotisations`.
///
/// Values are kept as raw strings: malformed values narrow or are ignored
/// rather than failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CotisationFilter {
    /// Case-insensitive substring of the member's `cin`.
    pub cin: Option<String>,
    /// Member id, zero padding allowed. Non-numeric values match nothing.
    pub nax: Option<String>,
    /// `oui` or `non`, case-insensitive. Other values are ignored.
    pub cotisation: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_date_debut_leaves_window_alone() {
        let input: UpdateCotisation = serde_json::from_str(r#"{"cotisation": "non"}"#).unwrap();
        assert_eq!(input.cotisation, Some(CotisationStatus::Non));
        assert_eq!(input.date_debut, None);
    }

    #[test]
    fn null_date_debut_clears_window() {
        let input: UpdateCotisation = serde_json::from_str(r#"{"date_debut": null}"#).unwrap();
        assert_eq!(input.date_debut, Some(None));
    }

    #[test]
    fn caller_supplied_date_fin_is_ignored() {
        let input: UpdateCotisation =
            serde_json::from_str(r#"{"date_debut": "2024-03-15", "date_fin": "2030-01-01"}"#)
                .unwrap();
        assert_eq!(
            input.date_debut,
            Some(Some(Date::from_ymd_opt(2024, 3, 15).unwrap()))
        );
    }
}
