//! Repository for the `cotisations` table.

use mutuelle_core::adherent::parse_nax;
use mutuelle_core::cotisation::CotisationStatus;
use mutuelle_core::lifecycle::ContributionState;
use mutuelle_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::cotisation::{Cotisation, CotisationDetail, CotisationFilter};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, adherent_id, cotisation, cin, date_debut, date_fin, created_at, updated_at";

/// Cotisation columns joined with the member fields shown in listings.
const DETAIL_COLUMNS: &str = "c.id, c.adherent_id, a.nom, a.prenom, c.cin, a.nax, a.rib, \
    a.date_recrutement, a.a_droit, c.cotisation, c.date_debut, c.date_fin";

/// Provides CRUD operations for cotisations.
///
/// Every write takes a [`ContributionState`], whose `date_fin` is already
/// derived from `date_debut`; there is no way to store a free end date.
pub struct CotisationRepo;

impl CotisationRepo {
    /// Insert a cotisation for a member.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
        cin: &str,
        state: &ContributionState,
    ) -> Result<Cotisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO cotisations (adherent_id, cotisation, cin, date_debut, date_fin) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(adherent_id)
            .bind(state.status.as_str())
            .bind(cin)
            .bind(state.date_debut)
            .bind(state.date_fin)
            .fetch_one(executor)
            .await
    }

    /// Insert or replace the cotisation keyed by the member's `cin`.
    ///
    /// Uses `ON CONFLICT (cin) DO UPDATE` so a member never ends up with
    /// two rows, even when two creations race.
    pub async fn upsert_for_adherent(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
        cin: &str,
        state: &ContributionState,
    ) -> Result<Cotisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO cotisations (adherent_id, cotisation, cin, date_debut, date_fin) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (cin) DO UPDATE SET \
                adherent_id = EXCLUDED.adherent_id, \
                cotisation = EXCLUDED.cotisation, \
                date_debut = EXCLUDED.date_debut, \
                date_fin = EXCLUDED.date_fin \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(adherent_id)
            .bind(state.status.as_str())
            .bind(cin)
            .bind(state.date_debut)
            .bind(state.date_fin)
            .fetch_one(executor)
            .await
    }

    /// Find a cotisation by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cotisations WHERE id = $1");
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a cotisation by id and lock the row until the transaction ends.
    pub async fn find_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cotisations WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The member's live cotisation: the most recently created row.
    pub async fn find_current_for_adherent(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cotisations \
             WHERE adherent_id = $1 \
             ORDER BY id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(adherent_id)
            .fetch_optional(executor)
            .await
    }

    /// Like [`Self::find_current_for_adherent`], locking the row until the
    /// transaction ends.
    pub async fn lock_current_for_adherent(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cotisations \
             WHERE adherent_id = $1 \
             ORDER BY id DESC \
             LIMIT 1 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(adherent_id)
            .fetch_optional(executor)
            .await
    }

    /// All cotisations of a member, oldest first.
    pub async fn list_by_adherent(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
    ) -> Result<Vec<Cotisation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cotisations WHERE adherent_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(adherent_id)
            .fetch_all(executor)
            .await
    }

    /// Find a cotisation joined with its member.
    pub async fn find_detail_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<CotisationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM cotisations c \
             JOIN adherents a ON a.id = c.adherent_id \
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CotisationDetail>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List cotisations joined with their members.
    ///
    /// - `cin`: case-insensitive substring of the member's `cin`
    /// - `nax`: member id; a non-numeric value yields an empty list
    /// - `cotisation`: `oui`/`non` (case-insensitive); anything else is ignored
    pub async fn list_details(
        executor: impl PgExecutor<'_>,
        filter: &CotisationFilter,
    ) -> Result<Vec<CotisationDetail>, sqlx::Error> {
        let adherent_id = match filter.nax.as_deref() {
            Some(raw) => match parse_nax(raw) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let status = filter
            .cotisation
            .as_deref()
            .and_then(|raw| raw.trim().to_ascii_lowercase().parse::<CotisationStatus>().ok());

        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.cin.is_some() {
            conditions.push(format!("a.cin ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if adherent_id.is_some() {
            conditions.push(format!("c.adherent_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if status.is_some() {
            conditions.push(format!("c.cotisation = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM cotisations c \
             JOIN adherents a ON a.id = c.adherent_id \
             {where_clause} \
             ORDER BY c.id \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, CotisationDetail>(&query);
        if let Some(ref cin) = filter.cin {
            q = q.bind(format!("%{}%", escape_like(cin)));
        }
        if let Some(id) = adherent_id {
            q = q.bind(id);
        }
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }

        q = q
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset));
        q.fetch_all(executor).await
    }

    /// Overwrite status and window of a cotisation.
    pub async fn apply_state(
        executor: impl PgExecutor<'_>,
        id: DbId,
        state: &ContributionState,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let query = format!(
            "UPDATE cotisations SET cotisation = $2, date_debut = $3, date_fin = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cotisation>(&query)
            .bind(id)
            .bind(state.status.as_str())
            .bind(state.date_debut)
            .bind(state.date_fin)
            .fetch_optional(executor)
            .await
    }

    /// Rewrite the denormalized `cin` on every cotisation of a member.
    pub async fn sync_cin(
        executor: impl PgExecutor<'_>,
        adherent_id: DbId,
        cin: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE cotisations SET cin = $2 WHERE adherent_id = $1 AND cin <> $2",
        )
        .bind(adherent_id)
        .bind(cin)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a cotisation. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cotisations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
