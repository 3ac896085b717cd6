//! Transactional write path for members and their cotisations.
//!
//! Every operation runs in one transaction:
//!
//! ```text
//! lock member -> write member -> decide cotisation delta -> apply delta
//! lock member -> lock cotisation -> write cotisation -> decide member delta -> apply delta
//! ```
//!
//! Rows are always locked member first, cotisation second, so concurrent
//! rights changes on the same member serialize instead of deadlocking.
//! The decisions themselves live in [`mutuelle_core::lifecycle`].

use mutuelle_core::lifecycle::{
    contribution_transition, member_transition, ContributionMutation, ContributionState,
    LifecyclePolicy, TransitionOrigin,
};
use mutuelle_core::types::DbId;
use sqlx::PgConnection;

use crate::models::adherent::{Adherent, CreateAdherent, UpdateAdherent};
use crate::models::cotisation::{Cotisation, CreateCotisation, UpdateCotisation};
use crate::repositories::{AdherentRepo, CotisationRepo};
use crate::DbPool;

/// Member and cotisation writes that keep `a_droit` and `cotisation` in sync.
pub struct CotisationLifecycle;

impl CotisationLifecycle {
    /// Create a member together with its initial cotisation.
    pub async fn create_adherent(
        pool: &DbPool,
        input: &CreateAdherent,
        policy: LifecyclePolicy,
    ) -> Result<(Adherent, Cotisation), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let adherent = AdherentRepo::insert(&mut *tx, input).await?;

        let mutation = member_transition(
            TransitionOrigin::External,
            None,
            adherent.a_droit,
            adherent.date_recrutement,
            policy.today,
        );
        let state = mutation
            .target_state(policy.window_rule)
            .unwrap_or_else(ContributionState::inactive);
        let cotisation =
            CotisationRepo::upsert_for_adherent(&mut *tx, adherent.id, &adherent.cin, &state)
                .await?;

        tx.commit().await?;

        tracing::info!(
            adherent_id = adherent.id,
            nax = %adherent.nax,
            a_droit = %adherent.a_droit,
            cotisation_id = cotisation.id,
            cotisation = %cotisation.cotisation,
            "Adherent created",
        );
        Ok((adherent, cotisation))
    }

    /// Apply a partial update to a member and cascade a rights change into
    /// the member's current cotisation.
    ///
    /// Returns `None` if the member does not exist.
    pub async fn update_adherent(
        pool: &DbPool,
        id: DbId,
        input: &UpdateAdherent,
        policy: LifecyclePolicy,
    ) -> Result<Option<Adherent>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(before) = AdherentRepo::find_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let Some(after) = AdherentRepo::update(&mut *tx, id, input).await? else {
            return Ok(None);
        };

        if after.cin != before.cin {
            let synced = CotisationRepo::sync_cin(&mut *tx, id, &after.cin).await?;
            tracing::debug!(adherent_id = id, synced, "Cotisation cin synced");
        }

        let mutation = member_transition(
            TransitionOrigin::External,
            Some(before.a_droit),
            after.a_droit,
            after.date_recrutement,
            policy.today,
        );
        apply_member_mutation(&mut *tx, &after, mutation, policy).await?;

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Update a cotisation, recompute its window and cascade a status change
    /// into the owning member's rights category.
    ///
    /// Returns `None` if the cotisation does not exist.
    pub async fn update_cotisation(
        pool: &DbPool,
        id: DbId,
        input: &UpdateCotisation,
        policy: LifecyclePolicy,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(unlocked) = CotisationRepo::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        let Some(member) = AdherentRepo::find_for_update(&mut *tx, unlocked.adherent_id).await?
        else {
            return Ok(None);
        };
        let Some(before) = CotisationRepo::find_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };

        let status = input.cotisation.unwrap_or(before.cotisation);
        let date_debut = input.date_debut.unwrap_or(before.date_debut);
        let state = ContributionState::new(status, date_debut);

        let Some(after) = CotisationRepo::apply_state(&mut *tx, id, &state).await? else {
            return Ok(None);
        };

        if let Some(rights) =
            contribution_transition(TransitionOrigin::External, before.cotisation, after.cotisation)
        {
            AdherentRepo::set_rights(&mut *tx, member.id, rights).await?;
            tracing::info!(
                adherent_id = member.id,
                cotisation_id = id,
                from = %member.a_droit,
                to = %rights,
                "Rights category follows cotisation status",
            );

            let echo = member_transition(
                TransitionOrigin::CascadedFromContribution,
                Some(member.a_droit),
                rights,
                member.date_recrutement,
                policy.today,
            );
            debug_assert_eq!(echo, ContributionMutation::Unchanged);
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Create a cotisation explicitly. Copies the member's `cin` and computes
    /// the window; the member is not touched.
    ///
    /// Returns `None` if the member does not exist. A second cotisation for
    /// the same member violates `uq_cotisations_cin`.
    pub async fn create_cotisation(
        pool: &DbPool,
        input: &CreateCotisation,
    ) -> Result<Option<Cotisation>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(member) = AdherentRepo::find_for_update(&mut *tx, input.adherent_id).await?
        else {
            return Ok(None);
        };

        let state = ContributionState::new(input.cotisation, input.date_debut);
        let cotisation = CotisationRepo::create(&mut *tx, member.id, &member.cin, &state).await?;

        tx.commit().await?;

        tracing::info!(
            adherent_id = member.id,
            cotisation_id = cotisation.id,
            "Cotisation created",
        );
        Ok(Some(cotisation))
    }
}

/// Write the cotisation side of a member transition.
///
/// `Activate`/`Deactivate` on a member without a cotisation is a no-op.
async fn apply_member_mutation(
    conn: &mut PgConnection,
    member: &Adherent,
    mutation: ContributionMutation,
    policy: LifecyclePolicy,
) -> Result<(), sqlx::Error> {
    let Some(state) = mutation.target_state(policy.window_rule) else {
        return Ok(());
    };

    if !mutation.requires_existing() {
        CotisationRepo::upsert_for_adherent(&mut *conn, member.id, &member.cin, &state).await?;
        return Ok(());
    }

    let Some(current) = CotisationRepo::lock_current_for_adherent(&mut *conn, member.id).await?
    else {
        tracing::debug!(
            adherent_id = member.id,
            ?mutation,
            "No cotisation to update, skipping",
        );
        return Ok(());
    };

    CotisationRepo::apply_state(&mut *conn, current.id, &state).await?;
    tracing::info!(
        adherent_id = member.id,
        cotisation_id = current.id,
        cotisation = %state.status,
        "Cotisation follows rights category",
    );

    let echo = contribution_transition(
        TransitionOrigin::CascadedFromMember,
        current.cotisation,
        state.status,
    );
    debug_assert_eq!(echo, None);
    Ok(())
}
