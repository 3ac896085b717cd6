//! Cotisation lifecycle transition rules.
//!
//! A member's rights category (`a_droit`) and their cotisation status are
//! kept in sync in both directions:
//!
//! ```text
//! member write        --apply_rights_change-->  cotisation mutation
//! cotisation write    --apply_status_change-->  member rights category
//! ```
//!
//! Every write carries a [`TransitionOrigin`]. A write that is itself the
//! cascade of the opposite side does not cascade back, so one logical
//! transition produces at most one write per table.
//!
//! These functions only decide. The database layer applies the decision
//! inside a single transaction.

use crate::adherent::RightsCategory;
use crate::cotisation::{contribution_end_date, initial_end_date, CotisationStatus, WindowRule};
use crate::types::Date;

/// Where a write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    /// Issued by an API caller.
    External,
    /// Produced by a member write cascading into the cotisation table.
    CascadedFromMember,
    /// Produced by a cotisation write cascading into the member table.
    CascadedFromContribution,
}

/// Inputs fixed for the duration of one lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Window of the cotisation opened at member creation.
    pub window_rule: WindowRule,
    /// The date used for "starts now" transitions.
    pub today: Date,
}

impl LifecyclePolicy {
    /// Policy for an operation happening now, on the local calendar.
    pub fn now(window_rule: WindowRule) -> Self {
        Self {
            window_rule,
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// Persisted shape of a cotisation, with `date_fin` always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionState {
    pub status: CotisationStatus,
    pub date_debut: Option<Date>,
    pub date_fin: Option<Date>,
}

impl ContributionState {
    pub fn new(status: CotisationStatus, date_debut: Option<Date>) -> Self {
        Self {
            status,
            date_debut,
            date_fin: contribution_end_date(date_debut),
        }
    }

    /// State of the cotisation opened when a member is created.
    pub fn initial(status: CotisationStatus, date_debut: Option<Date>, rule: WindowRule) -> Self {
        Self {
            status,
            date_debut,
            date_fin: initial_end_date(date_debut, rule),
        }
    }

    /// `non`, no dates.
    pub fn inactive() -> Self {
        Self {
            status: CotisationStatus::Non,
            date_debut: None,
            date_fin: None,
        }
    }
}

/// What must happen to a member's cotisation after a member write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionMutation {
    /// Leave the cotisation untouched.
    Unchanged,
    /// First cotisation for a newly created member.
    Create {
        status: CotisationStatus,
        date_debut: Option<Date>,
    },
    /// Set `oui` and restart the window at `date_debut`.
    Activate { date_debut: Date },
    /// Set `non` and clear both dates.
    Deactivate,
}

impl ContributionMutation {
    /// The cotisation state this mutation writes, or `None` for
    /// [`ContributionMutation::Unchanged`].
    ///
    /// `initial_rule` only applies to [`ContributionMutation::Create`].
    pub fn target_state(self, initial_rule: WindowRule) -> Option<ContributionState> {
        match self {
            Self::Unchanged => None,
            Self::Create { status, date_debut } => Some(ContributionState::initial(
                status,
                date_debut,
                initial_rule,
            )),
            Self::Activate { date_debut } => Some(ContributionState::new(
                CotisationStatus::Oui,
                Some(date_debut),
            )),
            Self::Deactivate => Some(ContributionState::inactive()),
        }
    }

    /// Whether this mutation requires an existing cotisation row.
    ///
    /// Activate/Deactivate on a member without a cotisation are skipped.
    pub fn requires_existing(self) -> bool {
        matches!(self, Self::Activate { .. } | Self::Deactivate)
    }
}

/// Decide the cotisation mutation for a member write.
///
/// `old` is the persisted rights category before the write, `None` when the
/// member is being created.
pub fn apply_rights_change(
    old: Option<RightsCategory>,
    new: RightsCategory,
    recruitment_date: Option<Date>,
    today: Date,
) -> ContributionMutation {
    match (old, new) {
        (None, RightsCategory::AyantDroit) => ContributionMutation::Create {
            status: CotisationStatus::Oui,
            date_debut: Some(recruitment_date.unwrap_or(today)),
        },
        (None, RightsCategory::SansDroit) => ContributionMutation::Create {
            status: CotisationStatus::Non,
            date_debut: None,
        },
        (Some(old), new) if old == new => ContributionMutation::Unchanged,
        (Some(_), RightsCategory::AyantDroit) => ContributionMutation::Activate { date_debut: today },
        (Some(_), RightsCategory::SansDroit) => ContributionMutation::Deactivate,
    }
}

/// [`apply_rights_change`] guarded by the write origin.
pub fn member_transition(
    origin: TransitionOrigin,
    old: Option<RightsCategory>,
    new: RightsCategory,
    recruitment_date: Option<Date>,
    today: Date,
) -> ContributionMutation {
    if origin == TransitionOrigin::CascadedFromContribution {
        return ContributionMutation::Unchanged;
    }
    apply_rights_change(old, new, recruitment_date, today)
}

/// Decide the member rights category after a cotisation status write.
///
/// Returns `None` when the status flag did not change.
pub fn apply_status_change(
    old: CotisationStatus,
    new: CotisationStatus,
) -> Option<RightsCategory> {
    if old == new {
        return None;
    }
    Some(match new {
        CotisationStatus::Oui => RightsCategory::AyantDroit,
        CotisationStatus::Non => RightsCategory::SansDroit,
    })
}

/// [`apply_status_change`] guarded by the write origin.
pub fn contribution_transition(
    origin: TransitionOrigin,
    old: CotisationStatus,
    new: CotisationStatus,
) -> Option<RightsCategory> {
    if origin == TransitionOrigin::CascadedFromMember {
        return None;
    }
    apply_status_change(old, new)
}
