use super::{assignment, SchedError, Scheduler};
use crate::model::{ChainedPlan, ContinuityState, Period, PeriodPlan};
use rand::Rng;

impl From<&PeriodPlan> for ContinuityState {
    /// Compteurs et équipe du dernier vendredi, à transmettre à la période suivante.
    ///
    /// Une période sans jour ouvré laisse passer le plancher reçu (ses quotas).
    fn from(plan: &PeriodPlan) -> Self {
        let previous_counts = if plan.assignments.is_empty() {
            plan.quotas.clone()
        } else {
            plan.period_counts.clone()
        };
        Self {
            last_friday_crew: plan.last_friday_crew.clone(),
            carried_counts: plan.duty_counts.clone(),
            previous_counts,
            last_friday: plan.last_friday,
        }
    }
}

impl PeriodPlan {
    pub fn continuity(&self) -> ContinuityState {
        ContinuityState::from(self)
    }
}

/// Planifie `period` puis le mois suivant, ce dernier contraint par l'état final du premier.
pub(super) fn plan_with_next<R: Rng + ?Sized>(
    scheduler: &Scheduler,
    period: Period,
    continuity: Option<&ContinuityState>,
    rng: &mut R,
) -> Result<ChainedPlan, SchedError> {
    let current = assignment::plan_period(scheduler, period, continuity, rng)?;
    let handover = current.continuity();
    let next = assignment::plan_period(scheduler, period.next(), Some(&handover), rng)?;
    Ok(ChainedPlan { current, next })
}
