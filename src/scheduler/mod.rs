mod assignment;
mod availability;
mod continuity;
mod quota;
mod types;

pub use availability::AvailabilityIndex;
pub use quota::plan_quotas;
pub use types::{PlanOptions, SchedError};

use crate::calendar::WorkCalendar;
use crate::model::{
    ChainedPlan, ContinuityState, PersonId, Period, PeriodPlan, PlanWarning, QuotaTable, Roster,
};
use chrono::NaiveDate;
use rand::Rng;

/// Scheduler : instantané figé d'un effectif et de ses absences, prêt à planifier
#[derive(Debug)]
pub struct Scheduler {
    roster: Roster,
    options: PlanOptions,
    index: AvailabilityIndex,
    warnings: Vec<PlanWarning>,
}

impl Scheduler {
    /// Valide l'effectif et les options, puis indexe les absences.
    pub fn new(roster: Roster, options: PlanOptions) -> Result<Self, SchedError> {
        roster.validate()?;
        options.validate()?;
        let (index, warnings) = AvailabilityIndex::build(&roster);
        Ok(Self {
            roster,
            options,
            index,
            warnings,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn options(&self) -> PlanOptions {
        self.options
    }
    /// Absences ignorées à la construction.
    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    pub fn available(&self, person: &PersonId, date: NaiveDate) -> bool {
        self.index.available(person, date)
    }

    pub fn calendar(&self, period: Period) -> WorkCalendar {
        WorkCalendar::resolve(period, &self.roster.holidays)
    }

    pub fn quotas(
        &self,
        period: Period,
        continuity: Option<&ContinuityState>,
    ) -> Result<QuotaTable, SchedError> {
        plan_quotas(
            &self.roster.people,
            self.calendar(period).workday_count(),
            self.options.crew_size,
            continuity.map(|c| &c.previous_counts),
        )
    }

    pub fn plan_period<R: Rng + ?Sized>(
        &self,
        period: Period,
        continuity: Option<&ContinuityState>,
        rng: &mut R,
    ) -> Result<PeriodPlan, SchedError> {
        assignment::plan_period(self, period, continuity, rng)
    }

    pub fn plan_with_next<R: Rng + ?Sized>(
        &self,
        period: Period,
        continuity: Option<&ContinuityState>,
        rng: &mut R,
    ) -> Result<ChainedPlan, SchedError> {
        continuity::plan_with_next(self, period, continuity, rng)
    }
}
