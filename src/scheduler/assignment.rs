use super::{availability::AvailabilityIndex, quota, PlanOptions, SchedError, Scheduler};
use crate::calendar::WorkCalendar;
use crate::model::{
    ContinuityState, DutyAssignment, DutyCounts, Period, PeriodPlan, PersonId, QuotaTable,
};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::{seq::SliceRandom, Rng};

/// Données figées pendant toute une passe.
struct PassContext<'a> {
    people: &'a [PersonId],
    quotas: Vec<u32>,
    index: &'a AvailabilityIndex,
    opts: PlanOptions,
}

/// État cumulé de la passe, indexé par position dans l'effectif.
#[derive(Debug, Clone)]
struct PassState {
    totals: Vec<u32>,
    taken: Vec<u32>,
    this_week: Vec<bool>,
    friday_crew: Vec<bool>,
    last_friday: Option<NaiveDate>,
    assignments: Vec<DutyAssignment>,
}

impl PassState {
    fn seeded(people: &[PersonId], continuity: Option<&ContinuityState>) -> Self {
        let carried = |p: &PersonId| {
            continuity
                .and_then(|c| c.carried_counts.get(p))
                .copied()
                .unwrap_or(0)
        };
        let was_friday =
            |p: &PersonId| continuity.map_or(false, |c| c.last_friday_crew.contains(p));

        Self {
            totals: people.iter().map(carried).collect(),
            taken: vec![0; people.len()],
            this_week: vec![false; people.len()],
            friday_crew: people.iter().map(was_friday).collect(),
            last_friday: continuity.and_then(|c| c.last_friday),
            assignments: Vec::new(),
        }
    }

    fn start_week(mut self) -> Self {
        self.this_week.iter_mut().for_each(|flag| *flag = false);
        self
    }

    fn eligible(&self, ctx: &PassContext<'_>, day: NaiveDate) -> Vec<usize> {
        let rests_after_friday = match day.weekday() {
            Weekday::Fri => true,
            Weekday::Mon if ctx.opts.monday_rest => self
                .last_friday
                .map_or(false, |fri| day.signed_duration_since(fri).num_days() == 3),
            _ => false,
        };

        (0..ctx.people.len())
            .filter(|&i| !self.this_week[i])
            .filter(|&i| ctx.index.available(&ctx.people[i], day))
            .filter(|&i| !(rests_after_friday && self.friday_crew[i]))
            .filter(|&i| self.taken[i] < ctx.quotas[i])
            .collect()
    }

    fn commit_day<R: Rng + ?Sized>(
        mut self,
        ctx: &PassContext<'_>,
        day: NaiveDate,
        rng: &mut R,
    ) -> Result<Self, SchedError> {
        let mut eligible = self.eligible(ctx, day);
        let required = ctx.opts.crew_size;
        if eligible.len() < required {
            log_warn!(%day, eligible = eligible.len(), required, "infeasible day");
            return Err(SchedError::InfeasibleDay {
                date: day,
                eligible: eligible.len(),
                required,
            });
        }

        // charge de la période ; tri stable, à égalité l'ordre de l'effectif est conservé
        eligible.sort_by_key(|&i| self.taken[i]);
        let width = eligible.len().min(ctx.opts.candidate_pool);
        let pool = &mut eligible[..width];
        pool.shuffle(rng);
        let mut crew = pool[..required].to_vec();
        crew.sort_unstable();

        for &i in &crew {
            self.totals[i] += 1;
            self.taken[i] += 1;
            self.this_week[i] = true;
        }
        if day.weekday() == Weekday::Fri {
            self.friday_crew = vec![false; ctx.people.len()];
            crew.iter().for_each(|&i| self.friday_crew[i] = true);
            self.last_friday = Some(day);
        }

        let crew: Vec<PersonId> = crew.iter().map(|&i| ctx.people[i].clone()).collect();
        log_debug!(%day, crew = ?crew, "day committed");
        self.assignments.push(DutyAssignment { date: day, crew });
        Ok(self)
    }

    fn into_plan(self, period: Period, people: &[PersonId], quotas: QuotaTable) -> PeriodPlan {
        let by_person = |values: &[u32]| -> DutyCounts {
            people.iter().cloned().zip(values.iter().copied()).collect()
        };
        PeriodPlan {
            period,
            duty_counts: by_person(&self.totals),
            period_counts: by_person(&self.taken),
            last_friday_crew: people
                .iter()
                .zip(&self.friday_crew)
                .filter(|(_, on)| **on)
                .map(|(p, _)| p.clone())
                .collect(),
            last_friday: self.last_friday,
            assignments: self.assignments,
            quotas,
            warnings: Vec::new(),
        }
    }
}

/// Passe hebdomadaire complète sur une période : semaine par semaine, jour par jour.
pub(super) fn plan_period<R: Rng + ?Sized>(
    scheduler: &Scheduler,
    period: Period,
    continuity: Option<&ContinuityState>,
    rng: &mut R,
) -> Result<PeriodPlan, SchedError> {
    let people = scheduler.roster.people.as_slice();
    let calendar = WorkCalendar::resolve(period, &scheduler.roster.holidays);
    let quotas = quota::plan_quotas(
        people,
        calendar.workday_count(),
        scheduler.options.crew_size,
        continuity.map(|c| &c.previous_counts),
    )?;

    let ctx = PassContext {
        people,
        quotas: people.iter().map(|p| quotas[p]).collect(),
        index: &scheduler.index,
        opts: scheduler.options,
    };

    let state = calendar
        .weeks
        .iter()
        .try_fold(PassState::seeded(people, continuity), |state, week| {
            week.days
                .iter()
                .try_fold(state.start_week(), |state, &day| state.commit_day(&ctx, day, &mut *rng))
        })?;

    let mut plan = state.into_plan(period, people, quotas);
    plan.warnings = scheduler.warnings.clone();
    log_info!(
        period = %period,
        days = plan.assignments.len(),
        "period planned"
    );
    Ok(plan)
}
