//! Exécution isolée : chaque calcul reçoit un instantané complet et rend un résultat complet.

use crate::model::{ChainedPlan, ContinuityState, Period, PeriodPlan, Roster};
use crate::scheduler::{PlanOptions, SchedError, Scheduler};
use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::any::Any;
use std::thread::{self, JoinHandle};

/// Entrée d'un calcul, possédée par le thread qui l'exécute.
#[derive(Debug, Clone)]
pub struct PlanJob {
    pub roster: Roster,
    pub period: Period,
    pub options: PlanOptions,
    /// Graine du tirage ; `None` = entropie système.
    pub seed: Option<u64>,
    pub continuity: Option<ContinuityState>,
}

impl PlanJob {
    pub fn new(roster: Roster, period: Period) -> Self {
        Self {
            roster,
            period,
            options: PlanOptions::default(),
            seed: None,
            continuity: None,
        }
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_continuity(mut self, continuity: ContinuityState) -> Self {
        self.continuity = Some(continuity);
        self
    }

    fn rng(&self) -> ChaCha8Rng {
        self.seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
    }

    /// Période demandée et suivante, séquentiellement.
    pub fn run_chained(self) -> Result<ChainedPlan, SchedError> {
        let mut rng = self.rng();
        let scheduler = Scheduler::new(self.roster, self.options)?;
        scheduler.plan_with_next(self.period, self.continuity.as_ref(), &mut rng)
    }

    pub fn run_single(self) -> Result<PeriodPlan, SchedError> {
        let mut rng = self.rng();
        let scheduler = Scheduler::new(self.roster, self.options)?;
        scheduler.plan_period(self.period, self.continuity.as_ref(), &mut rng)
    }
}

/// Calcul en cours sur un thread dédié.
#[derive(Debug)]
pub struct PlanHandle {
    inner: JoinHandle<Result<ChainedPlan, SchedError>>,
}

impl PlanHandle {
    /// Attend le résultat ; une panique du worker devient `SchedError::WorkerPanicked`.
    pub fn join(self) -> Result<ChainedPlan, SchedError> {
        joined(self.inner.join())
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

/// Lance le calcul chaîné (mois courant + suivant) hors du thread appelant.
pub fn spawn(job: PlanJob) -> Result<PlanHandle, SchedError> {
    let inner = thread::Builder::new()
        .name(format!("permanence-{}", job.period))
        .spawn(move || job.run_chained())
        .context("spawning planning worker")?;
    Ok(PlanHandle { inner })
}

/// Périodes indépendantes (sans continuité entre elles) calculées en parallèle.
/// Les résultats suivent l'ordre des jobs.
pub fn plan_independent(jobs: Vec<PlanJob>) -> Vec<Result<PeriodPlan, SchedError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| scope.spawn(move || job.run_single()))
            .collect();
        handles.into_iter().map(|h| joined(h.join())).collect()
    })
}

fn joined<T>(result: thread::Result<Result<T, SchedError>>) -> Result<T, SchedError> {
    result.unwrap_or_else(|payload| Err(SchedError::WorkerPanicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
