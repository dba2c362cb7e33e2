use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options de planification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    /// Taille de l'équipe quotidienne.
    pub crew_size: usize,
    /// Largeur du vivier des moins chargés, mélangé avant sélection.
    pub candidate_pool: usize,
    /// Exclut le lundi l'équipe du vendredi précédent.
    pub monday_rest: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            crew_size: 4,
            candidate_pool: 6,
            monday_rest: false,
        }
    }
}

impl PlanOptions {
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.crew_size == 0 {
            return Err(SchedError::InvalidOptions("crew_size must be > 0"));
        }
        if self.candidate_pool < self.crew_size {
            return Err(SchedError::InvalidOptions(
                "candidate_pool must be >= crew_size",
            ));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("roster is empty")]
    EmptyRoster,
    #[error("roster contains a blank name")]
    BlankPerson,
    #[error("duplicate person in roster: {0}")]
    DuplicatePerson(String),
    #[error("not enough people on {date}: {eligible} eligible, {required} required")]
    InfeasibleDay {
        date: NaiveDate,
        eligible: usize,
        required: usize,
    },
    #[error("invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),
    #[error("year out of range: {0}")]
    InvalidYear(i32),
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
    #[error("planning worker panicked: {0}")]
    WorkerPanicked(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    /// Date bloquante, pour les erreurs d'infaisabilité.
    pub fn infeasible_date(&self) -> Option<NaiveDate> {
        match self {
            Self::InfeasibleDay { date, .. } => Some(*date),
            _ => None,
        }
    }
}
