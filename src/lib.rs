#![forbid(unsafe_code)]
//! Permanence — moteur de planification des permanences quotidiennes d'un mois.
//!
//! - Jours ouvrés (lundi–vendredi, hors fériés), découpés en semaines ISO.
//! - Quotas équitables, plafond d'une permanence par personne et par semaine.
//! - Pas deux vendredis de suite pour la même personne, y compris d'un mois à l'autre.
//! - Continuité : compteurs et équipe du dernier vendredi transmis au mois suivant.
//! - Calcul pur, tirage injectable ; exécution isolée dans `worker`.

#[macro_use]
mod log;

pub mod calendar;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod worker;

pub use calendar::{Week, WorkCalendar};
pub use model::{
    AbsenceInterval, AbsenceKind, ChainedPlan, ContinuityState, DutyAssignment, DutyCounts,
    Period, PeriodPlan, PersonId, PlanWarning, QuotaTable, Roster,
};
pub use scheduler::{plan_quotas, PlanOptions, SchedError, Scheduler};
pub use storage::{ContinuityStore, JsonStorage};
pub use worker::{plan_independent, spawn, PlanHandle, PlanJob};
