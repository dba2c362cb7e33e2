//! Résolution du calendrier : jours ouvrés d'un mois, découpés en semaines.

use crate::model::Period;
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Jours ouvrés consécutifs partageant le même lundi de référence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub days: Vec<NaiveDate>,
}

/// Jours ouvrés d'une période (lundi–vendredi, hors fériés).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    pub period: Period,
    pub weeks: Vec<Week>,
}

impl WorkCalendar {
    pub fn resolve(period: Period, holidays: &BTreeSet<NaiveDate>) -> Self {
        let weeks = split_weeks(&workdays(period, holidays));
        Self { period, weeks }
    }

    pub fn workdays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().flat_map(|w| w.days.iter().copied())
    }

    pub fn workday_count(&self) -> usize {
        self.weeks.iter().map(|w| w.days.len()).sum()
    }
}

pub fn is_workday(date: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&date)
}

pub fn workdays(period: Period, holidays: &BTreeSet<NaiveDate>) -> Vec<NaiveDate> {
    period.days().filter(|d| is_workday(*d, holidays)).collect()
}

/// Regroupe par semaine ISO (ancrée au lundi).
///
/// Un lundi férié ouvre quand même une nouvelle semaine : couper sur le seul lundi
/// ouvré rattacherait le mardi–vendredi suivant à la semaine précédente, et le plafond
/// hebdomadaire déborderait sur deux semaines civiles.
pub fn split_weeks(days: &[NaiveDate]) -> Vec<Week> {
    let mut weeks: Vec<Week> = Vec::new();
    for &day in days {
        match weeks.last_mut() {
            Some(week) if same_week(week.days[0], day) => week.days.push(day),
            _ => weeks.push(Week { days: vec![day] }),
        }
    }
    weeks
}

fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    a.iso_week() == b.iso_week()
}
