use crate::model::{AbsenceInterval, PersonId, PlanWarning, Roster};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Index des absences : par personne, intervalles triés et fusionnés.
#[derive(Debug, Default)]
pub struct AvailabilityIndex {
    blocked: HashMap<PersonId, Vec<(NaiveDate, NaiveDate)>>,
}

impl AvailabilityIndex {
    /// Construit l'index et collecte les intervalles ignorés.
    pub fn build(roster: &Roster) -> (Self, Vec<PlanWarning>) {
        let mut warnings = Vec::new();
        let mut blocked: HashMap<PersonId, Vec<(NaiveDate, NaiveDate)>> = HashMap::new();

        for interval in &roster.absences {
            if let Some(warning) = check_interval(roster, interval) {
                log_warn!(%warning, "absence ignored");
                warnings.push(warning);
                continue;
            }
            if let Some(bounds) = interval.bounds() {
                blocked
                    .entry(interval.person.clone())
                    .or_default()
                    .push(bounds);
            }
        }

        for ranges in blocked.values_mut() {
            merge_ranges(ranges);
        }

        (Self { blocked }, warnings)
    }

    /// Disponible si aucun intervalle de la personne ne contient `date` (bornes incluses).
    pub fn available(&self, person: &PersonId, date: NaiveDate) -> bool {
        let Some(ranges) = self.blocked.get(person) else {
            return true;
        };
        // premier intervalle dont la fin est >= date
        let idx = ranges.partition_point(|&(_, to)| to < date);
        ranges.get(idx).map_or(true, |&(from, _)| date < from)
    }
}

fn check_interval(roster: &Roster, interval: &AbsenceInterval) -> Option<PlanWarning> {
    if !roster.contains(&interval.person) {
        return Some(PlanWarning::UnknownPerson {
            person: interval.person.clone(),
        });
    }
    match (interval.from, interval.to) {
        (Some(from), Some(to)) if interval.is_reversed() => Some(PlanWarning::MalformedInterval {
            person: interval.person.clone(),
            from,
            to,
        }),
        _ => None,
    }
}

fn merge_ranges(ranges: &mut Vec<(NaiveDate, NaiveDate)>) {
    ranges.sort_unstable();
    let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(ranges.len());
    for &(from, to) in ranges.iter() {
        match merged.last_mut() {
            Some(last) if from <= last.1 => last.1 = last.1.max(to),
            _ => merged.push((from, to)),
        }
    }
    *ranges = merged;
}
