use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifiant fort pour une personne (son nom, tel que saisi).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origine d'une absence. Les deux bloquent de la même façon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// Affecté ailleurs (bureau, mission).
    Reassigned,
    /// En congé.
    Leave,
}

/// Période d'absence, bornes incluses. Une borne manquante rend l'intervalle inerte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceInterval {
    pub person: PersonId,
    pub kind: AbsenceKind,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AbsenceInterval {
    pub fn new(person: PersonId, kind: AbsenceKind, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            person,
            kind,
            from: Some(from),
            to: Some(to),
        }
    }

    /// Bornes exploitables, `None` si l'intervalle est ouvert ou inversé.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from <= to => Some((from, to)),
            _ => None,
        }
    }

    /// Vrai quand les deux bornes existent mais `to < from`.
    pub fn is_reversed(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if to < from)
    }
}

/// Instantané d'entrée : effectif ordonné, absences et jours fériés.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub people: Vec<PersonId>,
    #[serde(default)]
    pub absences: Vec<AbsenceInterval>,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            people: names.into_iter().map(PersonId::new).collect(),
            ..Self::default()
        }
    }

    pub fn with_absence(mut self, interval: AbsenceInterval) -> Self {
        self.absences.push(interval);
        self
    }

    pub fn with_holidays<I: IntoIterator<Item = NaiveDate>>(mut self, days: I) -> Self {
        self.holidays.extend(days);
        self
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.people.iter().any(|p| p == id)
    }

    /// Refuse un effectif vide, des noms vides ou des doublons.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.people.is_empty() {
            return Err(SchedError::EmptyRoster);
        }
        let mut seen = BTreeSet::new();
        for person in &self.people {
            if person.as_str().trim().is_empty() {
                return Err(SchedError::BlankPerson);
            }
            if !seen.insert(person) {
                return Err(SchedError::DuplicatePerson(person.as_str().to_string()));
            }
        }
        Ok(())
    }
}

/// Mois calendaire planifié.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, SchedError> {
        if !(1..=12).contains(&month) {
            return Err(SchedError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(SchedError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Mois suivant (décembre → janvier de l'année suivante).
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Tous les jours du mois, dans l'ordre.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month;
        NaiveDate::from_ymd_opt(self.year, month, 1)
            .into_iter()
            .flat_map(|first| first.iter_days())
            .take_while(move |d| d.month() == month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Équipe d'un jour ouvré, stockée dans l'ordre de l'effectif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyAssignment {
    pub date: NaiveDate,
    pub crew: Vec<PersonId>,
}

pub type DutyCounts = BTreeMap<PersonId, u32>;
pub type QuotaTable = BTreeMap<PersonId, u32>;

/// Seul état transmis d'une période à la suivante.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityState {
    #[serde(default)]
    pub last_friday_crew: BTreeSet<PersonId>,
    /// Totaux cumulés depuis le premier mois de la chaîne.
    #[serde(default)]
    pub carried_counts: DutyCounts,
    /// Permanences de la seule période précédente : plancher des quotas suivants.
    #[serde(default)]
    pub previous_counts: DutyCounts,
    /// Date du vendredi suivi, si connue (règle du lundi).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_friday: Option<NaiveDate>,
}

/// Anomalie d'entrée non bloquante, remontée à l'appelant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    MalformedInterval {
        person: PersonId,
        from: NaiveDate,
        to: NaiveDate,
    },
    UnknownPerson {
        person: PersonId,
    },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInterval { person, from, to } => {
                write!(f, "ignored absence for {person}: {to} is before {from}")
            }
            Self::UnknownPerson { person } => {
                write!(f, "ignored absence for {person}: not in roster")
            }
        }
    }
}

/// Résultat complet d'une période.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPlan {
    pub period: Period,
    pub assignments: Vec<DutyAssignment>,
    pub quotas: QuotaTable,
    /// Compteurs cumulés (report éventuel inclus).
    pub duty_counts: DutyCounts,
    /// Permanences prises sur cette seule période.
    pub period_counts: DutyCounts,
    pub last_friday_crew: BTreeSet<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_friday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
}

impl PeriodPlan {
    pub fn assignment_on(&self, date: NaiveDate) -> Option<&DutyAssignment> {
        self.assignments.iter().find(|a| a.date == date)
    }
}

/// Période demandée + période suivante, chaînées.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedPlan {
    pub current: PeriodPlan,
    pub next: PeriodPlan,
}
