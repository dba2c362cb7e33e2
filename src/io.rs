use crate::model::{
    AbsenceInterval, AbsenceKind, ContinuityState, Period, PeriodPlan, PersonId, Roster,
};
use crate::scheduler::PlanOptions;
use crate::worker::PlanJob;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Requête JSON fournie par la couche de saisie.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub month: u32,
    pub year: i32,
    pub roster: Vec<String>,
    #[serde(default)]
    pub reassigned_elsewhere: BTreeMap<String, Vec<RangeSpec>>,
    #[serde(default)]
    pub on_leave: BTreeMap<String, Vec<RangeSpec>>,
    #[serde(default)]
    pub holidays: Vec<String>,
    #[serde(default)]
    pub continuity: Option<ContinuityState>,
    #[serde(default)]
    pub options: Option<PlanOptions>,
}

/// Plage d'absence : texte (`2025-09-01`, `2025-09-01..2025-09-05`, `A/B`) ou bornes explicites.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    Text(String),
    Bounds {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
    },
}

impl PlanRequest {
    pub fn period(&self) -> anyhow::Result<Period> {
        Ok(Period::new(self.year, self.month)?)
    }

    pub fn roster(&self) -> anyhow::Result<Roster> {
        let mut roster = Roster::new(self.roster.iter().map(|n| n.trim()));
        for (kind, entries) in [
            (AbsenceKind::Reassigned, &self.reassigned_elsewhere),
            (AbsenceKind::Leave, &self.on_leave),
        ] {
            for (name, ranges) in entries {
                for range in ranges {
                    let (from, to) = parse_range(range)
                        .with_context(|| format!("invalid absence range for {name}"))?;
                    roster.absences.push(AbsenceInterval {
                        person: PersonId::new(name.trim()),
                        kind,
                        from,
                        to,
                    });
                }
            }
        }
        for raw in &self.holidays {
            roster.holidays.insert(parse_date(raw).context("invalid holiday")?);
        }
        Ok(roster)
    }

    /// Convertit en job ; les options de la requête servent de base.
    pub fn into_job(self) -> anyhow::Result<PlanJob> {
        let mut job = PlanJob::new(self.roster()?, self.period()?)
            .with_options(self.options.unwrap_or_default());
        job.continuity = self.continuity;
        Ok(job)
    }
}

pub fn parse_request(json: &str) -> anyhow::Result<PlanRequest> {
    serde_json::from_str(json).context("parsing plan request")
}

pub fn load_request<P: AsRef<Path>>(path: P) -> anyhow::Result<PlanRequest> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_bound(raw: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}

/// Bornes d'une plage ; un côté vide donne `None` (plage inerte).
pub fn parse_range(range: &RangeSpec) -> anyhow::Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    match range {
        RangeSpec::Bounds { from, to } => {
            Ok((parse_bound(from.as_deref())?, parse_bound(to.as_deref())?))
        }
        RangeSpec::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                bail!("empty range");
            }
            match text.split_once("..").or_else(|| text.split_once('/')) {
                Some((from, to)) => Ok((parse_bound(Some(from))?, parse_bound(Some(to))?)),
                None => {
                    let day = parse_date(text)?;
                    Ok((Some(day), Some(day)))
                }
            }
        }
    }
}

/// Export JSON (jolie mise en forme)
pub fn export_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

/// CSV des équipes : header `date,weekday,crew` (noms séparés par `;`)
pub fn write_assignments_csv<W: Write>(out: W, plan: &PeriodPlan) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["date", "weekday", "crew"])?;
    for a in &plan.assignments {
        let date = a.date.format("%Y-%m-%d").to_string();
        let weekday = a.date.format("%a").to_string();
        let crew = a
            .crew
            .iter()
            .map(PersonId::as_str)
            .collect::<Vec<_>>()
            .join(";");
        w.write_record([date.as_str(), weekday.as_str(), crew.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// CSV des compteurs : header `person,quota,period_count,total`
pub fn write_counts_csv<W: Write>(out: W, plan: &PeriodPlan) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["person", "quota", "period_count", "total"])?;
    let mut quota = itoa::Buffer::new();
    let mut taken = itoa::Buffer::new();
    let mut total = itoa::Buffer::new();
    for (person, &count) in &plan.duty_counts {
        w.write_record([
            person.as_str(),
            quota.format(plan.quotas.get(person).copied().unwrap_or(0)),
            taken.format(plan.period_counts.get(person).copied().unwrap_or(0)),
            total.format(count),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_assignments_csv<P: AsRef<Path>>(path: P, plan: &PeriodPlan) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_assignments_csv(file, plan)
}

pub fn export_counts_csv<P: AsRef<Path>>(path: P, plan: &PeriodPlan) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_counts_csv(file, plan)
}
