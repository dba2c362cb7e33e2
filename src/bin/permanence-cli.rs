#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use permanence::{
    calendar::WorkCalendar,
    io,
    model::{Period, PeriodPlan},
    storage::{ContinuityStore, JsonStorage},
    worker, Scheduler,
};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des permanences mensuelles
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Afficher les jours ouvrés d'un mois, par semaine
    Calendar {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// liste "YYYY-MM-DD,YYYY-MM-DD,..."
        #[arg(long)]
        holidays: Option<String>,
    },

    /// Afficher les quotas d'une requête
    Quotas {
        /// Requête JSON
        #[arg(long)]
        input: String,
    },

    /// Planifier le mois demandé puis le suivant
    Plan {
        /// Requête JSON
        #[arg(long)]
        input: String,
        /// Graine du tirage (reproductible)
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        crew_size: Option<usize>,
        /// Largeur du vivier mélangé
        #[arg(long)]
        pool: Option<usize>,
        /// Pas de lundi juste après un vendredi de permanence
        #[arg(long)]
        monday_rest: bool,
        /// Uniquement le mois demandé
        #[arg(long)]
        single: bool,
        #[arg(long)]
        out_json: Option<String>,
        /// CSV des équipes (mois demandé)
        #[arg(long)]
        out_csv: Option<String>,
        /// CSV des compteurs (mois demandé)
        #[arg(long)]
        counts_csv: Option<String>,
        /// État de continuité à charger (remplace celui de la requête)
        #[arg(long)]
        continuity_in: Option<String>,
        /// État de continuité à sauvegarder après la dernière période
        #[arg(long)]
        continuity_out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    match cli.cmd {
        Commands::Calendar {
            year,
            month,
            holidays,
        } => {
            let period = Period::new(year, month)?;
            let holidays = parse_holidays(holidays.as_deref())?;
            let calendar = WorkCalendar::resolve(period, &holidays);
            for (idx, week) in calendar.weeks.iter().enumerate() {
                let days: Vec<String> = week
                    .days
                    .iter()
                    .map(|d| d.format("%Y-%m-%d %a").to_string())
                    .collect();
                println!("W{} | {}", idx + 1, days.join(" | "));
            }
            println!("{} workday(s)", calendar.workday_count());
        }
        Commands::Quotas { input } => {
            let request = io::load_request(&input)?;
            let period = request.period()?;
            let scheduler =
                Scheduler::new(request.roster()?, request.options.unwrap_or_default())?;
            let quotas = scheduler.quotas(period, request.continuity.as_ref())?;
            for person in &scheduler.roster().people {
                println!("{person}: {}", quotas.get(person).copied().unwrap_or(0));
            }
        }
        Commands::Plan {
            input,
            seed,
            crew_size,
            pool,
            monday_rest,
            single,
            out_json,
            out_csv,
            counts_csv,
            continuity_in,
            continuity_out,
        } => {
            let mut job = io::load_request(&input)?.into_job()?;
            if let Some(n) = crew_size {
                job.options.crew_size = n;
            }
            if let Some(n) = pool {
                job.options.candidate_pool = n;
            }
            job.options.monday_rest |= monday_rest;
            job.seed = seed;
            if let Some(path) = continuity_in {
                job.continuity = Some(JsonStorage::open(path)?.load()?);
            }

            let plans: Vec<PeriodPlan> = if single {
                let result = worker::plan_independent(vec![job])
                    .pop()
                    .context("planning worker returned nothing")?;
                vec![result?]
            } else {
                let chained = worker::spawn(job)?.join()?;
                vec![chained.current, chained.next]
            };

            let (Some(first), Some(last)) = (plans.first(), plans.last()) else {
                return Ok(());
            };
            for warning in &first.warnings {
                eprintln!("Warning: {warning}");
            }
            for plan in &plans {
                print_plan(plan);
            }

            if let Some(path) = out_json {
                io::export_json(path, &plans)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, first)?;
            }
            if let Some(path) = counts_csv {
                io::export_counts_csv(path, first)?;
            }
            if let Some(path) = continuity_out {
                JsonStorage::open(path)?.save(&last.continuity())?;
            }
        }
    }

    Ok(())
}

fn parse_holidays(raw: Option<&str>) -> Result<BTreeSet<chrono::NaiveDate>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(io::parse_date)
        .collect()
}

fn print_plan(plan: &PeriodPlan) {
    println!("== {}", plan.period);
    for a in &plan.assignments {
        let crew: Vec<&str> = a.crew.iter().map(|p| p.as_str()).collect();
        println!("{} {} | {}", a.date, a.date.format("%a"), crew.join(", "));
    }
    for (person, count) in &plan.duty_counts {
        let quota = plan.quotas.get(person).copied().unwrap_or(0);
        println!("{person}: {count} (quota {quota})");
    }
}
