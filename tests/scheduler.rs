#![forbid(unsafe_code)]
use chrono::{Datelike, NaiveDate, Weekday};
use permanence::{
    AbsenceInterval, AbsenceKind, ContinuityState, Period, PeriodPlan, PersonId, PlanOptions,
    Roster, SchedError, Scheduler,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("p{i:02}")).collect()
}

fn pid(i: usize) -> PersonId {
    PersonId::new(format!("p{i:02}"))
}

fn crew(range: std::ops::RangeInclusive<usize>) -> Vec<PersonId> {
    range.map(pid).collect()
}

/// Vivier = taille d'équipe : la sélection ne dépend plus du tirage.
fn strict() -> PlanOptions {
    PlanOptions {
        candidate_pool: 4,
        ..PlanOptions::default()
    }
}

fn september() -> Period {
    Period::new(2025, 9).unwrap()
}

fn assert_plan_invariants(plan: &PeriodPlan, scheduler: &Scheduler) {
    let mut per_week: BTreeMap<_, BTreeSet<PersonId>> = BTreeMap::new();
    for a in &plan.assignments {
        assert_eq!(a.crew.len(), 4, "{}", a.date);
        let distinct: BTreeSet<_> = a.crew.iter().collect();
        assert_eq!(distinct.len(), 4, "{}", a.date);

        let week = per_week.entry(a.date.iso_week()).or_default();
        for p in &a.crew {
            assert!(week.insert(p.clone()), "{p} twice in week of {}", a.date);
            assert!(scheduler.available(p, a.date), "{p} absent on {}", a.date);
        }
    }
    for (person, &taken) in &plan.period_counts {
        assert!(taken <= plan.quotas[person], "{person} over quota");
    }
}

fn fridays(plans: &[&PeriodPlan]) -> Vec<BTreeSet<PersonId>> {
    plans
        .iter()
        .flat_map(|p| p.assignments.iter())
        .filter(|a| a.date.weekday() == Weekday::Fri)
        .map(|a| a.crew.iter().cloned().collect())
        .collect()
}

#[test]
fn strict_pool_rotates_through_roster_in_order() {
    let s = Scheduler::new(Roster::new(names(24)), strict()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let plan = s.plan_period(september(), None, &mut rng).unwrap();

    assert_eq!(plan.assignments.len(), 22);
    assert_eq!(plan.assignment_on(d(2025, 9, 1)).unwrap().crew, crew(1..=4));
    assert_eq!(plan.assignment_on(d(2025, 9, 5)).unwrap().crew, crew(17..=20));
    // semaine 2 : les quatre restants passent en premier
    assert_eq!(plan.assignment_on(d(2025, 9, 8)).unwrap().crew, crew(21..=24));
    assert_eq!(plan.assignment_on(d(2025, 9, 12)).unwrap().crew, crew(13..=16));
    assert_eq!(plan.assignment_on(d(2025, 9, 30)).unwrap().crew, crew(13..=16));

    assert_eq!(plan.last_friday_crew, crew(5..=8).into_iter().collect::<BTreeSet<_>>());
    assert_eq!(plan.last_friday, Some(d(2025, 9, 26)));
    assert_eq!(plan.duty_counts, plan.quotas);
    assert_eq!(plan.period_counts, plan.quotas);
    assert_eq!(plan.duty_counts[&pid(1)], 4);
    assert_eq!(plan.duty_counts[&pid(24)], 3);
    assert_plan_invariants(&plan, &s);
}

#[test]
fn too_few_people_fails_on_first_workday() {
    let s = Scheduler::new(Roster::new(["A", "B", "C"]), PlanOptions::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = s.plan_period(september(), None, &mut rng).unwrap_err();

    match err {
        SchedError::InfeasibleDay {
            date,
            eligible,
            required,
        } => {
            assert_eq!(date, d(2025, 9, 1));
            assert_eq!(eligible, 3);
            assert_eq!(required, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn weekly_cap_makes_small_roster_infeasible_midweek() {
    // 10 personnes : lundi et mardi passent, mercredi il n'en reste que 2
    let s = Scheduler::new(Roster::new(names(10)), strict()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = s.plan_period(september(), None, &mut rng).unwrap_err();
    assert_eq!(err.infeasible_date(), Some(d(2025, 9, 3)));
    assert!(err.to_string().contains("2025-09-03"));
}

#[test]
fn invalid_inputs_are_rejected_before_planning() {
    assert!(matches!(
        Scheduler::new(Roster::default(), PlanOptions::default()),
        Err(SchedError::EmptyRoster)
    ));
    assert!(matches!(
        Scheduler::new(Roster::new(["A", "B", "A"]), PlanOptions::default()),
        Err(SchedError::DuplicatePerson(name)) if name == "A"
    ));
    assert!(matches!(
        Scheduler::new(Roster::new(["A", " "]), PlanOptions::default()),
        Err(SchedError::BlankPerson)
    ));
    let narrow = PlanOptions {
        candidate_pool: 3,
        ..PlanOptions::default()
    };
    assert!(matches!(
        Scheduler::new(Roster::new(names(8)), narrow),
        Err(SchedError::InvalidOptions(_))
    ));
}

#[test]
fn randomized_plans_respect_all_invariants() {
    let roster = Roster::new(names(30))
        .with_absence(AbsenceInterval::new(
            pid(1),
            AbsenceKind::Leave,
            d(2025, 9, 1),
            d(2025, 9, 5),
        ))
        .with_absence(AbsenceInterval::new(
            pid(2),
            AbsenceKind::Reassigned,
            d(2025, 9, 15),
            d(2025, 9, 17),
        ));
    let s = Scheduler::new(roster, PlanOptions::default()).unwrap();

    let mut successes = 0;
    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let Ok(plan) = s.plan_period(september(), None, &mut rng) else {
            continue;
        };
        successes += 1;
        assert_eq!(plan.assignments.len(), 22);
        assert_eq!(plan.quotas.values().sum::<u32>(), 88);
        // la somme des quotas égale la demande : chacun atteint exactement son quota
        assert_eq!(plan.period_counts, plan.quotas);
        assert_plan_invariants(&plan, &s);
        for pair in fridays(&[&plan]).windows(2) {
            assert!(pair[0].is_disjoint(&pair[1]));
        }
    }
    assert!(successes > 0);
}

#[test]
fn same_seed_gives_same_plan() {
    let s = Scheduler::new(Roster::new(names(30)), PlanOptions::default()).unwrap();
    let a = s
        .plan_period(september(), None, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    let b = s
        .plan_period(september(), None, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn chained_periods_carry_counts_and_friday_crew() {
    let s = Scheduler::new(Roster::new(names(24)), strict()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let chain = s.plan_with_next(september(), None, &mut rng).unwrap();

    assert_eq!(chain.next.period, Period::new(2025, 10).unwrap());
    assert_eq!(chain.next.assignments.len(), 23);
    assert_eq!(
        chain.next.assignment_on(d(2025, 10, 1)).unwrap().crew,
        crew(1..=4)
    );
    assert_eq!(
        chain.next.last_friday_crew,
        crew(17..=20).into_iter().collect::<BTreeSet<_>>()
    );

    for person in &s.roster().people {
        let before = chain.current.duty_counts[person];
        let after = chain.next.duty_counts[person];
        assert_eq!(after, before + chain.next.period_counts[person]);
    }
    assert_eq!(chain.next.duty_counts[&pid(1)], 8);
    assert_eq!(chain.next.duty_counts[&pid(24)], 6);
}

#[test]
fn quota_floor_follows_previous_period_only() {
    let s = Scheduler::new(Roster::new(names(24)), strict()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let chain = s.plan_with_next(september(), None, &mut rng).unwrap();
    let handover = chain.next.continuity();
    assert_eq!(handover.carried_counts[&pid(1)], 8);
    assert_eq!(handover.previous_counts[&pid(1)], 4);

    // novembre : 20 jours ouvrés, 80 places ; plancher = octobre seul
    let november = Period::new(2025, 11).unwrap();
    let quotas = s.quotas(november, Some(&handover)).unwrap();
    assert_eq!(quotas[&pid(1)], 4);
    assert_eq!(quotas[&pid(24)], 3);
    assert_eq!(quotas.values().sum::<u32>(), 92);

    let plan = s.plan_period(november, Some(&handover), &mut rng).unwrap();
    assert_eq!(plan.quotas, quotas);
    assert_eq!(plan.assignments.len(), 20);
    assert_eq!(plan.period_counts[&pid(1)], 4);
    assert_eq!(plan.duty_counts[&pid(1)], 12);
    assert_eq!(plan.duty_counts[&pid(24)], 9);
    for person in &s.roster().people {
        assert!(plan.period_counts[person] <= 4);
        assert_eq!(
            plan.duty_counts[person],
            chain.next.duty_counts[person] + plan.period_counts[person]
        );
    }
    assert_plan_invariants(&plan, &s);
}

#[test]
fn randomized_chains_never_repeat_a_friday_crew_member() {
    let s = Scheduler::new(Roster::new(names(30)), PlanOptions::default()).unwrap();

    let mut successes = 0;
    for seed in 0..40 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let Ok(chain) = s.plan_with_next(september(), None, &mut rng) else {
            continue;
        };
        successes += 1;
        assert_plan_invariants(&chain.current, &s);
        assert_plan_invariants(&chain.next, &s);

        let all = fridays(&[&chain.current, &chain.next]);
        for pair in all.windows(2) {
            assert!(pair[0].is_disjoint(&pair[1]), "seed {seed}");
        }
        for person in &s.roster().people {
            assert!(chain.next.duty_counts[person] >= chain.current.duty_counts[person]);
        }
    }
    assert!(successes > 0);
}

#[test]
fn continuity_excludes_last_friday_crew_on_first_friday() {
    let s = Scheduler::new(Roster::new(names(24)), strict()).unwrap();
    let handover = ContinuityState {
        last_friday_crew: crew(17..=20).into_iter().collect(),
        ..ContinuityState::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let plan = s.plan_period(september(), Some(&handover), &mut rng).unwrap();

    let first_friday = &plan.assignment_on(d(2025, 9, 5)).unwrap().crew;
    assert_eq!(first_friday, &crew(21..=24));
}

#[test]
fn monday_rest_skips_previous_friday_crew() {
    let handover = ContinuityState {
        last_friday_crew: crew(1..=4).into_iter().collect(),
        last_friday: Some(d(2025, 8, 29)),
        ..ContinuityState::default()
    };

    let plain = Scheduler::new(Roster::new(names(24)), strict()).unwrap();
    let plan = plain
        .plan_period(september(), Some(&handover), &mut ChaCha8Rng::seed_from_u64(0))
        .unwrap();
    assert_eq!(plan.assignment_on(d(2025, 9, 1)).unwrap().crew, crew(1..=4));

    let rested = Scheduler::new(
        Roster::new(names(24)),
        PlanOptions {
            monday_rest: true,
            ..strict()
        },
    )
    .unwrap();
    let plan = rested
        .plan_period(september(), Some(&handover), &mut ChaCha8Rng::seed_from_u64(0))
        .unwrap();
    assert_eq!(plan.assignment_on(d(2025, 9, 1)).unwrap().crew, crew(5..=8));
}

#[test]
fn empty_calendar_passes_continuity_through() {
    let period = september();
    let roster = Roster::new(names(6)).with_holidays(period.days());
    let s = Scheduler::new(roster, PlanOptions::default()).unwrap();

    let carried: BTreeMap<_, _> = [(pid(1), 12), (pid(2), 11)].into_iter().collect();
    let previous: BTreeMap<_, _> = [(pid(1), 5)].into_iter().collect();
    let handover = ContinuityState {
        last_friday_crew: [pid(2)].into_iter().collect(),
        carried_counts: carried,
        previous_counts: previous,
        last_friday: Some(d(2025, 8, 29)),
    };
    let plan = s
        .plan_period(period, Some(&handover), &mut ChaCha8Rng::seed_from_u64(0))
        .unwrap();

    assert!(plan.assignments.is_empty());
    assert_eq!(plan.quotas[&pid(1)], 5);
    assert_eq!(plan.quotas[&pid(2)], 0);
    let next = plan.continuity();
    assert_eq!(next.carried_counts[&pid(1)], 12);
    assert_eq!(next.carried_counts[&pid(2)], 11);
    assert_eq!(next.carried_counts[&pid(3)], 0);
    assert_eq!(next.previous_counts[&pid(1)], 5);
    assert_eq!(next.previous_counts[&pid(2)], 0);
    assert_eq!(next.last_friday_crew, handover.last_friday_crew);
    assert_eq!(next.last_friday, handover.last_friday);
}
