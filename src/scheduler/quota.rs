use super::SchedError;
use crate::model::{DutyCounts, PersonId, QuotaTable};

/// Répartit `workdays * crew_size` permanences le plus également possible.
///
/// Les `R` premiers de l'effectif (ordre d'entrée) reçoivent une permanence de plus.
/// Avec un report, chaque quota est relevé au compteur de la période précédente.
pub fn plan_quotas(
    people: &[PersonId],
    workdays: usize,
    crew_size: usize,
    previous: Option<&DutyCounts>,
) -> Result<QuotaTable, SchedError> {
    if people.is_empty() {
        return Err(SchedError::EmptyRoster);
    }

    let total = workdays.saturating_mul(crew_size);
    let base = total / people.len();
    let extra = total % people.len();

    let quotas = people
        .iter()
        .enumerate()
        .map(|(idx, person)| {
            let planned = to_count(base + usize::from(idx < extra));
            let floor = previous
                .and_then(|counts| counts.get(person))
                .copied()
                .unwrap_or(0);
            (person.clone(), planned.max(floor))
        })
        .collect();

    Ok(quotas)
}

fn to_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
