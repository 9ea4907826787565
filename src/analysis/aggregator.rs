//! Passenger aggregation and statistics.
//!
//! Each function is a pure transform from the loaded manifest to an
//! ordered summary table. Output ordering is fully deterministic.

use crate::error::{AnalysisError, Result};
use crate::models::{
    AgeGroup, FamilyFareRow, FareRow, GenderSurvival, NameCount, PassengerRecord, Sex,
    SurvivalRow,
};
use std::collections::{BTreeMap, HashMap};

/// Number of families shown in the fare ranking by default.
pub const DEFAULT_TOP_FAMILIES: usize = 10;

/// Ticket classes considered by the family fare ranking.
const VALID_CLASSES: [u8; 3] = [1, 2, 3];

fn ensure_not_empty(records: &[PassengerRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    Ok(())
}

/// Fraction of a group that survived; `None` for an empty group.
fn survival_rate(survivors: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| survivors as f64 / total as f64)
}

/// Survival counts by `(Pclass, Sex, AgeGroup)`, sorted by that key.
pub fn survival_demographics(records: &[PassengerRecord]) -> Result<Vec<SurvivalRow>> {
    ensure_not_empty(records)?;

    // (total, survivors)
    let mut groups: BTreeMap<(u8, Sex, AgeGroup), (usize, usize)> = BTreeMap::new();

    for record in records {
        let counts = groups
            .entry((record.pclass, record.sex, record.age_group()))
            .or_default();
        counts.0 += 1;
        if record.has_survived() {
            counts.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|((pclass, sex, age_group), (total, survivors))| {
            let survival_rate = survival_rate(survivors, total).ok_or_else(|| {
                AnalysisError::DivisionUndefined {
                    group: format!("({}, {}, {})", pclass, sex, age_group),
                }
            })?;

            Ok(SurvivalRow {
                pclass,
                sex,
                age_group,
                total_passengers: total,
                survivors,
                survival_rate,
            })
        })
        .collect()
}

/// Roll survival rows up to one row per sex.
pub fn gender_survival(rows: &[SurvivalRow]) -> Result<Vec<GenderSurvival>> {
    if rows.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut by_sex: BTreeMap<Sex, (usize, usize)> = BTreeMap::new();

    for row in rows {
        let counts = by_sex.entry(row.sex).or_default();
        counts.0 += row.total_passengers;
        counts.1 += row.survivors;
    }

    by_sex
        .into_iter()
        .map(|(sex, (total, survivors))| {
            let survival_rate = survival_rate(survivors, total)
                .ok_or_else(|| AnalysisError::DivisionUndefined {
                    group: sex.to_string(),
                })?;

            Ok(GenderSurvival {
                sex,
                total_passengers: total,
                survivors,
                survival_rate,
            })
        })
        .collect()
}

/// Running fare statistics for one group.
#[derive(Debug, Clone, Copy)]
struct FareStats {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl FareStats {
    fn new(fare: f64) -> Self {
        Self {
            sum: fare,
            min: fare,
            max: fare,
            count: 1,
        }
    }

    fn push(&mut self, fare: f64) {
        self.sum += fare;
        self.min = self.min.min(fare);
        self.max = self.max.max(fare);
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Fare statistics by `(FamilySize, Pclass)`, sorted by `(Pclass, FamilySize)`.
pub fn family_groups(records: &[PassengerRecord]) -> Result<Vec<FareRow>> {
    ensure_not_empty(records)?;

    let mut groups: BTreeMap<(u8, u64), FareStats> = BTreeMap::new();

    for record in records {
        groups
            .entry((record.pclass, record.family_size()))
            .and_modify(|stats| stats.push(record.fare))
            .or_insert_with(|| FareStats::new(record.fare));
    }

    Ok(groups
        .into_iter()
        .map(|((pclass, family_size), stats)| FareRow {
            family_size,
            pclass,
            avg_fare: stats.mean(),
            min_fare: stats.min,
            max_fare: stats.max,
            num_passengers: stats.count,
        })
        .collect())
}

/// Distinct last names with their counts, most frequent first.
///
/// Names with equal counts keep the order in which they first appear
/// in the manifest.
pub fn last_names(records: &[PassengerRecord]) -> Result<Vec<NameCount>> {
    ensure_not_empty(records)?;

    // last name -> (first index, count)
    let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        seen.entry(record.last_name()).or_insert((index, 0)).1 += 1;
    }

    let mut counts: Vec<_> = seen.into_iter().collect();
    counts.sort_by(|(_, (first_a, count_a)), (_, (first_b, count_b))| {
        count_b.cmp(count_a).then_with(|| first_a.cmp(first_b))
    });

    Ok(counts
        .into_iter()
        .map(|(name, (_, count))| NameCount {
            last_name: name.to_string(),
            count,
        })
        .collect())
}

/// The ten families with the highest average fare.
#[allow(dead_code)] // Convenience wrapper with the default ranking size
pub fn family_fare_ranking(records: &[PassengerRecord]) -> Result<Vec<FamilyFareRow>> {
    top_families_by_fare(records, DEFAULT_TOP_FAMILIES)
}

/// Average fare by `(LastName, Pclass)` for last names seen more than once,
/// keeping the `top_n` highest.
///
/// Equal averages are ordered by last name, then class.
pub fn top_families_by_fare(
    records: &[PassengerRecord],
    top_n: usize,
) -> Result<Vec<FamilyFareRow>> {
    let name_counts: HashMap<String, usize> = last_names(records)?
        .into_iter()
        .map(|n| (n.last_name, n.count))
        .collect();

    // (fare sum, passengers)
    let mut groups: BTreeMap<(&str, u8), (f64, usize)> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| VALID_CLASSES.contains(&r.pclass))
    {
        let fares = groups
            .entry((record.last_name(), record.pclass))
            .or_insert((0.0, 0));
        fares.0 += record.fare;
        fares.1 += 1;
    }

    let mut ranking: Vec<FamilyFareRow> = groups
        .into_iter()
        .filter_map(|((last_name, pclass), (sum, passengers))| {
            let count = name_counts.get(last_name).copied().unwrap_or(0);
            (count > 1).then(|| FamilyFareRow {
                last_name: last_name.to_string(),
                pclass,
                average_fare: sum / passengers as f64,
                count,
            })
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.average_fare
            .total_cmp(&a.average_fare)
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.pclass.cmp(&b.pclass))
    });
    ranking.truncate(top_n);

    Ok(ranking)
}

/// Passenger count per ticket class.
pub fn class_distribution(records: &[PassengerRecord]) -> BTreeMap<u8, usize> {
    let mut dist: BTreeMap<u8, usize> = BTreeMap::new();

    for record in records {
        *dist.entry(record.pclass).or_default() += 1;
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::parse_csv;

    const SAMPLE: &str = include_str!("../../fixtures/titanic_sample.csv");

    fn sample() -> Vec<PassengerRecord> {
        parse_csv(SAMPLE).unwrap()
    }

    fn create_test_record(pclass: u8, sex: Sex, age: Option<f64>, survived: u8) -> PassengerRecord {
        PassengerRecord {
            passenger_id: 1,
            survived,
            pclass,
            name: "Doe, Mr. John".to_string(),
            sex,
            age,
            sib_sp: 0,
            parch: 0,
            fare: 10.0,
        }
    }

    #[test]
    fn test_survival_demographics_worked_example() {
        let records = vec![
            create_test_record(1, Sex::Female, Some(10.0), 1),
            create_test_record(1, Sex::Female, Some(10.0), 0),
            create_test_record(1, Sex::Male, Some(30.0), 0),
        ];

        let rows = survival_demographics(&records).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            SurvivalRow {
                pclass: 1,
                sex: Sex::Female,
                age_group: AgeGroup::Child,
                total_passengers: 2,
                survivors: 1,
                survival_rate: 0.5,
            }
        );
        assert_eq!(
            rows[1],
            SurvivalRow {
                pclass: 1,
                sex: Sex::Male,
                age_group: AgeGroup::Adult,
                total_passengers: 1,
                survivors: 0,
                survival_rate: 0.0,
            }
        );
    }

    #[test]
    fn test_survival_demographics_properties() {
        let records = sample();
        let rows = survival_demographics(&records).unwrap();

        for row in &rows {
            assert!(row.survivors <= row.total_passengers);
            assert!((0.0..=1.0).contains(&row.survival_rate));
            assert!(row.total_passengers > 0);
        }

        let total: usize = rows.iter().map(|r| r.total_passengers).sum();
        assert_eq!(total, records.len());

        let keys: Vec<_> = rows.iter().map(|r| (r.pclass, r.sex, r.age_group)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_survival_demographics_keeps_unknown_ages() {
        let rows = survival_demographics(&sample()).unwrap();

        let first_class_women = rows
            .iter()
            .find(|r| r.pclass == 1 && r.sex == Sex::Female && r.age_group == AgeGroup::Adult)
            .unwrap();
        assert_eq!(first_class_women.total_passengers, 4);
        assert_eq!(first_class_women.survival_rate, 1.0);

        let unknown = rows
            .iter()
            .find(|r| r.pclass == 3 && r.sex == Sex::Male && r.age_group == AgeGroup::Unknown)
            .unwrap();
        assert_eq!(unknown.total_passengers, 1);
        assert_eq!(unknown.survivors, 0);
    }

    #[test]
    fn test_gender_survival() {
        let rows = survival_demographics(&sample()).unwrap();
        let gender = gender_survival(&rows).unwrap();

        assert_eq!(gender.len(), 2);
        assert_eq!(gender[0].sex, Sex::Female);
        assert_eq!(gender[0].total_passengers, 14);
        assert_eq!(gender[0].survivors, 11);
        assert_eq!(gender[1].sex, Sex::Male);
        assert_eq!(gender[1].total_passengers, 11);
        assert_eq!(gender[1].survivors, 1);
        assert!(gender[0].survival_rate > gender[1].survival_rate);
    }

    #[test]
    fn test_family_groups() {
        let rows = family_groups(&sample()).unwrap();

        for row in &rows {
            assert!(row.min_fare <= row.avg_fare);
            assert!(row.avg_fare <= row.max_fare);
            assert!(row.family_size >= 1);
        }

        let keys: Vec<_> = rows.iter().map(|r| (r.pclass, r.family_size)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        assert_eq!((rows[0].pclass, rows[0].family_size), (1, 1));
        assert_eq!(rows[0].num_passengers, 2);
        assert_eq!(rows[0].min_fare, 26.55);
        assert_eq!(rows[0].max_fare, 51.8625);

        let fortunes = rows
            .iter()
            .find(|r| r.pclass == 1 && r.family_size == 6)
            .unwrap();
        assert_eq!(fortunes.num_passengers, 2);
        assert_eq!(fortunes.avg_fare, 263.0);
    }

    #[test]
    fn test_family_groups_huge_relative_counts() {
        let mut record = create_test_record(3, Sex::Male, Some(22.0), 0);
        record.sib_sp = u32::MAX;
        record.parch = u32::MAX;

        let rows = family_groups(&[record]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].family_size, 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_last_names() {
        let records = sample();
        let names = last_names(&records).unwrap();

        let total: usize = names.iter().map(|n| n.count).sum();
        assert_eq!(total, records.len());

        let top: Vec<_> = names.iter().take(4).map(|n| n.last_name.as_str()).collect();
        assert_eq!(top, vec!["Palsson", "Andersson", "Fortune", "Braund"]);
        assert_eq!(names[0].count, 2);
        assert_eq!(names[3].count, 1);
    }

    #[test]
    fn test_family_fare_ranking() {
        let ranking = family_fare_ranking(&sample()).unwrap();

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].last_name, "Fortune");
        assert_eq!(ranking[0].pclass, 1);
        assert_eq!(ranking[0].average_fare, 263.0);
        assert_eq!(ranking[1].last_name, "Palsson");
        assert_eq!(ranking[2].last_name, "Andersson");
        assert!((ranking[2].average_fare - 19.6).abs() < 1e-9);

        assert!(ranking.iter().all(|r| r.count > 1));
        assert!(ranking
            .windows(2)
            .all(|w| w[0].average_fare >= w[1].average_fare));
    }

    #[test]
    fn test_top_families_limit_and_ties() {
        let mut records = Vec::new();
        for (name, fare) in [("Zeta", 50.0), ("Alpha", 50.0), ("Mid", 20.0), ("Solo", 900.0)] {
            let copies = if name == "Solo" { 1 } else { 2 };
            for _ in 0..copies {
                records.push(PassengerRecord {
                    name: format!("{}, Mr. X", name),
                    fare,
                    ..create_test_record(2, Sex::Male, Some(40.0), 0)
                });
            }
        }

        let ranking = top_families_by_fare(&records, 2).unwrap();
        let names: Vec<_> = ranking.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_ranking_skips_unknown_classes() {
        let records = vec![
            PassengerRecord {
                name: "Ghost, Mr. A".to_string(),
                fare: 500.0,
                ..create_test_record(4, Sex::Male, None, 0)
            },
            PassengerRecord {
                name: "Ghost, Mr. B".to_string(),
                fare: 500.0,
                ..create_test_record(4, Sex::Male, None, 0)
            },
        ];

        assert!(family_fare_ranking(&records).unwrap().is_empty());
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let empty: Vec<PassengerRecord> = Vec::new();

        assert!(matches!(survival_demographics(&empty), Err(AnalysisError::EmptyInput)));
        assert!(matches!(family_groups(&empty), Err(AnalysisError::EmptyInput)));
        assert!(matches!(last_names(&empty), Err(AnalysisError::EmptyInput)));
        assert!(matches!(family_fare_ranking(&empty), Err(AnalysisError::EmptyInput)));
        assert!(matches!(gender_survival(&[]), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn test_operations_are_idempotent() {
        let records = sample();

        assert_eq!(
            survival_demographics(&records).unwrap(),
            survival_demographics(&records).unwrap()
        );
        assert_eq!(family_groups(&records).unwrap(), family_groups(&records).unwrap());
        assert_eq!(last_names(&records).unwrap(), last_names(&records).unwrap());
        assert_eq!(
            family_fare_ranking(&records).unwrap(),
            family_fare_ranking(&records).unwrap()
        );
    }

    #[test]
    fn test_class_distribution() {
        let dist = class_distribution(&sample());
        assert_eq!(dist.get(&1), Some(&6));
        assert_eq!(dist.get(&2), Some(&4));
        assert_eq!(dist.get(&3), Some(&15));
    }
}
