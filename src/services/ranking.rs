use crate::models::battle::CountryStats;
use crate::models::country::Country;
use crate::models::leaderboard::{LeaderboardEntry, SortCriterion};
use std::collections::HashMap;
use tracing::warn;

pub const DEFAULT_TOP_K: usize = 20;

fn dedupe(entries: Vec<(Country, CountryStats)>) -> Vec<(Country, CountryStats)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<(Country, CountryStats)> = Vec::with_capacity(entries.len());
    for (country, stats) in entries {
        match positions.get(&country.code) {
            Some(&idx) => {
                warn!(code = %country.code, "duplicate country in leaderboard input, keeping last");
                unique[idx] = (country, stats);
            }
            None => {
                positions.insert(country.code.clone(), unique.len());
                unique.push((country, stats));
            }
        }
    }
    unique
}

/// Ranks the full input. Equal scores keep their input order and still get distinct ranks.
pub fn rank(entries: Vec<(Country, CountryStats)>, criterion: SortCriterion) -> Vec<LeaderboardEntry> {
    let mut standings = dedupe(entries);
    match criterion {
        SortCriterion::Total => standings.sort_by(|a, b| b.1.taps.cmp(&a.1.taps)),
        SortCriterion::Intensity => {
            standings.sort_by(|a, b| b.1.intensity().total_cmp(&a.1.intensity()))
        }
    }

    standings
        .into_iter()
        .enumerate()
        .map(|(idx, (country, stats))| LeaderboardEntry {
            country,
            stats,
            rank: idx + 1,
        })
        .collect()
}

pub fn find_rank(sorted: &[LeaderboardEntry], country_code: &str) -> Option<usize> {
    sorted
        .iter()
        .find(|entry| entry.country.code.eq_ignore_ascii_case(country_code))
        .map(|entry| entry.rank)
}

pub fn top(sorted: &[LeaderboardEntry], k: usize) -> &[LeaderboardEntry] {
    &sorted[..k.min(sorted.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(code: &str, taps: u64, players: u64) -> (Country, CountryStats) {
        (Country::from_code(code), CountryStats::new(taps, players))
    }

    fn codes(entries: &[LeaderboardEntry]) -> Vec<(&str, usize)> {
        entries
            .iter()
            .map(|e| (e.country.code.as_str(), e.rank))
            .collect()
    }

    #[test]
    fn test_equal_taps_keep_input_order() {
        let ranked = rank(
            vec![standing("AA", 10, 1), standing("BB", 10, 1), standing("CC", 5, 1)],
            SortCriterion::Total,
        );
        assert_eq!(codes(&ranked), vec![("AA", 1), ("BB", 2), ("CC", 3)]);
    }

    #[test]
    fn test_scenario_by_total_and_intensity() {
        let input = vec![
            standing("US", 1000, 50),
            standing("IL", 500, 10),
            standing("IN", 1000, 200),
        ];

        let by_total = rank(input.clone(), SortCriterion::Total);
        assert_eq!(codes(&by_total), vec![("US", 1), ("IN", 2), ("IL", 3)]);
        assert_eq!(by_total[0].stats.taps, 1000);
        assert_eq!(by_total[2].stats.taps, 500);

        let by_intensity = rank(input, SortCriterion::Intensity);
        assert_eq!(codes(&by_intensity), vec![("IL", 1), ("US", 2), ("IN", 3)]);
        let intensities: Vec<f64> = by_intensity.iter().map(|e| e.stats.intensity()).collect();
        assert_eq!(intensities, vec![50.0, 20.0, 5.0]);
    }

    #[test]
    fn test_zero_players_sorts_to_bottom() {
        let stats = CountryStats::new(5, 0);
        assert_eq!(stats.intensity(), 0.0);

        let ranked = rank(
            vec![standing("ZZ", 5, 0), standing("AA", 1, 1), standing("BB", 0, 0)],
            SortCriterion::Intensity,
        );
        assert_eq!(codes(&ranked), vec![("AA", 1), ("ZZ", 2), ("BB", 3)]);
    }

    #[test]
    fn test_reranking_is_idempotent() {
        let input = vec![
            standing("US", 7, 1),
            standing("DE", 7, 7),
            standing("FR", 3, 1),
            standing("BR", 9, 3),
        ];
        for criterion in [SortCriterion::Total, SortCriterion::Intensity] {
            let once = rank(input.clone(), criterion);
            let twice = rank(
                once.clone().into_iter().map(LeaderboardEntry::into_parts).collect(),
                criterion,
            );
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_duplicates_last_write_wins() {
        let ranked = rank(
            vec![standing("US", 1, 1), standing("IL", 5, 1), standing("US", 9, 1)],
            SortCriterion::Total,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(codes(&ranked), vec![("US", 1), ("IL", 2)]);
        assert_eq!(ranked[0].stats.taps, 9);
    }

    #[test]
    fn test_find_rank() {
        let ranked = rank(
            vec![standing("US", 1, 1), standing("IL", 5, 1)],
            SortCriterion::Total,
        );
        assert_eq!(find_rank(&ranked, "IL"), Some(1));
        assert_eq!(find_rank(&ranked, "us"), Some(2));
        assert_eq!(find_rank(&ranked, "MX"), None);
    }

    #[test]
    fn test_truncation_does_not_change_ranks() {
        let input: Vec<_> = (0..30u64)
            .map(|i| standing(&format!("C{:02}", i), 100 - i, 1))
            .collect();
        let ranked = rank(input, SortCriterion::Total);
        let shown = top(&ranked, DEFAULT_TOP_K);
        assert_eq!(shown.len(), 20);
        assert_eq!(shown[19].rank, 20);
        assert_eq!(find_rank(&ranked, "C25"), Some(26));
        assert_eq!(top(&ranked[..3], DEFAULT_TOP_K).len(), 3);
    }
}
