use matchup::core::config::MatchupConfig;
use matchup::core::delivery::{Category, Counts};
use matchup::core::error::MatchupError;
use matchup::core::store::Store;
use matchup::plugins::roster::{self, Role};
use matchup::plugins::stats::{self, StatRecord};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::{TempDir, tempdir};

fn setup() -> (TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path().join("data"));
    stats::initialize_stats_db(&store).expect("init stats db");
    (tmp, store)
}

fn counts(beaten: i64, wicket: i64, pace_wide: i64, spin_wide: i64, no_ball: i64) -> Counts {
    Counts {
        beaten,
        wicket,
        pace_wide,
        spin_wide,
        no_ball,
    }
}

#[test]
fn upsert_creates_then_replaces_the_pair() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Hari", &counts(3, 1, 0, 2, 0)).unwrap();
    assert_eq!(
        stats::get(&store, "Vince", "Hari").unwrap(),
        Some(counts(3, 1, 0, 2, 0))
    );

    stats::upsert(&store, "Vince", "Hari", &counts(0, 4, 0, 0, 1)).unwrap();
    assert_eq!(
        stats::get(&store, "Vince", "Hari").unwrap(),
        Some(counts(0, 4, 0, 0, 1))
    );
    assert_eq!(stats::list_all(&store).unwrap().len(), 1);
}

#[test]
fn upsert_is_idempotent() {
    let (_tmp, store) = setup();
    let c = counts(2, 1, 1, 0, 3);
    stats::upsert(&store, "Vince", "Mano", &c).unwrap();
    let once = stats::list_all(&store).unwrap();
    stats::upsert(&store, "Vince", "Mano", &c).unwrap();
    let twice = stats::list_all(&store).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn get_on_unknown_pair_is_absent_not_an_error() {
    let (_tmp, store) = setup();
    assert_eq!(stats::get(&store, "Nobody", "Hari").unwrap(), None);
    assert!(stats::get_or_zero(&store, "Nobody", "Hari").unwrap().is_zero());
}

#[test]
fn increment_twice_from_zero_only_touches_one_category() {
    let (_tmp, store) = setup();
    stats::increment(&store, "Vince", "Durai", Category::Wicket).unwrap();
    let after = stats::increment(&store, "Vince", "Durai", Category::Wicket).unwrap();
    assert_eq!(after, counts(0, 2, 0, 0, 0));
    assert_eq!(stats::get_or_zero(&store, "Vince", "Durai").unwrap(), after);
}

#[test]
fn increment_builds_on_upserted_values() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Renga", &counts(5, 0, 1, 0, 0)).unwrap();
    let after = stats::increment(&store, "Vince", "Renga", Category::PaceWide).unwrap();
    assert_eq!(after, counts(5, 0, 2, 0, 0));
}

#[test]
fn empty_names_are_invalid_keys() {
    let (_tmp, store) = setup();
    let err = stats::upsert(&store, "", "Hari", &Counts::default()).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidKey(_)), "{err}");
    let err = stats::increment(&store, "Vince", "   ", Category::Beaten).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidKey(_)), "{err}");
    assert!(stats::list_all(&store).unwrap().is_empty());
}

#[test]
fn negative_counts_are_invalid_values_and_write_nothing() {
    let (_tmp, store) = setup();
    let err = stats::upsert(&store, "Vince", "Hari", &counts(1, -1, 0, 0, 0)).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidValue(_)), "{err}");
    assert_eq!(stats::get(&store, "Vince", "Hari").unwrap(), None);
}

#[test]
fn names_are_trimmed_before_keying() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "  Vince ", " Hari", &counts(1, 0, 0, 0, 0)).unwrap();
    stats::increment(&store, "Vince", "Hari", Category::Beaten).unwrap();
    assert_eq!(
        stats::list_all(&store).unwrap(),
        vec![StatRecord {
            batsman: "Vince".to_string(),
            bowler: "Hari".to_string(),
            counts: counts(2, 0, 0, 0, 0),
        }]
    );
}

#[test]
fn list_for_batsman_is_ordered_by_bowler() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Shyam", &counts(1, 0, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Vince", "Adi", &counts(2, 0, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Other", "Hari", &counts(9, 0, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Vince", "Mano", &counts(3, 0, 0, 0, 0)).unwrap();

    let rows = stats::list_for_batsman(&store, "Vince").unwrap();
    let bowlers: Vec<&str> = rows.iter().map(|(b, _)| b.as_str()).collect();
    assert_eq!(bowlers, vec!["Adi", "Mano", "Shyam"]);
    assert_eq!(stats::totals(&rows).unwrap().beaten, 6);
    assert!(stats::list_for_batsman(&store, "Unknown").unwrap().is_empty());
}

#[test]
fn totals_past_i64_range_is_an_error_not_a_panic() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Hari", &counts(i64::MAX, 0, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Vince", "Mano", &counts(i64::MAX, 0, 0, 0, 0)).unwrap();

    let rows = stats::list_for_batsman(&store, "Vince").unwrap();
    let err = stats::totals(&rows).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidValue(_)), "{err}");
    assert!(stats::aggregate_by_batsman(&store).is_err());
}

#[test]
fn aggregate_sums_each_category_across_bowlers() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Hari", &counts(3, 0, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Vince", "Mano", &counts(5, 2, 0, 0, 0)).unwrap();
    stats::upsert(&store, "Root", "Hari", &counts(1, 1, 1, 1, 1)).unwrap();

    let summary = stats::aggregate_by_batsman(&store).unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary["Vince"], counts(8, 2, 0, 0, 0));
    assert_eq!(summary["Root"], counts(1, 1, 1, 1, 1));
}

#[test]
fn key_projections_are_distinct_and_sorted() {
    let (_tmp, store) = setup();
    stats::upsert(&store, "Vince", "Hari", &Counts::default()).unwrap();
    stats::upsert(&store, "Root", "Hari", &Counts::default()).unwrap();
    stats::upsert(&store, "Vince", "Adi", &Counts::default()).unwrap();
    assert_eq!(stats::batsmen(&store).unwrap(), vec!["Root", "Vince"]);
    assert_eq!(stats::bowlers(&store).unwrap(), vec!["Adi", "Hari"]);
}

#[test]
fn concurrent_increments_lose_no_updates() {
    let (_tmp, store) = setup();
    let threads = 8;
    let per_thread = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..per_thread {
                    stats::increment(&store, "Vince", "Razeeth", Category::NoBall)
                        .expect("increment");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("join");
    }

    let final_counts = stats::get_or_zero(&store, "Vince", "Razeeth").unwrap();
    assert_eq!(final_counts.no_ball, (threads * per_thread) as i64);
    assert_eq!(final_counts.total(), (threads * per_thread) as i64);
}

#[test]
fn enforced_roster_rejects_unregistered_names() {
    let tmp = tempdir().expect("tempdir");
    let mut cfg = MatchupConfig::default();
    cfg.roster.enforce = true;
    let store = Store::with_config(tmp.path().join("data"), cfg);
    stats::initialize_stats_db(&store).unwrap();

    roster::add(&store, "Vince", Role::Batsman).unwrap();
    let err = stats::upsert(&store, "Vince", "Hari", &Counts::default()).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidKey(_)), "{err}");

    roster::add(&store, "Hari", Role::Bowler).unwrap();
    stats::upsert(&store, "Vince", "Hari", &counts(1, 0, 0, 0, 0)).unwrap();
    stats::increment(&store, "Vince", "Hari", Category::Beaten).unwrap();
    assert_eq!(stats::get_or_zero(&store, "Vince", "Hari").unwrap().beaten, 2);
}

#[test]
fn totals_line_reads_beaten_and_wickets() {
    let total = counts(7, 3, 1, 1, 1);
    assert_eq!(
        stats::totals_line(&total),
        "Total Beaten: 7   Total Wickets: 3"
    );
}
