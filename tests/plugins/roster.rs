use matchup::core::delivery::Counts;
use matchup::core::error::MatchupError;
use matchup::core::store::Store;
use matchup::plugins::roster::{self, Player, Role};
use matchup::plugins::stats;
use tempfile::{TempDir, tempdir};

fn setup() -> (TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path().join("data"));
    stats::initialize_stats_db(&store).expect("init");
    (tmp, store)
}

#[test]
fn add_and_list_by_role() {
    let (_tmp, store) = setup();
    roster::add(&store, "Vince", Role::Batsman).unwrap();
    roster::add(&store, "Mano", Role::Bowler).unwrap();
    roster::add(&store, "Hari", Role::Bowler).unwrap();

    let bowlers = roster::list(&store, Some(Role::Bowler)).unwrap();
    assert_eq!(
        bowlers,
        vec![
            Player {
                name: "Hari".to_string(),
                role: Role::Bowler
            },
            Player {
                name: "Mano".to_string(),
                role: Role::Bowler
            },
        ]
    );
    assert_eq!(roster::list(&store, None).unwrap().len(), 3);
    assert!(roster::contains(&store, "Vince", Role::Batsman).unwrap());
    assert!(!roster::contains(&store, "Vince", Role::Bowler).unwrap());
}

#[test]
fn re_adding_same_role_is_a_no_op() {
    let (_tmp, store) = setup();
    roster::add(&store, "Vince", Role::Batsman).unwrap();
    roster::add(&store, " Vince ", Role::Batsman).unwrap();
    assert_eq!(roster::list(&store, None).unwrap().len(), 1);
}

#[test]
fn name_is_unique_across_roles() {
    let (_tmp, store) = setup();
    roster::add(&store, "Adi", Role::Bowler).unwrap();
    let err = roster::add(&store, "Adi", Role::Batsman).unwrap_err();
    assert!(matches!(err, MatchupError::ValidationError(_)), "{err}");
}

#[test]
fn empty_name_is_invalid_key() {
    let (_tmp, store) = setup();
    let err = roster::add(&store, "  ", Role::Bowler).unwrap_err();
    assert!(matches!(err, MatchupError::InvalidKey(_)), "{err}");
}

#[test]
fn check_reports_store_names_missing_from_roster() {
    let (_tmp, store) = setup();
    roster::add(&store, "Vince", Role::Batsman).unwrap();
    roster::add(&store, "Hari", Role::Bowler).unwrap();
    stats::upsert(&store, "Vince", "Hari", &Counts::default()).unwrap();
    stats::upsert(&store, "Root", "Shyam", &Counts::default()).unwrap();

    let report = roster::check(&store).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.unregistered_batsmen, vec!["Root"]);
    assert_eq!(report.unregistered_bowlers, vec!["Shyam"]);
}

#[test]
fn reset_clears_roster_but_keeps_stats() {
    let (_tmp, store) = setup();
    roster::add(&store, "Vince", Role::Batsman).unwrap();
    roster::add(&store, "Hari", Role::Bowler).unwrap();
    stats::upsert(&store, "Vince", "Hari", &Counts::default()).unwrap();

    assert_eq!(roster::reset(&store).unwrap(), 2);
    assert!(roster::list(&store, None).unwrap().is_empty());
    assert_eq!(stats::list_all(&store).unwrap().len(), 1);
    assert_eq!(roster::reset(&store).unwrap(), 0);
}

#[test]
fn role_parses_from_table_values() {
    assert_eq!("batsman".parse::<Role>().unwrap(), Role::Batsman);
    assert_eq!("bowler".parse::<Role>().unwrap(), Role::Bowler);
    assert!("keeper".parse::<Role>().is_err());
}
