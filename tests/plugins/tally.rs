use matchup::core::delivery::Category;
use matchup::plugins::tally::{Alphabet, tally, unmapped};

#[test]
fn batting_sequence_counts_beaten_and_wickets() {
    let counts = tally("2 2 2 5 2 2 5 2 2 5", Alphabet::Batting);
    assert_eq!(counts.beaten, 7);
    assert_eq!(counts.wicket, 3);
    assert_eq!(counts.pace_wide, 0);
    assert_eq!(counts.spin_wide, 0);
    assert_eq!(counts.no_ball, 0);
}

#[test]
fn bowling_sequence_reads_two_as_spin_wide() {
    let counts = tally("2 b b w", Alphabet::Bowling);
    assert_eq!(counts.spin_wide, 1);
    assert_eq!(counts.beaten, 2);
    assert_eq!(counts.wicket, 1);
    assert_eq!(counts.pace_wide, 0);
    assert_eq!(counts.no_ball, 0);
}

#[test]
fn empty_and_blank_sequences_are_all_zero() {
    for seq in ["", "   ", "\n\t"] {
        assert!(tally(seq, Alphabet::Batting).is_zero());
        assert!(tally(seq, Alphabet::Bowling).is_zero());
    }
}

#[test]
fn unknown_tokens_are_dropped_silently() {
    let seq = "b x 4 w W bb 3";
    let counts = tally(seq, Alphabet::Bowling);
    assert_eq!(counts.beaten, 1);
    assert_eq!(counts.wicket, 1);
    assert_eq!(counts.no_ball, 1);
    assert_eq!(unmapped(seq, Alphabet::Bowling), vec!["x", "4", "W", "bb"]);
}

#[test]
fn batting_alphabet_ignores_bowling_tokens() {
    let counts = tally("b w 1 3 2", Alphabet::Batting);
    assert_eq!(counts.beaten, 1);
    assert_eq!(counts.total(), 1);
}

#[test]
fn counted_total_matches_tokens_in_alphabet() {
    let sequences = [
        "2 5 5 9 a 2",
        "b w 1 2 3 3 3 z",
        "5 5 5 5",
        "1 1 q 2 b",
        "",
    ];
    for alphabet in [Alphabet::Batting, Alphabet::Bowling] {
        for seq in sequences {
            let in_domain = seq
                .split_whitespace()
                .filter(|t| alphabet.lookup(t).is_some())
                .count() as i64;
            assert_eq!(tally(seq, alphabet).total(), in_domain, "{seq:?}");
            assert_eq!(
                unmapped(seq, alphabet).len() as i64 + in_domain,
                seq.split_whitespace().count() as i64
            );
        }
    }
}

#[test]
fn every_bowling_token_maps_to_a_distinct_category() {
    let map = Alphabet::Bowling.token_map();
    assert_eq!(map.len(), Category::ALL.len());
    for category in Category::ALL {
        assert_eq!(map.iter().filter(|(_, c)| *c == category).count(), 1);
    }
}
