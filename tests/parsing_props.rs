// Property tests for user and model text parsing
// Author: kelexine (https://github.com/kelexine)

use gemcache::recommend::{parse_recommendations, release_year, year_format_ratio};
use gemcache::utils::duration::{format_ttl, parse_ttl};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #[test]
    fn parse_ttl_never_panics(input in "\\PC*") {
        let _ = parse_ttl(&input);
    }

    #[test]
    fn whole_second_ttls_survive_formatting(secs in 1u64..=31_536_000) {
        let ttl = Duration::from_secs(secs);
        prop_assert_eq!(parse_ttl(&format_ttl(ttl)).unwrap(), ttl);
    }

    #[test]
    fn parse_recommendations_never_panics(text in "\\PC*(\n\\PC*){0,8}") {
        let recs = parse_recommendations(&text);
        let ratio = year_format_ratio(&recs);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn numbered_lines_become_items(
        titles in prop::collection::vec("[A-Za-z][A-Za-z ]{0,20}", 1..10),
        year in 1900u16..2100,
    ) {
        let text: String = titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {} ({})\n", i % 10, t.trim_end(), year))
            .collect();

        let recs = parse_recommendations(&text);
        prop_assert_eq!(recs.len(), titles.len());
        for rec in &recs {
            prop_assert_eq!(release_year(rec), Some(year));
        }
        prop_assert_eq!(year_format_ratio(&recs), 1.0);
    }
}
