use std::collections::HashSet;

use crate::model::{Event, Team};

// Keeps only events at least one team of interest attended, so nothing is computed for the rest.
// Input order is kept and an event key is never kept twice.
pub fn filter_events(events: Vec<Event>, teams_of_interest: &[&Team]) -> Vec<Event> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for ev in events {
        if seen.contains(&ev.key) {
            continue;
        }

        if teams_of_interest.iter().any(|t| t.attended(&ev.key)) {
            seen.insert(ev.key.clone());
            kept.push(ev);
        }
    }

    kept
}

pub fn official_only(events: Vec<Event>) -> Vec<Event> {
    events.into_iter().filter(|ev| ev.official).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn team(number: u32, events: &[&str]) -> Team {
        let mut t = Team::new(number);
        for key in events {
            t.attend(key);
        }
        t
    }

    fn keys(events: &[Event]) -> Vec<&str> {
        events.iter().map(|ev| ev.key.as_str()).collect()
    }

    #[test]
    fn keeps_attended_events_in_order() {
        let events = vec![
            Event::new("2013casd", "San Diego"),
            Event::new("2013cama", "Central Valley"),
            Event::new("2013nvlv", "Las Vegas"),
        ];
        let a = team(254, &["2013nvlv", "2013casd"]);
        let b = team(1678, &["2013casd"]);

        let kept = filter_events(events, &[&a, &b]);
        assert_eq!(keys(&kept), vec!["2013casd", "2013nvlv"]);
    }

    #[test]
    fn no_teams_of_interest_keeps_nothing() {
        let events = vec![Event::new("2013casd", "San Diego")];
        assert!(filter_events(events, &[]).is_empty());
    }

    #[test]
    fn repeated_event_is_kept_once() {
        let events = vec![Event::new("2013casd", "San Diego"), Event::new("2013casd", "San Diego")];
        let a = team(254, &["2013casd"]);

        assert_eq!(filter_events(events, &[&a]).len(), 1);
    }

    #[test]
    fn drops_unofficial_events() {
        let mut scrimmage = Event::new("2013scrim", "Week Zero");
        scrimmage.official = false;
        let events = vec![scrimmage, Event::new("2013casd", "San Diego")];

        assert_eq!(keys(&official_only(events)), vec!["2013casd"]);
    }

    proptest! {
        #[test]
        fn kept_iff_some_team_attended(
            event_ids in prop::collection::vec(0u8..12, 0..20),
            attendance in prop::collection::vec(prop::collection::vec(0u8..12, 0..4), 0..5),
        ) {
            let events: Vec<Event> = event_ids.iter().map(|id| Event::new(format!("ev{id}"), "")).collect();
            let teams: Vec<Team> = attendance
                .iter()
                .enumerate()
                .map(|(n, ids)| {
                    let keys: Vec<String> = ids.iter().map(|id| format!("ev{id}")).collect();
                    team(n as u32, &keys.iter().map(String::as_str).collect::<Vec<_>>())
                })
                .collect();
            let refs: Vec<&Team> = teams.iter().collect();

            let kept = filter_events(events.clone(), &refs);

            let mut expected: Vec<&str> = Vec::new();
            for ev in &events {
                let attended = teams.iter().any(|t| t.attended(&ev.key));
                if attended && !expected.contains(&ev.key.as_str()) {
                    expected.push(&ev.key);
                }
            }
            prop_assert_eq!(keys(&kept), expected);
        }
    }
}
