use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::analysis::analyze_fit;
use crate::cache::JsonCache;
use crate::error::Result;
use crate::matrix::build_system;
use crate::model::{Event, Statistic, TeamNumber, TeamRegistry};
use crate::rating_context::RatingContext;
use crate::solver::{residual_norm, solve};

// Solved ratings for one event, kept apart from the Event so they can be cached and re-applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRatings {
    pub event_key: String,
    pub ratings: BTreeMap<Statistic, BTreeMap<TeamNumber, f64>>,
    pub approximated: Vec<Statistic>,
}

impl EventRatings {
    pub fn is_exact(&self) -> bool {
        self.approximated.is_empty()
    }
}

// Builds and solves OPR, CCWM and DPR over one snapshot of the roster and match list
pub fn compute_event(event: &Event, ctx: &RatingContext) -> Result<EventRatings> {
    let sorted_teams = event.sorted_teams();
    let mut out = EventRatings {
        event_key: event.key.clone(),
        ..Default::default()
    };

    // Matches weighted to zero don't count, an event made only of those is empty too
    let rated_matches = event.matches.iter().filter(|m| ctx.match_weight(m.level) > 0.0).count();

    if sorted_teams.is_empty() || rated_matches == 0 {
        debug!(event = %event.key, teams = sorted_teams.len(), matches = event.matches.len(), rated_matches, "nothing to rate");
        return Ok(out);
    }

    for stat in Statistic::ALL {
        let system = build_system(&event.key, &sorted_teams, &event.matches, |us, them| stat.compare(us, them), ctx)?;
        let solution = solve(&system, ctx.singular_tolerance);

        if !solution.is_exact() {
            warn!(
                event = %event.key,
                statistic = stat.label(),
                residual = residual_norm(&system, solution.values()),
                "singular counting matrix, used least-squares approximation"
            );
            out.approximated.push(stat);
        }

        let values = solution.into_values();
        out.ratings.insert(stat, sorted_teams.iter().copied().zip(values.iter().copied()).collect());
    }

    Ok(out)
}

// Writes ratings into the event (keyed by team) and into every rated team (keyed by event)
pub fn apply_ratings(event: &mut Event, registry: &mut TeamRegistry, ratings: &EventRatings) {
    debug_assert_eq!(event.key, ratings.event_key);

    for (&stat, values) in &ratings.ratings {
        for (&team, &value) in values {
            event.ratings_mut(stat).insert(team, value);
            registry.get_or_create(team).ratings_mut(stat).insert(event.key.clone(), value);
        }
    }
}

/*
    Rates events one at a time in list order. With a cache, solved ratings are stored per event and
    settings fingerprint and data digest, so a re-run with the same data only re-applies them.
    An event with a data-integrity fault is logged and left out of the result, the rest carry on.
*/
pub fn process_events(
    events: Vec<Event>,
    registry: &mut TeamRegistry,
    ctx: &RatingContext,
    cache: Option<&JsonCache>,
) -> Vec<Event> {
    let mut processed = Vec::with_capacity(events.len());

    for mut event in events {
        let ratings = match cache {
            Some(cache) => {
                let name = format!("ratings_{}_{}_{}", event.key, ctx.fingerprint(), &event.snapshot_digest()[..16]);
                cache.get_or_compute(&name, || compute_event(&event, ctx))
            }
            None => compute_event(&event, ctx).map_err(anyhow::Error::from),
        };

        match ratings {
            Ok(ratings) => {
                apply_ratings(&mut event, registry, &ratings);
                let fit = analyze_fit(&event);
                info!(
                    event = %event.key,
                    teams = event.oprs.len(),
                    matches = event.matches.len(),
                    exact = ratings.is_exact(),
                    opr_mae = fit.mean_abs_error,
                    winner_accuracy = fit.winner_accuracy,
                    "rated event"
                );
                processed.push(event);
            }
            Err(err) => error!(event = %event.key, "skipping event: {err:#}"),
        }
    }

    processed
}
