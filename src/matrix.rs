// Builds the alliance co-occurrence system for one event:
//
//     counting_matrix * ratings = totals_vector
//
// counting_matrix[i][j] counts (weighted) matches where sorted teams i and j shared an alliance,
// totals_vector[i] sums compare(own score, opposing score) over every alliance team i was on.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use crate::error::{RatingError, Result};
use crate::model::{Match, TeamNumber};
use crate::rating_context::{RatingContext, StrayTeamPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    pub teams: Vec<TeamNumber>,
    pub counting_matrix: DMatrix<f64>,
    pub totals_vector: DVector<f64>,
}

impl LinearSystem {
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

// sorted_teams must be ascending and free of duplicates (see Event::sorted_teams).
pub fn build_system<F>(
    event_key: &str,
    sorted_teams: &[TeamNumber],
    matches: &[Match],
    compare: F,
    ctx: &RatingContext,
) -> Result<LinearSystem>
where
    F: Fn(f64, f64) -> f64,
{
    debug_assert!(sorted_teams.windows(2).all(|w| w[0] < w[1]));

    let n = sorted_teams.len();
    let mut counting_matrix = DMatrix::<f64>::zeros(n, n);
    let mut totals_vector = DVector::<f64>::zeros(n);

    for m in matches {
        let weight = ctx.match_weight(m.level);
        if weight == 0.0 {
            continue;
        }

        for (own, opp) in m.sides() {
            let indices = alliance_indices(event_key, sorted_teams, &own.teams, ctx.stray_team_policy)?;
            let total = compare(own.score as f64, opp.score as f64);

            for &i in &indices {
                for &j in &indices {
                    counting_matrix[(i, j)] += weight;
                }
                totals_vector[i] += weight * total;
            }
        }
    }

    Ok(LinearSystem {
        teams: sorted_teams.to_vec(),
        counting_matrix,
        totals_vector,
    })
}

fn alliance_indices(
    event_key: &str,
    sorted_teams: &[TeamNumber],
    alliance: &[TeamNumber],
    policy: StrayTeamPolicy,
) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(alliance.len());

    for &team in alliance {
        match sorted_teams.binary_search(&team) {
            // A team only counts once per alliance, whatever the record says
            Ok(idx) if indices.contains(&idx) => {
                warn!(event = event_key, team, "ignoring team listed twice on one alliance");
            }
            Ok(idx) => indices.push(idx),
            Err(_) => match policy {
                StrayTeamPolicy::Fail => {
                    return Err(RatingError::UnattachedTeam {
                        event: event_key.to_owned(),
                        team,
                    })
                }
                StrayTeamPolicy::Skip => {
                    warn!(event = event_key, team, "ignoring team missing from event roster");
                }
            },
        }
    }

    Ok(indices)
}
