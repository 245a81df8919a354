// Errors raised by the rating engine. IO and parsing at the edges use anyhow.

use crate::model::TeamNumber;

pub type Result<T> = std::result::Result<T, RatingError>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("team {team} played a match at {event} but is not on the event roster")]
    UnattachedTeam { event: String, team: TeamNumber },

    #[error("invalid rating configuration: {reason}")]
    InvalidConfig { reason: String },
}
