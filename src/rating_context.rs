use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::RatingError;
use crate::model::CompetitionLevel;

// What to do with a team that shows up in a match but not on the event roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrayTeamPolicy {
    Fail,
    Skip,
}

/*
    Every knob of the model lives here. Load it from TOML with RatingContext::load, anything
    missing in the file falls back to the defaults below.
*/
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingContext {
    // Relative pivot size (smallest / largest) under which a counting matrix counts as singular.
    // Also the relative cutoff for singular values in the least-squares fallback.
    pub singular_tolerance: f64,

    // Both 1.0 means quals and elims count the same. 0.0 drops that level entirely.
    pub qualification_weight: f64,
    pub elimination_weight: f64,

    pub stray_team_policy: StrayTeamPolicy,

    pub official_only: bool,
    pub cache_dir: Option<PathBuf>,
}

impl Default for RatingContext {
    fn default() -> Self {
        Self {
            singular_tolerance: 1e-10,

            qualification_weight: 1.0,
            elimination_weight: 1.0,

            stray_team_policy: StrayTeamPolicy::Fail,

            official_only: true,
            cache_dir: None,
        }
    }
}

impl RatingContext {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let ctx: RatingContext = toml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn validate(&self) -> Result<(), RatingError> {
        if !(self.singular_tolerance > 0.0 && self.singular_tolerance < 1.0) {
            return Err(RatingError::InvalidConfig {
                reason: format!("singular_tolerance must be in (0, 1), got {}", self.singular_tolerance),
            });
        }

        for (name, weight) in [
            ("qualification_weight", self.qualification_weight),
            ("elimination_weight", self.elimination_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RatingError::InvalidConfig {
                    reason: format!("{name} must be a finite non-negative number, got {weight}"),
                });
            }
        }

        Ok(())
    }

    pub fn match_weight(&self, level: CompetitionLevel) -> f64 {
        match level {
            CompetitionLevel::Qualification => self.qualification_weight,
            CompetitionLevel::Elimination => self.elimination_weight,
        }
    }

    // Identifies the settings that change solved values. Part of every cache key.
    pub fn fingerprint(&self) -> String {
        format!(
            "q{}_e{}_t{:e}_{:?}",
            self.qualification_weight, self.elimination_weight, self.singular_tolerance, self.stray_team_policy
        )
        .to_lowercase()
        .replace('.', "p")
    }
}
