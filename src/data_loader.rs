use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::*;
use serde_aux::field_attributes::deserialize_option_number_from_string;
use tracing::{debug, info, warn};

use crate::model::*;
use crate::util::parse_team_key;

/*
    Loads a season dump: every event, team and match record, in the same shapes the Blue Alliance v1 API
    hands them out (team keys like "frc254", alliances.red.teams, competition_level "Quals").
    Records are checked here, at the boundary. Anything missing a required field is quarantined and
    logged instead of blowing up later inside the matrix builder.
*/
pub struct Season {
    pub events: Vec<Event>,
    pub quarantined: Vec<String>,
}

pub fn load_season(file_path: &Path, registry: &mut TeamRegistry) -> anyhow::Result<Season> {
    let data = fs::read_to_string(file_path)
        .with_context(|| format!("reading season file {}", file_path.display()))?;
    let season = parse_season(&data, registry)
        .with_context(|| format!("parsing season file {}", file_path.display()))?;

    info!(
        events = season.events.len(),
        teams = registry.len(),
        quarantined = season.quarantined.len(),
        "loaded season"
    );
    Ok(season)
}

pub fn parse_season(data: &str, registry: &mut TeamRegistry) -> anyhow::Result<Season> {
    let season_data: SeasonData = serde_json::from_str(data)?;
    let mut quarantined = Vec::new();

    for t in season_data.teams {
        match t.validate() {
            Ok((number, name, events)) => {
                let team = registry.get_or_create(number);
                if name.is_some() {
                    team.name = name;
                }
                for key in &events {
                    team.attend(key);
                }
            }
            Err(reason) => quarantine(&mut quarantined, "team", reason),
        }
    }

    let mut matches: HashMap<String, Match> = HashMap::new();
    for m in season_data.matches {
        let key = m.key.clone().unwrap_or_default();
        match m.validate() {
            Ok(valid) => {
                matches.insert(key, valid);
            }
            Err(reason) => quarantine(&mut quarantined, "match", format!("{key}: {reason}")),
        }
    }

    let mut events: Vec<Event> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for e in season_data.events {
        let mut event = match e.validate() {
            Ok(event) => event,
            Err(reason) => {
                quarantine(&mut quarantined, "event", reason);
                continue;
            }
        };

        // Same event listed twice, first one wins
        if !seen.insert(event.key.clone()) {
            debug!(event = %event.key, "skipping duplicate event record");
            continue;
        }

        for &number in &event.teams {
            registry.get_or_create(number).attend(&event.key);
        }

        for match_key in &e.matches {
            match matches.get(match_key) {
                Some(m) => event.add_match(m.clone()),
                None => quarantine(
                    &mut quarantined,
                    "match",
                    format!("{match_key}: listed by {} but no usable record", event.key),
                ),
            }
        }

        events.push(event);
    }

    Ok(Season { events, quarantined })
}

fn quarantine(quarantined: &mut Vec<String>, kind: &str, reason: String) {
    warn!(kind, %reason, "quarantined record");
    quarantined.push(format!("{kind}: {reason}"));
}

// One team per line, "frc" prefix optional. Blank lines and # comments are ignored, repeats are dropped.
pub fn load_teams_of_interest(file_path: &Path) -> anyhow::Result<Vec<TeamNumber>> {
    let data = fs::read_to_string(file_path)
        .with_context(|| format!("reading teams file {}", file_path.display()))?;
    parse_team_list(&data).with_context(|| format!("parsing teams file {}", file_path.display()))
}

pub fn parse_team_list(data: &str) -> anyhow::Result<Vec<TeamNumber>> {
    let mut teams = Vec::new();

    for (idx, line) in data.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some(number) = parse_team_key(line) else {
            bail!("line {}: {line:?} is not a team number", idx + 1);
        };
        if !teams.contains(&number) {
            teams.push(number);
        }
    }

    Ok(teams)
}

#[derive(Deserialize, Debug)]
struct SeasonData {
    #[serde(default)]
    events: Vec<JsonEvent>,
    #[serde(default)]
    teams: Vec<JsonTeam>,
    #[serde(default)]
    matches: Vec<JsonMatch>,
}

#[derive(Deserialize, Debug)]
struct JsonEvent {
    key: Option<String>,
    name: Option<String>,
    #[serde(default = "default_true")]
    official: bool,
    #[serde(default)]
    teams: Vec<String>,
    #[serde(default)]
    matches: Vec<String>,
}

impl JsonEvent {
    fn validate(&self) -> Result<Event, String> {
        let key = self.key.clone().ok_or("event without key")?;
        let name = self.name.clone().ok_or_else(|| format!("{key}: missing name"))?;

        let mut event = Event::new(key.as_str(), name);
        event.official = self.official;
        for team_key in &self.teams {
            let number = parse_team_key(team_key).ok_or_else(|| format!("{key}: bad team key {team_key:?}"))?;
            event.add_team(number);
        }

        Ok(event)
    }
}

#[derive(Deserialize, Debug)]
struct JsonTeam {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    team_number: Option<TeamNumber>,
    name: Option<String>,
    #[serde(default)]
    events: Vec<String>,
}

impl JsonTeam {
    fn validate(self) -> Result<(TeamNumber, Option<String>, Vec<String>), String> {
        let number = self.team_number.ok_or("team without team_number")?;
        Ok((number, self.name, self.events))
    }
}

#[derive(Deserialize, Debug)]
struct JsonMatch {
    key: Option<String>,
    alliances: Option<JsonAlliances>,
    competition_level: Option<String>,
}

#[derive(Deserialize, Debug)]
struct JsonAlliances {
    red: Option<JsonAlliance>,
    blue: Option<JsonAlliance>,
}

#[derive(Deserialize, Debug)]
struct JsonAlliance {
    #[serde(default)]
    teams: Vec<String>,
    score: Option<i32>,
}

impl JsonMatch {
    fn validate(self) -> Result<Match, String> {
        let alliances = self.alliances.ok_or("missing alliances")?;
        let red = alliances.red.ok_or("missing red alliance")?.validate("red")?;
        let blue = alliances.blue.ok_or("missing blue alliance")?.validate("blue")?;
        let level = match self.competition_level.as_deref() {
            Some("Quals") | Some("qm") => CompetitionLevel::Qualification,
            Some(_) => CompetitionLevel::Elimination,
            None => return Err("missing competition_level".to_string()),
        };

        Ok(Match { red, blue, level })
    }
}

impl JsonAlliance {
    fn validate(self, color: &str) -> Result<Alliance, String> {
        // The API reports -1 for matches that were never played
        let score = match self.score {
            Some(score) if score >= 0 => score,
            Some(_) => return Err(format!("{color} alliance has no score (unplayed)")),
            None => return Err(format!("{color} alliance missing score")),
        };
        if self.teams.is_empty() {
            return Err(format!("{color} alliance has no teams"));
        }

        let teams = self
            .teams
            .iter()
            .map(|k| parse_team_key(k).ok_or_else(|| format!("{color} alliance: bad team key {k:?}")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        if let Some(dup) = teams.iter().find(|&&t| !seen.insert(t)) {
            return Err(format!("{color} alliance lists team {dup} twice"));
        }

        Ok(Alliance { teams, score })
    }
}

fn default_true() -> bool { true }
