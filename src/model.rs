use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type TeamNumber = u32;
pub type EventKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statistic {
    Opr,
    Dpr,
    Ccwm,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Opr, Statistic::Ccwm, Statistic::Dpr];

    // What one alliance's result contributes to each of its members' totals
    pub fn compare(self, us: f64, them: f64) -> f64 {
        match self {
            Statistic::Opr => us,
            Statistic::Dpr => them,
            Statistic::Ccwm => us - them,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Opr => "OPR",
            Statistic::Dpr => "DPR",
            Statistic::Ccwm => "CCWM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionLevel {
    Qualification,
    Elimination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alliance {
    pub teams: Vec<TeamNumber>,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub red: Alliance,
    pub blue: Alliance,
    pub level: CompetitionLevel,
}

impl Match {
    // Each alliance paired with the alliance it played against
    pub fn sides(&self) -> [(&Alliance, &Alliance); 2] {
        [(&self.red, &self.blue), (&self.blue, &self.red)]
    }
}

// Teams are never duplicated. The TeamRegistry owns every Team, everything else refers to them by number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub number: TeamNumber,
    pub name: Option<String>,
    pub oprs: BTreeMap<EventKey, f64>,
    pub dprs: BTreeMap<EventKey, f64>,
    pub ccwms: BTreeMap<EventKey, f64>,
    pub attended: BTreeSet<EventKey>,
}

impl Team {
    pub fn new(number: TeamNumber) -> Self {
        Self { number, ..Default::default() }
    }

    pub fn attend(&mut self, event_key: &str) {
        self.attended.insert(event_key.to_owned());
    }

    pub fn attended(&self, event_key: &str) -> bool {
        self.attended.contains(event_key)
    }

    pub fn ratings_mut(&mut self, stat: Statistic) -> &mut BTreeMap<EventKey, f64> {
        match stat {
            Statistic::Opr => &mut self.oprs,
            Statistic::Dpr => &mut self.dprs,
            Statistic::Ccwm => &mut self.ccwms,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub key: EventKey,
    pub name: String,
    pub official: bool,
    pub teams: Vec<TeamNumber>,
    pub matches: Vec<Match>,
    pub oprs: BTreeMap<TeamNumber, f64>,
    pub dprs: BTreeMap<TeamNumber, f64>,
    pub ccwms: BTreeMap<TeamNumber, f64>,
}

impl Event {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            official: true,
            teams: Vec::new(),
            matches: Vec::new(),
            oprs: BTreeMap::new(),
            dprs: BTreeMap::new(),
            ccwms: BTreeMap::new(),
        }
    }

    pub fn add_team(&mut self, team: TeamNumber) {
        self.teams.push(team);
    }

    pub fn add_match(&mut self, m: Match) {
        self.matches.push(m);
    }

    // Row/column order of every linear system built for this event
    pub fn sorted_teams(&self) -> Vec<TeamNumber> {
        let mut sorted = self.teams.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
    }

    // SHA256 over the sorted roster and every match, so changed data never reuses old ratings
    pub fn snapshot_digest(&self) -> String {
        let mut hasher = Sha256::new();

        let sorted = self.sorted_teams();
        hasher.update((sorted.len() as u64).to_le_bytes());
        for team in sorted {
            hasher.update(team.to_le_bytes());
        }

        hasher.update((self.matches.len() as u64).to_le_bytes());
        for m in &self.matches {
            hasher.update([m.level as u8]);
            for alliance in [&m.red, &m.blue] {
                hasher.update((alliance.teams.len() as u64).to_le_bytes());
                for team in &alliance.teams {
                    hasher.update(team.to_le_bytes());
                }
                hasher.update(alliance.score.to_le_bytes());
            }
        }

        format!("{:x}", hasher.finalize())
    }

    pub fn ratings(&self, stat: Statistic) -> &BTreeMap<TeamNumber, f64> {
        match stat {
            Statistic::Opr => &self.oprs,
            Statistic::Dpr => &self.dprs,
            Statistic::Ccwm => &self.ccwms,
        }
    }

    pub fn ratings_mut(&mut self, stat: Statistic) -> &mut BTreeMap<TeamNumber, f64> {
        match stat {
            Statistic::Opr => &mut self.oprs,
            Statistic::Dpr => &mut self.dprs,
            Statistic::Ccwm => &mut self.ccwms,
        }
    }

    pub fn rating(&self, stat: Statistic, team: TeamNumber) -> Option<f64> {
        self.ratings(stat).get(&team).copied()
    }
}

#[derive(Debug, Default)]
pub struct TeamRegistry {
    teams: BTreeMap<TeamNumber, Team>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // The first reference to a number creates its Team. Every later one gets that same Team back.
    pub fn get_or_create(&mut self, number: TeamNumber) -> &mut Team {
        self.teams.entry(number).or_insert_with(|| Team::new(number))
    }

    pub fn get(&self, number: TeamNumber) -> Option<&Team> {
        self.teams.get(&number)
    }

    // Looks up each number in order, silently dropping unknown ones
    pub fn resolve(&self, numbers: &[TeamNumber]) -> Vec<&Team> {
        numbers.iter().filter_map(|n| self.teams.get(n)).collect()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
