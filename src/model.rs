use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role a connection plays across its race starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Jockey,
    Trainer,
    Sire,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jockey => "jockey",
            Role::Trainer => "trainer",
            Role::Sire => "sire",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown connection role '{0}'")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jockey" => Ok(Role::Jockey),
            "trainer" => Ok(Role::Trainer),
            "sire" => Ok(Role::Sire),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// One race-entry record linking a horse to its connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Starter {
    pub track: String,
    pub race_number: u32,
    pub horse: String,
    pub jockey: Option<String>,
    pub trainer: Option<String>,
    pub sire: Option<String>,
    /// Decimal odds at post time
    pub odds: f64,
    /// Cost proxy assigned from the odds bucket
    pub salary: f64,
    /// Fantasy points earned by this start
    pub points: f64,
    /// Final finish position (1-based); `None` until results are in
    pub finish_position: Option<u32>,
    pub scratched: bool,
}

/// A jockey, trainer, or sire tracked as a fantasy-scoring entity across
/// race starts on a slate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Stable identity derived from name + role
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Number of non-scratched starts
    pub apps: u32,
    /// Mean decimal odds across non-scratched starts
    pub avg_odds: f64,
    /// Sum of per-start salary
    pub salary_sum: f64,
    /// Sum of points earned; only top-3 finishes count
    pub points_sum: f64,
    /// Points per $1,000 of salary over the trailing 30 days
    pub avpa_30d: Option<f64>,
    /// Points per $1,000 of salary over this slate
    pub avpa_race: Option<f64>,
    /// Expected points for the slate (odds-bucket model, assigned upstream)
    pub mu: Option<f64>,
    /// Standard deviation of points (odds-bucket model, assigned upstream)
    pub sigma: Option<f64>,
    pub starters: Vec<Starter>,
}

impl Connection {
    /// Stable identifier for a connection: slugified name plus role, so the
    /// same person keeps one identity across ingestion passes.
    pub fn derive_id(name: &str, role: Role) -> String {
        let slug = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}-{}", slug, role.as_str())
    }

    /// Build a connection by aggregating raw starter records.
    ///
    /// Scratched starters contribute nothing to `apps`, `avg_odds`,
    /// `salary_sum`, or `points_sum`. Points only accumulate for finish
    /// positions 1-3.
    pub fn from_starters(name: &str, role: Role, starters: Vec<Starter>) -> Self {
        let mut apps = 0u32;
        let mut odds_total = 0.0;
        let mut salary_sum = 0.0;
        let mut points_sum = 0.0;
        for s in starters.iter().filter(|s| !s.scratched) {
            apps += 1;
            odds_total += s.odds;
            salary_sum += s.salary;
            if s.finish_position.is_some_and(|pos| (1..=3).contains(&pos)) {
                points_sum += s.points;
            }
        }
        let avg_odds = if apps > 0 { odds_total / apps as f64 } else { 0.0 };
        Connection {
            id: Self::derive_id(name, role),
            name: name.to_string(),
            role,
            apps,
            avg_odds,
            salary_sum,
            points_sum,
            avpa_30d: None,
            avpa_race: None,
            mu: None,
            sigma: None,
            starters,
        }
    }

    /// Points earned per $1,000 of salary, the normalized efficiency metric
    /// behind `avpa_30d`/`avpa_race`. `None` when no salary has accumulated.
    pub fn avpa(&self) -> Option<f64> {
        if self.salary_sum > 0.0 {
            Some(self.points_sum / (self.salary_sum / 1000.0))
        } else {
            None
        }
    }
}

/// One side of a matchup: one or more connections assigned together.
///
/// A side owns deep copies of its connections, starter lists included, so
/// later mutation of the live pool can never alter an emitted matchup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSide {
    pub connections: Vec<Connection>,
    /// Sum of member `salary_sum`
    pub salary_total: f64,
    /// Combined expected points, snapshotted at generation time
    pub mu: Option<f64>,
    /// Combined standard deviation, snapshotted at generation time
    pub sigma: Option<f64>,
    /// Probability this side outscores its opponent(s), snapshotted at
    /// generation time. Never re-derived at settlement.
    pub win_probability: Option<f64>,
}

impl SetSide {
    pub fn new(connections: Vec<Connection>) -> Self {
        let salary_total = connections.iter().map(|c| c.salary_sum).sum();
        SetSide {
            connections,
            salary_total,
            mu: None,
            sigma: None,
            win_probability: None,
        }
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.iter().any(|c| c.id == id)
    }
}

/// The shape of a matchup, by side sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchupKind {
    TwoWay { a: u8, b: u8 },
    ThreeWay { a: u8, b: u8, c: u8 },
}

impl MatchupKind {
    pub fn is_three_way(&self) -> bool {
        matches!(self, MatchupKind::ThreeWay { .. })
    }

    /// Scaling factor mapping the worst probability deviation onto the
    /// 0-100 balance scale: 2 for two-way shapes, 3 for three-way.
    pub fn balance_factor(&self) -> f64 {
        if self.is_three_way() {
            3.0
        } else {
            2.0
        }
    }
}

impl fmt::Display for MatchupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchupKind::TwoWay { a, b } => write!(f, "{}v{}", a, b),
            MatchupKind::ThreeWay { a, b, c } => write!(f, "{}v{}v{}", a, b, c),
        }
    }
}

/// A generated two-way or three-way competition between sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub set_a: SetSide,
    pub set_b: SetSide,
    /// Present for three-way shapes only
    pub set_c: Option<SetSide>,
    pub kind: MatchupKind,
    /// 0-100; 100 = probabilities exactly at the fair split
    pub balance: u8,
    pub generated_at: DateTime<Utc>,
}

impl Matchup {
    pub fn sides(&self) -> Vec<&SetSide> {
        let mut sides = vec![&self.set_a, &self.set_b];
        if let Some(c) = &self.set_c {
            sides.push(c);
        }
        sides
    }

    /// Ids of every connection participating in this matchup.
    pub fn connection_ids(&self) -> Vec<&str> {
        self.sides()
            .into_iter()
            .flat_map(|s| s.connections.iter().map(|c| c.id.as_str()))
            .collect()
    }
}

/// Which side of a matchup a player backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChosenSide {
    A,
    B,
    C,
}

/// One pick within a round: a generated matchup plus the chosen side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundPick {
    pub matchup: Matchup,
    pub chosen: ChosenSide,
}

/// A submitted selection across 2-10 matchups with an entry amount and a
/// payout multiplier. The round wins only if every pick wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub picks: Vec<RoundPick>,
    pub entry_amount: f64,
    pub payout_multiplier: f64,
}

impl Round {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(2..=10).contains(&self.picks.len()) {
            anyhow::bail!("a round must contain between 2 and 10 picks");
        }
        if self.entry_amount <= 0.0 {
            anyhow::bail!("entry_amount must be positive");
        }
        if self.payout_multiplier < 1.0 {
            anyhow::bail!("payout_multiplier must be at least 1.0");
        }
        for (i, pick) in self.picks.iter().enumerate() {
            if pick.chosen == ChosenSide::C && pick.matchup.set_c.is_none() {
                anyhow::bail!("pick {} chose side C of a two-way matchup", i);
            }
        }
        Ok(())
    }
}
