use serde::{Deserialize, Serialize};

/// A team's line in one tournament table, as totals over that tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub tournament_id: u32,
    #[serde(default)]
    pub tournament_name: String,
    pub team_id: String,
    #[serde(default)]
    pub team_name: Option<String>,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    #[serde(default)]
    pub points: Option<u32>,
}

impl Standing {
    pub fn is_team(&self, team_id: &str) -> bool {
        self.team_id.trim() == team_id.trim()
    }
}
