use serde::{Deserialize, Serialize};

/// A competition inside one age group and year. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub tournament_id: u32,
    pub name: String,
    pub year: i32,
    pub age_group_id: u32,
    pub tournament_type: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Parameters of one discovery lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveryQuery {
    pub age_group_id: u32,
    pub year: i32,
    pub gender: u8,
    pub tournament_type: u32,
}
