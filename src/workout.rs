use crate::prompt::Round;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkoutCategory {
    Boxing,
    Shadowboxing,
    Bagwork,
    Conditioning,
    Defense,
}

/// A fully resolved workout: one timeline per round plus rest configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub title: String,
    pub level: Level,
    pub category: WorkoutCategory,
    pub rest_between_rounds_secs: u32,
    pub estimated_calories: u32,
    pub rounds: Vec<Round>,
}

impl Workout {
    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }
}
