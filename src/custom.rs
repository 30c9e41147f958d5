use crate::app_dirs::AppDirs;
use crate::prompt::{Prompt, PromptCategory, Round, Timeline};
use crate::workout::{Level, Workout, WorkoutCategory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CALL_INTERVAL_SECS: u32 = 10;
/// No combos are called in the last seconds of a round
const QUIET_TAIL_SECS: u32 = 3;

#[derive(Debug, Error)]
pub enum CustomWorkoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed custom workouts file: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_category() -> WorkoutCategory {
    WorkoutCategory::Shadowboxing
}

fn default_call_interval() -> u32 {
    DEFAULT_CALL_INTERVAL_SECS
}

/// A user-authored workout: a list of combos called on a fixed interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomWorkout {
    pub id: String,
    pub title: String,
    pub level: Level,
    #[serde(default = "default_category")]
    pub category: WorkoutCategory,
    pub total_rounds: u32,
    pub round_duration_secs: u32,
    pub rest_between_rounds_secs: u32,
    pub combos: Vec<String>,
    #[serde(default = "default_call_interval")]
    pub call_interval_secs: u32,
    #[serde(default)]
    pub estimated_calories: u32,
}

impl CustomWorkout {
    /// Build a round timeline: a round call at 0, then the combos in order
    /// (wrapping around) every `call_interval_secs`, then "Time!" on the last second.
    pub fn timeline(&self, round_number: u32) -> Timeline {
        let duration = self.round_duration_secs;
        let mut prompts = vec![Prompt::new(
            0,
            format!("Round {round_number}"),
            PromptCategory::Stance,
        )];

        let interval = self.call_interval_secs.max(1);
        let last_call = duration.saturating_sub(QUIET_TAIL_SECS);
        if !self.combos.is_empty() {
            let calls = (1..)
                .map(|n| n * interval)
                .take_while(|at| *at < last_call)
                .zip(self.combos.iter().cycle());
            prompts.extend(
                calls.map(|(at, combo)| Prompt::new(at, combo.clone(), PromptCategory::Combo)),
            );
        }

        if duration > 1 {
            prompts.push(Prompt::new(duration - 1, "Time!", PromptCategory::Rest));
        }
        Timeline::new(prompts)
    }

    pub fn to_workout(&self) -> Workout {
        Workout {
            id: self.id.clone(),
            title: self.title.clone(),
            level: self.level,
            category: self.category,
            rest_between_rounds_secs: self.rest_between_rounds_secs,
            estimated_calories: self.estimated_calories,
            rounds: (1..=self.total_rounds)
                .map(|n| Round::new(n, self.round_duration_secs, self.timeline(n)))
                .collect(),
        }
    }
}

pub trait CustomWorkoutStore {
    fn load(&self) -> Result<Vec<CustomWorkout>, CustomWorkoutError>;
    fn save(&self, workouts: &[CustomWorkout]) -> Result<(), CustomWorkoutError>;
}

#[derive(Debug, Clone)]
pub struct FileCustomWorkoutStore {
    path: PathBuf,
}

impl FileCustomWorkoutStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::custom_workouts_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CustomWorkoutStore for FileCustomWorkoutStore {
    /// A missing file is an empty list
    fn load(&self) -> Result<Vec<CustomWorkout>, CustomWorkoutError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, workouts: &[CustomWorkout]) -> Result<(), CustomWorkoutError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(workouts)?)?;
        Ok(())
    }
}
