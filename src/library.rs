//! Workout lookup across the curated library, generated workouts and the
//! user's custom workouts.

use crate::custom::CustomWorkout;
use crate::generator::{generate_rounds, GeneratorError};
use crate::workout::{Level, Workout, WorkoutCategory};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

static LIBRARY_DIR: Dir = include_dir!("src/library");

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library file not found: {0}")]
    Missing(&'static str),
    #[error("library file {0} is not UTF-8")]
    Encoding(&'static str),
    #[error("unable to parse library file {file}: {source}")]
    Parse {
        file: &'static str,
        source: serde_json::Error,
    },
}

/// Library entry whose rounds are produced by the prompt generator on demand
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedWorkout {
    pub id: String,
    pub title: String,
    pub level: Level,
    pub category: WorkoutCategory,
    pub total_rounds: u32,
    pub round_duration_secs: u32,
    pub rest_between_rounds_secs: u32,
    pub estimated_calories: u32,
}

impl GeneratedWorkout {
    pub fn to_workout<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Workout, GeneratorError> {
        Ok(Workout {
            id: self.id.clone(),
            title: self.title.clone(),
            level: self.level,
            category: self.category,
            rest_between_rounds_secs: self.rest_between_rounds_secs,
            estimated_calories: self.estimated_calories,
            rounds: generate_rounds(self.total_rounds, self.level, self.round_duration_secs, rng)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Curated,
    Generated,
    Custom,
}

/// Listing row for `--list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub level: Level,
    pub rounds: u32,
    pub source: Source,
}

/// Resolve a workout id to a playable workout
pub trait WorkoutSource {
    fn resolve(&mut self, workout_id: &str, custom: Option<&[CustomWorkout]>) -> Option<Workout>;
}

fn read_json<T: for<'de> Deserialize<'de>>(file: &'static str) -> Result<T, LibraryError> {
    let contents = LIBRARY_DIR
        .get_file(file)
        .ok_or(LibraryError::Missing(file))?
        .contents_utf8()
        .ok_or(LibraryError::Encoding(file))?;
    serde_json::from_str(contents).map_err(|source| LibraryError::Parse { file, source })
}

pub struct WorkoutCatalog<R: Rng> {
    curated: Vec<Workout>,
    generated: Vec<GeneratedWorkout>,
    level: Option<Level>,
    rng: R,
}

impl WorkoutCatalog<StdRng> {
    /// Built-in library; a seed makes generated rounds reproducible
    pub fn builtin(seed: Option<u64>) -> Result<Self, LibraryError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::builtin_with_rng(rng)
    }
}

impl<R: Rng> WorkoutCatalog<R> {
    pub fn builtin_with_rng(rng: R) -> Result<Self, LibraryError> {
        Ok(Self::from_parts(
            read_json("curated.json")?,
            read_json("generated.json")?,
            rng,
        ))
    }

    pub fn from_parts(curated: Vec<Workout>, generated: Vec<GeneratedWorkout>, rng: R) -> Self {
        let ids = curated.iter().map(|w| &w.id);
        for id in ids.chain(generated.iter().map(|g| &g.id)).duplicates() {
            warn!(workout_id = %id, "duplicate workout id, the first match wins");
        }
        Self {
            curated,
            generated,
            level: None,
            rng,
        }
    }

    /// Generate rounds at `level` instead of each entry's listed level
    pub fn with_level(mut self, level: Option<Level>) -> Self {
        self.level = level;
        self
    }

    pub fn entries(&self, custom: &[CustomWorkout]) -> Vec<CatalogEntry> {
        let curated = self.curated.iter().map(|w| CatalogEntry {
            id: w.id.clone(),
            title: w.title.clone(),
            level: w.level,
            rounds: w.total_rounds() as u32,
            source: Source::Curated,
        });
        let generated = self.generated.iter().map(|g| CatalogEntry {
            id: g.id.clone(),
            title: g.title.clone(),
            level: self.level.unwrap_or(g.level),
            rounds: g.total_rounds,
            source: Source::Generated,
        });
        let custom = custom.iter().map(|c| CatalogEntry {
            id: c.id.clone(),
            title: c.title.clone(),
            level: c.level,
            rounds: c.total_rounds,
            source: Source::Custom,
        });
        curated.chain(generated).chain(custom).collect()
    }
}

impl<R: Rng> WorkoutSource for WorkoutCatalog<R> {
    fn resolve(&mut self, workout_id: &str, custom: Option<&[CustomWorkout]>) -> Option<Workout> {
        if let Some(w) = self.curated.iter().find(|w| w.id == workout_id) {
            debug!(workout_id, "resolved from curated library");
            return Some(w.clone());
        }

        if let Some(g) = self.generated.iter().find(|g| g.id == workout_id) {
            let mut g = g.clone();
            g.level = self.level.unwrap_or(g.level);
            match g.to_workout(&mut self.rng) {
                Ok(w) => {
                    debug!(workout_id, "generated workout");
                    return Some(w);
                }
                Err(e) => warn!(workout_id, error = %e, "unable to generate workout"),
            }
        }

        let found = custom
            .unwrap_or_default()
            .iter()
            .find(|c| c.id == workout_id)
            .map(CustomWorkout::to_workout);
        if found.is_some() {
            debug!(workout_id, "resolved from custom workouts");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> WorkoutCatalog<StdRng> {
        WorkoutCatalog::builtin(Some(9)).unwrap()
    }

    fn custom() -> Vec<CustomWorkout> {
        vec![CustomWorkout {
            id: "mine".into(),
            title: "Mine".into(),
            level: Level::Beginner,
            category: WorkoutCategory::Shadowboxing,
            total_rounds: 2,
            round_duration_secs: 60,
            rest_between_rounds_secs: 20,
            combos: vec!["Jab".into()],
            call_interval_secs: 10,
            estimated_calories: 0,
        }]
    }

    #[test]
    fn builtin_library_loads() {
        let c = catalog();
        let entries = c.entries(&[]);
        assert!(entries.iter().any(|e| e.source == Source::Curated));
        assert!(entries.iter().any(|e| e.source == Source::Generated));
        assert!(entries.iter().map(|e| &e.id).all_unique());
    }

    #[test]
    fn curated_timelines_are_sorted_and_inside_their_rounds() {
        let mut c = catalog();
        for entry in c.entries(&[]) {
            let w = c.resolve(&entry.id, None).unwrap();
            for round in &w.rounds {
                assert!(round
                    .timeline
                    .iter()
                    .tuple_windows()
                    .all(|(a, b)| a.time_offset_secs <= b.time_offset_secs));
                assert!(round
                    .timeline
                    .iter()
                    .all(|p| p.time_offset_secs < round.duration_secs));
            }
        }
    }

    #[test]
    fn resolves_generated_workouts() {
        let mut c = catalog();
        let w = c.resolve("classic-six", None).unwrap();
        assert_eq!(w.total_rounds(), 6);
        assert_eq!(w.level, Level::Intermediate);
        assert!(w.rounds.iter().all(|r| !r.timeline.is_empty()));
    }

    #[test]
    fn level_override_applies_to_generated_only() {
        let mut c = catalog().with_level(Some(Level::Advanced));
        assert_eq!(c.resolve("quick-three", None).unwrap().level, Level::Advanced);
        assert_eq!(
            c.resolve("jab-cross-fundamentals", None).unwrap().level,
            Level::Beginner
        );
    }

    #[test]
    fn resolves_custom_workouts_last() {
        let mut c = catalog();
        let list = custom();
        assert_eq!(c.resolve("mine", None), None);
        let w = c.resolve("mine", Some(list.as_slice())).unwrap();
        assert_eq!(w.total_rounds(), 2);
        assert!(c.entries(&list).iter().any(|e| e.source == Source::Custom));
    }

    #[test]
    fn curated_wins_over_custom_with_same_id() {
        let mut c = catalog();
        let mut list = custom();
        list[0].id = "slip-and-counter".into();
        let w = c.resolve("slip-and-counter", Some(list.as_slice())).unwrap();
        assert_eq!(w.title, "Slip & Counter");
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(catalog().resolve("no-such-workout", Some(custom().as_slice())), None);
    }

    #[test]
    fn broken_generated_entry_falls_through() {
        let broken = GeneratedWorkout {
            id: "too-short".into(),
            title: "Too Short".into(),
            level: Level::Beginner,
            category: WorkoutCategory::Boxing,
            total_rounds: 1,
            round_duration_secs: 20,
            rest_between_rounds_secs: 0,
            estimated_calories: 0,
        };
        let mut c = WorkoutCatalog::from_parts(vec![], vec![broken], StdRng::seed_from_u64(0));
        assert_eq!(c.resolve("too-short", None), None);
    }
}
