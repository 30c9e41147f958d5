use crate::workout::{Level, WorkoutCategory};

/// Estimate calories burned; `None` means no estimate is available
pub trait CalorieEstimator {
    fn estimate(&self, total_minutes: u32, category: WorkoutCategory, level: Level) -> Option<u32>;
}

/// MET based estimate: kcal/min = MET * 3.5 * kg / 200
#[derive(Debug, Clone, Copy)]
pub struct MetCalorieEstimator {
    pub body_weight_kg: f64,
}

impl MetCalorieEstimator {
    pub fn new(body_weight_kg: f64) -> Self {
        Self { body_weight_kg }
    }

    fn met(category: WorkoutCategory, level: Level) -> f64 {
        let base = match category {
            WorkoutCategory::Shadowboxing => 5.5,
            WorkoutCategory::Defense => 5.0,
            WorkoutCategory::Boxing => 7.8,
            WorkoutCategory::Bagwork => 7.8,
            WorkoutCategory::Conditioning => 8.0,
        };
        let scale = match level {
            Level::Beginner => 0.85,
            Level::Intermediate => 1.0,
            Level::Advanced => 1.2,
        };
        base * scale
    }
}

impl CalorieEstimator for MetCalorieEstimator {
    fn estimate(&self, total_minutes: u32, category: WorkoutCategory, level: Level) -> Option<u32> {
        if total_minutes == 0 || self.body_weight_kg <= 0.0 {
            return None;
        }
        let per_minute = Self::met(category, level) * 3.5 * self.body_weight_kg / 200.0;
        Some((per_minute * total_minutes as f64).round() as u32)
    }
}

/// Estimator that never has an answer, so the workout's static value is used
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEstimate;

impl CalorieEstimator for NoEstimate {
    fn estimate(&self, _: u32, _: WorkoutCategory, _: Level) -> Option<u32> {
        None
    }
}

/// Calories for a finished session: the estimator's answer unless it is absent or zero
pub fn calories_or_fallback(
    estimator: &dyn CalorieEstimator,
    total_minutes: u32,
    category: WorkoutCategory,
    level: Level,
    fallback: u32,
) -> u32 {
    estimator
        .estimate(total_minutes, category, level)
        .filter(|kcal| *kcal > 0)
        .unwrap_or(fallback)
}
