use crate::prompt::{Prompt, PromptCategory, Round, Timeline};
use crate::workout::Level;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use PromptCategory::{Breathing, Combo, Defense, Movement, Stance};

/// Seconds reserved for the opening calls
pub const OPENING_SECS: u32 = 10;
/// Seconds reserved for the closing calls
pub const CLOSING_SECS: u32 = 15;
/// Shortest round the generator accepts is one second longer than this
pub const MIN_DURATION_SECS: u32 = 30;

const VARIATION_LEN: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("round duration must be over {MIN_DURATION_SECS}s, got {0}s")]
    DurationTooShort(u32),
    #[error("round numbers start at 1")]
    InvalidRound,
}

type Call = (&'static str, PromptCategory);
type Variation = [Call; VARIATION_LEN as usize];

const GREETINGS: [&str; 5] = [
    "Round one! Let's go!",
    "Round two! Stay sharp!",
    "Round three! Keep the pace!",
    "Round four! Dig deep!",
    "Round five! Finish strong!",
];

const SECOND_OPENING: Call = ("Hands up, chin down", Stance);

const BEGINNER: [Variation; 3] = [
    [
        ("Jab", Combo),
        ("Jab, jab", Combo),
        ("1-2", Combo),
        ("Step back, reset", Movement),
        ("Jab", Combo),
        ("1-2", Combo),
        ("Breathe out on every punch", Breathing),
        ("Jab, cross", Combo),
        ("Move your feet", Movement),
        ("1-2", Combo),
    ],
    [
        ("1-2", Combo),
        ("Block", Defense),
        ("Jab", Combo),
        ("Duck", Defense),
        ("1-2", Combo),
        ("Circle left", Movement),
        ("Jab, jab, cross", Combo),
        ("Hands back to your face", Stance),
        ("1-2", Combo),
        ("Block, 1-2", Combo),
    ],
    [
        ("Jab to the body", Combo),
        ("Jab up top", Combo),
        ("1-2", Combo),
        ("Slip", Defense),
        ("Jab", Combo),
        ("Stay on your toes", Movement),
        ("1-2-3", Combo),
        ("Breathe", Breathing),
        ("Jab, jab", Combo),
        ("1-2", Combo),
    ],
];

const INTERMEDIATE: [Variation; 3] = [
    [
        ("1-2-3", Combo),
        ("Slip, slip", Defense),
        ("1-2-3-2", Combo),
        ("Pivot out", Movement),
        ("Jab, cross, hook", Combo),
        ("Roll under", Defense),
        ("3-2", Combo),
        ("Double jab, cross", Combo),
        ("Exhale sharp", Breathing),
        ("1-2-3-2", Combo),
    ],
    [
        ("1-2, slip", Combo),
        ("Lead hook to the body", Combo),
        ("Duck", Defense),
        ("1-6-3-2", Combo),
        ("Angle off", Movement),
        ("Jab, rear uppercut", Combo),
        ("Slip, 2", Combo),
        ("Stay tight", Stance),
        ("1-2-3", Combo),
        ("Roll, 3-2", Combo),
    ],
    [
        ("Double jab", Combo),
        ("1-2-3", Combo),
        ("Slip right, slip left", Defense),
        ("2-3-2", Combo),
        ("Step in, 1-2", Movement),
        ("Body, head", Combo),
        ("Pull back", Defense),
        ("1-2-5-2", Combo),
        ("Breathe through it", Breathing),
        ("3-2-3", Combo),
    ],
];

const ADVANCED: [Variation; 3] = [
    [
        ("1-2-3-2-3", Combo),
        ("Slip, roll, 3-2", Combo),
        ("1-1-2-3-6", Combo),
        ("Pivot, 3", Movement),
        ("Roll under, 3-2-3", Combo),
        ("Pull counter 2", Defense),
        ("1-2-3-4", Combo),
        ("Switch stance", Stance),
        ("Body 3, head 3", Combo),
        ("1-2-3-2-1-2", Combo),
    ],
    [
        ("Feint jab, 2-3", Combo),
        ("Slip slip, 2-3-2", Combo),
        ("1-6-3-2", Combo),
        ("Cut the angle", Movement),
        ("Check hook", Defense),
        ("2-3-6-3", Combo),
        ("Shoulder roll, 2", Defense),
        ("1-2-3, roll, 3-2", Combo),
        ("Control your breath", Breathing),
        ("Everything! 1-2-3-4", Combo),
    ],
    [
        ("3-3-2", Combo),
        ("Catch, 2", Defense),
        ("1-2, roll, 2-3-2", Combo),
        ("L-step out", Movement),
        ("5-6-3-2", Combo),
        ("Parry, 1-2", Defense),
        ("Body, body, head", Combo),
        ("Double hook", Combo),
        ("Stay low", Stance),
        ("1-2-3-2-3-2", Combo),
    ],
];

const CLOSING: [(u32, Call); 5] = [
    (15, ("Fifteen seconds! Push!", Combo)),
    (10, ("Ten seconds! Everything you've got!", Combo)),
    (5, ("Five!", Combo)),
    (3, ("Keep punching!", Combo)),
    (1, ("Time!", Breathing)),
];

fn variations(level: Level) -> &'static [Variation; 3] {
    match level {
        Level::Beginner => &BEGINNER,
        Level::Intermediate => &INTERMEDIATE,
        Level::Advanced => &ADVANCED,
    }
}

fn greeting(round_number: u32) -> String {
    match GREETINGS.get(round_number as usize - 1) {
        Some(g) => g.to_string(),
        None => format!("Round {round_number}! Ready!"),
    }
}

/// Generate one round's timeline: fixed opening, a random middle variation
/// for `level`, fixed closing.
pub fn generate<R: Rng + ?Sized>(
    round_number: u32,
    level: Level,
    duration_secs: u32,
    rng: &mut R,
) -> Result<Timeline, GeneratorError> {
    if round_number == 0 {
        return Err(GeneratorError::InvalidRound);
    }
    if duration_secs <= MIN_DURATION_SECS {
        return Err(GeneratorError::DurationTooShort(duration_secs));
    }

    let mut prompts = Vec::with_capacity(2 + VARIATION_LEN as usize + CLOSING.len());
    prompts.push(Prompt::new(0, greeting(round_number), Stance));
    prompts.push(Prompt::new(3, SECOND_OPENING.0, SECOND_OPENING.1));

    let middle_secs = duration_secs - OPENING_SECS - CLOSING_SECS;
    let spacing = middle_secs / VARIATION_LEN;
    let variation = variations(level)
        .choose(rng)
        .unwrap_or(&variations(level)[0]);
    prompts.extend(
        variation
            .iter()
            .enumerate()
            .map(|(i, (text, category))| {
                Prompt::new(OPENING_SECS + i as u32 * spacing, *text, *category)
            }),
    );

    prompts.extend(
        CLOSING
            .iter()
            .map(|(before_end, (text, category))| {
                Prompt::new(duration_secs - before_end, *text, *category)
            }),
    );

    Ok(Timeline::new(prompts))
}

/// Generate every round of a dynamic workout
pub fn generate_rounds<R: Rng + ?Sized>(
    total_rounds: u32,
    level: Level,
    duration_secs: u32,
    rng: &mut R,
) -> Result<Vec<Round>, GeneratorError> {
    (1..=total_rounds)
        .map(|n| generate(n, level, duration_secs, &mut *rng).map(|t| Round::new(n, duration_secs, t)))
        .collect()
}
