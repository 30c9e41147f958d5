use serde::{Deserialize, Serialize};

/// Kind of coaching instruction, used for styling and voice selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromptCategory {
    Combo,
    Defense,
    Movement,
    Breathing,
    Stance,
    Rest,
}

/// A single timestamped coaching instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(rename = "at")]
    pub time_offset_secs: u32,
    pub text: String,
    pub category: PromptCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
}

impl Prompt {
    pub fn new(time_offset_secs: u32, text: impl Into<String>, category: PromptCategory) -> Self {
        Self {
            time_offset_secs,
            text: text.into(),
            category,
            audio_ref: None,
        }
    }

    pub fn with_audio(mut self, uri: impl Into<String>) -> Self {
        self.audio_ref = Some(uri.into());
        self
    }
}

/// Prompts of one round, ordered by offset.
///
/// Construction sorts with a stable sort, so prompts sharing an offset keep
/// the order they were declared in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Prompt>", into = "Vec<Prompt>")]
pub struct Timeline {
    prompts: Vec<Prompt>,
}

impl Timeline {
    pub fn new(mut prompts: Vec<Prompt>) -> Self {
        prompts.sort_by_key(|p| p.time_offset_secs);
        Self { prompts }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prompt> {
        self.prompts.iter()
    }
}

impl From<Vec<Prompt>> for Timeline {
    fn from(prompts: Vec<Prompt>) -> Self {
        Timeline::new(prompts)
    }
}

impl From<Timeline> for Vec<Prompt> {
    fn from(t: Timeline) -> Self {
        t.prompts
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Prompt;
    type IntoIter = std::slice::Iter<'a, Prompt>;

    fn into_iter(self) -> Self::IntoIter {
        self.prompts.iter()
    }
}

/// One timed segment of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub duration_secs: u32,
    pub timeline: Timeline,
}

impl Round {
    pub fn new(round_number: u32, duration_secs: u32, timeline: Timeline) -> Self {
        Self {
            round_number,
            duration_secs,
            timeline,
        }
    }
}
