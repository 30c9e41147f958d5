//! Resolve which prompt is active at a given second of a round.
//!
//! Both lookups binary-search the sorted timeline. Among prompts sharing an
//! offset, the one declared last is the active one.

use crate::prompt::{Prompt, Timeline};

/// Prompt with the greatest offset `<= elapsed_secs`, or `None` before the first prompt
pub fn current_prompt(timeline: &Timeline, elapsed_secs: u32) -> Option<&Prompt> {
    let prompts = timeline.prompts();
    let idx = prompts.partition_point(|p| p.time_offset_secs <= elapsed_secs);
    idx.checked_sub(1).map(|i| &prompts[i])
}

/// Prompt with the smallest offset `> elapsed_secs`, or `None` at or past the last prompt
pub fn next_prompt(timeline: &Timeline, elapsed_secs: u32) -> Option<&Prompt> {
    let prompts = timeline.prompts();
    let idx = prompts.partition_point(|p| p.time_offset_secs <= elapsed_secs);
    prompts.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptCategory;

    fn abc() -> Timeline {
        Timeline::new(vec![
            Prompt::new(0, "A", PromptCategory::Combo),
            Prompt::new(10, "B", PromptCategory::Combo),
            Prompt::new(20, "C", PromptCategory::Combo),
        ])
    }

    fn text(p: Option<&Prompt>) -> Option<&str> {
        p.map(|p| p.text.as_str())
    }

    #[test]
    fn current_prompt_picks_latest_applicable() {
        let t = abc();
        assert_eq!(text(current_prompt(&t, 5)), Some("A"));
        assert_eq!(text(current_prompt(&t, 15)), Some("B"));
        assert_eq!(text(current_prompt(&t, 25)), Some("C"));
        assert_eq!(text(current_prompt(&t, 10)), Some("B"));
    }

    #[test]
    fn current_prompt_before_first_is_none() {
        let t = Timeline::new(vec![Prompt::new(3, "late", PromptCategory::Combo)]);
        assert_eq!(current_prompt(&t, 0), None);
        assert_eq!(text(next_prompt(&t, 0)), Some("late"));
    }

    #[test]
    fn next_prompt_is_strictly_after() {
        let t = abc();
        assert_eq!(text(next_prompt(&t, 5)), Some("B"));
        assert_eq!(text(next_prompt(&t, 10)), Some("C"));
        assert_eq!(next_prompt(&t, 20), None);
        assert_eq!(next_prompt(&t, 25), None);
    }

    #[test]
    fn empty_timeline_resolves_nothing() {
        let t = Timeline::default();
        assert_eq!(current_prompt(&t, 0), None);
        assert_eq!(next_prompt(&t, 0), None);
    }

    #[test]
    fn equal_offsets_resolve_to_last_declared() {
        let t = Timeline::new(vec![
            Prompt::new(0, "A", PromptCategory::Combo),
            Prompt::new(10, "B1", PromptCategory::Combo),
            Prompt::new(10, "B2", PromptCategory::Defense),
        ]);
        assert_eq!(text(current_prompt(&t, 10)), Some("B2"));
        assert_eq!(text(current_prompt(&t, 11)), Some("B2"));
        // next skips the whole tie group once it is active
        assert_eq!(text(next_prompt(&t, 0)), Some("B1"));
        assert_eq!(next_prompt(&t, 10), None);
    }

    #[test]
    fn binary_search_matches_linear_scan() {
        let t = Timeline::new(vec![
            Prompt::new(2, "a", PromptCategory::Combo),
            Prompt::new(2, "b", PromptCategory::Combo),
            Prompt::new(7, "c", PromptCategory::Combo),
            Prompt::new(30, "d", PromptCategory::Combo),
        ]);
        for elapsed in 0..40 {
            let linear_current = t.iter().filter(|p| p.time_offset_secs <= elapsed).last();
            let linear_next = t.iter().find(|p| p.time_offset_secs > elapsed);
            assert_eq!(current_prompt(&t, elapsed), linear_current, "current at {elapsed}");
            assert_eq!(next_prompt(&t, elapsed), linear_next, "next at {elapsed}");
        }
    }
}
