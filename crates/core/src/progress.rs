//! Progress read model derived from the learner snapshot.

use crate::phase::{ExpertProfile, Phase};
use crate::student::{CurriculumItem, StudentState};
use serde::Serialize;
use std::num::NonZeroU32;

/// Completion percentage in `0..=100`.
///
/// `completed` is the number of approved topics, blocks and chapters. The
/// result is rounded half-up and capped at 100. An absent snapshot counts as
/// no progress.
pub fn compute_progress(state: Option<&StudentState>, total_curriculum_size: NonZeroU32) -> u8 {
    let Some(state) = state else {
        return 0;
    };
    percentage(state.completed_count() as u64, total_curriculum_size)
}

fn percentage(completed: u64, total: NonZeroU32) -> u8 {
    let total = u64::from(total.get());
    let completed = completed.min(total);
    // round(100 * c / t) == floor((200 * c + t) / (2 * t)) for non-negative c.
    let rounded = (200 * completed + total) / (2 * total);
    rounded as u8
}

/// Where the learner currently is in the curriculum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurriculumPosition {
    pub topic: Option<CurriculumItem>,
    pub block: Option<CurriculumItem>,
    pub chapter: Option<CurriculumItem>,
}

impl CurriculumPosition {
    pub fn from_state(state: &StudentState) -> Self {
        Self {
            topic: state.current_topic(),
            block: state.current_block(),
            chapter: state.current_chapter(),
        }
    }
}

/// Everything the presentation layer needs to draw the progress panel.
/// Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub percentage: u8,
    pub approved_topics: usize,
    pub approved_blocks: usize,
    pub approved_chapters: usize,
    pub position: CurriculumPosition,
    pub expert: ExpertProfile,
    /// False until the first snapshot has arrived.
    pub loaded: bool,
}

impl ProgressView {
    pub fn compute(state: Option<&StudentState>, total_curriculum_size: NonZeroU32) -> Self {
        let percentage = compute_progress(state, total_curriculum_size);
        match state {
            Some(state) => Self {
                percentage,
                approved_topics: state.approved_topics.len(),
                approved_blocks: state.approved_blocks.len(),
                approved_chapters: state.approved_chapters.len(),
                position: CurriculumPosition::from_state(state),
                expert: state.expert(),
                loaded: true,
            },
            None => Self {
                percentage,
                approved_topics: 0,
                approved_blocks: 0,
                approved_chapters: 0,
                position: CurriculumPosition::default(),
                expert: Phase::default().profile(),
                loaded: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::LabelMap;

    fn total(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn labels(ids: impl IntoIterator<Item = i64>) -> LabelMap {
        ids.into_iter().map(|id| (id, format!("item {id}"))).collect()
    }

    fn state_with(topics: usize, blocks: usize, chapters: usize) -> StudentState {
        StudentState {
            approved_topics: labels(0..topics as i64),
            approved_blocks: labels(0..blocks as i64),
            approved_chapters: labels(0..chapters as i64),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_topics_out_of_forty_five() {
        let mut approved = LabelMap::new();
        approved.insert(1, "A".to_string());
        approved.insert(2, "B".to_string());
        let state = StudentState {
            approved_topics: approved,
            ..Default::default()
        };

        assert_eq!(compute_progress(Some(&state), total(45)), 4);
    }

    #[test]
    fn test_absent_state_is_zero() {
        assert_eq!(compute_progress(None, total(45)), 0);
    }

    #[test]
    fn test_clamped_at_one_hundred() {
        assert_eq!(compute_progress(Some(&state_with(3, 2, 0)), total(5)), 100);
        assert_eq!(compute_progress(Some(&state_with(30, 20, 10)), total(5)), 100);
    }

    #[test]
    fn test_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(compute_progress(Some(&state_with(1, 0, 0)), total(8)), 13);
        // 1/3 = 33.33%
        assert_eq!(compute_progress(Some(&state_with(0, 1, 0)), total(3)), 33);
        // 2/3 = 66.67%
        assert_eq!(compute_progress(Some(&state_with(0, 1, 1)), total(3)), 67);
    }

    #[test]
    fn test_monotonic_in_completed_count() {
        let size = total(45);
        let mut previous = 0;
        for completed in 0..60 {
            let state = state_with(completed / 3, completed / 3, completed - 2 * (completed / 3));
            let current = compute_progress(Some(&state), size);
            assert!(current >= previous, "dropped at {completed}");
            previous = current;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_view_without_state() {
        let view = ProgressView::compute(None, total(45));

        assert!(!view.loaded);
        assert_eq!(view.percentage, 0);
        assert_eq!(view.expert.phase, Phase::Intake);
        assert_eq!(view.position, CurriculumPosition::default());
    }

    #[test]
    fn test_view_with_state() {
        let mut state = state_with(2, 1, 1);
        state.current_expert = Some("test".to_string());
        state.current_chapter = Some(labels([9]));

        let view = ProgressView::compute(Some(&state), total(10));

        assert!(view.loaded);
        assert_eq!(view.percentage, 40);
        assert_eq!(view.approved_topics, 2);
        assert_eq!(view.approved_blocks, 1);
        assert_eq!(view.approved_chapters, 1);
        assert_eq!(view.expert.phase, Phase::Assessment);
        assert_eq!(view.position.chapter.map(|c| c.id), Some(9));
        assert_eq!(view.position.topic, None);
    }
}
