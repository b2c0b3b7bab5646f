//! Learner snapshot as reported by the backend.
//!
//! A `StudentState` is only ever built whole from a backend response and
//! replaced whole on the next refresh. Chat responses never patch it field by
//! field.

use crate::phase::{ExpertProfile, Phase};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// `{id: label}` map the backend uses for topics, blocks and chapters.
pub type LabelMap = BTreeMap<i64, String>;

/// One curriculum entry the learner is currently on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurriculumItem {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentState {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub account_id: Option<i64>,

    /// Backend identifier of the active expert, e.g. `"teacher"`.
    #[serde(default)]
    pub current_expert: Option<String>,
    #[serde(default)]
    pub current_topic: Option<LabelMap>,
    #[serde(default)]
    pub current_block: Option<LabelMap>,
    #[serde(default)]
    pub current_chapter: Option<LabelMap>,

    #[serde(default)]
    pub programming_experience: Option<String>,
    #[serde(default)]
    pub education_background: Option<String>,
    #[serde(default)]
    pub learning_goals: Option<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub learning_style: Option<String>,
    #[serde(default)]
    pub lesson_duration: Option<String>,
    #[serde(default)]
    pub preferred_difficulty: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_topics: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommended_blocks: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved_topics: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved_blocks: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved_chapters: LabelMap,

    /// Placement score in `0..=100`, once the assessment expert has run.
    #[serde(default)]
    pub assessment_score: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strong_areas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weak_areas: Vec<String>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StudentState {
    pub fn phase(&self) -> Phase {
        Phase::from_backend_id(self.current_expert.as_deref())
    }

    pub fn expert(&self) -> ExpertProfile {
        self.phase().profile()
    }

    pub fn current_topic(&self) -> Option<CurriculumItem> {
        first_item(self.current_topic.as_ref())
    }

    pub fn current_block(&self) -> Option<CurriculumItem> {
        first_item(self.current_block.as_ref())
    }

    pub fn current_chapter(&self) -> Option<CurriculumItem> {
        first_item(self.current_chapter.as_ref())
    }

    pub fn experience_level(&self) -> Option<&str> {
        self.programming_experience.as_deref()
    }

    pub fn learning_goal(&self) -> Option<&str> {
        self.learning_goals.as_deref()
    }

    /// Approved topics, blocks and chapters combined.
    pub fn completed_count(&self) -> usize {
        self.approved_topics.len() + self.approved_blocks.len() + self.approved_chapters.len()
    }
}

fn first_item(map: Option<&LabelMap>) -> Option<CurriculumItem> {
    map?.iter().next().map(|(id, label)| CurriculumItem {
        id: *id,
        label: label.clone(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 as well as naive ISO timestamps (read as UTC). Anything
/// else becomes `None` rather than failing the whole snapshot.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(raw
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc()))
}
