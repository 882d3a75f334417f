use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage-{}", self.0)
    }
}

/// Identifier wrapper for candidates tracked on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cand-{:06}", self.0)
    }
}

/// Coarse classification of a stage, used for badges and summary rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum StageType {
    #[default]
    Screening,
    Interview,
    Decision,
    Final,
}

impl StageType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Screening, Self::Interview, Self::Decision, Self::Final]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Screening => "Screening",
            Self::Interview => "Interview",
            Self::Decision => "Decision",
            Self::Final => "Final",
        }
    }
}

/// A named step in the hiring pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    /// 1-based rank; dense across the registry.
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    Completed,
    Current,
}

impl TimelineStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Current => "current",
        }
    }
}

/// One row of a candidate's stage history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub stage_id: StageId,
    /// Stage name as it read when the entry was written.
    pub stage: String,
    pub date: NaiveDate,
    pub note: String,
    pub status: TimelineStatus,
}

/// Collaboration note left on a candidate card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Candidate record owned by the store.
///
/// `current_stage` is authoritative; the timeline is an append-only audit log whose last entry
/// is the only one marked [`TimelineStatus::Current`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub assigned_recruiter: String,
    pub comment_count: u32,
    pub last_activity: DateTime<Utc>,
    pub(crate) current_stage: StageId,
    pub(crate) timeline: Vec<TimelineEntry>,
    pub(crate) comments: Vec<Comment>,
}

impl Candidate {
    pub fn current_stage(&self) -> StageId {
        self.current_stage
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Avatar initials shown on cards.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Fields accepted when creating a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandidate {
    pub name: String,
    pub position: String,
    pub assigned_recruiter: String,
    pub stage: StageId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewCandidate {
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        assigned_recruiter: impl Into<String>,
        stage: StageId,
    ) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
            assigned_recruiter: assigned_recruiter.into(),
            stage,
            email: None,
            phone: None,
            location: None,
        }
    }
}

/// Partial edit of a candidate's profile. Stage changes go through the transition engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// Search constraints applied by the board. Blank values and `"all"` match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilter {
    pub search: Option<String>,
    pub position: Option<String>,
    pub recruiter: Option<String>,
    pub stage: Option<StageId>,
}

impl CandidateFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(term) = active(&self.search) {
            let term = term.to_lowercase();
            let hit = candidate.name.to_lowercase().contains(&term)
                || candidate.position.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(position) = active(&self.position) {
            if !candidate.position.eq_ignore_ascii_case(position) {
                return false;
            }
        }

        if let Some(recruiter) = active(&self.recruiter) {
            if !candidate.assigned_recruiter.eq_ignore_ascii_case(recruiter) {
                return false;
            }
        }

        match self.stage {
            Some(stage) => candidate.current_stage == stage,
            None => true,
        }
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

const DEFAULT_PAGE_SIZE: usize = 20;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

impl<T> Paginated<T> {
    pub fn from_items(items: Vec<T>, page: Page) -> Self {
        let size = page.size.max(1);
        let number = page.number.max(1);
        let total = items.len();
        let pages = total.div_ceil(size);

        let items = items
            .into_iter()
            .skip((number - 1).saturating_mul(size))
            .take(size)
            .collect();

        Self {
            items,
            total,
            page: number,
            pages,
        }
    }
}

/// Failures raised by pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("{field} must not be blank")]
    Validation { field: &'static str },
    #[error("stage {0} not found")]
    StageNotFound(StageId),
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("a stage named '{0}' already exists")]
    DuplicateStageName(String),
    #[error("no stage named '{0}'")]
    StageNameNotFound(String),
    #[error("no candidate named '{0}'")]
    CandidateNameNotFound(String),
}

pub(crate) fn required(value: &str, field: &'static str) -> Result<String, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::Validation { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, position: &str, recruiter: &str) -> Candidate {
        let now = DateTime::<Utc>::from_timestamp(1_706_000_000, 0).expect("valid timestamp");
        Candidate {
            id: CandidateId(1),
            name: name.to_string(),
            position: position.to_string(),
            email: None,
            phone: None,
            location: None,
            assigned_recruiter: recruiter.to_string(),
            comment_count: 0,
            last_activity: now,
            current_stage: StageId(1),
            timeline: Vec::new(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn filter_search_is_case_insensitive_across_name_and_position() {
        let c = candidate("Priya Nair", "Full Stack Developer", "Kavya Iyer");
        assert!(CandidateFilter::search("PRIYA").matches(&c));
        assert!(CandidateFilter::search("stack").matches(&c));
        assert!(!CandidateFilter::search("designer").matches(&c));
    }

    #[test]
    fn filter_treats_all_and_blank_as_unconstrained() {
        let c = candidate("Raj Kumar", "Backend Engineer", "Aisha Sharma");
        let filter = CandidateFilter {
            search: Some("  ".to_string()),
            position: Some("all".to_string()),
            recruiter: Some(String::new()),
            stage: None,
        };
        assert!(filter.matches(&c));
    }

    #[test]
    fn filter_combines_position_recruiter_and_stage() {
        let c = candidate("Raj Kumar", "Backend Engineer", "Aisha Sharma");
        let mut filter = CandidateFilter {
            position: Some("backend engineer".to_string()),
            recruiter: Some("Aisha Sharma".to_string()),
            stage: Some(StageId(1)),
            ..CandidateFilter::default()
        };
        assert!(filter.matches(&c));

        filter.stage = Some(StageId(2));
        assert!(!filter.matches(&c));
    }

    #[test]
    fn initials_take_first_letter_of_each_word() {
        let c = candidate("nagendra uggirala", "Senior Developer", "Priya Nair");
        assert_eq!(c.initials(), "NU");
    }

    #[test]
    fn paginate_reports_totals_and_clamps_page_numbers() {
        let page = Paginated::from_items((1..=7).collect::<Vec<_>>(), Page { number: 2, size: 3 });
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.pages, 3);

        let zero = Paginated::from_items(vec![1, 2], Page { number: 0, size: 0 });
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items, vec![1]);
        assert_eq!(zero.pages, 2);

        let past_end = Paginated::from_items(vec![1, 2], Page { number: 9, size: 5 });
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn stage_type_serializes_under_type_key() {
        let stage = Stage {
            id: StageId(3),
            name: "Interview".to_string(),
            stage_type: StageType::Interview,
            order: 3,
        };
        let json = serde_json::to_value(&stage).expect("stage serializes");
        assert_eq!(json["type"], "Interview");
        assert_eq!(json["id"], 3);
    }
}
