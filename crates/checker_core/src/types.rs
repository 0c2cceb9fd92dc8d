use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvRecord {
    pub filename: String,
    pub content: String,
    pub uploaded_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    #[default]
    Manual,
    LinkedinUrl,
}

impl JobSource {
    pub fn as_str(self) -> &'static str {
        match self {
            JobSource::Manual => "manual",
            JobSource::LinkedinUrl => "linkedin_url",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub text: String,
    pub last_modified: Timestamp,
    pub source_type: JobSource,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// How the user provides the job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobInputMode {
    #[default]
    Manual,
    LinkedinUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Upload,
    Results,
    History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill_name: String,
    pub required: bool,
    pub candidate_has: bool,
    #[serde(default)]
    pub proficiency_level: Option<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
    pub match_score: f64,
}

/// Scored match report produced by the backend. Never modified client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub overall_score: f64,
    #[serde(default)]
    pub skill_matches: Vec<SkillMatch>,
    #[serde(default)]
    pub experience_match: serde_json::Value,
    #[serde(default)]
    pub education_match: serde_json::Value,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    pub current_step: u32,
    pub total_steps: u32,
    pub message: String,
}

impl Progress {
    /// Completion in whole percent, clamped to 0..=100.
    pub fn percent(&self) -> u8 {
        if self.total_steps == 0 {
            return 0;
        }
        let pct = u64::from(self.current_step.min(self.total_steps)) * 100
            / u64::from(self.total_steps);
        pct as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: Timestamp,
    #[serde(alias = "cvFilename")]
    pub cv_filename: String,
    pub score: f64,
    pub result: AnalysisResult,
}

/// Body sent to `/analyze` and `/analyze/stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub cv_markdown: String,
    pub job_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<JobSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobFetchStatus {
    #[default]
    Idle,
    Fetching { url: String },
    Failed { message: String },
}
