#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use checker_core::{update, AnalysisResult, AppState, Effect, Msg, Timestamp};

pub fn at(seconds: i64) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

pub fn cv_text(chars: usize) -> String {
    "a".repeat(chars)
}

pub fn job_text(chars: usize) -> String {
    "j".repeat(chars)
}

pub fn result_with_score(id: &str, score: f64) -> AnalysisResult {
    AnalysisResult {
        analysis_id: id.to_string(),
        overall_score: score,
        skill_matches: Vec::new(),
        experience_match: serde_json::json!({"match": true}),
        education_match: serde_json::Value::Null,
        strengths: vec!["Rust".to_string()],
        gaps: Vec::new(),
        recommendations: vec!["Mention async work".to_string()],
    }
}

/// State with a valid CV and job description loaded.
pub fn ready_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::UploadCv {
            filename: "resume.md".to_string(),
            content: cv_text(150),
            at: at(0),
        },
    );
    let (state, _) = update(
        state,
        Msg::UpdateJobDescription {
            text: job_text(60),
            at: at(1),
        },
    );
    state
}

pub fn submit(state: AppState) -> (AppState, Vec<Effect>) {
    update(state, Msg::SubmitAnalysis { streaming: true })
}
