#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use checker_core::{AnalysisRequest, JobSource};
use checker_engine::{ClientSettings, ProgressSink, ProgressUpdate, ReqwestApi};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Settings pointed at the mock server, with retries fast enough for tests.
pub fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: format!("{}/api/v1", server.uri()),
        retry_base_delay: Duration::from_millis(10),
        ..ClientSettings::default()
    }
}

pub fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(settings_for(server)).unwrap()
}

pub fn request() -> AnalysisRequest {
    AnalysisRequest {
        cv_markdown: format!("# Jane Doe\n\n{}", "Senior Rust engineer. ".repeat(8)),
        job_description: "We are hiring a backend engineer with Rust and Python experience."
            .to_string(),
        cv_filename: Some("jane.md".to_string()),
        source_type: Some(JobSource::Manual),
        source_url: None,
    }
}

pub fn result_json(id: &str, score: f64) -> Value {
    json!({
        "analysis_id": id,
        "overall_score": score,
        "skill_matches": [{
            "skill_name": "Rust",
            "required": true,
            "candidate_has": true,
            "proficiency_level": "expert",
            "years_experience": 5.0,
            "match_score": 95.0
        }],
        "experience_match": {"score": 80},
        "education_match": {},
        "strengths": ["Systems programming"],
        "gaps": ["Kubernetes"],
        "recommendations": ["Mention cloud deployments"]
    })
}

pub fn progress_line(step: u32, status: &str, message: &str) -> String {
    json!({
        "type": "progress",
        "step": step,
        "total_steps": 4,
        "message": message,
        "status": status
    })
    .to_string()
}

pub fn result_line(id: &str, score: f64) -> String {
    json!({"type": "result", "data": result_json(id, score)}).to_string()
}

pub fn ndjson(lines: &[String]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    updates: Arc<Mutex<Vec<ProgressUpdate>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}
