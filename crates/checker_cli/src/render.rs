//! Terminal output. Reports go to stdout; progress and errors to stderr.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use checker_core::{AnalysisResult, AppViewModel, HistoryRowView, JobFetchStatus, Subscriber};
use indicatif::{ProgressBar, ProgressStyle};

const STEP_TEMPLATE: &str = "{spinner} [{bar:24}] {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{spinner} {msg}";

/// Mirrors analysis and job fetch status on an `indicatif` bar, shown only
/// while something is running.
#[derive(Clone, Default)]
pub struct StatusBar {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store subscriber that keeps the bar in sync with the view.
    pub fn subscriber(&self) -> Subscriber {
        let status = self.clone();
        Box::new(move |view: &AppViewModel| status.update(view))
    }

    pub fn update(&self, view: &AppViewModel) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        if view.is_loading {
            let bar = slot.get_or_insert_with(spinner);
            match &view.progress {
                Some(progress) => {
                    bar.set_style(style(STEP_TEMPLATE));
                    bar.set_length(u64::from(progress.total_steps));
                    bar.set_position(u64::from(progress.current_step));
                    bar.set_message(progress.message.clone());
                }
                None => bar.set_message("Submitting analysis..."),
            }
        } else if let JobFetchStatus::Fetching { url } = &view.job_fetch {
            slot.get_or_insert_with(spinner)
                .set_message(format!("Fetching job description from {url}"));
        } else if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }

    pub fn clear(&self) {
        if let Some(bar) = self.bar.lock().ok().and_then(|mut slot| slot.take()) {
            bar.finish_and_clear();
        }
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(style(SPINNER_TEMPLATE));
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .progress_chars("=> ")
}

pub fn print_result(result: &AnalysisResult) {
    println!("Analysis {}", result.analysis_id);
    println!(
        "Overall score: {:.0}/100 ({})",
        result.overall_score,
        score_label(result.overall_score)
    );

    if !result.skill_matches.is_empty() {
        let matched = result
            .skill_matches
            .iter()
            .filter(|skill| skill.candidate_has)
            .count();
        println!();
        println!("Skills ({matched}/{} matched)", result.skill_matches.len());
        for skill in &result.skill_matches {
            let mark = if skill.candidate_has { "+" } else { "-" };
            let required = if skill.required { " (required)" } else { "" };
            let level = skill
                .proficiency_level
                .as_deref()
                .map(|level| format!(", {level}"))
                .unwrap_or_default();
            println!("  {mark} {}{required}{level}", skill.skill_name);
        }
    }

    print_section("Strengths", &result.strengths);
    print_section("Gaps", &result.gaps);
    print_section("Recommendations", &result.recommendations);
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{title}");
    for item in items {
        println!("  * {item}");
    }
}

pub fn print_history(rows: &[HistoryRowView]) {
    if rows.is_empty() {
        println!("No analyses yet.");
        return;
    }
    for row in rows {
        println!(
            "{}  {:>5.1}  {:<24}  {}",
            row.timestamp.format("%Y-%m-%d %H:%M"),
            row.score,
            row.cv_filename,
            row.id
        );
    }
}

pub fn print_health(healthy: bool, base_url: &str) {
    if healthy {
        println!("Backend at {base_url} is healthy.");
    } else {
        println!("Backend at {base_url} is unreachable or degraded.");
    }
}

/// What the user can do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHint {
    /// Transient or backend failure.
    Retry,
    /// Rejected before anything was sent.
    FixInput,
    /// The user stopped the run.
    Cancelled,
    /// Lookup in saved history failed.
    ListHistory,
}

impl ErrorHint {
    pub fn text(self) -> &'static str {
        match self {
            ErrorHint::Retry => "Run the same command again to retry.",
            ErrorHint::FixInput => "Fix the input and run the command again.",
            ErrorHint::Cancelled => "Run the command again to start a new analysis.",
            ErrorHint::ListHistory => "Run `cv-checker history` to list saved analyses.",
        }
    }
}

pub fn print_error(message: &str, hint: ErrorHint) {
    eprintln!("Error: {message}");
    eprintln!("{}", hint.text());
}

pub fn score_label(score: f64) -> &'static str {
    match score {
        s if s >= 80.0 => "excellent match",
        s if s >= 60.0 => "good match",
        s if s >= 40.0 => "fair match",
        _ => "weak match",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_hint_has_text() {
        for hint in [
            ErrorHint::Retry,
            ErrorHint::FixInput,
            ErrorHint::Cancelled,
            ErrorHint::ListHistory,
        ] {
            assert!(hint.text().ends_with('.'), "{hint:?}");
        }
    }

    #[test]
    fn score_labels_use_inclusive_lower_bounds() {
        assert_eq!(score_label(80.0), "excellent match");
        assert_eq!(score_label(79.9), "good match");
        assert_eq!(score_label(40.0), "fair match");
        assert_eq!(score_label(12.0), "weak match");
    }
}
