//! Pure input checks run before anything is sent to the backend.

use thiserror::Error;
use url::Url;

/// Uploads of this size or larger are rejected.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;
pub const MIN_CV_CHARS: usize = 100;
pub const MIN_JOB_CHARS: usize = 50;
pub const MAX_JOB_CHARS: usize = 10_000;

const LINKEDIN_HOSTS: [&str; 2] = ["linkedin.com", "www.linkedin.com"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("only Markdown (.md) files are supported, got {filename}")]
    NotMarkdown { filename: String },
    #[error("file is too large ({size} bytes); the limit is 2 MB")]
    FileTooLarge { size: u64 },
    #[error("CV content is too short ({chars} characters); at least 100 are required")]
    CvTooShort { chars: usize },
    #[error("job description is too short ({chars} characters); at least 50 are required")]
    JobTooShort { chars: usize },
    #[error("job description is too long ({chars} characters); at most 10000 are allowed")]
    JobTooLong { chars: usize },
    #[error("not a LinkedIn job URL: {url}")]
    NotLinkedinJobUrl { url: String },
}

pub fn validate_file(filename: &str, size_bytes: u64) -> Result<(), ValidationError> {
    if !has_markdown_extension(filename) {
        return Err(ValidationError::NotMarkdown {
            filename: filename.to_string(),
        });
    }
    if size_bytes >= MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge { size: size_bytes });
    }
    Ok(())
}

pub fn validate_cv_content(text: &str) -> Result<(), ValidationError> {
    let chars = text.chars().count();
    if chars < MIN_CV_CHARS {
        return Err(ValidationError::CvTooShort { chars });
    }
    Ok(())
}

pub fn validate_job_description(text: &str) -> Result<(), ValidationError> {
    let chars = text.chars().count();
    if chars < MIN_JOB_CHARS {
        return Err(ValidationError::JobTooShort { chars });
    }
    if chars > MAX_JOB_CHARS {
        return Err(ValidationError::JobTooLong { chars });
    }
    Ok(())
}

/// Checks a LinkedIn job posting URL and returns it without query, fragment
/// or trailing slash.
///
/// Accepted paths start with `/jobs/view/<id>` or
/// `/jobs/collections/<name>/<id>`; anything after the id is tolerated.
pub fn validate_linkedin_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let reject = || ValidationError::NotLinkedinJobUrl {
        url: trimmed.to_string(),
    };

    let parsed = Url::parse(trimmed).map_err(|_| reject())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(reject());
    }
    let host = parsed.host_str().ok_or_else(reject)?;
    if !LINKEDIN_HOSTS.contains(&host) || parsed.port().is_some() {
        return Err(reject());
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|parts| parts.collect())
        .unwrap_or_default();
    let is_job_path = match segments.as_slice() {
        ["jobs", "view", id, ..] => is_numeric(id),
        ["jobs", "collections", name, id, ..] => !name.is_empty() && is_numeric(id),
        _ => false,
    };
    if !is_job_path {
        return Err(reject());
    }

    let normalized = format!("{}://{}{}", parsed.scheme(), host, parsed.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

fn has_markdown_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("md"))
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
