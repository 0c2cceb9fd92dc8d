use checker_core::validation::{
    validate_cv_content, validate_file, validate_job_description, validate_linkedin_url,
    MAX_FILE_SIZE,
};
use checker_core::ValidationError;

#[test]
fn file_size_boundary_is_exactly_two_megabytes() {
    assert_eq!(validate_file("resume.md", 0), Ok(()));
    assert_eq!(validate_file("resume.md", MAX_FILE_SIZE - 1), Ok(()));
    assert_eq!(
        validate_file("resume.md", MAX_FILE_SIZE),
        Err(ValidationError::FileTooLarge {
            size: MAX_FILE_SIZE
        })
    );
    assert!(validate_file("resume.md", MAX_FILE_SIZE + 1).is_err());
}

#[test]
fn only_markdown_files_are_accepted() {
    assert!(validate_file("resume.md", 10).is_ok());
    assert!(validate_file("RESUME.MD", 10).is_ok());
    for name in ["resume.pdf", "resume.docx", "resume.md.txt", "resume", "md"] {
        assert_eq!(
            validate_file(name, 10),
            Err(ValidationError::NotMarkdown {
                filename: name.to_string()
            }),
            "{name}"
        );
    }
}

#[test]
fn extension_is_checked_before_size() {
    assert!(matches!(
        validate_file("huge.pdf", MAX_FILE_SIZE * 2),
        Err(ValidationError::NotMarkdown { .. })
    ));
}

#[test]
fn cv_content_fails_iff_under_one_hundred_chars() {
    for len in 0..300 {
        let text = "x".repeat(len);
        assert_eq!(validate_cv_content(&text).is_err(), len < 100, "len = {len}");
    }
}

#[test]
fn job_description_bounds_are_inclusive() {
    for len in [0, 1, 49, 50, 51, 5_000, 9_999, 10_000, 10_001, 20_000] {
        let text = "y".repeat(len);
        let expect_err = !(50..=10_000).contains(&len);
        assert_eq!(
            validate_job_description(&text).is_err(),
            expect_err,
            "len = {len}"
        );
    }
}

#[test]
fn lengths_count_characters_not_bytes() {
    let text = "é".repeat(100);
    assert!(text.len() > 100);
    assert!(validate_cv_content(&text).is_ok());
    assert_eq!(
        validate_cv_content(&"é".repeat(99)),
        Err(ValidationError::CvTooShort { chars: 99 })
    );
}

#[test]
fn linkedin_urls_are_validated_and_normalized() {
    let cases = [
        (
            "https://www.linkedin.com/jobs/view/123456789/",
            "https://www.linkedin.com/jobs/view/123456789",
        ),
        (
            "https://linkedin.com/jobs/view/123456789?trk=abc#top",
            "https://linkedin.com/jobs/view/123456789",
        ),
        (
            "http://www.linkedin.com/jobs/collections/recommended/987/",
            "http://www.linkedin.com/jobs/collections/recommended/987",
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(validate_linkedin_url(input).as_deref(), Ok(expected));
    }
}

#[test]
fn non_job_urls_are_rejected() {
    for url in [
        "",
        "not a url",
        "ftp://linkedin.com/jobs/view/1",
        "https://evil.com/jobs/view/1",
        "https://uk.linkedin.com/jobs/view/1",
        "https://linkedin.com/in/someone",
        "https://linkedin.com/jobs/view/abc",
        "https://linkedin.com/jobs/collections/recommended",
    ] {
        assert!(validate_linkedin_url(url).is_err(), "{url}");
    }
}
