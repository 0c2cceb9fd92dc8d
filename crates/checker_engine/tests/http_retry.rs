mod common;

use std::time::Duration;

use checker_engine::{ApiError, CheckerApi, ClientSettings, FieldError, ReqwestApi};
use common::{api_for, request, result_json, settings_for};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn transient_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_json("a-1", 82.0)))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let result = api
        .analyze(&request(), &CancellationToken::new())
        .await
        .expect("third attempt succeeds");
    assert_eq!(result.analysis_id, "a-1");
    assert_eq!(result.overall_score, 82.0);
}

#[tokio::test]
async fn retries_stop_after_the_configured_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = api_for(&server)
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 500,
            message: "An unexpected server error occurred".into()
        }
    );
}

#[tokio::test]
async fn rate_limiting_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_json("a-2", 40.0)))
        .mount(&server)
        .await;

    let result = api_for(&server)
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.analysis_id, "a-2");
}

#[tokio::test]
async fn client_errors_fail_on_the_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "Not Found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server)
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Request {
            status: 404,
            message: "Not Found".into()
        }
    );
    assert!(!err.is_transient());
}

#[tokio::test]
async fn validation_errors_carry_field_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "detail": [
                {"loc": ["body", "cv_markdown"], "msg": "String should have at least 100 characters", "type": "string_too_short"},
                {"loc": ["body", "job_description"], "msg": "Field required", "type": "missing"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server)
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    let ApiError::Validation { message, fields } = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(
        fields,
        vec![
            FieldError {
                field: "cv_markdown".into(),
                message: "String should have at least 100 characters".into()
            },
            FieldError {
                field: "job_description".into(),
                message: "Field required".into()
            },
        ]
    );
    assert_eq!(
        message,
        "cv_markdown: String should have at least 100 characters; job_description: Field required"
    );
}

#[tokio::test]
async fn request_body_is_sent_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .and(body_partial_json(serde_json::json!({
            "cv_filename": "jane.md",
            "source_type": "manual"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_json("a-3", 70.0)))
        .expect(1)
        .mount(&server)
        .await;

    let result = api_for(&server)
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.analysis_id, "a-3");
}

#[tokio::test]
async fn timeouts_are_reported_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(result_json("slow", 10.0))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        analysis_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let err = ReqwestApi::new(settings)
        .unwrap()
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_a_no_response_error() {
    let settings = ClientSettings {
        base_url: "http://127.0.0.1:9/api/v1".into(),
        max_retries: 1,
        retry_base_delay: Duration::from_millis(1),
        ..ClientSettings::default()
    };
    let err = ReqwestApi::new(settings)
        .unwrap()
        .analyze(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NoResponse { .. }), "{err:?}");
}

#[tokio::test]
async fn cancelled_token_aborts_the_blocking_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(result_json("late", 10.0))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });
    let err = api_for(&server).analyze(&request(), &cancel).await.unwrap_err();
    assert_eq!(err, ApiError::Cancelled);
}

#[test]
fn invalid_base_url_is_rejected_up_front() {
    let settings = ClientSettings {
        base_url: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(matches!(
        ReqwestApi::new(settings),
        Err(ApiError::InvalidUrl(_))
    ));
}
