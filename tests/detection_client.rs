use std::io::Write;
use std::path::Path;

use plantcare_lib::detection::{
    normalize, DetectOptions, DetectionClient, DiseaseDetector, Severity, DEFAULT_RETRY_AFTER_SECS,
};
use plantcare_lib::error::DiagnosisError;

fn sample_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("leaf.jpg");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\xFF\xD8\xFF\xE0 not a real jpeg but bytes are bytes")
        .unwrap();
    path
}

#[tokio::test]
async fn successful_prediction_returns_raw_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "plant_prediction": {"plant": "Tomato", "confidence": 0.97},
                "disease_prediction": {
                    "disease": "Early Blight",
                    "confidence": 0.91,
                    "treatment": "Remove affected leaves",
                    "description": "Fungal infection",
                    "severity": "high"
                }
            }"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = sample_image(&dir);

    let client = DetectionClient::new(server.url());
    let raw = client
        .detect_disease(&image, DetectOptions::default())
        .await
        .unwrap();

    let prediction = normalize(Some(&raw));
    assert_eq!(prediction.plant.as_deref(), Some("Tomato"));
    assert_eq!(prediction.disease, "Early Blight");
    assert_eq!(prediction.severity, Severity::High);
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_with_retry_after_header_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(429)
        .with_header("retry-after", "15")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = sample_image(&dir);

    let client = DetectionClient::new(server.url());
    let err = client
        .detect_disease(&image, DetectOptions { lite: true })
        .await
        .unwrap_err();

    match err {
        DiagnosisError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 15),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_without_header_uses_default_backoff() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(429)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = sample_image(&dir);

    let client = DetectionClient::new(server.url());
    let err = client
        .detect_disease(&image, DetectOptions::default())
        .await
        .unwrap_err();

    match err {
        DiagnosisError::RateLimited { retry_after_secs } => {
            assert_eq!(retry_after_secs, DEFAULT_RETRY_AFTER_SECS)
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_with_unparseable_header_uses_default_backoff() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(429)
        .with_header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = sample_image(&dir);

    let client = DetectionClient::new(server.url());
    let err = client
        .detect_disease(&image, DetectOptions::default())
        .await
        .unwrap_err();

    match err {
        DiagnosisError::RateLimited { retry_after_secs } => {
            assert_eq!(retry_after_secs, DEFAULT_RETRY_AFTER_SECS)
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_surfaces_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(500)
        .with_body("model crashed")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = sample_image(&dir);

    let client = DetectionClient::new(server.url());
    let err = client
        .detect_disease(&image, DetectOptions::default())
        .await
        .unwrap_err();

    match err {
        DiagnosisError::DetectionFailed(message) => {
            assert!(message.contains("500"), "message was: {message}");
            assert!(message.contains("model crashed"), "message was: {message}");
        }
        other => panic!("expected DetectionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_fails_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .expect(0)
        .create_async()
        .await;

    let client = DetectionClient::new(server.url());
    let err = client
        .detect_disease(Path::new("/nonexistent/leaf.jpg"), DetectOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DiagnosisError::InvalidImage(_)));
    mock.assert_async().await;
}
