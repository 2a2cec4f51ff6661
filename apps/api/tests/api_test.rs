//! Router-level tests for the ranking API.
//!
//! These drive the full request pipeline (multipart parsing, scratch dir,
//! ingestion, extraction, scoring, ranking) with in-process fake models.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use resume_ranker::config::Config;
use resume_ranker::inference::classifier::{ClassifierArtifact, LinearClassifier, StandardScaler};
use resume_ranker::inference::embedder::Embedder;
use resume_ranker::inference::features::{TfidfVectorizer, FEATURE_LAYOUT_VERSION};
use resume_ranker::inference::{ModelError, ModelInfo};
use resume_ranker::routes::build_router;
use resume_ranker::scoring::{ClassificationScorer, ResumeScorer, SimilarityScorer};
use resume_ranker::state::AppState;

const BOUNDARY: &str = "resume-ranker-test-boundary";
const KEYWORDS: [&str; 3] = ["python", "backend", "design"];

/// Embeds a text as counts of a few fixed keywords.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                KEYWORDS.iter().map(|k| t.matches(k).count() as f32).collect()
            })
            .collect())
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: "keyword-embedder".to_string(),
            model_type: "SentenceTransformer".to_string(),
            backend: Some("test".to_string()),
            embedding_dimension: Some(KEYWORDS.len()),
            total_categories: None,
            feature_width: None,
        }
    }
}

/// Simulates an unreachable embedding server.
struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        Err(ModelError::Api {
            status: 503,
            message: "model is loading".to_string(),
        })
    }

    fn info(&self) -> ModelInfo {
        KeywordEmbedder.info()
    }
}

struct TestApp {
    router: Router,
    scratch_parent: TempDir,
}

fn test_app(scorer: Arc<dyn ResumeScorer>) -> TestApp {
    let scratch_parent = TempDir::new().unwrap();
    let config = Config {
        scratch_dir: Some(scratch_parent.path().to_path_buf()),
        ..Config::default()
    };
    TestApp {
        router: build_router(AppState::new(config, scorer)),
        scratch_parent,
    }
}

fn similarity_app() -> TestApp {
    test_app(Arc::new(SimilarityScorer::new(Arc::new(KeywordEmbedder))))
}

fn classification_app() -> TestApp {
    let width = 2 + 1 + 4;
    let artifact = ClassifierArtifact {
        model_name: "toy-linear".to_string(),
        model_type: "LinearClassifier".to_string(),
        layout_version: FEATURE_LAYOUT_VERSION,
        categories: vec![
            "Data Science".to_string(),
            "Web Design".to_string(),
            "HR".to_string(),
        ],
        skills: vec!["figma".to_string()],
        vectorizer: TfidfVectorizer {
            vocabulary: HashMap::from([("python".to_string(), 0), ("css".to_string(), 1)]),
            idf: vec![1.0, 1.0],
            sublinear_tf: false,
        },
        scaler: StandardScaler {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        },
        weights: vec![
            vec![5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 3.0, 3.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0; 7],
        ],
        bias: vec![0.0, 0.0, 0.5],
    };
    let classifier = LinearClassifier::from_artifact(artifact).unwrap();
    test_app(Arc::new(ClassificationScorer::new(Arc::new(classifier))))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        write!(body, "--{BOUNDARY}\r\n").unwrap();
        match part {
            Part::Text(name, value) => {
                write!(
                    body,
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .unwrap();
            }
            Part::File(filename, contents) => {
                write!(
                    body,
                    "Content-Disposition: form-data; name=\"resume_files\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .unwrap();
                body.extend_from_slice(contents);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    write!(body, "--{BOUNDARY}--\r\n").unwrap();

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A .docx package with one body paragraph per entry of `paragraphs`.
fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    zip_bytes(&[("word/document.xml", xml.as_bytes())])
}

fn assert_empty_dir(path: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(path).unwrap().collect();
    assert!(leftovers.is_empty(), "scratch not cleaned: {leftovers:?}");
}

fn ranked_filenames(body: &Value) -> Vec<&str> {
    body["ranked_resumes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["filename"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_reports_mode_and_model() {
    let app = similarity_app();
    for uri in ["/health", "/api/health"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["scoring_mode"], "similarity");
        assert_eq!(body["model_info"]["model_name"], "keyword-embedder");
    }
}

#[tokio::test]
async fn test_info_lists_formats_and_endpoints() {
    let app = similarity_app();
    let (status, body) = send(&app.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Resume Ranker API");
    assert_eq!(
        body["supported_formats"],
        serde_json::json!(["PDF", "DOCX", "TXT", "ZIP"])
    );
    assert!(body["endpoints"]["POST /rank_resumes"].is_string());
    assert!(body.get("total_categories").is_none());

    let (status, _) = send(&app.router, get("/api/")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_categories_unavailable_in_similarity_mode() {
    let app = similarity_app();
    let (status, body) = send(&app.router, get("/api/categories")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rank_resumes_similarity() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python backend engineer"),
            Part::Text("skills", "python, django"),
            Part::Text("min_experience", "2"),
            Part::File("designer.txt", b"Graphic design lead, design systems"),
            Part::File("backend.txt", b"Python backend developer with 3 years experience"),
            Part::File("partial.txt", b"Python scripting and design"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_resumes"], 3);
    assert_eq!(body["processed_resumes"], 3);
    assert_eq!(body["top_k"], 5);
    assert_eq!(body["job_circular_preview"], "python backend engineer");
    assert_eq!(body["skills_searched"], serde_json::json!(["python", "django"]));
    assert_eq!(body["min_experience_searched"], 2);
    assert_eq!(
        ranked_filenames(&body),
        vec!["backend.txt", "partial.txt", "designer.txt"]
    );

    let best = &body["ranked_resumes"][0];
    assert_eq!(best["similarity_score"], 1.0);
    assert_eq!(best["bonus_score"], 0.55);
    assert_eq!(best["final_score"], 0.91);

    let scores: Vec<f64> = body["ranked_resumes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["final_score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_top_k_truncates_and_ties_keep_upload_order() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::Text("top_k", "2"),
            Part::File("first.txt", b"python"),
            Part::File("second.txt", b"python"),
            Part::File("third.txt", b"python"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_resumes"], 3);
    assert_eq!(ranked_filenames(&body), vec!["first.txt", "second.txt"]);
    assert!(body["skills_searched"].is_null());
    assert!(body["min_experience_searched"].is_null());
}

#[tokio::test]
async fn test_top_k_larger_than_population_returns_all() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::Text("top_k", "50"),
            Part::File("only.txt", b"python"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_k"], 50);
    assert_eq!(ranked_filenames(&body), vec!["only.txt"]);
}

#[tokio::test]
async fn test_zip_upload_drops_unsupported_entries() {
    let app = similarity_app();
    let zip = zip_bytes(&[
        ("resumes/alice.txt", b"python backend"),
        ("resumes/bob.txt", b"design"),
        ("tools/setup.exe", b"MZ"),
    ]);
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python backend"),
            Part::File("batch.zip", &zip),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_resumes"], 2);
    assert_eq!(ranked_filenames(&body), vec!["alice.txt", "bob.txt"]);
    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_docx_upload_is_scored() {
    let app = similarity_app();
    let docx = docx_bytes(&["Jane Doe", "Python backend engineer, 4 years"]);
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python backend"),
            Part::Text("skills", "python"),
            Part::Text("min_experience", "3"),
            Part::File("designer.txt", b"design portfolio"),
            Part::File("jane.docx", &docx),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["processed_resumes"], 2);
    assert_eq!(ranked_filenames(&body), vec!["jane.docx", "designer.txt"]);

    let jane = &body["ranked_resumes"][0];
    assert_eq!(jane["similarity_score"], 1.0);
    assert_eq!(jane["bonus_score"], 0.8);
    assert_eq!(jane["final_score"], 0.96);
    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_unsupported_direct_upload_rejects_request() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::File("cv.txt", b"python"),
            Part::File("malware.exe", b"MZ"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("malware.exe"));
    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_corrupt_zip_is_archive_error() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::File("broken.zip", b"not a zip at all"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ARCHIVE_ERROR");
}

#[tokio::test]
async fn test_unreadable_files_are_skipped() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::File("broken.pdf", b"garbage bytes"),
            Part::File("good.txt", b"python"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_resumes"], 2);
    assert_eq!(body["processed_resumes"], 1);
    assert_eq!(ranked_filenames(&body), vec!["good.txt"]);
}

#[tokio::test]
async fn test_no_extractable_text() {
    let app = similarity_app();
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::File("broken.pdf", b"garbage bytes"),
            Part::File("broken.docx", b"also garbage"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_EXTRACTABLE_TEXT");
    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_validation_errors() {
    let app = similarity_app();

    let missing_job = multipart_request("/rank_resumes", &[Part::File("cv.txt", b"python")]);
    let (status, body) = send(&app.router, missing_job).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let no_files = multipart_request("/rank_resumes", &[Part::Text("job_circular", "python")]);
    let (status, _) = send(&app.router, no_files).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_top_k = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::Text("top_k", "0"),
            Part::File("cv.txt", b"python"),
        ],
    );
    let (status, body) = send(&app.router, bad_top_k).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_model_failure_is_internal_error() {
    let app = test_app(Arc::new(SimilarityScorer::new(Arc::new(FailingEmbedder))));
    let request = multipart_request(
        "/rank_resumes",
        &[
            Part::Text("job_circular", "python"),
            Part::File("cv.txt", b"python"),
        ],
    );

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "MODEL_ERROR");
    // Upstream details stay in the logs
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("loading"));
    assert_empty_dir(app.scratch_parent.path());
}

#[tokio::test]
async fn test_classification_mode() {
    let app = classification_app();

    let (status, body) = send(&app.router, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_categories"], 3);
    assert_eq!(body["categories"][0], "Data Science");

    let (_, info) = send(&app.router, get("/api/")).await;
    assert_eq!(info["scoring_mode"], "classification");
    assert_eq!(info["total_categories"], 3);

    let request = multipart_request(
        "/api/classify",
        &[
            Part::Text("job_circular", "css figma designer"),
            Part::Text("skills", "figma"),
            Part::File("ds.txt", b"python pandas python"),
            Part::File("web.txt", b"css and figma designer"),
        ],
    );
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["scoring_mode"], "classification");
    assert_eq!(ranked_filenames(&body), vec!["web.txt", "ds.txt"]);

    let web = &body["ranked_resumes"][0];
    assert_eq!(web["predicted_category"], "Web Design");
    assert_eq!(web["job_relevance"], 1.0);
    assert_eq!(web["skill_bonus"], 0.5);
    assert_eq!(web["top_categories"].as_array().unwrap().len(), 3);
    assert_eq!(web["top_categories"][0]["category"], "Web Design");

    let ds = &body["ranked_resumes"][1];
    assert_eq!(ds["predicted_category"], "Data Science");
    assert_eq!(ds["job_relevance"], 0.0);
    assert!(ds.get("similarity_score").is_none());
}
