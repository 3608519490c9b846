//! Tests for the HTTP-backed collaborators against a canned local server.
//!
//! Each test starts a one-shot responder on `127.0.0.1:0` that records the
//! request it receives and answers with a fixed status and body.

use arabic_ocr::{
    EngineFailure, OcrConfig, OcrPipeline, TranslationConfig, Translator, UploadArtifact,
};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the canned server.
struct Captured {
    head: String,
    body: Value,
}

/// Serve exactly one request, answering `status` with `body`.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        // Headers first, then exactly Content-Length bytes of body.
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let reason = if status < 400 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Captured {
            head,
            body: serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null),
        }
    });

    (format!("http://{addr}/v1"), handle)
}

fn png_upload() -> UploadArtifact {
    UploadArtifact::from_bytes("page.png", vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4])
}

fn pipeline(root: &std::path::Path, base_url: &str) -> OcrPipeline {
    let config = OcrConfig::builder()
        .workspace_root(root)
        .mistral_api_key("sk-test")
        .mistral_base_url(base_url)
        .api_timeout_secs(5)
        .build()
        .unwrap();
    OcrPipeline::new(config).unwrap()
}

#[tokio::test]
async fn mistral_success_is_sent_as_data_url_and_cleaned() {
    let (url, server) = serve_once(
        200,
        r#"{"choices":[{"message":{"role":"assistant","content":"```\nمرحبا بالعالم   \n```"}}]}"#,
    )
    .await;
    let tmp = tempfile::tempdir().unwrap();

    let doc = pipeline(tmp.path(), &url)
        .process_upload(png_upload(), "mistral")
        .await
        .unwrap();
    assert_eq!(doc.text, "مرحبا بالعالم");

    let req = server.await.unwrap();
    assert!(req.head.starts_with("POST /v1/chat/completions "), "{}", req.head);
    assert!(req.head.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    assert_eq!(req.body["model"], "mistral-large-latest");
    let parts = &req.body["messages"][0]["content"];
    assert_eq!(
        parts[0]["text"],
        "Extract all Arabic text from this image. Return only the extracted text without any additional comments or explanations."
    );
    assert!(parts[1]["image_url"]["url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn mistral_error_status_is_inline_text() {
    let (url, server) = serve_once(500, r#"{"message":"boom"}"#).await;
    let tmp = tempfile::tempdir().unwrap();

    let doc = pipeline(tmp.path(), &url)
        .process_upload(png_upload(), "mistral")
        .await
        .unwrap();

    assert!(doc.success);
    assert_eq!(doc.text, r#"Mistral API error: 500 - {"message":"boom"}"#);
    assert_eq!(doc.stats.failed_engine_calls, 1);
    server.await.unwrap();
}

#[tokio::test]
async fn both_mode_combines_local_and_remote() {
    let (url, server) = serve_once(200, r#"{"choices":[{"message":{"content":"نص"}}]}"#).await;
    let tmp = tempfile::tempdir().unwrap();
    let config = OcrConfig::builder()
        .workspace_root(tmp.path())
        .mistral_api_key("sk-test")
        .mistral_base_url(&url)
        .local_text("محلي")
        .build()
        .unwrap();

    let doc = OcrPipeline::new(config)
        .unwrap()
        .process_upload(png_upload(), "both")
        .await
        .unwrap();

    assert_eq!(doc.text, "Qari OCR:\nمحلي\n\nMistral OCR:\nنص");
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let (url, server) = serve_once(200, "not json").await;
    let tmp = tempfile::tempdir().unwrap();

    let doc = pipeline(tmp.path(), &url)
        .process_upload(png_upload(), "mistral")
        .await
        .unwrap();

    let failure = doc.pages[0].results[0].outcome.clone().unwrap_err();
    assert!(matches!(failure, EngineFailure::MalformedResponse { .. }), "{failure:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let tmp = tempfile::tempdir().unwrap();
    let config = OcrConfig::builder()
        .workspace_root(tmp.path())
        .mistral_api_key("sk-test")
        .mistral_base_url(format!("http://{addr}/v1"))
        .api_timeout_secs(1)
        .build()
        .unwrap();

    let doc = OcrPipeline::new(config)
        .unwrap()
        .process_upload(png_upload(), "mistral")
        .await
        .unwrap();

    assert_eq!(doc.text, "Error processing with Mistral: request timed out after 1s");
    server.abort();
}

#[tokio::test]
async fn translation_request_and_trimmed_result() {
    let (url, server) = serve_once(
        200,
        r#"{"choices":[{"message":{"content":"  Bonjour le monde \n"}}]}"#,
    )
    .await;
    let translator = Translator::new(&TranslationConfig {
        api_key: Some("sk-openai".into()),
        base_url: url,
        ..TranslationConfig::default()
    })
    .unwrap();

    let out = translator.translate("مرحبا بالعالم", "fr").await.unwrap();
    assert_eq!(out, "Bonjour le monde");

    let req = server.await.unwrap();
    assert!(req.head.to_ascii_lowercase().contains("authorization: bearer sk-openai"));
    assert_eq!(req.body["model"], "gpt-4o");
    assert_eq!(req.body["max_tokens"], 4000);
    assert!((req.body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(req.body["messages"][0]["role"], "system");
    assert_eq!(
        req.body["messages"][1]["content"],
        "Translate the following Arabic text to French. Provide only the translation without any additional text or explanations:\n\nمرحبا بالعالم"
    );
}

#[tokio::test]
async fn translation_error_status_is_reported() {
    let (url, server) = serve_once(401, r#"{"error":"bad key"}"#).await;
    let translator = Translator::new(&TranslationConfig {
        api_key: Some("sk-wrong".into()),
        base_url: url,
        ..TranslationConfig::default()
    })
    .unwrap();

    let err = translator.translate("نص", "en").await.unwrap_err();
    assert_eq!(err.to_string(), r#"OpenAI API error: 401 - {"error":"bad key"}"#);
    server.await.unwrap();
}
