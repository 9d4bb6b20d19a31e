//! Functional tests for the end-to-end pipeline with fake collaborators

#[path = "../common/mod.rs"]
mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use print_asset_pipeline::error::AppError;
use print_asset_pipeline::processing::{OutputFormat, ProcessingMode, TileProcessor};
use print_asset_pipeline::prompt::{DesignRequest, GarmentKind};
use print_asset_pipeline::synthesis::SynthesisSize;

fn corgi_request() -> DesignRequest {
    DesignRequest {
        garment_kind: GarmentKind::Hoodie,
        subject_breed: "Corgi".to_string(),
        print_text: Some("WOOF".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_corgi_hoodie() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer.clone(), fetcher.clone(), host.clone());

    let output = pipeline.run(corgi_request()).await.unwrap();

    assert_eq!(output.image_url, DURABLE_URL);
    assert!(output.prompt.contains("Corgi"));
    assert!(output.prompt.contains("hoodie"));
    assert!(output.prompt.contains("Print the word \"WOOF\""));
    assert!(output.prompt.contains("on the chest"));

    // The prompt returned is the one that was sent
    let sent = synthesizer.prompts.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, output.prompt);
    assert_eq!(sent[0].size, SynthesisSize::Square);

    assert_eq!(fetcher.locators.lock().unwrap().as_slice(), &[TEMP_URL.to_string()]);

    // Without processing the fetched bytes are published as-is
    let requests = host.target_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].byte_length, (1024 * 1024 * 4) as u64);
    assert_eq!(requests[0].mime_type, "image/png");
    assert_eq!(host.uploaded_lengths.lock().unwrap()[0], requests[0].byte_length);
    assert_eq!(host.register_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upload_failure_never_registers() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost {
        upload_fails: true,
        ..Default::default()
    });
    let pipeline = orchestrator(synthesizer, fetcher, host.clone());

    let err = pipeline.run(corgi_request()).await.unwrap_err();

    assert!(matches!(err, AppError::ObjectStoreUpload { status: Some(403), .. }));
    assert_eq!(err.code(), "object_store_upload_error");
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(host.upload_calls.load(Ordering::SeqCst), 1);
    assert_eq!(host.register_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_fetch_never_publishes() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(Vec::new()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer, fetcher, host.clone())
        .with_processor(TileProcessor::new(ProcessingMode::MirrorTile, OutputFormat::Png));

    let err = pipeline.run(corgi_request()).await.unwrap_err();

    assert!(matches!(err, AppError::AssetUnavailable(_)));
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_synthesis_failure_short_circuits() {
    let synthesizer = Arc::new(FakeSynthesizer {
        fail: true,
        ..Default::default()
    });
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer, fetcher.clone(), host.clone());

    let err = pipeline.run(corgi_request()).await.unwrap_err();

    match err {
        AppError::UpstreamSynthesis { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "content policy violation");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_registration_failure_is_surfaced() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost {
        registration_fails: true,
        ..Default::default()
    });
    let pipeline = orchestrator(synthesizer, fetcher, host);

    let err = pipeline.run(corgi_request()).await.unwrap_err();
    assert!(matches!(err, AppError::AssetRegistration(_)));
}

#[tokio::test]
async fn test_invalid_request_never_reaches_synthesis() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer.clone(), fetcher, host);

    let err = pipeline.run(DesignRequest::default()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));

    let err = pipeline
        .run(DesignRequest {
            size: Some("256x256".to_string()),
            ..corgi_request()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));

    assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_direct_prompt_uses_describer() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let describer = Arc::new(FakeDescriber {
        calls: Default::default(),
    });
    let pipeline =
        orchestrator(synthesizer, fetcher, host).with_describer(describer.clone());

    let output = pipeline
        .run(DesignRequest {
            prompt: Some("space tacos".to_string()),
            size: Some("1024x1792".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(describer.calls.load(Ordering::SeqCst), 1);
    assert!(output.prompt.contains("space tacos pattern for a hoodie"));
}

#[tokio::test]
async fn test_direct_prompt_without_describer_uses_raw_text() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer, fetcher, host);

    let output = pipeline
        .run(DesignRequest {
            prompt: Some("neon bones".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(output.prompt.contains("theme: neon bones."));
}

#[tokio::test]
async fn test_publish_from_url_uses_default_alt_text() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer.clone(), fetcher, host.clone());

    let published = pipeline
        .publish_from_url("https://synth.example/existing.png", None)
        .await
        .unwrap();

    assert_eq!(published.durable_url, DURABLE_URL);
    assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        host.alt_texts.lock().unwrap().as_slice(),
        &[Some("AI-generated dog image".to_string())]
    );
}

#[tokio::test]
async fn test_failed_run_does_not_affect_next_run() {
    let synthesizer = Arc::new(FakeSynthesizer::default());
    let fetcher = Arc::new(FakeFetcher::with_bytes(raw_square_bytes()));
    let host = Arc::new(FakeHost::default());
    let pipeline = orchestrator(synthesizer, fetcher, host.clone());

    assert!(pipeline.run(DesignRequest::default()).await.is_err());
    assert!(pipeline.run(corgi_request()).await.is_ok());
    assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
}
