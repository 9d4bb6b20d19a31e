//! Unit tests for prompt composition

use print_asset_pipeline::prompt::{composer::compose, DesignRequest, GarmentKind, PromptComposer};

fn full_request() -> DesignRequest {
    DesignRequest {
        garment_kind: GarmentKind::Tshirt,
        subject_breed: "Shiba Inu".to_string(),
        print_text: Some("GOOD BOY".to_string()),
        style: Some("retro comic".to_string()),
        color: Some("mustard and navy".to_string()),
        mood: Some("playful".to_string()),
        layout: Some("all-over repeat".to_string()),
        background: Some("cream".to_string()),
        subject: Some("tennis balls".to_string()),
        design_theme: Some("summer at the park".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_compose_is_deterministic() {
    let a = full_request();
    let b = full_request();
    assert_eq!(a, b);
    assert_eq!(compose(&a), compose(&b));
    assert_eq!(PromptComposer::new().compose(&a), compose(&a));
}

#[test]
fn test_all_descriptors_appear() {
    let prompt = compose(&full_request());
    for fragment in [
        "Shiba Inu",
        "t-shirt",
        "Print the word \"GOOD BOY\"",
        "Style: retro comic.",
        "Color palette: mustard and navy.",
        "Mood: playful.",
        "Layout: all-over repeat.",
        "Background tone: cream.",
        "Pattern motif: tennis balls.",
        "theme: summer at the park.",
    ] {
        assert!(prompt.contains(fragment), "missing {:?} in {}", fragment, prompt);
    }
}

#[test]
fn test_blank_fields_are_omitted() {
    let request = DesignRequest {
        print_text: Some(" ".to_string()),
        style: Some("".to_string()),
        color: Some("red".to_string()),
        ..Default::default()
    };
    let prompt = compose(&request);
    assert!(!prompt.contains("Print the word"));
    assert!(!prompt.contains("Style:"));
    assert!(prompt.contains("Color palette: red."));
}

#[test]
fn test_blank_breed_falls_back_to_dog() {
    let request = DesignRequest {
        subject_breed: "  ".to_string(),
        ..Default::default()
    };
    assert!(compose(&request).starts_with("A front-facing photograph of a single dog wearing a hoodie"));
}

#[test]
fn test_garment_json_roundtrip_keeps_unknown_kind() {
    let request: DesignRequest =
        serde_json::from_str(r#"{"garmentKind":"Raincoat","printText":"WET"}"#).unwrap();
    assert_eq!(request.garment_kind, GarmentKind::Other("Raincoat".to_string()));
    assert!(compose(&request).contains("wearing a Raincoat."));
}
