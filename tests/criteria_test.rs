use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use sporltag::error::AppError;
use sporltag::smart::criteria::{self, AttributeRange, Criteria, CriteriaParams};

fn sample_criteria() -> Criteria {
    Criteria {
        tempo: AttributeRange::new(2, 4).unwrap(),
        energy: AttributeRange::new(3, 5).unwrap(),
        mood: AttributeRange::FULL,
        include: [1, 7].into_iter().collect(),
        exclude: [3].into_iter().collect(),
    }
}

fn description_with_token(json: &str) -> String {
    format!("Evening mix [ST:{}]", STANDARD.encode(json))
}

#[test]
fn test_embed_then_decode_restores_criteria() {
    let criteria = sample_criteria();
    let description = criteria::embed("Evening mix", &criteria).unwrap();

    assert!(description.starts_with("Evening mix [ST:"));
    assert!(description.ends_with(']'));
    assert_eq!(criteria::decode(&description).unwrap(), criteria);
}

#[test]
fn test_default_criteria_survive_with_empty_tag_sets() {
    let criteria = Criteria::default();
    let decoded = criteria::decode(&criteria::embed("", &criteria).unwrap()).unwrap();

    assert_eq!(decoded, criteria);
    assert!(decoded.include.is_empty());
    assert!(decoded.exclude.is_empty());
}

#[test]
fn test_token_is_standard_base64_with_compact_keys() {
    let token = criteria::encode(&sample_criteria()).unwrap();
    let json = STANDARD.decode(&token).expect("standard base64");
    let value: Value = serde_json::from_slice(&json).unwrap();

    assert_eq!(value["t"], serde_json::json!([2, 4]));
    assert_eq!(value["e"], serde_json::json!([3, 5]));
    assert_eq!(value["m"], serde_json::json!([1, 5]));
    assert_eq!(value["i"], serde_json::json!([1, 7]));
    assert_eq!(value["x"], serde_json::json!([3]));
}

#[test]
fn test_token_keeps_key_order_and_is_never_empty() {
    let token = criteria::encode(&Criteria::default()).unwrap();
    assert!(!token.is_empty());

    let json = String::from_utf8(STANDARD.decode(&token).unwrap()).unwrap();
    assert_eq!(json, r#"{"t":[1,5],"e":[1,5],"m":[1,5],"i":[],"x":[]}"#);
}

#[test]
fn test_decode_without_marker_is_not_smart() {
    assert!(matches!(
        criteria::decode("no marker here"),
        Err(AppError::NotSmart)
    ));
    assert!(matches!(criteria::decode(""), Err(AppError::NotSmart)));
}

#[test]
fn test_decode_rejects_broken_tokens() {
    let cases = [
        "Mix [ST:eyJ0IjpbMSw1XX0=".to_string(),
        "Mix [ST:%%%not base64%%%]".to_string(),
        format!("Mix [ST:{}]", STANDARD.encode([0xff, 0xfe, 0xfd])),
        description_with_token("not json"),
    ];

    for description in cases {
        assert!(
            matches!(
                criteria::decode(&description),
                Err(AppError::CriteriaCorrupt(_))
            ),
            "{} should be corrupt",
            description
        );
    }
}

#[test]
fn test_decode_fails_closed_on_out_of_domain_ranges() {
    for json in [
        r#"{"t":[0,5]}"#,
        r#"{"e":[1,6]}"#,
        r#"{"m":[4,2]}"#,
        r#"{"t":[-1,3]}"#,
    ] {
        assert!(
            matches!(
                criteria::decode(&description_with_token(json)),
                Err(AppError::CriteriaCorrupt(_))
            ),
            "{} should be rejected",
            json
        );
    }
}

#[test]
fn test_decode_fills_missing_keys_with_full_ranges() {
    let decoded = criteria::decode(&description_with_token(r#"{"t":[2,3]}"#)).unwrap();

    assert_eq!(decoded.tempo, AttributeRange::new(2, 3).unwrap());
    assert!(decoded.energy.is_full());
    assert!(decoded.mood.is_full());
    assert!(decoded.include.is_empty());
    assert!(decoded.exclude.is_empty());
}

#[test]
fn test_decode_accepts_tokens_with_spaced_json() {
    let json = r#"{"t": [1, 5], "e": [2, 4], "m": [1, 5], "i": [1], "x": []}"#;
    let decoded = criteria::decode(&description_with_token(json)).unwrap();

    assert_eq!(decoded.energy, AttributeRange::new(2, 4).unwrap());
    assert_eq!(decoded.include.into_iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_human_text_is_the_trimmed_prefix() {
    let description = criteria::embed("  Morning run  ", &sample_criteria()).unwrap();
    assert_eq!(criteria::human_text(&description), "Morning run");
    assert_eq!(criteria::human_text(" plain text "), "plain text");
}

#[test]
fn test_attribute_range_validation() {
    assert!(AttributeRange::new(1, 5).unwrap().is_full());
    assert!(AttributeRange::new(3, 3).unwrap().contains(3));
    assert!(!AttributeRange::new(3, 3).unwrap().contains(4));
    assert!(matches!(
        AttributeRange::new(4, 2),
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        AttributeRange::new(0, 2),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn test_criteria_params_default_to_full_ranges() {
    let params = CriteriaParams {
        tempo_min: Some(2),
        include_tag_ids: vec![4, 4, 9],
        ..CriteriaParams::default()
    };
    let criteria = params.into_criteria().unwrap();

    assert_eq!(criteria.tempo, AttributeRange::new(2, 5).unwrap());
    assert!(criteria.energy.is_full());
    assert_eq!(criteria.include.len(), 2);
}

#[test]
fn test_criteria_display() {
    assert_eq!(
        sample_criteria().to_string(),
        "tempo 2-4, energy 3-5, mood 1-5, with tags 1,7, without tags 3"
    );
}
