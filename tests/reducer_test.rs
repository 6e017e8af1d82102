use std::sync::Arc;
use std::thread;
use silentaid::{ClassifierError, EmotionCategory, EmotionMappingTable, EmotionReducer, EmotionResult, RawScore};

fn scores(pairs: &[(&str, f64)]) -> Vec<RawScore> {
    pairs.iter().map(|&(label, score)| RawScore::new(label, score)).collect()
}

#[test]
fn test_max_selection() {
    let reducer = EmotionReducer::default();
    let result = reducer.reduce(&scores(&[("joy", 0.2), ("anger", 0.7), ("sadness", 0.1)]));
    assert_eq!(result.emotion, "Angry");
    assert_eq!(result.confidence, 0.7);
}

#[test]
fn test_determinism() {
    let reducer = EmotionReducer::default();
    let input = scores(&[("fear", 0.31), ("surprise", 0.33), ("neutral", 0.2)]);
    let first = reducer.reduce(&input);
    for _ in 0..10 {
        assert_eq!(reducer.reduce(&input), first);
    }
    assert_eq!(first.emotion, "Excited");
    assert_eq!(first.emoji, "🤩");
    assert_eq!(first.color_hex, "#f97316");
}

#[test]
fn test_unknown_label_falls_back_to_neutral_with_real_confidence() {
    let reducer = EmotionReducer::default();
    let result = reducer.reduce(&scores(&[("joy", 0.1), ("admiration", 0.64321)]));
    assert_eq!(result.emotion, "Neutral");
    assert_eq!(result.emoji, "😐");
    assert_eq!(result.color_hex, "#6b7280");
    assert_eq!(result.confidence, 0.643);
}

#[test]
fn test_uppercase_labels() {
    let reducer = EmotionReducer::default();
    let result = reducer.reduce(&scores(&[("JOY", 0.9), ("SADNESS", 0.1)]));
    assert_eq!(result.emotion, "Happy");
}

#[test]
fn test_total_failure_fallback() {
    let reducer = EmotionReducer::default();
    let expected = EmotionResult {
        emotion: "Neutral",
        emoji: "😐",
        color_hex: "#6b7280",
        confidence: 0.5,
    };
    assert_eq!(reducer.reduce(&[]), expected);
    assert_eq!(reducer.reduce_outcome(Ok(Vec::new())), expected);
    assert_eq!(
        reducer.reduce_outcome(Err(ClassifierError::ModelError("unexpected output shape".into()))),
        expected
    );
    assert_eq!(reducer.reduce_outcome(Err(ClassifierError::Unavailable)), expected);
}

#[test]
fn test_rounding_to_three_decimals() {
    let reducer = EmotionReducer::default();
    let result = reducer.reduce(&scores(&[("joy", 0.8675)]));
    assert_eq!(result.confidence, 0.868);

    let result = reducer.reduce(&[RawScore::new("joy", f64::from(0.93f32))]);
    assert_eq!(result.confidence, 0.93);
}

#[test]
fn test_scores_need_not_sum_to_one() {
    let reducer = EmotionReducer::default();
    let result = reducer.reduce(&scores(&[("joy", 0.9), ("sadness", 0.8), ("anger", 0.85)]));
    assert_eq!(result.emotion, "Happy");
    assert_eq!(result.confidence, 0.9);
}

#[test]
fn test_custom_aliases() {
    let table = EmotionMappingTable::default().with_alias("love", EmotionCategory::Happy);
    let reducer = EmotionReducer::new(Arc::new(table));
    let result = reducer.reduce(&scores(&[("love", 0.7), ("anger", 0.2)]));
    assert_eq!(result.emotion, "Happy");
}

#[test]
fn test_shared_across_threads() {
    let reducer = Arc::new(EmotionReducer::default());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reducer = Arc::clone(&reducer);
            thread::spawn(move || reducer.reduce(&scores(&[("sadness", 0.55), ("joy", 0.45)])))
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap();
        assert_eq!(result.emotion, "Sad");
        assert_eq!(result.confidence, 0.55);
    }
}
