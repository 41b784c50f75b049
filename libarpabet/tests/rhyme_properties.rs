/// Scoring and indexing properties checked over every pair of demo words.
use libarpabet::{demo_lexicon, Engine, Transcription};
use librhyme_core::{normalize, SyllableWindow};

fn transcriptions(engine: &Engine) -> Vec<(String, Transcription)> {
    let mut out = Vec::new();
    for word in demo_lexicon().words() {
        for t in engine.transcribe(&word).unwrap() {
            out.push((word.clone(), t));
        }
    }
    out
}

#[test]
fn scores_are_reflexive_symmetric_and_bounded() {
    let engine = Engine::demo();
    let service = engine.inner_arc();
    let cfg = service.config().normalizer_config();
    let keys: Vec<_> = transcriptions(&engine)
        .iter()
        .map(|(_, t)| normalize(t, &cfg))
        .collect();

    for a in keys.iter() {
        assert_eq!(service.scorer().score_keys(a, a), 1.0);
        for b in keys.iter() {
            let ab = service.scorer().score_keys(a, b);
            let ba = service.scorer().score_keys(b, a);
            assert!((0.0..=1.0).contains(&ab), "{} vs {}: {}", a, b, ab);
            assert!((ab - ba).abs() < 1e-6, "{} vs {} asymmetric", a, b);
        }
    }
}

#[test]
fn whole_word_scores_are_reflexive_symmetric_and_bounded() {
    let engine = Engine::demo();
    let scorer = engine.inner_arc().scorer().clone();
    let all = transcriptions(&engine);
    for (wa, a) in all.iter() {
        assert_eq!(scorer.score_transcriptions(a, a), 1.0, "{}", wa);
        for (wb, b) in all.iter() {
            let ab = scorer.score_transcriptions(a, b);
            let ba = scorer.score_transcriptions(b, a);
            assert!((0.0..=1.0).contains(&ab), "{} vs {}: {}", wa, wb, ab);
            assert!((ab - ba).abs() < 1e-6, "{} vs {} asymmetric", wa, wb);
        }
    }
}

#[test]
fn normalization_is_deterministic() {
    let engine = Engine::demo();
    let mut cfg = engine.config().base().normalizer_config();
    for window in [SyllableWindow::Single, SyllableWindow::Double] {
        cfg.syllable_window = window;
        for (_, t) in transcriptions(&engine) {
            assert_eq!(normalize(&t, &cfg), normalize(&t.clone(), &cfg));
        }
    }
}

#[test]
fn bucket_members_rhyme_perfectly() {
    let engine = Engine::demo();
    let service = engine.inner_arc();
    let index = service.index().unwrap();
    for entry in index.entries() {
        let bucket = index.lookup_exact(&entry.key);
        assert!(bucket.contains(&entry.token));
        for other in bucket.iter() {
            let d = engine.detect(&entry.token, other);
            assert_eq!(d.score, Some(1.0), "{} / {}", entry.token, other);
        }
    }
}

#[test]
fn nearest_scores_never_increase() {
    let engine = Engine::demo();
    let index = engine.inner_arc().index().unwrap();
    for (word, t) in transcriptions(&engine) {
        let res = index.lookup_nearest_excluding(&t, 8, &word);
        assert!(res.len() <= 8);
        for pair in res.windows(2) {
            assert!(pair[0].score >= pair[1].score, "{}: {:?}", word, res);
        }
    }
}

#[test]
fn double_window_reaches_past_final_stress() {
    let perfect = |window: SyllableWindow| -> Vec<String> {
        let mut config = libarpabet::ArpabetConfig::default();
        config.base_mut().set_syllable_window(window);
        Engine::new(demo_lexicon(), config)
            .generate("control", 5)
            .rhymes
            .into_iter()
            .filter(|m| m.is_perfect())
            .map(|m| m.token)
            .collect()
    };
    assert_eq!(perfect(SyllableWindow::Single), vec!["soul"]);
    assert!(perfect(SyllableWindow::Double).is_empty());
}
