/// Words outside the dictionary go through the letter-to-sound rules.
use libarpabet::{parse_pronunciation, ArpabetConfig, Engine, QueryStatus, Transcription};
use librhyme_core::{Lexicon, TranscriptionSource};

fn lexicon() -> Lexicon {
    let mut lex = Lexicon::new();
    lex.insert("cat", parse_pronunciation("K AE1 T").unwrap());
    lex.insert("hat", parse_pronunciation("HH AE1 T").unwrap());
    lex
}

fn tokens(engine: &Engine, word: &str) -> Vec<String> {
    engine
        .generate(word, 10)
        .rhymes
        .into_iter()
        .map(|m| m.token)
        .collect()
}

#[test]
fn slang_is_inferred() {
    let engine = Engine::new(lexicon(), ArpabetConfig::default());
    let ts: Vec<Transcription> = engine.transcribe("zat").unwrap();
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].source(), TranscriptionSource::Inferred);
    assert_eq!(engine.unseen().count("zat"), 0);
}

#[test]
fn inferred_words_are_indexed() {
    let engine = Engine::new(lexicon(), ArpabetConfig::default());
    engine.inner_arc().build_index(["cat", "hat", "zat"]);
    assert_eq!(tokens(&engine, "cat"), vec!["hat", "zat"]);
    assert_eq!(tokens(&engine, "zat"), vec!["cat", "hat"]);
}

#[test]
fn inferred_words_can_be_left_out_of_the_index() {
    let mut config = ArpabetConfig::default();
    config.base_mut().index_inferred = false;
    let engine = Engine::new(lexicon(), config);
    engine.inner_arc().build_index(["cat", "hat", "zat"]);
    assert_eq!(tokens(&engine, "cat"), vec!["hat"]);
    // still answerable as a query
    assert_eq!(tokens(&engine, "zat"), vec!["cat", "hat"]);
}

#[test]
fn without_rules_slang_is_unknown() {
    let config = ArpabetConfig {
        letter_to_sound: false,
        ..Default::default()
    };
    let engine = Engine::new(lexicon(), config);
    assert!(matches!(engine.generate("zat", 5).status, QueryStatus::UnknownWord(_)));
    assert_eq!(engine.unseen().count("zat"), 1);
}
