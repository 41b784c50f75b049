/// Build lexicon artifacts from cmudict text and load an engine from them.
use libarpabet::{parse_cmudict, ArpabetConfig, Engine};
use std::path::PathBuf;

const DICT: &str = "\
;;; tiny dictionary
CAT  K AE1 T
HAT  HH AE1 T
BAT  B AE1 T
DOG  D AO1 G
FIRE  F AY1 ER0
FIRE(2)  F AY1 R
";

fn data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("librhyme_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let (lex, stats) = parse_cmudict(DICT.as_bytes()).unwrap();
    assert_eq!(stats.words, 5);
    assert_eq!(stats.entries, 6);
    lex.write_fst_bincode(dir.join("lexicon.fst"), dir.join("lexicon.bincode"))
        .unwrap();
    dir
}

fn config() -> ArpabetConfig {
    ArpabetConfig {
        letter_to_sound: false,
        ..Default::default()
    }
}

#[test]
fn engine_from_data_dir() {
    let dir = data_dir("artifacts");
    let engine = Engine::from_data_dir(&dir, config()).unwrap();
    let tokens: Vec<String> = engine
        .generate("cat", 10)
        .rhymes
        .into_iter()
        .map(|m| m.token)
        .collect();
    assert_eq!(tokens, vec!["bat", "hat"]);
    assert_eq!(engine.transcribe("fire").unwrap().len(), 2);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn index_snapshot_is_reused() {
    let dir = data_dir("snapshot");
    {
        let engine = Engine::from_data_dir(&dir, config()).unwrap();
        let index = engine.inner_arc().index().unwrap();
        index.save_bincode(dir.join("index.bincode")).unwrap();
    }
    let engine = Engine::from_data_dir(&dir, config()).unwrap();
    let index = engine.inner_arc().index().unwrap();
    assert_eq!(index.stats().tokens, 5);
    assert_eq!(engine.generate("hat", 10).rhymes.len(), 2);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn snapshot_from_an_older_lexicon_is_rebuilt() {
    let dir = data_dir("stale");
    {
        let engine = Engine::from_data_dir(&dir, config()).unwrap();
        let index = engine.inner_arc().index().unwrap();
        index.save_bincode(dir.join("index.bincode")).unwrap();
    }

    // regenerate the lexicon without BAT, keeping the old snapshot
    let (lex, _) = parse_cmudict(DICT.replace("BAT  B AE1 T\n", "").as_bytes()).unwrap();
    lex.write_fst_bincode(dir.join("lexicon.fst"), dir.join("lexicon.bincode"))
        .unwrap();

    let engine = Engine::from_data_dir(&dir, config()).unwrap();
    let index = engine.inner_arc().index().unwrap();
    assert_eq!(index.lexicon_fingerprint(), Some(lex.fingerprint()));
    assert!(!index.contains_token("bat"));
    let tokens: Vec<String> = engine
        .generate("cat", 10)
        .rhymes
        .into_iter()
        .map(|m| m.token)
        .collect();
    assert_eq!(tokens, vec!["hat"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unseen_log_persists_across_engines() {
    let dir = data_dir("unseen");
    {
        let engine = Engine::from_data_dir(&dir, config()).unwrap();
        let _ = engine.generate("skrrt", 3);
        let _ = engine.generate("skrrt", 3);
    }
    let engine = Engine::from_data_dir(&dir, config()).unwrap();
    assert_eq!(engine.unseen().count("skrrt"), 2);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_points_at_data_dir() {
    let dir = data_dir("config");
    let cfg = ArpabetConfig {
        data_dir: Some(dir.clone()),
        ..config()
    };
    let engine = Engine::from_config(cfg);
    // the demo lexicon would know "time"
    assert!(!engine.generate("time", 3).status.is_ok());
    let _ = std::fs::remove_dir_all(&dir);
}
