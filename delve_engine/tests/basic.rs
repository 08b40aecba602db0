use std::path::PathBuf;

use de::*;
use delve_engine as de;

fn shipped_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

#[test]
fn test_lib_version() {
    assert!(!de::DELVE_VERSION.is_empty());
}

#[test]
fn test_shipped_data_is_clean() {
    let game = load_game(&shipped_data()).expect("load shipped data");
    assert!(delve_data::validate_game(&game).is_empty());
    assert_eq!(game.start, "WHOUS");
    assert_eq!(Session::class_list(&game).len(), 3);
}

#[test]
fn test_every_class_can_start() {
    let game = load_game(&shipped_data()).expect("load shipped data");
    for (class, _) in Session::class_list(&game) {
        let mut session =
            Session::with_class(game.clone(), &class, Box::new(LoadedDice::default())).expect("class session");
        let mut view = View::new();
        session.start(&mut view).expect("start");
        assert!(!session.character.inventory.is_empty(), "{class} starts empty-handed");
        assert!(!session.in_combat());
    }
}

#[test]
fn test_fighter_stats_follow_class() {
    let game = load_game(&shipped_data()).expect("load shipped data");
    let session = Session::with_class(game, "fighter", Box::new(LoadedDice::default())).expect("fighter");
    let c = &session.character;
    assert_eq!((c.strength.value(), c.strength.max()), (5, 5));
    assert_eq!((c.wisdom.value(), c.wisdom.max()), (2, 2));
    assert_eq!(c.format_stats().split_whitespace().next(), Some("STR"));
}

#[test]
fn test_unknown_class_is_rejected() {
    let game = load_game(&shipped_data()).expect("load shipped data");
    let err = Session::with_class(game, "bard", Box::new(LoadedDice::default())).expect_err("no bards");
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::UnknownClass("bard".into()))
    );
}

#[test]
fn test_scripted_playthrough_reaches_the_kitchen() {
    use de::prompt::LinePrompter;

    let game = load_game(&shipped_data()).expect("load shipped data");
    let mut session = Session::with_class(game, "fighter", Box::new(RandomDice::seeded(7))).expect("fighter");
    let mut view = View::new();
    session.start(&mut view).expect("start");

    let input = b"take torch\npull rope\nlook\ninv\nmove kitchen\nquit\n".as_slice();
    let mut out = Vec::new();
    let mut io = LinePrompter::new(input, &mut out);
    run_repl(&mut session, &mut io).expect("repl");

    assert_eq!(session.room, "KITCHEN");
    assert!(session.character.has_item("torch"));
    assert!(session.in_combat());
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("You receive the torch."));
    assert!(text.contains("Somewhere below, the bell still hums."));
    assert!(text.contains("You are ambushed by 2 rats!"));
}
