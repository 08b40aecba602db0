use de::character::AbilitySource;
use de::item::AbilityGroup;
use de::*;
use delve_data::{FlagValue, GameDef};
use delve_engine as de;

const GAME: &str = r#"{
    "rooms": {
        "WHOUS": {
            "name": "White House",
            "desc": [
                "Dust hangs in the air.",
                { "type": "if", "flag": "bell", "then": "The bell still hums." }
            ],
            "exits": [{ "exit": "north", "target": "DEN" }, { "exit": "cellar", "target": "CELLAR" }],
            "items": ["torch"],
            "interact": {
                "rope": { "pull": [{ "type": "setflag", "flag": "bell" }, "A bell rings somewhere."] },
                "lever": { "pull": { "type": "give", "item": "ghost" } },
                "altar": { "touch": {
                    "type": "has", "item": "torch",
                    "then": [{ "type": "remove", "item": "torch" }, "The torch is swallowed by the altar."],
                    "else": "Nothing happens."
                } },
                "mirror": { "look": { "type": "wink" } },
                "dial": {
                    "read": { "type": "if", "flag": "dial", "test": 2, "then": "It points at two.", "else": "It wobbles." },
                    "turn": { "type": "setflag", "flag": "dial", "value": 2 }
                },
                "candle": { "look": { "type": "if", "flag": "snuffed", "default": true, "then": "Only a wick.", "else": "It burns." } },
                "scale": { "tip": [
                    { "type": "setflag", "flag": "balance", "value": 0.5 },
                    { "type": "if", "flag": "balance", "then": "The pans settle unevenly." }
                ] }
            }
        },
        "DEN": {
            "name": "Den",
            "exits": [{ "exit": "south", "target": "WHOUS" }],
            "encounter": ["rat", "rat"]
        },
        "CELLAR": { "encounter": ["wraith"] }
    },
    "items": {
        "torch": { "name": "torch", "desc": "A stick wrapped in oily rags." }
    },
    "enemies": {
        "rat": { "name": "rat", "health": 1, "defense": 1 }
    }
}"#;

fn started(rolls: impl IntoIterator<Item = u32>) -> (Session, View) {
    let game: GameDef = serde_json::from_str(GAME).expect("parse game");
    let mut session = Session::new(game, Character::new(), Box::new(LoadedDice::new(rolls))).expect("session");
    let mut view = View::new();
    session.start(&mut view).expect("start");
    (session, view)
}

fn texts(view: &mut View) -> Vec<String> {
    view.drain().iter().map(ToString::to_string).collect()
}

#[test]
fn entering_a_room_lists_items_and_hides_unexplored_exits() {
    let (_, mut view) = started([]);
    let lines = texts(&mut view);
    assert_eq!(lines[0], "You enter the 'White House'.");
    assert_eq!(lines[1], "Dust hangs in the air.");
    assert_eq!(lines[2], "You notice a torch.");
    assert_eq!(lines[3], "There are 2 exits:\n  1. north -> ???\n  2. cellar -> ???");
}

#[test]
fn second_take_reports_already_taken() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "take", "torch").expect("take");
    s.interact(&mut view, "take", "Torch").expect("take again");
    assert_eq!(
        view.drain(),
        vec![
            ViewItem::ItemReceived { name: "torch".into() },
            ViewItem::AlreadyTaken { name: "torch".into() },
        ]
    );
    assert_eq!(s.character.inventory.len(), 1);

    s.interact(&mut view, "look", "torch").expect("look");
    assert_eq!(
        texts(&mut view),
        vec!["You don't see the torch here anymore.".to_string()]
    );
    s.describe_room(&mut view).expect("describe");
    assert!(!texts(&mut view).iter().any(|line| line.contains("You notice")));
}

#[test]
fn flags_set_by_interactions_change_descriptions() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "pull", "rope").expect("pull");
    assert_eq!(texts(&mut view), vec!["A bell rings somewhere.".to_string()]);
    s.describe_room(&mut view).expect("describe");
    assert!(texts(&mut view).contains(&"The bell still hums.".to_string()));
}

#[test]
fn has_and_remove_follow_the_inventory() {
    let (mut s, mut view) = started([]);
    s.interact(&mut view, "touch", "altar").expect("touch");
    assert_eq!(texts(&mut view).last().map(String::as_str), Some("Nothing happens."));

    s.interact(&mut view, "take", "torch").expect("take");
    view.drain();
    s.interact(&mut view, "touch", "altar").expect("touch");
    assert_eq!(
        texts(&mut view),
        vec![
            "The torch is taken from you.".to_string(),
            "The torch is swallowed by the altar.".to_string()
        ]
    );
    assert!(!s.character.has_item("torch"));
}

#[test]
fn giving_an_undefined_item_is_an_error() {
    let (mut s, mut view) = started([]);
    let err = s.interact(&mut view, "pull", "lever").expect_err("ghost is not an item");
    assert!(
        err.chain().any(|cause| cause.to_string().contains("ghost")),
        "unexpected error: {err:#}"
    );
}

#[test]
fn unknown_directives_are_reported_and_skipped() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "look", "mirror").expect("look");
    assert_eq!(view.count(ViewItem::is_error), 1);
    s.interact(&mut view, "lick", "mirror").expect("lick");
    assert!(view.items.contains(&ViewItem::ActionFailure("You can't lick the mirror.".into())));
}

#[test]
fn movement_is_refused_during_combat() {
    let (mut s, mut view) = started([]);
    s.move_to(&mut view, "north").expect("move");
    assert!(view.items.contains(&ViewItem::Ambush("2 rats".into())));
    assert_eq!(s.encounter.len(), 2);

    view.drain();
    s.move_to(&mut view, "1").expect("move");
    assert_eq!(s.room, "DEN");
    assert_eq!(
        view.items,
        vec![ViewItem::ActionFailure("You can't leave while enemies block your way!".into())]
    );
}

#[test]
fn cleared_rooms_stay_cleared() {
    let (mut s, mut view) = started([6, 6, 6, 1, 6, 6, 6, 1]);
    s.move_to(&mut view, "north").expect("move");
    let punch = AbilityHandle {
        group: AbilityGroup::Attack,
        source: AbilitySource::Innate,
        key: "punch".into(),
    };
    let mut prompt = ScriptedPrompter::new().target(Some(0));
    assert!(s.use_ability(&mut view, &mut prompt, &punch).is_performed());
    assert_eq!(s.encounter.len(), 1);
    assert!(s.use_ability(&mut view, &mut prompt, &punch).is_performed());
    assert!(s.encounter.is_empty());
    assert!(s.cleared.contains("DEN"));

    s.move_to(&mut view, "south").expect("move");
    assert_eq!(s.room, "WHOUS");
    view.drain();
    s.move_to(&mut view, "north").expect("move");
    assert!(s.encounter.is_empty());
    assert_eq!(view.count(ViewItem::is_ambush), 0);
}

#[test]
fn explored_rooms_show_their_names_in_exit_lists() {
    let (mut s, mut view) = started([]);
    s.move_to(&mut view, "cellar").expect("move");
    // the wraith is undefined, so the cellar's encounter never starts
    assert!(s.encounter.is_empty());
    assert!(s.cleared.contains("CELLAR"));
    assert!(view.items.contains(&ViewItem::NoExits));
    assert!(view.items.contains(&ViewItem::RoomEntered { name: None }));

    let mut view = View::new();
    s.enter_room(&mut view, "WHOUS").expect("enter");
    let exits = texts(&mut view).into_iter().find(|line| line.starts_with("There are")).expect("exit list");
    assert_eq!(exits, "There are 2 exits:\n  1. north -> ???\n  2. cellar -> CELLAR");
}

#[test]
fn bad_exits_and_locations_are_reported() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.move_to(&mut view, "up").expect("move");
    s.enter_room(&mut view, "VOID").expect("enter");
    assert_eq!(
        texts(&mut view),
        vec!["Invalid exit 'up'".to_string(), "Unrecognized location 'VOID'".to_string()]
    );
    assert_eq!(s.room, "WHOUS");
}

#[test]
fn if_compares_against_its_test_value() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "read", "dial").expect("read");
    s.interact(&mut view, "turn", "dial").expect("turn");
    s.interact(&mut view, "read", "dial").expect("read again");
    assert_eq!(
        texts(&mut view),
        vec!["It wobbles.".to_string(), "It points at two.".to_string()]
    );
}

#[test]
fn if_reads_its_default_for_unset_flags() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "look", "candle").expect("look");
    assert_eq!(texts(&mut view), vec!["Only a wick.".to_string()]);

    s.flags.set("snuffed", false.into());
    s.interact(&mut view, "look", "candle").expect("look again");
    assert_eq!(texts(&mut view), vec!["It burns.".to_string()]);
}

#[test]
fn fractional_flag_values_load_and_run() {
    let (mut s, mut view) = started([]);
    view.drain();
    s.interact(&mut view, "tip", "scale").expect("tip");
    assert_eq!(texts(&mut view), vec!["The pans settle unevenly.".to_string()]);
    assert_eq!(s.flags.get("balance", &FlagValue::default()), FlagValue::Float(0.5));
}
