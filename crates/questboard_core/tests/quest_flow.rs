use questboard_core::db::open_db_in_memory;
use questboard_core::{
    BoardConfig, BoardSession, Difficulty, PlayerStats, Quest, QuestStatus,
    SqliteStorageRepository,
};

fn fresh_session() -> BoardSession<SqliteStorageRepository> {
    let repo = SqliteStorageRepository::new(open_db_in_memory().unwrap());
    BoardSession::open(repo, BoardConfig::default())
}

#[test]
fn slay_dragon_scenario() {
    let mut session = fresh_session();
    assert!(session.quests().is_empty());

    let quest = Quest::new("Slay Dragon", None, Difficulty::Hard).unwrap();
    let id = quest.id.clone();
    assert_eq!(quest.xp_reward, 75.0);
    session.add_quest(quest).unwrap();

    session.update_quest_status(id.as_str(), QuestStatus::Doing).unwrap();
    assert_eq!(session.player_stats().current_xp, 10.0);

    session.update_quest_status(id.as_str(), QuestStatus::Done).unwrap();
    assert_eq!(session.player_stats().current_xp, 85.0);
    assert_eq!(session.player_stats().level, 1);

    session.delete_quest(id.as_str()).unwrap();
    assert!(session.quests().is_empty());
    assert_eq!(session.player_stats().current_xp, 85.0);
    assert_eq!(session.player_stats().level, 1);
}

#[test]
fn added_quest_is_unique_and_first() {
    let mut session = fresh_session();
    for title in ["one", "two", "three"] {
        let quest = Quest::new(title, None, Difficulty::Normal).unwrap();
        let id = quest.id.clone();
        session.add_quest(quest).unwrap();

        assert_eq!(session.quests()[0].id, id);
        assert_eq!(session.quests().iter().filter(|q| q.id == id).count(), 1);
    }
}

#[test]
fn three_normal_completions_level_up_once() {
    let mut session = fresh_session();
    let mut ids = Vec::new();
    for title in ["Q1", "Q2", "Q3"] {
        let quest = Quest::new(title, None, Difficulty::Normal).unwrap();
        ids.push(quest.id.clone());
        session.add_quest(quest).unwrap();
    }

    // Starting all three: 30 XP.
    for id in &ids {
        session.update_quest_status(id.as_str(), QuestStatus::Doing).unwrap();
    }
    assert_eq!(session.player_stats().current_xp, 30.0);

    session.update_quest_status(ids[0].as_str(), QuestStatus::Done).unwrap();
    assert_eq!(session.player_stats().current_xp, 80.0);

    let outcome = session
        .update_quest_status(ids[1].as_str(), QuestStatus::Done)
        .unwrap();
    assert!(outcome.leveled_up);
    assert_eq!(
        session.player_stats(),
        &PlayerStats {
            level: 2,
            current_xp: 30.0,
            xp_to_next_level: 150.0,
        }
    );

    session.update_quest_status(ids[2].as_str(), QuestStatus::Done).unwrap();
    assert_eq!(session.player_stats().level, 2);
    assert_eq!(session.player_stats().current_xp, 80.0);
    assert!(session.summary().all_complete);
}

#[test]
fn export_then_import_reproduces_the_board() {
    let mut source = fresh_session();
    let easy = Quest::new("Easy one", Some("with notes"), Difficulty::Easy).unwrap();
    let epic = Quest::new("Epic one", None, Difficulty::Epic).unwrap();
    let epic_id = epic.id.clone();
    source.add_quest(easy).unwrap();
    source.add_quest(epic).unwrap();
    source
        .update_quest_status(epic_id.as_str(), QuestStatus::Doing)
        .unwrap();

    let exported = source.export_quests_json().unwrap();
    assert!(exported.contains("\n  "), "export should be pretty-printed");
    assert!(exported.contains("\"xpReward\": 120.0") || exported.contains("\"xpReward\": 120"));

    let mut target = fresh_session();
    let report = target.import_quests_json(&exported).unwrap();
    assert!(report.committed);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.dropped, 0);
    assert_eq!(target.quests(), source.quests());

    let reexported = target.export_quests_json().unwrap();
    assert_eq!(reexported, exported);
}

#[test]
fn bad_import_keeps_existing_quests() {
    let mut session = fresh_session();
    session
        .add_quest(Quest::new("precious", None, Difficulty::Normal).unwrap())
        .unwrap();
    let before = session.quests().to_vec();

    for payload in ["not json", "{\"id\": \"a\"}", "[]", "[{\"title\": \"no id\"}, 3]"] {
        let report = session.import_quests_json(payload).unwrap();
        assert!(!report.committed, "payload {payload} should not commit");
        assert_eq!(session.quests(), before.as_slice());
    }
}

#[test]
fn partially_valid_import_drops_bad_elements() {
    let mut session = fresh_session();
    let report = session
        .import_quests_json(
            r#"[
                {"id": "a", "title": "Valid", "status": "Done", "difficulty": "Epic", "xpReward": 120},
                {"id": "b"},
                "junk"
            ]"#,
        )
        .unwrap();

    assert!(report.committed);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.dropped, 2);
    assert_eq!(session.quests()[0].status, QuestStatus::Done);
}

#[test]
fn imported_quest_with_huge_reward_completes_with_default_reward() {
    let mut session = fresh_session();
    let report = session
        .import_quests_json(r#"[{"id": "x", "title": "t", "status": "Doing", "xpReward": 1e300}]"#)
        .unwrap();
    assert!(report.committed);
    assert_eq!(session.quests()[0].xp_reward, 50.0);

    let outcome = session.update_quest_status("x", QuestStatus::Done).unwrap();
    assert!(outcome.changed);
    assert!(!outcome.leveled_up);
    assert_eq!(session.player_stats().current_xp, 50.0);
}
