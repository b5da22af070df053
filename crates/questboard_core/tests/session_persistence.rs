use questboard_core::db::open_db_in_memory;
use questboard_core::{
    BoardConfig, BoardSession, Difficulty, PlayerStats, Quest, QuestPatch, QuestStatus,
    RepoError, RepoResult, SessionError, SqliteStorageRepository, StorageRepository,
    QUESTS_STORAGE_KEY, STATS_STORAGE_KEY,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn memory_repo() -> SqliteStorageRepository {
    SqliteStorageRepository::new(open_db_in_memory().unwrap())
}

fn after_debounce() -> Instant {
    Instant::now() + Duration::from_secs(1)
}

/// Storage that accepts reads and fails every write.
#[derive(Default)]
struct ReadOnlyStorage {
    items: RefCell<HashMap<String, String>>,
}

impl StorageRepository for ReadOnlyStorage {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Unavailable("quota exceeded".to_string()))
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[test]
fn mutations_are_rejected_before_load() {
    let mut session = BoardSession::new(memory_repo(), BoardConfig::default());
    assert!(!session.is_mounted());

    let quest = Quest::new("too early", None, Difficulty::Normal).unwrap();
    assert!(matches!(
        session.add_quest(quest).unwrap_err(),
        SessionError::NotMounted
    ));
    assert!(matches!(
        session.import_quests_json("[]").unwrap_err(),
        SessionError::NotMounted
    ));
    assert!(!session.poll_save_at(after_debounce()));

    let report = session.load();
    assert!(session.is_mounted());
    assert_eq!(report.quests_loaded, 0);
    assert!(!report.stats_restored);
    assert!(!session.has_pending_save());
}

#[test]
fn save_waits_for_quiet_period() {
    let mut session = BoardSession::open(memory_repo(), BoardConfig::default());
    session
        .add_quest(Quest::new("debounced", None, Difficulty::Normal).unwrap())
        .unwrap();

    assert!(session.has_pending_save());
    assert!(!session.poll_save_at(Instant::now()));
    assert_eq!(session.repo().get_item(QUESTS_STORAGE_KEY).unwrap(), None);

    assert!(session.poll_save_at(after_debounce()));
    assert!(!session.has_pending_save());
    let stored = session.repo().get_item(QUESTS_STORAGE_KEY).unwrap().unwrap();
    assert!(stored.contains("debounced"));
}

#[test]
fn no_op_actions_do_not_schedule_saves() {
    let mut session = BoardSession::open(memory_repo(), BoardConfig::default());
    session.delete_quest("ghost").unwrap();
    session
        .update_quest_status("ghost", QuestStatus::Done)
        .unwrap();
    session.clear_all_quests().unwrap();
    assert!(!session.has_pending_save());
    assert!(!session.flush());
}

#[test]
fn flushed_board_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");
    let open_repo =
        || SqliteStorageRepository::new(questboard_core::db::open_db(&path).unwrap());

    let mut session = BoardSession::open(open_repo(), BoardConfig::default());
    let quest = Quest::new("Persist me", Some("details"), Difficulty::Epic).unwrap();
    let id = quest.id.clone();
    session.add_quest(quest).unwrap();
    session.update_quest_status(id.as_str(), QuestStatus::Doing).unwrap();
    session.update_quest_status(id.as_str(), QuestStatus::Done).unwrap();
    session
        .update_quest_details(
            id.as_str(),
            QuestPatch {
                title: Some("Persisted".to_string()),
                ..QuestPatch::default()
            },
        )
        .unwrap();
    assert!(session.flush());
    let expected_quests = session.quests().to_vec();
    let expected_stats = session.player_stats().clone();
    drop(session);

    let mut reloaded = BoardSession::new(open_repo(), BoardConfig::default());
    let report = reloaded.load();
    assert_eq!(report.quests_loaded, 1);
    assert!(report.stats_restored);
    assert_eq!(reloaded.quests(), expected_quests.as_slice());
    assert_eq!(reloaded.player_stats(), &expected_stats);
    assert_eq!(reloaded.player_stats().level, 2);
    assert_eq!(reloaded.player_stats().current_xp, 30.0);
}

#[test]
fn corrupted_storage_loads_as_empty_board() {
    let repo = memory_repo();
    repo.set_item(QUESTS_STORAGE_KEY, "{{not json").unwrap();
    repo.set_item(STATS_STORAGE_KEY, "[1, 2]").unwrap();

    let mut session = BoardSession::new(repo, BoardConfig::default());
    let report = session.load();

    assert!(session.is_mounted());
    assert_eq!(report.quests_loaded, 0);
    assert_eq!(session.player_stats(), &PlayerStats::default());
}

#[test]
fn stored_data_is_sanitized_on_load() {
    let repo = memory_repo();
    repo.set_item(
        QUESTS_STORAGE_KEY,
        r#"[
            {"id": "ok", "title": "Kept", "status": "Weird", "xpReward": null},
            {"id": "", "title": "Dropped"},
            null
        ]"#,
    )
    .unwrap();
    repo.set_item(
        STATS_STORAGE_KEY,
        r#"{"level": 1, "currentXp": 130, "xpToNextLevel": 100}"#,
    )
    .unwrap();

    let session = BoardSession::open(repo, BoardConfig::default());
    assert_eq!(session.quests().len(), 1);
    assert_eq!(session.quests()[0].status, QuestStatus::Backlog);
    assert_eq!(session.quests()[0].difficulty, Difficulty::Normal);
    assert_eq!(session.quests()[0].xp_reward, 50.0);
    assert_eq!(
        session.player_stats(),
        &PlayerStats {
            level: 2,
            current_xp: 30.0,
            xp_to_next_level: 150.0,
        }
    );
}

#[test]
fn huge_stored_xp_loads_as_default_stats() {
    let repo = memory_repo();
    repo.set_item(STATS_STORAGE_KEY, r#"{"level": 1, "currentXp": 1e300}"#)
        .unwrap();

    let session = BoardSession::open(repo, BoardConfig::default());
    assert!(session.is_mounted());
    assert_eq!(session.player_stats(), &PlayerStats::default());
}

#[test]
fn write_failures_degrade_to_memory_only() {
    let mut session = BoardSession::open(
        ReadOnlyStorage::default(),
        BoardConfig::default().with_save_debounce(Duration::ZERO),
    );
    let quest = Quest::new("unsaved", None, Difficulty::Easy).unwrap();
    let id = quest.id.clone();
    session.add_quest(quest).unwrap();

    assert!(session.poll_save_at(after_debounce()));
    assert_eq!(session.quests().len(), 1);

    session.update_quest_status(id.as_str(), QuestStatus::Doing).unwrap();
    assert!(!session.flush());
    assert_eq!(session.player_stats().current_xp, 10.0);
    assert_eq!(session.quests()[0].status, QuestStatus::Doing);
}

#[test]
fn level_up_hook_fires_once_per_leveling_action() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut session = BoardSession::open(memory_repo(), BoardConfig::default());
    let sink = Arc::clone(&seen);
    session.set_level_up_hook(move |stats| sink.lock().unwrap().push(stats.level));

    let quest = Quest::new("Epic grind", None, Difficulty::Epic).unwrap();
    let id = quest.id.clone();
    session.add_quest(quest).unwrap();
    session.update_quest_status(id.as_str(), QuestStatus::Doing).unwrap();
    assert!(seen.lock().unwrap().is_empty());

    session.update_quest_status(id.as_str(), QuestStatus::Done).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

#[test]
fn loading_twice_keeps_in_memory_state() {
    let mut session = BoardSession::open(memory_repo(), BoardConfig::default());
    session
        .add_quest(Quest::new("not saved yet", None, Difficulty::Normal).unwrap())
        .unwrap();

    let report = session.load();
    assert_eq!(report.quests_loaded, 1);
    assert!(session.has_pending_save());
}
