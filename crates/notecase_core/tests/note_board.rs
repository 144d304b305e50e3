use notecase_core::db::open_db;
use notecase_core::{
    starter_categories, Category, CategoryDeleteError, KeyValueStore, MemoryStore, Note,
    NoteBoard, Persistence, RecordId, SqliteKvStore, StorageKey,
};
use std::collections::BTreeMap;

const LIFE: RecordId = RecordId::Number(1);
const WORK: RecordId = RecordId::Number(4);

fn stored_notes(store: &MemoryStore) -> Vec<Note> {
    Persistence::new(store).load(StorageKey::Notes, Vec::new())
}

fn assert_only_key_changed(
    before: &BTreeMap<String, String>,
    store: &MemoryStore,
    changed: StorageKey,
) {
    let after = store.raw_entries();
    for key in StorageKey::ALL {
        let name = key.as_str();
        if key == changed {
            assert_ne!(before.get(name), after.get(name), "{name} should change");
        } else {
            assert_eq!(before.get(name), after.get(name), "{name} should not change");
        }
    }
}

#[test]
fn fresh_store_loads_starter_state_with_work_selected() {
    let store = MemoryStore::new();
    let board = NoteBoard::open(Persistence::new(&store));

    assert!(board.is_ready());
    assert_eq!(board.categories(), starter_categories().as_slice());
    assert!(board.notes().is_empty());
    assert_eq!(board.selected_category(), Some(&WORK));

    let persistence = Persistence::new(&store);
    assert_eq!(
        persistence.load(StorageKey::Categories, Vec::<Category>::new()),
        starter_categories()
    );
    assert_eq!(
        store.get_item(StorageKey::Notes.as_str()).unwrap().as_deref(),
        Some("[]")
    );
    assert_eq!(
        persistence.load(StorageKey::SelectedCategory, None::<RecordId>),
        Some(WORK)
    );
}

#[test]
fn uninitialized_board_does_not_touch_the_store() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::new(Persistence::new(&store));
    assert!(board.add_category("Ideas").is_none());
    assert!(!board.delete_note(&RecordId::Number(1)));
    assert_eq!(
        board.delete_category(&WORK),
        Err(CategoryDeleteError::NotReady)
    );
    assert!(store.is_empty());

    board.initialize();
    assert_eq!(store.len(), 3);
}

#[test]
fn starter_scenario_filters_by_selected_category() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));

    let note = board.create_note("Plan", "Draft plan", None).unwrap();
    assert_eq!(note.category_id, WORK);
    let visible: Vec<&Note> = board.visible_notes().collect();
    assert_eq!(visible, vec![&note]);

    board.select_category(LIFE);
    assert_eq!(board.visible_notes().count(), 0);
}

#[test]
fn visible_notes_preserves_insertion_order() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let first = board.create_note("one", "1", None).unwrap();
    board.select_category(LIFE);
    board.create_note("elsewhere", "x", None).unwrap();
    board.select_category(WORK);
    let second = board.create_note("two", "2", None).unwrap();
    let third = board.create_note("three", "3", None).unwrap();

    let ids: Vec<&RecordId> = board.visible_notes().map(|note| &note.id).collect();
    assert_eq!(ids, vec![&first.id, &second.id, &third.id]);
    assert!(board.visible_notes().all(|note| note.category_id == WORK));
}

#[test]
fn blank_input_is_rejected_without_changes() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let before = store.raw_entries();

    assert!(board.add_category("").is_none());
    assert!(board.add_category("   ").is_none());
    assert!(board.create_note("", "x", None).is_none());
    assert!(board.create_note("x", "", None).is_none());
    assert!(board.create_note("  ", "x", None).is_none());

    assert_eq!(board.categories().len(), 4);
    assert!(board.notes().is_empty());
    assert_eq!(store.raw_entries(), before);
}

#[test]
fn add_category_trims_name_and_keeps_selection() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let before = store.raw_entries();

    let added = board.add_category("  Recipes ").unwrap();
    assert_eq!(added.name, "Recipes");
    assert_eq!(board.categories().last(), Some(&added));
    assert_eq!(board.selected_category(), Some(&WORK));

    let stored: Vec<Category> = Persistence::new(&store).load(StorageKey::Categories, Vec::new());
    assert_eq!(stored.len(), 5);
    assert_only_key_changed(&before, &store, StorageKey::Categories);
}

#[test]
fn create_note_trims_fields_and_persists_notes_only() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let before = store.raw_entries();

    let note = board
        .create_note("  Plan ", "\tDraft plan\n", Some("https://example.com/a.png".to_string()))
        .unwrap();
    assert_eq!(note.title, "Plan");
    assert_eq!(note.content, "Draft plan");
    assert_eq!(note.image.as_deref(), Some("https://example.com/a.png"));

    assert_eq!(stored_notes(&store), vec![note]);
    assert_only_key_changed(&before, &store, StorageKey::Notes);
}

#[test]
fn update_note_replaces_in_place() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let first = board.create_note("one", "1", None).unwrap();
    let second = board.create_note("two", "2", None).unwrap();

    let mut edited = first.clone();
    edited.title = " first ".to_string();
    edited.image = Some("data:image/png;base64,iVBORw==".to_string());
    assert!(board.update_note(edited));

    assert_eq!(board.notes()[0].id, first.id);
    assert_eq!(board.notes()[0].title, "first");
    assert!(board.notes()[0].image.is_some());
    assert_eq!(board.notes()[1], second);
    assert_eq!(stored_notes(&store), board.notes());
}

#[test]
fn update_note_with_unknown_id_leaves_notes_unchanged() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    board.create_note("one", "1", None).unwrap();
    let before = board.notes().to_vec();
    let stored_before = store.raw_entries();

    let mut stranger = Note::new("ghost", "boo", WORK, None);
    stranger.id = RecordId::Number(7);
    assert!(!board.update_note(stranger));

    assert_eq!(board.notes(), before.as_slice());
    assert_eq!(store.raw_entries(), stored_before);
}

#[test]
fn update_note_rejects_blank_fields() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let note = board.create_note("one", "1", None).unwrap();

    let mut blank = note.clone();
    blank.content = "   ".to_string();
    assert!(!board.update_note(blank));
    assert_eq!(board.notes(), [note].as_slice());
}

#[test]
fn delete_note_removes_it_and_closes_its_detail_view() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let keep = board.create_note("keep", "k", None).unwrap();
    let doomed = board.create_note("doomed", "d", None).unwrap();

    assert_eq!(board.open_note(&doomed.id).map(|n| &n.id), Some(&doomed.id));
    assert!(board.delete_note(&doomed.id));

    assert!(board.visible_notes().all(|note| note.id != doomed.id));
    assert!(board.opened_note().is_none());
    assert_eq!(stored_notes(&store), vec![keep]);

    assert!(!board.delete_note(&doomed.id));
}

#[test]
fn delete_note_keeps_other_open_note() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let open = board.create_note("open", "o", None).unwrap();
    let other = board.create_note("other", "x", None).unwrap();

    board.open_note(&open.id);
    assert!(board.delete_note(&other.id));
    assert_eq!(board.opened_note(), Some(&open));

    board.close_note();
    assert!(board.opened_note().is_none());
    assert!(board.open_note(&RecordId::Number(404)).is_none());
}

#[test]
fn select_category_is_unchecked_and_persisted() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));

    board.select_category(RecordId::Number(99));
    assert_eq!(board.selected_category(), Some(&RecordId::Number(99)));
    assert_eq!(
        store
            .get_item(StorageKey::SelectedCategory.as_str())
            .unwrap()
            .as_deref(),
        Some("99")
    );
}

#[test]
fn reopening_restores_previous_session() {
    let store = MemoryStore::new();
    let (category, note) = {
        let mut board = NoteBoard::open(Persistence::new(&store));
        let category = board.add_category("Garden").unwrap();
        board.select_category(category.id.clone());
        let note = board.create_note("Seeds", "Buy tomato seeds", None).unwrap();
        (category, note)
    };

    let board = NoteBoard::open(Persistence::new(&store));
    assert_eq!(board.selected_category(), Some(&category.id));
    assert_eq!(board.visible_notes().collect::<Vec<_>>(), vec![&note]);
}

#[test]
fn reopening_sqlite_backed_board_restores_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notecase.sqlite3");
    let note = {
        let conn = open_db(&path).unwrap();
        let mut board = NoteBoard::open(Persistence::new(SqliteKvStore::try_new(&conn).unwrap()));
        board.create_note("Plan", "Draft plan", None).unwrap()
    };

    let conn = open_db(&path).unwrap();
    let board = NoteBoard::open(Persistence::new(SqliteKvStore::try_new(&conn).unwrap()));
    assert_eq!(board.notes(), [note].as_slice());
    assert_eq!(board.selected_category(), Some(&WORK));
}

#[test]
fn corrupted_entries_fall_back_to_defaults() {
    let store = MemoryStore::new();
    store
        .set_item(StorageKey::Categories.as_str(), "not json")
        .unwrap();
    store.set_item(StorageKey::Notes.as_str(), "{").unwrap();
    store
        .set_item(StorageKey::SelectedCategory.as_str(), "[1,")
        .unwrap();

    let board = NoteBoard::open(Persistence::new(&store));
    assert_eq!(board.categories(), starter_categories().as_slice());
    assert!(board.notes().is_empty());
    assert_eq!(board.selected_category(), Some(&WORK));
}

#[test]
fn stored_categories_without_work_select_first() {
    let store = MemoryStore::new();
    let persistence = Persistence::new(&store);
    persistence.save(
        StorageKey::Categories,
        &vec![
            Category::with_id(RecordId::Number(10), "Travel"),
            Category::with_id(RecordId::Number(11), "Books"),
        ],
    );

    let board = NoteBoard::open(persistence);
    assert_eq!(board.selected_category(), Some(&RecordId::Number(10)));
}

#[test]
fn failed_writes_keep_in_memory_state() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    store.set_available(false);

    let note = board.create_note("Offline", "still here", None).unwrap();
    assert_eq!(board.notes(), [note].as_slice());

    store.set_available(true);
    assert!(stored_notes(&store).is_empty());
    board.create_note("Online", "heals", None).unwrap();
    assert_eq!(stored_notes(&store).len(), 2);
}

#[test]
fn delete_category_blocks_while_notes_exist() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    board.create_note("Plan", "Draft plan", None).unwrap();

    assert_eq!(
        board.delete_category(&WORK),
        Err(CategoryDeleteError::HasNotes { count: 1 })
    );
    assert_eq!(
        board.delete_category(&RecordId::Number(42)),
        Err(CategoryDeleteError::NotFound(RecordId::Number(42)))
    );
    assert_eq!(board.categories().len(), 4);
}

#[test]
fn delete_selected_category_moves_selection() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));

    let removed = board.delete_category(&WORK).unwrap();
    assert_eq!(removed.name, "Work");
    assert_eq!(board.selected_category(), Some(&LIFE));

    let reopened = NoteBoard::open(Persistence::new(&store));
    assert_eq!(reopened.categories().len(), 3);
    assert_eq!(reopened.selected_category(), Some(&LIFE));
}

#[test]
fn delete_last_category_is_refused() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    for id in 2..=4 {
        board.delete_category(&RecordId::Number(id)).unwrap();
    }
    assert_eq!(
        board.delete_category(&LIFE),
        Err(CategoryDeleteError::LastCategory)
    );
}

#[test]
fn reload_picks_up_external_store_changes_and_closes_note() {
    let store = MemoryStore::new();
    let mut board = NoteBoard::open(Persistence::new(&store));
    let note = board.create_note("Plan", "Draft plan", None).unwrap();
    board.open_note(&note.id);

    Persistence::new(&store).save(StorageKey::Notes, &Vec::<Note>::new());
    board.reload();

    assert!(board.notes().is_empty());
    assert!(board.opened_note().is_none());
}
