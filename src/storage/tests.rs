use super::*;
use crate::core::config::AppConfig;
use crate::core::error::StorageError;
use crate::core::todo::TodoStore;

async fn test_db() -> (Database, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = AppConfig {
        working_dir: tmp.path().to_path_buf(),
        data_dir: "data".into(),
        ..Default::default()
    };
    let db = Database::open(&config).await.unwrap();
    db.run_migrations().await.unwrap();
    (db, tmp)
}

async fn exercise_store(store: &dyn TodoStore) {
    assert!(store.list("alice").await.unwrap().is_empty());

    store.add("alice", "read chapter 3").await.unwrap();
    store.add("alice", "problem set 2").await.unwrap();
    store.add("alice", "email TA").await.unwrap();
    store.add("bob", "lab report").await.unwrap();

    assert_eq!(
        store.list("alice").await.unwrap(),
        vec!["read chapter 3", "problem set 2", "email TA"]
    );

    // 1-based, later tasks shift up
    assert_eq!(store.remove("alice", 2).await.unwrap(), "problem set 2");
    assert_eq!(
        store.list("alice").await.unwrap(),
        vec!["read chapter 3", "email TA"]
    );
    assert_eq!(store.remove("alice", 2).await.unwrap(), "email TA");

    assert!(matches!(
        store.remove("alice", 0).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store.remove("alice", 5).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store.remove("carol", 1).await,
        Err(StorageError::NotFound(_))
    ));

    assert_eq!(store.list("bob").await.unwrap(), vec!["lab report"]);
}

#[tokio::test]
async fn test_todo_repo_crud() {
    let (db, _tmp) = test_db().await;
    exercise_store(&db.todos()).await;
}

#[tokio::test]
async fn test_memory_store_crud() {
    exercise_store(&MemoryTodoStore::new()).await;
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (db, _tmp) = test_db().await;
    db.todos().add("alice", "keep me").await.unwrap();

    db.run_migrations().await.unwrap();
    assert_eq!(db.todos().list("alice").await.unwrap(), vec!["keep me"]);
}

#[tokio::test]
async fn test_tasks_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("todo.db");
    {
        let db = Database::open_at(&path).await.unwrap();
        db.run_migrations().await.unwrap();
        db.todos().add("alice", "persisted").await.unwrap();
        db.pool().close().await;
    }

    let db = Database::open_at(&path).await.unwrap();
    db.run_migrations().await.unwrap();
    assert_eq!(db.todos().list("alice").await.unwrap(), vec!["persisted"]);
}
