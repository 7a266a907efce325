use chem_core::model::{Answer, HighScoreRecord, ModuleKey, Percent, ProgressRecord, Question, UserId};
use chem_core::time::fixed_now;
use storage::repository::{ProgressCache, ProgressDocumentStore, QuestionBank};
use storage::sqlite::SqliteRepository;

fn percent(value: u8) -> Percent {
    Percent::new(value).unwrap()
}

fn build_question(prompt: &str, category: &str) -> Question {
    Question::new(
        prompt,
        vec![
            Answer::new("wrong", false),
            Answer::new("right", true),
            Answer::new("also wrong", false),
            Answer::new("still wrong", false),
        ],
        "Because the right one is right.",
        category,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_merge_writes_build_up_one_document() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_merge?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("u1");
    assert!(repo.get_document(&user).await.unwrap().is_none());

    let record = ProgressRecord::new(user.clone(), ModuleKey::AcidBase, percent(60), fixed_now());
    repo.merge_progress(&record, "u1@example.com").await.unwrap();

    let score = HighScoreRecord::new(user.clone(), 24, fixed_now());
    repo.merge_high_score(&user, &score).await.unwrap();

    let record = ProgressRecord::new(user.clone(), ModuleKey::Bonding, percent(35), fixed_now());
    repo.merge_progress(&record, "u1@example.com").await.unwrap();

    let doc = repo.get_document(&user).await.unwrap().expect("document");
    assert_eq!(doc.acid_base_progress, Some(percent(60)));
    assert_eq!(doc.bonding_progress, Some(percent(35)));
    assert_eq!(doc.max_quiz_score, Some(24));
    assert_eq!(doc.has_new_high_score, Some(true));
    assert_eq!(doc.email.as_deref(), Some("u1@example.com"));
    assert_eq!(doc.last_updated, Some(fixed_now()));
}

#[tokio::test]
async fn sqlite_documents_are_per_user() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_users?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    let record = ProgressRecord::new(alice.clone(), ModuleKey::Redox, percent(90), fixed_now());
    repo.merge_progress(&record, "alice@example.com").await.unwrap();

    assert!(repo.get_document(&bob).await.unwrap().is_none());
    let doc = repo.get_document(&alice).await.unwrap().expect("document");
    assert_eq!(doc.redox_progress, Some(percent(90)));
}

#[tokio::test]
async fn sqlite_question_pool_round_trips() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_questions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = build_question("Which indicator turns pink?", "acid-base");
    let second = build_question("Which species is oxidized?", "redox");
    repo.insert_question(&first).await.unwrap();
    repo.insert_question(&second).await.unwrap();

    let fetched = repo.fetch_questions().await.unwrap();
    assert_eq!(fetched.len(), 2);
    assert!(fetched.contains(&first));
    assert!(fetched.contains(&second));
    assert_eq!(fetched[0].correct_index(), 1);
}

#[tokio::test]
async fn sqlite_cache_get_set_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_cache?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set("acidBaseProgress", "55").await.unwrap();
    repo.set("acidBaseProgress", "70").await.unwrap();
    repo.set("titrationProgress", "10").await.unwrap();

    assert_eq!(
        repo.get("acidBaseProgress").await.unwrap().as_deref(),
        Some("70")
    );

    repo.remove_many(&["acidBaseProgress", "titrationProgress", "missing"])
        .await
        .unwrap();
    assert_eq!(repo.get("acidBaseProgress").await.unwrap(), None);
    assert_eq!(repo.get("titrationProgress").await.unwrap(), None);
}
