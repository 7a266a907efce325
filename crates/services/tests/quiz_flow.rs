use std::sync::Arc;

use chem_core::model::{Answer, Principal, Question, UserId};
use chem_core::time::fixed_clock;
use services::quiz::{HighScoreOutcome, QuizService, QuizState, SessionAdvance};
use storage::repository::{InMemoryStorage, ProgressDocumentStore};

fn build_question(n: usize) -> Question {
    Question::new(
        format!("question {n}"),
        vec![
            Answer::new("a", false),
            Answer::new("b", false),
            Answer::new("c", true),
            Answer::new("d", false),
        ],
        "c is correct",
        "thermochemistry",
    )
    .unwrap()
}

fn quiz_service(repo: &InMemoryStorage) -> QuizService {
    QuizService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Some(Principal::new(UserId::new("u1"), "u1@example.com")),
    )
}

#[tokio::test]
async fn perfect_run_persists_the_maximum_score() {
    let repo = InMemoryStorage::new();
    repo.seed_questions((0..8).map(build_question).collect());
    let quiz = quiz_service(&repo);

    let mut session = quiz.new_session();
    assert_eq!(quiz.start(&mut session).await.unwrap(), 8);

    let mut last = None;
    while session.state() == QuizState::InProgress {
        let correct = session.current_question().unwrap().correct_index();
        session.select_answer(correct).unwrap();
        last = Some(session.advance().unwrap());
    }

    assert_eq!(
        last,
        Some(SessionAdvance::Finished {
            correct_count: 8,
            final_score: 32,
        })
    );
    let final_score = session.final_score().unwrap();
    assert_eq!(final_score, 32);

    assert_eq!(
        quiz.reconcile_high_score(final_score).await,
        HighScoreOutcome::NewHighScore { score: 32 }
    );

    let doc = repo
        .get_document(&UserId::new("u1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.max_quiz_score, Some(32));
    assert_eq!(doc.has_new_high_score, Some(true));
}

#[tokio::test]
async fn worse_run_leaves_the_stored_maximum_alone() {
    let repo = InMemoryStorage::new();
    repo.seed_questions((0..8).map(build_question).collect());
    let quiz = quiz_service(&repo);

    let mut session = quiz.new_session();
    quiz.start(&mut session).await.unwrap();
    while session.state() == QuizState::InProgress {
        let correct = session.current_question().unwrap().correct_index();
        session.select_answer(correct).unwrap();
        session.advance().unwrap();
    }
    quiz.reconcile_high_score(session.final_score().unwrap())
        .await;
    assert_eq!(quiz.high_score().await, 32);

    // Second run: answer everything wrong.
    let drawn = quiz.restart(&mut session).await.unwrap();
    assert_eq!(drawn, 8);
    while session.state() == QuizState::InProgress {
        let correct = session.current_question().unwrap().correct_index();
        let wrong = if correct == 0 { 1 } else { 0 };
        session.select_answer(wrong).unwrap();
        session.advance().unwrap();
    }
    assert_eq!(session.final_score(), Some(0));

    assert_eq!(
        quiz.reconcile_high_score(0).await,
        HighScoreOutcome::Unchanged { best: 32 }
    );
    assert_eq!(quiz.high_score().await, 32);
}
