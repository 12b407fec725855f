use quiz_core::model::{QuizId, RewardPolicy};
use quiz_core::time::fixed_clock;
use services::{AppServices, QuizCatalog, QuizServiceError};

const CATALOG: &str = r#"{
    "quizzes": [
        {
            "_id": "water",
            "title": "Saving water",
            "questions": [
                { "text": "Best way to save water?", "options": { "A": "Short showers", "B": "Long baths" }, "correct": "A" },
                { "text": "Fix a dripping tap?", "options": { "A": "Later", "B": "Now" }, "correct": "B" }
            ]
        },
        {
            "_id": "energy",
            "title": "Energy",
            "questions": [
                { "text": "Which bulb uses least power?", "options": { "A": "LED", "B": "Incandescent", "C": "Halogen" }, "correct": "A" }
            ]
        },
        {
            "_id": "broken",
            "title": "Broken",
            "questions": [
                { "text": "No right answer", "options": { "A": "x" }, "correct": "Z" }
            ]
        }
    ]
}"#;

fn catalog() -> QuizCatalog {
    QuizCatalog::from_json_str(CATALOG).expect("catalog")
}

#[tokio::test]
async fn sqlite_quiz_loop_persists_progress_and_badges() {
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_quiz_loop?mode=memory&cache=shared",
        fixed_clock(),
        RewardPolicy::default(),
        catalog(),
    )
    .await
    .expect("services");
    let quiz_loop = app.quiz_loop();
    let water = app.catalog().get(&QuizId::new("water")).expect("quiz");

    let mut run = quiz_loop.start_quiz(water).unwrap();
    let mut completion = None;
    for key in ["A", "B"] {
        let view = quiz_loop.current_question(&run).unwrap();
        assert!(view.has_option(key));
        completion = quiz_loop.answer(&mut run, key).await.unwrap().completion;
    }
    let done = completion.expect("completed");
    assert_eq!(done.points_earned(), 70);
    assert_eq!(done.new_badges, vec!["Perfect Score".to_string()]);

    // Perfect Score is already held, so a second perfect quiz only earns
    // answer points: 70 + 10 = 80.
    let energy = app.catalog().get(&QuizId::new("energy")).expect("quiz");
    let mut run = quiz_loop.start_quiz(energy).unwrap();
    let done = quiz_loop
        .answer(&mut run, "A")
        .await
        .unwrap()
        .completion
        .expect("completed");
    assert!(done.new_badges.is_empty());
    assert_eq!(done.progress.points(), 80);

    // 80 + 20 reaches 100, which unlocks Eco Warrior in the same completion.
    let water = app.catalog().get(&QuizId::new("water")).expect("quiz");
    let mut run = quiz_loop.start_quiz(water).unwrap();
    quiz_loop.answer(&mut run, "A").await.unwrap();
    let done = quiz_loop
        .answer(&mut run, "B")
        .await
        .unwrap()
        .completion
        .expect("completed");
    assert_eq!(done.new_badges, vec!["Eco Warrior".to_string()]);
    assert_eq!(done.progress.points(), 150);
    assert_eq!(done.progress.level(), 1);
    assert_eq!(done.progress.level_progress(), 50);

    let stored = quiz_loop.progress().await;
    assert_eq!(stored.points(), 150);
    assert!(stored.has_badge("Perfect Score"));
    assert!(stored.has_badge("Eco Warrior"));
}

#[tokio::test]
async fn every_quiz_completes_after_one_answer_per_question() {
    let app = AppServices::in_memory(fixed_clock(), RewardPolicy::default(), catalog());
    let quiz_loop = app.quiz_loop();

    for id in ["water", "energy"] {
        let quiz = app.catalog().get(&QuizId::new(id)).unwrap();
        let total = quiz.len();
        let mut run = quiz_loop.start_quiz(quiz).unwrap();
        for n in 1..=total {
            let outcome = quiz_loop.answer(&mut run, "nope").await.unwrap();
            assert_eq!(outcome.complete, n == total);
        }
        assert!(run.is_complete());
        assert_eq!(run.completion().unwrap().summary.score(), 0);
    }
}

#[tokio::test]
async fn broken_quiz_cannot_be_started() {
    let app = AppServices::in_memory(fixed_clock(), RewardPolicy::default(), catalog());
    let broken = app.catalog().get(&QuizId::new("broken")).unwrap();
    let err = app.quiz_loop().start_quiz(broken).unwrap_err();
    assert!(matches!(err, QuizServiceError::InvalidQuiz(_)));
}
