use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

mod evaluation_happy_path {
    use super::*;

    #[tokio::test]
    async fn evaluating_a_pending_submission_records_the_score() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;
        let evaluator_id = Uuid::new_v4();

        let res = app
            .post(
                &routes::submission_evaluate(submission_id),
                &json!({
                    "score": 0.85,
                    "evaluator_id": evaluator_id,
                    "feedback": "Solid recall, noisy precision",
                }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["score"], 0.85);
        assert_eq!(res.body["rank"], 1);
        assert_eq!(res.body["is_new_best"], true);
        assert!(res.body["previous_best"].is_null());

        let submission = &res.body["submission"];
        assert_eq!(submission["status"], "Evaluated");
        assert_eq!(submission["score"], 0.85);
        assert_eq!(submission["evaluator_id"], evaluator_id.to_string());
        assert_eq!(submission["feedback"], "Solid recall, noisy precision");
        assert!(submission["evaluated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn better_resubmission_becomes_the_new_best() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        app.submit_and_evaluate(competition_id, participant_id, 0.7)
            .await;
        let second = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(second, 0.9).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_new_best"], true);
        assert_eq!(res.body["previous_best"], 0.7);
        assert_eq!(res.body["rank"], 1);
    }

    #[tokio::test]
    async fn worse_resubmission_keeps_the_previous_best() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        let first = app
            .submit_and_evaluate(competition_id, participant_id, 0.9)
            .await;
        let second = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(second, 0.7).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_new_best"], false);
        assert_eq!(res.body["previous_best"], 0.9);

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["best_score"], 0.9);
        assert_eq!(entries[0]["best_submission_id"], first.to_string());
        assert_eq!(entries[0]["submission_count"], 2);
    }

    #[tokio::test]
    async fn equal_score_keeps_the_earlier_submission_as_best() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        let first = app
            .submit_and_evaluate(competition_id, participant_id, 0.8)
            .await;
        let second = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(second, 0.8).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_new_best"], false);
        assert_eq!(res.body["previous_best"], 0.8);

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["best_submission_id"], first.to_string());
    }

    #[tokio::test]
    async fn response_rank_accounts_for_other_participants() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let leader = app.create_participant("Ada").await;
        let trailer = app.create_participant("Grace").await;

        app.submit_and_evaluate(competition_id, leader, 0.9).await;
        let submission_id = app.create_submission(competition_id, trailer).await;
        let res = app.evaluate(submission_id, 0.5).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["rank"], 2);
    }
}

mod score_validation {
    use super::*;

    #[tokio::test]
    async fn out_of_range_score_leaves_the_submission_pending() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let res = app.evaluate(submission_id, 1.5).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].as_str().unwrap().contains("outside"));

        // The failed attempt must not consume the submission.
        let fetched = app.get(&routes::submission(submission_id)).await;
        assert_eq!(fetched.body["status"], "Pending");

        let retry = app.evaluate(submission_id, 0.9).await;
        assert_eq!(retry.status, 200);
    }

    #[tokio::test]
    async fn rejected_scores_never_touch_the_leaderboard() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let res = app.evaluate(submission_id, -0.2).await;
        assert_eq!(res.status, 400);

        let board = app.get(&routes::leaderboard(competition_id)).await;
        assert_eq!(board.body["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn score_bounds_are_inclusive() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        for score in [0.0, 1.0] {
            let submission_id = app.create_submission(competition_id, participant_id).await;
            let res = app.evaluate(submission_id, score).await;
            assert_eq!(res.status, 200, "score {score} should be accepted");
        }
    }

    #[tokio::test]
    async fn honors_a_custom_score_range() {
        let app = TestApp::spawn().await;
        let competition_id = app
            .create_competition_with_range("RMSE Challenge", "Minimize", 0.0, 100.0)
            .await;
        let participant_id = app.create_participant("Ada").await;

        let accepted = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(accepted, 42.5).await;
        assert_eq!(res.status, 200);

        let refused = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(refused, 100.5).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_a_missing_score() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let res = app
            .post(
                &routes::submission_evaluate(submission_id),
                &json!({ "evaluator_id": Uuid::new_v4() }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod evaluation_lifecycle {
    use super::*;

    #[tokio::test]
    async fn a_submission_can_only_be_evaluated_once() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        app.evaluate_ok(submission_id, 0.8).await;
        let res = app.evaluate(submission_id, 0.95).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
        assert!(res.body["message"].as_str().unwrap().contains("Evaluated"));

        // The losing attempt must not have moved the board.
        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["best_score"], 0.8);
        assert_eq!(entries[0]["submission_count"], 1);
    }

    #[tokio::test]
    async fn a_rejected_submission_cannot_be_evaluated() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let rejected = app
            .post(
                &routes::submission_reject(submission_id),
                &json!({ "evaluator_id": Uuid::new_v4(), "reason": "Wrong file format" }),
            )
            .await;
        assert_eq!(rejected.status, 200);

        let res = app.evaluate(submission_id, 0.9).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
        assert!(res.body["message"].as_str().unwrap().contains("Rejected"));
    }

    #[tokio::test]
    async fn evaluating_an_unknown_submission_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.evaluate(Uuid::new_v4(), 0.5).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod rejection {
    use super::*;

    #[tokio::test]
    async fn rejecting_a_pending_submission_records_the_reason() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let res = app
            .post(
                &routes::submission_reject(submission_id),
                &json!({
                    "evaluator_id": Uuid::new_v4(),
                    "reason": "Archive is corrupted and cannot be opened",
                }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "Rejected");
        assert_eq!(
            res.body["feedback"],
            "Archive is corrupted and cannot be opened"
        );
        assert!(res.body["score"].is_null());
        assert!(res.body["evaluator_id"].is_null());
        assert!(res.body["evaluated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn rejection_requires_a_reason() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        let res = app
            .post(
                &routes::submission_reject(submission_id),
                &json!({ "evaluator_id": Uuid::new_v4(), "reason": "  " }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let fetched = app.get(&routes::submission(submission_id)).await;
        assert_eq!(fetched.body["status"], "Pending");
    }

    #[tokio::test]
    async fn rejection_never_reaches_the_leaderboard() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        app.submit_and_evaluate(competition_id, participant_id, 0.5)
            .await;
        let rejected = app.create_submission(competition_id, participant_id).await;
        app.post(
            &routes::submission_reject(rejected),
            &json!({ "evaluator_id": Uuid::new_v4(), "reason": "Missing predictions file" }),
        )
        .await;

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["best_score"], 0.5);
        // Rejected submissions do not count as evaluated.
        assert_eq!(entries[0]["submission_count"], 1);
    }

    #[tokio::test]
    async fn an_evaluated_submission_cannot_be_rejected() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app.create_submission(competition_id, participant_id).await;

        app.evaluate_ok(submission_id, 0.8).await;
        let res = app
            .post(
                &routes::submission_reject(submission_id),
                &json!({ "evaluator_id": Uuid::new_v4(), "reason": "Too late" }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn rejecting_an_unknown_submission_returns_404() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                &routes::submission_reject(Uuid::new_v4()),
                &json!({ "evaluator_id": Uuid::new_v4(), "reason": "No such upload" }),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod minimize_metric {
    use super::*;

    #[tokio::test]
    async fn lower_scores_win_when_minimizing() {
        let app = TestApp::spawn().await;
        let competition_id = app
            .create_competition_with_range("RMSE Challenge", "Minimize", 0.0, 10.0)
            .await;
        let participant_id = app.create_participant("Ada").await;

        let first = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(first, 0.15).await;
        assert_eq!(res.body["is_new_best"], true);

        let second = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(second, 0.12).await;
        assert_eq!(res.body["is_new_best"], true);
        assert_eq!(res.body["previous_best"], 0.15);

        let third = app.create_submission(competition_id, participant_id).await;
        let res = app.evaluate(third, 0.20).await;
        assert_eq!(res.body["is_new_best"], false);
        assert_eq!(res.body["previous_best"], 0.12);

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries[0]["best_score"], 0.12);
        assert_eq!(entries[0]["best_submission_id"], second.to_string());
        assert_eq!(entries[0]["submission_count"], 3);
    }
}

mod concurrent_evaluation {
    use super::*;

    #[tokio::test]
    async fn concurrent_evaluations_for_one_participant_converge_on_the_better_score() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        let low = app.create_submission(competition_id, participant_id).await;
        let high = app.create_submission(competition_id, participant_id).await;

        let (low_res, high_res) =
            tokio::join!(app.evaluate(low, 0.7), app.evaluate(high, 0.9));

        assert_eq!(low_res.status, 200, "low evaluate failed: {}", low_res.text);
        assert_eq!(
            high_res.status, 200,
            "high evaluate failed: {}",
            high_res.text
        );
        // Whichever order the writes landed in, 0.9 ends up best.
        assert_eq!(high_res.body["is_new_best"], true);

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["best_score"], 0.9);
        assert_eq!(entries[0]["best_submission_id"], high.to_string());
        assert_eq!(entries[0]["submission_count"], 2);
    }

    #[tokio::test]
    async fn concurrent_first_evaluations_rank_every_participant() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;

        let scores = [0.4, 0.6, 0.8, 0.95];
        let mut submissions = Vec::new();
        for (i, score) in scores.iter().enumerate() {
            let participant_id = app.create_participant(&format!("Participant {i}")).await;
            let submission_id = app.create_submission(competition_id, participant_id).await;
            submissions.push((submission_id, *score));
        }

        let results = futures::future::join_all(
            submissions
                .iter()
                .map(|(id, score)| app.evaluate(*id, *score)),
        )
        .await;
        for res in &results {
            assert_eq!(res.status, 200, "evaluate failed: {}", res.text);
        }

        let board = app.get(&routes::leaderboard(competition_id)).await;
        let entries = board.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        let ranks: Vec<u64> = entries
            .iter()
            .map(|e| e["rank"].as_u64().unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        let best_scores: Vec<f64> = entries
            .iter()
            .map(|e| e["best_score"].as_f64().unwrap())
            .collect();
        assert_eq!(best_scores, vec![0.95, 0.8, 0.6, 0.4]);
    }
}
