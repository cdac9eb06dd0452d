use uuid::Uuid;

use crate::common::{TestApp, routes};

mod leaderboard_ordering {
    use super::*;

    #[tokio::test]
    async fn ranks_participants_by_best_score() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;

        for (name, score) in [("Ada", 0.72), ("Grace", 0.91), ("Edsger", 0.55)] {
            let participant_id = app.create_participant(name).await;
            app.submit_and_evaluate(competition_id, participant_id, score)
                .await;
        }

        let res = app.get(&routes::leaderboard(competition_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["competition_id"], competition_id.to_string());
        assert_eq!(res.body["metric_direction"], "Maximize");

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);

        let names: Vec<&str> = entries
            .iter()
            .map(|e| e["display_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Grace", "Ada", "Edsger"]);

        let ranks: Vec<u64> = entries
            .iter()
            .map(|e| e["rank"].as_u64().unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn minimize_competitions_rank_lowest_first() {
        let app = TestApp::spawn().await;
        let competition_id = app
            .create_competition_with_range("RMSE Challenge", "Minimize", 0.0, 10.0)
            .await;

        for (name, score) in [("Ada", 0.15), ("Grace", 0.12), ("Edsger", 0.20)] {
            let participant_id = app.create_participant(name).await;
            app.submit_and_evaluate(competition_id, participant_id, score)
                .await;
        }

        let res = app.get(&routes::leaderboard(competition_id)).await;

        let names: Vec<&str> = res.body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["display_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Grace", "Ada", "Edsger"]);
    }

    #[tokio::test]
    async fn each_participant_appears_once_with_their_best() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        for score in [0.3, 0.8, 0.5] {
            app.submit_and_evaluate(competition_id, participant_id, score)
                .await;
        }

        let res = app.get(&routes::leaderboard(competition_id)).await;

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["best_score"], 0.8);
        assert_eq!(entries[0]["submission_count"], 3);
    }

    #[tokio::test]
    async fn exact_ties_are_ordered_by_earliest_evaluation() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;

        let earlier = app.create_participant("Earlier").await;
        let later = app.create_participant("Later").await;
        app.submit_and_evaluate(competition_id, earlier, 0.75).await;
        app.submit_and_evaluate(competition_id, later, 0.75).await;

        let res = app.get(&routes::leaderboard(competition_id)).await;

        let entries = res.body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        // No shared ranks: the earlier evaluation takes the better one.
        assert_eq!(entries[0]["display_name"], "Earlier");
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[1]["display_name"], "Later");
        assert_eq!(entries[1]["rank"], 2);
    }

    #[tokio::test]
    async fn repeated_reads_return_the_same_order() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;

        for (name, score) in [("Ada", 0.6), ("Grace", 0.6), ("Edsger", 0.9)] {
            let participant_id = app.create_participant(name).await;
            app.submit_and_evaluate(competition_id, participant_id, score)
                .await;
        }

        let first = app.get(&routes::leaderboard(competition_id)).await;
        let second = app.get(&routes::leaderboard(competition_id)).await;

        assert_eq!(first.body["entries"], second.body["entries"]);
    }
}

mod leaderboard_contents {
    use super::*;

    #[tokio::test]
    async fn a_new_competition_has_an_empty_board() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;

        let res = app.get(&routes::leaderboard(competition_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["entries"].as_array().unwrap().len(), 0);
        assert!(res.body["generated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn pending_submissions_are_invisible() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        app.create_submission(competition_id, participant_id).await;

        let res = app.get(&routes::leaderboard(competition_id)).await;

        assert_eq!(res.body["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn entries_carry_the_best_submission_details() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("Spam Filter", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;
        let submission_id = app
            .submit_and_evaluate(competition_id, participant_id, 0.85)
            .await;

        let res = app.get(&routes::leaderboard(competition_id)).await;

        let entry = &res.body["entries"][0];
        assert_eq!(entry["participant_id"], participant_id.to_string());
        assert_eq!(entry["display_name"], "Ada");
        assert_eq!(entry["best_submission_id"], submission_id.to_string());
        assert_eq!(entry["best_score"], 0.85);
        assert!(entry["best_evaluated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn returns_404_for_unknown_competition() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::leaderboard(Uuid::new_v4())).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn boards_are_scoped_per_competition() {
        let app = TestApp::spawn().await;
        let first = app.create_competition("First", "Maximize").await;
        let second = app.create_competition("Second", "Maximize").await;
        let participant_id = app.create_participant("Ada").await;

        app.submit_and_evaluate(first, participant_id, 0.9).await;

        let res = app.get(&routes::leaderboard(second)).await;

        assert_eq!(res.body["entries"].as_array().unwrap().len(), 0);
    }
}
