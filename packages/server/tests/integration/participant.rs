use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes};

mod participant_creation {
    use super::*;

    #[tokio::test]
    async fn creates_a_participant() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::PARTICIPANTS, &json!({ "display_name": "Ada" }))
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["display_name"], "Ada");
        assert!(res.body["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn rejects_blank_display_name() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::PARTICIPANTS, &json!({ "display_name": "  " }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod participant_retrieval {
    use super::*;

    #[tokio::test]
    async fn fetches_a_participant_by_id() {
        let app = TestApp::spawn().await;
        let id = app.create_participant("Grace").await;

        let res = app.get(&routes::participant(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id.to_string());
        assert_eq!(res.body["display_name"], "Grace");
    }

    #[tokio::test]
    async fn returns_404_for_unknown_participant() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::participant(Uuid::new_v4())).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn list_returns_paginated_results() {
        let app = TestApp::spawn().await;
        for i in 0..3 {
            app.create_participant(&format!("Participant {i}")).await;
        }

        let res = app
            .get(&format!("{}?per_page=2", routes::PARTICIPANTS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 3);
    }
}
