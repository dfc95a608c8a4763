use super::test_util;
use crate::api::test_util::{ErrorBody, deserialize_body};
use crate::{SharedData, dto, persistence, routes};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_for(db: PgPool) -> Router {
    routes::build_router(Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db),
    }))
}

async fn send_json(router: &Router, method: Method, body: &impl Serialize) -> Response {
    let request = Request::builder()
        .method(method)
        .uri("/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(body).expect("request body should serialize"),
        ))
        .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn read_page(router: &Router, prev_id: i64, size: i64) -> Vec<dto::Todo> {
    let request = Request::builder()
        .uri(format!("/todos?prev_id={prev_id}&size={size}"))
        .body(Body::empty())
        .expect("request should build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(StatusCode::OK, response.status());

    deserialize_body::<dto::TodosResponse>(response.into_body())
        .await
        .todos
}

async fn create(router: &Router, subject: &str) -> dto::Todo {
    let response = send_json(
        router,
        Method::POST,
        &dto::NewTodo {
            subject: subject.to_owned(),
            description: format!("details for {subject}"),
        },
    )
    .await;
    assert_eq!(StatusCode::OK, response.status());

    deserialize_body::<dto::TodoResponse>(response.into_body())
        .await
        .todo
}

fn ids_of(todos: &[dto::Todo]) -> Vec<i64> {
    todos.iter().map(|todo| todo.id).collect()
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn todo_lifecycle() {
    test_util::prepare_db_and_test(|db| async move {
        let router = router_for(db);

        let created = create(&router, "buy milk").await;
        assert!(created.id > 0);
        assert_eq!("buy milk", created.subject);
        assert_eq!(created.created_at, created.updated_at);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let response = send_json(
            &router,
            Method::PUT,
            &dto::UpdateTodo {
                id: created.id,
                subject: "buy oat milk".to_owned(),
                description: String::new(),
            },
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated = deserialize_body::<dto::TodoResponse>(response.into_body())
            .await
            .todo;
        assert_eq!(created.id, updated.id);
        assert_eq!("buy oat milk", updated.subject);
        assert_eq!("", updated.description);
        assert_eq!(created.created_at, updated.created_at);
        assert!(updated.updated_at > created.updated_at);

        let response = send_json(
            &router,
            Method::DELETE,
            &dto::DeleteTodos {
                ids: vec![created.id],
            },
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        let body: serde_json::Value = deserialize_body(response.into_body()).await;
        assert_eq!(serde_json::json!({}), body);

        let response = send_json(
            &router,
            Method::PUT,
            &dto::UpdateTodo {
                id: created.id,
                subject: "gone".to_owned(),
                description: String::new(),
            },
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
        let body: ErrorBody = deserialize_body(response.into_body()).await;
        assert_eq!("not_found", body.error_code);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn pages_walk_backwards_from_newest() {
    test_util::prepare_db_and_test(|db| async move {
        let router = router_for(db);

        let first = create(&router, "first").await;
        let second = create(&router, "second").await;
        let third = create(&router, "third").await;

        let page = read_page(&router, 0, 2).await;
        assert_eq!(vec![third.id, second.id], ids_of(&page));
        assert_eq!(third, page[0]);

        let page = read_page(&router, second.id, 2).await;
        assert_eq!(vec![first.id], ids_of(&page));

        let page = read_page(&router, first.id, 2).await;
        assert!(page.is_empty());
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn bulk_delete_tolerates_partial_matches() {
    test_util::prepare_db_and_test(|db| async move {
        let router = router_for(db);

        let kept = create(&router, "kept").await;
        let doomed = create(&router, "doomed").await;

        let response = send_json(
            &router,
            Method::DELETE,
            &dto::DeleteTodos {
                ids: vec![doomed.id, doomed.id + 1000],
            },
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(vec![kept], read_page(&router, 0, 10).await);

        let response = send_json(
            &router,
            Method::DELETE,
            &dto::DeleteTodos {
                ids: vec![doomed.id],
            },
        )
        .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    });
}
