use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::{TodoError, TodoPort};
use crate::external_connections::{ExternalConnectivity, Transactable, TransactionHandle};
use crate::persistence::db_todo_driven_ports::{DbTodoReader, DbTodoWriter};
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, Query, TodoErrorResponse,
    ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::response::ErrorResponse;
use axum::routing::post;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(create_todo, read_todos, update_todo, delete_todos))]
/// Defines the OpenAPI documentation for the TODO API
pub struct TodoApi;
/// Constant used to group TODO endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "TODOs";

/// Creates a router for the "/todos" endpoint. Every operation shares the one path and is
/// told apart by HTTP method.
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new().route(
        "/",
        post(
            |State(app_state): AppState, Json(new_todo): Json<dto::NewTodo>| async move {
                let todo_service = domain::todo::TodoService {};

                create_todo(
                    new_todo,
                    &app_state.ext_cxn,
                    &todo_service,
                    &DbTodoReader,
                    &DbTodoWriter,
                )
                .await
            },
        )
        .get(
            |State(app_state): AppState, Query(page): Query<dto::ReadTodosQuery>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                read_todos(page, &mut ext_cxn, &todo_service, &DbTodoReader).await
            },
        )
        .put(
            |State(app_state): AppState, Json(update): Json<dto::UpdateTodo>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                update_todo(
                    update,
                    &mut ext_cxn,
                    &todo_service,
                    &DbTodoReader,
                    &DbTodoWriter,
                )
                .await
            },
        )
        .delete(
            |State(app_state): AppState, Json(to_delete): Json<dto::DeleteTodos>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                delete_todos(to_delete, &mut ext_cxn, &todo_service, &DbTodoWriter).await
            },
        ),
    )
}

#[utoipa::path(
    post,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::NewTodo,
    responses(
        (status = 200, description = "TODO was created", body = dto::TodoResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a TODO. The insert and the read that fetches the stored row share a transaction.
async fn create_todo(
    new_todo: dto::NewTodo,
    ext_cxn: &impl Transactable,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<Json<dto::TodoResponse>, ErrorResponse> {
    info!("Creating TODO {new_todo}");
    new_todo
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let content = domain::todo::TodoContent::from(new_todo);
    let mut txn = ext_cxn
        .start_transaction()
        .await
        .map_err(GenericErrorResponse)?;

    let created_todo = todo_service
        .create_todo(&content, &mut txn, todo_read, todo_write)
        .await
        .map_err(TodoErrorResponse)?;
    txn.commit().await.map_err(GenericErrorResponse)?;

    Ok(Json(dto::TodoResponse {
        todo: created_todo.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/todos",
    tag = TODO_API_GROUP,
    params(dto::ReadTodosQuery),
    responses(
        (status = 200, description = "A page of TODOs, newest first", body = dto::TodosResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Reads a page of TODOs
async fn read_todos(
    page: dto::ReadTodosQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
) -> Result<Json<dto::TodosResponse>, ErrorResponse> {
    info!("Reading up to {} TODOs before ID {}", page.size, page.prev_id);

    let todos = todo_service
        .read_todos(page.prev_id, page.size, &mut *ext_cxn, todo_read)
        .await
        .map_err(TodoErrorResponse)?;

    Ok(Json(dto::TodosResponse {
        todos: todos.into_iter().map(dto::Todo::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::UpdateTodo,
    responses(
        (status = 200, description = "TODO was updated", body = dto::TodoResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Overwrites the subject and description of a TODO
async fn update_todo(
    update: dto::UpdateTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<Json<dto::TodoResponse>, ErrorResponse> {
    info!("Updating TODO {}", update.id);
    update.validate().map_err(ValidationErrorResponse::from)?;

    let (todo_id, content) = update.into_parts();
    let update_result = todo_service
        .update_todo(todo_id, &content, &mut *ext_cxn, todo_read, todo_write)
        .await;
    match update_result {
        Ok(todo) => Ok(Json(dto::TodoResponse { todo: todo.into() })),
        Err(err) => {
            if let TodoError::NotFound { .. } = err {
                info!("Could not update: {err}");
            }
            Err(TodoErrorResponse(err).into())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/todos",
    tag = TODO_API_GROUP,
    request_body = dto::DeleteTodos,
    responses(
        (status = 200, description = "At least one of the TODOs was deleted", body = dto::DeletedTodos),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a batch of TODOs. Succeeds when any of the requested IDs existed.
async fn delete_todos(
    to_delete: dto::DeleteTodos,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
) -> Result<Json<dto::DeletedTodos>, ErrorResponse> {
    info!("Deleting TODOs {:?}", to_delete.ids);
    to_delete
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let delete_result = todo_service
        .delete_todos(&to_delete.ids, &mut *ext_cxn, todo_write)
        .await;
    match delete_result {
        Ok(()) => Ok(Json(dto::DeletedTodos {})),
        Err(err) => {
            if let TodoError::NotFound { .. } = err {
                info!("Could not delete: {err}");
            }
            Err(TodoErrorResponse(err).into())
        }
    }
}
