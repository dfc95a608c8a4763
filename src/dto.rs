use crate::routing_utils::BasicErrorResponse;
use utoipa::OpenApi;

pub mod todo;

pub use todo::*;

/// Collects the DTO schemas and shared responses so they can be merged into the API documentation
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            todo::Todo,
            todo::NewTodo,
            todo::UpdateTodo,
            todo::DeleteTodos,
            todo::TodoResponse,
            todo::TodosResponse,
            todo::DeletedTodos,
        ),
        responses(BasicErrorResponse),
    )
)]
pub struct OpenApiSchemas;
