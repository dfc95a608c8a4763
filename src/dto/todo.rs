use crate::domain;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Page size used when a read doesn't ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Most IDs a single bulk delete accepts. Postgres caps a statement at 65535 bind parameters.
pub const MAX_DELETE_IDS: u64 = 65535;

/// DTO for a TODO returned on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq, Eq))]
pub struct Todo {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "buy milk")]
    pub subject: String,
    #[schema(example = "2%")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            subject: value.subject,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// DTO for creating a new TODO via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("\"{subject}\"")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "buy milk")]
    pub subject: String,
    #[serde(default)]
    #[schema(example = "")]
    pub description: String,
}

impl From<NewTodo> for domain::todo::TodoContent {
    fn from(value: NewTodo) -> Self {
        domain::todo::TodoContent {
            subject: value.subject,
            description: value.description,
        }
    }
}

/// DTO for overwriting an existing TODO's content via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    // Missing IDs deserialize to 0 and get rejected by validation rather than by the JSON parser.
    // Other IDs that can't exist are left for the service to report as not found.
    #[serde(default)]
    #[validate(custom = "validate_todo_id")]
    #[schema(example = 1)]
    pub id: i64,
    #[serde(default)]
    #[validate(length(min = 1))]
    #[schema(example = "buy milk")]
    pub subject: String,
    #[serde(default)]
    #[schema(example = "2%")]
    pub description: String,
}

fn validate_todo_id(todo_id: i64) -> Result<(), ValidationError> {
    if todo_id == 0 {
        return Err(ValidationError::new("required"));
    }

    Ok(())
}

impl UpdateTodo {
    /// Splits the update into the targeted ID and the new content
    pub fn into_parts(self) -> (i64, domain::todo::TodoContent) {
        (
            self.id,
            domain::todo::TodoContent {
                subject: self.subject,
                description: self.description,
            },
        )
    }
}

/// DTO for removing a batch of TODOs via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct DeleteTodos {
    #[serde(default)]
    #[validate(length(min = 1, max = "MAX_DELETE_IDS"))]
    #[schema(example = json!([1, 2, 3]))]
    pub ids: Vec<i64>,
}

/// Query parameters for paging through TODOs, newest first. A blank value is treated the same
/// as a missing one.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadTodosQuery {
    /// Only TODOs with an ID below this one are returned. 0 starts from the newest TODO.
    #[serde(default, deserialize_with = "prev_id_param")]
    #[param(example = 0)]
    pub prev_id: i64,
    /// Maximum number of TODOs to return
    #[serde(default = "default_page_size", deserialize_with = "page_size_param")]
    #[param(example = 10)]
    pub size: i64,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn prev_id_param<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    number_param_or(deserializer, 0)
}

fn page_size_param<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    number_param_or(deserializer, DEFAULT_PAGE_SIZE)
}

/// Parses a query string number, falling back to [default] when the value is blank
fn number_param_or<'de, D: Deserializer<'de>>(
    deserializer: D,
    default: i64,
) -> Result<i64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }

    raw.parse::<i64>()
        .map_err(|err| de::Error::custom(format!("{raw:?} is not a whole number: {err}")))
}

/// DTO wrapping a single TODO
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TodoResponse {
    pub todo: Todo,
}

/// DTO wrapping a page of TODOs
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}

/// Empty acknowledgement sent back after TODOs are deleted
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct DeletedTodos {}
