use crate::domain;
use crate::domain::todo::{Todo, TodoContent};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder, query, query_as, query_scalar};

pub struct DbTodoReader;

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    subject: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for domain::todo::Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            subject: value.subject,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn todo_by_id(
        &self,
        todo_id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = query_as::<_, TodoRow>(
            "SELECT id, subject, description, created_at, updated_at FROM todos WHERE id = $1",
        )
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo by ID")?
        .map(Todo::from);

        Ok(todo)
    }

    async fn todo_page(
        &self,
        cursor_id: i64,
        limit: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Todo>, Error> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let mut cxn = ext_cxn.database_cxn().await?;

        let page_query = if cursor_id > 0 {
            query_as::<_, TodoRow>(
                "SELECT id, subject, description, created_at, updated_at FROM todos WHERE id < $1 ORDER BY id DESC LIMIT $2",
            )
            .bind(cursor_id)
            .bind(limit)
        } else {
            query_as::<_, TodoRow>(
                "SELECT id, subject, description, created_at, updated_at FROM todos ORDER BY id DESC LIMIT $1",
            )
            .bind(limit)
        };

        let todos: Vec<Todo> = page_query
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch a page of todos")?
            .into_iter()
            .map(Todo::from)
            .collect();

        Ok(todos)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn insert_todo(
        &self,
        content: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id = query_scalar::<_, i64>(
            "INSERT INTO todos(subject, description) VALUES ($1, $2) RETURNING todos.id",
        )
        .bind(&content.subject)
        .bind(&content.description)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(new_id)
    }

    async fn update_todo(
        &self,
        todo_id: i64,
        content: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query(
            "UPDATE todos SET subject = $1, description = $2, updated_at = now() WHERE id = $3",
        )
        .bind(&content.subject)
        .bind(&content.description)
        .bind(todo_id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?;

        Ok(result.rows_affected())
    }

    async fn delete_todos(
        &self,
        todo_ids: &[i64],
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, Error> {
        // "IN ()" isn't valid SQL
        if todo_ids.is_empty() {
            return Ok(0);
        }
        let mut cxn = ext_cxn.database_cxn().await?;

        let mut delete_query = delete_todos_query(todo_ids);
        let result = delete_query
            .build()
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove todos from the database")?;

        Ok(result.rows_affected())
    }
}

/// Builds a DELETE with one bound placeholder per ID in its IN clause
fn delete_todos_query(todo_ids: &[i64]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("DELETE FROM todos WHERE id IN (");
    let mut separated = builder.separated(", ");
    for todo_id in todo_ids {
        separated.push_bind(*todo_id);
    }
    separated.push_unseparated(")");

    builder
}
