use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Resource name reported in not-found errors for TODOs
pub const TODO_RESOURCE: &str = "TODO";
/// Largest page [TodoService] will hand back from a single read, regardless of the requested size
pub const MAX_PAGE_SIZE: i64 = 100;

/// A single task on the TODO list
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: i64,
    pub subject: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable part of a TODO, used both to create and to update one
#[derive(Debug)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct TodoContent {
    pub subject: String,
    pub description: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        /// Fetches one TODO. A missing row is `Ok(None)`, not an error.
        async fn todo_by_id(
            &self,
            todo_id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Fetches up to [limit] TODOs, newest first. When [cursor_id] is positive only TODOs
        /// with a smaller ID are returned. A non-positive [limit] yields no TODOs.
        async fn todo_page(
            &self,
            cursor_id: i64,
            limit: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
    }

    pub trait TodoWriter {
        /// Stores a new TODO and returns its generated ID
        async fn insert_todo(
            &self,
            content: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i64, anyhow::Error>;

        /// Overwrites a TODO's content and refreshes its update time. Returns the number of
        /// rows changed.
        async fn update_todo(
            &self,
            todo_id: i64,
            content: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Removes every TODO whose ID is in [todo_ids] and returns the number of rows removed
        async fn delete_todos(
            &self,
            todo_ids: &[i64],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TodoError {
        /// The targeted record doesn't exist. [id] is absent when a batch as a whole matched nothing.
        #[error("{}", describe_missing(.resource, .id))]
        NotFound {
            resource: &'static str,
            id: Option<i64>,
        },
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl TodoError {
        pub(super) fn todo_not_found(todo_id: i64) -> Self {
            Self::NotFound {
                resource: TODO_RESOURCE,
                id: Some(todo_id),
            }
        }
    }

    fn describe_missing(resource: &str, id: &Option<i64>) -> String {
        match id {
            Some(id) => format!("{resource} with ID {id} not found"),
            None => format!("none of the requested {resource}s were found"),
        }
    }


    pub trait TodoPort {
        async fn create_todo(
            &self,
            new_todo: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn read_todos(
            &self,
            prev_id: i64,
            size: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn update_todo(
            &self,
            todo_id: i64,
            update: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn delete_todos(
            &self,
            todo_ids: &[i64],
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn create_todo(
        &self,
        new_todo: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let new_id = todo_write
            .insert_todo(new_todo, &mut *ext_cxn)
            .await
            .context("creating a TODO")?;
        let created_todo = todo_read
            .todo_by_id(new_id, &mut *ext_cxn)
            .await
            .context("reading back a created TODO")?;

        created_todo.ok_or_else(|| {
            TodoError::PortError(anyhow!("TODO {new_id} was missing right after being created"))
        })
    }

    async fn read_todos(
        &self,
        prev_id: i64,
        size: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        if size <= 0 {
            return Ok(Vec::new());
        }

        let todos = todo_read
            .todo_page(prev_id, size.min(MAX_PAGE_SIZE), &mut *ext_cxn)
            .await
            .context("reading a page of TODOs")?;
        Ok(todos)
    }

    async fn update_todo(
        &self,
        todo_id: i64,
        update: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let rows_affected = todo_write
            .update_todo(todo_id, update, &mut *ext_cxn)
            .await
            .context("updating a TODO")?;
        if rows_affected == 0 {
            info!("TODO {todo_id} did not exist to be updated");
            return Err(TodoError::todo_not_found(todo_id));
        }

        let updated_todo = todo_read
            .todo_by_id(todo_id, &mut *ext_cxn)
            .await
            .context("reading back an updated TODO")?;

        // A concurrent delete can land between the update and this read
        updated_todo.ok_or_else(|| {
            warn!("TODO {todo_id} disappeared right after being updated");
            TodoError::todo_not_found(todo_id)
        })
    }

    async fn delete_todos(
        &self,
        todo_ids: &[i64],
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        if todo_ids.is_empty() {
            return Ok(());
        }

        let rows_affected = todo_write
            .delete_todos(todo_ids, &mut *ext_cxn)
            .await
            .context("deleting TODOs")?;
        if rows_affected == 0 {
            info!("None of the TODOs {todo_ids:?} existed to be deleted");
            return Err(TodoError::NotFound {
                resource: TODO_RESOURCE,
                id: None,
            });
        }

        Ok(())
    }
}
