/// SQLite storage layer for studio entities
///
/// Row-oriented get/insert/link primitives over a shared connection pool.
/// Pool-scoped methods take `&self`; session-scoped variants take an explicit
/// connection (or transaction) so a caller can run a whole traversal or a
/// seeding pass on one session.

use crate::{
    datamodel::{
        Agent, LinkExtras, LinkOutcome, LinkType, Model, NewAgent, NewModel, NewSkill, NewTool,
        NewWorkflow, Skill, Tool, Workflow, WorkflowAgentLink, WorkflowType,
    },
    error::{StudioError, StudioResult},
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    FromRow, QueryBuilder, Sqlite, SqliteConnection,
};
use std::str::FromStr;

/// A table-backed row type that can be filtered and fetched generically
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Columns accepted in [`Filters`]
    const COLUMNS: &'static [&'static str];
}

impl Entity for Model {
    const TABLE: &'static str = "model";
    const COLUMNS: &'static [&'static str] = &[
        "id", "created_at", "updated_at", "user_id",
        "version", "model", "api_key", "base_url", "api_type", "api_version", "description",
    ];
}

impl Entity for Skill {
    const TABLE: &'static str = "skill";
    const COLUMNS: &'static [&'static str] = &[
        "id", "created_at", "updated_at", "user_id",
        "version", "name", "content", "description",
    ];
}

impl Entity for Tool {
    const TABLE: &'static str = "tool";
    const COLUMNS: &'static [&'static str] = &[
        "id", "created_at", "updated_at", "user_id",
        "name", "description", "method", "url", "auth_provider_id",
    ];
}

impl Entity for Agent {
    const TABLE: &'static str = "agent";
    const COLUMNS: &'static [&'static str] = &[
        "id", "created_at", "updated_at", "user_id",
        "version", "type", "task_instruction",
    ];
}

impl Entity for Workflow {
    const TABLE: &'static str = "workflow";
    const COLUMNS: &'static [&'static str] = &[
        "id", "created_at", "updated_at", "user_id",
        "version", "name", "description", "type", "summary_method",
    ];
}

impl Entity for WorkflowAgentLink {
    const TABLE: &'static str = "workflowagentlink";
    const COLUMNS: &'static [&'static str] = &["workflow_id", "agent_id", "agent_type", "sequence_id"];
}

/// Ordered equality filters over an entity's columns
///
/// `null` values match `IS NULL`. Column names are checked against
/// [`Entity::COLUMNS`] before any SQL is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<(String, Value)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.push((column.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build `SELECT * FROM <table> [WHERE ...] ORDER BY rowid`
fn select_query<E: Entity>(filters: &Filters) -> StudioResult<QueryBuilder<'static, Sqlite>> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));

    for (i, (column, value)) in filters.0.iter().enumerate() {
        if !E::COLUMNS.contains(&column.as_str()) {
            return Err(StudioError::InvalidFilter(format!(
                "'{}' is not a filterable column of {}",
                column,
                E::TABLE
            )));
        }
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(column.as_str());

        match value {
            Value::Null => {
                qb.push(" IS NULL");
            }
            Value::Bool(b) => {
                qb.push(" = ").push_bind(*b);
            }
            Value::Number(n) => {
                qb.push(" = ");
                match n.as_i64() {
                    Some(i) => qb.push_bind(i),
                    None => qb.push_bind(n.as_f64().unwrap_or_default()),
                };
            }
            Value::String(s) => {
                qb.push(" = ").push_bind(s.clone());
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(StudioError::InvalidFilter(format!(
                    "filter on '{}' must be a scalar value",
                    column
                )));
            }
        }
    }

    qb.push(" ORDER BY rowid");
    Ok(qb)
}

/// Parse a SQLite URI, creating the parent directory of file databases
pub fn sqlite_options(url: &str) -> StudioResult<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(options)
}

/// Storage manager shared by the seeder and the workflow assembler
#[derive(Debug, Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open a pooled connection to the database at `url`
    pub async fn connect(url: &str, max_connections: u32) -> StudioResult<Self> {
        tracing::info!("🗄️ Opening studio database pool: {}", url);
        let options = sqlite_options(url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Fetch rows of `E` matching `filters`
    pub async fn get<E: Entity>(&self, filters: &Filters) -> StudioResult<Vec<E>> {
        let mut qb = select_query::<E>(filters)?;
        let rows = qb.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Session-scoped variant of [`DatabaseManager::get`]
    pub async fn get_items<E: Entity>(
        conn: &mut SqliteConnection,
        filters: &Filters,
    ) -> StudioResult<Vec<E>> {
        let mut qb = select_query::<E>(filters)?;
        let rows = qb.build_query_as::<E>().fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    /// Fetch the `E` rows linked from `primary_id`, in link insertion order
    pub async fn get_linked<E: Entity>(
        conn: &mut SqliteConnection,
        link_type: LinkType,
        primary_id: i64,
    ) -> StudioResult<Vec<E>> {
        if link_type.secondary_table() != E::TABLE {
            return Err(StudioError::InvalidFilter(format!(
                "{} links do not point at {}",
                link_type,
                E::TABLE
            )));
        }
        let (primary_col, secondary_col) = link_type.columns();
        let sql = format!(
            "SELECT t.* FROM {} t JOIN {} l ON l.{} = t.id WHERE l.{} = ? ORDER BY l.rowid",
            E::TABLE,
            link_type.table(),
            secondary_col,
            primary_col
        );
        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(primary_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// Link two rows on a pooled connection
    pub async fn link(
        &self,
        link_type: LinkType,
        primary_id: i64,
        secondary_id: i64,
        extras: LinkExtras,
    ) -> StudioResult<LinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        Self::link_with(&mut conn, link_type, primary_id, secondary_id, extras).await
    }

    /// Link two rows on the given session
    ///
    /// Both ids must exist. Linking an already linked pair is a no-op.
    pub async fn link_with(
        conn: &mut SqliteConnection,
        link_type: LinkType,
        primary_id: i64,
        secondary_id: i64,
        extras: LinkExtras,
    ) -> StudioResult<LinkOutcome> {
        ensure_exists(conn, link_type.primary_table(), primary_id).await?;
        ensure_exists(conn, link_type.secondary_table(), secondary_id).await?;

        let (primary_col, secondary_col) = link_type.columns();

        let rows_affected = match link_type {
            LinkType::WorkflowAgent => {
                let agent_type = extras.agent_type.unwrap_or_default();
                let existing: Option<i64> = sqlx::query_scalar(
                    "SELECT sequence_id FROM workflowagentlink
                     WHERE workflow_id = ? AND agent_id = ? AND agent_type = ?
                     AND (? IS NULL OR sequence_id = ?)",
                )
                .bind(primary_id)
                .bind(secondary_id)
                .bind(agent_type)
                .bind(extras.sequence_id)
                .bind(extras.sequence_id)
                .fetch_optional(&mut *conn)
                .await?;
                if existing.is_some() {
                    0
                } else {
                    let sequence_id = match extras.sequence_id {
                        Some(sequence_id) => sequence_id,
                        None => next_sequence_id(conn, primary_id).await?,
                    };
                    sqlx::query(
                        "INSERT OR IGNORE INTO workflowagentlink (workflow_id, agent_id, agent_type, sequence_id)
                         VALUES (?, ?, ?, ?)",
                    )
                    .bind(primary_id)
                    .bind(secondary_id)
                    .bind(agent_type)
                    .bind(sequence_id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
                }
            }
            _ => {
                let sql = format!(
                    "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?, ?)",
                    link_type.table(),
                    primary_col,
                    secondary_col
                );
                sqlx::query(&sql)
                    .bind(primary_id)
                    .bind(secondary_id)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
        };

        if rows_affected == 0 {
            tracing::debug!("🔗 {} link {} -> {} already exists", link_type, primary_id, secondary_id);
            Ok(LinkOutcome::AlreadyLinked)
        } else {
            tracing::debug!("🔗 Linked {} {} -> {}", link_type, primary_id, secondary_id);
            Ok(LinkOutcome::Created)
        }
    }
}

async fn ensure_exists(conn: &mut SqliteConnection, table: &str, id: i64) -> StudioResult<()> {
    let sql = format!("SELECT id FROM {} WHERE id = ?", table);
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(StudioError::not_found(format!("{} id={}", table, id))),
    }
}

/// Next free sequence position of a sequential workflow (0 for other types)
async fn next_sequence_id(conn: &mut SqliteConnection, workflow_id: i64) -> StudioResult<i64> {
    let workflow_type: WorkflowType = sqlx::query_scalar("SELECT type FROM workflow WHERE id = ?")
        .bind(workflow_id)
        .fetch_one(&mut *conn)
        .await?;
    if workflow_type != WorkflowType::Sequential {
        return Ok(0);
    }
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sequence_id) + 1, 0) FROM workflowagentlink WHERE workflow_id = ?",
    )
    .bind(workflow_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(next)
}

/// Insert a draft row and return its new id
#[async_trait]
pub trait Insert {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64>;
}

#[async_trait]
impl Insert for NewModel {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO model (user_id, model, api_key, base_url, api_type, api_version, description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.user_id)
        .bind(&self.model)
        .bind(&self.api_key)
        .bind(&self.base_url)
        .bind(self.api_type)
        .bind(&self.api_version)
        .bind(&self.description)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl Insert for NewSkill {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64> {
        let libraries_json = serde_json::to_string(&self.libraries)?;
        let result = sqlx::query(
            r#"
            INSERT INTO skill (user_id, name, content, description, libraries)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.user_id)
        .bind(&self.name)
        .bind(&self.content)
        .bind(&self.description)
        .bind(&libraries_json)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl Insert for NewTool {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64> {
        let args_json = serde_json::to_string(&self.args_info)?;
        let result = sqlx::query(
            r#"
            INSERT INTO tool (user_id, name, description, method, url, args_info, auth_provider_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.user_id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(&self.method)
        .bind(&self.url)
        .bind(&args_json)
        .bind(&self.auth_provider_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl Insert for NewAgent {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64> {
        let config_json = serde_json::to_string(&self.config)?;
        let result = sqlx::query(
            r#"
            INSERT INTO agent (user_id, type, config, task_instruction)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&self.user_id)
        .bind(self.agent_type)
        .bind(&config_json)
        .bind(&self.task_instruction)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl Insert for NewWorkflow {
    async fn insert(&self, conn: &mut SqliteConnection) -> StudioResult<i64> {
        let tasks_json = serde_json::to_string(&self.sample_tasks)?;
        let result = sqlx::query(
            r#"
            INSERT INTO workflow (user_id, name, description, type, summary_method, sample_tasks)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.user_id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.workflow_type)
        .bind(self.summary_method)
        .bind(&tasks_json)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}
