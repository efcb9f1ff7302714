use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::Row;

use agentspec_core::domain::specification::{
    AgentSpecification, AgentSpecificationPatch, NewAgentSpecification, SpecificationId,
};

use super::{AgentSpecificationRepository, RepositoryError};
use crate::DbPool;

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, goal, instructions, tools, created_at, updated_at
     FROM agent_specification";

pub struct SqlAgentSpecificationRepository {
    pool: DbPool,
}

impl SqlAgentSpecificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Current time at the precision the table stores, so returned records
/// compare equal to what a later read decodes.
pub(crate) fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

fn encode_tools(tools: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(tools).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_specification(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<AgentSpecification, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let goal: String = row.try_get("goal").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let instructions: String =
        row.try_get("instructions").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let tools_json: String =
        row.try_get("tools").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_str: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let tools: Vec<String> = serde_json::from_str(&tools_json)
        .map_err(|e| RepositoryError::Decode(format!("tools: {e}")))?;

    Ok(AgentSpecification {
        id: SpecificationId(id),
        name,
        description,
        goal,
        instructions,
        tools,
        created_at: decode_timestamp("created_at", &created_at_str)?,
        updated_at: decode_timestamp("updated_at", &updated_at_str)?,
    })
}

#[async_trait::async_trait]
impl AgentSpecificationRepository for SqlAgentSpecificationRepository {
    async fn create(
        &self,
        specification: NewAgentSpecification,
    ) -> Result<AgentSpecification, RepositoryError> {
        let now = storage_now();
        let tools_json = encode_tools(&specification.tools)?;

        let result = sqlx::query(
            "INSERT INTO agent_specification
                 (name, description, goal, instructions, tools, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&specification.name)
        .bind(&specification.description)
        .bind(&specification.goal)
        .bind(&specification.instructions)
        .bind(&tools_json)
        .bind(encode_timestamp(&now))
        .bind(encode_timestamp(&now))
        .execute(&self.pool)
        .await?;

        Ok(AgentSpecification {
            id: SpecificationId(result.last_insert_rowid()),
            name: specification.name,
            description: specification.description,
            goal: specification.goal,
            instructions: specification.instructions,
            tools: specification.tools,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(
        &self,
        id: SpecificationId,
    ) -> Result<Option<AgentSpecification>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_specification(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<AgentSpecification>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"))
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_specification).collect::<Result<Vec<_>, _>>()
    }

    async fn update(
        &self,
        id: SpecificationId,
        patch: AgentSpecificationPatch,
    ) -> Result<Option<AgentSpecification>, RepositoryError> {
        if patch.is_empty() {
            return Ok(None);
        }

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut specification = row_to_specification(&row)?;
        specification.apply(patch);
        specification.updated_at = storage_now();

        sqlx::query(
            "UPDATE agent_specification
             SET name = ?, description = ?, goal = ?, instructions = ?, tools = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&specification.name)
        .bind(&specification.description)
        .bind(&specification.goal)
        .bind(&specification.instructions)
        .bind(encode_tools(&specification.tools)?)
        .bind(encode_timestamp(&specification.updated_at))
        .bind(id.0)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Some(specification))
    }

    async fn delete(&self, id: SpecificationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM agent_specification WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
