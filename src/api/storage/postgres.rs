//! PostgreSQL storage backend.
//!
//! Solutions live in their own table, so appends and removals are row
//! operations and never rewrite the owning aggregate. The `votes` and
//! `views` counters are incremented in-database (`SET votes = votes + 1`),
//! which is what makes concurrent upvotes safe.

use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::error::ProblemError;
use super::traits::{ProblemStore, SolutionCounts};
use crate::models::{
    Difficulty, ImageDescriptor, Problem, ProblemStatus, SolutionRecord, User, WorkspaceGraph,
};

/// PostgreSQL-backed [`ProblemStore`].
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, ProblemError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| ProblemError::Upstream(format!("failed to connect: {e}")))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ProblemError::Upstream(format!("migration failed: {e}")))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn solutions_for(&self, problem_id: Uuid) -> Result<Vec<SolutionRecord>, ProblemError> {
        let rows = sqlx::query(
            r#"
            SELECT id, submitted_by, workspace, written_solution, votes, is_approved, submitted_at
            FROM solutions
            WHERE problem_id = $1
            ORDER BY seq
            "#,
        )
        .bind(problem_id)
        .fetch_all(&self.pool)
        .await
        .map_err(upstream)?;

        rows.iter().map(solution_from_row).collect()
    }
}

fn upstream(e: sqlx::Error) -> ProblemError {
    ProblemError::Upstream(e.to_string())
}

fn corrupt(e: serde_json::Error) -> ProblemError {
    ProblemError::Upstream(format!("corrupt stored document: {e}"))
}

fn solution_from_row(row: &PgRow) -> Result<SolutionRecord, ProblemError> {
    let workspace: Option<serde_json::Value> = row.try_get("workspace").map_err(upstream)?;
    let solution_workspace: Option<WorkspaceGraph> = workspace
        .map(serde_json::from_value)
        .transpose()
        .map_err(corrupt)?;

    Ok(SolutionRecord {
        id: row.try_get("id").map_err(upstream)?,
        submitted_by: row.try_get("submitted_by").map_err(upstream)?,
        solution_workspace,
        written_solution: row.try_get("written_solution").map_err(upstream)?,
        votes: row.try_get("votes").map_err(upstream)?,
        is_approved: row.try_get("is_approved").map_err(upstream)?,
        submitted_at: row.try_get("submitted_at").map_err(upstream)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, ProblemError> {
    Ok(User {
        id: row.try_get("id").map_err(upstream)?,
        name: row.try_get("name").map_err(upstream)?,
        email: row.try_get("email").map_err(upstream)?,
        password_hash: row.try_get("password_hash").map_err(upstream)?,
        occupation: row.try_get("occupation").map_err(upstream)?,
        dob: row.try_get("dob").map_err(upstream)?,
        created_at: row.try_get("created_at").map_err(upstream)?,
    })
}

/// Build a problem aggregate from its row; solutions are attached separately.
fn problem_from_row(row: &PgRow) -> Result<Problem, ProblemError> {
    let difficulty: String = row.try_get("difficulty").map_err(upstream)?;
    let difficulty = Difficulty::parse(&difficulty)
        .ok_or_else(|| ProblemError::Upstream(format!("corrupt difficulty '{difficulty}'")))?;

    let status: String = row.try_get("status").map_err(upstream)?;
    let status = ProblemStatus::parse(&status)
        .ok_or_else(|| ProblemError::Upstream(format!("corrupt status '{status}'")))?;

    let images: serde_json::Value = row.try_get("images").map_err(upstream)?;
    let images: Vec<ImageDescriptor> = serde_json::from_value(images).map_err(corrupt)?;

    let best: Option<serde_json::Value> = row.try_get("best_solution").map_err(upstream)?;
    let best_solution: Option<SolutionRecord> =
        best.map(serde_json::from_value).transpose().map_err(corrupt)?;

    Ok(Problem {
        id: row.try_get("id").map_err(upstream)?,
        public_id: row.try_get("public_id").map_err(upstream)?,
        title: row.try_get("title").map_err(upstream)?,
        description: row.try_get("description").map_err(upstream)?,
        difficulty,
        hints: row.try_get("hints").map_err(upstream)?,
        tags: row.try_get("tags").map_err(upstream)?,
        images,
        best_solution,
        user_solutions: Vec::new(),
        created_by: row.try_get("created_by").map_err(upstream)?,
        status,
        views: row.try_get("views").map_err(upstream)?,
        likes: row.try_get("likes").map_err(upstream)?,
        reviewed: row.try_get("reviewed").map_err(upstream)?,
        created_at: row.try_get("created_at").map_err(upstream)?,
        updated_at: row.try_get("updated_at").map_err(upstream)?,
    })
}

const PROBLEM_COLUMNS: &str = "id, public_id, title, description, difficulty, hints, tags, \
     images, best_solution, created_by, status, views, likes, reviewed, created_at, updated_at";

#[async_trait::async_trait]
impl ProblemStore for PostgresStore {
    async fn insert_user(&self, user: User) -> Result<User, ProblemError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, occupation, dob, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.occupation)
        .bind(user.dob)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(ProblemError::invalid("email", "already registered"))
            }
            Err(e) => Err(upstream(e)),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ProblemError> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, occupation, dob, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, ProblemError> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, occupation, dob, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_problem(&self, problem: &Problem) -> Result<(), ProblemError> {
        let images = serde_json::to_value(&problem.images).map_err(corrupt)?;
        let best = problem
            .best_solution
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(corrupt)?;

        sqlx::query(
            r#"
            INSERT INTO problems
                (id, public_id, title, description, difficulty, hints, tags, images,
                 best_solution, created_by, status, views, likes, reviewed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(problem.id)
        .bind(&problem.public_id)
        .bind(&problem.title)
        .bind(&problem.description)
        .bind(problem.difficulty.to_string())
        .bind(&problem.hints)
        .bind(&problem.tags)
        .bind(images)
        .bind(best)
        .bind(problem.created_by)
        .bind(problem.status.to_string())
        .bind(problem.views)
        .bind(problem.likes)
        .bind(problem.reviewed)
        .bind(problem.created_at)
        .bind(problem.updated_at)
        .execute(&self.pool)
        .await
        .map_err(upstream)?;

        Ok(())
    }

    async fn fetch_problem(&self, public_id: &str) -> Result<Option<Problem>, ProblemError> {
        let row = sqlx::query(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems WHERE public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        let Some(row) = row else { return Ok(None) };
        let mut problem = problem_from_row(&row)?;
        problem.user_solutions = self.solutions_for(problem.id).await?;
        Ok(Some(problem))
    }

    async fn fetch_problem_counting_view(
        &self,
        public_id: &str,
    ) -> Result<Option<Problem>, ProblemError> {
        let row = sqlx::query(&format!(
            "UPDATE problems SET views = views + 1 WHERE public_id = $1 RETURNING {PROBLEM_COLUMNS}"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        let Some(row) = row else { return Ok(None) };
        let mut problem = problem_from_row(&row)?;
        problem.user_solutions = self.solutions_for(problem.id).await?;
        Ok(Some(problem))
    }

    async fn list_problems(&self) -> Result<Vec<Problem>, ProblemError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(upstream)?;

        let mut problems: Vec<Problem> = rows
            .iter()
            .map(problem_from_row)
            .collect::<Result<_, _>>()?;

        if problems.is_empty() {
            return Ok(problems);
        }

        let ids: Vec<Uuid> = problems.iter().map(|p| p.id).collect();
        let solution_rows = sqlx::query(
            r#"
            SELECT problem_id, id, submitted_by, workspace, written_solution,
                   votes, is_approved, submitted_at
            FROM solutions
            WHERE problem_id = ANY($1)
            ORDER BY seq
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(upstream)?;

        let mut grouped: HashMap<Uuid, Vec<SolutionRecord>> = HashMap::new();
        for row in &solution_rows {
            let problem_id: Uuid = row.try_get("problem_id").map_err(upstream)?;
            grouped
                .entry(problem_id)
                .or_default()
                .push(solution_from_row(row)?);
        }
        for problem in &mut problems {
            if let Some(solutions) = grouped.remove(&problem.id) {
                problem.user_solutions = solutions;
            }
        }

        Ok(problems)
    }

    async fn append_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<SolutionCounts, ProblemError> {
        let workspace = record
            .solution_workspace
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(corrupt)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO solutions
                (id, problem_id, submitted_by, workspace, written_solution,
                 votes, is_approved, submitted_at)
            SELECT $2, p.id, $3, $4, $5, $6, $7, $8
            FROM problems p
            WHERE p.public_id = $1
            "#,
        )
        .bind(public_id)
        .bind(record.id)
        .bind(record.submitted_by)
        .bind(workspace)
        .bind(&record.written_solution)
        .bind(record.votes)
        .bind(record.is_approved)
        .bind(record.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(upstream)?;

        if inserted.rows_affected() == 0 {
            return Err(ProblemError::not_found("problem", public_id));
        }

        let row = sqlx::query(
            r#"
            SELECT count(*) AS total,
                   count(*) FILTER (WHERE s.submitted_by = $2) AS by_user
            FROM solutions s
            JOIN problems p ON s.problem_id = p.id
            WHERE p.public_id = $1
            "#,
        )
        .bind(public_id)
        .bind(record.submitted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(upstream)?;

        let total: i64 = row.try_get("total").map_err(upstream)?;
        let by_user: i64 = row.try_get("by_user").map_err(upstream)?;
        Ok(SolutionCounts {
            total: total as usize,
            by_user: by_user as usize,
        })
    }

    async fn get_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<SolutionRecord>, ProblemError> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.submitted_by, s.workspace, s.written_solution,
                   s.votes, s.is_approved, s.submitted_at
            FROM solutions s
            JOIN problems p ON s.problem_id = p.id
            WHERE p.public_id = $1 AND s.id = $2
            "#,
        )
        .bind(public_id)
        .bind(solution_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        row.as_ref().map(solution_from_row).transpose()
    }

    async fn update_solution_content(
        &self,
        public_id: &str,
        solution_id: Uuid,
        workspace: Option<&WorkspaceGraph>,
        written: Option<&str>,
    ) -> Result<bool, ProblemError> {
        let workspace = workspace
            .map(serde_json::to_value)
            .transpose()
            .map_err(corrupt)?;

        let updated = sqlx::query(
            r#"
            UPDATE solutions s
            SET workspace = COALESCE($3::jsonb, s.workspace),
                written_solution = COALESCE($4::text, s.written_solution)
            FROM problems p
            WHERE s.problem_id = p.id AND p.public_id = $1 AND s.id = $2
            "#,
        )
        .bind(public_id)
        .bind(solution_id)
        .bind(workspace)
        .bind(written)
        .execute(&self.pool)
        .await
        .map_err(upstream)?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE problems SET updated_at = now() WHERE public_id = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(upstream)?;

        Ok(true)
    }

    async fn remove_solution(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<usize>, ProblemError> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM solutions s
            USING problems p
            WHERE s.problem_id = p.id AND p.public_id = $1 AND s.id = $2
            "#,
        )
        .bind(public_id)
        .bind(solution_id)
        .execute(&self.pool)
        .await
        .map_err(upstream)?;

        if deleted.rows_affected() == 0 {
            return Ok(None);
        }

        let remaining: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM solutions s
            JOIN problems p ON s.problem_id = p.id
            WHERE p.public_id = $1
            "#,
        )
        .bind(public_id)
        .fetch_one(&self.pool)
        .await
        .map_err(upstream)?;

        Ok(Some(remaining as usize))
    }

    async fn increment_votes(
        &self,
        public_id: &str,
        solution_id: Uuid,
    ) -> Result<Option<i64>, ProblemError> {
        let votes: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE solutions s
            SET votes = s.votes + 1
            FROM problems p
            WHERE s.problem_id = p.id AND p.public_id = $1 AND s.id = $2
            RETURNING s.votes
            "#,
        )
        .bind(public_id)
        .bind(solution_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(upstream)?;

        Ok(votes)
    }

    async fn set_best_solution(
        &self,
        public_id: &str,
        record: &SolutionRecord,
    ) -> Result<(), ProblemError> {
        let best = serde_json::to_value(record).map_err(corrupt)?;

        let updated = sqlx::query(
            "UPDATE problems SET best_solution = $2, updated_at = now() WHERE public_id = $1",
        )
        .bind(public_id)
        .bind(best)
        .execute(&self.pool)
        .await
        .map_err(upstream)?;

        if updated.rows_affected() == 0 {
            return Err(ProblemError::not_found("problem", public_id));
        }
        Ok(())
    }
}
