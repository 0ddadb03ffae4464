//! SQLite-backed store.
//!
//! Uses a sqlx `SqlitePool` with foreign keys enforced. The schema is
//! created on connect. Reference checks and inserts share one transaction.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use match_core::{
    Cohort, CohortId, HeadCount, NewCohort, NewProgramme, NewTag, NewUser, Profile, Programme,
    ProgrammeId, Tag, TagId, User, UserId,
};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::{Store, StoreConfig, StoreError};

const SCHEMA: [(&str, &str); 5] = [
    (
        "users",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            password_hash TEXT NOT NULL
        )",
    ),
    (
        "profiles",
        r"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            position TEXT NOT NULL,
            department TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            join_date TEXT NOT NULL,
            bio TEXT NOT NULL DEFAULT ''
        )",
    ),
    (
        "programmes",
        r"
        CREATE TABLE IF NOT EXISTS programmes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            default_cohort_size INTEGER NOT NULL CHECK (default_cohort_size >= 1),
            created_by INTEGER NOT NULL REFERENCES users(id)
        )",
    ),
    (
        "cohorts",
        r"
        CREATE TABLE IF NOT EXISTS cohorts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            programme_id INTEGER NOT NULL REFERENCES programmes(id),
            cohort_size INTEGER NOT NULL CHECK (cohort_size >= 1),
            created_by INTEGER NOT NULL REFERENCES users(id),
            open_date TEXT NOT NULL
        )",
    ),
    (
        "tags",
        r"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
    ),
];

const SELECT_USERS: &str = r"
    SELECT u.id, u.email, u.first_name, u.last_name, u.password_hash,
           p.position, p.department, p.date_of_birth, p.join_date, p.bio
    FROM users u
    JOIN profiles p ON p.user_id = u.id";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    position: String,
    department: String,
    date_of_birth: NaiveDate,
    join_date: NaiveDate,
    bio: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let profile = Profile::new(
            row.position,
            row.department,
            row.date_of_birth,
            row.join_date,
            row.bio,
        );
        NewUser::new(row.email, row.first_name, row.last_name, row.password_hash, profile)
            .into_user(UserId::new(row.id))
    }
}

#[derive(Debug, FromRow)]
struct ProgrammeRow {
    id: i64,
    name: String,
    description: String,
    default_cohort_size: i64,
    created_by: i64,
}

impl TryFrom<ProgrammeRow> for Programme {
    type Error = StoreError;

    fn try_from(row: ProgrammeRow) -> Result<Self, Self::Error> {
        let size = HeadCount::new(row.default_cohort_size)?;
        Ok(NewProgramme::new(row.name, row.description, size, UserId::new(row.created_by))
            .into_programme(ProgrammeId::new(row.id)))
    }
}

#[derive(Debug, FromRow)]
struct CohortRow {
    id: i64,
    programme_id: i64,
    cohort_size: i64,
    created_by: i64,
    open_date: DateTime<Utc>,
}

impl TryFrom<CohortRow> for Cohort {
    type Error = StoreError;

    fn try_from(row: CohortRow) -> Result<Self, Self::Error> {
        let size = HeadCount::new(row.cohort_size)?;
        Ok(NewCohort::new(
            ProgrammeId::new(row.programme_id),
            size,
            UserId::new(row.created_by),
            row.open_date,
        )
        .into_cohort(CohortId::new(row.id)))
    }
}

#[derive(Debug, FromRow)]
struct TagRow {
    id: i64,
    name: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        NewTag::new(row.name).into_tag(TagId::new(row.id))
    }
}

/// [`Store`] over a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database and ensure the schema exists.
    ///
    /// In-memory databases get a single connection that is never recycled,
    /// since each new connection would see an empty database.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] if the URL is invalid, the database
    /// cannot be opened, or schema creation fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.is_sqlite_in_memory() {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create every table that does not exist yet.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] if a statement fails.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        for (table, ddl) in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await.map_err(|e| {
                tracing::error!(table, error = %e, "failed to create table");
                StoreError::Database(e)
            })?;
        }
        info!("database migrations complete");
        Ok(())
    }
}

async fn require_row(
    tx: &mut Transaction<'_, Sqlite>,
    table: &'static str,
    resource: &'static str,
    field: &'static str,
    id: i64,
) -> Result<(), StoreError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    let (exists,): (i64,) = sqlx::query_as(&sql).bind(id).fetch_one(&mut **tx).await?;
    if exists != 0 {
        Ok(())
    } else {
        Err(StoreError::MissingReference { field, resource, id })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(db.kind(), ErrorKind::UniqueViolation),
        _ => false,
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (email, first_name, last_name, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .execute(&mut *tx)
        .await;

        let id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Conflict {
                    resource: "user",
                    field: "email",
                    value: user.email,
                });
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query(
            r"
            INSERT INTO profiles (user_id, position, department, date_of_birth, join_date, bio)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(&user.profile.position)
        .bind(&user.profile.department)
        .bind(user.profile.date_of_birth)
        .bind(user.profile.join_date)
        .bind(&user.profile.bio)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user.into_user(UserId::new(id)))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USERS} WHERE u.id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USERS} WHERE u.email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USERS} ORDER BY u.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn insert_programme(&self, programme: NewProgramme) -> Result<Programme, StoreError> {
        let mut tx = self.pool.begin().await?;
        require_row(&mut tx, "users", "user", "createdBy", programme.created_by.get()).await?;

        let id = sqlx::query(
            r"
            INSERT INTO programmes (name, description, default_cohort_size, created_by)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(&programme.name)
        .bind(&programme.description)
        .bind(i64::from(programme.default_cohort_size))
        .bind(programme.created_by.get())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(programme.into_programme(ProgrammeId::new(id)))
    }

    async fn get_programme(&self, id: ProgrammeId) -> Result<Option<Programme>, StoreError> {
        let row: Option<ProgrammeRow> = sqlx::query_as(
            "SELECT id, name, description, default_cohort_size, created_by FROM programmes WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Programme::try_from).transpose()
    }

    async fn list_programmes(&self) -> Result<Vec<Programme>, StoreError> {
        let rows: Vec<ProgrammeRow> = sqlx::query_as(
            "SELECT id, name, description, default_cohort_size, created_by FROM programmes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Programme::try_from).collect()
    }

    async fn insert_cohort(&self, cohort: NewCohort) -> Result<Cohort, StoreError> {
        let mut tx = self.pool.begin().await?;
        require_row(&mut tx, "programmes", "programme", "programme", cohort.programme.get())
            .await?;
        require_row(&mut tx, "users", "user", "createdBy", cohort.created_by.get()).await?;

        let id = sqlx::query(
            r"
            INSERT INTO cohorts (programme_id, cohort_size, created_by, open_date)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(cohort.programme.get())
        .bind(i64::from(cohort.cohort_size))
        .bind(cohort.created_by.get())
        .bind(cohort.open_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(cohort.into_cohort(CohortId::new(id)))
    }

    async fn get_cohort(&self, id: CohortId) -> Result<Option<Cohort>, StoreError> {
        let row: Option<CohortRow> = sqlx::query_as(
            "SELECT id, programme_id, cohort_size, created_by, open_date FROM cohorts WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Cohort::try_from).transpose()
    }

    async fn list_cohorts(&self) -> Result<Vec<Cohort>, StoreError> {
        let rows: Vec<CohortRow> = sqlx::query_as(
            "SELECT id, programme_id, cohort_size, created_by, open_date FROM cohorts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Cohort::try_from).collect()
    }

    async fn insert_tag(&self, tag: NewTag) -> Result<Tag, StoreError> {
        let id = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(&tag.name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(tag.into_tag(TagId::new(id)))
    }

    async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        let row: Option<TagRow> = sqlx::query_as("SELECT id, name FROM tags WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tag::from))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
