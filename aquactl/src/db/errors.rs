use std::fmt;
use thiserror::Error;

/// Where a Postgres constraint failed.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: Option<String>,
    pub table: Option<String>,
    pub detail: String,
}

impl Constraint {
    fn of(err: &dyn sqlx::error::DatabaseError) -> Self {
        Self {
            name: err.constraint().map(str::to_owned),
            table: err.table().map(str::to_owned),
            detail: err.message().to_owned(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.table, &self.name) {
            (Some(table), Some(name)) => write!(f, "{table}.{name}"),
            (None, Some(name)) => f.write_str(name),
            _ => f.write_str(&self.detail),
        }
    }
}

/// Errors from the repositories, with constraint failures split out so handlers can answer with a
/// client error instead of a 500.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate value violates {0}")]
    UniqueViolation(Constraint),

    #[error("Missing referenced row for {0}")]
    ForeignKeyViolation(Constraint),

    #[error("Value rejected by {0}")]
    CheckViolation(Constraint),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return match err {
                sqlx::Error::RowNotFound => DbError::NotFound,
                other => DbError::Other(other.into()),
            };
        };

        if db_err.is_unique_violation() {
            DbError::UniqueViolation(Constraint::of(&**db_err))
        } else if db_err.is_foreign_key_violation() {
            DbError::ForeignKeyViolation(Constraint::of(&**db_err))
        } else if db_err.is_check_violation() {
            DbError::CheckViolation(Constraint::of(&**db_err))
        } else {
            DbError::Other(err.into())
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
