//! User repository for Postmask.

use rusqlite::{params, OptionalExtension, Row};

use super::user::{NewUser, Plan, User, UserUpdate};
use super::Database;
use crate::{PostmaskError, Result};

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub fn create(&self, new_user: &NewUser) -> Result<User> {
        self.db.conn().execute(
            "INSERT INTO users (email, name, plan) VALUES (?, ?, ?)",
            params![new_user.email, new_user.name, new_user.plan.as_str()],
        )?;

        let id = self.db.conn().last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .db
            .conn()
            .query_row(
                "SELECT id, email, name, plan, is_active, created_at
                 FROM users WHERE id = ?",
                [id],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email address (case-insensitive exact match).
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .db
            .conn()
            .query_row(
                "SELECT id, email, name, plan, is_active, created_at
                 FROM users WHERE email = ? COLLATE NOCASE",
                [email],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get all users whose id is in the given set.
    ///
    /// Used to resolve collaborator display identities in one query.
    pub fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, email, name, plan, is_active, created_at
             FROM users WHERE id IN ({placeholders})"
        );

        let mut stmt = self.db.conn().prepare(&sql)?;
        let users: Vec<User> = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id);
        }

        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = update.name {
            sets.push("name = ?");
            values.push(Box::new(name.clone()));
        }
        if let Some(plan) = update.plan {
            sets.push("plan = ?");
            values.push(Box::new(plan.as_str().to_string()));
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ?");
            values.push(Box::new(is_active as i32));
        }

        values.push(Box::new(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = self.db.conn().execute(&sql, params.as_slice())?;

        if rows == 0 {
            return Ok(None);
        }
        self.get_by_id(id)
    }

    /// Map a database row to a User.
    fn map_row(row: &Row) -> rusqlite::Result<User> {
        let plan_str: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            plan: plan_str.parse::<Plan>().unwrap_or_default(),
            is_active: row.get::<_, i32>(4)? != 0,
            created_at: row.get(5)?,
        })
    }
}
