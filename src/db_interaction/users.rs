use std::{error::Error, fmt::Debug};

use anyhow::Context;
use diesel::prelude::AsChangeset;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use thiserror::Error;

use crate::{
    models::{NewUser, User},
    schema::users,
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

#[tracing::instrument("Looking up user by email", skip(conn))]
pub async fn get_user_by_email(
    mut conn: DbConnection,
    email: String,
) -> Result<Option<User>, anyhow::Error> {
    let user = spawn_blocking_with_tracing(move || {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(&mut conn)
            .optional()
            .context("Failed to query user by email")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(user)
}

#[tracing::instrument("Looking up user by id", skip(conn))]
pub async fn get_user_by_id(
    mut conn: DbConnection,
    user_id: i32,
) -> Result<Option<User>, anyhow::Error> {
    let user = spawn_blocking_with_tracing(move || {
        users::table
            .find(user_id)
            .first::<User>(&mut conn)
            .optional()
            .context("Failed to query user by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(user)
}

// Error associated with inserting a user row
#[derive(Error)]
pub enum UserInsertError {
    #[error("email field is not unique")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("unexpected database error occured")]
    UnexpectedError(#[from] diesel::result::Error),
}

impl Debug for UserInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument("Inserting user into the database", skip_all)]
pub async fn insert_user(
    mut conn: DbConnection,
    new_user: NewUser,
) -> Result<User, UserInsertError> {
    let user = spawn_blocking_with_tracing(move || {
        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => UserInsertError::EmailNotUnique(e),
                _ => UserInsertError::UnexpectedError(e),
            })
    })
    .await??;

    Ok(user)
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = users)]
pub struct UserProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Error associated with updating a user's profile
#[derive(Error)]
pub enum ProfileUpdateError {
    #[error("email field is not unique")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("unexpected database error occured")]
    UnexpectedError(#[from] diesel::result::Error),
}

impl Debug for ProfileUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument("Updating user profile", skip(conn, changes))]
pub async fn update_user_profile(
    mut conn: DbConnection,
    user_id: i32,
    changes: UserProfileChanges,
) -> Result<User, ProfileUpdateError> {
    let user = spawn_blocking_with_tracing(move || {
        diesel::update(users::table.find(user_id))
            .set((&changes, users::updated_at.eq(diesel::dsl::now)))
            .get_result::<User>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => ProfileUpdateError::EmailNotUnique(e),
                _ => ProfileUpdateError::UnexpectedError(e),
            })
    })
    .await??;

    Ok(user)
}

#[tracing::instrument("Updating stored password hash", skip(conn, password_hash))]
pub async fn update_user_password(
    mut conn: DbConnection,
    user_id: i32,
    password_hash: String,
) -> Result<(), anyhow::Error> {
    spawn_blocking_with_tracing(move || {
        diesel::update(users::table.find(user_id))
            .set((
                users::password.eq(password_hash),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .context("Failed to update password hash")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(())
}
