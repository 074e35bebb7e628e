//! Patient record operations.

use tracing::info;

use super::OperationError;
use crate::{
    context::AppContext,
    db,
    models::{NewRecord, Record},
};

/// Parse a wire identifier into a store id.
///
/// Only positive integers name stored documents.
///
/// # Errors
/// Returns [`OperationError::InvalidId`] for anything else.
pub fn parse_id(raw: &str) -> Result<i32, OperationError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(OperationError::InvalidId),
    }
}

/// Every record, or only those owned by `owner` when given.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn all_records(
    ctx: &AppContext,
    owner: Option<&str>,
) -> Result<Vec<Record>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::list_records(&mut conn, owner).await?)
}

/// Records whose clinical fields contain `keyword`, ignoring case.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn search_records(
    ctx: &AppContext,
    keyword: &str,
) -> Result<Vec<Record>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::search_records(&mut conn, keyword).await?)
}

/// Store one record and return it with its id.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the insert fails.
pub async fn add_one_record(ctx: &AppContext, record: &NewRecord) -> Result<Record, OperationError> {
    let mut conn = ctx.conn().await?;
    let stored = db::create_record(&mut conn, record).await?;
    info!(id = stored.id, owner = %stored.user_em, "record created");
    Ok(stored)
}

/// Store a batch of records in order.
///
/// An empty batch returns immediately without touching the store.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when an insert fails; earlier rows
/// of the batch remain stored.
pub async fn add_records(
    ctx: &AppContext,
    batch: &[NewRecord],
) -> Result<Vec<Record>, OperationError> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }
    let mut conn = ctx.conn().await?;
    let stored = db::create_records(&mut conn, batch).await?;
    info!(count = stored.len(), "records created");
    Ok(stored)
}

/// Delete the record named by `raw_id`.
///
/// # Errors
/// Returns [`OperationError::InvalidId`] for a malformed id,
/// [`OperationError::NotFound`] when nothing was deleted, and
/// [`OperationError::Unavailable`] when the store fails.
pub async fn delete_record(ctx: &AppContext, raw_id: &str) -> Result<bool, OperationError> {
    let id = parse_id(raw_id)?;
    let mut conn = ctx.conn().await?;
    match db::delete_record(&mut conn, id).await? {
        0 => Err(OperationError::NotFound("Record not found".to_owned())),
        _ => {
            info!(id, "record deleted");
            Ok(true)
        }
    }
}
