//! Read-only hospital directory lookups.

use super::OperationError;
use crate::{context::AppContext, db, models::Hospital};

/// Every hospital in the directory.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn all_hospitals(ctx: &AppContext) -> Result<Vec<Hospital>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::list_hospitals(&mut conn).await?)
}

/// Hospitals offering a department whose zh or en name contains `department`.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn hospitals_by_department(
    ctx: &AppContext,
    department: &str,
) -> Result<Vec<Hospital>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::hospitals_by_department(&mut conn, department).await?)
}

/// Hospitals whose name contains `name`, ignoring case.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn hospitals_by_name(
    ctx: &AppContext,
    name: &str,
) -> Result<Vec<Hospital>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::hospitals_by_name(&mut conn, name).await?)
}
