use uuid::Uuid;

use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// A row that belongs to one teacher or one student profile.
#[async_trait::async_trait]
pub trait HasOwner {
    async fn get_owner_id(&self, mm: &ModelManager, ctx: &AuthenticatedUser)
    -> DatabaseResult<Uuid>;
}

/// Admins pass. Teachers and students pass only for rows owned by their own
/// profile id.
pub async fn check_access<T: HasOwner + Sync>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
) -> DatabaseResult<()> {
    let expected = match ctx.user_role() {
        UserRole::Admin => return Ok(()),
        UserRole::Teacher { teacher_id } => teacher_id,
        UserRole::Student { student_id } => student_id,
    };

    if resource.get_owner_id(mm, ctx).await? == expected {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}
