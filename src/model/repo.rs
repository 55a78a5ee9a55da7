use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Teacher,
    Group,
    Student,
    GroupHistory,
    Lesson,
    LessonTask,
    Assignment,
    Submission,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Teacher => "teacher",
            Self::Group => "group",
            Self::Student => "student",
            Self::GroupHistory => "group history entry",
            Self::Lesson => "lesson",
            Self::LessonTask => "lesson task",
            Self::Assignment => "assignment",
            Self::Submission => "submission",
        };
        f.write_str(name)
    }
}

/// One page of a listing plus the total row count.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

/// Insert and lookup for an entity table. History-like tables never update or
/// delete through this trait; the few mutations they allow are inherent
/// methods with their own invariants.
#[async_trait::async_trait]
pub trait Repository<T, Create, V>
where
    T: ResourceTyped,
    V: Clone + Copy,
{
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: Create,
    ) -> DatabaseResult<T>;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: V,
    ) -> DatabaseResult<Option<T>>;

    /// A negative `limit` means no limit.
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<T>>;

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait PaginatableRepository<T, Create, V>
where
    T: ResourceTyped + Repository<T, Create, V>,
    V: Clone + Copy,
{
    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<T>>;
}

#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $ent_create:ident, $ent_id:ident) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableRepository<$ent, $ent_create, $ent_id> for $ent {
            async fn page(
                mm: &ModelManager,
                actor: &AuthenticatedUser,
                limit: i64,
                offset: i64,
            ) -> DatabaseResult<$crate::model::Page<$ent>> {
                let (items, total) =
                    tokio::try_join!($ent::list(mm, actor, limit, offset), $ent::count(mm, actor))?;
                Ok($crate::model::Page::new(items, total, limit, offset))
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resource_names_are_readable() {
        assert_eq!(ResourceType::GroupHistory.to_string(), "group history entry");
        assert_eq!(ResourceType::LessonTask.to_string(), "lesson task");
    }
}
