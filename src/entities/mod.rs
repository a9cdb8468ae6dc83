pub mod comment;
pub mod country;
pub mod film;
pub mod film_genre;
pub mod film_person;
pub mod genre;
pub mod person;
pub mod post;
pub mod section;
pub mod user;

/// Unix seconds, the representation of every `created_at` / `updated_at` column.
pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

/// Shared `created_at` / `updated_at` bookkeeping for an entity module.
///
/// Expands to the entity's `ActiveModelBehavior`; the timestamps are only
/// maintained when rows are written through `ActiveModel::insert` / `update`.
macro_rules! timestamped {
    () => {
        #[async_trait::async_trait]
        impl sea_orm::ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, sea_orm::DbErr>
            where
                C: sea_orm::ConnectionTrait,
            {
                let now = crate::entities::now_sec();
                if insert {
                    self.created_at = sea_orm::ActiveValue::Set(now);
                }
                self.updated_at = sea_orm::ActiveValue::Set(now);
                Ok(self)
            }
        }
    };
}

pub(crate) use timestamped;
