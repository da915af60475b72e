use super::{log_entry, user};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use tracing::trace;

/// Supervisor feedback on a log entry. Append-only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub log_entry_id: i32,
    pub author_id: i32,
    #[sea_orm(column_type = "Text")]
    pub comment_text: String,
    /// Set once on insert, never written again.
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "log_entry::Entity",
        from = "Column::LogEntryId",
        to = "log_entry::Column::Id"
    )]
    LogEntry,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::AuthorId",
        to = "user::Column::Id"
    )]
    Author,
}

impl Related<log_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LogEntry.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.created_at.is_not_set() {
                let now = Utc::now();
                trace!("Stamping comment created_at with {}", now);
                self.created_at = ActiveValue::Set(now);
            }
        } else {
            self.created_at = ActiveValue::NotSet;
        }
        Ok(self)
    }
}
