use super::{comment, user};
use sea_orm::entity::prelude::*;

/// One dated activity record written by a student.
/// `student_id` points at the student's user row, not the profile.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "log_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub date: Date,
    #[sea_orm(column_type = "Text")]
    pub activity_description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::StudentId",
        to = "user::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "comment::Entity")]
    Comments,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
