use super::{student, user};
use sea_orm::entity::prelude::*;

/// Industry supervisor profile. Owns the `interns` roster.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "industry_supervisors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub company: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "student::Entity")]
    Interns,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Interns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
