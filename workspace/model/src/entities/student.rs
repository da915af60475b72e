use super::{academic_supervisor, industry_supervisor, user};
use sea_orm::entity::prelude::*;

/// Student profile, one per student user.
/// Each supervisor reference is a single nullable column, so a student has at
/// most one academic and one industry supervisor at any time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub course: String,
    pub academic_supervisor_id: Option<i32>,
    pub industry_supervisor_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "academic_supervisor::Entity",
        from = "Column::AcademicSupervisorId",
        to = "academic_supervisor::Column::Id"
    )]
    AcademicSupervisor,
    #[sea_orm(
        belongs_to = "industry_supervisor::Entity",
        from = "Column::IndustrySupervisorId",
        to = "industry_supervisor::Column::Id"
    )]
    IndustrySupervisor,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<academic_supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicSupervisor.def()
    }
}

impl Related<industry_supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndustrySupervisor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
