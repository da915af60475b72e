use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string_len(Users::LastName, 150).default(""))
                    .col(string(Users::Email).default(""))
                    .col(boolean(Users::IsActive).default(true))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .col(timestamp_with_time_zone_null(Users::LastLogin))
                    .col(string_len(Users::Role, 20).default("student"))
                    .col(string_null(Users::MatricNo).unique_key())
                    .col(string_null(Users::Department))
                    .to_owned(),
            )
            .await?;

        // Create academic_supervisors table
        manager
            .create_table(
                Table::create()
                    .table(AcademicSupervisors::Table)
                    .if_not_exists()
                    .col(pk_auto(AcademicSupervisors::Id))
                    .col(integer(AcademicSupervisors::UserId).unique_key())
                    .col(string_len(AcademicSupervisors::Designation, 100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_academic_supervisors_user")
                            .from(AcademicSupervisors::Table, AcademicSupervisors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create industry_supervisors table
        manager
            .create_table(
                Table::create()
                    .table(IndustrySupervisors::Table)
                    .if_not_exists()
                    .col(pk_auto(IndustrySupervisors::Id))
                    .col(integer(IndustrySupervisors::UserId).unique_key())
                    .col(string_len(IndustrySupervisors::Company, 100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_industry_supervisors_user")
                            .from(IndustrySupervisors::Table, IndustrySupervisors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_auto(Students::Id))
                    .col(integer(Students::UserId).unique_key())
                    .col(string_len(Students::Course, 100))
                    .col(integer_null(Students::AcademicSupervisorId))
                    .col(integer_null(Students::IndustrySupervisorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_academic_supervisor")
                            .from(Students::Table, Students::AcademicSupervisorId)
                            .to(AcademicSupervisors::Table, AcademicSupervisors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_industry_supervisor")
                            .from(Students::Table, Students::IndustrySupervisorId)
                            .to(IndustrySupervisors::Table, IndustrySupervisors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create log_entries table
        manager
            .create_table(
                Table::create()
                    .table(LogEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(LogEntries::Id))
                    .col(integer(LogEntries::StudentId))
                    .col(date(LogEntries::Date))
                    .col(text(LogEntries::ActivityDescription))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_log_entries_student")
                            .from(LogEntries::Table, LogEntries::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_entries_student_date")
                    .table(LogEntries::Table)
                    .col(LogEntries::StudentId)
                    .col(LogEntries::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create comments table
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_auto(Comments::Id))
                    .col(integer(Comments::LogEntryId))
                    .col(integer(Comments::AuthorId))
                    .col(text(Comments::CommentText))
                    .col(timestamp_with_time_zone(Comments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_log_entry")
                            .from(Comments::Table, Comments::LogEntryId)
                            .to(LogEntries::Table, LogEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_log_entry")
                    .table(Comments::Table)
                    .col(Comments::LogEntryId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LogEntries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(IndustrySupervisors::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AcademicSupervisors::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    FirstName,
    LastName,
    Email,
    IsActive,
    DateJoined,
    LastLogin,
    Role,
    MatricNo,
    Department,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    UserId,
    Course,
    AcademicSupervisorId,
    IndustrySupervisorId,
}

#[derive(DeriveIden)]
enum AcademicSupervisors {
    Table,
    Id,
    UserId,
    Designation,
}

#[derive(DeriveIden)]
enum IndustrySupervisors {
    Table,
    Id,
    UserId,
    Company,
}

#[derive(DeriveIden)]
enum LogEntries {
    Table,
    Id,
    StudentId,
    Date,
    ActivityDescription,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    LogEntryId,
    AuthorId,
    CommentText,
    CreatedAt,
}
