use crate::domain::ReportStatus;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "missing_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub reporter_name: String,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub reporter_phone: String,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub reporter_relation: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub subject_kind: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub subject_name: String,
    /// Full `ReportSubject`, tagged by kind.
    #[sea_orm(column_type = "JsonBinary")]
    pub subject: Json,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub last_seen_location: String,
    pub last_seen_at: DateTime,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: ReportStatus,
    pub found_at: Option<DateTime>,
    pub status_updated_by: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reporting_user::Entity",
        from = "Column::UserId",
        to = "super::reporting_user::Column::Id"
    )]
    Reporter,
    #[sea_orm(has_many = "super::report_photo::Entity")]
    Photos,
}

impl Related<super::reporting_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl Related<super::report_photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
