use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "officers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))", unique)]
    pub badge_number: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub station: String,
    pub password_hash: String,
    pub approved: bool,
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ApprovedBy",
        to = "Column::Id"
    )]
    Approver,
}

impl ActiveModelBehavior for ActiveModel {}
