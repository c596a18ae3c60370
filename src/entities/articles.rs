use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    /// Markup body (markdown with optional inline HTML)
    pub content: String,

    /// Author username
    pub author: String,

    /// Attachment locator under the uploads root
    pub attachment: Option<String>,

    /// Serialized chart configuration (JSON), see `services::article::ChartConfig`
    pub chart_config: Option<String>,

    pub created_at: String,

    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
