use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "game_leaderboard")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_title: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub score: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
