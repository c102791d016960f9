use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genre")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::play_genre::Entity")]
    PlayGenres,
}

impl Related<super::play_genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayGenres.def()
    }
}

impl Related<super::play::Entity> for Entity {
    fn to() -> RelationDef {
        super::play_genre::Relation::Play.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::play_genre::Relation::Genre.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
