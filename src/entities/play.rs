use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "play")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::performance::Entity")]
    Performances,
    #[sea_orm(has_many = "super::play_genre::Entity")]
    PlayGenres,
    #[sea_orm(has_many = "super::play_actor::Entity")]
    PlayActors,
}

impl Related<super::performance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Performances.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::play_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::play_genre::Relation::Play.def().rev())
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        super::play_actor::Relation::Actor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::play_actor::Relation::Play.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
