use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::play_actor::Entity")]
    PlayActors,
}

impl Related<super::play_actor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayActors.def()
    }
}

impl Related<super::play::Entity> for Entity {
    fn to() -> RelationDef {
        super::play_actor::Relation::Play.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::play_actor::Relation::Actor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
