use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "performance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub play_id: i32,
    pub theatre_hall_id: i32,
    pub show_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::play::Entity",
        from = "Column::PlayId",
        to = "super::play::Column::Id"
    )]
    Play,
    #[sea_orm(
        belongs_to = "super::theatre_hall::Entity",
        from = "Column::TheatreHallId",
        to = "super::theatre_hall::Column::Id"
    )]
    TheatreHall,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
}

impl Related<super::play::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Play.def()
    }
}

impl Related<super::theatre_hall::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TheatreHall.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
