use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "film")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub origin_name: Option<String>,
    pub slogan: Option<String>,
    pub country_id: i32,
    pub director_id: i32,
    /// Minutes.
    pub length: Option<i32>,
    pub year: Option<i32>,
    pub trailer_url: Option<String>,
    pub cover: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub kinopoisk_id: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::country::Entity",
        from = "Column::CountryId",
        to = "super::country::Column::Id",
        on_delete = "Cascade"
    )]
    Country,
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::DirectorId",
        to = "super::person::Column::Id",
        on_delete = "Cascade"
    )]
    Director,
}

impl Related<super::country::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Country.def()
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_genre::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_genre::Relation::Film.def().rev())
    }
}

/// The cast; the director is reached through `Relation::Director`.
impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_person::Relation::Person.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_person::Relation::Film.def().rev())
    }
}

super::timestamped!();
