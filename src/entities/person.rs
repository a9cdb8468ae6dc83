use jiff::civil::Date;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub origin_name: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub birthday: Option<String>,
    pub photo: Option<String>,
    pub kinopoisk_id: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn birthday_date(&self) -> Option<Date> {
        self.birthday.as_deref().and_then(|s| s.parse().ok())
    }

    /// Completed years between the birthday and `today`.
    pub fn age(&self, today: Date) -> Option<i16> {
        let birthday = self.birthday_date()?;
        let mut years = today.year() - birthday.year();
        if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
            years -= 1;
        }
        Some(years)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Films the person acted in; directed films are looked up by `film::Column::DirectorId`.
impl Related<super::film::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_person::Relation::Film.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_person::Relation::Person.def().rev())
    }
}

super::timestamped!();
