use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Country::Table)
                    .if_not_exists()
                    .col(pk_auto(Country::Id))
                    .col(string_len(Country::Name, 200).unique_key())
                    .col(big_integer(Country::CreatedAt))
                    .col(big_integer(Country::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string_len(Genre::Name, 200).unique_key())
                    .col(big_integer(Genre::CreatedAt))
                    .col(big_integer(Genre::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Person::Table)
                    .if_not_exists()
                    .col(pk_auto(Person::Id))
                    .col(string_len(Person::Name, 400))
                    .col(string_len_null(Person::OriginName, 400))
                    .col(string_null(Person::Birthday))
                    .col(string_null(Person::Photo))
                    .col(integer_null(Person::KinopoiskId))
                    .col(big_integer(Person::CreatedAt))
                    .col(big_integer(Person::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_person_name")
                    .table(Person::Table)
                    .col(Person::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Film::Table)
                    .if_not_exists()
                    .col(pk_auto(Film::Id))
                    .col(string_len(Film::Name, 1024))
                    .col(string_len_null(Film::OriginName, 1024))
                    .col(string_len_null(Film::Slogan, 2048))
                    .col(integer(Film::CountryId))
                    .col(integer(Film::DirectorId))
                    .col(integer_null(Film::Length))
                    .col(integer_null(Film::Year))
                    .col(string_null(Film::TrailerUrl))
                    .col(string_null(Film::Cover))
                    .col(text_null(Film::Description))
                    .col(integer_null(Film::KinopoiskId))
                    .col(big_integer(Film::CreatedAt))
                    .col(big_integer(Film::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_country")
                            .from(Film::Table, Film::CountryId)
                            .to(Country::Table, Country::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_director")
                            .from(Film::Table, Film::DirectorId)
                            .to(Person::Table, Person::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_film_name")
                    .table(Film::Table)
                    .col(Film::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FilmGenre::Table)
                    .if_not_exists()
                    .col(integer(FilmGenre::FilmId))
                    .col(integer(FilmGenre::GenreId))
                    .primary_key(Index::create().col(FilmGenre::FilmId).col(FilmGenre::GenreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_genre_film")
                            .from(FilmGenre::Table, FilmGenre::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_genre_genre")
                            .from(FilmGenre::Table, FilmGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FilmPerson::Table)
                    .if_not_exists()
                    .col(integer(FilmPerson::FilmId))
                    .col(integer(FilmPerson::PersonId))
                    .primary_key(Index::create().col(FilmPerson::FilmId).col(FilmPerson::PersonId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_person_film")
                            .from(FilmPerson::Table, FilmPerson::FilmId)
                            .to(Film::Table, Film::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_film_person_person")
                            .from(FilmPerson::Table, FilmPerson::PersonId)
                            .to(Person::Table, Person::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FilmPerson::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(FilmGenre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Film::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Person::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Country::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Country {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Person {
    Table,
    Id,
    Name,
    OriginName,
    Birthday,
    Photo,
    KinopoiskId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Film {
    Table,
    Id,
    Name,
    OriginName,
    Slogan,
    CountryId,
    DirectorId,
    Length,
    Year,
    TrailerUrl,
    Cover,
    Description,
    KinopoiskId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FilmGenre {
    Table,
    FilmId,
    GenreId,
}

#[derive(DeriveIden)]
enum FilmPerson {
    Table,
    FilmId,
    PersonId,
}
