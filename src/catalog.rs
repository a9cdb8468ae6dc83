use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};

use crate::{
    entities::{country, film, film_genre, film_person, genre, person},
    error::{AppError, AppResult, SaveError, SaveResult},
    forms::{
        FieldErrors, Options,
        catalog::{FilmInput, NameInput, PersonInput},
    },
    models::{AutocompleteItem, AutocompletePagination, AutocompleteResponse},
    pagination::{Page, paginate},
    search,
};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Films as shown on their detail page.
#[derive(Clone, Debug)]
pub struct FilmDetail {
    pub film: film::Model,
    pub country: Option<country::Model>,
    pub director: Option<person::Model>,
    pub genres: Vec<genre::Model>,
    pub people: Vec<person::Model>,
}

#[derive(Clone, Debug)]
pub struct PersonDetail {
    pub person: person::Model,
    pub acted: Vec<film::Model>,
    pub directed: Vec<film::Model>,
}

/// Store for the film catalog: countries, genres, people and films.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
    page_size: u64,
    autocomplete_limit: u64,
}

impl Catalog {
    pub fn new(db: DatabaseConnection, page_size: u64, autocomplete_limit: u64) -> Self {
        Self { db, page_size, autocomplete_limit: autocomplete_limit.max(1) }
    }

    // Countries

    pub async fn countries(&self) -> AppResult<Vec<country::Model>> {
        Ok(country::Entity::find()
            .order_by_asc(country::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn country(&self, id: i32) -> AppResult<country::Model> {
        country::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Country"))
    }

    pub async fn country_films(
        &self,
        country: &country::Model,
        page: Option<&str>,
    ) -> AppResult<Page<film::Model>> {
        let select = country.find_related(film::Entity);
        Ok(paginate(&self.db, by_title(select), page, self.page_size).await?)
    }

    pub async fn create_country(&self, input: NameInput) -> SaveResult<country::Model> {
        ensure_unique::<country::Entity, _>(
            &self.db,
            country::Column::Name,
            country::Column::Id,
            &input.name,
            None,
            "Country",
        )
        .await?;

        let country = country::ActiveModel { name: Set(input.name), ..Default::default() }
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, "Country"))?;

        info!(country_id = country.id, name = %country.name, "country created");
        Ok(country)
    }

    pub async fn update_country(
        &self,
        country: country::Model,
        input: NameInput,
    ) -> SaveResult<country::Model> {
        ensure_unique::<country::Entity, _>(
            &self.db,
            country::Column::Name,
            country::Column::Id,
            &input.name,
            Some(country.id),
            "Country",
        )
        .await?;

        let mut model: country::ActiveModel = country.into();
        model.name = Set(input.name);
        let country = model.update(&self.db).await.map_err(|e| unique_violation(e, "Country"))?;

        info!(country_id = country.id, name = %country.name, "country updated");
        Ok(country)
    }

    pub async fn delete_country(&self, country: country::Model) -> AppResult<()> {
        let id = country.id;
        country.delete(&self.db).await?;
        info!(country_id = id, "country deleted");
        Ok(())
    }

    pub async fn autocomplete_countries(
        &self,
        q: &str,
        page: Option<&str>,
    ) -> AppResult<AutocompleteResponse> {
        let mut select = country::Entity::find()
            .order_by_asc(country::Column::Name)
            .order_by_asc(country::Column::Id);
        if !q.trim().is_empty() {
            select = select.filter(search::starts_with((country::Entity, country::Column::Name), q.trim()));
        }

        let (offset, limit) = self.autocomplete_window(page);
        let rows = select.offset(offset).limit(limit + 1).all(&self.db).await?;
        Ok(autocomplete(rows.into_iter().map(|c| (c.id, c.name)), limit))
    }

    // Genres

    pub async fn genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await?)
    }

    pub async fn genre(&self, id: i32) -> AppResult<genre::Model> {
        genre::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Genre"))
    }

    pub async fn genre_films(
        &self,
        genre: &genre::Model,
        page: Option<&str>,
    ) -> AppResult<Page<film::Model>> {
        let select = genre.find_related(film::Entity);
        Ok(paginate(&self.db, by_title(select), page, self.page_size).await?)
    }

    pub async fn create_genre(&self, input: NameInput) -> SaveResult<genre::Model> {
        ensure_unique::<genre::Entity, _>(
            &self.db,
            genre::Column::Name,
            genre::Column::Id,
            &input.name,
            None,
            "Genre",
        )
        .await?;

        let genre = genre::ActiveModel { name: Set(input.name), ..Default::default() }
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, "Genre"))?;

        info!(genre_id = genre.id, name = %genre.name, "genre created");
        Ok(genre)
    }

    pub async fn update_genre(&self, genre: genre::Model, input: NameInput) -> SaveResult<genre::Model> {
        ensure_unique::<genre::Entity, _>(
            &self.db,
            genre::Column::Name,
            genre::Column::Id,
            &input.name,
            Some(genre.id),
            "Genre",
        )
        .await?;

        let mut model: genre::ActiveModel = genre.into();
        model.name = Set(input.name);
        let genre = model.update(&self.db).await.map_err(|e| unique_violation(e, "Genre"))?;

        info!(genre_id = genre.id, name = %genre.name, "genre updated");
        Ok(genre)
    }

    pub async fn delete_genre(&self, genre: genre::Model) -> AppResult<()> {
        let id = genre.id;
        genre.delete(&self.db).await?;
        info!(genre_id = id, "genre deleted");
        Ok(())
    }

    // People

    pub async fn people(&self, query: Option<&str>, page: Option<&str>) -> AppResult<Page<person::Model>> {
        let mut select = person::Entity::find()
            .order_by_asc(person::Column::Name)
            .order_by_asc(person::Column::Id);
        if let Some(term) = query.map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(search::contains((person::Entity, person::Column::Name), term));
        }
        Ok(paginate(&self.db, select, page, self.page_size).await?)
    }

    pub async fn person(&self, id: i32) -> AppResult<person::Model> {
        person::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Person"))
    }

    pub async fn person_detail(&self, id: i32) -> AppResult<PersonDetail> {
        let person = self.person(id).await?;
        let (acted, directed) = futures::try_join!(
            by_title(person.find_related(film::Entity)).all(&self.db),
            by_title(film::Entity::find().filter(film::Column::DirectorId.eq(person.id))).all(&self.db),
        )?;
        Ok(PersonDetail { person, acted, directed })
    }

    pub async fn create_person(&self, input: PersonInput) -> SaveResult<person::Model> {
        let mut model = person::ActiveModel { ..Default::default() };
        fill_person(&mut model, input);
        let person = model.insert(&self.db).await?;

        info!(person_id = person.id, name = %person.name, "person created");
        Ok(person)
    }

    pub async fn update_person(
        &self,
        person: person::Model,
        input: PersonInput,
    ) -> SaveResult<person::Model> {
        let mut model: person::ActiveModel = person.into();
        fill_person(&mut model, input);
        let person = model.update(&self.db).await?;

        info!(person_id = person.id, name = %person.name, "person updated");
        Ok(person)
    }

    /// Also removes the films the person directed.
    pub async fn delete_person(&self, person: person::Model) -> AppResult<()> {
        let id = person.id;
        person.delete(&self.db).await?;
        info!(person_id = id, "person deleted");
        Ok(())
    }

    pub async fn autocomplete_people(
        &self,
        q: &str,
        page: Option<&str>,
    ) -> AppResult<AutocompleteResponse> {
        let mut select = person::Entity::find()
            .order_by_asc(person::Column::Name)
            .order_by_asc(person::Column::Id);
        if !q.trim().is_empty() {
            select = select.filter(search::starts_with((person::Entity, person::Column::Name), q.trim()));
        }

        let (offset, limit) = self.autocomplete_window(page);
        let rows = select.offset(offset).limit(limit + 1).all(&self.db).await?;
        Ok(autocomplete(rows.into_iter().map(|p| (p.id, p.name)), limit))
    }

    // Films

    pub async fn films(&self, query: Option<&str>, page: Option<&str>) -> AppResult<Page<film::Model>> {
        let mut select = film::Entity::find();
        if let Some(term) = query.map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(search::contains((film::Entity, film::Column::Name), term));
        }
        Ok(paginate(&self.db, by_title(select), page, self.page_size).await?)
    }

    pub async fn film(&self, id: i32) -> AppResult<film::Model> {
        film::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Film"))
    }

    pub async fn film_detail(&self, id: i32) -> AppResult<FilmDetail> {
        let film = self.film(id).await?;
        let (country, director, genres, people) = futures::try_join!(
            film.find_related(country::Entity).one(&self.db),
            person::Entity::find_by_id(film.director_id).one(&self.db),
            film.find_related(genre::Entity).order_by_asc(genre::Column::Name).all(&self.db),
            film.find_related(person::Entity).order_by_asc(person::Column::Name).all(&self.db),
        )?;
        Ok(FilmDetail { film, country, director, genres, people })
    }

    /// Genre and cast ids of a film, for pre-filling its edit form.
    pub async fn film_links(&self, film: &film::Model) -> AppResult<(Vec<i32>, Vec<i32>)> {
        let (genres, people) = futures::try_join!(
            film_genre::Entity::find()
                .filter(film_genre::Column::FilmId.eq(film.id))
                .all(&self.db),
            film_person::Entity::find()
                .filter(film_person::Column::FilmId.eq(film.id))
                .all(&self.db),
        )?;
        Ok((
            genres.into_iter().map(|link| link.genre_id).collect(),
            people.into_iter().map(|link| link.person_id).collect(),
        ))
    }

    pub async fn create_film(&self, input: FilmInput) -> SaveResult<film::Model> {
        let film = self.save_film(None, input).await?;
        info!(film_id = film.id, name = %film.name, "film created");
        Ok(film)
    }

    pub async fn update_film(&self, film: film::Model, input: FilmInput) -> SaveResult<film::Model> {
        let film = self.save_film(Some(film), input).await?;
        info!(film_id = film.id, name = %film.name, "film updated");
        Ok(film)
    }

    pub async fn delete_film(&self, film: film::Model) -> AppResult<()> {
        let id = film.id;
        film.delete(&self.db).await?;
        info!(film_id = id, "film deleted");
        Ok(())
    }

    /// Choices for the relation fields of the film form.
    pub async fn film_options(&self) -> AppResult<Options> {
        let (countries, genres, people) = futures::try_join!(
            country::Entity::find().order_by_asc(country::Column::Name).all(&self.db),
            genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db),
            person::Entity::find().order_by_asc(person::Column::Name).all(&self.db),
        )?;
        let people: Vec<(i32, String)> = people.into_iter().map(|p| (p.id, p.name)).collect();

        let mut options = Options::new();
        options.insert("country", countries.into_iter().map(|c| (c.id, c.name)).collect());
        options.insert("genres", genres.into_iter().map(|g| (g.id, g.name)).collect());
        options.insert("director", people.clone());
        options.insert("people", people);
        Ok(options)
    }

    /// The film row and its genre and cast links are written together.
    async fn save_film(&self, existing: Option<film::Model>, input: FilmInput) -> SaveResult<film::Model> {
        let txn = self.db.begin().await?;
        check_film_references(&txn, &input).await?;

        let film = match existing {
            Some(film) => {
                let mut model: film::ActiveModel = film.into();
                fill_film(&mut model, &input);
                model.update(&txn).await?
            },
            None => {
                let mut model = film::ActiveModel { ..Default::default() };
                fill_film(&mut model, &input);
                model.insert(&txn).await?
            },
        };

        film_genre::Entity::delete_many()
            .filter(film_genre::Column::FilmId.eq(film.id))
            .exec(&txn)
            .await?;
        if !input.genre_ids.is_empty() {
            film_genre::Entity::insert_many(input.genre_ids.iter().map(|&genre_id| {
                film_genre::ActiveModel { film_id: Set(film.id), genre_id: Set(genre_id) }
            }))
            .exec_without_returning(&txn)
            .await?;
        }

        film_person::Entity::delete_many()
            .filter(film_person::Column::FilmId.eq(film.id))
            .exec(&txn)
            .await?;
        if !input.people_ids.is_empty() {
            film_person::Entity::insert_many(input.people_ids.iter().map(|&person_id| {
                film_person::ActiveModel { film_id: Set(film.id), person_id: Set(person_id) }
            }))
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;
        debug!(
            film_id = film.id,
            genres = input.genre_ids.len(),
            people = input.people_ids.len(),
            "film links replaced"
        );
        Ok(film)
    }

    /// SQLite offsets are signed 64-bit, so far-out pages are capped there
    /// and simply come back empty.
    fn autocomplete_window(&self, page: Option<&str>) -> (u64, u64) {
        let page = page
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let offset = (page - 1).saturating_mul(self.autocomplete_limit).min(i64::MAX as u64);
        (offset, self.autocomplete_limit)
    }
}

fn by_title(select: sea_orm::Select<film::Entity>) -> sea_orm::Select<film::Entity> {
    select.order_by_asc(film::Column::Name).order_by_asc(film::Column::Id)
}

/// `rows` holds up to `limit + 1` entries; the extra one only signals `more`.
fn autocomplete(rows: impl Iterator<Item = (i32, String)>, limit: u64) -> AutocompleteResponse {
    let mut results: Vec<AutocompleteItem> = rows
        .map(|(id, text)| AutocompleteItem { id: id.to_string(), text })
        .collect();
    let more = results.len() as u64 > limit;
    results.truncate(limit as usize);
    AutocompleteResponse { results, pagination: AutocompletePagination { more } }
}

async fn ensure_unique<E, C>(
    db: &C,
    name_column: E::Column,
    id_column: E::Column,
    name: &str,
    except: Option<i32>,
    label: &str,
) -> SaveResult<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut select = E::find().filter(name_column.eq(name));
    if let Some(id) = except {
        select = select.filter(id_column.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(name_taken(label));
    }
    Ok(())
}

fn name_taken(label: &str) -> SaveError {
    SaveError::Invalid(FieldErrors::field_error("name", format!("{label} with this name already exists.")))
}

/// A concurrent insert can still win the race past `ensure_unique`.
fn unique_violation(err: DbErr, label: &str) -> SaveError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => name_taken(label),
        _ => SaveError::from(err),
    }
}

async fn check_film_references<C: ConnectionTrait>(db: &C, input: &FilmInput) -> SaveResult<()> {
    let mut errors = FieldErrors::new();

    if country::Entity::find_by_id(input.country_id).one(db).await?.is_none() {
        errors.add("country", INVALID_CHOICE);
    }
    if person::Entity::find_by_id(input.director_id).one(db).await?.is_none() {
        errors.add("director", INVALID_CHOICE);
    }

    let genres = genre::Entity::find()
        .filter(genre::Column::Id.is_in(input.genre_ids.iter().copied()))
        .count(db)
        .await?;
    if genres as usize != input.genre_ids.len() {
        errors.add("genres", INVALID_CHOICE);
    }

    let people = person::Entity::find()
        .filter(person::Column::Id.is_in(input.people_ids.iter().copied()))
        .count(db)
        .await?;
    if people as usize != input.people_ids.len() {
        errors.add("people", INVALID_CHOICE);
    }

    Ok(errors.into_result(())?)
}

fn fill_person(model: &mut person::ActiveModel, input: PersonInput) {
    model.name = Set(input.name);
    model.origin_name = Set(input.origin_name);
    model.birthday = Set(input.birthday.map(|d| d.to_string()));
    model.photo = Set(input.photo);
    model.kinopoisk_id = Set(input.kinopoisk_id);
}

fn fill_film(model: &mut film::ActiveModel, input: &FilmInput) {
    model.name = Set(input.name.clone());
    model.origin_name = Set(input.origin_name.clone());
    model.slogan = Set(input.slogan.clone());
    model.country_id = Set(input.country_id);
    model.director_id = Set(input.director_id);
    model.length = Set(input.length);
    model.year = Set(input.year);
    model.trailer_url = Set(input.trailer_url.clone());
    model.cover = Set(input.cover.clone());
    model.description = Set(input.description.clone());
    model.kinopoisk_id = Set(input.kinopoisk_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn name(s: &str) -> NameInput {
        NameInput { name: s.to_string() }
    }

    fn film_input(country: i32, director: i32, genres: Vec<i32>, people: Vec<i32>) -> FilmInput {
        FilmInput {
            name: "Alien".to_string(),
            origin_name: None,
            slogan: Some("In space no one can hear you scream.".to_string()),
            length: Some(117),
            year: Some(1979),
            trailer_url: None,
            cover: None,
            description: None,
            country_id: country,
            genre_ids: genres,
            director_id: director,
            people_ids: people,
            kinopoisk_id: None,
        }
    }

    #[tokio::test]
    async fn country_lifecycle() {
        let catalog = Catalog::new(test_support::db().await, 10, 20);

        let created = catalog.create_country(name("France")).await.unwrap();
        assert!(created.created_at > 0);
        assert_eq!(catalog.country(created.id).await.unwrap().name, "France");

        let renamed = catalog.update_country(created.clone(), name("République")).await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "République");

        catalog.delete_country(renamed).await.unwrap();
        assert!(matches!(catalog.country(created.id).await, Err(AppError::NotFound("Country"))));
    }

    #[tokio::test]
    async fn genre_names_are_unique() {
        let catalog = Catalog::new(test_support::db().await, 10, 20);
        let drama = catalog.create_genre(name("Drama")).await.unwrap();
        let comedy = catalog.create_genre(name("Comedy")).await.unwrap();

        let err = catalog.create_genre(name("Drama")).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(ref e) if e.field("name").len() == 1));

        let err = catalog.update_genre(comedy, name("Drama")).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));

        // Saving a genre under its own name is not a clash.
        catalog.update_genre(drama, name("Drama")).await.unwrap();
        assert_eq!(catalog.genres().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn autocomplete_matches_prefix_case_insensitively() {
        let db = test_support::db().await;
        for n in ["John Hurt", "jodie foster", "Bojo", "Joan Allen", "Sigourney Weaver"] {
            test_support::person(&db, n).await;
        }
        let catalog = Catalog::new(db, 10, 20);

        let response = catalog.autocomplete_people("Jo", None).await.unwrap();
        let names: Vec<_> = response.results.iter().map(|r| r.text.as_str()).collect();
        // Binary collation: upper case sorts first.
        assert_eq!(names, ["Joan Allen", "John Hurt", "jodie foster"]);
        assert!(!response.pagination.more);

        let wildcard = catalog.autocomplete_people("J_", None).await.unwrap();
        assert!(wildcard.results.is_empty());

        let everything = catalog.autocomplete_people("", None).await.unwrap();
        assert_eq!(everything.results.len(), 5);
    }

    #[tokio::test]
    async fn autocomplete_pages() {
        let db = test_support::db().await;
        for n in ["Austria", "Australia", "Argentina"] {
            test_support::country(&db, n).await;
        }
        let catalog = Catalog::new(db, 10, 2);

        let first = catalog.autocomplete_countries("a", None).await.unwrap();
        assert_eq!(first.results.len(), 2);
        assert!(first.pagination.more);

        let second = catalog.autocomplete_countries("a", Some("2")).await.unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].text, "Austria");
        assert!(!second.pagination.more);
    }

    #[tokio::test]
    async fn person_is_created_with_its_details() {
        let db = test_support::db().await;
        let catalog = Catalog::new(db, 10, 20);

        let person = catalog
            .create_person(PersonInput {
                name: "Sigourney Weaver".to_string(),
                origin_name: Some("Susan Alexandra Weaver".to_string()),
                birthday: Some(jiff::civil::date(1949, 10, 8)),
                photo: None,
                kinopoisk_id: Some(1574),
            })
            .await
            .unwrap();

        let stored = catalog.person(person.id).await.unwrap();
        assert_eq!(stored.name, "Sigourney Weaver");
        assert_eq!(stored.origin_name.as_deref(), Some("Susan Alexandra Weaver"));
        assert_eq!(stored.birthday_date(), Some(jiff::civil::date(1949, 10, 8)));
        assert_eq!(stored.kinopoisk_id, Some(1574));
    }

    #[tokio::test]
    async fn autocomplete_far_past_the_end_is_empty() {
        let db = test_support::db().await;
        test_support::person(&db, "John Hurt").await;
        let catalog = Catalog::new(db, 10, 20);

        let response = catalog.autocomplete_people("Jo", Some("18446744073709551615")).await.unwrap();
        assert!(response.results.is_empty());
        assert!(!response.pagination.more);
    }

    #[tokio::test]
    async fn film_links_are_replaced_on_update() {
        let db = test_support::db().await;
        let uk = test_support::country(&db, "UK").await;
        let horror = test_support::genre(&db, "Horror").await;
        let scifi = test_support::genre(&db, "Sci-Fi").await;
        let scott = test_support::person(&db, "Ridley Scott").await;
        let weaver = test_support::person(&db, "Sigourney Weaver").await;
        let catalog = Catalog::new(db, 10, 20);

        let film = catalog
            .create_film(film_input(uk.id, scott.id, vec![horror.id], vec![weaver.id]))
            .await
            .unwrap();
        assert_eq!(catalog.film_links(&film).await.unwrap(), (vec![horror.id], vec![weaver.id]));

        let film = catalog
            .update_film(film, film_input(uk.id, scott.id, vec![scifi.id], vec![weaver.id, scott.id]))
            .await
            .unwrap();
        let detail = catalog.film_detail(film.id).await.unwrap();
        assert_eq!(detail.country.map(|c| c.name).as_deref(), Some("UK"));
        assert_eq!(detail.director.map(|d| d.id), Some(scott.id));
        assert_eq!(detail.genres.iter().map(|g| g.id).collect::<Vec<_>>(), [scifi.id]);
        assert_eq!(detail.people.len(), 2);

        let person = catalog.person_detail(scott.id).await.unwrap();
        assert_eq!(person.directed.len(), 1);
        assert_eq!(person.acted.len(), 1);
    }

    #[tokio::test]
    async fn unknown_references_leave_nothing_behind() {
        let db = test_support::db().await;
        let uk = test_support::country(&db, "UK").await;
        let scott = test_support::person(&db, "Ridley Scott").await;
        let catalog = Catalog::new(db, 10, 20);

        let err = catalog.create_film(film_input(uk.id, scott.id, vec![999], vec![scott.id])).await.unwrap_err();
        let SaveError::Invalid(errors) = err else { panic!("expected field errors") };
        assert_eq!(errors.field("genres").len(), 1);
        assert!(errors.field("country").is_empty());
        assert_eq!(catalog.films(None, None).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn deleting_a_country_removes_its_films() {
        let db = test_support::db().await;
        let uk = test_support::country(&db, "UK").await;
        let horror = test_support::genre(&db, "Horror").await;
        let scott = test_support::person(&db, "Ridley Scott").await;
        test_support::film(&db, "Alien", &uk, &horror, &scott).await;
        let catalog = Catalog::new(db, 10, 20);

        assert_eq!(catalog.genre_films(&horror, None).await.unwrap().total, 1);
        catalog.delete_country(uk).await.unwrap();
        assert_eq!(catalog.films(None, None).await.unwrap().total, 0);
        assert_eq!(catalog.genre_films(&horror, None).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn film_search_is_a_case_insensitive_substring() {
        let db = test_support::db().await;
        let uk = test_support::country(&db, "UK").await;
        let horror = test_support::genre(&db, "Horror").await;
        let scott = test_support::person(&db, "Ridley Scott").await;
        for title in ["Alien", "Aliens", "Blade Runner"] {
            test_support::film(&db, title, &uk, &horror, &scott).await;
        }
        let catalog = Catalog::new(db, 10, 20);

        let page = catalog.films(Some("LIEN"), None).await.unwrap();
        assert_eq!(page.items.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["Alien", "Aliens"]);
        assert_eq!(catalog.films(Some("  "), None).await.unwrap().total, 3);
    }
}
