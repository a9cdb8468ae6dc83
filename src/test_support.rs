//! Fixtures shared by the unit tests: a migrated in-memory database and rows
//! inserted without going through the forms.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
use migration::Migrator;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use crate::{
    AppState,
    config::Config,
    entities::{country, film, film_genre, film_person, genre, person, user},
    routes,
};

pub async fn db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

/// The full router over a fresh database, driven with `oneshot` requests.
pub struct TestApp {
    pub state: AppState,
    pub db: DatabaseConnection,
    key: Key,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = db().await;
        let key = Key::generate();
        let state = AppState::new(Config::default(), db.clone(), key.clone());
        let router = routes::router(state.clone());
        Self { state, db, key, router }
    }

    /// A `Cookie` header value carrying a signed session for `user`.
    pub fn cookie_for(&self, user: &user::Model) -> String {
        let jar = SignedCookieJar::new(self.key.clone()).add(Cookie::new("session", user.id.to_string()));
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response<Body> {
        let mut request =
            Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Target of a 303 redirect.
pub fn location(response: &Response<Body>) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// Value of the named cookie set by `response`, if any.
pub fn set_cookie<'r>(response: &'r Response<Body>, name: &str) -> Option<&'r str> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
}

/// A user whose password can never match; tests sign in through the cookie.
pub async fn user(db: &DatabaseConnection, username: &str, is_admin: bool) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("!".to_string()),
        is_admin: Set(is_admin),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn country(db: &DatabaseConnection, name: &str) -> country::Model {
    country::ActiveModel { name: Set(name.to_string()), ..Default::default() }
        .insert(db)
        .await
        .expect("insert country")
}

pub async fn genre(db: &DatabaseConnection, name: &str) -> genre::Model {
    genre::ActiveModel { name: Set(name.to_string()), ..Default::default() }
        .insert(db)
        .await
        .expect("insert genre")
}

pub async fn person(db: &DatabaseConnection, name: &str) -> person::Model {
    person::ActiveModel { name: Set(name.to_string()), ..Default::default() }
        .insert(db)
        .await
        .expect("insert person")
}

/// A film directed by and starring `director`, with a single genre.
pub async fn film(
    db: &DatabaseConnection,
    name: &str,
    country: &country::Model,
    genre: &genre::Model,
    director: &person::Model,
) -> film::Model {
    let film = film::ActiveModel {
        name: Set(name.to_string()),
        country_id: Set(country.id),
        director_id: Set(director.id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert film");
    film_genre::ActiveModel { film_id: Set(film.id), genre_id: Set(genre.id) }
        .insert(db)
        .await
        .expect("link genre");
    film_person::ActiveModel { film_id: Set(film.id), person_id: Set(director.id) }
        .insert(db)
        .await
        .expect("link person");
    film
}
