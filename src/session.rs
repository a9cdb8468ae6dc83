//! Cookie session: the signed-in user and one-shot flash messages.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::{AppState, entities::user, error::AppError, models::FlashLevel, templates::Chrome};

const SESSION_COOKIE: &str = "session";
const FLASH_COOKIE: &str = "_flash";
const SESSION_DAYS: i64 = 14;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Warning, message: message.into() }
    }

    fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        urlencoding::encode(&json).into_owned()
    }

    fn decode(raw: &str) -> Option<Self> {
        let json = urlencoding::decode(raw).ok()?;
        serde_json::from_str(&json).ok()
    }
}

pub struct Session {
    jar: SignedCookieJar,
    user: Option<user::Model>,
    flash: Option<Flash>,
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Ok(jar) = SignedCookieJar::<Key>::from_request_parts(parts, state).await;

        let user = match jar.get(SESSION_COOKIE).and_then(|c| c.value().parse::<i32>().ok()) {
            Some(id) => state.accounts.find(id).await?,
            None => None,
        };

        let (jar, flash) = match jar.get(FLASH_COOKIE) {
            Some(cookie) => {
                let flash = Flash::decode(cookie.value());
                (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
            },
            None => (jar, None),
        };

        Ok(Self { jar, user, flash })
    }
}

impl Session {
    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn chrome(&self) -> Chrome<'_> {
        Chrome { user: self.user.as_ref(), flash: self.flash.as_ref() }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Authors may change their own posts and comments; administrators may change any.
    pub fn can_modify(&self, author_id: i32) -> bool {
        self.is_admin() || self.user_id() == Some(author_id)
    }

    pub fn require_login(self, next: &str) -> Result<Self, AppError> {
        if self.is_authenticated() {
            return Ok(self);
        }
        Err(AppError::refused(
            self.redirect_with(Flash::warning("Please sign in to continue."), &login_url(next)),
        ))
    }

    pub fn require_admin(self, next: &str) -> Result<Self, AppError> {
        if self.is_admin() {
            return Ok(self);
        }
        let warning = if self.is_authenticated() {
            "This action is reserved for administrators."
        } else {
            "Please sign in to continue."
        };
        Err(AppError::refused(self.redirect_with(Flash::warning(warning), &login_url(next))))
    }

    /// Refuses with `warning`, sending the user back to `fallback`, unless the
    /// current user may change content written by `author_id`.
    pub fn require_owner(self, author_id: i32, fallback: &str, warning: &str) -> Result<Self, AppError> {
        if self.can_modify(author_id) {
            return Ok(self);
        }
        tracing::debug!(user_id = ?self.user_id(), author_id, "refusing change to foreign content");
        Err(AppError::refused(self.redirect_with(Flash::warning(warning), fallback)))
    }

    pub fn sign_in(mut self, user: user::Model) -> Self {
        let cookie = Cookie::build((SESSION_COOKIE, user.id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(SESSION_DAYS));
        self.jar = self.jar.add(cookie);
        self.user = Some(user);
        self
    }

    pub fn sign_out(mut self) -> Self {
        self.jar = self.jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
        self.user = None;
        self
    }

    pub fn render(self, html: String) -> Response {
        (self.jar, Html(html)).into_response()
    }

    /// A form re-rendered with its validation errors.
    pub fn render_invalid(self, html: String) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, self.jar, Html(html)).into_response()
    }

    pub fn redirect_with(self, flash: Flash, to: &str) -> Response {
        let cookie = Cookie::build((FLASH_COOKIE, flash.encode())).path("/").http_only(true);
        (self.jar.add(cookie), Redirect::to(to)).into_response()
    }
}

pub fn login_url(next: &str) -> String {
    format!("/login?next={}", urlencoding::encode(next))
}

/// Redirect target after signing in: local absolute paths only.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}
