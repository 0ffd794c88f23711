//! Session cookie middleware
//!
//! Resolves the session cookie into a `RequestIdentity` request
//! extension and keeps the client cookie in sync with the store: a
//! validated session gets the cookie re-issued with its current expiry
//! (renewals included), anything invalid clears it.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;

use crate::core::auth::service::{AuthError, AuthService, RequestIdentity};

/// Cookie name for the session token
pub const SESSION_COOKIE_NAME: &str = "inkpress_session";

/// Build the session cookie carrying the raw token
pub fn session_cookie(token: &str, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    // from_unix_timestamp only fails outside the representable year
    // range, which a +30 day expiry never reaches
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        builder = builder.expires(expires);
    }

    builder.build()
}

/// Build the cookie used to clear the session from the client
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Resolve the session cookie on every request
///
/// Requests without the cookie pass through untouched. Requests with it
/// consult the store exactly once: the response re-sets the cookie with
/// the (possibly renewed) expiry, or clears it when the session is no
/// longer valid. A response on which the handler already set or cleared
/// the session cookie is returned as-is.
pub async fn session_middleware(
    State(auth_service): State<AuthService>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_owned()) else {
        return next.run(req).await;
    };

    let identity = match auth_service.validate_session_token(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Session validation failed: {}", e);
            return e.into_response();
        }
    };

    let jar = match &identity {
        Some(identity) => jar.add(session_cookie(&token, identity.session.expires_at)),
        None => jar.remove(clear_session_cookie()),
    };

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    let response = next.run(req).await;

    // The last Set-Cookie for a name wins, and a handler that set or
    // cleared the session cookie itself (login, logout) acted on newer
    // state than the pre-handler validation. Keep its header effective.
    if sets_session_cookie(&response) {
        return response;
    }

    (jar, response).into_response()
}

/// True when the response already carries a `Set-Cookie` for the
/// session cookie
fn sets_session_cookie(response: &Response) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .any(|cookie| cookie.name() == SESSION_COOKIE_NAME)
}

/// Axum extractor for the authenticated caller
///
/// Reads the identity placed by [`session_middleware`]; rejects with a
/// 401 when the request carried no valid session.
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
