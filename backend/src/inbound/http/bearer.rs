//! Bearer-token extraction.
//!
//! Handlers take an [`Actor`] argument; this module resolves it from the
//! `Authorization: Bearer <token>` header. No header means
//! [`Actor::Anonymous`], while a malformed header or an unknown or expired
//! token is rejected with `401` before the handler runs.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AccessToken, Actor, Error};

use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Parse the bearer token from `req`, if one was presented.
fn presented_token(req: &HttpRequest) -> Result<Option<AccessToken>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid ASCII"))?;
    let (scheme, credentials) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("authorization header must be `Bearer <token>`"))?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(Error::unauthorized(
            "authorization header must use the Bearer scheme",
        ));
    }
    AccessToken::parse(credentials)
        .map(Some)
        .map_err(|err| Error::unauthorized(format!("invalid bearer token: {err}")))
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = presented_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(token) = token? else {
                return Ok(Actor::Anonymous);
            };
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            Ok(state.auth.authenticate(&token).await?)
        })
    }
}
