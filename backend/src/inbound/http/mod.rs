//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.
//!
//! Handlers translate JSON payloads into domain values, resolve the calling
//! [`crate::domain::Actor`] from the bearer header and delegate to the domain
//! services held in [`state::HttpState`].

pub mod auth;
pub mod bearer;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod pagination;
pub mod reviews;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod titles;
pub mod users;
pub(crate) mod validation;

pub use crate::domain::ApiResult;

use actix_web::web;

/// Register every `/api/v1` handler on `cfg`.
///
/// `/users/me` is registered ahead of `/users/{username}` so the literal
/// segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::signup)
        .service(auth::token)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::replace_user)
        .service(users::delete_user)
        .service(catalogue::list_categories)
        .service(catalogue::create_category)
        .service(catalogue::delete_category)
        .service(catalogue::list_genres)
        .service(catalogue::create_genre)
        .service(catalogue::delete_genre)
        .service(titles::list_titles)
        .service(titles::create_title)
        .service(titles::get_title)
        .service(titles::update_title)
        .service(titles::delete_title)
        .service(reviews::list_reviews)
        .service(reviews::create_review)
        .service(reviews::get_review)
        .service(reviews::update_review)
        .service(reviews::delete_review)
        .service(reviews::list_comments)
        .service(reviews::create_comment)
        .service(reviews::get_comment)
        .service(reviews::update_comment)
        .service(reviews::delete_comment);
}
