//! Behavioural tests for rating aggregation over the review set.

#[path = "yamdb_support/api_world.rs"]
mod api_world;

use std::cell::RefCell;
use std::collections::HashMap;

use actix_web::http::Method;
use api_world::ApiWorld;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

/// API world plus identifiers captured from earlier responses.
#[derive(Default)]
struct RatingWorld {
    api: ApiWorld,
    titles: RefCell<HashMap<String, i64>>,
    reviews: RefCell<HashMap<(String, String), i64>>,
}

impl RatingWorld {
    fn title(&self, name: &str) -> i64 {
        *self
            .titles
            .borrow()
            .get(name)
            .unwrap_or_else(|| panic!("title {name} was not catalogued"))
    }

    fn review(&self, author: &str, title: &str) -> i64 {
        *self
            .reviews
            .borrow()
            .get(&(author.to_owned(), title.to_owned()))
            .unwrap_or_else(|| panic!("{author} has not reviewed {title}"))
    }

    fn rating(&self, title: &str) -> Value {
        let reply = self.api.send(
            Method::GET,
            &format!("/api/v1/titles/{}", self.title(title)),
            None,
            None,
        );
        assert_eq!(reply.status, 200, "{}", reply.body);
        reply.body.get("rating").cloned().unwrap_or_default()
    }
}

#[fixture]
fn world() -> RatingWorld {
    RatingWorld::default()
}

#[given("an empty service")]
fn an_empty_service(world: &RatingWorld) {
    let _ = world;
}

#[given("an admin named {username}")]
fn an_admin_named(world: &RatingWorld, username: String) {
    world.api.admin(&username);
}

#[given("a signed-in user named {username}")]
fn a_signed_in_user(world: &RatingWorld, username: String) {
    world
        .api
        .sign_in(&username, &format!("{username}@example.com"));
}

#[given("{admin} has catalogued {name} from {year}")]
fn has_catalogued(world: &RatingWorld, admin: String, name: String, year: i32) {
    let reply = world.api.send(
        Method::POST,
        "/api/v1/titles",
        Some(&admin),
        Some(json!({"name": name, "year": year})),
    );
    assert_eq!(reply.status, 201, "{}", reply.body);
    let id = reply.body.get("id").and_then(Value::as_i64).expect("title id");
    world.titles.borrow_mut().insert(name, id);
}

#[when("{author} reviews {title} with score {score}")]
fn reviews_with_score(world: &RatingWorld, author: String, title: String, score: i64) {
    let reply = world.api.send(
        Method::POST,
        &format!("/api/v1/titles/{}/reviews", world.title(&title)),
        Some(&author),
        Some(json!({"text": format!("{author} on {title}"), "score": score})),
    );
    if let Some(id) = reply.body.get("id").and_then(Value::as_i64) {
        world.reviews.borrow_mut().insert((author, title), id);
    }
}

#[when("{actor} deletes the review by {author} of {title}")]
fn deletes_review(world: &RatingWorld, actor: String, author: String, title: String) {
    world.api.send(
        Method::DELETE,
        &format!(
            "/api/v1/titles/{}/reviews/{}",
            world.title(&title),
            world.review(&author, &title)
        ),
        Some(&actor),
        None,
    );
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &RatingWorld, status: u16) {
    let reply = world.api.last();
    assert_eq!(reply.status, status, "{}", reply.body);
}

#[then("the rating of {title} is {rating}")]
fn the_rating_is(world: &RatingWorld, title: String, rating: u8) {
    assert_eq!(world.rating(&title), json!(rating));
}

#[then("{title} has no rating")]
fn has_no_rating(world: &RatingWorld, title: String) {
    assert_eq!(world.rating(&title), Value::Null);
}

#[scenario(
    path = "tests/features/title_rating.feature",
    name = "A title without reviews has no rating"
)]
fn unreviewed_title_has_no_rating(world: RatingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/title_rating.feature",
    name = "Rating follows reviews as they are posted and removed"
)]
fn rating_follows_reviews(world: RatingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/title_rating.feature",
    name = "A user reviews a title only once"
)]
fn one_review_per_user(world: RatingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/title_rating.feature",
    name = "Users cannot remove reviews written by others"
)]
fn users_cannot_remove_others_reviews(world: RatingWorld) {
    drop(world);
}
