//! Tests for account administration.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{MockUserRepository, UserRepositoryError};
use crate::domain::{ErrorCode, Role};
use crate::test_support::{sample_email, sample_user, sample_username};

fn service(repo: MockUserRepository) -> UsersService {
    UsersService::new(Arc::new(repo))
}

fn actor(role: Role) -> Actor {
    Actor::Authenticated(sample_user(100, "acting", role))
}

#[rstest]
#[case::anonymous(Actor::Anonymous, ErrorCode::Unauthorized)]
#[case::user(actor(Role::User), ErrorCode::Forbidden)]
#[case::moderator(actor(Role::Moderator), ErrorCode::Forbidden)]
#[tokio::test]
async fn listing_requires_admin(#[case] actor: Actor, #[case] expected: ErrorCode) {
    let mut repo = MockUserRepository::new();
    repo.expect_list().times(0);

    let error = service(repo)
        .list(&actor, None, PageRequest::default())
        .await
        .expect_err("denied");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn listing_drops_blank_search_terms() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .withf(|search, _| search.is_none())
        .return_once(|_, _| Ok(Listing::new(vec![sample_user(1, "alice", Role::User)], 1)));

    let listing = service(repo)
        .list(&actor(Role::Admin), Some("  ".to_owned()), PageRequest::default())
        .await
        .expect("admin may list");
    assert_eq!(listing.total, 1);
}

#[rstest]
#[tokio::test]
async fn get_reports_unknown_usernames() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));

    let error = service(repo)
        .get(&actor(Role::Admin), &sample_username("ghost"))
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn create_surfaces_duplicate_username_as_field_error() {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .return_once(|_| Err(UserRepositoryError::duplicate_username()));

    let new_user = NewUser::signup(sample_username("alice"), sample_email("a@example.com"));
    let error = service(repo)
        .create(&actor(Role::Admin), new_user)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.details().and_then(|d| d.pointer("/fields/username")).is_some());
}

#[rstest]
#[tokio::test]
async fn update_me_ignores_role_changes() {
    let mut repo = MockUserRepository::new();
    repo.expect_update()
        .withf(|id, changes| id.get() == 100 && changes.role.is_none() && changes.bio.is_some())
        .return_once(|_, changes| Ok(Some(changes.apply_to(&sample_user(100, "acting", Role::User)))));

    let changes = UserChanges {
        role: Some(Role::Admin),
        bio: Some("film buff".to_owned()),
        ..UserChanges::default()
    };
    let updated = service(repo)
        .update_me(&actor(Role::User), changes)
        .await
        .expect("self update");
    assert_eq!(updated.role(), Role::User);
    assert_eq!(updated.profile().bio, "film buff");
}

#[rstest]
#[tokio::test]
async fn me_requires_authentication() {
    let repo = MockUserRepository::new();
    let error = service(repo)
        .me(&Actor::Anonymous)
        .await
        .expect_err("anonymous");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn delete_removes_existing_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(|_| Ok(Some(sample_user(5, "bob", Role::User))));
    repo.expect_delete()
        .withf(|id| id.get() == 5)
        .times(1)
        .return_once(|_| Ok(true));

    service(repo)
        .delete(&actor(Role::Admin), &sample_username("bob"))
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

    let error = service(repo)
        .get(&actor(Role::Admin), &sample_username("bob"))
        .await
        .expect_err("outage");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
