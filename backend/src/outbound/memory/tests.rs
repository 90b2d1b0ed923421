//! Referential behaviour of the in-memory store.

use chrono::TimeDelta;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AccessTokenRepository, CommentRepository, ReviewRepository, ReviewRepositoryError,
    TaxonomyRepository, TaxonomyRepositoryError, TitleRepository, TitleRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Error, ErrorCode, NewComment, NewReview, NewTitle, NewUser, Rating, ReviewId, Role,
    TaxonName, TaxonomyKind, Title, TitleChanges, TitleFilter, TitleId, UserChanges,
};
use crate::test_support::{fixed_now, sample_email, sample_username};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn add_user(store: &InMemoryStore, name: &str) -> User {
    UserRepository::insert(
        store,
        &NewUser::signup(
            sample_username(name),
            sample_email(&format!("{name}@example.com")),
        ),
    )
    .await
    .expect("user inserted")
}

async fn add_taxon(store: &InMemoryStore, kind: TaxonomyKind, slug: &str) -> TaxonId {
    let taxon = Taxon {
        name: TaxonName::new(slug.to_uppercase()).expect("name"),
        slug: crate::domain::Slug::new(slug).expect("slug"),
    };
    TaxonomyRepository::insert(store, kind, &taxon)
        .await
        .expect("taxon inserted")
        .id
}

async fn add_title(
    store: &InMemoryStore,
    name: &str,
    year: i32,
    category: Option<TaxonId>,
    genres: Vec<TaxonId>,
) -> Title {
    TitleRepository::insert(
        store,
        &NewTitle {
            name: TitleName::new(name).expect("name"),
            year: ReleaseYear::from_stored(year),
            description: None,
            category,
            genres,
        },
    )
    .await
    .expect("title inserted")
}

async fn add_review(store: &InMemoryStore, title: TitleId, author: &User, score: u8) -> ReviewId {
    ReviewRepository::insert(
        store,
        &NewReview {
            title_id: title,
            author_id: author.id(),
            text: ContentText::new("text").expect("text"),
            score: Score::new(score).expect("score"),
            pub_date: fixed_now(),
        },
    )
    .await
    .expect("review inserted")
    .id
}

#[rstest]
#[tokio::test]
async fn usernames_and_emails_are_unique(store: InMemoryStore) {
    add_user(&store, "alice").await;

    let same_name = NewUser::signup(sample_username("alice"), sample_email("other@example.com"));
    let err = UserRepository::insert(&store, &same_name)
        .await
        .expect_err("duplicate username");
    assert_eq!(err, UserRepositoryError::DuplicateUsername);

    let same_email = NewUser::signup(sample_username("bob"), sample_email("alice@example.com"));
    let err = UserRepository::insert(&store, &same_email)
        .await
        .expect_err("duplicate email");
    assert_eq!(err, UserRepositoryError::DuplicateEmail);
}

#[rstest]
#[tokio::test]
async fn updating_to_a_taken_username_fails(store: InMemoryStore) {
    add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;

    let changes = UserChanges {
        username: Some(sample_username("alice")),
        ..UserChanges::default()
    };
    let err = UserRepository::update(&store, bob.id(), &changes)
        .await
        .expect_err("taken");
    assert_eq!(err, UserRepositoryError::DuplicateUsername);
}

#[rstest]
#[tokio::test]
async fn rating_tracks_the_current_review_set(store: InMemoryStore) {
    let title = add_title(&store, "Solaris", 1972, None, Vec::new()).await;
    assert_eq!(title.rating, None);

    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;
    let first = add_review(&store, title.id, &alice, 9).await;
    add_review(&store, title.id, &bob, 6).await;

    let rated = TitleRepository::find(&store, title.id)
        .await
        .expect("find")
        .expect("title exists");
    assert_eq!(rated.rating.map(Rating::value), Some(8));

    ReviewRepository::delete(&store, first).await.expect("delete");
    let rerated = TitleRepository::find(&store, title.id)
        .await
        .expect("find")
        .expect("title exists");
    assert_eq!(rerated.rating.map(Rating::value), Some(6));

    let second_only = ReviewRepository::list(&store, title.id, PageRequest::default())
        .await
        .expect("list");
    assert_eq!(second_only.total, 1);
}

#[rstest]
#[tokio::test]
async fn one_review_per_author_and_title(store: InMemoryStore) {
    let title = add_title(&store, "Stalker", 1979, None, Vec::new()).await;
    let alice = add_user(&store, "alice").await;
    add_review(&store, title.id, &alice, 7).await;

    let again = NewReview {
        title_id: title.id,
        author_id: alice.id(),
        text: ContentText::new("again").expect("text"),
        score: Score::new(1).expect("score"),
        pub_date: fixed_now(),
    };
    let err = ReviewRepository::insert(&store, &again)
        .await
        .expect_err("duplicate");
    assert_eq!(err, ReviewRepositoryError::DuplicateReview);
}

#[rstest]
#[tokio::test]
async fn deleting_a_title_cascades_to_reviews_and_comments(store: InMemoryStore) {
    let title = add_title(&store, "Mirror", 1975, None, Vec::new()).await;
    let alice = add_user(&store, "alice").await;
    let review = add_review(&store, title.id, &alice, 10).await;
    CommentRepository::insert(
        &store,
        &NewComment {
            review_id: review,
            author_id: alice.id(),
            text: ContentText::new("agreed").expect("text"),
            pub_date: fixed_now(),
        },
    )
    .await
    .expect("comment");

    assert!(TitleRepository::delete(&store, title.id).await.expect("delete"));

    let tables = store.tables().await;
    assert!(tables.reviews.is_empty());
    assert!(tables.comments.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_removes_their_content_and_tokens(store: InMemoryStore) {
    let title = add_title(&store, "Ivan", 1962, None, Vec::new()).await;
    let alice = add_user(&store, "alice").await;
    let bob = add_user(&store, "bob").await;
    let alice_review = add_review(&store, title.id, &alice, 6).await;
    add_review(&store, title.id, &bob, 4).await;
    CommentRepository::insert(
        &store,
        &NewComment {
            review_id: alice_review,
            author_id: bob.id(),
            text: ContentText::new("bob on alice").expect("text"),
            pub_date: fixed_now(),
        },
    )
    .await
    .expect("comment");
    let digest = SecretDigest::of("token");
    AccessTokenRepository::store(&store, alice.id(), &digest, fixed_now() + TimeDelta::hours(1))
        .await
        .expect("token");

    assert!(UserRepository::delete(&store, alice.id()).await.expect("delete"));

    let resolved = AccessTokenRepository::resolve(&store, &digest, fixed_now())
        .await
        .expect("resolve");
    assert!(resolved.is_none());
    let tables = store.tables().await;
    assert_eq!(tables.reviews.len(), 1);
    assert!(tables.comments.is_empty(), "comments on alice's review cascade");
}

#[rstest]
#[tokio::test]
async fn deleting_taxa_unlinks_titles(store: InMemoryStore) {
    let film = add_taxon(&store, TaxonomyKind::Category, "film").await;
    let drama = add_taxon(&store, TaxonomyKind::Genre, "drama").await;
    let title = add_title(&store, "Nostalghia", 1983, Some(film), vec![drama]).await;
    assert!(title.category.is_some());

    let film_slug = crate::domain::Slug::new("film").expect("slug");
    let drama_slug = crate::domain::Slug::new("drama").expect("slug");
    assert!(TaxonomyRepository::delete(&store, TaxonomyKind::Category, &film_slug)
        .await
        .expect("delete category"));
    assert!(TaxonomyRepository::delete(&store, TaxonomyKind::Genre, &drama_slug)
        .await
        .expect("delete genre"));

    let survivor = TitleRepository::find(&store, title.id)
        .await
        .expect("find")
        .expect("title survives");
    assert!(survivor.category.is_none());
    assert!(survivor.genres.is_empty());
}

#[rstest]
#[tokio::test]
async fn slugs_are_unique_per_taxonomy(store: InMemoryStore) {
    add_taxon(&store, TaxonomyKind::Genre, "drama").await;
    add_taxon(&store, TaxonomyKind::Category, "drama").await;

    let taxon = Taxon {
        name: TaxonName::new("Drama again").expect("name"),
        slug: crate::domain::Slug::new("drama").expect("slug"),
    };
    let err = TaxonomyRepository::insert(&store, TaxonomyKind::Genre, &taxon)
        .await
        .expect_err("duplicate");
    assert_eq!(err, TaxonomyRepositoryError::DuplicateSlug);
}

#[rstest]
#[tokio::test]
async fn titles_are_filtered_and_ordered(store: InMemoryStore) {
    let film = add_taxon(&store, TaxonomyKind::Category, "film").await;
    let drama = add_taxon(&store, TaxonomyKind::Genre, "drama").await;
    add_title(&store, "Zerkalo", 1975, Some(film), vec![drama]).await;
    add_title(&store, "Andrei Rublev", 1966, Some(film), Vec::new()).await;
    add_title(&store, "Mirror", 1975, None, vec![drama]).await;

    let all = TitleRepository::list(&store, &TitleFilter::default(), PageRequest::default())
        .await
        .expect("list");
    let names: Vec<&str> = all.items.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Mirror", "Zerkalo", "Andrei Rublev"]);

    let filter = TitleFilter {
        category: Some(crate::domain::Slug::new("film").expect("slug")),
        genre: Some(crate::domain::Slug::new("drama").expect("slug")),
        ..TitleFilter::default()
    };
    let filtered = TitleRepository::list(&store, &filter, PageRequest::default())
        .await
        .expect("list");
    assert_eq!(filtered.total, 1);

    let by_name = TitleFilter {
        name: Some("RUB".to_owned()),
        ..TitleFilter::default()
    };
    let named = TitleRepository::list(&store, &by_name, PageRequest::default())
        .await
        .expect("list");
    assert_eq!(named.items.len(), 1);
}

#[rstest]
#[tokio::test]
async fn listings_page_through_results(store: InMemoryStore) {
    for name in ["a1", "a2", "a3", "a4", "a5"] {
        add_user(&store, name).await;
    }
    let page = PageRequest::new(2, 2).expect("page");
    let listing = UserRepository::list(&store, None, page).await.expect("list");
    assert_eq!(listing.total, 5);
    let names: Vec<&str> = listing.items.iter().map(|u| u.username().as_str()).collect();
    assert_eq!(names, vec!["a3", "a4"]);
}

#[rstest]
#[tokio::test]
async fn expired_tokens_do_not_resolve(store: InMemoryStore) {
    let alice = add_user(&store, "alice").await;
    let digest = SecretDigest::of("secret");
    AccessTokenRepository::store(&store, alice.id(), &digest, fixed_now())
        .await
        .expect("token");

    let resolved = AccessTokenRepository::resolve(&store, &digest, fixed_now())
        .await
        .expect("resolve");
    assert!(resolved.is_none());
}

#[rstest]
#[tokio::test]
async fn consuming_confirmation_is_single_use_and_verifies(store: InMemoryStore) {
    let alice = add_user(&store, "alice").await;
    let code = crate::domain::ConfirmationCode::generate();
    let pending = PendingConfirmation::issue(&code, fixed_now(), TimeDelta::hours(1));
    UserRepository::store_confirmation(&store, alice.id(), &pending)
        .await
        .expect("store");

    let wrong = crate::domain::ConfirmationCode::generate().digest();
    let rejected = UserRepository::consume_confirmation(&store, alice.id(), &wrong, fixed_now())
        .await
        .expect("wrong code");
    assert!(!rejected);

    let digest = code.digest();
    let first = UserRepository::consume_confirmation(&store, alice.id(), &digest, fixed_now())
        .await
        .expect("first use");
    let second = UserRepository::consume_confirmation(&store, alice.id(), &digest, fixed_now())
        .await
        .expect("second use");
    assert!(first);
    assert!(!second);

    let verified = UserRepository::find_by_id(&store, alice.id())
        .await
        .expect("find")
        .expect("exists");
    assert!(verified.is_verified());
    assert_eq!(verified.role(), Role::User);
}

#[rstest]
#[tokio::test]
async fn expired_confirmation_is_not_consumed(store: InMemoryStore) {
    let alice = add_user(&store, "alice").await;
    let code = crate::domain::ConfirmationCode::generate();
    let pending = PendingConfirmation::issue(&code, fixed_now(), TimeDelta::hours(1));
    UserRepository::store_confirmation(&store, alice.id(), &pending)
        .await
        .expect("store");

    let late = fixed_now() + TimeDelta::hours(1);
    let consumed = UserRepository::consume_confirmation(&store, alice.id(), &code.digest(), late)
        .await
        .expect("consume");
    assert!(!consumed);
    let user = UserRepository::find_by_id(&store, alice.id())
        .await
        .expect("find")
        .expect("exists");
    assert!(!user.is_verified());
}

#[rstest]
#[tokio::test]
async fn genre_links_hold_each_genre_once(store: InMemoryStore) {
    let drama = add_taxon(&store, TaxonomyKind::Genre, "drama").await;
    let crime = add_taxon(&store, TaxonomyKind::Genre, "crime").await;
    let title = add_title(&store, "Heat", 1995, None, vec![drama, crime, drama]).await;
    assert_eq!(title.genres.len(), 2);

    let changes = TitleChanges {
        genres: Some(vec![crime, drama, crime, crime]),
        ..TitleChanges::default()
    };
    let updated = TitleRepository::update(&store, title.id, &changes)
        .await
        .expect("update")
        .expect("exists");
    let slugs: Vec<&str> = updated.genres.iter().map(|genre| genre.slug.as_str()).collect();
    assert_eq!(slugs, vec!["crime", "drama"]);
}

#[rstest]
#[case::category(TaxonomyKind::Category)]
#[case::genre(TaxonomyKind::Genre)]
#[tokio::test]
async fn dangling_taxon_links_are_field_errors(store: InMemoryStore, #[case] kind: TaxonomyKind) {
    let taxon = add_taxon(&store, kind, "gone").await;
    let slug = crate::domain::Slug::new("gone").expect("slug");
    TaxonomyRepository::delete(&store, kind, &slug)
        .await
        .expect("delete");
    let (category, genres) = match kind {
        TaxonomyKind::Category => (Some(taxon), Vec::new()),
        TaxonomyKind::Genre => (None, vec![taxon]),
    };

    let err = TitleRepository::insert(
        &store,
        &NewTitle {
            name: TitleName::new("Orphan").expect("name"),
            year: ReleaseYear::from_stored(2001),
            description: None,
            category,
            genres,
        },
    )
    .await
    .expect_err("dangling link rejected");
    assert_eq!(err, TitleRepositoryError::MissingTaxon { kind });

    let error = Error::from(err);
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let pointer = format!("/fields/{}", kind.noun());
    assert!(error.details().and_then(|d| d.pointer(&pointer)).is_some());
}
