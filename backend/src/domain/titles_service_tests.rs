//! Tests for title validation and slug resolution.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockTaxonomyRepository, MockTitleRepository};
use crate::domain::{ErrorCode, Role, Taxon, TaxonName, TaxonRecord};
use crate::test_support::{MutableClock, fixed_now, sample_user};

fn slug(raw: &str) -> Slug {
    Slug::new(raw).expect("valid slug")
}

fn record(id: i64, raw: &str) -> TaxonRecord {
    TaxonRecord {
        id: TaxonId::new(id),
        taxon: Taxon {
            name: TaxonName::new(raw).expect("valid name"),
            slug: slug(raw),
        },
    }
}

fn stored_title(id: i64) -> Title {
    Title {
        id: TitleId::new(id),
        name: TitleName::new("Solaris").expect("valid name"),
        year: ReleaseYear::from_stored(1972),
        description: None,
        category: None,
        genres: Vec::new(),
        rating: None,
    }
}

fn admin() -> Actor {
    Actor::Authenticated(sample_user(1, "root", Role::Admin))
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(fixed_now()))
}

fn service(
    titles: MockTitleRepository,
    taxonomies: MockTaxonomyRepository,
    clock: Arc<MutableClock>,
) -> TitlesService {
    TitlesService::new(Arc::new(titles), Arc::new(taxonomies), clock)
}

fn draft(year: i32, category: Option<&str>, genres: &[&str]) -> TitleDraft {
    TitleDraft {
        name: TitleName::new("Solaris").expect("valid name"),
        year,
        description: Some("Ocean planet".to_owned()),
        category: category.map(slug),
        genres: genres.iter().copied().map(slug).collect(),
    }
}

#[rstest]
#[tokio::test]
async fn create_resolves_slugs_to_identifiers(clock: Arc<MutableClock>) {
    let mut taxonomies = MockTaxonomyRepository::new();
    taxonomies
        .expect_find()
        .returning(|kind, slug| match (kind, slug.as_str()) {
            (TaxonomyKind::Category, "film") => Ok(Some(record(1, "film"))),
            (TaxonomyKind::Genre, "drama") => Ok(Some(record(7, "drama"))),
            _ => Ok(None),
        });
    let mut titles = MockTitleRepository::new();
    titles
        .expect_insert()
        .times(1)
        .withf(|new_title| {
            new_title.category == Some(TaxonId::new(1))
                && new_title.genres == vec![TaxonId::new(7)]
                && new_title.year.get() == 1972
        })
        .return_once(|_| Ok(stored_title(10)));

    let created = service(titles, taxonomies, clock)
        .create(&admin(), draft(1972, Some("film"), &["drama", "drama"]))
        .await
        .expect("title created");
    assert_eq!(created.id, TitleId::new(10));
}

#[rstest]
#[tokio::test]
async fn create_collects_all_field_errors(clock: Arc<MutableClock>) {
    let mut taxonomies = MockTaxonomyRepository::new();
    taxonomies.expect_find().returning(|_, _| Ok(None));
    let mut titles = MockTitleRepository::new();
    titles.expect_insert().times(0);

    let error = service(titles, taxonomies, clock)
        .create(&admin(), draft(2030, Some("film"), &["noir"]))
        .await
        .expect_err("invalid draft");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let fields = error
        .details()
        .and_then(|d| d.get("fields"))
        .and_then(|f| f.as_object())
        .expect("field map");
    let mut keys: Vec<_> = fields.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["category", "genre", "year"]);
}

#[rstest]
#[tokio::test]
async fn release_year_follows_the_clock(clock: Arc<MutableClock>) {
    let mut titles = MockTitleRepository::new();
    titles
        .expect_insert()
        .return_once(|_| Ok(stored_title(11)));
    let taxonomies = MockTaxonomyRepository::new();
    let svc = service(titles, taxonomies, Arc::clone(&clock));

    let rejected = svc.create(&admin(), draft(2025, None, &[])).await;
    assert!(rejected.is_err());

    clock.advance(chrono::TimeDelta::days(366));
    svc.create(&admin(), draft(2025, None, &[]))
        .await
        .expect("2025 is no longer in the future");
}

#[rstest]
#[tokio::test]
async fn update_can_clear_the_category(clock: Arc<MutableClock>) {
    let mut taxonomies = MockTaxonomyRepository::new();
    taxonomies.expect_find().times(0);
    let mut titles = MockTitleRepository::new();
    titles
        .expect_update()
        .withf(|_, changes| changes.category == Some(None) && changes.genres.is_none())
        .return_once(|_, _| Ok(Some(stored_title(3))));

    let patch = TitlePatch {
        category: Some(None),
        ..TitlePatch::default()
    };
    service(titles, taxonomies, clock)
        .update(&admin(), TitleId::new(3), patch)
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn missing_title_is_not_found(clock: Arc<MutableClock>) {
    let mut titles = MockTitleRepository::new();
    titles.expect_find().return_once(|_| Ok(None));

    let error = service(titles, MockTaxonomyRepository::new(), clock)
        .get(TitleId::new(404))
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Actor::Anonymous, ErrorCode::Unauthorized)]
#[case(Actor::Authenticated(sample_user(2, "mod", Role::Moderator)), ErrorCode::Forbidden)]
#[tokio::test]
async fn delete_requires_admin(
    clock: Arc<MutableClock>,
    #[case] actor: Actor,
    #[case] expected: ErrorCode,
) {
    let mut titles = MockTitleRepository::new();
    titles.expect_delete().times(0);

    let error = service(titles, MockTaxonomyRepository::new(), clock)
        .delete(&actor, TitleId::new(1))
        .await
        .expect_err("denied");
    assert_eq!(error.code(), expected);
}
