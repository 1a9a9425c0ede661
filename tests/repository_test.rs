use chrono::NaiveDate;
use tempfile::TempDir;

use tripboard::access::{AccessStore, Scope};
use tripboard::db;
use tripboard::db::models::{IdeaStatus, Role};
use tripboard::itinerary::ordering::OrderScope;
use tripboard::itinerary::promotion::{DayTarget, Promotion};
use tripboard::repository::{
    DayPatch, LibraryStore, LogisticsStore, NewActivity, NewBooking, NewChecklistItem, NewCity,
    NewDay, NewIdea, NewPlace, NewTrip, NewUser, OrderStore, RepositoryError, ScheduleStore,
    SqliteRepository, TripPatch, TripStore, UserStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The TempDir must outlive the repository.
fn setup() -> (TempDir, SqliteRepository) {
    let temp_dir = TempDir::new().unwrap();
    let pool = db::create_pool(&temp_dir.path().join("test.db"))
        .expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    (temp_dir, SqliteRepository::new(pool))
}

fn trip(name: &str, start: NaiveDate, end: NaiveDate) -> NewTrip {
    NewTrip {
        name: name.into(),
        start_date: Some(start),
        end_date: Some(end),
        home_time_zone: None,
    }
}

async fn city(repo: &SqliteRepository, trip_id: i64, name: &str) -> i64 {
    repo.create_city(
        trip_id,
        NewCity {
            name: name.into(),
            ..Default::default()
        },
    )
    .await
    .expect("create city")
    .id
}

fn promote_to(day: DayTarget) -> Promotion {
    Promotion {
        day,
        start_time: None,
        location: None,
        category: None,
    }
}

#[tokio::test]
async fn three_day_trip_gets_exactly_three_days() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Weekend", date(2026, 3, 16), date(2026, 3, 18)), None)
        .await
        .unwrap();

    let dates: Vec<NaiveDate> = detail.days.iter().map(|d| d.day.date).collect();
    assert_eq!(
        dates,
        vec![date(2026, 3, 16), date(2026, 3, 17), date(2026, 3, 18)]
    );

    // Filling again is a no-op.
    assert_eq!(repo.ensure_trip_days(detail.trip.id).await.unwrap(), 0);
    let again = repo.trip_detail(detail.trip.id).await.unwrap().unwrap();
    assert_eq!(again.days.len(), 3);
}

#[tokio::test]
async fn extending_the_range_only_adds_missing_days() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Stretch", date(2026, 3, 16), date(2026, 3, 17)), None)
        .await
        .unwrap();
    let first_day = detail.days[0].day.id;

    let updated = repo
        .update_trip(
            detail.trip.id,
            TripPatch {
                end_date: Some(Some(date(2026, 3, 20))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.days.len(), 5);
    assert_eq!(updated.days[0].day.id, first_day);
}

#[tokio::test]
async fn inverted_or_open_ranges_create_no_days() {
    let (_dir, repo) = setup();
    let inverted = repo
        .create_trip(trip("Backwards", date(2026, 3, 18), date(2026, 3, 16)), None)
        .await
        .unwrap();
    assert!(inverted.days.is_empty());

    let open = repo
        .create_trip(
            NewTrip {
                name: "Someday".into(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert!(open.days.is_empty());
}

#[tokio::test]
async fn duplicate_day_is_a_conflict() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Clash", date(2026, 3, 16), date(2026, 3, 16)), None)
        .await
        .unwrap();

    let err = repo
        .create_day(
            detail.trip.id,
            NewDay {
                date: date(2026, 3, 16),
                title: None,
                note: None,
                city_id: None,
                city_ids: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, RepositoryError::Conflict(ref msg) if msg == "a day for 2026-03-16 already exists"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn day_city_list_sets_primary_city() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(NewTrip { name: "Loop".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let tokyo = city(&repo, detail.trip.id, "Tokyo").await;
    let kyoto = city(&repo, detail.trip.id, "Kyoto").await;

    let day = repo
        .create_day(
            detail.trip.id,
            NewDay {
                date: date(2026, 4, 1),
                title: Some("Day trip".into()),
                note: None,
                city_id: None,
                city_ids: vec![kyoto, tokyo],
            },
        )
        .await
        .unwrap();
    assert_eq!(day.city_id, Some(kyoto));
    assert_eq!(day.city_ids, vec![kyoto, tokyo]);
}

#[tokio::test]
async fn reorder_applies_a_full_permutation() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(NewTrip { name: "Cities".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let trip_id = detail.trip.id;
    let a = city(&repo, trip_id, "Barcelona").await;
    let b = city(&repo, trip_id, "Beijing").await;
    let c = city(&repo, trip_id, "Tokyo").await;

    repo.reorder(OrderScope::TripCities(trip_id), &[c, a, b])
        .await
        .unwrap();

    let cities = repo.list_cities(trip_id).await.unwrap();
    let order: Vec<(i64, i64)> = cities.iter().map(|c| (c.id, c.position)).collect();
    assert_eq!(order, vec![(c, 1), (a, 2), (b, 3)]);
}

#[tokio::test]
async fn partial_reorder_appends_the_rest() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(NewTrip { name: "Ideas".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let trip_id = detail.trip.id;
    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let idea = repo
            .create_idea(
                trip_id,
                NewIdea {
                    title: title.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ids.push(idea.id);
    }

    repo.reorder(OrderScope::TripIdeas(trip_id), &[ids[2]])
        .await
        .unwrap();
    let ideas = repo.list_ideas(trip_id).await.unwrap();
    let order: Vec<i64> = ideas.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    let positions: Vec<i64> = ideas.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[tokio::test]
async fn reorder_rejects_foreign_ids() {
    let (_dir, repo) = setup();
    let first = repo
        .create_trip(NewTrip { name: "A".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let second = repo
        .create_trip(NewTrip { name: "B".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let mine = city(&repo, first.trip.id, "Tokyo").await;
    let theirs = city(&repo, second.trip.id, "Osaka").await;

    let err = repo
        .reorder(OrderScope::TripCities(first.trip.id), &[theirs, mine])
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));

    // Nothing moved.
    let cities = repo.list_cities(first.trip.id).await.unwrap();
    assert_eq!(cities[0].position, 1);
}

#[tokio::test]
async fn promoting_an_idea_schedules_it_once() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Japan", date(2026, 3, 17), date(2026, 3, 18)), None)
        .await
        .unwrap();
    let trip_id = detail.trip.id;
    let tokyo = city(&repo, trip_id, "Tokyo").await;
    let day_id = detail.days[0].day.id;

    let idea = repo
        .create_idea(
            trip_id,
            NewIdea {
                title: "teamLab Planets".into(),
                note: Some("book ahead".into()),
                category: Some("museum".into()),
                city_id: Some(tokyo),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let activity = repo
        .promote_idea(idea.id, promote_to(DayTarget::Id(day_id)))
        .await
        .unwrap();
    assert_eq!(activity.title, "teamLab Planets");
    assert_eq!(activity.description.as_deref(), Some("book ahead"));
    assert_eq!(activity.category.as_deref(), Some("museum"));
    assert_eq!(activity.city_id, Some(tokyo));
    assert_eq!(activity.idea_id, Some(idea.id));
    assert_eq!(activity.position, 1);

    let activities = repo.day_activities(day_id).await.unwrap();
    assert_eq!(activities.len(), 1);
    let ideas = repo.list_ideas(trip_id).await.unwrap();
    assert_eq!(ideas[0].status, IdeaStatus::Promoted);
}

#[tokio::test]
async fn promoting_to_a_date_creates_the_day() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(NewTrip { name: "Loose".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let trip_id = detail.trip.id;
    let kyoto = city(&repo, trip_id, "Kyoto").await;
    let place = repo
        .create_place(
            trip_id,
            NewPlace {
                name: "Fushimi Inari".into(),
                tag: Some("shrine".into()),
                city_id: Some(kyoto),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let activity = repo
        .promote_place(place.id, promote_to(DayTarget::Date(date(2026, 4, 1))))
        .await
        .unwrap();
    assert_eq!(activity.title, "Fushimi Inari");
    assert_eq!(activity.location.as_deref(), Some("Fushimi Inari"));
    assert_eq!(activity.category.as_deref(), Some("shrine"));
    assert_eq!(activity.place_id, Some(place.id));

    let day = repo.day(activity.day_id).await.unwrap().unwrap();
    assert_eq!(day.date, date(2026, 4, 1));
    assert_eq!(day.trip_id, trip_id);
    assert_eq!(day.city_id, Some(kyoto));

    // The place itself is untouched.
    let places = repo.list_places(trip_id).await.unwrap();
    assert_eq!(places[0].name, place.name);
    assert_eq!(places[0].tag, place.tag);

    // Promoting again to the same date reuses the day.
    let second = repo
        .promote_place(place.id, promote_to(DayTarget::Date(date(2026, 4, 1))))
        .await
        .unwrap();
    assert_eq!(second.day_id, activity.day_id);
    assert_eq!(second.position, 2);
}

#[tokio::test]
async fn promotion_rejects_a_day_from_another_trip() {
    let (_dir, repo) = setup();
    let home = repo
        .create_trip(NewTrip { name: "Home".into(), ..Default::default() }, None)
        .await
        .unwrap();
    let away = repo
        .create_trip(trip("Away", date(2026, 5, 1), date(2026, 5, 1)), None)
        .await
        .unwrap();
    let idea = repo
        .create_idea(
            home.trip.id,
            NewIdea {
                title: "Sushi".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = repo
        .promote_idea(idea.id, promote_to(DayTarget::Id(away.days[0].day.id)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, RepositoryError::Invalid(ref msg) if msg == "day belongs to a different trip")
    );
    let ideas = repo.list_ideas(home.trip.id).await.unwrap();
    assert_eq!(ideas[0].status, IdeaStatus::Open);
}

#[tokio::test]
async fn place_promotion_needs_a_city() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Nowhere", date(2026, 5, 1), date(2026, 5, 1)), None)
        .await
        .unwrap();
    let place = repo
        .create_place(
            detail.trip.id,
            NewPlace {
                name: "Somewhere".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = repo
        .promote_place(place.id, promote_to(DayTarget::Id(detail.days[0].day.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));
    assert!(repo
        .day_activities(detail.days[0].day.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn deleting_a_trip_cascades() {
    let (_dir, repo) = setup();
    let detail = repo
        .create_trip(trip("Gone", date(2026, 3, 16), date(2026, 3, 17)), None)
        .await
        .unwrap();
    let trip_id = detail.trip.id;
    let day_id = detail.days[0].day.id;
    let tokyo = city(&repo, trip_id, "Tokyo").await;
    let activity = repo
        .create_activity(
            day_id,
            NewActivity {
                title: "Walk".into(),
                city_id: Some(tokyo),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let item = repo
        .create_checklist_item(
            trip_id,
            NewChecklistItem {
                title: "Passport".into(),
                category: None,
            },
        )
        .await
        .unwrap();

    repo.delete_trip(trip_id).await.unwrap();

    assert!(repo.trip_detail(trip_id).await.unwrap().is_none());
    assert_eq!(repo.owning_trip(Scope::Day, day_id).await.unwrap(), None);
    assert_eq!(
        repo.owning_trip(Scope::Activity, activity.activity.id)
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        repo.owning_trip(Scope::ChecklistItem, item.id).await.unwrap(),
        None
    );
    assert!(matches!(
        repo.delete_trip(trip_id).await,
        Err(RepositoryError::NotFound("Trip"))
    ));
}

#[tokio::test]
async fn roles_come_from_ownership_and_membership() {
    let (_dir, repo) = setup();
    let owner = repo
        .create_user(NewUser {
            email: "owner@example.com".into(),
            password_hash: "x".into(),
            name: None,
        })
        .await
        .unwrap();
    let friend = repo
        .create_user(NewUser {
            email: "friend@example.com".into(),
            password_hash: "x".into(),
            name: Some("Friend".into()),
        })
        .await
        .unwrap();
    let detail = repo
        .create_trip(NewTrip { name: "Shared".into(), ..Default::default() }, Some(owner.id))
        .await
        .unwrap();
    let trip_id = detail.trip.id;

    assert_eq!(
        repo.role_for(trip_id, owner.id).await.unwrap(),
        Some(Role::Owner)
    );
    assert_eq!(repo.role_for(trip_id, friend.id).await.unwrap(), None);

    let member = repo
        .upsert_membership(trip_id, "friend@example.com", Role::Viewer)
        .await
        .unwrap();
    assert_eq!(member.membership.role, Role::Viewer);
    repo.upsert_membership(trip_id, "friend@example.com", Role::Editor)
        .await
        .unwrap();
    assert_eq!(
        repo.role_for(trip_id, friend.id).await.unwrap(),
        Some(Role::Editor)
    );
    assert_eq!(repo.list_memberships(trip_id).await.unwrap().len(), 2);

    let trips = repo.list_trips(Some(friend.id)).await.unwrap();
    assert_eq!(trips.len(), 1);

    assert!(matches!(
        repo.upsert_membership(trip_id, "nobody@example.com", Role::Viewer)
            .await,
        Err(RepositoryError::NotFound("User"))
    ));
    assert!(matches!(
        repo.create_user(NewUser {
            email: "owner@example.com".into(),
            password_hash: "y".into(),
            name: None,
        })
        .await,
        Err(RepositoryError::Conflict(_))
    ));
}

#[tokio::test]
async fn ownership_cannot_be_granted_through_memberships() {
    let (_dir, repo) = setup();
    let owner = repo
        .create_user(NewUser {
            email: "owner@example.com".into(),
            password_hash: "x".into(),
            name: None,
        })
        .await
        .unwrap();
    let editor = repo
        .create_user(NewUser {
            email: "editor@example.com".into(),
            password_hash: "x".into(),
            name: None,
        })
        .await
        .unwrap();
    let trip_id = repo
        .create_trip(NewTrip { name: "Mine".into(), ..Default::default() }, Some(owner.id))
        .await
        .unwrap()
        .trip
        .id;
    repo.upsert_membership(trip_id, "editor@example.com", Role::Editor)
        .await
        .unwrap();

    let err = repo
        .upsert_membership(trip_id, "editor@example.com", Role::Owner)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(ref msg) if msg == "role must be editor or viewer"));

    let err = repo
        .upsert_membership(trip_id, "owner@example.com", Role::Viewer)
        .await
        .unwrap_err();
    assert!(
        matches!(err, RepositoryError::Invalid(ref msg) if msg == "the trip owner's role cannot be changed")
    );

    assert_eq!(
        repo.role_for(trip_id, owner.id).await.unwrap(),
        Some(Role::Owner)
    );
    assert_eq!(
        repo.role_for(trip_id, editor.id).await.unwrap(),
        Some(Role::Editor)
    );
}

#[tokio::test]
async fn references_to_another_trip_are_rejected() {
    let (_dir, repo) = setup();
    let victim = repo
        .create_trip(trip("Private", date(2026, 6, 1), date(2026, 6, 1)), None)
        .await
        .unwrap();
    let hideout = repo
        .create_city(
            victim.trip.id,
            NewCity {
                name: "Hidden Hideout".into(),
                notes: Some("door code 4411".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id;
    let victim_day = victim.days[0].day.id;

    let mine = repo
        .create_trip(trip("Mine", date(2026, 7, 1), date(2026, 7, 1)), None)
        .await
        .unwrap();
    let my_trip = mine.trip.id;
    let my_day = mine.days[0].day.id;

    let is_foreign = |err: RepositoryError, what: &str| {
        matches!(err, RepositoryError::Invalid(ref msg) if msg == &format!("{what} belongs to a different trip"))
    };

    let err = repo
        .create_activity(
            my_day,
            NewActivity {
                title: "Snoop".into(),
                city_id: Some(hideout),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(is_foreign(err, "city"));
    assert!(repo.day_activities(my_day).await.unwrap().is_empty());

    let err = repo
        .update_day(
            my_day,
            DayPatch {
                city_ids: Some(vec![hideout]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(is_foreign(err, "city"));
    assert!(repo.day(my_day).await.unwrap().unwrap().city_ids.is_empty());

    let err = repo
        .create_day(
            my_trip,
            NewDay {
                date: date(2026, 7, 2),
                title: None,
                note: None,
                city_id: Some(hideout),
                city_ids: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(is_foreign(err, "city"));

    let err = repo
        .create_place(
            my_trip,
            NewPlace {
                name: "Lookout".into(),
                city_id: Some(hideout),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(is_foreign(err, "city"));

    let err = repo
        .create_booking(
            my_trip,
            NewBooking {
                title: "Train".into(),
                day_id: Some(victim_day),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(is_foreign(err, "day"));

    // Same-trip references still work.
    let own_city = city(&repo, my_trip, "Osaka").await;
    let activity = repo
        .create_activity(
            my_day,
            NewActivity {
                title: "Dinner".into(),
                city_id: Some(own_city),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(activity.city.map(|c| c.name), Some("Osaka".to_string()));
}

#[tokio::test]
async fn overlong_date_ranges_are_rejected() {
    let (_dir, repo) = setup();
    let err = repo
        .create_trip(trip("Forever", date(1, 1, 1), date(9999, 12, 31)), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));
    assert_eq!(repo.count_trips().await.unwrap(), 0);

    let detail = repo
        .create_trip(trip("Week", date(2026, 3, 16), date(2026, 3, 22)), None)
        .await
        .unwrap();
    let err = repo
        .update_trip(
            detail.trip.id,
            TripPatch {
                end_date: Some(Some(date(9999, 12, 31))),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Invalid(_)));

    let unchanged = repo.trip_detail(detail.trip.id).await.unwrap().unwrap();
    assert_eq!(unchanged.trip.end_date, Some(date(2026, 3, 22)));
    assert_eq!(unchanged.days.len(), 7);
}
