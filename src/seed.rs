//! Demo trip loaded by `--seed` into an empty database.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::itinerary::days::{parse_date_input, parse_instant};
use crate::repository::{
    DayPatch, NewActivity, NewBooking, NewChecklistItem, NewCity, NewExpense, NewIdea, NewTrip,
    TripRepository,
};

struct CitySeed {
    name: &'static str,
    country: &'static str,
    start: &'static str,
    end: &'static str,
    time_zone: &'static str,
    lat: f64,
    lng: f64,
}

const CITIES: &[CitySeed] = &[
    CitySeed {
        name: "Barcelona",
        country: "Spain",
        start: "2026-03-16",
        end: "2026-03-16",
        time_zone: "Europe/Madrid",
        lat: 41.3874,
        lng: 2.1686,
    },
    CitySeed {
        name: "Beijing",
        country: "China",
        start: "2026-03-16",
        end: "2026-03-17",
        time_zone: "Asia/Shanghai",
        lat: 39.9042,
        lng: 116.4074,
    },
    CitySeed {
        name: "Tokyo",
        country: "Japan",
        start: "2026-03-17",
        end: "2026-03-31",
        time_zone: "Asia/Tokyo",
        lat: 35.6762,
        lng: 139.6503,
    },
    CitySeed {
        name: "Kyoto",
        country: "Japan",
        start: "2026-04-01",
        end: "2026-04-03",
        time_zone: "Asia/Tokyo",
        lat: 35.0116,
        lng: 135.7681,
    },
    CitySeed {
        name: "Osaka",
        country: "Japan",
        start: "2026-04-03",
        end: "2026-04-05",
        time_zone: "Asia/Tokyo",
        lat: 34.6937,
        lng: 135.5023,
    },
];

/// (date, title, city)
const DAYS: &[(&str, &str, &str)] = &[
    ("2026-03-16", "Fly BCN → PEK", "Barcelona"),
    ("2026-03-17", "PEK → Tokyo arrival", "Beijing"),
    ("2026-03-18", "Shinjuku + Omoide Yokocho", "Tokyo"),
    ("2026-03-19", "Ghibli + Kichijoji", "Tokyo"),
    ("2026-03-31", "Fly to Kyoto", "Kyoto"),
    ("2026-04-01", "Kyoto temples", "Kyoto"),
    ("2026-04-03", "Osaka food crawl", "Osaka"),
    ("2026-04-05", "Fly back to BCN", "Osaka"),
];

/// (day, title, start, location, category, city)
const ACTIVITIES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("2026-03-16", "Depart Barcelona (CA846)", "2026-03-16T11:25:00+01:00", "Barcelona T1 (BCN)", "flight", "Barcelona"),
    ("2026-03-16", "Arrive Beijing", "2026-03-17T05:30:00+08:00", "Beijing Capital T3 (PEK)", "flight", "Beijing"),
    ("2026-03-17", "Depart Beijing (CA181)", "2026-03-17T08:45:00+08:00", "Beijing Capital T3 (PEK)", "flight", "Beijing"),
    ("2026-03-17", "Arrive Tokyo", "2026-03-17T12:50:00+09:00", "Tokyo Haneda T3 (HND)", "flight", "Tokyo"),
    ("2026-03-18", "Check-in + explore", "2026-03-18T09:30:00+09:00", "Shinjuku", "travel", "Tokyo"),
    ("2026-03-18", "Omoide Yokocho lunch crawl", "2026-03-18T12:30:00+09:00", "Omoide Yokocho", "food", "Tokyo"),
    ("2026-03-18", "Tokyo Met Gov sunset", "2026-03-18T16:45:00+09:00", "Nishi-Shinjuku", "view", "Tokyo"),
    ("2026-03-19", "JR Chuo to Mitaka", "2026-03-19T08:00:00+09:00", "Mitaka", "train", "Tokyo"),
    ("2026-03-19", "Ghibli Museum entry", "2026-03-19T10:00:00+09:00", "Mitaka", "culture", "Tokyo"),
    ("2026-03-19", "Harmonica Yokocho dinner", "2026-03-19T18:30:00+09:00", "Kichijoji", "food", "Tokyo"),
    ("2026-03-31", "Shinkansen to Kyoto", "2026-03-31T10:00:00+09:00", "Tokyo Station", "train", "Kyoto"),
    ("2026-03-31", "Gion evening stroll", "2026-03-31T18:30:00+09:00", "Gion", "culture", "Kyoto"),
    ("2026-04-01", "Fushimi Inari morning", "2026-04-01T07:30:00+09:00", "Fushimi Inari", "culture", "Kyoto"),
    ("2026-04-03", "Travel to Osaka", "2026-04-03T09:00:00+09:00", "Kyoto Station", "train", "Osaka"),
    ("2026-04-03", "Dotonbori food crawl", "2026-04-03T19:00:00+09:00", "Dotonbori", "food", "Osaka"),
    ("2026-04-05", "Depart Osaka → BCN", "2026-04-05T12:00:00+09:00", "KIX", "flight", "Osaka"),
];

/// (title, done, category)
const CHECKLIST: &[(&str, bool, &str)] = &[
    ("JR Pass activated", false, "transport"),
    ("eSIM QR saved offline", true, "connectivity"),
    ("Suica loaded with ¥5000", false, "payments"),
];

/// (amount, category, note)
const EXPENSES: &[(&str, &str, &str)] = &[
    ("5000", "transport", "Suica top up"),
    ("6000", "tickets", "Ghibli tickets"),
];

/// (title, departure, location, confirmation code, note, city)
const FLIGHTS: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("CA846 Barcelona → Beijing", "2026-03-16T11:25:00+01:00", "Barcelona T1 (BCN)", "CA846-BCN", "Arrive PEK 05:30 (+08)", "Barcelona"),
    ("CA181 Beijing → Tokyo", "2026-03-17T08:45:00+08:00", "Beijing Capital T3 (PEK)", "CA181-PEK", "Arrive HND 12:50 (+09)", "Beijing"),
    ("CA168 Tokyo → Beijing", "2026-03-31T19:20:00+09:00", "Tokyo Haneda T3 (HND)", "CA168-HND", "Arrive PEK 22:20 (+08)", "Tokyo"),
    ("CA845 Beijing → Barcelona", "2026-04-01T02:50:00+08:00", "Beijing Capital T3 (PEK)", "CA845-PEK", "Arrive BCN 08:35 (+02)", "Beijing"),
];

/// (title, note, link, category, city)
const IDEAS: &[(&str, &str, &str, &str, &str)] = &[
    ("Yakitori alley in Omoide Yokocho", "Late night, cash friendly", "https://goo.gl/maps/omoide", "food", "Tokyo"),
    ("TeamLab Planets", "Reserve ahead, morning slot best", "https://planets.teamlab.art", "culture", "Tokyo"),
    ("Hōkan-ji (Yasaka Pagoda)", "Iconic pagoda in Kyoto, best at dusk", "https://maps.app.goo.gl/QnZ1w2kYEh5wWBxw8", "culture", "Kyoto"),
];

fn date(raw: &str) -> Option<NaiveDate> {
    parse_date_input(raw)
}

/// Loads the demo trip unless the database already has a trip.
/// Returns whether anything was written.
pub async fn seed_demo<R>(repo: &R) -> anyhow::Result<bool>
where
    R: TripRepository + ?Sized,
{
    if repo.count_trips().await? > 0 {
        tracing::info!("Trips already exist, skipping seed");
        return Ok(false);
    }

    let trip = repo
        .create_trip(
            NewTrip {
                name: "Japan 2026".into(),
                start_date: date("2026-03-16"),
                end_date: date("2026-04-05"),
                home_time_zone: Some("Europe/Madrid".into()),
            },
            None,
        )
        .await?;
    let trip_id = trip.trip.id;

    let mut cities = HashMap::new();
    for seed in CITIES {
        let city = repo
            .create_city(
                trip_id,
                NewCity {
                    name: seed.name.into(),
                    country: Some(seed.country.into()),
                    start_date: date(seed.start),
                    end_date: date(seed.end),
                    notes: None,
                    time_zone: Some(seed.time_zone.into()),
                    lat: Some(seed.lat),
                    lng: Some(seed.lng),
                },
            )
            .await?;
        cities.insert(seed.name, city.id);
    }

    // The calendar days already exist; give the highlighted ones a title and city.
    let days: HashMap<NaiveDate, i64> = trip
        .days
        .iter()
        .map(|detail| (detail.day.date, detail.day.id))
        .collect();
    let day_for = |raw: &str| {
        date(raw)
            .and_then(|d| days.get(&d).copied())
            .ok_or_else(|| anyhow::anyhow!("demo trip has no day {raw}"))
    };

    for (raw, title, city) in DAYS {
        repo.update_day(
            day_for(raw)?,
            DayPatch {
                title: Some((*title).into()),
                city_id: cities.get(city).copied(),
                ..Default::default()
            },
        )
        .await?;
    }

    for (raw, title, start, location, category, city) in ACTIVITIES {
        repo.create_activity(
            day_for(raw)?,
            NewActivity {
                title: (*title).into(),
                start_time: parse_instant(start),
                location: Some((*location).into()),
                category: Some((*category).into()),
                city_id: cities.get(city).copied(),
                ..Default::default()
            },
        )
        .await?;
    }

    for (title, done, category) in CHECKLIST {
        let item = repo
            .create_checklist_item(
                trip_id,
                NewChecklistItem {
                    title: (*title).into(),
                    category: Some((*category).into()),
                },
            )
            .await?;
        if *done {
            repo.toggle_checklist_item(item.id).await?;
        }
    }

    for (amount, category, note) in EXPENSES {
        repo.create_expense(
            trip_id,
            NewExpense {
                amount: (*amount).into(),
                currency: "JPY".into(),
                category: Some((*category).into()),
                note: Some((*note).into()),
                incurred_at: None,
            },
        )
        .await?;
    }

    for (title, departure, location, code, note, city) in FLIGHTS {
        repo.create_booking(
            trip_id,
            NewBooking {
                title: (*title).into(),
                kind: Some("flight".into()),
                date_time: parse_instant(departure),
                location: Some((*location).into()),
                confirmation_code: Some((*code).into()),
                note: Some((*note).into()),
                city_id: cities.get(city).copied(),
                ..Default::default()
            },
        )
        .await?;
    }

    for (title, note, link, category, city) in IDEAS {
        repo.create_idea(
            trip_id,
            NewIdea {
                title: (*title).into(),
                link: Some((*link).into()),
                note: Some((*note).into()),
                category: Some((*category).into()),
                city_id: cities.get(city).copied(),
            },
        )
        .await?;
    }

    tracing::info!(trip_id, "Seeded demo trip");
    Ok(true)
}
