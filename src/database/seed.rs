use chrono::{DateTime, Months, Utc};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::database::{activities_repo, attendees_repo, timestamps, user_repo};

pub const SEED_PASSWORD: &str = "Pa$$w0rd";

const SEED_USERS: &[(&str, &str)] = &[
    ("Bob", "bob@test.com"),
    ("Tom", "tom@test.com"),
    ("Jane", "jane@test.com"),
];

struct SeedActivity {
    title: &'static str,
    months: i32,
    description: &'static str,
    category: &'static str,
    city: &'static str,
    venue: &'static str,
    latitude: f64,
    longitude: f64,
    // (index into SEED_USERS, is_host); the host comes first
    attendees: &'static [(usize, bool)],
}

const SEED_ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        title: "Past Activity 1",
        months: -2,
        description: "Activity 2 months ago",
        category: "drinks",
        city: "London",
        venue: "The Lamb and Flag, 33, Rose Street, Seven Dials, Covent Garden, London, Greater London, England, WC2E 9EB, United Kingdom",
        latitude: 51.51171665,
        longitude: -0.1256611057818921,
        attendees: &[(0, true), (1, false)],
    },
    SeedActivity {
        title: "Past Activity 2",
        months: -1,
        description: "Activity 1 month ago",
        category: "culture",
        city: "Paris",
        venue: "Louvre Museum, Rue Saint-Honoré, Quartier du Palais Royal, 1st Arrondissement, Paris, Ile-de-France, Metropolitan France, 75001, France",
        latitude: 48.8611473,
        longitude: 2.33802768704666,
        attendees: &[(1, true), (2, false), (0, false)],
    },
    SeedActivity {
        title: "Future Activity 1",
        months: 1,
        description: "Activity 1 month in future",
        category: "culture",
        city: "London",
        venue: "Natural History Museum",
        latitude: 51.496510900000004,
        longitude: -0.17600190725447445,
        attendees: &[(2, true)],
    },
    SeedActivity {
        title: "Future Activity 2",
        months: 2,
        description: "Activity 2 months in future",
        category: "music",
        city: "London",
        venue: "The O2",
        latitude: 51.502936649999995,
        longitude: 0.0032029278126681844,
        attendees: &[(0, true), (2, false)],
    },
    SeedActivity {
        title: "Future Activity 3",
        months: 3,
        description: "Activity 3 months in future",
        category: "drinks",
        city: "London",
        venue: "The Mayflower",
        latitude: 51.501778,
        longitude: -0.053577,
        attendees: &[(1, true)],
    },
    SeedActivity {
        title: "Future Activity 4",
        months: 4,
        description: "Activity 4 months in future",
        category: "drinks",
        city: "London",
        venue: "The Blackfriar",
        latitude: 51.512146650000005,
        longitude: -0.10364680647106028,
        attendees: &[(2, true), (0, false)],
    },
    SeedActivity {
        title: "Future Activity 5",
        months: 5,
        description: "Activity 5 months in future",
        category: "culture",
        city: "London",
        venue: "Sherlock Holmes Museum, 221b, Baker Street, Marylebone, London, Greater London, England, NW1 6XE, United Kingdom",
        latitude: 51.5237629,
        longitude: -0.1584743,
        attendees: &[(0, true)],
    },
    SeedActivity {
        title: "Future Activity 6",
        months: 6,
        description: "Activity 6 months in future",
        category: "music",
        city: "London",
        venue: "Roundhouse, Chalk Farm Road, Maitland Park, Chalk Farm, London Borough of Camden, London, Greater London, England, NW1 8EH, United Kingdom",
        latitude: 51.5432505,
        longitude: -0.15197608174931165,
        attendees: &[(1, true), (0, false)],
    },
    SeedActivity {
        title: "Future Activity 7",
        months: 7,
        description: "Activity 7 months in future",
        category: "travel",
        city: "London",
        venue: "River Thames, England, United Kingdom",
        latitude: 51.5575525,
        longitude: -0.781404,
        attendees: &[(2, true), (1, false)],
    },
    SeedActivity {
        title: "Future Activity 8",
        months: 8,
        description: "Activity 8 months in future",
        category: "film",
        city: "London",
        venue: "Odeon Leicester Square",
        latitude: 51.5575525,
        longitude: -0.781404,
        attendees: &[(0, true)],
    },
];

#[derive(Debug, Default)]
pub struct SeedReport {
    pub users_created: usize,
    pub activities_created: usize,
}

fn months_from(now: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    let shifted = if months >= 0 {
        now.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        now.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(now)
}

/// Seeds demo users (only into an empty user table) and demo activities
/// (only into an empty activity table). `password_hash` is shared by all
/// seeded users.
pub async fn seed_data(pool: &SqlitePool, password_hash: &str) -> sqlx::Result<SeedReport> {
    let mut report = SeedReport::default();
    let created_at = timestamps::now();

    if user_repo::count_users(pool).await? == 0 {
        for (display_name, email) in SEED_USERS {
            let id = Uuid::new_v4().to_string();
            user_repo::insert_user(
                pool,
                user_repo::NewUser {
                    id: &id,
                    email,
                    display_name,
                    password_hash,
                    email_confirmed: true,
                    created_at: &created_at,
                },
            )
            .await?;
            report.users_created += 1;
        }
    }

    if activities_repo::count_activities(pool).await? > 0 {
        return Ok(report);
    }

    let mut user_ids = Vec::with_capacity(SEED_USERS.len());
    for (_, email) in SEED_USERS {
        match user_repo::load_user_by_email(pool, email).await? {
            Some(user) => user_ids.push(user.id),
            None => {
                warn!(email = %email, "seed user missing, skipping activity seed");
                return Ok(report);
            }
        }
    }

    let now = Utc::now();
    for seed in SEED_ACTIVITIES {
        let id = Uuid::new_v4().to_string();
        let date = timestamps::to_db(months_from(now, seed.months));
        let fields = activities_repo::ActivityFields {
            title: seed.title,
            date: &date,
            description: seed.description,
            category: seed.category,
            city: seed.city,
            venue: seed.venue,
            latitude: seed.latitude,
            longitude: seed.longitude,
        };

        let Some(((host_index, _), guests)) = seed.attendees.split_first() else {
            continue;
        };
        activities_repo::insert_activity_with_host(
            pool,
            &id,
            &fields,
            &user_ids[*host_index],
            &created_at,
        )
        .await?;
        for (guest_index, is_host) in guests {
            attendees_repo::insert_attendee(pool, &id, &user_ids[*guest_index], *is_host, &created_at)
                .await?;
        }
        report.activities_created += 1;
    }

    Ok(report)
}
