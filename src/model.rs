//! Records held by the store and the request shape they are built from.

use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Years added to each date of birth by the legacy-calendar view.
pub const LEGACY_CALENDAR_OFFSET_YEARS: u32 = 543;

/// A registered person, as stored and as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
}

/// A validated registration with the password fields already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
}

/// A registration request that passed validation.
///
/// Only the validator constructs these; the handler turns them into a
/// [`NewUser`] before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub password: String,
    pub confirm_password: Option<String>,
}

impl RegistrationRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_of_birth: self.date_of_birth,
        }
    }
}

impl UserRecord {
    pub fn from_new(id: u32, user: NewUser) -> Self {
        Self {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            date_of_birth: user.date_of_birth,
            email: user.email,
        }
    }

    /// Projects the record into the `GET /users_wrong` shape.
    pub fn to_legacy_calendar(&self) -> LegacyCalendarRecord {
        LegacyCalendarRecord {
            id: self.id,
            email: self.email.clone(),
            firstname: self.first_name.clone(),
            lastname: self.last_name.clone(),
            date_of_birth: shift_to_legacy_calendar(self.date_of_birth),
        }
    }
}

/// Lower-cased name keys and a date of birth shifted by
/// [`LEGACY_CALENDAR_OFFSET_YEARS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyCalendarRecord {
    pub id: u32,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
}

// Month arithmetic clamps Feb 29 to Feb 28 when the target year is not a
// leap year. Dates too close to the calendar's upper bound are left as is.
fn shift_to_legacy_calendar(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(LEGACY_CALENDAR_OFFSET_YEARS * 12))
        .unwrap_or(date)
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// The two records the store starts with and returns to on reset.
pub fn seed_records() -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: seed_date(1980, 1, 1),
            email: "join_doe@example.com".to_string(),
        },
        UserRecord {
            id: 2,
            first_name: "Sarah".to_string(),
            last_name: "Smith".to_string(),
            date_of_birth: seed_date(1975, 7, 26),
            email: "sarah_smith@example.com".to_string(),
        },
    ]
}
