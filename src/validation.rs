//! Registration request validation.
//!
//! A [`Validator`] holds an ordered list of per-field rules followed by a
//! short list of cross-field rules. Every rule runs; the violations are
//! collected in declaration order and returned together.

use crate::error::{ValidationFailure, Violation};
use crate::model::RegistrationRequest;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use validator::ValidateEmail;

/// Minimum age, in calendar years, accepted by [`ValidationProfile::MinimumAge`].
pub const MINIMUM_AGE_YEARS: i32 = 18;

/// Minimum password length, in UTF-16 code units.
pub const MIN_PASSWORD_LEN: usize = 4;

/// The two rule sets the gateway can enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationProfile {
    /// Requires `confirmPassword` to match `password` and a date of birth
    /// in the past.
    #[default]
    ConfirmPassword,
    /// Requires the registrant to be at least [`MINIMUM_AGE_YEARS`] old by
    /// year subtraction. No confirmation field.
    MinimumAge,
}

impl ValidationProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmPassword => "confirm-password",
            Self::MinimumAge => "minimum-age",
        }
    }
}

impl fmt::Display for ValidationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirm-password" | "a" => Ok(Self::ConfirmPassword),
            "minimum-age" | "b" => Ok(Self::MinimumAge),
            other => Err(format!("unknown validation profile: {other}")),
        }
    }
}

type Check = fn(&str, DateTime<Utc>) -> bool;
type CrossCheck = fn(&Map<String, Value>) -> bool;

struct Rule {
    message: &'static str,
    check: Check,
}

struct FieldSpec {
    name: &'static str,
    rules: Vec<Rule>,
}

struct CrossFieldRule {
    field: &'static str,
    message: &'static str,
    check: CrossCheck,
}

/// Validates untyped registration bodies against one [`ValidationProfile`].
pub struct Validator {
    profile: ValidationProfile,
    fields: Vec<FieldSpec>,
    cross_field: Vec<CrossFieldRule>,
}

impl Validator {
    pub fn new(profile: ValidationProfile) -> Self {
        let mut date_rules = vec![
            Rule {
                message: "Missing date of birth",
                check: not_empty,
            },
            Rule {
                message: "Invalid date of birth",
                check: |s, _| parse_date(s).is_some(),
            },
        ];
        date_rules.push(match profile {
            ValidationProfile::ConfirmPassword => Rule {
                message: "Wrong calendar",
                check: born_before_now,
            },
            ValidationProfile::MinimumAge => Rule {
                message: "Must be at least 18 years old",
                check: old_enough,
            },
        });

        let mut fields = vec![
            FieldSpec {
                name: "firstName",
                rules: vec![Rule {
                    message: "Missing firstname",
                    check: not_empty,
                }],
            },
            FieldSpec {
                name: "lastName",
                rules: vec![Rule {
                    message: "Missing lastname",
                    check: not_empty,
                }],
            },
            FieldSpec {
                name: "email",
                rules: vec![Rule {
                    message: "Invalid email",
                    check: |s, _| s.validate_email(),
                }],
            },
            FieldSpec {
                name: "dateOfBirth",
                rules: date_rules,
            },
            FieldSpec {
                name: "password",
                rules: vec![Rule {
                    message: "Password too short",
                    check: |s, _| s.encode_utf16().count() >= MIN_PASSWORD_LEN,
                }],
            },
        ];

        let mut cross_field = Vec::new();
        if profile == ValidationProfile::ConfirmPassword {
            fields.push(FieldSpec {
                name: "confirmPassword",
                rules: vec![Rule {
                    message: "Confirm password",
                    check: not_empty,
                }],
            });
            cross_field.push(CrossFieldRule {
                field: "confirmPassword",
                message: "Passwords don't match",
                check: passwords_match,
            });
        }

        Self {
            profile,
            fields,
            cross_field,
        }
    }

    /// Validates `body` against the current time.
    pub fn validate(&self, body: &Value) -> Result<RegistrationRequest, ValidationFailure> {
        self.validate_at(body, Utc::now())
    }

    /// Validates `body` as if the current time were `now`.
    pub fn validate_at(
        &self,
        body: &Value,
        now: DateTime<Utc>,
    ) -> Result<RegistrationRequest, ValidationFailure> {
        let Some(object) = body.as_object() else {
            return Err(ValidationFailure::single(Violation::new("", "Expected object")));
        };

        let mut violations = Vec::new();

        for spec in &self.fields {
            match object.get(spec.name) {
                None | Some(Value::Null) => violations.push(Violation::new(spec.name, "Required")),
                Some(Value::String(value)) => {
                    for rule in &spec.rules {
                        if !(rule.check)(value, now) {
                            violations.push(Violation::new(spec.name, rule.message));
                        }
                    }
                }
                Some(other) => violations.push(Violation::new(
                    spec.name,
                    format!("Expected string, received {}", json_kind(other)),
                )),
            }
        }

        for rule in &self.cross_field {
            if !(rule.check)(object) {
                violations.push(Violation::new(rule.field, rule.message));
            }
        }

        if let Some(failure) = ValidationFailure::from_violations(violations) {
            return Err(failure);
        }

        self.build_request(object)
            .ok_or_else(|| ValidationFailure::single(Violation::new("", "Invalid request")))
    }

    fn build_request(&self, object: &Map<String, Value>) -> Option<RegistrationRequest> {
        let confirm_password = match self.profile {
            ValidationProfile::ConfirmPassword => Some(string_field(object, "confirmPassword")?),
            ValidationProfile::MinimumAge => None,
        };

        Some(RegistrationRequest {
            first_name: string_field(object, "firstName")?,
            last_name: string_field(object, "lastName")?,
            email: string_field(object, "email")?,
            date_of_birth: parse_date(object.get("dateOfBirth")?.as_str()?)?,
            password: string_field(object, "password")?,
            confirm_password,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationProfile::default())
    }
}

fn string_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    object.get(name)?.as_str().map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn not_empty(value: &str, _now: DateTime<Utc>) -> bool {
    !value.is_empty()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// The instant `value` names: midnight UTC for a bare date, the exact
/// instant for an RFC 3339 timestamp.
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

// Unparsable dates fail every date rule, not just the parse rule.
fn born_before_now(value: &str, now: DateTime<Utc>) -> bool {
    parse_instant(value).is_some_and(|born| born < now)
}

fn old_enough(value: &str, now: DateTime<Utc>) -> bool {
    parse_date(value).is_some_and(|date| now.year() - date.year() >= MINIMUM_AGE_YEARS)
}

fn passwords_match(object: &Map<String, Value>) -> bool {
    match (
        object.get("password").and_then(Value::as_str),
        object.get("confirmPassword").and_then(Value::as_str),
    ) {
        (Some(password), Some(confirm)) => password == confirm,
        _ => true,
    }
}
