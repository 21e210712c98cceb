//! User profiles.
//!
//! # Design
//! The service API hands out two shapes of the same profile: the core one
//! (identity and contact fields) and the extended one, which adds the
//! collections the platform learns about a user. `UserProfile` therefore
//! embeds a `CoreUserProfile` instead of repeating its fields.
//!
//! Collections are plain `Vec`s, so "absent" and "empty" are the same thing
//! once a profile is constructed. Email and locale are validated on decode;
//! a profile that fails validation is rejected with a value-class error.
//!
//! `update` replaces the receiver's state with an owned `other` and hands the
//! receiver back, so there is never shared state between the two profiles.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::codec::{list_to_repr, opt, Fields, Repr};
use crate::error::DecodeError;
use crate::model::norm::Norm;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([\.-]?\w+)*@\w+([\.-]?\w+)*(\.\w+)+$").expect("email pattern is valid")
});

static LOCALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(?:[_-][A-Za-z]{4})?(?:[_-](?:[A-Za-z]{2}|[0-9]{3}))?$")
        .expect("locale pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_locale(locale: &str) -> bool {
    LOCALE.is_match(locale)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            other => Err(DecodeError::InvalidValue {
                kind: "gender",
                value: other.to_string(),
            }),
        }
    }
}

/// Field-visibility scopes granted to an app over a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Id,
    FirstName,
    MiddleName,
    LastName,
    PrefixName,
    SuffixName,
    Birthdate,
    Gender,
    Email,
    PhoneNumber,
    Locale,
    Nationality,
}

impl Scope {
    fn profile_field(self) -> Option<&'static str> {
        match self {
            Scope::Id => Some("id"),
            Scope::Birthdate => Some("dateOfBirth"),
            Scope::Gender => Some("gender"),
            Scope::Nationality => Some("nationality"),
            Scope::Locale => Some("locale"),
            Scope::PhoneNumber => Some("phoneNumber"),
            Scope::Email => Some("email"),
            _ => None,
        }
    }

    fn name_field(self) -> Option<&'static str> {
        match self {
            Scope::FirstName => Some("first"),
            Scope::MiddleName => Some("middle"),
            Scope::LastName => Some("last"),
            Scope::PrefixName => Some("prefix"),
            Scope::SuffixName => Some("suffix"),
            _ => None,
        }
    }
}

/// Copy the scoped keys of `repr` into a new object.
fn filter_repr(repr: &Value, scopes: &[Scope], field: fn(Scope) -> Option<&'static str>) -> Map<String, Value> {
    scopes
        .iter()
        .filter_map(|scope| field(*scope))
        .map(|key| (key.to_string(), repr.get(key).cloned().unwrap_or(Value::Null)))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserName {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl UserName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: Some(first.into()),
            last: Some(last.into()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn to_filtered_repr(&self, scopes: &[Scope]) -> Value {
        Value::Object(filter_repr(&self.to_repr(), scopes, Scope::name_field))
    }
}

impl Repr for UserName {
    fn to_repr(&self) -> Value {
        json!({
            "first": opt(&self.first),
            "middle": opt(&self.middle),
            "last": opt(&self.last),
            "prefix": opt(&self.prefix),
            "suffix": opt(&self.suffix),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("user name", raw)?;
        Ok(Self {
            first: fields.opt_str("first")?,
            middle: fields.opt_str("middle")?,
            last: fields.opt_str("last")?,
            prefix: fields.opt_str("prefix")?,
            suffix: fields.opt_str("suffix")?,
        })
    }
}

/// A possibly partial calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Date {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The calendar date, when all parts are present and form a real date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month(), date.day())
    }
}

impl Repr for Date {
    fn to_repr(&self) -> Value {
        json!({
            "year": opt(&self.year),
            "month": opt(&self.month),
            "day": opt(&self.day),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("date", raw)?;
        let part = |key: &'static str| -> Result<Option<i64>, DecodeError> { fields.opt_i64(key) };
        let narrow = |key: &'static str, value: Option<i64>| {
            value
                .map(|v| {
                    u32::try_from(v).map_err(|_| DecodeError::InvalidValue {
                        kind: key,
                        value: v.to_string(),
                    })
                })
                .transpose()
        };
        let year = part("year")?
            .map(|y| {
                i32::try_from(y).map_err(|_| DecodeError::InvalidValue {
                    kind: "year",
                    value: y.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            year,
            month: narrow("month", part("month")?)?,
            day: narrow("day", part("day")?)?,
        })
    }
}

/// Identity and contact part of a profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreUserProfile {
    pub profile_id: Option<String>,
    pub name: UserName,
    pub date_of_birth: Option<Date>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub locale: Option<String>,
    pub avatar: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub creation_ts: Option<i64>,
    pub last_update_ts: Option<i64>,
}

impl CoreUserProfile {
    /// A profile carrying nothing but its id.
    pub fn empty(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: Some(profile_id.into()),
            date_of_birth: Some(Date::empty()),
            ..Self::default()
        }
    }

    /// Check the fields whose content is constrained.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                return Err(DecodeError::InvalidValue {
                    kind: "email",
                    value: email.to_string(),
                });
            }
        }
        if let Some(locale) = self.locale.as_deref().filter(|l| !l.is_empty()) {
            if !is_valid_locale(locale) {
                return Err(DecodeError::InvalidValue {
                    kind: "locale",
                    value: locale.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Decode, taking the id from `profile_id` instead of the body.
    pub fn from_repr_with_id(raw: &Value, profile_id: &str) -> Result<Self, DecodeError> {
        let mut profile = Self::from_repr(raw)?;
        profile.profile_id = Some(profile_id.to_string());
        Ok(profile)
    }

    /// Replace every field with the ones of `other`.
    pub fn update(&mut self, other: CoreUserProfile) -> &mut Self {
        *self = other;
        self
    }

    /// The name restricted to its scoped parts, plus the scoped fields.
    pub fn to_filtered_repr(&self, scopes: &[Scope]) -> Value {
        let mut result = Map::new();
        result.insert("name".to_string(), self.name.to_filtered_repr(scopes));
        result.extend(filter_repr(&self.to_repr(), scopes, Scope::profile_field));
        Value::Object(result)
    }

    pub fn to_public_repr(&self) -> Value {
        self.to_filtered_repr(&[Scope::Id, Scope::FirstName, Scope::LastName])
    }

    fn decode(fields: &Fields<'_>) -> Result<Self, DecodeError> {
        let profile = Self {
            profile_id: fields.opt_str("id")?,
            name: fields.opt_entity("name")?.unwrap_or_default(),
            date_of_birth: fields.opt_entity("dateOfBirth")?,
            gender: fields
                .opt_str("gender")?
                .filter(|g| !g.is_empty())
                .map(|g| g.parse())
                .transpose()?,
            email: fields.opt_str("email")?,
            phone_number: fields.opt_str("phoneNumber")?,
            locale: fields.opt_str("locale")?,
            avatar: fields.opt_str("avatar")?,
            nationality: fields.opt_str("nationality")?,
            occupation: fields.opt_str("occupation")?,
            creation_ts: fields.opt_i64("_creationTs")?,
            last_update_ts: fields.opt_i64("_lastUpdateTs")?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

impl Repr for CoreUserProfile {
    fn to_repr(&self) -> Value {
        json!({
            "id": opt(&self.profile_id),
            "name": self.name.to_repr(),
            "dateOfBirth": self.date_of_birth.map(|d| d.to_repr()).unwrap_or(Value::Null),
            "gender": self.gender.map(|g| Value::from(g.as_str())).unwrap_or(Value::Null),
            "email": opt(&self.email),
            "phoneNumber": opt(&self.phone_number),
            "locale": opt(&self.locale),
            "avatar": opt(&self.avatar),
            "nationality": opt(&self.nationality),
            "occupation": opt(&self.occupation),
            "_creationTs": opt(&self.creation_ts),
            "_lastUpdateTs": opt(&self.last_update_ts),
        })
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        Self::decode(&Fields::of("user profile", raw)?)
    }
}

/// Extended profile: the core fields plus what the platform knows about the
/// user. Collection items other than norms are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub core: CoreUserProfile,
    pub norms: Vec<Norm>,
    pub planned_activities: Vec<Value>,
    pub relevant_locations: Vec<Value>,
    pub relationships: Vec<Value>,
    pub personal_behaviours: Vec<Value>,
    pub materials: Vec<Value>,
    pub competences: Vec<Value>,
    pub meanings: Vec<Value>,
}

impl UserProfile {
    pub fn empty(profile_id: impl Into<String>) -> Self {
        Self::from_core(CoreUserProfile::empty(profile_id))
    }

    /// Lift a core profile, with every collection empty.
    pub fn from_core(core: CoreUserProfile) -> Self {
        Self {
            core,
            ..Self::default()
        }
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.core.profile_id.as_deref()
    }

    pub fn from_repr_with_id(raw: &Value, profile_id: &str) -> Result<Self, DecodeError> {
        let mut profile = Self::from_repr(raw)?;
        profile.core.profile_id = Some(profile_id.to_string());
        Ok(profile)
    }

    /// Replace the whole profile with `other`.
    pub fn update(&mut self, other: UserProfile) -> &mut Self {
        *self = other;
        self
    }

    /// Replace the core fields only; collections are kept.
    pub fn update_core(&mut self, other: CoreUserProfile) -> &mut Self {
        self.core.update(other);
        self
    }
}

impl Repr for UserProfile {
    fn to_repr(&self) -> Value {
        let mut repr = self.core.to_repr();
        if let Value::Object(map) = &mut repr {
            map.insert("norms".to_string(), list_to_repr(&self.norms));
            map.insert("plannedActivities".to_string(), Value::from(self.planned_activities.clone()));
            map.insert("relevantLocations".to_string(), Value::from(self.relevant_locations.clone()));
            map.insert("relationships".to_string(), Value::from(self.relationships.clone()));
            map.insert("personalBehaviors".to_string(), Value::from(self.personal_behaviours.clone()));
            map.insert("materials".to_string(), Value::from(self.materials.clone()));
            map.insert("competences".to_string(), Value::from(self.competences.clone()));
            map.insert("meanings".to_string(), Value::from(self.meanings.clone()));
        }
        repr
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("user profile", raw)?;
        Ok(Self {
            core: CoreUserProfile::decode(&fields)?,
            norms: fields.list("norms")?,
            planned_activities: fields.values("plannedActivities")?,
            relevant_locations: fields.values("relevantLocations")?,
            relationships: fields.values("relationships")?,
            personal_behaviours: fields.values("personalBehaviors")?,
            materials: fields.values("materials")?,
            competences: fields.values("competences")?,
            meanings: fields.values("meanings")?,
        })
    }
}
