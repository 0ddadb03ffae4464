//! Request-body serializers.
//!
//! Each [`FromJson`] implementation checks one JSON object field by field,
//! collecting every failure into a [`ValidationErrors`] tree instead of
//! stopping at the first one. Checks that need the database (foreign keys,
//! email uniqueness) happen later, in the store's registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::headcount::HeadCount;
use crate::id::{ProgrammeId, UserId};
use crate::model::{NewProgramme, NewTag, Profile};
use crate::validation::{self, ValidationErrors};

const MAX_EMAIL_LEN: usize = 254;
const MAX_PERSON_NAME_LEN: usize = 150;
const MAX_PROFILE_FIELD_LEN: usize = 100;
const MAX_PROGRAMME_NAME_LEN: usize = 100;
const MAX_TAG_NAME_LEN: usize = 50;
const MAX_PASSWORD_LEN: usize = 128;

/// Builds a validated value from an untrusted JSON body.
pub trait FromJson: Sized {
    /// # Errors
    /// Returns every field error found in `value`.
    fn from_json(value: &Value) -> Result<Self, ValidationErrors>;

    /// Keys in `value` that only stored rows can vouch for.
    ///
    /// Read even when other fields are invalid, so the caller can report
    /// database errors alongside field errors. A key that fails its own
    /// syntax check is left out.
    fn lookups(_value: &Value) -> Lookups {
        Lookups::default()
    }
}

/// Well-formed keys of a body that must be checked against the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Lookups {
    /// Normalized email that must not be taken yet.
    pub email: Option<String>,
    /// Programme that must exist.
    pub programme: Option<ProgrammeId>,
    /// Creator that must exist.
    pub created_by: Option<UserId>,
}

impl Lookups {
    /// Runs `fill` over `value` when it is an object. Field errors are dropped.
    fn read(value: &Value, fill: impl FnOnce(&mut Fields<'_>, &mut Self)) -> Self {
        let mut lookups = Self::default();
        if let Ok(mut fields) = Fields::object(value) {
            fill(&mut fields, &mut lookups);
        }
        lookups
    }
}

/// Validated body of a user create request. The password is still plain.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct UserInput {
    /// Address with the domain part lower-cased.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub profile: Profile,
}

/// Validated body of a cohort create request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CohortInput {
    pub programme: ProgrammeId,
    pub cohort_size: HeadCount,
    pub created_by: UserId,
    /// `None` means "open now".
    pub open_date: Option<DateTime<Utc>>,
}

impl FromJson for UserInput {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::object(value)?;
        let email = fields.email("email");
        let first_name = fields.required_string("first_name", MAX_PERSON_NAME_LEN);
        let last_name = fields.required_string("last_name", MAX_PERSON_NAME_LEN);
        let password = fields.required_string("password", MAX_PASSWORD_LEN);
        let profile = fields.nested::<Profile>("profile");

        match (email, first_name, last_name, password, profile) {
            (Some(email), Some(first_name), Some(last_name), Some(password), Some(profile)) => {
                fields.finish(Self { email, first_name, last_name, password, profile })
            }
            _ => Err(fields.into_errors()),
        }
    }

    fn lookups(value: &Value) -> Lookups {
        Lookups::read(value, |fields, found| found.email = fields.email("email"))
    }
}

impl FromJson for Profile {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::object(value)?;
        let position = fields.required_string("position", MAX_PROFILE_FIELD_LEN);
        let department = fields.required_string("department", MAX_PROFILE_FIELD_LEN);
        let date_of_birth = fields.date("dateOfBirth");
        let join_date = fields.date("joinDate");
        let bio = fields.optional_string("bio");

        match (position, department, date_of_birth, join_date) {
            (Some(position), Some(department), Some(date_of_birth), Some(join_date)) => fields
                .finish(Profile::new(
                    position,
                    department,
                    date_of_birth,
                    join_date,
                    bio.unwrap_or_default(),
                )),
            _ => Err(fields.into_errors()),
        }
    }
}

impl FromJson for NewProgramme {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::object(value)?;
        let name = fields.required_string("name", MAX_PROGRAMME_NAME_LEN);
        let description = fields.required_string("description", usize::MAX);
        let default_cohort_size = fields.head_count("defaultCohortSize");
        let created_by = fields.pk("createdBy").map(UserId::new);

        match (name, description, default_cohort_size, created_by) {
            (Some(name), Some(description), Some(size), Some(created_by)) => {
                fields.finish(NewProgramme::new(name, description, size, created_by))
            }
            _ => Err(fields.into_errors()),
        }
    }

    fn lookups(value: &Value) -> Lookups {
        Lookups::read(value, |fields, found| {
            found.created_by = fields.pk("createdBy").map(UserId::new);
        })
    }
}

impl FromJson for CohortInput {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::object(value)?;
        let programme = fields.pk("programme").map(ProgrammeId::new);
        let cohort_size = fields.head_count("cohortSize");
        let created_by = fields.pk("createdBy").map(UserId::new);
        let open_date = fields.optional_datetime("openDate");

        match (programme, cohort_size, created_by) {
            (Some(programme), Some(cohort_size), Some(created_by)) => {
                fields.finish(Self { programme, cohort_size, created_by, open_date })
            }
            _ => Err(fields.into_errors()),
        }
    }

    fn lookups(value: &Value) -> Lookups {
        Lookups::read(value, |fields, found| {
            found.programme = fields.pk("programme").map(ProgrammeId::new);
            found.created_by = fields.pk("createdBy").map(UserId::new);
        })
    }
}

impl FromJson for NewTag {
    fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::object(value)?;
        match fields.required_string("name", MAX_TAG_NAME_LEN) {
            Some(name) => fields.finish(NewTag::new(name)),
            None => Err(fields.into_errors()),
        }
    }
}

/// Name of a JSON value's kind, as reported in type errors.
#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field-by-field reader over a JSON object.
///
/// Every extractor returns `None` exactly when it has recorded an error.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    fn object(value: &'a Value) -> Result<Self, ValidationErrors> {
        match value {
            Value::Object(map) => Ok(Self { map, errors: ValidationErrors::new() }),
            other => Err(ValidationErrors::non_field(format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_kind(other)
            ))),
        }
    }

    /// Present, non-null value of a required field.
    fn present(&mut self, name: &str) -> Option<&'a Value> {
        let map = self.map;
        match map.get(name) {
            None => {
                self.errors.add(name, validation::REQUIRED);
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, validation::NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn required_string(&mut self, name: &str, max_len: usize) -> Option<String> {
        let Value::String(raw) = self.present(name)? else {
            self.errors.add(name, validation::NOT_A_STRING);
            return None;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.errors.add(name, validation::NOT_BLANK);
            return None;
        }
        if trimmed.chars().count() > max_len {
            self.errors.add(name, validation::too_long(max_len));
            return None;
        }
        Some(trimmed.to_owned())
    }

    /// Missing and null read as `None` without an error.
    fn optional_string(&mut self, name: &str) -> Option<String> {
        let map = self.map;
        match map.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw.trim().to_owned()),
            Some(_) => {
                self.errors.add(name, validation::NOT_A_STRING);
                None
            }
        }
    }

    fn email(&mut self, name: &str) -> Option<String> {
        let raw = self.required_string(name, MAX_EMAIL_LEN)?;
        match normalize_email(&raw) {
            Some(email) => Some(email),
            None => {
                self.errors.add(name, validation::INVALID_EMAIL);
                None
            }
        }
    }

    fn integer(&mut self, name: &str) -> Option<i64> {
        let parsed = match self.present(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, validation::INVALID_INTEGER);
        }
        parsed
    }

    fn head_count(&mut self, name: &str) -> Option<HeadCount> {
        let raw = self.integer(name)?;
        match HeadCount::new(raw) {
            Ok(count) => Some(count),
            Err(_) if raw < 1 => {
                self.errors.add(name, validation::MIN_ONE);
                None
            }
            Err(_) => {
                self.errors.add(name, validation::too_large(u64::from(u32::MAX)));
                None
            }
        }
    }

    fn pk(&mut self, name: &str) -> Option<i64> {
        let value = self.present(name)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, validation::incorrect_pk_type(json_kind(value)));
        }
        parsed
    }

    fn date(&mut self, name: &str) -> Option<NaiveDate> {
        let parsed = match self.present(name)? {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, validation::INVALID_DATE);
        }
        parsed
    }

    fn optional_datetime(&mut self, name: &str) -> Option<DateTime<Utc>> {
        let map = self.map;
        let parsed = match map.get(name) {
            None | Some(Value::Null) => return None,
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Some(_) => None,
        };
        if parsed.is_none() {
            self.errors.add(name, validation::INVALID_DATETIME);
        }
        parsed
    }

    fn nested<T: FromJson>(&mut self, name: &str) -> Option<T> {
        let value = self.present(name)?;
        match T::from_json(value) {
            Ok(parsed) => Some(parsed),
            Err(errors) => {
                self.errors.nest(name, errors);
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        self.errors.into_result(value)
    }

    fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

/// Checks the `local@domain.tld` shape and lower-cases the domain.
fn normalize_email(raw: &str) -> Option<String> {
    if raw.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = raw.rsplit_once('@')?;
    if local.is_empty() || local.contains('@') {
        return None;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return None;
    }
    Some(format!("{local}@{}", domain.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fixtures;

    #[test]
    fn cohort_lookups_survive_other_field_errors() {
        let body = json!({"programme": "12", "cohortSize": 0, "createdBy": true});
        assert!(CohortInput::from_json(&body).is_err());

        let lookups = CohortInput::lookups(&body);
        assert_eq!(lookups.programme, Some(ProgrammeId::new(12)));
        assert_eq!(lookups.created_by, None, "malformed pk must be left out");
        assert_eq!(lookups.email, None);
    }

    #[test]
    fn user_lookups_normalize_email_even_when_body_is_invalid() {
        let mut body = fixtures::sample_user_body();
        body["first_name"] = json!("");
        body["email"] = json!("Jo@Example.ORG");
        assert!(UserInput::from_json(&body).is_err());
        assert_eq!(UserInput::lookups(&body).email.as_deref(), Some("Jo@example.org"));
        assert_eq!(UserInput::lookups(&json!([1, 2])), Lookups::default());
    }

    #[test]
    fn user_input_accepts_sample_user() {
        let input = match UserInput::from_json(&fixtures::sample_user_body()) {
            Ok(input) => input,
            Err(e) => panic!("sample user must validate: {e}"),
        };
        assert_eq!(input.email, "test@example.com");
        assert_eq!(input.first_name, "John");
        assert_eq!(input.profile.department, "HR");
        assert_eq!(input.profile.date_of_birth.to_string(), "2000-11-30");
    }

    #[test]
    fn user_input_lowercases_email_domain_only() {
        let mut body = fixtures::sample_user_body();
        body["email"] = json!("John.Smith@Example.COM");
        let input = match UserInput::from_json(&body) {
            Ok(input) => input,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(input.email, "John.Smith@example.com");
    }

    #[test]
    fn user_input_collects_all_field_errors() {
        let body = json!({
            "email": "not-an-email",
            "first_name": "",
            "password": 12,
            "profile": {"position": "Consultant", "department": "HR", "dateOfBirth": "30/11/2000"}
        });
        let errors = match UserInput::from_json(&body) {
            Ok(input) => panic!("invalid body accepted: {input:?}"),
            Err(errors) => errors,
        };
        assert_eq!(errors.messages("email"), [validation::INVALID_EMAIL]);
        assert_eq!(errors.messages("first_name"), [validation::NOT_BLANK]);
        assert_eq!(errors.messages("last_name"), [validation::REQUIRED]);
        assert_eq!(errors.messages("password"), [validation::NOT_A_STRING]);

        let profile = match errors.nested("profile") {
            Some(p) => p,
            None => panic!("profile errors must nest, got {errors}"),
        };
        assert_eq!(profile.messages("dateOfBirth"), [validation::INVALID_DATE]);
        assert_eq!(profile.messages("joinDate"), [validation::REQUIRED]);
        assert!(profile.get("position").is_none());
    }

    #[test]
    fn user_input_rejects_non_object_body() {
        let errors = match UserInput::from_json(&json!([1, 2])) {
            Ok(_) => panic!("array body accepted"),
            Err(errors) => errors,
        };
        assert_eq!(
            errors.messages(validation::NON_FIELD_ERRORS),
            ["Invalid data. Expected a dictionary, but got array."]
        );
    }

    #[test]
    fn profile_bio_is_optional() {
        let body = json!({
            "position": "Consultant",
            "department": "HR",
            "dateOfBirth": "2000-11-30",
            "joinDate": "2016-01-03"
        });
        let profile = match Profile::from_json(&body) {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert!(profile.bio.is_empty());
    }

    #[test]
    fn programme_rejects_zero_default_size_and_bad_creator() {
        let body = json!({
            "name": "Test Programme",
            "description": "This is a test programme.",
            "defaultCohortSize": 0,
            "createdBy": true
        });
        let errors = match NewProgramme::from_json(&body) {
            Ok(p) => panic!("invalid programme accepted: {p:?}"),
            Err(errors) => errors,
        };
        assert_eq!(errors.messages("defaultCohortSize"), [validation::MIN_ONE]);
        assert_eq!(
            errors.messages("createdBy"),
            ["Incorrect type. Expected pk value, received boolean."]
        );
    }

    #[test]
    fn cohort_input_open_date_is_optional() {
        let body = json!({"programme": 1, "cohortSize": 200, "createdBy": "1"});
        let input = match CohortInput::from_json(&body) {
            Ok(input) => input,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(input.programme, ProgrammeId::new(1));
        assert_eq!(input.created_by, UserId::new(1));
        assert_eq!(input.cohort_size.value(), 200);
        assert!(input.open_date.is_none());
    }

    #[test]
    fn cohort_input_parses_rfc3339_open_date() {
        let body = json!({
            "programme": 1,
            "cohortSize": 10,
            "createdBy": 1,
            "openDate": "2016-09-01T09:00:00+01:00"
        });
        let input = match CohortInput::from_json(&body) {
            Ok(input) => input,
            Err(e) => panic!("unexpected error: {e}"),
        };
        let open = input.open_date.map(|d| d.to_rfc3339());
        assert_eq!(open.as_deref(), Some("2016-09-01T08:00:00+00:00"));
    }

    #[test]
    fn cohort_input_rejects_bad_size_and_date() {
        let body = json!({
            "programme": 1,
            "cohortSize": "lots",
            "createdBy": 1,
            "openDate": "tomorrow"
        });
        let errors = match CohortInput::from_json(&body) {
            Ok(input) => panic!("invalid cohort accepted: {input:?}"),
            Err(errors) => errors,
        };
        assert_eq!(errors.messages("cohortSize"), [validation::INVALID_INTEGER]);
        assert_eq!(errors.messages("openDate"), [validation::INVALID_DATETIME]);
    }

    #[test]
    fn tag_name_length_is_bounded() {
        let body = json!({"name": "x".repeat(MAX_TAG_NAME_LEN + 1)});
        let errors = match NewTag::from_json(&body) {
            Ok(tag) => panic!("overlong tag accepted: {tag:?}"),
            Err(errors) => errors,
        };
        assert_eq!(errors.messages("name"), [validation::too_long(MAX_TAG_NAME_LEN)]);
    }

    #[test]
    fn tag_name_null_is_reported() {
        let errors = match NewTag::from_json(&json!({"name": null})) {
            Ok(tag) => panic!("null tag accepted: {tag:?}"),
            Err(errors) => errors,
        };
        assert_eq!(errors.messages("name"), [validation::NOT_NULL]);
    }

    #[test]
    fn normalize_email_shapes() {
        assert_eq!(normalize_email("a@b.co").as_deref(), Some("a@b.co"));
        assert!(normalize_email("a@b").is_none());
        assert!(normalize_email("@b.co").is_none());
        assert!(normalize_email("a@@b.co").is_none());
        assert!(normalize_email("a b@c.io").is_none());
        assert!(normalize_email("a@b..io").is_none());
    }
}
