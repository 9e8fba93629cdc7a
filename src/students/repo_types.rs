use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Student as seen by the service layer and returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub gender: String,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<OffsetDateTime>,
    pub updated_by: String,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<OffsetDateTime>,
}

/// Row in the `student` table; every column except the key may be NULL.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StudentRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub created_by: Option<String>,
    pub created_on: Option<OffsetDateTime>,
    pub updated_by: Option<String>,
    pub updated_on: Option<OffsetDateTime>,
}

/// Empty text is stored as NULL so the two directions agree.
fn nullable(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl From<StudentRow> for Student {
    fn from(r: StudentRow) -> Self {
        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            address: r.address.unwrap_or_default(),
            gender: r.gender.unwrap_or_default(),
            created_by: r.created_by.unwrap_or_default(),
            created_on: r.created_on,
            updated_by: r.updated_by.unwrap_or_default(),
            updated_on: r.updated_on,
        }
    }
}

impl From<&Student> for StudentRow {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id.clone(),
            name: nullable(&s.name),
            email: nullable(&s.email),
            gender: nullable(&s.gender),
            address: nullable(&s.address),
            created_by: nullable(&s.created_by),
            created_on: s.created_on,
            updated_by: nullable(&s.updated_by),
            updated_on: s.updated_on,
        }
    }
}
