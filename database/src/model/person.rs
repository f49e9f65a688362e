use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::consts::consts::{EntityId, RESERVED_KEYS};

/// Untyped JSON object, as submitted by a client or read back from a document store
pub type Fields = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersonFieldError {
    #[error("Cast to string failed for value \"{value}\" at path \"{path}\"")]
    NotAString { path: String, value: Value },
}

impl PersonFieldError {
    pub fn path(&self) -> &str {
        match self {
            PersonFieldError::NotAString { path, .. } => path,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            PersonFieldError::NotAString { value, .. } => value,
        }
    }
}

/// Everything about a person except its identifier
///
/// `name`, `image` and `title` are the known text fields, any other key the client sent
/// is kept as-is in `extra`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PersonData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl PersonData {
    pub fn new(name: Option<&str>, image: Option<&str>, title: Option<&str>) -> Self {
        PersonData {
            name: name.map(String::from),
            image: image.map(String::from),
            title: title.map(String::from),
            extra: Fields::new(),
        }
    }

    /// Builds the candidate person from a JSON object. Reserved identifier keys are dropped,
    /// known fields must be strings (or null, which means absent).
    pub fn from_fields(mut fields: Fields) -> Result<Self, PersonFieldError> {
        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        let name = take_text_field(&mut fields, "name")?;
        let image = take_text_field(&mut fields, "image")?;
        let title = take_text_field(&mut fields, "title")?;

        Ok(PersonData {
            name,
            image,
            title,
            extra: fields,
        })
    }
}

fn take_text_field(fields: &mut Fields, path: &str) -> Result<Option<String>, PersonFieldError> {
    match fields.remove(path) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(value) => Err(PersonFieldError::NotAString {
            path: path.to_string(),
            value,
        }),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: EntityId,
    #[serde(flatten)]
    pub data: PersonData,
}

impl Person {
    pub fn new(data: PersonData) -> Self {
        Person {
            id: EntityId::new(),
            data,
        }
    }

    pub fn new_test() -> Self {
        Person::new(PersonData::new(
            Some("Ada"),
            Some("ada.png"),
            Some("Engineer"),
        ))
    }
}
