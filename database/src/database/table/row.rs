use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    consts::consts::RESERVED_KEYS,
    model::person::{Fields, Person, PersonData, PersonFieldError},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum UpdateStatement {
    Set(String),
    Unset,
    NoChanges,
}

impl UpdateStatement {
    fn apply_to(&self, field: &mut Option<String>) {
        match self {
            UpdateStatement::Set(value) => *field = Some(value.clone()),
            UpdateStatement::Unset => *field = None,
            UpdateStatement::NoChanges => {}
        }
    }

    fn from_field(fields: &mut Fields, path: &str) -> Result<Self, PersonFieldError> {
        match fields.remove(path) {
            None => Ok(UpdateStatement::NoChanges),
            Some(Value::Null) => Ok(UpdateStatement::Unset),
            Some(Value::String(s)) => Ok(UpdateStatement::Set(s)),
            Some(value) => Err(PersonFieldError::NotAString {
                path: path.to_string(),
                value,
            }),
        }
    }
}

/// Field replacements for a person, keys that are not mentioned stay untouched
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UpdatePersonData {
    pub name: UpdateStatement,
    pub image: UpdateStatement,
    pub title: UpdateStatement,
    /// Extra keys to set, values are stored as given (including null)
    pub extra: Fields,
}

impl Default for UpdatePersonData {
    fn default() -> Self {
        Self {
            name: UpdateStatement::NoChanges,
            image: UpdateStatement::NoChanges,
            title: UpdateStatement::NoChanges,
            extra: Fields::new(),
        }
    }
}

impl UpdatePersonData {
    /// An absent key leaves the field as is, `null` clears a known field
    pub fn from_fields(mut fields: Fields) -> Result<Self, PersonFieldError> {
        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        Ok(UpdatePersonData {
            name: UpdateStatement::from_field(&mut fields, "name")?,
            image: UpdateStatement::from_field(&mut fields, "image")?,
            title: UpdateStatement::from_field(&mut fields, "title")?,
            extra: fields,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name == UpdateStatement::NoChanges
            && self.image == UpdateStatement::NoChanges
            && self.title == UpdateStatement::NoChanges
            && self.extra.is_empty()
    }

    pub fn apply_to(&self, data: &PersonData) -> PersonData {
        let mut updated = data.clone();

        self.name.apply_to(&mut updated.name);
        self.image.apply_to(&mut updated.image);
        self.title.apply_to(&mut updated.title);

        for (key, value) in &self.extra {
            updated.extra.insert(key.clone(), value.clone());
        }

        updated
    }
}

pub type InsertionOrder = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    /// Position of the row in the table's insertion order index
    pub inserted_at: InsertionOrder,
    pub person: Person,
}

#[derive(Debug)]
pub struct ApplyUpdateResult {
    pub previous: Person,
    pub current: Person,
}

impl PersonRow {
    pub fn new(person: Person, inserted_at: InsertionOrder) -> Self {
        PersonRow {
            inserted_at,
            person,
        }
    }

    pub fn apply_update(&mut self, update: &UpdatePersonData) -> ApplyUpdateResult {
        let previous = self.person.clone();

        self.person.data = update.apply_to(&previous.data);

        ApplyUpdateResult {
            previous,
            current: self.person.clone(),
        }
    }
}
