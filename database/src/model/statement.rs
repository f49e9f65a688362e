use serde::{Deserialize, Serialize};

use crate::{consts::consts::EntityId, database::table::row::UpdatePersonData};

use super::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    Add(Person),
    Update(EntityId, UpdatePersonData),
    Remove(EntityId),
    /// Returns every live person in insertion order
    List,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::Remove(_) | Statement::Update(_, _) => true,
            Statement::List => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    /// Add always produces the stored person
    Single(Person),
    /// Update / remove produce nothing when the id does not match a live row
    Optional(Option<Person>),
    List(Vec<Person>),
}
