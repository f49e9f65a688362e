use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

use super::row::{ApplyUpdateResult, InsertionOrder, PersonRow};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    #[error("Cannot create, record id was used by a deleted record: {0}")]
    CannotCreateWhenPreviouslyDeleted(EntityId),
}

#[derive(Default)]
pub struct PersonTable {
    pub person_rows: HashMap<EntityId, PersonRow>,
    /// Used by list, keeps the rows in the order they were added
    pub insertion_order_index: BTreeMap<InsertionOrder, EntityId>,
    /// Ids of removed rows, an id is never handed out twice
    pub deleted_ids: HashSet<EntityId>,
    next_insertion: InsertionOrder,
}

impl PersonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the constraints of a statement without changing the table
    pub fn verify(&self, statement: &Statement) -> Result<(), ApplyErrors> {
        if let Statement::Add(person) = statement {
            if self.person_rows.contains_key(&person.id) {
                return Err(ApplyErrors::CannotCreateWhenAlreadyExists(
                    person.id.clone(),
                ));
            }

            if self.deleted_ids.contains(&person.id) {
                return Err(ApplyErrors::CannotCreateWhenPreviouslyDeleted(
                    person.id.clone(),
                ));
            }
        }

        Ok(())
    }

    // Each statement can be broken up into 3 steps
    //  - Verifying validity / constraints (uniqueness)
    //  - Applying statement
    //  - Clean up (indexes)
    pub fn apply(&mut self, statement: Statement) -> Result<StatementResult, ApplyErrors> {
        self.verify(&statement)?;

        let statement_result = match statement {
            Statement::Add(person) => {
                let id = person.id.clone();
                let inserted_at = self.next_insertion;

                self.next_insertion += 1;

                self.person_rows
                    .insert(id.clone(), PersonRow::new(person.clone(), inserted_at));

                self.insertion_order_index.insert(inserted_at, id);

                StatementResult::Single(person)
            }
            Statement::Update(id, update_person) => match self.person_rows.get_mut(&id) {
                Some(person_row) => {
                    let ApplyUpdateResult { current, .. } =
                        person_row.apply_update(&update_person);

                    StatementResult::Optional(Some(current))
                }
                None => StatementResult::Optional(None),
            },
            Statement::Remove(id) => match self.person_rows.remove(&id) {
                Some(PersonRow {
                    inserted_at,
                    person,
                }) => {
                    self.insertion_order_index.remove(&inserted_at);
                    self.deleted_ids.insert(id);

                    StatementResult::Optional(Some(person))
                }
                None => StatementResult::Optional(None),
            },
            Statement::List => StatementResult::List(self.list()),
        };

        Ok(statement_result)
    }

    pub fn list(&self) -> Vec<Person> {
        self.insertion_order_index
            .values()
            .filter_map(|id| self.person_rows.get(id))
            .map(|row| row.person.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.person_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.person_rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::table::row::{UpdatePersonData, UpdateStatement},
        model::person::PersonData,
    };

    fn add_test_person(table: &mut PersonTable, name: &str) -> Person {
        let person = Person::new(PersonData::new(Some(name), None, None));

        let result = table
            .apply(Statement::Add(person.clone()))
            .expect("should add person");

        assert_eq!(result, StatementResult::Single(person.clone()));

        person
    }

    mod add {
        use super::*;

        #[test]
        fn add_happy_path() {
            // Given an empty table
            let mut table = PersonTable::new();

            // When we add a person
            let person = add_test_person(&mut table, "Ada");

            // Then the row and its index entry exist
            assert_eq!(table.len(), 1);
            assert_eq!(
                table.insertion_order_index.values().collect::<Vec<_>>(),
                vec![&person.id]
            );
        }

        #[test]
        fn add_duplicate_id_is_rejected() {
            // Given a table with a person
            let mut table = PersonTable::new();
            let person = add_test_person(&mut table, "Ada");

            // When the same id is added again
            let result = table.apply(Statement::Add(person.clone()));

            // Then the constraint is violated and the table is unchanged
            assert_eq!(
                result,
                Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id))
            );
            assert_eq!(table.len(), 1);
        }

        #[test]
        fn add_deleted_id_is_rejected() {
            // Given a person that has been deleted
            let mut table = PersonTable::new();
            let person = add_test_person(&mut table, "Ada");

            table
                .apply(Statement::Remove(person.id.clone()))
                .expect("should remove");

            // When the id is reused
            let result = table.apply(Statement::Add(person.clone()));

            // Then the id is refused
            assert_eq!(
                result,
                Err(ApplyErrors::CannotCreateWhenPreviouslyDeleted(person.id))
            );
            assert!(table.is_empty());
        }
    }

    mod update {
        use super::*;

        #[test]
        fn update_returns_post_update_person() {
            // Given a person
            let mut table = PersonTable::new();
            let person = add_test_person(&mut table, "Ada");

            // When the title is set
            let update = UpdatePersonData {
                title: UpdateStatement::Set("Lead Engineer".to_string()),
                ..UpdatePersonData::default()
            };

            let result = table
                .apply(Statement::Update(person.id.clone(), update))
                .expect("should update");

            // Then the new state is returned and stored
            let mut expected = person.clone();
            expected.data.title = Some("Lead Engineer".to_string());

            assert_eq!(result, StatementResult::Optional(Some(expected.clone())));
            assert_eq!(table.list(), vec![expected]);
        }

        #[test]
        fn update_unknown_id_is_empty() {
            let mut table = PersonTable::new();

            let result = table
                .apply(Statement::Update(EntityId::new(), UpdatePersonData::default()))
                .expect("missing rows are not an error");

            assert_eq!(result, StatementResult::Optional(None));
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn remove_returns_pre_delete_person_then_empty() {
            // Given a person
            let mut table = PersonTable::new();
            let person = add_test_person(&mut table, "Ada");

            // When it is removed twice
            let first = table.apply(Statement::Remove(person.id.clone())).unwrap();
            let second = table.apply(Statement::Remove(person.id.clone())).unwrap();

            // Then the first returns the person and the second nothing
            assert_eq!(first, StatementResult::Optional(Some(person)));
            assert_eq!(second, StatementResult::Optional(None));
            assert!(table.insertion_order_index.is_empty());
        }
    }

    mod list {
        use super::*;

        #[test]
        fn list_keeps_insertion_order() {
            // Given three people, the middle one removed
            let mut table = PersonTable::new();
            let ada = add_test_person(&mut table, "Ada");
            let grace = add_test_person(&mut table, "Grace");
            let edsger = add_test_person(&mut table, "Edsger");

            table.apply(Statement::Remove(grace.id)).unwrap();

            // When we list
            let result = table.apply(Statement::List).unwrap();

            // Then the remaining people keep their order
            assert_eq!(result, StatementResult::List(vec![ada, edsger]));
        }
    }
}
