//! Condense a resource's fields into flat CSV rows.
//!
//! A resource may carry the same v4 field several times (two addresses, three
//! identifiers). CSV rows hold one value per column, so repeated fields spill
//! into extra rows sharing the resource identifier:
//!
//! ```text
//! Fields (in order)              →  Rows
//! ┌───────────────────────────┐    ┌──────┬──────────┬─────────────┐
//! │ Name      = Old Mill      │    │ ID   │ Name     │ Address     │
//! │ Address   = 1 Mill Lane   │ →  ├──────┼──────────┼─────────────┤
//! │ Address   = 2 Mill Lane   │    │ r1   │ Old Mill │ 1 Mill Lane │
//! └───────────────────────────┘    │ r1   │          │ 2 Mill Lane │
//!                                  └──────┴──────────┴─────────────┘
//! ```
//!
//! Each field goes into the first row that has no value for its column,
//! so the row count equals the largest number of values any single field has.

use crate::models::{FieldValue, OutputRow};

/// Pack fields into the fewest rows with no column collisions.
///
/// Always returns at least one row; a resource without fields yields a row
/// holding only its identifier.
pub fn condense(resource_id: &str, fields: Vec<FieldValue>) -> Vec<OutputRow> {
    let mut rows = vec![OutputRow::new(resource_id)];

    for field in fields {
        match rows.iter().position(|row| !row.contains(&field.field)) {
            Some(index) => rows[index].insert(field),
            None => {
                let mut row = OutputRow::new(resource_id);
                row.insert(field);
                rows.push(row);
            }
        }
    }

    rows
}
