//! Serial id allocation for tables whose rows may arrive with caller-supplied
//! ids. Postgres only advances a serial sequence when it assigns the value
//! itself, so explicit inserts leave the sequence behind the highest id in
//! use. Every allocation therefore realigns the sequence to `max(id)` before
//! drawing from it.
//!
//! Not safe against concurrent allocators on its own; call it from inside the
//! transaction that inserts the row.

use diesel::define_sql_function;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Integer, Nullable, Text};

use crate::error::StoreError;

define_sql_function! {
    fn pg_get_serial_sequence(table_name: Text, column_name: Text) -> Nullable<Text>;
}

define_sql_function! {
    fn nextval(sequence_name: Text) -> BigInt;
}

define_sql_function! {
    fn setval(sequence_name: Text, value: BigInt, is_called: Bool) -> BigInt;
}

#[derive(QueryableByName)]
struct MaxId {
    #[diesel(sql_type = Integer)]
    max_id: i32,
}

/// Returns a fresh id for `table.column`, realigning the backing sequence
/// with the highest id currently stored before drawing the next value.
pub fn next_serial_value(
    conn: &mut PgConnection,
    table: &str,
    column: &str,
) -> Result<i32, StoreError> {
    let sequence = diesel::select(pg_get_serial_sequence(table, column))
        .get_result::<Option<String>>(conn)?
        .ok_or_else(|| StoreError::MissingSequence {
            table: table.to_string(),
            column: column.to_string(),
        })?;

    realign_sequence(conn, table, column, &sequence)?;

    let next = diesel::select(nextval(sequence.as_str())).get_result::<i64>(conn)?;
    Ok(next as i32)
}

fn realign_sequence(
    conn: &mut PgConnection,
    table: &str,
    column: &str,
    sequence: &str,
) -> Result<(), StoreError> {
    // Identifiers come from call sites, never from user input.
    let max_id = diesel::sql_query(format!(
        "SELECT COALESCE(MAX({column}), 0) AS max_id FROM {table}"
    ))
    .get_result::<MaxId>(conn)?
    .max_id;

    if max_id == 0 {
        diesel::select(setval(sequence, 1_i64, false)).execute(conn)?;
    } else {
        diesel::select(setval(sequence, i64::from(max_id), true)).execute(conn)?;
    }
    Ok(())
}
