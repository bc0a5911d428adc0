use thiserror::Error;

use crate::models::RestaurantTable;

/// Failures surfaced by the persistence operations. Validation and conflict
/// variants are recoverable by the caller; the rest abort the operation and
/// roll back any open transaction.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a table is required for an order")]
    MissingTable,

    #[error("installation and departure times are required")]
    MissingWindow,

    #[error(
        "table {} is not available, {}",
        .requested.number,
        describe_available(.available)
    )]
    TableNotAvailable {
        requested: RestaurantTable,
        available: Vec<RestaurantTable>,
    },

    #[error("order not found with reference {0}")]
    OrderNotFound(String),

    #[error("dish not found with id {0}")]
    DishNotFound(i32),

    #[error("ingredient not found with id {0}")]
    IngredientNotFound(i32),

    #[error("no serial sequence found for {table}.{column}")]
    MissingSequence { table: String, column: String },

    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    #[error("could not connect to the database")]
    Connection(#[from] diesel::result::ConnectionError),

    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

fn describe_available(tables: &[RestaurantTable]) -> String {
    if tables.is_empty() {
        return "no table is available".to_string();
    }
    let numbers = tables
        .iter()
        .map(|table| table.number.to_string())
        .collect::<Vec<_>>();
    format!("tables {} are currently free", numbers.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: i32, number: i32) -> RestaurantTable {
        RestaurantTable { id, number }
    }

    #[test]
    fn conflict_message_lists_free_tables() {
        let err = StoreError::TableNotAvailable {
            requested: table(1, 1),
            available: vec![table(2, 2), table(3, 3)],
        };
        assert_eq!(
            err.to_string(),
            "table 1 is not available, tables 2 and 3 are currently free"
        );
    }

    #[test]
    fn conflict_message_when_fully_booked() {
        let err = StoreError::TableNotAvailable {
            requested: table(1, 1),
            available: vec![],
        };
        assert_eq!(err.to_string(), "table 1 is not available, no table is available");
    }

    #[test]
    fn conflict_message_with_single_alternative() {
        let err = StoreError::TableNotAvailable {
            requested: table(2, 2),
            available: vec![table(3, 3)],
        };
        assert_eq!(
            err.to_string(),
            "table 2 is not available, tables 3 are currently free"
        );
    }
}
