use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::error::StoreError;
use crate::models::RestaurantTable;
use crate::schema::{orders, restaurant_tables};

/// Returns every table with no order occupying it during `[from, to)`,
/// ordered by table number.
///
/// Two windows conflict iff `installation < to AND departure > from`; a
/// booking that ends exactly at `from` or starts exactly at `to` does not
/// conflict, so back-to-back bookings are allowed.
pub fn find_available_tables(
    conn: &mut PgConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<RestaurantTable>, StoreError> {
    let occupied = orders::table
        .filter(orders::installation_time.lt(to))
        .filter(orders::departure_time.gt(from))
        .select(orders::table_id);

    let tables = restaurant_tables::table
        .filter(restaurant_tables::id.ne_all(occupied))
        .order(restaurant_tables::number.asc())
        .select(RestaurantTable::as_select())
        .load(conn)?;
    Ok(tables)
}

/// Availability for rewriting an existing order in place: the order's own
/// row must not count as a conflict against its replacement window.
pub(crate) fn find_available_tables_for_order(
    conn: &mut PgConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    order_id: i32,
) -> Result<Vec<RestaurantTable>, StoreError> {
    let occupied = orders::table
        .filter(orders::installation_time.lt(to))
        .filter(orders::departure_time.gt(from))
        .filter(orders::id.ne(order_id))
        .select(orders::table_id);

    let tables = restaurant_tables::table
        .filter(restaurant_tables::id.ne_all(occupied))
        .order(restaurant_tables::number.asc())
        .select(RestaurantTable::as_select())
        .load(conn)?;
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use diesel::prelude::*;

    use super::*;
    use crate::models::Order;
    use crate::schema::orders;
    use crate::testing;

    fn book(
        conn: &mut PgConnection,
        id: i32,
        table: &RestaurantTable,
        from: chrono::DateTime<Utc>,
        to: chrono::DateTime<Utc>,
    ) {
        diesel::insert_into(orders::table)
            .values(Order {
                id,
                reference: format!("REF-{id}"),
                created_at: Utc::now(),
                table_id: table.id,
                installation_time: from,
                departure_time: to,
            })
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn every_table_is_free_without_orders() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        testing::seed_tables(conn, &[1, 2, 3]);

        let now = Utc::now();
        let free = find_available_tables(conn, now, now + Duration::hours(1)).unwrap();
        let numbers = free.iter().map(|t| t.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn overlapping_order_excludes_its_table() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        let tables = testing::seed_tables(conn, &[1, 2, 3]);

        let now = Utc::now();
        book(conn, 1, &tables[0], now, now + Duration::hours(1));

        let free =
            find_available_tables(conn, now + Duration::minutes(10), now + Duration::minutes(40))
                .unwrap();
        let numbers = free.iter().map(|t| t.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn window_starting_at_departure_does_not_conflict() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        let tables = testing::seed_tables(conn, &[1, 2]);

        let now = Utc::now();
        let departure = now + Duration::hours(1);
        book(conn, 1, &tables[0], now, departure);

        let free = find_available_tables(conn, departure, departure + Duration::hours(1)).unwrap();
        let numbers = free.iter().map(|t| t.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn window_ending_at_installation_does_not_conflict() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        let tables = testing::seed_tables(conn, &[1]);

        let now = Utc::now();
        book(
            conn,
            1,
            &tables[0],
            now + Duration::hours(1),
            now + Duration::hours(2),
        );

        let free = find_available_tables(conn, now, now + Duration::hours(1)).unwrap();
        assert_eq!(free.len(), 1);
    }

    #[test]
    fn enclosing_window_conflicts() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        let tables = testing::seed_tables(conn, &[1]);

        let now = Utc::now();
        book(
            conn,
            1,
            &tables[0],
            now + Duration::minutes(20),
            now + Duration::minutes(30),
        );

        let free = find_available_tables(conn, now, now + Duration::hours(1)).unwrap();
        assert!(free.is_empty());
    }

    #[test]
    fn rewritten_order_ignores_its_own_window() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);
        let tables = testing::seed_tables(conn, &[1]);

        let now = Utc::now();
        book(conn, 7, &tables[0], now, now + Duration::hours(1));

        let free =
            find_available_tables_for_order(conn, now, now + Duration::hours(1), 7).unwrap();
        assert_eq!(free.len(), 1);
    }
}
