//! Walks through the booking scenarios against the configured database:
//! a successful booking, an overlap rejection naming the free tables, and a
//! rejection once every table is taken. Each step opens its own connection.

use anyhow::anyhow;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use tracing::{info, warn};

use table_reservation_service::catalog::{self, DishDraft, DishDetails};
use table_reservation_service::models::{DishType, NewRestaurantTable, RestaurantTable};
use table_reservation_service::reservation::{self, OrderDraft, OrderLineDraft};
use table_reservation_service::schema::{order_line_items, orders, restaurant_tables};
use table_reservation_service::{establish_connection, MIGRATIONS};

pub fn migrate() -> anyhow::Result<()> {
    let mut conn = establish_connection()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))?;
    info!("migrations up to date");
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    migrate()?;

    let (tables, dishes) = {
        let conn = &mut establish_connection()?;
        reset_orders(conn)?;
        let tables = ensure_tables(conn, &[1, 2, 3])?;
        let dishes = seed_dishes(conn)?;
        (tables, dishes)
    };
    let table1 = table_by_number(&tables, 1)?;
    let table2 = table_by_number(&tables, 2)?;
    let table3 = table_by_number(&tables, 3)?;

    let now = Utc::now();
    let one_hour_later = now + Duration::hours(1);

    info!("[1] booking table 1 for one hour");
    let mut order = new_order("CMD-001", table1, now, one_hour_later);
    order.lines = vec![
        OrderLineDraft {
            dish_id: dishes[0].id,
            quantity: 2,
        },
        OrderLineDraft {
            dish_id: dishes[1].id,
            quantity: 1,
        },
    ];
    {
        let conn = &mut establish_connection()?;
        let saved = reservation::save_order(conn, &order)?;
        info!(
            order_id = saved.id,
            lines = saved.lines.len(),
            "order CMD-001 saved on table 1"
        );
    }

    info!("[2] booking table 1 again with an overlapping window");
    let overlapping = new_order(
        "CMD-002",
        table1,
        now + Duration::minutes(10),
        now + Duration::minutes(40),
    );
    {
        let conn = &mut establish_connection()?;
        match reservation::save_order(conn, &overlapping) {
            Ok(_) => warn!("order CMD-002 should have been rejected"),
            Err(err) => info!("rejected as expected: {err}"),
        }
    }

    info!("[3] filling the remaining tables");
    {
        let conn = &mut establish_connection()?;
        reservation::save_order(conn, &new_order("CMD-003", table2, now, one_hour_later))?;
        info!("table 2 occupied");
    }
    {
        let conn = &mut establish_connection()?;
        reservation::save_order(conn, &new_order("CMD-004", table3, now, one_hour_later))?;
        info!("table 3 occupied");
    }

    info!("[4] booking while every table is taken");
    let saturated = new_order(
        "CMD-005",
        table1,
        now + Duration::minutes(10),
        now + Duration::minutes(20),
    );
    {
        let conn = &mut establish_connection()?;
        match reservation::save_order(conn, &saturated) {
            Ok(_) => warn!("order CMD-005 should have been rejected"),
            Err(err) => info!("rejected as expected: {err}"),
        }
    }

    let conn = &mut establish_connection()?;
    let round_trip = reservation::find_order_by_reference(conn, "CMD-001")?;
    info!(
        order_id = round_trip.id,
        table = round_trip.table.number,
        lines = round_trip.lines.len(),
        "round trip for CMD-001"
    );

    Ok(())
}

fn new_order(
    reference: &str,
    table: &RestaurantTable,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> OrderDraft {
    OrderDraft {
        id: None,
        reference: reference.to_string(),
        created_at: Utc::now(),
        table: Some(table.clone()),
        installation_time: Some(from),
        departure_time: Some(to),
        lines: vec![],
    }
}

fn table_by_number(tables: &[RestaurantTable], number: i32) -> anyhow::Result<&RestaurantTable> {
    tables
        .iter()
        .find(|t| t.number == number)
        .ok_or_else(|| anyhow!("table {number} is missing"))
}

fn reset_orders(conn: &mut PgConnection) -> anyhow::Result<()> {
    diesel::delete(order_line_items::table).execute(conn)?;
    diesel::delete(orders::table).execute(conn)?;
    info!("order data reset");
    Ok(())
}

fn ensure_tables(
    conn: &mut PgConnection,
    numbers: &[i32],
) -> anyhow::Result<Vec<RestaurantTable>> {
    let rows = numbers
        .iter()
        .map(|&number| NewRestaurantTable { number })
        .collect::<Vec<_>>();
    diesel::insert_into(restaurant_tables::table)
        .values(&rows)
        .on_conflict(restaurant_tables::number)
        .do_nothing()
        .execute(conn)?;

    let tables = restaurant_tables::table
        .order(restaurant_tables::number.asc())
        .select(RestaurantTable::as_select())
        .load(conn)?;
    Ok(tables)
}

fn seed_dishes(conn: &mut PgConnection) -> anyhow::Result<Vec<DishDetails>> {
    let drafts = [
        DishDraft {
            id: None,
            name: "Daube de boeuf".to_string(),
            dish_type: DishType::Main,
            price: Some(BigDecimal::from(14)),
            ingredients: vec![],
        },
        DishDraft {
            id: None,
            name: "Tarte aux pommes".to_string(),
            dish_type: DishType::Dessert,
            price: Some(BigDecimal::from(6)),
            ingredients: vec![],
        },
    ];

    let mut dishes = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        dishes.push(catalog::save_dish(conn, draft)?);
    }
    Ok(dishes)
}
