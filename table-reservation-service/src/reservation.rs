use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::debug;

use crate::availability;
use crate::catalog::{self, DishDetails};
use crate::error::StoreError;
use crate::models::{Order, OrderLineItem, RestaurantTable};
use crate::schema::{order_line_items, orders, restaurant_tables};
use crate::sequence;

/// An order as submitted by a caller. The id is absent for a new booking and
/// set when rewriting an existing one; line ids are always assigned on save.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: Option<i32>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub table: Option<RestaurantTable>,
    pub installation_time: Option<DateTime<Utc>>,
    pub departure_time: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLineDraft>,
}

#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub dish_id: i32,
    pub quantity: i32,
}

/// The committed aggregate, re-read from storage after every save.
#[derive(Debug, PartialEq, Clone)]
pub struct OrderDetails {
    pub id: i32,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub table: RestaurantTable,
    pub installation_time: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    pub lines: Vec<OrderLineDetails>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderLineDetails {
    pub id: i32,
    pub dish: DishDetails,
    pub quantity: i32,
}

/// Books the draft's table for its window and persists the order with its
/// line items, replacing any previously stored lines.
///
/// The availability check and the writes share one transaction: the target
/// table's row is locked first, so concurrent bookings of the same table
/// serialize, and the schema's exclusion constraint rejects at commit time
/// any overlap that still slips through.
pub fn save_order(conn: &mut PgConnection, draft: &OrderDraft) -> Result<OrderDetails, StoreError> {
    let table = draft.table.as_ref().ok_or(StoreError::MissingTable)?;
    let (installation_time, departure_time) = match (draft.installation_time, draft.departure_time)
    {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(StoreError::MissingWindow),
    };

    let order_id = conn.transaction::<_, StoreError, _>(|conn| {
        let locked = restaurant_tables::table
            .select(RestaurantTable::as_select())
            .find(table.id)
            .for_update()
            .get_result::<RestaurantTable>(conn)
            .optional()?;

        let available = match draft.id {
            Some(order_id) => availability::find_available_tables_for_order(
                conn,
                installation_time,
                departure_time,
                order_id,
            )?,
            None => availability::find_available_tables(conn, installation_time, departure_time)?,
        };

        if locked.is_none() || !available.iter().any(|t| t.id == table.id) {
            return Err(StoreError::TableNotAvailable {
                requested: table.clone(),
                available,
            });
        }

        let order_id = match draft.id {
            Some(id) => id,
            None => sequence::next_serial_value(conn, "orders", "id")?,
        };
        let order = Order {
            id: order_id,
            reference: draft.reference.clone(),
            created_at: draft.created_at,
            table_id: table.id,
            installation_time,
            departure_time,
        };
        diesel::insert_into(orders::table)
            .values(&order)
            .on_conflict(orders::id)
            .do_update()
            .set(&order)
            .execute(conn)?;

        diesel::delete(order_line_items::table.filter(order_line_items::order_id.eq(order_id)))
            .execute(conn)?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            lines.push(OrderLineItem {
                id: sequence::next_serial_value(conn, "order_line_items", "id")?,
                order_id,
                dish_id: line.dish_id,
                quantity: line.quantity,
            });
        }
        if !lines.is_empty() {
            diesel::insert_into(order_line_items::table)
                .values(&lines)
                .execute(conn)?;
        }

        Ok(order_id)
    })?;

    debug!(order_id, reference = %draft.reference, "order persisted");

    find_order_by_reference(conn, &draft.reference)
}

/// Loads the full aggregate whose reference matches the given pattern
/// (`LIKE` semantics, so an exact reference works as-is).
pub fn find_order_by_reference(
    conn: &mut PgConnection,
    reference: &str,
) -> Result<OrderDetails, StoreError> {
    let (order, table) = orders::table
        .inner_join(restaurant_tables::table)
        .filter(orders::reference.like(reference))
        .select((Order::as_select(), RestaurantTable::as_select()))
        .first::<(Order, RestaurantTable)>(conn)
        .optional()?
        .ok_or_else(|| StoreError::OrderNotFound(reference.to_string()))?;

    let rows = OrderLineItem::belonging_to(&order)
        .select(OrderLineItem::as_select())
        .order(order_line_items::id.asc())
        .load::<OrderLineItem>(conn)?;

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        lines.push(OrderLineDetails {
            id: row.id,
            dish: catalog::find_dish_by_id(conn, row.dish_id)?,
            quantity: row.quantity,
        });
    }

    Ok(OrderDetails {
        id: order.id,
        reference: order.reference,
        created_at: order.created_at,
        table,
        installation_time: order.installation_time,
        departure_time: order.departure_time,
        lines,
    })
}
