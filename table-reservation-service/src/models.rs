use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};

use crate::schema::{
    dish_ingredients, dishes, ingredients, order_line_items, orders, restaurant_tables,
    stock_movements,
};

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::DishType)]
pub enum DishType {
    Starter,
    Main,
    Dessert,
}

impl ToSql<crate::schema::sql_types::DishType, Pg> for DishType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            DishType::Starter => out.write_all(b"STARTER")?,
            DishType::Main => out.write_all(b"MAIN")?,
            DishType::Dessert => out.write_all(b"DESSERT")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::DishType, Pg> for DishType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"STARTER" => Ok(DishType::Starter),
            b"MAIN" => Ok(DishType::Main),
            b"DESSERT" => Ok(DishType::Dessert),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::IngredientCategory)]
pub enum IngredientCategory {
    Vegetable,
    Meat,
    Seafood,
    Dairy,
    Condiment,
}

impl ToSql<crate::schema::sql_types::IngredientCategory, Pg> for IngredientCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            IngredientCategory::Vegetable => out.write_all(b"VEGETABLE")?,
            IngredientCategory::Meat => out.write_all(b"MEAT")?,
            IngredientCategory::Seafood => out.write_all(b"SEAFOOD")?,
            IngredientCategory::Dairy => out.write_all(b"DAIRY")?,
            IngredientCategory::Condiment => out.write_all(b"CONDIMENT")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::IngredientCategory, Pg> for IngredientCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"VEGETABLE" => Ok(IngredientCategory::Vegetable),
            b"MEAT" => Ok(IngredientCategory::Meat),
            b"SEAFOOD" => Ok(IngredientCategory::Seafood),
            b"DAIRY" => Ok(IngredientCategory::Dairy),
            b"CONDIMENT" => Ok(IngredientCategory::Condiment),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::MovementType)]
pub enum MovementType {
    In,
    Out,
}

impl ToSql<crate::schema::sql_types::MovementType, Pg> for MovementType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            MovementType::In => out.write_all(b"IN")?,
            MovementType::Out => out.write_all(b"OUT")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::MovementType, Pg> for MovementType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"IN" => Ok(MovementType::In),
            b"OUT" => Ok(MovementType::Out),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::Unit)]
pub enum Unit {
    Gram,
    Liter,
    Piece,
}

impl ToSql<crate::schema::sql_types::Unit, Pg> for Unit {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            Unit::Gram => out.write_all(b"GRAM")?,
            Unit::Liter => out.write_all(b"LITER")?,
            Unit::Piece => out.write_all(b"PIECE")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::Unit, Pg> for Unit {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"GRAM" => Ok(Unit::Gram),
            b"LITER" => Ok(Unit::Liter),
            b"PIECE" => Ok(Unit::Piece),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Eq, Clone)]
#[diesel(table_name = restaurant_tables)]
pub struct RestaurantTable {
    pub id: i32,
    pub number: i32,
}

#[derive(Insertable, Debug, PartialEq, Eq)]
#[diesel(table_name = restaurant_tables)]
pub struct NewRestaurantTable {
    pub number: i32,
}

#[derive(
    Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, PartialEq, Eq, Clone,
)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub table_id: i32,
    pub installation_time: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Eq, Clone,
)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_line_items)]
pub struct OrderLineItem {
    pub id: i32,
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
}

#[derive(
    Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, PartialEq, Clone,
)]
#[diesel(table_name = dishes)]
#[diesel(treat_none_as_null = true)]
pub struct Dish {
    pub id: i32,
    pub name: String,
    pub dish_type: DishType,
    pub price: Option<BigDecimal>,
}

#[derive(
    Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, PartialEq, Clone,
)]
#[diesel(table_name = ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub category: IngredientCategory,
    pub price: Option<BigDecimal>,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone,
)]
#[diesel(belongs_to(Dish))]
#[diesel(belongs_to(Ingredient))]
#[diesel(table_name = dish_ingredients)]
pub struct DishIngredient {
    pub id: i32,
    pub dish_id: i32,
    pub ingredient_id: i32,
    pub quantity: Option<BigDecimal>,
    pub unit: Unit,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq, Clone,
)]
#[diesel(belongs_to(Ingredient))]
#[diesel(table_name = stock_movements)]
pub struct StockMovement {
    pub id: i32,
    pub ingredient_id: i32,
    pub quantity: BigDecimal,
    pub movement_type: MovementType,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
}
