//! Dish and ingredient persistence. Point reads by id plus transactional
//! upserts that follow the same id-reconciliation rules as the reservation
//! core.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{
    Dish, DishIngredient, DishType, Ingredient, IngredientCategory, MovementType, StockMovement,
    Unit,
};
use crate::schema::{dish_ingredients, dishes, ingredients, stock_movements};
use crate::sequence;

#[derive(Debug, Clone)]
pub struct DishDraft {
    pub id: Option<i32>,
    pub name: String,
    pub dish_type: DishType,
    pub price: Option<BigDecimal>,
    pub ingredients: Vec<DishIngredientDraft>,
}

#[derive(Debug, Clone)]
pub struct DishIngredientDraft {
    pub ingredient_id: i32,
    pub quantity: Option<BigDecimal>,
    pub unit: Unit,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DishDetails {
    pub id: i32,
    pub name: String,
    pub dish_type: DishType,
    pub price: Option<BigDecimal>,
    pub ingredients: Vec<DishIngredientDetails>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DishIngredientDetails {
    pub ingredient: Ingredient,
    pub quantity: Option<BigDecimal>,
    pub unit: Unit,
}

#[derive(Debug, Clone)]
pub struct IngredientDraft {
    pub id: Option<i32>,
    pub name: String,
    pub category: IngredientCategory,
    pub price: Option<BigDecimal>,
    pub stock_movements: Vec<StockMovementDraft>,
}

#[derive(Debug, Clone)]
pub struct StockMovementDraft {
    pub id: Option<i32>,
    pub quantity: BigDecimal,
    pub movement_type: MovementType,
    pub unit: Unit,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IngredientDetails {
    pub id: i32,
    pub name: String,
    pub category: IngredientCategory,
    pub price: Option<BigDecimal>,
    pub stock_movements: Vec<StockMovement>,
}

pub fn find_dish_by_id(conn: &mut PgConnection, dish_id: i32) -> Result<DishDetails, StoreError> {
    let dish = dishes::table
        .find(dish_id)
        .select(Dish::as_select())
        .first::<Dish>(conn)
        .optional()?
        .ok_or(StoreError::DishNotFound(dish_id))?;

    let links = dish_ingredients::table
        .inner_join(ingredients::table)
        .filter(dish_ingredients::dish_id.eq(dish_id))
        .order(dish_ingredients::id.asc())
        .select((DishIngredient::as_select(), Ingredient::as_select()))
        .load::<(DishIngredient, Ingredient)>(conn)?;

    Ok(DishDetails {
        id: dish.id,
        name: dish.name,
        dish_type: dish.dish_type,
        price: dish.price,
        ingredients: links
            .into_iter()
            .map(|(link, ingredient)| DishIngredientDetails {
                ingredient,
                quantity: link.quantity,
                unit: link.unit,
            })
            .collect(),
    })
}

/// Upserts the dish and replaces its ingredient links in one transaction,
/// then re-reads the committed aggregate.
pub fn save_dish(conn: &mut PgConnection, draft: &DishDraft) -> Result<DishDetails, StoreError> {
    let dish_id = conn.transaction::<_, StoreError, _>(|conn| {
        let dish_id = match draft.id {
            Some(id) => id,
            None => sequence::next_serial_value(conn, "dishes", "id")?,
        };
        let dish = Dish {
            id: dish_id,
            name: draft.name.clone(),
            dish_type: draft.dish_type,
            price: draft.price.clone(),
        };
        diesel::insert_into(dishes::table)
            .values(&dish)
            .on_conflict(dishes::id)
            .do_update()
            .set(&dish)
            .execute(conn)?;

        diesel::delete(dish_ingredients::table.filter(dish_ingredients::dish_id.eq(dish_id)))
            .execute(conn)?;

        let mut links = Vec::with_capacity(draft.ingredients.len());
        for link in &draft.ingredients {
            links.push(DishIngredient {
                id: sequence::next_serial_value(conn, "dish_ingredients", "id")?,
                dish_id,
                ingredient_id: link.ingredient_id,
                quantity: link.quantity.clone(),
                unit: link.unit,
            });
        }
        if !links.is_empty() {
            diesel::insert_into(dish_ingredients::table)
                .values(&links)
                .execute(conn)?;
        }

        Ok(dish_id)
    })?;

    debug!(dish_id, "dish persisted");

    find_dish_by_id(conn, dish_id)
}

pub fn find_ingredient_by_id(
    conn: &mut PgConnection,
    ingredient_id: i32,
) -> Result<IngredientDetails, StoreError> {
    let ingredient = ingredients::table
        .find(ingredient_id)
        .select(Ingredient::as_select())
        .first::<Ingredient>(conn)
        .optional()?
        .ok_or(StoreError::IngredientNotFound(ingredient_id))?;

    let stock_movements = find_stock_movements_by_ingredient_id(conn, ingredient_id)?;

    Ok(IngredientDetails {
        id: ingredient.id,
        name: ingredient.name,
        category: ingredient.category,
        price: ingredient.price,
        stock_movements,
    })
}

/// Upserts the ingredient and records the draft's stock movements in one
/// transaction. Movements carrying an id that already exists are left
/// untouched, so replaying a draft does not duplicate its history.
pub fn save_ingredient(
    conn: &mut PgConnection,
    draft: &IngredientDraft,
) -> Result<IngredientDetails, StoreError> {
    let ingredient_id = conn.transaction::<_, StoreError, _>(|conn| {
        let ingredient_id = match draft.id {
            Some(id) => id,
            None => sequence::next_serial_value(conn, "ingredients", "id")?,
        };
        let ingredient = Ingredient {
            id: ingredient_id,
            name: draft.name.clone(),
            category: draft.category,
            price: draft.price.clone(),
        };
        diesel::insert_into(ingredients::table)
            .values(&ingredient)
            .on_conflict(ingredients::id)
            .do_update()
            .set(&ingredient)
            .execute(conn)?;

        let mut movements = Vec::with_capacity(draft.stock_movements.len());
        for movement in &draft.stock_movements {
            movements.push(StockMovement {
                id: match movement.id {
                    Some(id) => id,
                    None => sequence::next_serial_value(conn, "stock_movements", "id")?,
                },
                ingredient_id,
                quantity: movement.quantity.clone(),
                movement_type: movement.movement_type,
                unit: movement.unit,
                created_at: movement.created_at,
            });
        }
        if !movements.is_empty() {
            diesel::insert_into(stock_movements::table)
                .values(&movements)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }

        Ok(ingredient_id)
    })?;

    debug!(ingredient_id, "ingredient persisted");

    find_ingredient_by_id(conn, ingredient_id)
}

/// Inserts a batch of new ingredients in one transaction. Stock movements on
/// the drafts are ignored here; `save_ingredient` records those.
pub fn create_ingredients(
    conn: &mut PgConnection,
    drafts: &[IngredientDraft],
) -> Result<Vec<Ingredient>, StoreError> {
    if drafts.is_empty() {
        return Ok(Vec::new());
    }

    conn.transaction::<_, StoreError, _>(|conn| {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let ingredient = Ingredient {
                id: match draft.id {
                    Some(id) => id,
                    None => sequence::next_serial_value(conn, "ingredients", "id")?,
                },
                name: draft.name.clone(),
                category: draft.category,
                price: draft.price.clone(),
            };
            diesel::insert_into(ingredients::table)
                .values(&ingredient)
                .execute(conn)?;
            created.push(ingredient);
        }
        Ok(created)
    })
}

pub fn find_stock_movements_by_ingredient_id(
    conn: &mut PgConnection,
    ingredient_id: i32,
) -> Result<Vec<StockMovement>, StoreError> {
    let movements = stock_movements::table
        .filter(stock_movements::ingredient_id.eq(ingredient_id))
        .order(stock_movements::id.asc())
        .select(StockMovement::as_select())
        .load(conn)?;
    Ok(movements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn ingredient_draft(name: &str) -> IngredientDraft {
        IngredientDraft {
            id: None,
            name: name.to_string(),
            category: IngredientCategory::Vegetable,
            price: Some(BigDecimal::from(2)),
            stock_movements: vec![],
        }
    }

    #[test]
    fn saving_a_dish_replaces_its_ingredient_links() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);

        let created = create_ingredients(
            conn,
            &[ingredient_draft("Carotte"), ingredient_draft("Oignon")],
        )
        .unwrap();

        let mut draft = DishDraft {
            id: None,
            name: "Pot-au-feu".to_string(),
            dish_type: DishType::Main,
            price: Some(BigDecimal::from(15)),
            ingredients: vec![DishIngredientDraft {
                ingredient_id: created[0].id,
                quantity: Some(BigDecimal::from(200)),
                unit: Unit::Gram,
            }],
        };
        let saved = save_dish(conn, &draft).unwrap();
        assert_eq!(saved.ingredients.len(), 1);
        assert_eq!(saved.ingredients[0].ingredient.id, created[0].id);

        draft.id = Some(saved.id);
        draft.ingredients = vec![DishIngredientDraft {
            ingredient_id: created[1].id,
            quantity: Some(BigDecimal::from(80)),
            unit: Unit::Gram,
        }];
        let resaved = save_dish(conn, &draft).unwrap();
        assert_eq!(resaved.id, saved.id);
        assert_eq!(resaved.ingredients.len(), 1);
        assert_eq!(resaved.ingredients[0].ingredient.id, created[1].id);

        let stored: i64 = dish_ingredients::table
            .filter(dish_ingredients::dish_id.eq(saved.id))
            .count()
            .get_result(conn)
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn save_ingredient_records_stock_movements() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);

        let mut draft = ingredient_draft("Lait");
        draft.category = IngredientCategory::Dairy;
        draft.stock_movements = vec![
            StockMovementDraft {
                id: None,
                quantity: BigDecimal::from(10),
                movement_type: MovementType::In,
                unit: Unit::Liter,
                created_at: Utc::now(),
            },
            StockMovementDraft {
                id: None,
                quantity: BigDecimal::from(2),
                movement_type: MovementType::Out,
                unit: Unit::Liter,
                created_at: Utc::now(),
            },
        ];

        let saved = save_ingredient(conn, &draft).unwrap();
        assert_eq!(saved.stock_movements.len(), 2);
        assert_ne!(saved.stock_movements[0].id, saved.stock_movements[1].id);
        assert_eq!(saved.stock_movements[0].movement_type, MovementType::In);

        // Replaying the committed movements must not duplicate the history.
        draft.id = Some(saved.id);
        draft.stock_movements = saved
            .stock_movements
            .iter()
            .map(|m| StockMovementDraft {
                id: Some(m.id),
                quantity: m.quantity.clone(),
                movement_type: m.movement_type,
                unit: m.unit,
                created_at: m.created_at,
            })
            .collect();
        let resaved = save_ingredient(conn, &draft).unwrap();
        assert_eq!(resaved.stock_movements.len(), 2);
    }

    #[test]
    fn create_ingredients_reconciles_explicit_and_generated_ids() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);

        let mut with_id = ingredient_draft("Sel");
        with_id.id = Some(10);
        let created =
            create_ingredients(conn, &[with_id, ingredient_draft("Poivre")]).unwrap();
        assert_eq!(created[0].id, 10);
        assert_eq!(created[1].id, 11);

        assert!(create_ingredients(conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn missing_catalog_rows_are_not_found() {
        let _guard = testing::lock();
        let conn = &mut testing::connection();
        testing::reset(conn);

        assert!(matches!(
            find_dish_by_id(conn, 404),
            Err(StoreError::DishNotFound(404))
        ));
        assert!(matches!(
            find_ingredient_by_id(conn, 404),
            Err(StoreError::IngredientNotFound(404))
        ));
    }
}
