use std::{error::Error, fmt::Debug};

use anyhow::Context;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::{
        Delivery, DeliveryStatus, MenuItem, NewDelivery, NewOrder, NewOrderItem, Order, OrderItem,
        OrderStatus, Restaurant, User, UserView,
    },
    schema::{deliveries, menu_items, order_items, orders, restaurants, users},
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

// A (menu item, quantity) pair submitted by the customer. The unit price is
// never taken from the client; it is snapshotted from the menu at creation.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub menu_item_id: i32,
    pub quantity: i32,
}

#[derive(Serialize)]
pub struct OrderItemView {
    pub id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub menu_item: MenuItem,
}

// Fully-hydrated order aggregate, the shape every order endpoint returns.
#[derive(Serialize)]
pub struct OrderView {
    pub id: i32,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub delivery_address: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub customer: UserView,
    pub restaurant: Restaurant,
    pub items: Vec<OrderItemView>,
}

// Error associated with creating an order with its items and delivery record
#[derive(Error)]
pub enum CreateOrderError {
    #[error("restaurant {0} does not exist")]
    UnknownRestaurant(i32),
    #[error("menu item {0} does not exist")]
    UnknownMenuItem(i32),
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
}

impl Debug for CreateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// The whole creation sequence runs in one transaction: an unresolvable menu
// item aborts everything, so an order can never be persisted with fewer items
// than were requested.
#[tracing::instrument(
    "Creating order with items and delivery record",
    skip(conn, lines)
)]
pub async fn create_order(
    mut conn: DbConnection,
    customer_id: i32,
    restaurant_id: i32,
    lines: Vec<OrderLine>,
    delivery_address: String,
) -> Result<OrderView, CreateOrderError> {
    let view = spawn_blocking_with_tracing(move || {
        conn.transaction::<OrderView, CreateOrderError, _>(|conn| {
            let restaurant = restaurants::table
                .find(restaurant_id)
                .first::<Restaurant>(conn)
                .optional()?
                .ok_or(CreateOrderError::UnknownRestaurant(restaurant_id))?;

            let mut total_amount = BigDecimal::from(0);
            let mut resolved: Vec<(MenuItem, i32)> = Vec::with_capacity(lines.len());

            for line in &lines {
                let menu_item = menu_items::table
                    .find(line.menu_item_id)
                    .first::<MenuItem>(conn)
                    .optional()?
                    .ok_or(CreateOrderError::UnknownMenuItem(line.menu_item_id))?;

                total_amount += menu_item.price.clone() * BigDecimal::from(line.quantity);
                resolved.push((menu_item, line.quantity));
            }

            let order: Order = diesel::insert_into(orders::table)
                .values(NewOrder {
                    user_id: customer_id,
                    restaurant_id,
                    total_amount,
                    delivery_address,
                    status: OrderStatus::Pending,
                })
                .get_result(conn)?;

            let mut items = Vec::with_capacity(resolved.len());
            for (menu_item, quantity) in resolved {
                let row: OrderItem = diesel::insert_into(order_items::table)
                    .values(NewOrderItem {
                        order_id: order.id,
                        menu_item_id: menu_item.id,
                        quantity,
                        price: menu_item.price.clone(),
                    })
                    .get_result(conn)?;

                items.push(OrderItemView {
                    id: row.id,
                    quantity: row.quantity,
                    price: row.price,
                    menu_item,
                });
            }

            // Each order gets exactly one delivery record, unassigned until an
            // admin picks a rider.
            diesel::insert_into(deliveries::table)
                .values(NewDelivery {
                    order_id: order.id,
                    status: DeliveryStatus::Pending,
                })
                .execute(conn)?;

            let customer: User = users::table.find(customer_id).first(conn)?;

            Ok(OrderView {
                id: order.id,
                status: order.status,
                total_amount: order.total_amount,
                delivery_address: order.delivery_address,
                created_at: order.created_at,
                updated_at: order.updated_at,
                customer: customer.into(),
                restaurant,
                items,
            })
        })
    })
    .await??;

    Ok(view)
}

// Hydrates an order row with its customer, restaurant and item details.
fn load_order_view(conn: &mut DbConnection, order: Order) -> Result<OrderView, anyhow::Error> {
    let customer: User = users::table
        .find(order.user_id)
        .first(conn)
        .context("Failed to load order customer")?;

    let restaurant: Restaurant = restaurants::table
        .find(order.restaurant_id)
        .first(conn)
        .context("Failed to load order restaurant")?;

    let rows: Vec<(OrderItem, MenuItem)> = order_items::table
        .inner_join(menu_items::table)
        .filter(order_items::order_id.eq(order.id))
        .load(conn)
        .context("Failed to load order items")?;

    let items = rows
        .into_iter()
        .map(|(row, menu_item)| OrderItemView {
            id: row.id,
            quantity: row.quantity,
            price: row.price,
            menu_item,
        })
        .collect();

    Ok(OrderView {
        id: order.id,
        status: order.status,
        total_amount: order.total_amount,
        delivery_address: order.delivery_address,
        created_at: order.created_at,
        updated_at: order.updated_at,
        customer: customer.into(),
        restaurant,
        items,
    })
}

fn load_order_views(
    conn: &mut DbConnection,
    rows: Vec<Order>,
) -> Result<Vec<OrderView>, anyhow::Error> {
    rows.into_iter()
        .map(|order| load_order_view(conn, order))
        .collect()
}

#[tracing::instrument("Getting hydrated order by id", skip(conn))]
pub async fn get_order_view(
    mut conn: DbConnection,
    order_id: i32,
) -> Result<Option<OrderView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Option<OrderView>, anyhow::Error, _>(|conn| {
            let order = orders::table
                .find(order_id)
                .first::<Order>(conn)
                .optional()
                .context("Failed to query order by id")?;

            match order {
                Some(order) => Ok(Some(load_order_view(conn, order)?)),
                None => Ok(None),
            }
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Raw order together with its restaurant, for ownership checks.
#[tracing::instrument("Getting order with restaurant", skip(conn))]
pub async fn get_order_with_restaurant(
    mut conn: DbConnection,
    order_id: i32,
) -> Result<Option<(Order, Restaurant)>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        orders::table
            .inner_join(restaurants::table)
            .filter(orders::id.eq(order_id))
            .first::<(Order, Restaurant)>(&mut conn)
            .optional()
            .context("Failed to query order with restaurant")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Listing orders for customer", skip(conn))]
pub async fn list_orders_by_customer(
    mut conn: DbConnection,
    customer_id: i32,
) -> Result<Vec<OrderView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<OrderView>, anyhow::Error, _>(|conn| {
            let rows = orders::table
                .filter(orders::user_id.eq(customer_id))
                .order(orders::created_at.desc())
                .load::<Order>(conn)
                .context("Failed to load customer orders")?;

            load_order_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Listing orders for restaurant", skip(conn))]
pub async fn list_orders_by_restaurant(
    mut conn: DbConnection,
    restaurant_id: i32,
) -> Result<Vec<OrderView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<OrderView>, anyhow::Error, _>(|conn| {
            let rows = orders::table
                .filter(orders::restaurant_id.eq(restaurant_id))
                .order(orders::created_at.desc())
                .load::<Order>(conn)
                .context("Failed to load restaurant orders")?;

            load_order_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Listing all orders", skip_all)]
pub async fn list_all_orders(mut conn: DbConnection) -> Result<Vec<OrderView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<OrderView>, anyhow::Error, _>(|conn| {
            let rows = orders::table
                .order(orders::created_at.desc())
                .load::<Order>(conn)
                .context("Failed to load orders")?;

            load_order_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with updating order status
#[derive(Error)]
pub enum UpdateOrderStatusError {
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("order {0} doesn't exist")]
    NoSuchOrder(i32),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

impl Debug for UpdateOrderStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// The transition check runs against a locked row in the same transaction as
// the update, so two racing requests cannot both pass the guard.
#[tracing::instrument("Updating order status", skip(conn))]
pub async fn update_order_status(
    mut conn: DbConnection,
    order_id: i32,
    status: OrderStatus,
) -> Result<Order, UpdateOrderStatusError> {
    let order = spawn_blocking_with_tracing(move || {
        conn.transaction::<Order, UpdateOrderStatusError, _>(|conn| {
            let order = orders::table
                .find(order_id)
                .for_update()
                .first::<Order>(conn)
                .optional()?
                .ok_or(UpdateOrderStatusError::NoSuchOrder(order_id))?;

            if !order.status.can_transition_to(status) {
                return Err(UpdateOrderStatusError::InvalidTransition {
                    from: order.status,
                    to: status,
                });
            }

            let updated = diesel::update(orders::table.find(order_id))
                .set((
                    orders::status.eq(status),
                    orders::updated_at.eq(diesel::dsl::now),
                ))
                .get_result::<Order>(conn)?;

            Ok(updated)
        })
    })
    .await??;

    Ok(order)
}

// The order's delivery record, if the order exists.
#[tracing::instrument("Getting delivery for order", skip(conn))]
pub async fn get_delivery_for_order(
    mut conn: DbConnection,
    order_id: i32,
) -> Result<Option<Delivery>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        deliveries::table
            .filter(deliveries::order_id.eq(order_id))
            .first::<Delivery>(&mut conn)
            .optional()
            .context("Failed to query delivery for order")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}
