use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::NaiveDateTime;
use diesel::{Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use serde::Serialize;
use thiserror::Error;

use crate::{
    models::{Delivery, DeliveryStatus, Order, OrderStatus, User, UserView},
    schema::{deliveries, orders, users},
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, DbConnection},
};

// Delivery together with its order, the ordering customer and the assigned
// rider (when there is one).
#[derive(Serialize)]
pub struct DeliveryView {
    pub id: i32,
    pub status: DeliveryStatus,
    pub assigned_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub current_location: Option<String>,
    pub created_at: NaiveDateTime,
    pub order: Order,
    pub customer: UserView,
    pub rider: Option<UserView>,
}

fn load_delivery_view(
    conn: &mut DbConnection,
    delivery: Delivery,
) -> Result<DeliveryView, anyhow::Error> {
    let order: Order = orders::table
        .find(delivery.order_id)
        .first(conn)
        .context("Failed to load delivery order")?;

    let customer: User = users::table
        .find(order.user_id)
        .first(conn)
        .context("Failed to load delivery customer")?;

    let rider = match delivery.rider_id {
        Some(rider_id) => users::table
            .find(rider_id)
            .first::<User>(conn)
            .optional()
            .context("Failed to load delivery rider")?
            .map(UserView::from),
        None => None,
    };

    Ok(DeliveryView {
        id: delivery.id,
        status: delivery.status,
        assigned_at: delivery.assigned_at,
        delivered_at: delivery.delivered_at,
        current_location: delivery.current_location,
        created_at: delivery.created_at,
        order,
        customer: customer.into(),
        rider,
    })
}

fn load_delivery_views(
    conn: &mut DbConnection,
    rows: Vec<Delivery>,
) -> Result<Vec<DeliveryView>, anyhow::Error> {
    rows.into_iter()
        .map(|delivery| load_delivery_view(conn, delivery))
        .collect()
}

#[tracing::instrument("Listing all deliveries", skip_all)]
pub async fn list_all_deliveries(
    mut conn: DbConnection,
) -> Result<Vec<DeliveryView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<DeliveryView>, anyhow::Error, _>(|conn| {
            let rows = deliveries::table
                .order(deliveries::created_at.desc())
                .load::<Delivery>(conn)
                .context("Failed to load deliveries")?;

            load_delivery_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// "Available" means not yet assigned to any rider.
#[tracing::instrument("Listing available deliveries", skip_all)]
pub async fn list_available_deliveries(
    mut conn: DbConnection,
) -> Result<Vec<DeliveryView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<DeliveryView>, anyhow::Error, _>(|conn| {
            let rows = deliveries::table
                .filter(deliveries::status.eq(DeliveryStatus::Pending))
                .order(deliveries::created_at.desc())
                .load::<Delivery>(conn)
                .context("Failed to load available deliveries")?;

            load_delivery_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Listing deliveries for rider", skip(conn))]
pub async fn list_deliveries_by_rider(
    mut conn: DbConnection,
    rider_id: i32,
) -> Result<Vec<DeliveryView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<DeliveryView>, anyhow::Error, _>(|conn| {
            let rows = deliveries::table
                .filter(deliveries::rider_id.eq(rider_id))
                .order(deliveries::created_at.desc())
                .load::<Delivery>(conn)
                .context("Failed to load rider deliveries")?;

            load_delivery_views(conn, rows)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting delivery by id", skip(conn))]
pub async fn get_delivery_by_id(
    mut conn: DbConnection,
    delivery_id: i32,
) -> Result<Option<Delivery>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        deliveries::table
            .find(delivery_id)
            .first::<Delivery>(&mut conn)
            .optional()
            .context("Failed to query delivery by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

#[tracing::instrument("Getting hydrated delivery by id", skip(conn))]
pub async fn get_delivery_view(
    mut conn: DbConnection,
    delivery_id: i32,
) -> Result<Option<DeliveryView>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Option<DeliveryView>, anyhow::Error, _>(|conn| {
            let delivery = deliveries::table
                .find(delivery_id)
                .first::<Delivery>(conn)
                .optional()
                .context("Failed to query delivery by id")?;

            match delivery {
                Some(delivery) => Ok(Some(load_delivery_view(conn, delivery)?)),
                None => Ok(None),
            }
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with mutating a delivery record
#[derive(Error)]
pub enum UpdateDeliveryError {
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("delivery {0} doesn't exist")]
    NoSuchDelivery(i32),
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    #[error("Failed to hydrate delivery")]
    HydrationError(#[source] anyhow::Error),
}

impl Debug for UpdateDeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument("Assigning delivery to rider", skip(conn))]
pub async fn assign_delivery(
    mut conn: DbConnection,
    delivery_id: i32,
    rider_id: i32,
) -> Result<DeliveryView, UpdateDeliveryError> {
    let view = spawn_blocking_with_tracing(move || {
        conn.transaction::<DeliveryView, UpdateDeliveryError, _>(|conn| {
            let delivery = diesel::update(deliveries::table.find(delivery_id))
                .set((
                    deliveries::rider_id.eq(rider_id),
                    deliveries::status.eq(DeliveryStatus::Assigned),
                    deliveries::assigned_at.eq(diesel::dsl::now),
                    deliveries::updated_at.eq(diesel::dsl::now),
                ))
                .get_result::<Delivery>(conn)
                .optional()?
                .ok_or(UpdateDeliveryError::NoSuchDelivery(delivery_id))?;

            load_delivery_view(conn, delivery).map_err(UpdateDeliveryError::HydrationError)
        })
    })
    .await??;

    Ok(view)
}

// Updates the delivery and, for pickup and handover, cascades to the parent
// order inside the same transaction so the two never diverge. The transition
// check runs against a locked row in that transaction, so two racing requests
// cannot both pass it.
#[tracing::instrument("Updating delivery status", skip(conn))]
pub async fn update_delivery_status(
    mut conn: DbConnection,
    delivery_id: i32,
    status: DeliveryStatus,
    location: Option<String>,
) -> Result<DeliveryView, UpdateDeliveryError> {
    let view = spawn_blocking_with_tracing(move || {
        conn.transaction::<DeliveryView, UpdateDeliveryError, _>(|conn| {
            let current = deliveries::table
                .find(delivery_id)
                .for_update()
                .first::<Delivery>(conn)
                .optional()?
                .ok_or(UpdateDeliveryError::NoSuchDelivery(delivery_id))?;

            if !current.status.can_transition_to(status) {
                return Err(UpdateDeliveryError::InvalidTransition {
                    from: current.status,
                    to: status,
                });
            }

            let delivery = match status {
                DeliveryStatus::Delivered => diesel::update(deliveries::table.find(delivery_id))
                    .set((
                        deliveries::status.eq(status),
                        deliveries::delivered_at.eq(diesel::dsl::now),
                        deliveries::updated_at.eq(diesel::dsl::now),
                    ))
                    .get_result::<Delivery>(conn)
                    .optional()?,
                _ => diesel::update(deliveries::table.find(delivery_id))
                    .set((
                        deliveries::status.eq(status),
                        deliveries::updated_at.eq(diesel::dsl::now),
                    ))
                    .get_result::<Delivery>(conn)
                    .optional()?,
            }
            .ok_or(UpdateDeliveryError::NoSuchDelivery(delivery_id))?;

            if let Some(location) = location {
                diesel::update(deliveries::table.find(delivery_id))
                    .set(deliveries::current_location.eq(location))
                    .execute(conn)?;
            }

            let cascaded_status = match status {
                DeliveryStatus::PickedUp => Some(OrderStatus::OutForDelivery),
                DeliveryStatus::Delivered => Some(OrderStatus::Delivered),
                _ => None,
            };

            if let Some(order_status) = cascaded_status {
                diesel::update(orders::table.find(delivery.order_id))
                    .set((
                        orders::status.eq(order_status),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }

            let refreshed = deliveries::table
                .find(delivery_id)
                .first::<Delivery>(conn)?;

            load_delivery_view(conn, refreshed).map_err(UpdateDeliveryError::HydrationError)
        })
    })
    .await??;

    Ok(view)
}
