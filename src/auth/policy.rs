use actix_web::error::ErrorForbidden;

use crate::models::UserRole;

use super::extractors::AuthenticatedUser;

// Every role-gated operation in the API. Adding a variant forces a decision
// in `allows`, so no action can ship without a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRestaurant,
    UpdateRestaurant,
    DeleteRestaurant,
    ManageMenu,
    ListAllOrders,
    ListRestaurantOrders,
    UpdateOrderStatus,
    ListAllDeliveries,
    ListAvailableDeliveries,
    ListOwnDeliveries,
    AssignDelivery,
    UpdateDeliveryStatus,
    ViewAdminPanel,
}

// Role membership only. Ownership predicates (own restaurant, own delivery)
// are checked by the handlers against the database.
pub fn allows(action: Action, role: UserRole) -> bool {
    use UserRole::{Admin, RestaurantOwner, Rider};

    match action {
        Action::CreateRestaurant => matches!(role, Admin),
        Action::UpdateRestaurant => matches!(role, Admin | RestaurantOwner),
        Action::DeleteRestaurant => matches!(role, Admin),
        Action::ManageMenu => matches!(role, Admin | RestaurantOwner),
        Action::ListAllOrders => matches!(role, Admin),
        Action::ListRestaurantOrders => matches!(role, Admin | RestaurantOwner),
        Action::UpdateOrderStatus => matches!(role, Admin | RestaurantOwner | Rider),
        Action::ListAllDeliveries => matches!(role, Admin),
        Action::ListAvailableDeliveries => matches!(role, Rider),
        Action::ListOwnDeliveries => matches!(role, Rider),
        Action::AssignDelivery => matches!(role, Admin),
        Action::UpdateDeliveryStatus => matches!(role, Admin | Rider),
        Action::ViewAdminPanel => matches!(role, Admin),
    }
}

pub fn authorize(user: &AuthenticatedUser, action: Action) -> Result<(), actix_web::Error> {
    if allows(action, user.role) {
        Ok(())
    } else {
        Err(ErrorForbidden("Access denied"))
    }
}
