use crate::helpers::{TestApp, TestUser};

// Places one order and returns (order_id, delivery_id). Every order creates
// exactly one pending delivery.
async fn order_with_delivery(
    app: &TestApp,
    admin: &TestUser,
    owner: &TestUser,
    customer: &TestUser,
) -> (i64, i64) {
    let restaurant_id = app.create_active_restaurant(admin, owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Noodles", "8.00")
        .await;

    let response = app
        .place_order(&customer.token, restaurant_id, &[(item_id, 1)])
        .await;
    assert_eq!(201, response.status().as_u16());
    let json: serde_json::Value = response.json().await.unwrap();
    let order_id = json["id"].as_i64().unwrap();

    let deliveries = app.get("/api/deliveries", Some(&admin.token)).await;
    assert_eq!(200, deliveries.status().as_u16());
    let json: serde_json::Value = deliveries.json().await.unwrap();
    let delivery = json
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["order"]["id"].as_i64() == Some(order_id))
        .expect("No delivery created for the order");

    (order_id, delivery["id"].as_i64().unwrap())
}

#[actix_web::test]
async fn every_order_spawns_a_pending_delivery() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let response = app
        .get(&format!("/api/deliveries/{}", delivery_id), Some(&admin.token))
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "pending");
    assert!(json["rider"].is_null());
}

#[actix_web::test]
async fn unassigned_deliveries_are_listed_as_available_to_riders() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let response = app.get("/api/deliveries/available", Some(&rider.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    let available = json.as_array().unwrap();
    assert_eq!(1, available.len());
    assert_eq!(available[0]["id"].as_i64().unwrap(), delivery_id);
}

#[actix_web::test]
async fn admin_assigns_a_delivery_to_a_rider() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/assign", delivery_id),
            Some(&admin.token),
            &serde_json::json!({ "rider_id": rider.id }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "assigned");
    assert_eq!(json["rider"]["id"].as_i64().unwrap() as i32, rider.id);
    assert!(!json["assigned_at"].is_null());

    // It no longer shows up as available.
    let available = app.get("/api/deliveries/available", Some(&rider.token)).await;
    let json: serde_json::Value = available.json().await.unwrap();
    assert_eq!(0, json.as_array().unwrap().len());

    // But it does show up in the rider's own list.
    let mine = app
        .get("/api/deliveries/my-deliveries", Some(&rider.token))
        .await;
    let json: serde_json::Value = mine.json().await.unwrap();
    assert_eq!(1, json.as_array().unwrap().len());
}

#[actix_web::test]
async fn assigning_to_a_non_rider_returns_400() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/assign", delivery_id),
            Some(&admin.token),
            &serde_json::json!({ "rider_id": customer.id }),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[actix_web::test]
async fn a_delivery_cannot_be_assigned_twice() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;
    let other_rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let first = app
        .put_json(
            &format!("/api/deliveries/{}/assign", delivery_id),
            Some(&admin.token),
            &serde_json::json!({ "rider_id": rider.id }),
        )
        .await;
    assert_eq!(200, first.status().as_u16());

    let second = app
        .put_json(
            &format!("/api/deliveries/{}/assign", delivery_id),
            Some(&admin.token),
            &serde_json::json!({ "rider_id": other_rider.id }),
        )
        .await;
    assert_eq!(400, second.status().as_u16());
}

#[actix_web::test]
async fn rider_cannot_assign_deliveries() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/assign", delivery_id),
            Some(&rider.token),
            &serde_json::json!({ "rider_id": rider.id }),
        )
        .await;

    assert_eq!(403, response.status().as_u16());
}

#[actix_web::test]
async fn pickup_cascades_the_order_to_out_for_delivery() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (order_id, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    app.put_json(
        &format!("/api/deliveries/{}/assign", delivery_id),
        Some(&admin.token),
        &serde_json::json!({ "rider_id": rider.id }),
    )
    .await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(&rider.token),
            &serde_json::json!({ "status": "picked_up", "current_location": "Depot" }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "picked_up");
    assert_eq!(json["current_location"], "Depot");
    assert_eq!(json["order"]["status"], "out_for_delivery");

    let order = app
        .get(&format!("/api/orders/{}", order_id), Some(&customer.token))
        .await;
    let json: serde_json::Value = order.json().await.unwrap();
    assert_eq!(json["status"], "out_for_delivery");
}

#[actix_web::test]
async fn handover_cascades_the_order_to_delivered() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (order_id, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    app.put_json(
        &format!("/api/deliveries/{}/assign", delivery_id),
        Some(&admin.token),
        &serde_json::json!({ "rider_id": rider.id }),
    )
    .await;

    app.put_json(
        &format!("/api/deliveries/{}/status", delivery_id),
        Some(&rider.token),
        &serde_json::json!({ "status": "picked_up" }),
    )
    .await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(&rider.token),
            &serde_json::json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["status"], "delivered");
    assert!(!json["delivered_at"].is_null());
    assert_eq!(json["order"]["status"], "delivered");

    let order = app
        .get(&format!("/api/orders/{}", order_id), Some(&customer.token))
        .await;
    let json: serde_json::Value = order.json().await.unwrap();
    assert_eq!(json["status"], "delivered");
}

#[actix_web::test]
async fn delivering_before_pickup_returns_400() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    app.put_json(
        &format!("/api/deliveries/{}/assign", delivery_id),
        Some(&admin.token),
        &serde_json::json!({ "rider_id": rider.id }),
    )
    .await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(&rider.token),
            &serde_json::json!({ "status": "delivered" }),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[actix_web::test]
async fn a_delivered_delivery_accepts_no_further_updates() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    app.put_json(
        &format!("/api/deliveries/{}/assign", delivery_id),
        Some(&admin.token),
        &serde_json::json!({ "rider_id": rider.id }),
    )
    .await;

    for status in ["picked_up", "delivered"] {
        let response = app
            .put_json(
                &format!("/api/deliveries/{}/status", delivery_id),
                Some(&rider.token),
                &serde_json::json!({ "status": status }),
            )
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let repeated = app
        .put_json(
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(&rider.token),
            &serde_json::json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(400, repeated.status().as_u16());
}

#[actix_web::test]
async fn rider_cannot_update_a_delivery_assigned_to_someone_else() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;
    let other_rider = app.register_user("rider").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    app.put_json(
        &format!("/api/deliveries/{}/assign", delivery_id),
        Some(&admin.token),
        &serde_json::json!({ "rider_id": rider.id }),
    )
    .await;

    let response = app
        .put_json(
            &format!("/api/deliveries/{}/status", delivery_id),
            Some(&other_rider.token),
            &serde_json::json!({ "status": "picked_up" }),
        )
        .await;

    assert_eq!(403, response.status().as_u16());
}

#[actix_web::test]
async fn customer_sees_own_delivery_but_not_others() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let snoop = app.register_user("customer").await;

    let (_, delivery_id) = order_with_delivery(&app, &admin, &owner, &customer).await;

    let own = app
        .get(
            &format!("/api/deliveries/{}", delivery_id),
            Some(&customer.token),
        )
        .await;
    assert_eq!(200, own.status().as_u16());

    let foreign = app
        .get(&format!("/api/deliveries/{}", delivery_id), Some(&snoop.token))
        .await;
    assert_eq!(403, foreign.status().as_u16());
}

#[actix_web::test]
async fn customers_cannot_list_deliveries() {
    let app = TestApp::spawn_app().await;
    let customer = app.register_user("customer").await;

    let all = app.get("/api/deliveries", Some(&customer.token)).await;
    assert_eq!(403, all.status().as_u16());

    let available = app
        .get("/api/deliveries/available", Some(&customer.token))
        .await;
    assert_eq!(403, available.status().as_u16());

    let mine = app
        .get("/api/deliveries/my-deliveries", Some(&customer.token))
        .await;
    assert_eq!(403, mine.status().as_u16());
}
