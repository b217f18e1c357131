use crate::helpers::TestApp;

#[actix_web::test]
async fn dashboard_aggregates_exact_counts_and_revenue() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Sushi", "12.50")
        .await;

    let first = app
        .place_order(&customer.token, restaurant_id, &[(item_id, 2)])
        .await;
    assert_eq!(201, first.status().as_u16());
    let second = app
        .place_order(&customer.token, restaurant_id, &[(item_id, 1)])
        .await;
    assert_eq!(201, second.status().as_u16());

    let response = app.get("/api/admin/dashboard", Some(&admin.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["totalUsers"].as_i64().unwrap(), 3);
    assert_eq!(json["totalRestaurants"].as_i64().unwrap(), 1);
    assert_eq!(json["totalOrders"].as_i64().unwrap(), 2);
    // 12.50 * 2 + 12.50 = 37.50, exact.
    assert_eq!(json["totalRevenue"], "37.50");
}

#[actix_web::test]
async fn dashboard_revenue_is_zero_without_orders() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;

    let response = app.get("/api/admin/dashboard", Some(&admin.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["totalOrders"].as_i64().unwrap(), 0);
    assert_eq!(json["totalRevenue"], "0");
}

#[actix_web::test]
async fn admin_endpoints_reject_other_roles() {
    let app = TestApp::spawn_app().await;
    let customer = app.register_user("customer").await;
    let owner = app.register_user("restaurant_owner").await;
    let rider = app.register_user("rider").await;

    for token in [&customer.token, &owner.token, &rider.token] {
        for path in [
            "/api/admin/dashboard",
            "/api/admin/users",
            "/api/admin/restaurants",
            "/api/admin/orders",
            "/api/admin/deliveries/stats",
        ] {
            let response = app.get(path, Some(token)).await;
            assert_eq!(403, response.status().as_u16(), "{}", path);
        }
    }
}

#[actix_web::test]
async fn user_listing_is_paginated() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    for _ in 0..4 {
        app.register_user("customer").await;
    }

    let response = app
        .get("/api/admin/users?page=1&limit=2", Some(&admin.token))
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["users"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["total"].as_i64().unwrap(), 5);
    assert_eq!(json["pagination"]["page"].as_i64().unwrap(), 1);
    assert_eq!(json["pagination"]["pages"].as_i64().unwrap(), 3);
}

#[actix_web::test]
async fn user_listing_never_exposes_password_hashes() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    app.register_user("customer").await;

    let response = app.get("/api/admin/users", Some(&admin.token)).await;
    let json: serde_json::Value = response.json().await.unwrap();

    for user in json["users"].as_array().unwrap() {
        assert!(user.get("password").is_none());
    }
}

#[actix_web::test]
async fn restaurant_listing_includes_the_owner() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    app.create_active_restaurant(&admin, &owner).await;

    let response = app.get("/api/admin/restaurants", Some(&admin.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    let restaurants = json["restaurants"].as_array().unwrap();
    assert_eq!(1, restaurants.len());
    assert_eq!(
        restaurants[0]["owner"]["id"].as_i64().unwrap() as i32,
        owner.id
    );
    assert!(restaurants[0]["owner"].get("password").is_none());
}

#[actix_web::test]
async fn order_listing_includes_customer_and_restaurant() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Poke", "11.00")
        .await;
    app.place_order(&customer.token, restaurant_id, &[(item_id, 1)])
        .await;

    let response = app.get("/api/admin/orders", Some(&admin.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    let orders = json["orders"].as_array().unwrap();
    assert_eq!(1, orders.len());
    assert_eq!(
        orders[0]["customer"]["id"].as_i64().unwrap() as i32,
        customer.id
    );
    assert_eq!(
        orders[0]["restaurant"]["id"].as_i64().unwrap() as i32,
        restaurant_id
    );
}

#[actix_web::test]
async fn restaurant_status_update_validates_the_status() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;

    let invalid = app
        .put_json(
            &format!("/api/admin/restaurants/{}/status", restaurant_id),
            Some(&admin.token),
            &serde_json::json!({ "status": "closed_forever" }),
        )
        .await;
    assert_eq!(400, invalid.status().as_u16());

    let suspended = app
        .put_json(
            &format!("/api/admin/restaurants/{}/status", restaurant_id),
            Some(&admin.token),
            &serde_json::json!({ "status": "suspended" }),
        )
        .await;
    assert_eq!(200, suspended.status().as_u16());

    // Suspended restaurants drop out of the public listing.
    let listing = app.get("/api/restaurants", None).await;
    let json: serde_json::Value = listing.json().await.unwrap();
    assert_eq!(0, json.as_array().unwrap().len());
}

#[actix_web::test]
async fn delivery_stats_track_the_delivery_lifecycle() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let rider = app.register_user("rider").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Falafel", "6.00")
        .await;

    // Two orders: one delivery stays pending, the other goes to picked up.
    app.place_order(&customer.token, restaurant_id, &[(item_id, 1)])
        .await;
    let response = app
        .place_order(&customer.token, restaurant_id, &[(item_id, 1)])
        .await;
    let json: serde_json::Value = response.json().await.unwrap();
    let order_id = json["id"].as_i64().unwrap();

    let deliveries = app.get("/api/deliveries", Some(&admin.token)).await;
    let json: serde_json::Value = deliveries.json().await.unwrap();
    let delivery_id = json
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["order"]["id"].as_i64() == Some(order_id))
        .unwrap()["id"]
        .as_i64()
        .unwrap();

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
        .get("/api/admin/deliveries/stats", Some(&admin.token))
        .await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["pending"].as_i64().unwrap(), 1);
    assert_eq!(json["inProgress"].as_i64().unwrap(), 1);
    assert_eq!(json["completed"].as_i64().unwrap(), 0);
}
