use crate::helpers::TestApp;

#[actix_web::test]
async fn owner_adds_item_to_own_restaurant() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;

    let response = app
        .post_json(
            "/api/menu",
            Some(&owner.token),
            &serde_json::json!({
                "restaurant_id": restaurant_id,
                "name": "Ramen",
                "price": "11.00",
                "category": "mains",
            }),
        )
        .await;

    assert_eq!(201, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["name"], "Ramen");
    assert_eq!(json["is_available"], true);
}

#[actix_web::test]
async fn owner_cannot_add_item_to_foreign_restaurant() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let other_owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;

    let response = app
        .post_json(
            "/api/menu",
            Some(&other_owner.token),
            &serde_json::json!({
                "restaurant_id": restaurant_id,
                "name": "Intruder Special",
                "price": "1.00",
            }),
        )
        .await;

    assert_eq!(403, response.status().as_u16());
}

#[actix_web::test]
async fn customer_cannot_manage_the_menu() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let customer = app.register_user("customer").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Udon", "9.00")
        .await;

    let create = app
        .post_json(
            "/api/menu",
            Some(&customer.token),
            &serde_json::json!({
                "restaurant_id": restaurant_id,
                "name": "Freebie",
                "price": "0.00",
            }),
        )
        .await;
    assert_eq!(403, create.status().as_u16());

    let update = app
        .put_json(
            &format!("/api/menu/{}", item_id),
            Some(&customer.token),
            &serde_json::json!({ "price": "0.01" }),
        )
        .await;
    assert_eq!(403, update.status().as_u16());

    let delete = app
        .delete(&format!("/api/menu/{}", item_id), Some(&customer.token))
        .await;
    assert_eq!(403, delete.status().as_u16());
}

#[actix_web::test]
async fn owner_updates_and_deletes_own_item() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Gyoza", "5.00")
        .await;

    let update = app
        .put_json(
            &format!("/api/menu/{}", item_id),
            Some(&owner.token),
            &serde_json::json!({ "price": "5.50", "is_available": false }),
        )
        .await;
    assert_eq!(200, update.status().as_u16());

    let json: serde_json::Value = update.json().await.unwrap();
    assert_eq!(json["price"], "5.50");
    assert_eq!(json["is_available"], false);

    let delete = app
        .delete(&format!("/api/menu/{}", item_id), Some(&owner.token))
        .await;
    assert_eq!(200, delete.status().as_u16());

    let gone = app.get(&format!("/api/menu/{}", item_id), None).await;
    assert_eq!(404, gone.status().as_u16());
}

#[actix_web::test]
async fn foreign_owner_cannot_update_or_delete_item() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let other_owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;
    let item_id = app
        .add_menu_item(&owner.token, restaurant_id, "Tempura", "7.00")
        .await;

    let update = app
        .put_json(
            &format!("/api/menu/{}", item_id),
            Some(&other_owner.token),
            &serde_json::json!({ "price": "0.01" }),
        )
        .await;
    assert_eq!(403, update.status().as_u16());

    let delete = app
        .delete(&format!("/api/menu/{}", item_id), Some(&other_owner.token))
        .await;
    assert_eq!(403, delete.status().as_u16());
}

#[actix_web::test]
async fn categories_are_listed_once_each() {
    let app = TestApp::spawn_app().await;
    let admin = app.register_user("admin").await;
    let owner = app.register_user("restaurant_owner").await;
    let restaurant_id = app.create_active_restaurant(&admin, &owner).await;

    for (name, category) in [
        ("Soup", "starters"),
        ("Salad", "starters"),
        ("Pie", "desserts"),
    ] {
        let response = app
            .post_json(
                "/api/menu",
                Some(&owner.token),
                &serde_json::json!({
                    "restaurant_id": restaurant_id,
                    "name": name,
                    "price": "4.00",
                    "category": category,
                }),
            )
            .await;
        assert_eq!(201, response.status().as_u16());
    }

    let response = app.get("/api/menu/categories", None).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    let mut categories: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    categories.sort();
    assert_eq!(categories, vec!["desserts", "starters"]);
}

#[actix_web::test]
async fn unknown_menu_item_returns_404() {
    let app = TestApp::spawn_app().await;

    let response = app.get("/api/menu/424242", None).await;

    assert_eq!(404, response.status().as_u16());
}
