use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use diesel::{r2d2::ConnectionManager, PgConnection};
use r2d2::Pool;
use secrecy::SecretString;
use tracing_actix_web::TracingLogger;

use crate::{
    auth::jwt::Tokenizer,
    configuration::Settings,
    domain::user_email::UserEmail,
    email_client::EmailClient,
    routes::{
        admin::{
            admin_dashboard, admin_delivery_stats, admin_orders, admin_restaurant_status,
            admin_restaurants, admin_users,
        },
        auth::{login, logout, refresh, register},
        deliveries::{
            all_deliveries, available_deliveries, get_delivery, my_deliveries,
            put_delivery_assignment, put_delivery_status,
        },
        health_check::health_check,
        menu::{create_menu_item, get_categories, get_menu, get_menu_item, put_menu_item, remove_menu_item},
        orders::{all_orders, get_order, my_orders, place_order, put_order_status, restaurant_orders},
        profile::{change_password, get_profile, update_profile},
        restaurants::{
            create_restaurant, get_restaurant, get_restaurant_menu, list_restaurants,
            put_restaurant, remove_restaurant,
        },
    },
    utils::DbPool,
};

pub struct Application {
    pub server: Server,
    pub host: String,
    pub port: u16,
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Self, anyhow::Error> {
        // Connections are opened on demand so idle applications (and the test
        // suite's per-test servers) hold no more than they use.
        let pool: DbPool = Pool::builder()
            .max_size(settings.database.pool_size)
            .min_idle(Some(0))
            .build(ConnectionManager::<PgConnection>::new(
                settings.database.get_database_table_url(),
            ))?;

        let tokenizer = Tokenizer::new(&settings.jwt);

        let sender = UserEmail::parse(settings.email.sender.clone())
            .map_err(|e| anyhow::anyhow!("Invalid sender email address: {}", e))?;
        let email_client = EmailClient::new(
            settings.email.api_uri.clone(),
            sender,
            SecretString::new(settings.email.authorization_token.clone().into()),
            settings.email.timeout_seconds,
        );

        let host = settings.application.host.clone();
        let listener = TcpListener::bind((host.as_str(), settings.application.port))?;
        let port = listener.local_addr()?.port();

        let server = Self::build_server(listener, pool, tokenizer, email_client)?;

        Ok(Application { server, host, port })
    }

    fn build_server(
        listener: TcpListener,
        pool: DbPool,
        tokenizer: Tokenizer,
        email_client: EmailClient,
    ) -> Result<Server, anyhow::Error> {
        let pool = web::Data::new(pool);
        let tokenizer = web::Data::new(tokenizer);
        let email_client = web::Data::new(email_client);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(TracingLogger::default())
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("/api")
                        .service(
                            web::scope("/auth")
                                .route("/register", web::post().to(register))
                                .route("/login", web::post().to(login))
                                .route("/refresh", web::post().to(refresh))
                                .route("/logout", web::post().to(logout)),
                        )
                        .service(
                            web::scope("/profile")
                                .route("", web::get().to(get_profile))
                                .route("", web::put().to(update_profile))
                                .route("/password", web::put().to(change_password)),
                        )
                        .service(
                            web::scope("/restaurants")
                                .route("", web::get().to(list_restaurants))
                                .route("", web::post().to(create_restaurant))
                                .route("/{id}", web::get().to(get_restaurant))
                                .route("/{id}", web::put().to(put_restaurant))
                                .route("/{id}", web::delete().to(remove_restaurant))
                                .route("/{id}/menu", web::get().to(get_restaurant_menu)),
                        )
                        .service(
                            web::scope("/menu")
                                .route("", web::get().to(get_menu))
                                .route("", web::post().to(create_menu_item))
                                .route("/categories", web::get().to(get_categories))
                                .route("/{id}", web::get().to(get_menu_item))
                                .route("/{id}", web::put().to(put_menu_item))
                                .route("/{id}", web::delete().to(remove_menu_item)),
                        )
                        .service(
                            web::scope("/orders")
                                .route("", web::get().to(all_orders))
                                .route("", web::post().to(place_order))
                                .route("/my-orders", web::get().to(my_orders))
                                .route("/restaurant/{id}", web::get().to(restaurant_orders))
                                .route("/{id}", web::get().to(get_order))
                                .route("/{id}/status", web::put().to(put_order_status)),
                        )
                        .service(
                            web::scope("/deliveries")
                                .route("", web::get().to(all_deliveries))
                                .route("/available", web::get().to(available_deliveries))
                                .route("/my-deliveries", web::get().to(my_deliveries))
                                .route("/{id}", web::get().to(get_delivery))
                                .route("/{id}/assign", web::put().to(put_delivery_assignment))
                                .route("/{id}/status", web::put().to(put_delivery_status)),
                        )
                        .service(
                            web::scope("/admin")
                                .route("/dashboard", web::get().to(admin_dashboard))
                                .route("/users", web::get().to(admin_users))
                                .route("/restaurants", web::get().to(admin_restaurants))
                                .route(
                                    "/restaurants/{id}/status",
                                    web::put().to(admin_restaurant_status),
                                )
                                .route("/orders", web::get().to(admin_orders))
                                .route("/deliveries/stats", web::get().to(admin_delivery_stats)),
                        ),
                )
                .app_data(pool.clone())
                .app_data(tokenizer.clone())
                .app_data(email_client.clone())
        })
        .listen(listener)?
        .run();

        Ok(server)
    }
}
