pub mod application;
pub mod config;
pub mod consumer;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod jobs;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};

use application::address_service::AddressService;
use application::order_service::OrderService;
use application::product_service::ProductService;
use application::report_service::ReportService;
use application::user_service::UserService;
use infrastructure::address_repo::DieselAddressRepository;
use infrastructure::kafka::KafkaEventPublisher;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::product_repo::DieselProductRepository;
use infrastructure::redis_cache::RedisEntityCache;
use infrastructure::report_repo::DieselReportRepository;
use infrastructure::user_repo::DieselUserRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

// ── Service wiring ───────────────────────────────────────────────────────────

pub type AppUserService = UserService<DieselUserRepository, RedisEntityCache>;
pub type AppAddressService = AddressService<DieselAddressRepository, DieselUserRepository>;
pub type AppProductService = ProductService<DieselProductRepository, RedisEntityCache>;
pub type AppOrderService =
    OrderService<DieselOrderRepository, DieselUserRepository, RedisEntityCache>;
pub type AppReportService = ReportService<DieselReportRepository, KafkaEventPublisher>;

/// Shared handle to the fully wired services. Cloning is cheap; the HTTP
/// server, the queue consumer and the report job all hold one.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<AppUserService>,
    pub addresses: Arc<AppAddressService>,
    pub products: Arc<AppProductService>,
    pub orders: Arc<AppOrderService>,
    pub reports: Arc<AppReportService>,
}

pub fn build_state(
    pool: DbPool,
    cache: RedisEntityCache,
    publisher: KafkaEventPublisher,
) -> AppState {
    AppState {
        users: Arc::new(UserService::new(
            DieselUserRepository::new(pool.clone()),
            cache.clone(),
        )),
        addresses: Arc::new(AddressService::new(
            DieselAddressRepository::new(pool.clone()),
            DieselUserRepository::new(pool.clone()),
        )),
        products: Arc::new(ProductService::new(
            DieselProductRepository::new(pool.clone()),
            cache.clone(),
        )),
        orders: Arc::new(OrderService::new(
            DieselOrderRepository::new(pool.clone()),
            DieselUserRepository::new(pool.clone()),
            cache,
        )),
        reports: Arc::new(ReportService::new(
            DieselReportRepository::new(pool),
            publisher,
        )),
    }
}

// ── HTTP surface ─────────────────────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::addresses::create_address,
        handlers::addresses::get_address,
        handlers::addresses::list_addresses,
        handlers::addresses::update_address,
        handlers::addresses::delete_address,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::list_products,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_order_status,
        handlers::orders::delete_order,
        handlers::reports::list_reports,
    ),
    components(schemas(
        handlers::users::CreateUserRequest,
        handlers::users::UpdateUserRequest,
        handlers::users::UserResponse,
        handlers::users::ListUsersResponse,
        handlers::addresses::CreateAddressRequest,
        handlers::addresses::UpdateAddressRequest,
        handlers::addresses::AddressResponse,
        handlers::addresses::ListAddressesResponse,
        handlers::products::CreateProductRequest,
        handlers::products::UpdateProductRequest,
        handlers::products::ProductResponse,
        handlers::products::ListProductsResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::UpdateOrderStatusRequest,
        handlers::orders::OrderLineResponse,
        handlers::orders::OrderResponse,
        handlers::orders::ListOrdersResponse,
        handlers::reports::ReportResponse,
        handlers::reports::ListReportsResponse,
    ))
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/users")
                    .route("", web::post().to(handlers::users::create_user))
                    .route("", web::get().to(handlers::users::list_users))
                    .route("/{id}", web::get().to(handlers::users::get_user))
                    .route("/{id}", web::put().to(handlers::users::update_user))
                    .route("/{id}", web::delete().to(handlers::users::delete_user)),
            )
            .service(
                web::scope("/addresses")
                    .route("", web::post().to(handlers::addresses::create_address))
                    .route("", web::get().to(handlers::addresses::list_addresses))
                    .route("/{id}", web::get().to(handlers::addresses::get_address))
                    .route("/{id}", web::put().to(handlers::addresses::update_address))
                    .route("/{id}", web::delete().to(handlers::addresses::delete_address)),
            )
            .service(
                web::scope("/products")
                    .route("", web::post().to(handlers::products::create_product))
                    .route("", web::get().to(handlers::products::list_products))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/status",
                        web::put().to(handlers::orders::update_order_status),
                    )
                    .route("/{id}", web::delete().to(handlers::orders::delete_order)),
            )
            .service(
                web::scope("/reports")
                    .route("", web::get().to(handlers::reports::list_reports)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
