use commerce_service::infrastructure::kafka::KafkaEventPublisher;
use commerce_service::infrastructure::redis_cache::RedisEntityCache;
use commerce_service::{build_server, build_state, consumer, create_pool, jobs, run_migrations, Config};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();

    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    let cache = RedisEntityCache::new(&config.redis_url).expect("Failed to open Redis client");
    let publisher =
        KafkaEventPublisher::new(&config.kafka_brokers).expect("Failed to create Kafka producer");
    let state = build_state(pool, cache, publisher);

    let consumer_state = state.clone();
    let consumer_config = config.clone();
    tokio::spawn(async move {
        if let Err(e) = consumer::run(consumer_state, consumer_config).await {
            log::error!("queue consumer stopped: {}", e);
        }
    });
    tokio::spawn(jobs::run_report_job(
        state.clone(),
        config.report_interval_secs,
    ));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
