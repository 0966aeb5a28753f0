use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equater::{
  adapters::http::{RequestIdMiddleware, configure_system_routes, configure_user_routes},
  application::account_deletion::{
    DeletionWorker, ProcessAccountDeletionUseCase, RequestAccountDeletionUseCase,
  },
  domain::account_deletion::{
    AccountDeletionOrchestrator, CascadeCleaners, CascadeDependencies, DeletionQueue,
    PlaceholderResolver,
  },
  domain::banking::ports::{BankLinkGateway, PaymentGateway},
  infrastructure::{
    config::{Config, QueueBackend},
    metrics::DeletionMetrics,
    notifications::LoggingNotifier,
    persistence::postgres::{
      PostgresBankTransactionRepository, PostgresDeviceRepository,
      PostgresLinkedAccountRepository, PostgresLoginLogRepository, PostgresRelationshipRepository,
      PostgresSharedExpenseRepository, PostgresUserInviteRepository, PostgresUserRepository,
    },
    providers::{DisabledProvider, DwollaPaymentGateway, PlaidBankLinkGateway},
    queue::{InMemoryDeletionQueue, RedisDeletionQueue},
    security::ServiceTokenVerifier,
  },
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "equater=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting Equater account deletion service");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  let verifier = ServiceTokenVerifier::from_hex_digest(&config.security.service_token_sha256)
    .context("security.service_token_sha256 must be a hex SHA-256 digest")?;

  tracing::info!("Connecting to database");
  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .map_err(|_| {
    anyhow::anyhow!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Could not connect to database")?;
  tracing::info!("Database connection pool created");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  let queue: Arc<dyn DeletionQueue> = match config.queue.backend {
    QueueBackend::Redis => {
      let redis_client =
        redis::Client::open(config.redis.url.clone()).context("Invalid Redis URL")?;
      let redis_conn = tokio::time::timeout(
        Duration::from_secs(config.redis.connect_timeout_seconds),
        redis_client.get_connection_manager(),
      )
      .await
      .map_err(|_| {
        anyhow::anyhow!(
          "Redis connection timed out after {} seconds. Is Redis running?",
          config.redis.connect_timeout_seconds
        )
      })?
      .context("Could not connect to Redis")?;

      let queue = RedisDeletionQueue::new(
        redis_conn,
        config.queue.key_prefix.clone(),
        config.deletion.max_delivery_attempts,
      );
      let recovered = queue
        .recover_in_flight()
        .await
        .context("Failed to recover in-flight deletions")?;
      if recovered > 0 {
        tracing::warn!("Requeued {} deletions interrupted by the last shutdown", recovered);
      }
      Arc::new(queue)
    }
    QueueBackend::Memory => {
      tracing::warn!("Using in-memory deletion queue; queued deletions are lost on restart");
      Arc::new(InMemoryDeletionQueue::new(
        config.deletion.max_delivery_attempts,
      ))
    }
  };

  let payment_gateway: Arc<dyn PaymentGateway> = match &config.payments {
    Some(payments) => Arc::new(
      DwollaPaymentGateway::new(
        payments.base_url.clone(),
        payments.access_token.clone(),
        Duration::from_secs(payments.request_timeout_seconds),
      )
      .context("Failed to build payments client")?,
    ),
    None => Arc::new(DisabledProvider::new("payments")),
  };

  let bank_link_gateway: Arc<dyn BankLinkGateway> = match &config.bank_link {
    Some(bank_link) => Arc::new(
      PlaidBankLinkGateway::new(
        bank_link.base_url.clone(),
        bank_link.client_id.clone(),
        bank_link.secret.clone(),
        Duration::from_secs(bank_link.request_timeout_seconds),
      )
      .context("Failed to build bank-link client")?,
    ),
    None => Arc::new(DisabledProvider::new("bank_link")),
  };

  let user_repo = Arc::new(PostgresUserRepository::new(db_pool.clone()));
  let account_repo = Arc::new(PostgresLinkedAccountRepository::new(db_pool.clone()));

  let placeholder = PlaceholderResolver::new(
    user_repo.clone(),
    account_repo.clone(),
    config.deletion.placeholder_email.clone(),
  )
  .resolve()
  .await
  .context("Deactivated placeholder account is not provisioned")?;
  tracing::info!("Using placeholder user {}", placeholder.user_id);

  let metrics = Arc::new(DeletionMetrics::new().context("Failed to register metrics")?);

  let deps = CascadeDependencies {
    user_repo: user_repo.clone(),
    relationship_repo: Arc::new(PostgresRelationshipRepository::new(db_pool.clone())),
    device_repo: Arc::new(PostgresDeviceRepository::new(db_pool.clone())),
    invite_repo: Arc::new(PostgresUserInviteRepository::new(db_pool.clone())),
    login_log_repo: Arc::new(PostgresLoginLogRepository::new(db_pool.clone())),
    account_repo,
    bank_transaction_repo: Arc::new(PostgresBankTransactionRepository::new(db_pool.clone())),
    expense_repo: Arc::new(PostgresSharedExpenseRepository::new(db_pool.clone())),
    payment_gateway,
    bank_link_gateway,
    notifier: Arc::new(LoggingNotifier),
    observer: metrics.clone(),
  };

  let orchestrator = Arc::new(AccountDeletionOrchestrator::new(
    CascadeCleaners::assemble(
      &deps,
      &placeholder,
      config.deletion.external_failure_policy,
    ),
    placeholder.clone(),
    metrics.clone(),
  ));

  let request_use_case = Arc::new(RequestAccountDeletionUseCase::new(
    user_repo.clone(),
    queue.clone(),
    placeholder,
  ));
  let process_use_case = Arc::new(ProcessAccountDeletionUseCase::new(
    user_repo,
    orchestrator,
  ));

  let shutdown = CancellationToken::new();
  let worker = DeletionWorker::new(
    queue,
    process_use_case,
    Duration::from_secs(config.queue.reserve_timeout_seconds),
  );
  let worker_handle = {
    let shutdown = shutdown.clone();
    tokio::spawn(async move { worker.run(shutdown).await })
  };

  let server_host = config.server.host.clone();
  let server_port = config.server.port;
  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  let server_result = HttpServer::new(move || {
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .app_data(web::Data::new(request_use_case.clone()))
      .app_data(web::Data::new(metrics.clone()))
      .configure(configure_system_routes)
      .service(
        web::scope("/api/v1/users").configure(|cfg| configure_user_routes(cfg, verifier.clone())),
      )
  })
  .bind((server_host, server_port))
  .context("Failed to bind HTTP server")?
  .run()
  .await;

  tracing::info!("HTTP server stopped, waiting for the deletion worker");
  shutdown.cancel();
  if let Err(e) = worker_handle.await {
    tracing::error!("Deletion worker panicked: {}", e);
  }

  server_result.context("HTTP server failed")?;
  Ok(())
}
