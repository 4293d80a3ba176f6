use std::future::IntoFuture;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::config::UserBackend;
use crate::domain::health::ports::HealthProbe;
use crate::domain::health::service::HealthService;
use crate::domain::user::service::UserService;
use crate::inbound::http::router::create_health_router;
use crate::inbound::http::router::create_router;
use crate::inbound::http::router::create_swagger_router;
use crate::repositories::MongoUserRepository;
use crate::repositories::PostgresUserRepository;
use crate::repositories::RedisUserRepository;
use crate::user::ports::UserRepository;
use crate::user::ports::UserStore;

/// How long a listener may drain in-flight requests once shutdown starts.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(15);

struct Listener {
    name: &'static str,
    address: SocketAddr,
    router: Router,
}

/// Owns the HTTP listeners and their lifecycle.
pub struct Supervisor {
    listeners: Vec<Listener>,
    grace_period: Duration,
}

impl Supervisor {
    /// Connect every store, wire the services and prepare the listeners.
    ///
    /// All three stores are connected so the healthcheck can report on each
    /// of them; `users.backend` picks the one serving user requests.
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let postgres = Arc::new(PostgresUserRepository::connect(&config.postgres).await?);
        let mongo = Arc::new(MongoUserRepository::connect(&config.mongo).await?);
        let redis = Arc::new(RedisUserRepository::connect(&config.redis).await?);

        let repository: Arc<dyn UserRepository> = match config.users.backend {
            UserBackend::Postgres => postgres.clone(),
            UserBackend::Mongo => mongo.clone(),
            UserBackend::Redis => redis.clone(),
        };
        tracing::info!(backend = ?config.users.backend, "User store selected");

        let user_store: Arc<dyn UserStore> = Arc::new(UserService::new(repository));
        let authenticator = Arc::new(Authenticator::for_domain(
            &config.auth.domain,
            &config.auth.audience,
            config.auth.jwks_url.as_deref(),
        )?);
        let probes: Vec<Arc<dyn HealthProbe>> = vec![postgres, mongo, redis];

        Ok(Self::new(
            config,
            user_store,
            authenticator,
            HealthService::new(probes),
        ))
    }

    /// Prepare the listeners from already wired services.
    pub fn new(
        config: &Config,
        user_store: Arc<dyn UserStore>,
        authenticator: Arc<Authenticator>,
        health: HealthService,
    ) -> Self {
        let mut listeners = vec![
            Listener {
                name: "rest",
                address: any_address(config.rest.port),
                router: create_router(user_store, authenticator),
            },
            Listener {
                name: "healthcheck",
                address: any_address(config.healthcheck.port),
                router: create_health_router(health),
            },
        ];

        if config.swagger.enable {
            listeners.push(Listener {
                name: "swagger",
                address: any_address(config.swagger.port),
                router: create_swagger_router(),
            });
        }

        Self {
            listeners,
            grace_period: SHUTDOWN_GRACE_PERIOD,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Serve until `shutdown` is cancelled, then wait for every listener.
    ///
    /// A listener that fails cancels `shutdown` so the others stop too. The
    /// first failure is returned once all of them have exited.
    ///
    /// # Errors
    /// * A listener address could not be bound
    /// * A listener failed while serving
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let mut bound = Vec::with_capacity(self.listeners.len());
        for listener in self.listeners {
            let tcp = TcpListener::bind(listener.address).await?;
            tracing::info!(
                listener = listener.name,
                address = %tcp.local_addr()?,
                "Listener started"
            );
            bound.push((listener.name, tcp, listener.router));
        }

        let mut tasks = JoinSet::new();
        for (name, tcp, router) in bound {
            tasks.spawn(serve(
                name,
                tcp,
                router,
                shutdown.clone(),
                self.grace_period,
            ));
        }

        let mut outcome = Ok(());
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(anyhow::Error::from).and_then(|result| result);
            if let Err(e) = result {
                tracing::error!(error = %e, "Listener failed, shutting down");
                shutdown.cancel();
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }

        tracing::info!("All listeners stopped");
        outcome
    }
}

fn any_address(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace_period: Duration,
) -> anyhow::Result<()> {
    let draining = shutdown.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            draining.cancelled().await;
            tracing::info!(listener = name, "Draining in-flight requests");
        })
        .into_future();

    tokio::select! {
        result = server => {
            result?;
            tracing::info!(listener = name, "Listener stopped");
        }
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace_period).await;
        } => {
            tracing::warn!(
                listener = name,
                grace_period_secs = grace_period.as_secs(),
                "Grace period elapsed, closing listener"
            );
        }
    }

    Ok(())
}
