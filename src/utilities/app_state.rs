use std::sync::Arc;

use axum::extract::FromRef;
use tracing::info;

use crate::{
    features::{
        bookings::repository::BookingRepository,
        cascade::PurgeRepository,
        listings::repository::ListingRepository,
        payments::{gateway::PaymentGateway, gateway::SandboxGateway, repository::PaymentRepository},
        registry::ResourceRegistry,
        reviews::repository::ReviewRepository,
        users::repository::UserRepository,
    },
    services::{
        database::Database,
        mailer::{self, Mailer},
        memory::MemoryStore,
        tasks::TaskQueue,
    },
    utilities::{
        config::{Config, StorageBackend},
        errors::AppError,
    },
};

pub type Users = Arc<dyn UserRepository>;
pub type Listings = Arc<dyn ListingRepository>;
pub type Reviews = Arc<dyn ReviewRepository>;
pub type Bookings = Arc<dyn BookingRepository>;
pub type Payments = Arc<dyn PaymentRepository>;
pub type Purger = Arc<dyn PurgeRepository>;
pub type Gateway = Arc<dyn PaymentGateway>;
pub type SharedMailer = Arc<dyn Mailer>;
pub type Registry = Arc<ResourceRegistry>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Users,
    pub listings: Listings,
    pub reviews: Reviews,
    pub bookings: Bookings,
    pub payments: Payments,
    pub purger: Purger,
    pub gateway: Gateway,
    pub mailer: SharedMailer,
    pub tasks: TaskQueue,
    pub registry: Registry,
}

impl AppState {
    /// Wires every repository to the same backing store.
    pub fn from_store<S>(config: Config, store: Arc<S>, mailer: SharedMailer, tasks: TaskQueue) -> Self
    where
        S: UserRepository
            + ListingRepository
            + ReviewRepository
            + BookingRepository
            + PaymentRepository
            + PurgeRepository
            + 'static,
    {
        Self {
            config,
            users: store.clone(),
            listings: store.clone(),
            reviews: store.clone(),
            bookings: store.clone(),
            payments: store.clone(),
            purger: store,
            gateway: Arc::new(SandboxGateway::default()),
            mailer,
            tasks,
            registry: Arc::new(ResourceRegistry::standard()),
        }
    }

    pub fn with_gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = gateway;
        self
    }

    /// Builds the state for the configured storage backend.
    pub async fn init(config: Config, tasks: TaskQueue) -> Result<Self, AppError> {
        let mailer = mailer::from_config(&config);

        match config.storage_backend {
            StorageBackend::Postgres => {
                let database = Database::new(&config).await?;
                database.migrate().await?;
                Ok(Self::from_store(config, Arc::new(database), mailer, tasks))
            }
            StorageBackend::Memory => {
                info!("Using the in-memory store, data is lost on shutdown.");
                Ok(Self::from_store(
                    config,
                    Arc::new(MemoryStore::new()),
                    mailer,
                    tasks,
                ))
            }
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Users {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Listings {
    fn from_ref(state: &AppState) -> Self {
        state.listings.clone()
    }
}

impl FromRef<AppState> for Reviews {
    fn from_ref(state: &AppState) -> Self {
        state.reviews.clone()
    }
}

impl FromRef<AppState> for Purger {
    fn from_ref(state: &AppState) -> Self {
        state.purger.clone()
    }
}

impl FromRef<AppState> for Registry {
    fn from_ref(state: &AppState) -> Self {
        state.registry.clone()
    }
}
