use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, StorageBackend};
use crate::db::{
    self, AppointmentRepository, AppointmentStore, AvailabilityRepository, AvailabilityStore,
    ConsultantTermsRepository, ConsultantTermsStore, MemoryStore,
};
use crate::notifications::BroadcastDispatcher;
use crate::scheduling::{Clock, SchedulingService, SystemClock};

#[derive(Clone)]
pub struct AppState {
    pub scheduler: SchedulingService,
    pub notifications: BroadcastDispatcher,
    pub env: Config,
}

impl AppState {
    pub fn new(scheduler: SchedulingService, notifications: BroadcastDispatcher, env: Config) -> Self {
        Self {
            scheduler,
            notifications,
            env,
        }
    }

    /// Wires the stores selected by `env.storage` into the scheduling service.
    pub async fn from_config(env: Config) -> Result<Self> {
        let (availability, appointments, terms): (
            Arc<dyn AvailabilityStore>,
            Arc<dyn AppointmentStore>,
            Arc<dyn ConsultantTermsStore>,
        ) = match env.storage {
            StorageBackend::Postgres => {
                let database = env
                    .database
                    .as_ref()
                    .context("Postgres storage selected without database settings")?;
                let pool = db::init_pool(database).await?;
                (
                    Arc::new(AvailabilityRepository::new(pool.clone())),
                    Arc::new(AppointmentRepository::new(pool.clone())),
                    Arc::new(ConsultantTermsRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store.clone(), store)
            }
        };

        Ok(Self::with_stores(env, availability, appointments, terms, Arc::new(SystemClock)))
    }

    pub fn with_stores(
        env: Config,
        availability: Arc<dyn AvailabilityStore>,
        appointments: Arc<dyn AppointmentStore>,
        terms: Arc<dyn ConsultantTermsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let notifications = BroadcastDispatcher::new(env.scheduling.notification_channel_capacity);
        let scheduler = SchedulingService::new(
            availability,
            appointments,
            terms,
            Arc::new(notifications.clone()),
            clock,
        );
        Self::new(scheduler, notifications, env)
    }
}
