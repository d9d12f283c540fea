use crate::{
    config::Config,
    db::connection::DbPool,
    services::{
        override_ledger::OverrideLedger, oversight::OversightService, registry::RegistryService,
        relationship::RelationshipStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub write_pool: DbPool,
    pub read_pool: Option<DbPool>,
    pub config: Config,
}

impl AppState {
    pub fn new(write_pool: DbPool, read_pool: Option<DbPool>, config: Config) -> Self {
        Self {
            write_pool,
            read_pool,
            config,
        }
    }

    /// Returns the read pool if configured, otherwise falls back to the write pool.
    /// Use this for SELECT queries that don't require read-after-write consistency.
    pub fn read_pool(&self) -> &DbPool {
        if self.config.feature_read_replica_enabled {
            self.read_pool.as_ref().unwrap_or(&self.write_pool)
        } else {
            &self.write_pool
        }
    }

    pub fn registry(&self) -> RegistryService {
        RegistryService::new(self.write_pool.clone(), self.config.enforcement())
    }

    pub fn relationships(&self) -> RelationshipStore {
        RelationshipStore::new(
            self.write_pool.clone(),
            self.read_pool().clone(),
            self.config.enforcement(),
        )
    }

    pub fn oversight(&self) -> OversightService {
        OversightService::new(self.write_pool.clone(), self.config.enforcement())
    }

    pub fn overrides(&self) -> OverrideLedger {
        OverrideLedger::new(self.write_pool.clone())
    }
}
