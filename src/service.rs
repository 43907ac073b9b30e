//! Cache-then-resolve front door
//!
//! Looks a name up in the store first and only drives the browser on a miss.
//! Store failures never fail the query: a broken read is a miss and a broken
//! write is logged.

use std::sync::Arc;

use tracing::{info, warn};

use crate::aggregator::{ProfileAggregator, ProfileError};
use crate::profile::{ProfileQuery, ProfileRecord};
use crate::store::ProfileStore;

/// Where a returned record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Cache,
    Fresh,
}

#[derive(Clone)]
pub struct ProfileService {
    aggregator: ProfileAggregator,
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(aggregator: ProfileAggregator, store: Arc<dyn ProfileStore>) -> Self {
        Self { aggregator, store }
    }

    /// Stored record for `name`, resolving and storing it on a miss
    pub async fn get_or_resolve(
        &self,
        name: &str,
    ) -> Result<(ProfileRecord, RecordSource), ProfileError> {
        let query = ProfileQuery::new(name)?;

        match self.store.get(&query).await {
            Ok(Some(record)) => {
                info!("Serving stored profile for '{}'", query);
                return Ok((record, RecordSource::Cache));
            }
            Ok(None) => {}
            Err(e) => warn!("Profile store read failed for '{}': {}", query, e),
        }

        let record = self.resolve_and_store(&query).await?;
        Ok((record, RecordSource::Fresh))
    }

    /// Resolve from the sources and overwrite any stored record
    pub async fn refresh(&self, name: &str) -> Result<ProfileRecord, ProfileError> {
        let query = ProfileQuery::new(name)?;
        self.resolve_and_store(&query).await
    }

    async fn resolve_and_store(&self, query: &ProfileQuery) -> Result<ProfileRecord, ProfileError> {
        let record = self.aggregator.aggregate(query).await?;
        if let Err(e) = self.store.put(query, &record).await {
            warn!("Profile store write failed for '{}': {}", query, e);
        }
        Ok(record)
    }

    /// Stored record only, without resolving
    pub async fn cached(&self, name: &str) -> Result<Option<ProfileRecord>, ProfileError> {
        let query = ProfileQuery::new(name)?;
        match self.store.get(&query).await {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!("Profile store read failed for '{}': {}", query, e);
                Ok(None)
            }
        }
    }
}
