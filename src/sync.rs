use log::{error, info};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::http::Client;
use crate::ip::{ExternalIp, HttpSource, ResolutionError};
use crate::persistence::{CachePersistError, IpCache};
use crate::services::{DdnsUpdateError, DnsRecordClient, DomainId};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The external IP matches the cache, nothing was touched.
    Unchanged { ip: Box<str> },

    /// The external IP differs from the cache. Records that pointed at the
    /// previous address were repointed, `failed` of them unsuccessfully, and
    /// the cache now holds `current`.
    Changed {
        previous: Box<str>,
        current: Box<str>,
        updated: usize,
        failed: usize,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("unable to list DNS records: {0}")]
    ListRecords(DdnsUpdateError),

    #[error(transparent)]
    CachePersist(#[from] CachePersistError),
}

/// Compares the external IP against the cached one and, if it moved, drags
/// every record still pointing at the old address along with it.
pub struct Synchronizer {
    cache: IpCache,
    resolver: ExternalIp,
    records: Box<dyn DnsRecordClient>,
    domain_id: DomainId,
}

impl Synchronizer {
    pub fn new(
        cache: IpCache,
        resolver: ExternalIp,
        records: Box<dyn DnsRecordClient>,
        domain_id: DomainId,
    ) -> Self {
        Self {
            cache,
            resolver,
            records,
            domain_id,
        }
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let client = Client::new(&config.general.user_agent, config.general.timeout);

        let source = HttpSource::new(
            client.clone(),
            &config.ip.url,
            config.ip.regex.as_deref(),
        )?;
        let resolver = ExternalIp::new(
            Box::new(source),
            config.ip.attempt_limit,
            config.ip.retry_interval,
        );

        Ok(Self::new(
            IpCache::new(&*config.general.ip_cache),
            resolver,
            config.dns.service.into_boxed(&client),
            config.dns.domain_id,
        ))
    }

    pub fn run(&mut self) -> Result<Outcome, SyncError> {
        info!("Comparing cached IP with current external IP");

        let cached_ip = self.cache.load();
        let external_ip = self.resolver.resolve()?;

        info!("Cached IP: {}", cached_ip);
        info!("External IP: {}", external_ip);

        if cached_ip == external_ip {
            info!("No change in IP so far");
            return Ok(Outcome::Unchanged { ip: external_ip });
        }

        // An empty cache (first run) is compared literally too, so it only
        // picks up records with an empty target.
        let stale = self
            .records
            .list_records(self.domain_id)
            .map_err(SyncError::ListRecords)?
            .into_iter()
            .filter(|record| record.target == cached_ip)
            .collect::<Vec<_>>();

        let mut updated = 0;
        let mut failed = 0;

        if stale.is_empty() {
            info!("No resources with IP {}", cached_ip);
        } else {
            info!("Changing host records with IP {} to {}", cached_ip, external_ip);
        }

        for record in &stale {
            let result =
                self.records
                    .update_record(self.domain_id, record.resource_id, &external_ip);

            match result {
                Ok(()) => {
                    info!("Updating {}... Updated", record);
                    updated += 1;
                }
                Err(e) => {
                    error!("Updating {}... Failed, reason: {}", record, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Setting IP cache {} to {}",
            self.cache.path().display(),
            external_ip
        );
        self.cache.save(&external_ip)?;

        Ok(Outcome::Changed {
            previous: cached_ip,
            current: external_ip,
            updated,
            failed,
        })
    }
}
