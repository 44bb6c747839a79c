use log::info;
use serde_derive::Deserialize;

use super::{DdnsUpdateError, DnsRecordClient, DomainId, Record, ResourceId};

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub records: Vec<DummyRecord>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DummyRecord {
    id: ResourceId,

    #[serde(default)]
    name: Box<str>,

    #[serde(default = "default_kind")]
    kind: Box<str>,

    target: Box<str>,
}

/// Pretends to be a DNS provider. Records come from the config file and
/// updates only live in memory, so nothing outside this process changes.
pub struct Service {
    records: Vec<Record>,
}

impl From<Config> for Service {
    fn from(config: Config) -> Self {
        let records = config
            .records
            .into_iter()
            .map(|r| Record {
                resource_id: r.id,
                name: r.name,
                kind: r.kind,
                target: r.target,
            })
            .collect();

        Self { records }
    }
}

impl DnsRecordClient for Service {
    fn list_records(&mut self, _domain_id: DomainId) -> Result<Vec<Record>, DdnsUpdateError> {
        Ok(self.records.clone())
    }

    fn update_record(
        &mut self,
        domain_id: DomainId,
        resource_id: ResourceId,
        target: &str,
    ) -> Result<(), DdnsUpdateError> {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|r| r.resource_id == resource_id)
        else {
            return Err(DdnsUpdateError::Json(
                format!("no record {} in domain {}", resource_id, domain_id).into(),
            ));
        };

        info!(
            "Dummy: simulate pointing {} from {} to {}",
            record, record.target, target
        );
        record.target = target.into();

        Ok(())
    }
}

fn default_kind() -> Box<str> {
    "A".into()
}
