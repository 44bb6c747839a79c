pub mod dummy;
pub mod linode;

use thiserror::Error;

pub type DomainId = u64;
pub type ResourceId = u64;

/// A resource record as seen by the DNS provider. We never create or delete
/// these, only repoint them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub resource_id: ResourceId,

    /// The record name relative to the domain, e.g. "www". Empty for the
    /// domain apex.
    pub name: Box<str>,

    /// The record type as reported by the provider ("A", "AAAA", "CNAME"...).
    pub kind: Box<str>,

    /// What the record currently points to.
    pub target: Box<str>,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.name.is_empty() { "@" } else { &self.name };
        write!(f, "{} ({})", name, self.resource_id)
    }
}

#[derive(Clone, Error, Debug)]
pub enum DdnsUpdateError {
    // used when Linode really returned an error
    #[error("Linode returned error: {0}")]
    Linode(Box<str>),

    // used when a service says it succeeded, but the returned JSON is nonsense
    #[error("received erroneous JSON: {0}")]
    Json(Box<str>),

    #[error("HTTP transport error: {0}")]
    TransportError(Box<str>),
}

/// The remote side that owns the DNS records of a domain.
pub trait DnsRecordClient {
    /// Lists every record of the domain. Filtering is left to the caller.
    fn list_records(&mut self, domain_id: DomainId) -> Result<Vec<Record>, DdnsUpdateError>;

    /// Points a single record at `target`.
    fn update_record(
        &mut self,
        domain_id: DomainId,
        resource_id: ResourceId,
        target: &str,
    ) -> Result<(), DdnsUpdateError>;
}
