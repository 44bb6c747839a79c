use serde_derive::Deserialize;

use crate::http::{Client, Error, Response};

use super::{DdnsUpdateError, DnsRecordClient, DomainId, Record, ResourceId};

/// Linode caps `page_size` at 500.
const PAGE_SIZE: &str = "500";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    token: Box<str>,

    #[serde(default = "default_api_url")]
    api_url: Box<str>,

    /// The time to live expressed in seconds. Left untouched when unset.
    ///
    /// Values that are not multiples of 300 will be rounded to the nearest
    /// multiple by the Linode API.
    /// See: https://www.linode.com/docs/api/domains/#domain-record-update__request-body-schema
    #[serde(default)]
    ttl: Option<u32>,
}

pub struct Service {
    config: Config,
    client: Client,
}

/// One page of https://www.linode.com/docs/api/domains/#domain-records-list__responses
#[derive(Deserialize, Debug)]
struct RecordPage {
    data: Vec<ApiRecord>,

    #[serde(default = "single_page")]
    pages: u32,
}

#[derive(Deserialize, Debug)]
struct ApiRecord {
    id: ResourceId,

    // The `name` field contains only the subdomain, empty for the apex.
    #[serde(default)]
    name: Box<str>,

    #[serde(rename = "type")]
    kind: Box<str>,

    #[serde(default)]
    target: Box<str>,
}

impl From<ApiRecord> for Record {
    fn from(record: ApiRecord) -> Self {
        Record {
            resource_id: record.id,
            name: record.name,
            kind: record.kind,
            target: record.target,
        }
    }
}

impl Service {
    pub fn new(config: Config, client: Client) -> Self {
        let mut config = config;
        config.token = (String::from("Bearer ") + &config.token).into();
        config.api_url = config.api_url.trim_end_matches('/').into();
        Self { config, client }
    }

    fn parse_error(&self, response: Response) -> Result<(Box<str>, Box<str>), String> {
        let resp_json = response
            .into_json::<serde_json::Value>()
            .map_err(|e| String::from("unable to parse response as JSON: ") + &e.to_string())?;

        let error = resp_json
            .get("errors")
            .and_then(|errors| errors.get(0))
            .ok_or_else(|| String::from("expected a non-empty `errors` array"))?;

        // Linode names the offending request field in `field` when it
        // can pin one down, otherwise the key is absent.
        let field: Box<str> = error
            .get("field")
            .and_then(|m| m.as_str())
            .unwrap_or("")
            .into();

        let reason: Box<str> = error
            .get("reason")
            .and_then(|m| m.as_str())
            .ok_or_else(|| String::from("expected string `reason`"))?
            .into();

        Ok((field, reason))
    }

    fn check_response(&self, response: Result<Response, Error>) -> Result<Response, DdnsUpdateError> {
        match response {
            Ok(r) => Ok(r),

            Err(Error::Status(code, resp)) => {
                let (field, reason) = self.parse_error(resp).map_err(|e| {
                    let error = format!("HTTP {}, unexpected error message structure - ", code);
                    DdnsUpdateError::Json((error + &e).into())
                })?;

                let error_message: Box<str> = if field.is_empty() {
                    reason
                } else {
                    format!("{} (field = {})", reason, field).into()
                };

                Err(DdnsUpdateError::Linode(error_message))
            }

            Err(Error::Transport(tp)) => Err(DdnsUpdateError::TransportError(tp)),
        }
    }

    /// See: https://www.linode.com/docs/api/domains/#domain-records-list
    fn get_page(&self, domain_id: DomainId, page: u32) -> Result<RecordPage, DdnsUpdateError> {
        let url = format!("{}/domains/{}/records", self.config.api_url, domain_id);

        let response = self
            .client
            .get(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &self.config.token)
            .query("page", &page.to_string())
            .query("page_size", PAGE_SIZE)
            .call();

        self.check_response(response)?
            .into_json::<RecordPage>()
            .map_err(|e| DdnsUpdateError::Json(e.to_string().into()))
    }
}

impl DnsRecordClient for Service {
    fn list_records(&mut self, domain_id: DomainId) -> Result<Vec<Record>, DdnsUpdateError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let current = self.get_page(domain_id, page)?;
            records.extend(current.data.into_iter().map(Record::from));

            if page >= current.pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    /// See: https://www.linode.com/docs/api/domains/#domain-record-update
    fn update_record(
        &mut self,
        domain_id: DomainId,
        resource_id: ResourceId,
        target: &str,
    ) -> Result<(), DdnsUpdateError> {
        let url = format!(
            "{}/domains/{}/records/{}",
            self.config.api_url, domain_id, resource_id
        );

        // We don't have to include the name again, just the target and TTL.
        let mut body = serde_json::json!({ "target": target });
        if let Some(ttl) = self.config.ttl {
            body["ttl_sec"] = ttl.into();
        }

        let response = self
            .client
            .put(&url)
            .set("Authorization", &self.config.token)
            .send_json(body);

        self.check_response(response)?;

        Ok(())
    }
}

fn default_api_url() -> Box<str> {
    "https://api.linode.com/v4".into()
}

fn single_page() -> u32 {
    1
}
