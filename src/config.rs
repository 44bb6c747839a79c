use std::fs;
use std::io;
use std::time::Duration;

use serde_derive::Deserialize;
use thiserror::Error;

use crate::http::Client;
use crate::services::*;
use crate::util::{nonzero_seconds, seconds};

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct General {
    /// Where the most recently seen external IP is kept between runs.
    #[serde(default = "default_ip_cache")]
    pub ip_cache: Box<str>,

    #[serde(default = "default_user_agent")]
    pub user_agent: Box<str>,

    /// Per-request timeout applied to every HTTP call, in seconds.
    #[serde(default = "default_timeout", deserialize_with = "nonzero_seconds")]
    pub timeout: Duration,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IpConfig {
    /// Should answer a GET with only the IP address as `text/plain`.
    pub url: Box<str>,

    /// How many times a failed lookup is retried before giving up. The
    /// initial request is not counted.
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: u32,

    #[serde(default = "default_retry_interval", deserialize_with = "seconds")]
    pub retry_interval: Duration,

    /// Extracts the address from the first capture group of the response.
    /// Only honoured when built with the `regex` feature.
    #[serde(default)]
    pub regex: Option<Box<str>>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "service")]
#[serde(rename_all = "kebab-case")]
pub enum DdnsConfigService {
    Linode(linode::Config),
    Dummy(dummy::Config),
}

impl DdnsConfigService {
    pub fn into_boxed(self, client: &Client) -> Box<dyn DnsRecordClient> {
        match self {
            DdnsConfigService::Linode(li) => Box::new(linode::Service::new(li, client.clone())),

            DdnsConfigService::Dummy(dm) => Box::new(dummy::Service::from(dm)),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DnsConfig {
    /// Linode doesn't show this in the manager UI. It is the number in square
    /// brackets on the first line of the zone file:
    ///
    /// ```text
    /// ; example.com [123456]
    /// ```
    pub domain_id: DomainId,

    #[serde(flatten)]
    pub service: DdnsConfigService,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    pub ip: IpConfig,
    pub dns: DnsConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration found, looked in: {0}")]
    NotFound(Box<str>),

    #[error("unable to read config file {0}, reason: {1}")]
    Io(Box<str>, io::Error),

    #[error("unable to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unable to parse the regex: {0}")]
    InvalidRegex(Box<str>),

    #[error("`ip.regex` is set, but this build lacks the `regex` feature")]
    RegexUnsupported,
}

impl Config {
    /// Reads the first config file that exists out of `paths`. A file that
    /// exists but can't be read is an error, it is not skipped.
    pub fn load<'a>(paths: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let mut tried = Vec::new();

        for path in paths {
            match fs::read_to_string(path) {
                Ok(contents) => {
                    log::debug!("Using config file {}", path);
                    return Ok(toml::from_str(&contents)?);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => tried.push(path),
                Err(e) => return Err(ConfigError::Io(path.into(), e)),
            }
        }

        Err(ConfigError::NotFound(tried.join(", ").into()))
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            ip_cache: default_ip_cache(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

fn default_ip_cache() -> Box<str> {
    "./ip_cache".into()
}

fn default_user_agent() -> Box<str> {
    concat!("linode-ddns ", env!("CARGO_PKG_VERSION")).into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_attempt_limit() -> u32 {
    10
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINODE_CONFIG: &str = r#"
        [general]
        ip_cache = "/var/lib/linode-ddns/ip"
        timeout = 10

        [ip]
        url = "http://what-is-my-ip.example"
        attempt_limit = 3
        retry_interval = 5

        [dns]
        domain_id = 123456
        service = "linode"
        token = "secret"
        ttl = 300
    "#;

    #[test]
    fn linode_config() {
        let config: Config = toml::from_str(LINODE_CONFIG).unwrap();

        assert_eq!(&*config.general.ip_cache, "/var/lib/linode-ddns/ip");
        assert_eq!(config.general.timeout, Duration::from_secs(10));
        assert_eq!(&*config.ip.url, "http://what-is-my-ip.example");
        assert_eq!(config.ip.attempt_limit, 3);
        assert_eq!(config.ip.retry_interval, Duration::from_secs(5));
        assert_eq!(config.ip.regex, None);
        assert_eq!(config.dns.domain_id, 123456);
        assert!(matches!(config.dns.service, DdnsConfigService::Linode(_)));
    }

    #[test]
    fn defaults() {
        let config: Config = toml::from_str(
            r#"
            [ip]
            url = "http://what-is-my-ip.example"

            [dns]
            domain_id = 1
            service = "linode"
            token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.general, General::default());
        assert_eq!(&*config.general.ip_cache, "./ip_cache");
        assert_eq!(config.ip.attempt_limit, 10);
        assert_eq!(config.ip.retry_interval, Duration::from_secs(30));
    }

    #[test]
    fn dummy_records() {
        let config: Config = toml::from_str(
            r#"
            [ip]
            url = "http://what-is-my-ip.example"

            [dns]
            domain_id = 7
            service = "dummy"
            records = [
                { id = 1, name = "www", target = "198.51.100.1" },
                { id = 2, name = "mail", target = "198.51.100.1" },
            ]
            "#,
        )
        .unwrap();

        let DdnsConfigService::Dummy(dummy) = config.dns.service else {
            panic!("expected the dummy service");
        };
        assert_eq!(dummy.records.len(), 2);
    }

    #[test]
    fn rejects_bad_configs() {
        // no domain_id
        assert!(toml::from_str::<Config>(
            r#"
            [ip]
            url = "http://what-is-my-ip.example"
            [dns]
            service = "linode"
            token = "secret"
            "#
        )
        .is_err());

        // zero timeout
        assert!(toml::from_str::<Config>(
            r#"
            [general]
            timeout = 0
            [ip]
            url = "http://what-is-my-ip.example"
            [dns]
            domain_id = 1
            service = "linode"
            token = "secret"
            "#
        )
        .is_err());

        // unknown service
        assert!(toml::from_str::<Config>(
            r#"
            [ip]
            url = "http://what-is-my-ip.example"
            [dns]
            domain_id = 1
            service = "route53"
            "#
        )
        .is_err());
    }

    #[test]
    fn load_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        fs::write(&present, LINODE_CONFIG).unwrap();

        let config = Config::load([
            missing.to_str().unwrap(),
            present.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(config.dns.domain_id, 123456);

        let err = Config::load([missing.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
