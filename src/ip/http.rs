#[cfg(feature = "regex")]
use regex::Regex;

use crate::config::ConfigError;
use crate::http::{Client, Error};

use super::{AttemptError, IpSource};

/// Asks a "what is my IP" web service. Only an HTTP 200 counts as an answer,
/// the body of which is taken to be the address.
pub struct HttpSource {
    client: Client,
    url: Box<str>,
    #[cfg(feature = "regex")]
    regex: Option<Regex>,
}

impl HttpSource {
    pub fn new(client: Client, url: &str, regex: Option<&str>) -> Result<Self, ConfigError> {
        #[cfg(feature = "regex")]
        let regex = regex
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidRegex(e.to_string().into()))?;

        #[cfg(not(feature = "regex"))]
        if regex.is_some() {
            return Err(ConfigError::RegexUnsupported);
        }

        Ok(Self {
            client,
            url: url.into(),
            #[cfg(feature = "regex")]
            regex,
        })
    }
}

impl IpSource for HttpSource {
    fn fetch(&mut self) -> Result<Box<str>, AttemptError> {
        let response = match self.client.get(&self.url).call() {
            Ok(r) => r,
            Err(Error::Status(code, _)) => return Err(AttemptError::Status(code)),
            Err(Error::Transport(t)) => return Err(AttemptError::Transport(t)),
        };

        // ureq hands back any non-error status, we only trust a plain 200.
        if response.status() != 200 {
            return Err(AttemptError::Status(response.status()));
        }

        let text = response
            .into_string()
            .map_err(|e| AttemptError::Body(e.to_string().into()))?;

        #[cfg(feature = "regex")]
        let addr = match &self.regex {
            Some(regex) => regex
                .captures(text.as_str())
                .and_then(|captured| captured.get(1))
                .map(|matched| matched.as_str().trim())
                .ok_or_else(|| AttemptError::NoMatch(text.as_str().into()))?,
            None => text.trim(),
        };

        #[cfg(not(feature = "regex"))]
        let addr = text.trim();

        Ok(addr.into())
    }
}
