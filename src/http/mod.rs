mod ureq_backend;

use std::io::{self, Read};

use serde::de::DeserializeOwned;

pub use ureq_backend::{Client, Request};

/// Bodies larger than this are truncated when read as a string. Nothing we
/// talk to should ever come close.
const MAX_BODY_SIZE: u64 = 2 * 1024 * 1024;

pub struct Response {
    pub(self) status: u16,
    pub(self) reader: Box<dyn Read + Send + Sync>,
}

pub enum Error {
    Status(u16, Response),
    Transport(Box<str>),
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, io::Error> {
        serde_json::from_reader(self.reader.take(MAX_BODY_SIZE))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn into_string(self) -> Result<String, io::Error> {
        let mut vec = Vec::with_capacity(1024);
        self.reader.take(MAX_BODY_SIZE).read_to_end(&mut vec)?;
        String::from_utf8(vec).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
