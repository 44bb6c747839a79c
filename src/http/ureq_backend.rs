use std::time::Duration;

use serde::Serialize;
use ureq;

use super::{Error, Response};

/// A shared HTTP agent. Cloning is cheap, every clone reuses the same
/// connection pool, user agent and timeout.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
}

pub struct Request {
    inner: ureq::Request,
}

impl Client {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(user_agent)
            .timeout(timeout)
            .build();

        Self { agent }
    }

    pub fn get(&self, url: &str) -> Request {
        Request {
            inner: self.agent.get(url),
        }
    }

    pub fn put(&self, url: &str) -> Request {
        Request {
            inner: self.agent.put(url),
        }
    }
}

impl Request {
    pub fn query(mut self, param: &str, value: &str) -> Self {
        self.inner = self.inner.query(param, value);
        self
    }

    pub fn set(mut self, header: &str, value: &str) -> Self {
        self.inner = self.inner.set(header, value);
        self
    }

    pub fn send_json(self, data: impl Serialize) -> Result<Response, Error> {
        convert(self.inner.send_json(data))
    }

    pub fn call(self) -> Result<Response, Error> {
        convert(self.inner.call())
    }
}

fn convert(result: Result<ureq::Response, ureq::Error>) -> Result<Response, Error> {
    result
        .map_err(|e| match e {
            ureq::Error::Status(code, resp) => Error::Status(
                code,
                Response {
                    status: code,
                    reader: resp.into_reader(),
                },
            ),
            ureq::Error::Transport(tp) => Error::Transport(tp.to_string().into()),
        })
        .map(|resp| Response {
            status: resp.status(),
            reader: resp.into_reader(),
        })
}
