mod http;

use std::thread;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

pub use http::HttpSource;

/// Something that can tell us our external IP. One call is one attempt,
/// retrying is up to [`ExternalIp`].
pub trait IpSource {
    fn fetch(&mut self) -> Result<Box<str>, AttemptError>;
}

/// Why a single lookup failed. All of these are retried the same way.
#[derive(Debug, Error, Clone)]
pub enum AttemptError {
    #[error("HTTP transport error: {0}")]
    Transport(Box<str>),

    #[error("expected HTTP 200, got {0}")]
    Status(u16),

    #[error("unable to read the response body: {0}")]
    Body(Box<str>),

    #[cfg(feature = "regex")]
    #[error("the following HTTP response does not match regex: {0}")]
    NoMatch(Box<str>),
}

#[derive(Debug, Error, Clone)]
#[error("external IP check failed after {attempts} attempt(s), last error: {last}")]
pub struct ResolutionError {
    pub attempts: u32,
    pub last: AttemptError,
}

/// Looks up the external IP with a bounded number of retries and a fixed
/// pause between them. At most `attempt_limit + 1` lookups are made, so the
/// worst case blocks for `attempt_limit * retry_interval`.
pub struct ExternalIp {
    source: Box<dyn IpSource>,
    attempt_limit: u32,
    retry_interval: Duration,
}

impl ExternalIp {
    pub fn new(source: Box<dyn IpSource>, attempt_limit: u32, retry_interval: Duration) -> Self {
        Self {
            source,
            attempt_limit,
            retry_interval,
        }
    }

    pub fn resolve(&mut self) -> Result<Box<str>, ResolutionError> {
        self.resolve_with(thread::sleep)
    }

    fn resolve_with(
        &mut self,
        mut sleep: impl FnMut(Duration),
    ) -> Result<Box<str>, ResolutionError> {
        let mut result = self.source.fetch();

        for attempt in 1..=self.attempt_limit {
            let error = match result {
                Ok(ip) => return Ok(ip),
                Err(e) => e,
            };

            warn!(
                "IP request failed ({}), retrying in {} second(s)...",
                error,
                self.retry_interval.as_secs()
            );
            sleep(self.retry_interval);

            info!(
                "Retrying {} more time(s)...",
                self.attempt_limit - attempt
            );
            result = self.source.fetch();
        }

        result.map_err(|last| ResolutionError {
            attempts: self.attempt_limit + 1,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;

    /// Plays back canned results and counts how often it was asked.
    struct Scripted {
        results: VecDeque<Result<Box<str>, AttemptError>>,
        calls: Rc<RefCell<u32>>,
    }

    impl IpSource for Scripted {
        fn fetch(&mut self) -> Result<Box<str>, AttemptError> {
            *self.calls.borrow_mut() += 1;
            self.results
                .pop_front()
                .unwrap_or(Err(AttemptError::Status(500)))
        }
    }

    fn resolver(
        results: Vec<Result<Box<str>, AttemptError>>,
        limit: u32,
    ) -> (ExternalIp, Rc<RefCell<u32>>) {
        let calls = Rc::new(RefCell::new(0));
        let source = Scripted {
            results: results.into(),
            calls: calls.clone(),
        };
        let resolver = ExternalIp::new(Box::new(source), limit, Duration::from_secs(30));
        (resolver, calls)
    }

    #[test]
    fn gives_up_after_limit_plus_one() {
        let (mut resolver, calls) = resolver(vec![], 10);
        let mut waits = Vec::new();

        let err = resolver.resolve_with(|d| waits.push(d)).unwrap_err();

        assert_eq!(*calls.borrow(), 11);
        assert_eq!(err.attempts, 11);
        assert!(matches!(err.last, AttemptError::Status(500)));
        assert_eq!(waits, vec![Duration::from_secs(30); 10]);
    }

    #[test]
    fn zero_limit_means_a_single_try() {
        let (mut resolver, calls) = resolver(vec![], 0);
        let mut waits = 0;

        assert!(resolver.resolve_with(|_| waits += 1).is_err());
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(waits, 0);
    }

    #[test]
    fn first_try_success_never_sleeps() {
        let (mut resolver, calls) = resolver(vec![Ok("203.0.113.5".into())], 10);
        let mut waits = 0;

        let ip = resolver.resolve_with(|_| waits += 1).unwrap();

        assert_eq!(&*ip, "203.0.113.5");
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(waits, 0);
    }

    #[test]
    fn success_on_attempt_k() {
        for k in [1, 4, 10] {
            let mut results = (0..k)
                .map(|_| Err(AttemptError::Transport("timed out".into())))
                .collect::<Vec<_>>();
            results.push(Ok("198.51.100.2".into()));

            let (mut resolver, calls) = resolver(results, 10);
            let mut waits = 0;

            let ip = resolver.resolve_with(|_| waits += 1).unwrap();

            assert_eq!(&*ip, "198.51.100.2");
            assert_eq!(*calls.borrow(), k + 1);
            assert_eq!(waits, k);
        }
    }

    #[test]
    fn keeps_the_last_error() {
        let (mut resolver, _) = resolver(
            vec![
                Err(AttemptError::Transport("connection refused".into())),
                Err(AttemptError::Status(502)),
            ],
            1,
        );

        let err = resolver.resolve_with(|_| ()).unwrap_err();
        assert_eq!(err.attempts, 2);
        assert!(matches!(err.last, AttemptError::Status(502)));
    }
}
