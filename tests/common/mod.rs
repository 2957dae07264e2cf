#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use brrtcors::cors::{CorsEvent, CorsObserver, ObserverError};
use brrtcors::server::CorsRequest;
use http::Method;

pub mod requests {
    use super::*;

    /// Build a request with the given headers
    pub fn request(method: Method, path: &str, headers: &[(&str, &str)]) -> CorsRequest {
        headers
            .iter()
            .fold(CorsRequest::new(method, path), |req, (name, value)| {
                req.with_header(name, *value)
            })
    }

    /// `GET path` carrying `Origin`
    pub fn simple(path: &str, origin: &str) -> CorsRequest {
        request(Method::GET, path, &[("Origin", origin)])
    }

    /// `OPTIONS path` carrying `Origin`, ACRM and optionally ACRH
    pub fn preflight(
        path: &str,
        origin: &str,
        method: &str,
        headers: Option<&str>,
    ) -> CorsRequest {
        let req = request(
            Method::OPTIONS,
            path,
            &[
                ("Origin", origin),
                ("Access-Control-Request-Method", method),
            ],
        );
        match headers {
            Some(h) => req.with_header("Access-Control-Request-Headers", h),
            None => req,
        }
    }
}

pub mod observers {
    use super::*;

    /// Observer that keeps every event it sees
    #[derive(Default)]
    pub struct Recorder {
        events: Mutex<Vec<CorsEvent>>,
    }

    impl Recorder {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn events(&self) -> Vec<CorsEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CorsObserver for Recorder {
        fn on_event(&self, event: &CorsEvent) -> Result<(), ObserverError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }
}

pub mod temp_files {
    use std::io::Write;

    use tempfile::NamedTempFile;

    /// Write `content` to a temp file with the given extension
    pub fn create_temp_policy(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtcors_policy_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
