//! Triggering the hosted workflow that runs `publish` on the remote side.
//!
//! One POST to the workflow-dispatch endpoint, carrying the status as the
//! `coffee_status` input. Nothing here touches the local repository.

use serde::Serialize;
use serde_json::json;

use crate::config::{ConfigError, RemoteConfig};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("GitHub API error: {status} {status_text} - {body}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Something that can fire the remote publish for a status.
pub trait Trigger {
    fn trigger(&self, status: bool) -> Result<TriggerReport, RemoteError>;
}

/// What a successful trigger reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerReport {
    pub success: bool,
    pub status: bool,
    pub message: String,
}

impl TriggerReport {
    fn triggered(status: bool) -> Self {
        let state = if status { "ON" } else { "OFF" };
        Self {
            success: true,
            status,
            message: format!(
                "Coffee status workflow triggered successfully. Coffee will be {state} for next Sunday."
            ),
        }
    }
}

/// GitHub Actions `workflow_dispatch` over HTTPS.
pub struct WorkflowDispatch<'a> {
    config: &'a RemoteConfig,
    agent: ureq::Agent,
}

impl<'a> WorkflowDispatch<'a> {
    pub fn new(config: &'a RemoteConfig) -> Self {
        Self {
            config,
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("sunday-coffee/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Trigger for WorkflowDispatch<'_> {
    fn trigger(&self, status: bool) -> Result<TriggerReport, RemoteError> {
        let token = self.config.token()?;
        let url = self.config.dispatch_url();
        let body = json!({
            "ref": self.config.git_ref,
            "inputs": { "coffee_status": status.to_string() },
        });

        tracing::info!(%url, status, "dispatching workflow");
        let result = self
            .agent
            .post(&url)
            .set("Accept", "application/vnd.github+json")
            .set("Authorization", &format!("Bearer {token}"))
            .set("X-GitHub-Api-Version", "2022-11-28")
            .send_json(body);

        match result {
            Ok(response) if (200..300).contains(&response.status()) => {
                tracing::info!(code = response.status(), "workflow dispatched");
                Ok(TriggerReport::triggered(status))
            }
            Ok(response) | Err(ureq::Error::Status(_, response)) => {
                let status = response.status();
                let status_text = response.status_text().to_string();
                let body = response.into_string().unwrap_or_default();
                tracing::warn!(code = status, %body, "workflow dispatch rejected");
                Err(RemoteError::Status {
                    status,
                    status_text,
                    body,
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(RemoteError::Transport {
                url,
                message: transport.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    /// Serve one request with `response`, returning the raw request text.
    fn one_shot(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (base, handle)
    }

    fn config(api_base: &str, token: Option<&str>) -> RemoteConfig {
        RemoteConfig {
            api_base: api_base.to_string(),
            token: token.map(str::to_string),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn missing_token_fails_before_any_request() {
        // Nothing listens here; a request would fail with a transport error.
        let config = config("http://127.0.0.1:9", None);
        let err = WorkflowDispatch::new(&config).trigger(true).unwrap_err();
        assert!(matches!(err, RemoteError::Config(ConfigError::MissingToken)));
    }

    #[test]
    fn posts_dispatch_with_status_input() {
        let (base, server) = one_shot("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");
        let config = config(&base, Some("ghp_test"));

        let report = WorkflowDispatch::new(&config).trigger(false).unwrap();
        assert!(report.success);
        assert!(!report.status);
        assert!(report.message.contains("Coffee will be OFF"));

        let request = server.join().unwrap();
        assert!(request.starts_with(
            "POST /repos/Jherrild/sunday-coffee/actions/workflows/update-coffee-status.yml/dispatches"
        ));
        assert!(request.contains("Bearer ghp_test"));
        assert!(request.contains("2022-11-28"));
        assert!(request.contains(r#""coffee_status":"false""#));
        assert!(request.contains(r#""ref":"main""#));
    }

    #[test]
    fn rejection_carries_status_and_body() {
        let (base, server) = one_shot(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nNot Found",
        );
        let config = config(&base, Some("ghp_test"));

        let err = WorkflowDispatch::new(&config).trigger(true).unwrap_err();
        server.join().unwrap();
        match err {
            RemoteError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
