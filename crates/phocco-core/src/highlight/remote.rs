//! Remote highlighting service, used when no local highlighter is installed.
//!
//! The service speaks the same contract as `pygmentize -f html`: the code
//! blob and lexer name go in as a form-encoded POST, HTML comes back.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::{HighlightError, Highlighter};

/// Endpoint used when none is configured.
pub const DEFAULT_REMOTE_URL: &str = "http://pygments.appspot.com/";

/// Client for a Pygments-over-HTTP service.
#[derive(Debug, Clone)]
pub struct RemoteHighlighter {
    url: String,
    timeout: Duration,
    client: Client,
}

impl RemoteHighlighter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, HighlightError> {
        let client = Client::builder()
            .user_agent(concat!("phocco/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.into(),
            timeout,
            client,
        })
    }
}

impl Highlighter for RemoteHighlighter {
    fn name(&self) -> &str {
        &self.url
    }

    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError> {
        debug!(url = %self.url, lexer, bytes = code.len(), "posting to highlighting service");

        let response = self
            .client
            .post(&self.url)
            .form(&[("lang", lexer), ("code", code)])
            .send()
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HighlightError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        response.text().map_err(|err| self.classify(err))
    }
}

impl RemoteHighlighter {
    fn classify(&self, err: reqwest::Error) -> HighlightError {
        if err.is_timeout() {
            HighlightError::Timeout {
                tool: self.url.clone(),
                timeout: self.timeout,
            }
        } else {
            HighlightError::Remote(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one HTTP request, returning the raw request text.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (url, handle)
    }

    #[test]
    fn posts_form_and_returns_body() {
        let (url, server) = serve_once("200 OK", "<div class=\"highlight\"><pre>x</pre></div>");
        let remote = RemoteHighlighter::new(url, Duration::from_secs(10)).unwrap();

        let html = remote.highlight("python", "x = 1\n").unwrap();
        assert_eq!(html, "<div class=\"highlight\"><pre>x</pre></div>");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST / "));
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.contains("lang=python"));
        assert!(request.contains("code=x+%3D+1%0A"));
    }

    #[test]
    fn error_status_is_reported() {
        let (url, server) = serve_once("503 Service Unavailable", "down");
        let remote = RemoteHighlighter::new(url, Duration::from_secs(10)).unwrap();

        let err = remote.highlight("python", "x").unwrap_err();
        assert!(matches!(err, HighlightError::RemoteStatus { status: 503 }));
        server.join().unwrap();
    }
}
