//! Password-protection probe for the live URL.
//!
//! A HEAD request follows redirects; landing on a `/password` path means the
//! store is gated. Network failures count as not protected.

use reqwest::redirect::Policy;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const PASSWORD_PATH: &str = "/password";
/// Same hop limit as the WHATWG fetch `follow` mode.
pub const MAX_REDIRECTS: usize = 20;

pub async fn is_password_protected(url: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, url, "error building probe client");
            return false;
        }
    };
    match client.head(url).send().await {
        Ok(resp) => {
            let protected = is_password_path(resp.url());
            debug!(url, final_url = %resp.url(), protected, "probe finished");
            protected
        }
        Err(e) => {
            debug!(error = %e, url, "error checking password protection");
            false
        }
    }
}

pub fn is_password_path(url: &Url) -> bool {
    url.path().ends_with(PASSWORD_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve `connections` requests; `route` maps a request path to an
    /// optional redirect location, `None` answering 200.
    fn serve(route: fn(&str) -> Option<String>, connections: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let mut stream = stream.unwrap();
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap_or(0);
                let req = String::from_utf8_lossy(&buf[..n]);
                let path = req.split_whitespace().nth(1).unwrap_or("/").to_string();
                let resp = match route(&path) {
                    None => "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string(),
                    Some(location) => format!(
                        "HTTP/1.1 302 Found\r\nLocation: {location}\r\n\
                         Content-Length: 0\r\nConnection: close\r\n\r\n"
                    ),
                };
                let _ = stream.write_all(resp.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    /// `/hop/N` redirects to `/hop/N+1` until 15, then to `/password`.
    fn hops(path: &str) -> Option<String> {
        if path == PASSWORD_PATH {
            return None;
        }
        let n: usize = path
            .strip_prefix("/hop/")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        if n >= 15 {
            Some(PASSWORD_PATH.to_string())
        } else {
            Some(format!("/hop/{}", n + 1))
        }
    }

    #[test]
    fn test_is_password_path() {
        assert!(is_password_path(&Url::parse("https://s.test/password").unwrap()));
        assert!(is_password_path(&Url::parse("https://s.test/en/password?x=1").unwrap()));
        assert!(!is_password_path(&Url::parse("https://s.test/").unwrap()));
        assert!(!is_password_path(&Url::parse("https://s.test/password/reset").unwrap()));
    }

    #[tokio::test]
    async fn test_redirect_to_password_is_protected() {
        let base = serve(
            |path| (path != PASSWORD_PATH).then(|| PASSWORD_PATH.to_string()),
            2,
        );
        assert!(is_password_protected(&format!("{base}/?pb=0"), PROBE_TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_long_redirect_chain_still_reaches_password() {
        // hop 0 through 15, then /password: 16 redirects
        let base = serve(hops, 17);
        assert!(is_password_protected(&format!("{base}/hop/0"), PROBE_TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_unreachable_is_not_protected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{addr}/");
        assert!(!is_password_protected(&url, Duration::from_secs(2)).await);
    }
}
