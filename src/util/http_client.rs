use std::future::Future;
use std::io::{self, Read};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use bytes::{Buf, Bytes};
use hyper::{Body, Client, Method, Request, Response, StatusCode, Uri};
use hyper::body::HttpBody;
use hyper::client::HttpConnector;
use hyper::header::{LOCATION, USER_AGENT};
use hyper_tls::HttpsConnector;
use tokio::runtime::Runtime;
use tracing::trace;

/// Maven Central returns a 403 for requests without a user agent
const DEFAULT_USER_AGENT: &str = concat!("maven-resolver/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECTS: usize = 5;

/// Upper bound for a body that `HttpTransport::get` holds in memory
pub const MAX_BUFFERED_BODY_SIZE: u64 = 1024 * 1024;

pub struct HttpResponse {
    pub status: StatusCode,
    /// the complete body of a 2xx response, empty for any other status
    pub body: Bytes,
}

pub struct StreamingResponse<'a> {
    pub status: StatusCode,
    /// Yields the body of a 2xx response and nothing for any other status. Dropping the reader
    ///  before the end abandons the rest of the transfer.
    pub body: Box<dyn Read + 'a>,
}

/// The blocking HTTP operations the resolvers need. An `Err` always means a transport failure -
///  any response that arrived, whatever its status, is `Ok`. Redirects are followed by the
///  transport, so callers only ever see the status of the final response.
///
/// `head` returns the status only, a HEAD response never has a body.
pub trait HttpTransport: Send + Sync {
    fn head(&self, uri: &Uri) -> anyhow::Result<StatusCode>;

    fn get_streaming<'a>(&'a self, uri: &Uri) -> anyhow::Result<StreamingResponse<'a>>;

    /// Reads the whole body into memory, failing if it is larger than `MAX_BUFFERED_BODY_SIZE`.
    fn get(&self, uri: &Uri) -> anyhow::Result<HttpResponse> {
        let response = self.get_streaming(uri)?;

        let mut body = Vec::new();
        response.body
            .take(MAX_BUFFERED_BODY_SIZE + 1)
            .read_to_end(&mut body)
            .with_context(|| format!("failed to read the body of {}", uri))?;

        if body.len() as u64 > MAX_BUFFERED_BODY_SIZE {
            bail!("body of {} is larger than {} bytes", uri, MAX_BUFFERED_BODY_SIZE);
        }

        Ok(HttpResponse {
            status: response.status,
            body: Bytes::from(body),
        })
    }
}

/// Blocking HTTP(S) client on top of hyper. Each call drives the request on a runtime owned by
///  the client, so it must not be called from within an async context.
///
/// The timeout applies to receiving the response head, and separately to each chunk of a
///  streamed body.
///
/// Instances do HTTP connection caching internally, so keeping them alive has performance benefits.
pub struct HyperHttpClient {
    runtime: Runtime,
    client: Client<HttpsConnector<HttpConnector>>,
    user_agent: String,
    timeout: Option<Duration>,
}

impl HyperHttpClient {
    pub fn new() -> anyhow::Result<HyperHttpClient> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create the HTTP client runtime")?;

        let client = {
            let _guard = runtime.enter();
            Client::builder()
                .build::<_, Body>(HttpsConnector::new())
        };

        Ok(HyperHttpClient {
            runtime,
            client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> HyperHttpClient {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> HyperHttpClient {
        self.user_agent = user_agent.into();
        self
    }

    /// fails only if the timeout elapses
    fn block_on<T>(&self, future: impl Future<Output = T>) -> anyhow::Result<T> {
        match self.timeout {
            None => Ok(self.runtime.block_on(future)),
            Some(timeout) => self.runtime
                .block_on(tokio::time::timeout(timeout, future))
                .map_err(|_| anyhow!("timed out after {:?}", timeout)),
        }
    }

    fn send_once(&self, method: &Method, uri: &Uri) -> anyhow::Result<Response<Body>> {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .body(Body::empty())?;

        trace!("{} {}", method, uri);
        let response = self.block_on(self.client.request(request))??;
        Ok(response)
    }

    fn send(&self, method: &Method, uri: &Uri) -> anyhow::Result<Response<Body>> {
        let mut current = uri.clone();

        for _ in 0..=MAX_REDIRECTS {
            let response = self.send_once(method, &current)?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            let next = match response.headers().get(LOCATION) {
                None => return Ok(response),
                Some(location) => {
                    let location = location.to_str()
                        .with_context(|| format!("invalid Location header in response from {}", current))?;
                    resolve_location(&current, location)?
                }
            };

            trace!("{} {} redirected to {}", response.status(), current, next);
            current = next;
        }

        Err(anyhow!("more than {} redirects", MAX_REDIRECTS))
    }
}

impl HttpTransport for HyperHttpClient {
    fn head(&self, uri: &Uri) -> anyhow::Result<StatusCode> {
        let response = self.send(&Method::HEAD, uri)
            .with_context(|| format!("HEAD {} failed", uri))?;
        Ok(response.status())
    }

    fn get_streaming<'a>(&'a self, uri: &Uri) -> anyhow::Result<StreamingResponse<'a>> {
        let response = self.send(&Method::GET, uri)
            .with_context(|| format!("GET {} failed", uri))?;

        let status = response.status();
        let body: Box<dyn Read + 'a> = if status.is_success() {
            Box::new(BodyReader {
                client: self,
                body: response.into_body(),
                pending: Bytes::new(),
            })
        }
        else {
            Box::new(io::empty())
        };

        Ok(StreamingResponse { status, body })
    }
}

/// Pulls a hyper body chunk by chunk, driving the client's runtime for each chunk.
struct BodyReader<'a> {
    client: &'a HyperHttpClient,
    body: Body,
    pending: Bytes,
}

impl Read for BodyReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.pending.is_empty() {
            let next = self.client.block_on(self.body.data())
                .map_err(|e| io::Error::new(io::ErrorKind::TimedOut, e.to_string()))?;

            match next {
                None => return Ok(0),
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(e)) => return Err(io::Error::new(io::ErrorKind::Other, e)),
            }
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }
}

/// Resolves the target of a `Location` header against the URI of the request it answered.
fn resolve_location(base: &Uri, location: &str) -> anyhow::Result<Uri> {
    if location.contains("://") {
        return Ok(location.parse()?);
    }

    let scheme = base.scheme_str().unwrap_or("http");
    if location.starts_with("//") {
        return Ok(format!("{}:{}", scheme, location).parse()?);
    }

    let authority = base.authority()
        .ok_or_else(|| anyhow!("cannot resolve redirect to {} against {}", location, base))?;

    let path = if location.starts_with('/') {
        location.to_string()
    }
    else {
        let base_path = base.path();
        let dir = match base_path.rfind('/') {
            Some(idx) => &base_path[..=idx],
            None => "/",
        };
        format!("{}{}", dir, location)
    };

    Ok(format!("{}://{}{}", scheme, authority, path).parse()?)
}
