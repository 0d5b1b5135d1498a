//! Local HTTP listener that receives the identity service redirect.

use std::time::Duration;

use anyhow::{Context, Result};
use idflow_core::address::CallbackAddress;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

/// Binds the loopback port of the callback address.
pub async fn bind(callback: &CallbackAddress) -> Result<TcpListener> {
    let port = callback
        .port()
        .with_context(|| format!("Callback URL {} has no port", callback.url()))?;
    TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Failed to listen on 127.0.0.1:{port}"))
}

/// Accepts connections until one hits the callback path, then returns the
/// full redirect address (query included).
pub async fn wait_for_callback(
    listener: &TcpListener,
    callback: &CallbackAddress,
    timeout: Duration,
) -> Result<Url> {
    tokio::time::timeout(timeout, accept_callback(listener, callback))
        .await
        .with_context(|| {
            format!(
                "Timed out after {}s waiting for login redirect",
                timeout.as_secs()
            )
        })?
}

async fn accept_callback(listener: &TcpListener, callback: &CallbackAddress) -> Result<Url> {
    loop {
        let (mut stream, _) = listener
            .accept()
            .await
            .context("Failed to accept callback connection")?;

        let mut buffer = [0u8; 4096];
        let read = stream
            .read(&mut buffer)
            .await
            .context("Failed to read callback request")?;
        let request = String::from_utf8_lossy(&buffer[..read]);

        match address_from_request(&request, callback) {
            Some(address) => {
                respond(&mut stream, success_response()).await;
                return Ok(address);
            }
            None => {
                tracing::debug!("ignoring request outside the callback path");
                respond(&mut stream, not_found_response()).await;
            }
        }
    }
}

async fn respond(stream: &mut TcpStream, response: String) {
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::debug!("failed to answer callback request: {e}");
    }
}

fn address_from_request(request: &str, callback: &CallbackAddress) -> Option<Url> {
    let request_line = request.lines().next()?;
    let mut parts = request_line.split_whitespace();
    let _method = parts.next()?;
    let target = parts.next()?;

    let address = callback.url().join(target).ok()?;
    callback.matches(&address).then_some(address)
}

fn success_response() -> String {
    html_response(
        "200 OK",
        "<html><body><h3>Login received</h3>\
         <p>You can close this window and return to the terminal.</p></body></html>",
    )
}

fn not_found_response() -> String {
    html_response("404 Not Found", "<html><body><h3>Not found</h3></body></html>")
}

fn html_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    )
}
