use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::data::{CreatureRepository, DataError, JsonCreatureRepository};

pub mod api;
pub mod routes;

const MAX_REQUEST_BYTES: usize = 1 << 20;
/// A stalled client gives up its turn after this long.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn run_server(config: &AppConfig) -> Result<(), ServerError> {
    let repo = JsonCreatureRepository::from_path(&config.data_path)?;
    let listener = TcpListener::bind(&config.bind_addr).map_err(|source| ServerError::Bind {
        addr: config.bind_addr.clone(),
        source,
    })?;
    info!(addr = %config.bind_addr, creatures = repo.len(), "bestiary server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &repo, READ_TIMEOUT) {
                    warn!(%err, "request error");
                }
            }
            Err(err) => warn!(%err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(
    stream: &mut TcpStream,
    repo: &dyn CreatureRepository,
    read_timeout: Duration,
) -> std::io::Result<()> {
    stream.set_read_timeout(Some(read_timeout))?;
    let Some(request) = read_request(stream)? else {
        return Ok(());
    };

    let (head, body) = request
        .split_once("\r\n\r\n")
        .or_else(|| request.split_once("\n\n"))
        .unwrap_or((request.as_str(), ""));
    let request_line = head.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");
    debug!(method, path, "request");

    let response = routes::route_request(method, path, body, repo).to_http_string();
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Read headers, then as much body as `Content-Length` announces.
fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut data = Vec::new();
    let mut buffer = [0_u8; 16_384];
    loop {
        let bytes_read = stream.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..bytes_read]);
        if data.len() >= MAX_REQUEST_BYTES || request_complete(&data) {
            break;
        }
    }
    if data.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&data).into_owned()))
}

fn request_complete(data: &[u8]) -> bool {
    let Some(header_end) = find_subslice(data, b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&data[..header_end]);
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    data.len() >= header_end + 4 + content_length
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
