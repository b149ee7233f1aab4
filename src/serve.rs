//! Tooltip lookup server.
//!
//! A small HTTP surface over the registry, built on `tiny_http`:
//!
//! - `GET /` - documentation set summary (JSON)
//! - `GET /namespaces` - registered namespaces (JSON array)
//! - `GET /tooltips/<namespace>` - all entries of one namespace (JSON)
//! - `GET /tooltips/<namespace>/<id>` - one fragment (`text/html`)
//!
//! Unregistered namespaces and ids answer 404 with a JSON body; a lookup
//! can never crash the server. The registry is shared through
//! [`RegistryHandle`] so the watcher thread can swap in a fresh scan while
//! requests keep being served; each request reads one consistent snapshot.

use crate::{
    config::{TipsConfig, cfg},
    log,
    registry::{TooltipRegistry, TopicId},
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Registry Handle
// ============================================================================

/// Shared, atomically replaceable registry.
///
/// Readers get an `Arc` snapshot (wait-free); the watcher replaces the
/// whole registry in one store after a re-scan. There is no partial
/// mutation: a snapshot is always a complete, consistent registry.
#[derive(Clone)]
pub struct RegistryHandle(Arc<ArcSwap<TooltipRegistry>>);

impl RegistryHandle {
    /// Wrap a freshly scanned registry.
    pub fn new(registry: TooltipRegistry) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(registry)))
    }

    /// Current registry snapshot.
    pub fn snapshot(&self) -> Arc<TooltipRegistry> {
        self.0.load_full()
    }

    /// Replace the registry (called by the watcher after a re-scan).
    pub fn replace(&self, registry: TooltipRegistry) {
        self.0.store(Arc::new(registry));
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the tooltip API server.
///
/// Binds to the configured interface and port (with auto-retry on port
/// conflict), sets up Ctrl+C for graceful shutdown, spawns the docs
/// watcher thread if enabled, then blocks handling requests.
pub fn serve_registry(registry: TooltipRegistry) -> Result<()> {
    let c = cfg();
    let interface: std::net::IpAddr = c.serve.interface.parse()?;
    let base_port = c.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "{} namespaces, {} tooltips", registry.namespace_count(), registry.entry_count());
    log!("serve"; "http://{}", addr);

    let handle = RegistryHandle::new(registry);

    if c.serve.watch {
        let watch_handle = handle.clone();
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(watch_handle) {
                log!("watch"; "{err}");
            }
        });
    }

    for request in server.incoming_requests() {
        // Snapshot per request: a concurrent swap never tears a response
        let snapshot = handle.snapshot();
        if let Err(e) = handle_request(request, &snapshot, &cfg()) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => {
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// Route one request against a registry snapshot.
fn handle_request(
    request: Request,
    registry: &TooltipRegistry,
    config: &TipsConfig,
) -> Result<()> {
    if *request.method() != Method::Get {
        return respond_json(
            request,
            405,
            &json!({ "error": "method not allowed" }),
        );
    }

    // Decode URL-encoded characters (e.g. %3A → ':') and strip any query
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let path = url_path.split('?').next().unwrap_or(&url_path).trim_matches('/');

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => respond_index(request, registry, config),
        ["namespaces"] => {
            let names: Vec<&str> = registry.namespaces().collect();
            respond_json(request, 200, &json!(names))
        }
        ["tooltips", namespace] => match registry.entries(namespace) {
            Some(entries) => respond_json(request, 200, &json!(entries)),
            None => respond_not_found(request),
        },
        ["tooltips", namespace, id] => {
            let Ok(id) = id.parse::<TopicId>() else {
                return respond_json(request, 400, &json!({ "error": "invalid topic id" }));
            };
            match registry.lookup(namespace, id) {
                Some(fragment) => respond_html(request, fragment),
                None => respond_not_found(request),
            }
        }
        _ => respond_not_found(request),
    }
}

/// Serve the documentation set summary.
fn respond_index(request: Request, registry: &TooltipRegistry, config: &TipsConfig) -> Result<()> {
    respond_json(
        request,
        200,
        &json!({
            "title": config.base.title,
            "description": config.base.description,
            "namespaces": registry.namespace_count(),
            "tooltips": registry.entry_count(),
        }),
    )
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a JSON value with the given status code.
fn respond_json(request: Request, status: u16, value: &serde_json::Value) -> Result<()> {
    let response = Response::from_string(value.to_string())
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap(),
        );
    request.respond(response)?;
    Ok(())
}

/// Serve a tooltip fragment as HTML.
fn respond_html(request: Request, fragment: &str) -> Result<()> {
    let response = Response::from_string(fragment)
        .with_header(Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found with a JSON body.
fn respond_not_found(request: Request) -> Result<()> {
    respond_json(request, 404, &json!({ "error": "not found" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TooltipSet;

    #[test]
    fn test_registry_handle_swap() {
        let mut first = TooltipRegistry::new();
        first.register("N", TooltipSet::from([(1, "old".to_string())]));
        let handle = RegistryHandle::new(first);

        let before = handle.snapshot();
        assert_eq!(before.lookup("N", 1), Some("old"));

        let mut second = TooltipRegistry::new();
        second.register("N", TooltipSet::from([(1, "new".to_string())]));
        handle.replace(second);

        // Old snapshot stays valid; fresh snapshots see the replacement
        assert_eq!(before.lookup("N", 1), Some("old"));
        assert_eq!(handle.snapshot().lookup("N", 1), Some("new"));
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = RegistryHandle::new(TooltipRegistry::new());
        let clone = handle.clone();

        let mut registry = TooltipRegistry::new();
        registry.register("N", TooltipSet::from([(1, "x".to_string())]));
        clone.replace(registry);

        assert_eq!(handle.snapshot().lookup("N", 1), Some("x"));
    }
}
