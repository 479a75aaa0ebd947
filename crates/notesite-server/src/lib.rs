//! HTTP server shell for notesite.
//!
//! Every request goes through a single fallback handler that asks the
//! routing core for bytes and maps the outcome to 200/404/500. The MIME
//! type is inferred from the request path's extension; rendered pages
//! (no extension) are served as HTML.
//!
//! # Quick Start
//!
//! ```ignore
//! use notesite_server::{Listen, ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = server_config_from_site_config(&site_config).unwrap();
//!     run_server(config).await.unwrap();
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use notesite_template::TemplateFiles;
use notesite_tree::{BuildError, RouteError, SiteRouter, TreeOptions};
use tower_http::trace::TraceLayer;

/// Listen endpoint: TCP port or unix socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listen {
    /// Bind a TCP port on all interfaces.
    Port(u16),
    /// Bind a unix socket at the given path.
    Sock(PathBuf),
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Where to listen.
    pub listen: Listen,
    /// Routing tree inputs.
    pub tree: TreeOptions,
    /// Template filenames.
    pub templates: TemplateFiles,
}

/// Error starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The initial tree or template build failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Listener or connection error.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state for the request handler.
struct AppState {
    router: Arc<SiteRouter>,
}

/// Run the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns [`ServeError`] if the initial build fails or the listener
/// cannot be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), ServeError> {
    let router = SiteRouter::new(config.tree, config.templates)?;
    let state = Arc::new(AppState {
        router: Arc::clone(&router),
    });

    let app = Router::new()
        .fallback(serve_path)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match config.listen {
        Listen::Port(port) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(address = %addr, "Starting server");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Listen::Sock(path) => {
            // A previous run may have left the socket file behind.
            let _ = std::fs::remove_file(&path);
            let listener = tokio::net::UnixListener::bind(&path)?;
            tracing::info!(sock = %path.display(), "Starting server");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    router.close();
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// The single request handler: everything routes through the tree.
async fn serve_path(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = uri.path();
    respond(state.router.route(path), path)
}

/// Map a routing outcome to an HTTP response.
fn respond(result: Result<Vec<u8>, RouteError>, path: &str) -> Response {
    match result {
        Ok(body) => {
            let mut response = (StatusCode::OK, body).into_response();
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type(path));
            response
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(path, error = %e, "404");
            (StatusCode::NOT_FOUND, e.body().to_vec()).into_response()
        }
        Err(e) => {
            tracing::error!(path, error = %e, "500");
            (StatusCode::INTERNAL_SERVER_ERROR, e.body().to_vec()).into_response()
        }
    }
}

/// Infer the content type from the request path's extension.
///
/// Rendered pages have no extension and are served as HTML.
fn content_type(path: &str) -> header::HeaderValue {
    let mime = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("text/html; charset=utf-8");
    header::HeaderValue::from_static(mime)
}

/// Build a [`ServerConfig`] from the loaded site configuration.
///
/// # Errors
///
/// Returns [`notesite_config::ConfigError`] if the default note pattern
/// does not compile or no listen endpoint is configured.
pub fn server_config_from_site_config(
    config: &notesite_config::Config,
) -> Result<ServerConfig, notesite_config::ConfigError> {
    let listen = match (&config.server.port, &config.server.sock) {
        (Some(port), _) => Listen::Port(*port),
        (None, Some(sock)) => Listen::Sock(sock.clone()),
        (None, None) => {
            return Err(notesite_config::ConfigError::Validation(
                "server.port or server.sock must be set".to_owned(),
            ));
        }
    };

    Ok(ServerConfig {
        listen,
        tree: TreeOptions {
            note_root: config.notes.note_root.clone(),
            template_root: config.template.template_root.clone(),
            static_dirs: config.template.static_dirs.clone(),
            category_marker: config.notes.category_marker.clone(),
            resource_marker: config.notes.resource_marker.clone(),
            note_pattern: config.note_pattern()?,
        },
        templates: TemplateFiles {
            index: config.template.index_template.clone(),
            category: config.template.category_template.clone(),
            content: config.template.content_template.clone(),
            error_404: config.template.error_404.clone(),
            error_500: config.template.error_500.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_respond_ok_sets_content_type_from_extension() {
        let response = respond(Ok(b"body { }".to_vec()), "/css/main.css");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
    }

    #[test]
    fn test_respond_ok_defaults_to_html() {
        let response = respond(Ok(b"<h1>hi</h1>".to_vec()), "/guides/setup");

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_respond_not_found_uses_fallback_body() {
        let err = RouteError::NotFound {
            uri: "/nope".to_owned(),
            body: b"gone".to_vec(),
        };

        let response = respond(Err(err), "/nope");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_respond_internal_maps_to_500() {
        let err = RouteError::Internal {
            uri: "/page".to_owned(),
            reason: "boom".to_owned(),
            body: Vec::new(),
        };

        let response = respond(Err(err), "/page");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_config_from_site_config_port() {
        let mut config = notesite_config::Config::default();
        config.server.port = Some(8080);

        let server_config = server_config_from_site_config(&config).unwrap();

        assert_eq!(server_config.listen, Listen::Port(8080));
        assert_eq!(server_config.tree.category_marker, "category.toml");
        assert_eq!(server_config.templates.index, "index.html");
    }

    #[test]
    fn test_server_config_from_site_config_sock() {
        let mut config = notesite_config::Config::default();
        config.server.sock = Some(PathBuf::from("/tmp/notesite.sock"));

        let server_config = server_config_from_site_config(&config).unwrap();

        assert_eq!(
            server_config.listen,
            Listen::Sock(PathBuf::from("/tmp/notesite.sock"))
        );
    }

    #[test]
    fn test_server_config_requires_endpoint() {
        let config = notesite_config::Config::default();

        let result = server_config_from_site_config(&config);

        assert!(result.is_err());
    }
}
