//! Project launcher
//!
//! Projects are not executed in-process; launching one reserves a TCP port on
//! the bind host and publishes the endpoint the project would listen on.

use crate::constants::EXTERNAL_BIND_HOST;
use async_trait::async_trait;
use tokio::net::TcpListener;
use tracing::debug;
use whh_domain::constants::OUTPUT_URL;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{LaunchContext, ResourceLauncher};
use whh_domain::value_objects::ResourceKind;

/// Allocates an HTTP endpoint for a project
#[derive(Debug, Clone)]
pub struct ProjectLauncher {
    bind_host: String,
}

impl ProjectLauncher {
    /// Launcher binding on `bind_host` unless the project asks for external endpoints
    pub fn new<S: Into<String>>(bind_host: S) -> Self {
        Self {
            bind_host: bind_host.into(),
        }
    }

    fn host_for(&self, context: &LaunchContext) -> &str {
        match context.resource.kind() {
            ResourceKind::Project {
                external_http: true,
            } => EXTERNAL_BIND_HOST,
            _ => &self.bind_host,
        }
    }
}

#[async_trait]
impl ResourceLauncher for ProjectLauncher {
    async fn launch(&self, context: &LaunchContext) -> Result<()> {
        let host = self.host_for(context);
        let listener = TcpListener::bind((host, 0)).await.map_err(|e| {
            Error::io_with_source(format!("Failed to allocate an endpoint on {host}"), e)
        })?;
        let port = listener.local_addr()?.port();
        drop(listener);

        let advertised = if host == EXTERNAL_BIND_HOST {
            "localhost"
        } else {
            host
        };
        let url = format!("http://{advertised}:{port}");
        debug!(resource = %context.resource.name(), url = %url, "Allocated project endpoint");
        context.outputs.publish(OUTPUT_URL, url);
        Ok(())
    }

    async fn shutdown(&self, context: &LaunchContext) -> Result<()> {
        context.outputs.clear();
        Ok(())
    }
}
