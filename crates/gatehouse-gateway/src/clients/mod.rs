//! Backend wiring for the gateway

pub mod embedded;
pub mod remote;

pub use embedded::EmbeddedBackends;
pub use remote::{RemoteAuth, RemoteProfiles};

use gatehouse_core::{AppConfig, GatewayMode, Result};
use std::sync::Arc;

use crate::backend::{AuthBackend, ProfileBackend};

/// Auth and profile backends selected by `GATEWAY_MODE`
pub async fn connect(
    config: &AppConfig,
) -> Result<(Arc<dyn AuthBackend>, Arc<dyn ProfileBackend>)> {
    match config.services.gateway_mode {
        GatewayMode::Remote => {
            let client = gatehouse_core::upstream::build_client(&config.services)?;
            let auth: Arc<dyn AuthBackend> = Arc::new(RemoteAuth::new(
                client.clone(),
                config.services.auth_url.clone(),
            ));
            let profiles: Arc<dyn ProfileBackend> = Arc::new(RemoteProfiles::new(
                client,
                config.services.profile_url.clone(),
            ));
            Ok((auth, profiles))
        }
        GatewayMode::Embedded => {
            let backends = EmbeddedBackends::build(config).await?;
            let auth: Arc<dyn AuthBackend> = backends.credentials;
            let profiles: Arc<dyn ProfileBackend> = backends.profiles;
            Ok((auth, profiles))
        }
    }
}
