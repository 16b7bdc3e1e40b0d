pub mod api;

use crate::cli::ServeArgs;
use crate::gateway::CompletionGateway;
use log::{ info, warn };
use std::error::Error;

pub struct Server {
    gateway: CompletionGateway,
    args: ServeArgs,
}

impl Server {
    pub fn new(gateway: CompletionGateway, args: ServeArgs) -> Self {
        Self { gateway, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tls = match (self.args.enable_tls, &self.args.tls_cert_path, &self.args.tls_key_path) {
            (false, _, _) => None,
            (true, Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
            (true, _, _) => {
                warn!("--enable-tls was set without both certificate and key paths.");
                return Err("TLS enabled without cert/key".into());
            }
        };

        info!("Model: {}", self.gateway.model());
        api::start_http_server(&self.args.server_addr, self.gateway.clone(), tls).await
    }
}
