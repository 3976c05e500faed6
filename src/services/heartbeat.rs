// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::str::FromStr;
use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::{AuthMechanism, ClientOptions, Credential};
use mongodb::Client;
use tracing::{error, info};

use crate::config::MongoConfig;
use crate::error::{Error, Result};

/// Liveness probe against the configured MongoDB deployment.
///
/// The driver connects lazily, so constructing this never touches the
/// network; each [`ping`](Self::ping) does. Bad connection settings do not
/// stop the server: they are logged once and every ping reports them.
pub struct MongoHeartbeat {
    client: std::result::Result<Client, String>,
    db_name: String,
}

impl MongoHeartbeat {
    pub async fn new(config: &MongoConfig) -> Self {
        let client = Self::connect(config).await.map_err(|e| {
            error!(server_url = %config.server_url, error = %e, "invalid mongo settings");
            e.to_string()
        });

        Self {
            client,
            db_name: config.db_name.clone(),
        }
    }

    async fn connect(config: &MongoConfig) -> Result<Client> {
        let mut options = ClientOptions::parse(format!("mongodb://{}", config.server_url)).await?;

        let timeout = Duration::from_millis(config.timeout_ms);
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some("splitzie".into());

        if !config.username.is_empty() {
            let mechanism = AuthMechanism::from_str(&config.auth_mechanism)?;
            options.credential = Some(
                Credential::builder()
                    .username(config.username.clone())
                    .password(config.password.clone())
                    .source(config.auth_source.clone())
                    .mechanism(mechanism)
                    .build(),
            );
        }

        Ok(Client::with_options(options)?)
    }

    pub async fn ping(&self) -> Result<()> {
        let client = self.client.as_ref().map_err(|e| Error::Mongo(e.clone()))?;
        client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    /// Ping and log the outcome; `true` when the database answered.
    pub async fn check(&self) -> bool {
        match self.ping().await {
            Ok(()) => {
                info!("heartbeat ok");
                true
            }
            Err(e) => {
                error!(error = %e, "heartbeat failed");
                false
            }
        }
    }
}
