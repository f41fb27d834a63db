#![allow(missing_docs)]

use anyhow::Context;
use beer_client::{BeerClient, ClientAuthMethod, OAuth2Config, TokenProvider};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use super::fake_server::{CLIENT_ID, CLIENT_SECRET, FakeOptions, FakeState, router};

/// A fake catalog and token endpoint on a random local port, with a client pointing at it.
#[derive(Debug, derive_more::Deref)]
pub struct TestApp {
    #[deref]
    client: BeerClient,
    pub state: FakeState,
    pub base_url: String,
    server: JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(FakeOptions::default()).await
    }

    pub async fn start_with(options: FakeOptions) -> anyhow::Result<Self> {
        Self::start_full(options, ClientAuthMethod::Basic).await
    }

    pub async fn start_full(
        options: FakeOptions,
        auth_method: ClientAuthMethod,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind test listener")?;
        let addr = listener.local_addr()?;
        let state = FakeState::seeded(options);
        let app = router(state.clone());
        info!(%addr, "launching fake catalog");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        let base_url = format!("http://{addr}");
        let oauth2 = OAuth2Config::client_credentials(
            CLIENT_ID,
            CLIENT_SECRET,
            format!("{base_url}/oauth2/token"),
        )?
        .add_scopes(["message.read", "message.write"])
        .with_auth_method(auth_method)
        .build()?;
        let client = BeerClient::builder()
            .with_root_url(&base_url)?
            .with_oauth2(oauth2)?
            .build()?;

        Ok(Self {
            client,
            state,
            base_url,
            server,
        })
    }

    pub fn client(&self) -> &BeerClient {
        &self.client
    }

    pub fn tokens(&self) -> &TokenProvider {
        self.client.token_provider()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}
