use anyhow::Result;
use reprise_client::{ClientConfig, HttpApi};
use reprise_server::{
    create_router, Address, AppState, Catalog, CatalogSnapshot, Config, MarketStore, User,
};
use reprise_types::{Offer, OfferStatus, ProductCondition, UserId};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const ALICE: UserId = 1;
pub const BOB: UserId = 2;
pub const CAROL: UserId = 3;

/// A live order service on a random local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client config pointing at this server with a short search debounce.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url(),
            search_debounce_ms: 50,
            ..ClientConfig::default()
        }
    }

    pub fn client(&self, user_id: UserId) -> Result<Arc<HttpApi>> {
        Ok(Arc::new(HttpApi::new(&self.client_config(), Some(user_id))?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with(seed_snapshot()).await
}

pub async fn start_server_with(snapshot: CatalogSnapshot) -> Result<TestServer> {
    let config = Config {
        data_path: String::new(),
        ..Config::default()
    };
    let store = MarketStore::new(Catalog::from(snapshot));
    let state = Arc::new(AppState::with_store(config, store));
    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("[start_server] server stopped: {e}");
        }
    });
    Ok(TestServer { addr, state, task })
}

pub fn offer(id: u64, seller_id: UserId, title: &str, price: f64) -> Offer {
    Offer {
        id,
        title: title.into(),
        description: String::new(),
        price,
        seller_id,
        image: Some(format!("https://cdn.example.com/{id}.jpg")),
        product_condition: ProductCondition::Good,
        status: OfferStatus::Available,
        is_deleted: false,
    }
}

fn user(id: UserId, first: &str, last: &str) -> User {
    User {
        id,
        first_name: first.into(),
        last_name: last.into(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone: "0600000000".into(),
    }
}

fn address(id: u64, name: &str, city: &str, sector: Option<&str>) -> Address {
    Address {
        id,
        address_name: name.into(),
        city: city.into(),
        sector: sector.map(Into::into),
        latitude: None,
        longitude: None,
    }
}

/// Alice owns a bike (150) and a laptop (300), Bob a phone (200), Carol a
/// lamp (80).
pub fn seed_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        users: vec![
            user(ALICE, "Alice", "Martin"),
            user(BOB, "Bob", "Durand"),
            user(CAROL, "Carol", "Petit"),
        ],
        offers: vec![
            offer(10, ALICE, "City bike", 150.0),
            offer(11, ALICE, "Laptop", 300.0),
            offer(20, BOB, "Phone", 200.0),
            offer(30, CAROL, "Lamp", 80.0),
        ],
        addresses: vec![
            address(1, "Gare Casa Port", "Casablanca", Some("Centre")),
            address(2, "Marina", "Rabat", Some("Agdal")),
        ],
        orders: vec![],
    }
}
