use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct CartSummary {
    item_count: u64,
    subtotal: String,
    subtotal_minor: u64,
    cart: Value,
}

#[derive(Debug, Deserialize)]
struct Notification {
    message: String,
    dismiss_after_ms: u64,
}

#[derive(Debug, Deserialize)]
struct AddItemResponse {
    notification: Notification,
    summary: CartSummary,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", std::process::id(), nanos)
}

fn unique_data_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("brew_cart_http_{}", unique_suffix()));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/cart/count")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(data_dir: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_brew_cart"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(&unique_data_dir()).await);
    #[cfg(unix)]
    cleanup::register(server.child.id());
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_cart(client: &Client, base_url: &str) -> CartSummary {
    client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn add(client: &Client, base_url: &str, name: &str, price: &str) -> AddItemResponse {
    let response = client
        .post(format!("{base_url}/api/cart/items"))
        .json(&json!({ "name": name, "price": price, "image": "beans.jpg" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

fn find_line<'a>(summary: &'a CartSummary, name: &str) -> Option<&'a Value> {
    summary.cart["items"]
        .as_array()?
        .iter()
        .find(|line| line["name"] == name)
}

#[tokio::test]
async fn http_adding_same_product_twice_merges_lines() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Espresso Blend {}", unique_suffix());

    let before = get_cart(&client, &server.base_url).await;
    add(&client, &server.base_url, &name, "₹350.00").await;
    let second = add(&client, &server.base_url, &name, "₹350.00").await;

    assert_eq!(second.notification.message, format!("{name} added to cart!"));
    assert_eq!(second.notification.dismiss_after_ms, 3000);
    assert_eq!(second.summary.item_count, before.item_count + 2);
    assert_eq!(second.summary.subtotal_minor, before.subtotal_minor + 70_000);
    assert_eq!(second.summary.cart["state"], "populated");

    let line = find_line(&second.summary, &name).expect("missing line");
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["unit_price"], "₹350.00");
    assert_eq!(line["line_total"], "₹700.00");

    let count: Value = client
        .get(format!("{}/api/cart/count", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["item_count"], second.summary.item_count);
}

#[tokio::test]
async fn http_rejects_unparsable_price() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_cart(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/api/cart/items", server.base_url))
        .json(&json!({ "name": "Mystery Roast", "price": "₹abc", "image": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = get_cart(&client, &server.base_url).await;
    assert_eq!(after.item_count, before.item_count);
    assert_eq!(after.subtotal, before.subtotal);
}

#[tokio::test]
async fn http_remove_deletes_line_and_rejects_bad_index() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Cold Brew {}", unique_suffix());

    let added = add(&client, &server.base_url, &name, "₹299").await;
    let index = find_line(&added.summary, &name).expect("missing line")["index"]
        .as_u64()
        .unwrap();

    let response = client
        .delete(format!("{}/api/cart/items/{index}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let summary: CartSummary = response.json().await.unwrap();
    assert!(find_line(&summary, &name).is_none());
    assert_eq!(summary.item_count, added.summary.item_count - 1);

    let response = client
        .delete(format!("{}/api/cart/items/100000", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_cart_survives_restart() {
    let data_dir = unique_data_dir();
    let client = Client::new();

    {
        let server = spawn_server(&data_dir).await;
        let empty = get_cart(&client, &server.base_url).await;
        assert_eq!(empty.item_count, 0);
        assert_eq!(empty.cart["state"], "empty");

        add(&client, &server.base_url, "Monsoon Malabar", "₹420.00").await;
        add(&client, &server.base_url, "Espresso Blend", "₹350.00").await;
    }

    let server = spawn_server(&data_dir).await;
    let summary = get_cart(&client, &server.base_url).await;
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.subtotal, "₹770.00");
    let items = summary.cart["items"].as_array().unwrap();
    assert_eq!(items[0]["name"], "Monsoon Malabar");
    assert_eq!(items[1]["name"], "Espresso Blend");

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Monsoon Malabar"));
    assert!(html.contains("₹770.00"));
}

fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn assert_redirects_home(response: &reqwest::Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");
}

#[tokio::test]
async fn http_catalog_lists_products() {
    let server = shared_server().await;
    let catalog: Vec<Value> = Client::new()
        .get(format!("{}/api/catalog", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!catalog.is_empty());
    let espresso = catalog
        .iter()
        .find(|product| product["name"] == "Espresso Blend")
        .expect("missing catalog product");
    assert_eq!(espresso["price"], "₹350.00");
}

#[tokio::test]
async fn http_forms_add_and_remove_then_redirect() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = no_redirect_client();
    let name = format!("Chikmagalur Estate {}", unique_suffix());

    let before = get_cart(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/cart/add", server.base_url))
        .form(&[("name", name.as_str()), ("price", "₹480.00")])
        .send()
        .await
        .unwrap();
    assert_redirects_home(&response);

    let added = get_cart(&client, &server.base_url).await;
    assert_eq!(added.item_count, before.item_count + 1);
    assert_eq!(added.subtotal_minor, before.subtotal_minor + 48_000);
    let index = find_line(&added, &name).expect("missing line")["index"]
        .as_u64()
        .unwrap();

    let response = client
        .post(format!("{}/cart/remove/{index}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_redirects_home(&response);

    let removed = get_cart(&client, &server.base_url).await;
    assert!(find_line(&removed, &name).is_none());
    assert_eq!(removed.item_count, before.item_count);

    let response = client
        .post(format!("{}/cart/remove/100000", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/cart/add", server.base_url))
        .form(&[("name", "Mystery Roast"), ("price", "cheap")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_concurrent_adds_are_all_persisted() {
    let data_dir = unique_data_dir();
    let client = Client::new();

    {
        let server = spawn_server(&data_dir).await;
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let client = client.clone();
            let base_url = server.base_url.clone();
            tasks.spawn(async move {
                add(&client, &base_url, "Cold Brew Pack", "₹299.00").await;
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        let summary = get_cart(&client, &server.base_url).await;
        assert_eq!(summary.item_count, 16);
    }

    let server = spawn_server(&data_dir).await;
    let summary = get_cart(&client, &server.base_url).await;
    assert_eq!(summary.item_count, 16);
    assert_eq!(summary.subtotal_minor, 16 * 29_900);
    let line = find_line(&summary, "Cold Brew Pack").expect("missing line");
    assert_eq!(line["quantity"], 16);
}
