use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

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

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn unique_data_path() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "running_crew_http_{}_{}.json",
        std::process::id(),
        unique_suffix()
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/auth")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_running_crew"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_ACCESS_CODE", "soso5")
        .env("APP_SPIN_SETTLE_MS", "200")
        .env("APP_LOGIN_DELAY_MS", "200")
        .env("APP_ERROR_FLASH_MS", "200")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(client: &Client, url: String) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

async fn add_runner(client: &Client, base_url: &str, name: &str, goal: f64) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/runners"))
        .json(&json!({ "name": name, "goal": goal }))
        .send()
        .await
        .unwrap()
}

fn runners_named<'a>(board: &'a Value, name: &str) -> Vec<&'a Value> {
    board["ranked"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|runner| runner["name"] == name)
        .collect()
}

#[tokio::test]
async fn http_duplicate_runner_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Kim{}", unique_suffix());

    let first = add_runner(&client, &server.base_url, &name, 50.0).await;
    assert!(first.status().is_success());

    let second = add_runner(&client, &server.base_url, &format!(" {} ", name.to_lowercase()), 30.0).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let board = get_json(&client, format!("{}/api/runners", server.base_url)).await;
    assert_eq!(runners_named(&board, &name).len(), 1);
    assert!(board["month_key"].as_str().unwrap().starts_with("running-challenge-"));
}

#[tokio::test]
async fn http_logging_goal_distance_completes_runner() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Lee{}", unique_suffix());

    let added: Value = add_runner(&client, &server.base_url, &name, 5.0)
        .await
        .json()
        .await
        .unwrap();
    let id = added["runner"]["id"].as_i64().unwrap();

    let logged: Value = client
        .post(format!("{}/api/runners/{id}/distance", server.base_url))
        .json(&json!({ "distance": 5.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(logged["runner"]["current"], 5.0);
    assert_eq!(logged["runner"]["rate"], "100");
    assert_eq!(logged["runner"]["streak"], 1);
    assert!(logged["runner"]["completedAt"].is_i64());
    assert_eq!(logged["feedback"]["confetti"].as_array().unwrap().len(), 1);

    let zero = client
        .post(format!("{}/api/runners/{id}/distance", server.base_url))
        .json(&json!({ "distance": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let missing = client
        .post(format!("{}/api/runners/1/distance", server.base_url))
        .json(&json!({ "distance": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let board = get_json(&client, format!("{}/api/runners", server.base_url)).await;
    assert_eq!(runners_named(&board, &name)[0]["rate"], "100");
}

#[tokio::test]
async fn http_delete_runner_needs_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let name = format!("Park{}", unique_suffix());

    let added: Value = add_runner(&client, &server.base_url, &name, 10.0)
        .await
        .json()
        .await
        .unwrap();
    let id = added["runner"]["id"].as_i64().unwrap();

    let declined: Value = client
        .delete(format!("{}/api/runners/{id}?confirm=false", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(declined["deleted"], false);
    let board = get_json(&client, format!("{}/api/runners", server.base_url)).await;
    assert_eq!(runners_named(&board, &name).len(), 1);

    let confirmed: Value = client
        .delete(format!("{}/api/runners/{id}?confirm=true", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(confirmed["deleted"], true);

    let placeholder = get_json(&client, format!("{}/api/runners/{id}", server.base_url)).await;
    assert_eq!(placeholder["name"], "");
}

#[tokio::test]
async fn http_wheel_lands_on_single_candidate() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    client
        .post(format!("{}/api/wheel/reset", server.base_url))
        .send()
        .await
        .unwrap();

    let spinning: Value = client
        .post(format!("{}/api/wheel/spin", server.base_url))
        .json(&json!({ "candidates": [{ "name": "Solo", "team": "A" }] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(spinning["phase"], "spinning");
    assert_eq!(spinning["rotation"], 1980.0);
    assert!(spinning["winner"].is_null());
    assert!(spinning["celebration"].is_null());

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let wheel = get_json(&client, format!("{}/api/wheel", server.base_url)).await;
        if wheel["phase"] == "landed" {
            assert_eq!(wheel["winner"], "Solo");
            assert_eq!(wheel["candidates"][0]["team"], "A");
            assert_eq!(wheel["celebration"]["particle_count"], 200);
            assert_eq!(wheel["celebration"]["spread"], 100);
            break;
        }
        if Instant::now() > deadline {
            panic!("wheel never landed");
        }
        sleep(Duration::from_millis(50)).await;
    }

    let reset: Value = client
        .post(format!("{}/api/wheel/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["phase"], "idle");
    assert_eq!(reset["rotation"], 0.0);
    assert!(reset["celebration"].is_null());
}

#[tokio::test]
async fn http_event_lifecycle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let title = format!("Marathon {}", unique_suffix());

    let rejected = client
        .post(format!("{}/api/events", server.base_url))
        .json(&json!({ "title": "", "raceDate": "2099-06-15T09:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let saved: Value = client
        .post(format!("{}/api/events", server.base_url))
        .json(&json!({
            "title": title,
            "raceDate": "2099-06-15T09:00",
            "regEndDate": "2099-06-10",
            "location": "Seoul",
            "url": ""
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = saved["id"].as_i64().unwrap();

    let events = get_json(&client, format!("{}/api/events", server.base_url)).await;
    let event = events
        .as_array()
        .unwrap()
        .iter()
        .find(|event| event["id"] == id)
        .expect("saved event listed");
    assert_eq!(event["badge"]["status"], "registration_open");
    assert_eq!(event["badge_class"], "urgent");
    assert_eq!(event["registration_label"], "Registration opens 6.10");

    let updated = client
        .put(format!("{}/api/events/{id}", server.base_url))
        .json(&json!({ "title": "Renamed", "raceDate": "2099-06-15T09:00" }))
        .send()
        .await
        .unwrap();
    assert!(updated.status().is_success());

    let events = get_json(&client, format!("{}/api/events", server.base_url)).await;
    let event = events
        .as_array()
        .unwrap()
        .iter()
        .find(|event| event["id"] == id)
        .unwrap();
    assert_eq!(event["title"], "Renamed");
    assert_eq!(event["badge"]["status"], "race_countdown");

    let deleted: Value = client
        .delete(format!("{}/api/events/{id}?confirm=true", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted["deleted"], true);
}

#[tokio::test]
async fn http_login_unlocks_after_delay() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let wrong: Value = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "code": "nope" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(wrong["accepted"], false);
    assert_eq!(wrong["status"]["login_error"], true);
    assert_eq!(wrong["feedback"]["vibrations"][0], json!([100, 50, 100]));

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let status = get_json(&client, format!("{}/api/auth", server.base_url)).await;
        if status["login_error"] == false {
            assert_eq!(status["logged_in"], false);
            break;
        }
        if Instant::now() > deadline {
            panic!("login error never cleared");
        }
        sleep(Duration::from_millis(50)).await;
    }

    let right: Value = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&json!({ "code": "soso5" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(right["accepted"], true);
    assert_eq!(right["status"]["login_success"], true);

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let status = get_json(&client, format!("{}/api/auth", server.base_url)).await;
        if status["logged_in"] == true {
            assert_eq!(status["login_error"], false);
            break;
        }
        if Instant::now() > deadline {
            panic!("login never completed");
        }
        sleep(Duration::from_millis(50)).await;
    }
}
