//! End-to-end tests: producer → listener → pad worker → rendered page

use dumppad::app::App;
use dumppad::config::PadConfig;
use dumppad::formatter::DumpDisplayStyle;
use dumppad::pad_view::PadView;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use tempfile::TempDir;

mod common;
use common::http::{get, parse_response, post_dump};
use common::test_server::{free_port, setup_may_runtime};

const DUMP_CONTAINER: &str = r#"{
    "$type": "SharpPad.DumpContainer, SharpPad",
    "Source": "customer.Orders",
    "Time": "12:00:01",
    "Value": {
        "$type": "System.Collections.Generic.List`1[[Shop.Order, Shop]], mscorlib",
        "$values": [
            {"$type": "Shop.Order, Shop", "Id": 1, "Total": 9.5},
            {"$type": "Shop.Order, Shop", "Id": 2, "Total": 20}
        ]
    }
}"#;

struct PadFixture {
    app: App,
    addr: SocketAddr,
    page: PathBuf,
    _dir: TempDir,
}

impl PadFixture {
    fn new(config: PadConfig) -> Self {
        setup_may_runtime();
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("pad.html");
        let app = App::new(Box::new(PadView::new(Some(page.clone())).unwrap())).unwrap();
        let addr = app.start(&config).unwrap();
        Self {
            app,
            addr,
            page,
            _dir: dir,
        }
    }

    fn page(&self) -> String {
        self.app.sync().unwrap();
        std::fs::read_to_string(&self.page).unwrap()
    }
}

fn config_on_free_port() -> PadConfig {
    PadConfig {
        listen_port: free_port(),
        ..PadConfig::default()
    }
}

#[test]
fn test_dump_container_reaches_page() {
    let fixture = PadFixture::new(config_on_free_port());
    assert_eq!(parse_response(&post_dump(&fixture.addr, DUMP_CONTAINER)).0, 200);

    let page = fixture.page();
    assert!(page.contains(r#"<div class="dump-source">customer.Orders</div>"#));
    assert!(page.contains("12:00:01"));
    assert!(page.contains("<th>Id</th><th>Total</th>"));
    assert!(page.contains("List&lt;Order&gt; (2 items)"));
    assert!(page.contains(&format!("Listening on port {}", fixture.addr.port())));
}

#[test]
fn test_clear_empties_page() {
    let fixture = PadFixture::new(config_on_free_port());
    post_dump(&fixture.addr, r#"{"$type": "html", "$html": "<i>marker</i>"}"#);
    assert!(fixture.page().contains("<i>marker</i>"));

    assert_eq!(parse_response(&get(&fixture.addr, "/clear")).0, 200);
    assert!(!fixture.page().contains("<i>marker</i>"));
}

#[test]
fn test_undecodable_dump_leaves_page_unchanged() {
    let fixture = PadFixture::new(config_on_free_port());
    post_dump(&fixture.addr, "\"kept\"");
    let before = fixture.page();

    assert_eq!(parse_response(&post_dump(&fixture.addr, "{\"broken\": ")).0, 200);
    assert_eq!(fixture.page(), before);
}

#[test]
fn test_restart_applies_new_settings() {
    let config = config_on_free_port();
    let fixture = PadFixture::new(config.clone());

    let restarted = PadConfig {
        dump_display_style: DumpDisplayStyle::Single,
        show_time_on_dumps: false,
        ..config.clone()
    };
    let addr = fixture.app.restart(&restarted).unwrap();
    assert_eq!(addr.port(), config.listen_port);
    assert_eq!(fixture.app.settings(), restarted.format_settings());

    post_dump(&addr, DUMP_CONTAINER);
    let page = fixture.page();
    assert!(page.contains(r#"<div class="dump dump-single">"#));
    assert!(!page.contains("12:00:01"));
    assert!(!page.contains("List&lt;Order&gt;"));
}

#[test]
fn test_bind_failure_keeps_app_running() {
    setup_may_runtime();
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let config = PadConfig {
        listen_port: occupied.local_addr().unwrap().port(),
        ..PadConfig::default()
    };

    let app = App::new(Box::new(PadView::new(None).unwrap())).unwrap();
    assert!(app.start(&config).is_err());
    assert!(app.local_addr().is_none());

    // values can still be dumped directly and a later start succeeds
    app.dump(serde_json::json!(1)).unwrap();
    app.sync().unwrap();
    let addr = app.restart(&config_on_free_port()).unwrap();
    assert_eq!(app.local_addr(), Some(addr));
}
