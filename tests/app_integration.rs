use chrono::Local;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const COMPANY_TABLE: &str = r#"
        <table>
            <tr><th>회사명</th><th>종목코드</th></tr>
            <tr><td>삼성전자</td><td>5930</td></tr>
        </table>
    "#;

    pub const FUND_OPTIONS: &str = r#"
        <select>
            <option value="">전체</option>
            <option value="069500">KODEX 200</option>
        </select>
    "#;

    pub async fn create_kind_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/corpgeneral/corpList.do"))
            .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_TABLE))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/disclosure/disclosurebystocktype.do"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FUND_OPTIONS))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_daily_mock_server(rows_html: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let body = format!(
            "<table><tr><th>날짜</th><th>종가</th></tr>{rows_html}</table>"
        );

        Mock::given(method("GET"))
            .and(path("/item/sise_day.nhn"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(
        kind_uri: &str,
        daily_uri: &str,
        cache_path: &std::path::Path,
    ) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
sources:
  kind:
    base_url: "{kind_uri}"
  daily:
    base_url: "{daily_uri}"
cache_path: "{}"
"#,
            cache_path.display()
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_full_flow_writes_price_file() {
    let today = Local::now().date_naive();
    let kind_server = test_utils::create_kind_mock_server().await;
    let daily_server = test_utils::create_daily_mock_server(&format!(
        "<tr><td>{}</td><td>56,000</td></tr>",
        today.format("%Y.%m.%d")
    ))
    .await;

    let work_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cache_path = work_dir.path().join("data").join("corplist.json");
    let save_dir = work_dir.path().join("out");
    let config_file = test_utils::write_config(&kind_server.uri(), &daily_server.uri(), &cache_path);

    let result = kquote::run(
        kquote::FetchRequest {
            corp_name: "삼성전자".to_string(),
            save_dir: save_dir.clone(),
            refresh_corplist: false,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "run failed with: {:?}", result.err());

    let expected = save_dir.join(format!("005930-{}", today.format("%Y%m%d")));
    info!(path = %expected.display(), "Checking price file");
    let raw = fs::read_to_string(&expected).expect("Price file missing");
    let parsed: kquote::report::PriceFile = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.value, 56000.0);

    // Cache file was created alongside.
    assert!(cache_path.exists());
}

#[test_log::test(tokio::test)]
async fn test_unresolved_name_fails_before_any_price_fetch() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let kind_server = test_utils::create_kind_mock_server().await;

    // The price source must never be contacted for an unresolvable name.
    let daily_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item/sise_day.nhn"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&daily_server)
        .await;

    let work_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cache_path = work_dir.path().join("corplist.json");
    let save_dir = work_dir.path().join("out");
    let config_file = test_utils::write_config(&kind_server.uri(), &daily_server.uri(), &cache_path);

    let result = kquote::run(
        kquote::FetchRequest {
            corp_name: "없는회사".to_string(),
            save_dir: save_dir.clone(),
            refresh_corplist: false,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("No exchange code found")
    );
    assert!(!save_dir.exists(), "No output file may be written");
}

#[test_log::test(tokio::test)]
async fn test_refresh_flag_rebuilds_a_stale_cache() {
    let today = Local::now().date_naive();
    let kind_server = test_utils::create_kind_mock_server().await;
    let daily_server = test_utils::create_daily_mock_server(&format!(
        "<tr><td>{}</td><td>56,000</td></tr>",
        today.format("%Y.%m.%d")
    ))
    .await;

    let work_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let cache_path = work_dir.path().join("corplist.json");
    // Stale cache maps the company to the wrong code.
    fs::write(&cache_path, r#"{"삼성전자":"000001"}"#).unwrap();

    let save_dir = work_dir.path().join("out");
    let config_file = test_utils::write_config(&kind_server.uri(), &daily_server.uri(), &cache_path);

    let result = kquote::run(
        kquote::FetchRequest {
            corp_name: "삼성전자".to_string(),
            save_dir: save_dir.clone(),
            refresh_corplist: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "run failed with: {:?}", result.err());

    // The rebuilt mapping, not the stale file, provided the code.
    let expected = save_dir.join(format!("005930-{}", today.format("%Y%m%d")));
    assert!(expected.exists());

    let on_disk = fs::read_to_string(&cache_path).unwrap();
    assert!(on_disk.contains("005930"));
    assert!(!on_disk.contains("000001"));
}
