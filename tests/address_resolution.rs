// tests/address_resolution.rs

use proptest::prelude::*;
use servectl::config::ServerAddress;
use servectl::shutdown::SHUTDOWN_CHECK_PATH;

#[test]
fn bare_host_gets_http_scheme_and_port() {
    let addr = ServerAddress::resolve("localhost", 8080).unwrap();
    assert_eq!(addr.url().as_str(), "http://localhost:8080/");
    assert_eq!(addr.port(), Some(8080));
}

#[test]
fn bare_ip_is_accepted() {
    let addr = ServerAddress::resolve("10.0.0.2", 3000).unwrap();
    assert_eq!(addr.url().as_str(), "http://10.0.0.2:3000/");
}

#[test]
fn host_with_port_has_its_port_replaced() {
    let addr = ServerAddress::resolve("example.com:3000", 4000).unwrap();
    assert_eq!(addr.url().as_str(), "http://example.com:4000/");

    let addr = ServerAddress::resolve("localhost:1234", 8080).unwrap();
    assert_eq!(addr.url().as_str(), "http://localhost:8080/");
}

#[test]
fn full_url_keeps_scheme_and_path() {
    let addr = ServerAddress::resolve("https://example.com/app", 8443).unwrap();
    assert_eq!(addr.url().as_str(), "https://example.com:8443/app");
    assert_eq!(addr.url().scheme(), "https");
}

#[test]
fn default_port_for_scheme_is_still_reported() {
    let addr = ServerAddress::resolve("localhost", 80).unwrap();
    assert_eq!(addr.url().as_str(), "http://localhost/");
    assert_eq!(addr.port(), Some(80));
}

#[test]
fn endpoint_is_mounted_at_root() {
    let addr = ServerAddress::resolve("https://example.com/app/", 8443).unwrap();
    let url = addr.endpoint(SHUTDOWN_CHECK_PATH).unwrap();
    assert_eq!(url.as_str(), "https://example.com:8443/test-shutdown");

    let addr = ServerAddress::resolve("localhost", 8080).unwrap();
    let url = addr.endpoint(SHUTDOWN_CHECK_PATH).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/test-shutdown");
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let addr = ServerAddress::resolve("  localhost \n", 8080).unwrap();
    assert_eq!(addr.url().as_str(), "http://localhost:8080/");
}

#[test]
fn invalid_host_is_rejected() {
    assert!(ServerAddress::resolve("exa mple.com", 8080).is_err());
    assert!(ServerAddress::resolve("", 8080).is_err());
}

#[test]
fn display_matches_url() {
    let addr = ServerAddress::resolve("localhost", 8080).unwrap();
    assert_eq!(addr.to_string(), "http://localhost:8080/");
}

proptest! {
    #[test]
    fn bare_hosts_resolve_to_http_with_requested_port(
        host in "[a-z][a-z0-9]{0,10}(\\.[a-z]{2,5}){0,2}",
        port in 1u16..=65535,
    ) {
        let addr = ServerAddress::resolve(&host, port).unwrap();
        prop_assert_eq!(addr.url().scheme(), "http");
        prop_assert_eq!(addr.url().host_str(), Some(host.as_str()));
        prop_assert_eq!(addr.port(), Some(port));
    }

    #[test]
    fn full_urls_keep_scheme_host_and_path(
        host in "[a-z][a-z0-9]{0,10}\\.[a-z]{2,5}",
        segment in "[a-z0-9]{1,8}",
        port in 1u16..=65535,
    ) {
        let raw = format!("https://{host}/{segment}");
        let addr = ServerAddress::resolve(&raw, port).unwrap();
        prop_assert_eq!(addr.url().scheme(), "https");
        prop_assert_eq!(addr.url().host_str(), Some(host.as_str()));
        let expected_path = format!("/{segment}");
        prop_assert_eq!(addr.url().path(), expected_path.as_str());
        prop_assert_eq!(addr.port(), Some(port));

        let endpoint = addr.endpoint(SHUTDOWN_CHECK_PATH).unwrap();
        prop_assert_eq!(endpoint.path(), SHUTDOWN_CHECK_PATH);
    }
}
