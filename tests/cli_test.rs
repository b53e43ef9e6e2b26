use nexa_discovery::cli::{CliHandler, Commands};
use nexa_discovery::{NodeIdentity, Settings};
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::info;

static TRACING: OnceCell<()> = OnceCell::new();

fn setup_logging() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn handler(yaml: &str) -> CliHandler {
    CliHandler::new(Settings::from_yaml_str(yaml).unwrap())
}

fn run_json(handler: &CliHandler, command: Commands) -> Value {
    let output = handler.run(&command).unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn test_roles_command() {
    setup_logging();
    let handler = handler("node:\n  master: false\n  data: false\n");
    let roles = run_json(&handler, Commands::Roles);
    assert_eq!(roles["mode"], "network");
    assert_eq!(roles["master"], false);
    assert_eq!(roles["data"], false);
    assert_eq!(roles["client"], false);
    assert_eq!(roles["requires_local_storage"], false);
}

#[test]
fn test_show_command() {
    setup_logging();
    let handler = handler("node:\n  id: n-show\n  name: shown\n  client: true\ntransport:\n  port: 9400\n");
    let report = run_json(&handler, Commands::Show);
    let node = &report["n-show"];
    assert_eq!(node["name"], "shown");
    assert_eq!(node["status"], "UNKNOWN");
    assert_eq!(node["transport_address"], "inet[127.0.0.1:9400]");
    assert_eq!(node["attributes"]["client"], "true");
}

#[test]
fn test_encode_then_decode_command() {
    setup_logging();
    let handler = handler("node:\n  id: n-wire\n  rack: r2\n");
    let hex = handler.run(&Commands::Encode).unwrap();
    info!(%hex, "encoded local node");

    let bytes = hex::decode(&hex).unwrap();
    let node: NodeIdentity = nexa_discovery::wire::decode(&bytes).unwrap();
    assert_eq!(node.id(), "n-wire");

    let decoded = run_json(&handler, Commands::Decode { hex });
    assert_eq!(decoded["node"]["n-wire"]["attributes"]["rack"], "r2");
    assert_eq!(decoded["node"]["n-wire"]["status"], "UNKNOWN");
    assert_eq!(decoded["version"], "2.4.0");
    assert_eq!(decoded["compatible"], true);
}

#[test]
fn test_decode_truncated_input_fails() {
    setup_logging();
    let handler = handler("node:\n  id: n-cut\n");
    let hex = handler.run(&Commands::Encode).unwrap();
    let truncated = hex[..hex.len() - 4].to_string();
    assert!(handler.run(&Commands::Decode { hex: truncated }).is_err());
}

#[test]
fn test_version_command() {
    let versions = run_json(&handler("{}"), Commands::Version);
    assert_eq!(versions["current"], "2.4.0");
    assert_eq!(versions["minimum_compatible"], "2.0.0");
}

#[test]
fn test_invalid_mode_aborts_every_node_command() {
    setup_logging();
    let handler = handler("node:\n  mode: bogus\n");
    for command in [Commands::Roles, Commands::Show, Commands::Encode] {
        let err = handler.run(&command).unwrap_err();
        assert!(err.is_config(), "{:?}", command);
    }
}
