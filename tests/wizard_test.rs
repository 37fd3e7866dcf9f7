use dinsum::error::{Error, Result};
use dinsum::loader::{LocalLoader, Template};
use dinsum::prompt::LinePrompter;
use dinsum::wizard::{self, Output};
use serde_yaml::Value;
use std::fs;
use tempfile::TempDir;

fn template(compose: &str, env: Option<&str>, schema: Option<&str>) -> (TempDir, Template) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("app");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("compose.yml"), compose).unwrap();
    if let Some(env) = env {
        fs::write(root.join(".env"), env).unwrap();
    }
    if let Some(schema) = schema {
        fs::write(root.join("customize.json"), schema).unwrap();
    }
    let template = LocalLoader::new(dir.path()).load("app").unwrap();
    (dir, template)
}

fn run_with(template: &Template, input: &str) -> (Result<Output>, String) {
    let mut transcript = Vec::new();
    let result = {
        let prompter = LinePrompter::new(input.as_bytes(), &mut transcript);
        wizard::run(template, &prompter, false)
    };
    (result, String::from_utf8(transcript).unwrap())
}

fn parse(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

const WEB: &str = r#"# web server
services:
  web:
    image: nginx:latest   # pinned later
    container_name: web
    ports:
      - "8080:80"
      - 443
    volumes:
      - ./nginx.conf:/etc/nginx/nginx.conf:ro
      - html:/usr/share/nginx/html
      - cache
"#;

#[test]
fn test_declining_customization_copies_byte_identical() {
    let env = "# comment\nFOO=bar\n\nBAZ=qux\n";
    let (_dir, template) = template(WEB, Some(env), None);

    let (output, transcript) = run_with(&template, "n\n");
    let output = output.unwrap();

    assert!(!output.customized);
    assert_eq!(output.compose, WEB);
    assert_eq!(output.env.as_deref(), Some(env));
    assert!(transcript.contains("Customize the template? (y/N): "));
}

#[test]
fn test_skip_customize_asks_nothing() {
    let (_dir, template) = template(WEB, None, None);

    let mut transcript = Vec::new();
    let output = {
        let prompter = LinePrompter::new("".as_bytes(), &mut transcript);
        wizard::run(&template, &prompter, true).unwrap()
    };

    assert_eq!(output.compose, WEB);
    assert_eq!(output.env, None);
}

#[test_log::test]
fn test_fixed_sequence_externalizes_values() {
    let (_dir, template) = template(WEB, None, None);

    // customize, keep name, publish ports (keep 8080, 443 -> 8443), keep volumes, no network
    let (output, _) = run_with(&template, "y\n\nports\n\n8443\n\n\nn\n");
    let output = output.unwrap();

    let expected = concat!(
        "services:\n",
        "  web:\n",
        "    image: \"nginx:latest\"\n",
        "    container_name: \"${CONTAINER_NAME}\"\n",
        "    ports:\n",
        "      - \"${PORT_80}:80\"\n",
        "      - \"${PORT_443}:443\"\n",
        "    volumes:\n",
        "      - \"${VOL_ETC_NGINX_NGINX_CONF}:/etc/nginx/nginx.conf:ro\"\n",
        "      - \"${VOL_USR_SHARE_NGINX_HTML}:/usr/share/nginx/html\"\n",
        "      - cache\n",
    );
    assert_eq!(output.compose, expected);
    assert_eq!(
        output.env.as_deref(),
        Some(concat!(
            "# Generated by Dinsum\n",
            "CONTAINER_NAME=web\n",
            "PORT_80=8080\n",
            "PORT_443=8443\n",
            "VOL_ETC_NGINX_NGINX_CONF=./nginx.conf\n",
            "VOL_USR_SHARE_NGINX_HTML=html\n",
        ))
    );
}

#[test]
fn test_fixed_sequence_expose_and_network() {
    let compose = "services:\n  web:\n    image: nginx\n    ports:\n      - 8080:80\n      - 443\nnetworks:\n  default_net: {}\n";
    let (_dir, template) = template(compose, None, None);

    // customize, name "edge", expose, add internal network "backend"
    let (output, _) = run_with(&template, "y\nedge\n\ny\nbackend\n2\n");
    let output = output.unwrap();
    let document = parse(&output.compose);
    let web = &document["services"]["web"];

    assert!(web.get("ports").is_none());
    assert_eq!(web["expose"], parse("['80', '443']"));
    assert_eq!(web["networks"], parse("[backend]"));
    assert_eq!(document["networks"]["backend"], parse("{internal: true}"));
    assert_eq!(document["networks"]["default_net"], parse("{}"));
    assert!(output.env.unwrap().contains("CONTAINER_NAME=edge\n"));
}

#[test]
fn test_fixed_sequence_merges_template_env() {
    let compose = "services:\n  db:\n    image: postgres\n";
    let (_dir, template) = template(compose, Some("# database\nPOSTGRES_DB=app\n"), None);

    let (output, _) = run_with(&template, "y\n\nn\n");
    let output = output.unwrap();

    assert_eq!(
        output.env.as_deref(),
        Some("# database\nPOSTGRES_DB=app\nCONTAINER_NAME=db-container\n")
    );
    assert_eq!(parse(&output.compose)["services"]["db"]["container_name"], parse("'${CONTAINER_NAME}'"));
}

#[test]
fn test_fixed_sequence_needs_a_service() {
    let (_dir, template) = template("volumes:\n  data: {}\n", None, None);

    let (output, _) = run_with(&template, "y\n");
    assert!(matches!(output, Err(Error::InvalidDocument(_))));
}

const SCHEMA: &str = r#"{
  "fields": [
    {"key": "services.app.container_name", "type": "text", "label": "Container name", "default": "app"},
    {"key": "services.app.restart", "type": "select", "label": "Restart policy", "options": ["a", "b"], "default": "a"},
    {"key": "services.app.dns", "type": "list", "label": "DNS servers", "default": ["1.1.1.1"]},
    {"key": "services.app.ports", "type": "ports", "label": "Ports", "description": "How the app is reached"},
    {"key": "services.app.healthcheck", "type": "duration", "label": "Health check"},
    {"key": "networks", "type": "networks", "label": "Networks", "default": {"proxy": {"external": true}}}
  ]
}"#;

const APP: &str = "services:\n  app:\n    image: example/app\n    ports:\n      - \"3000:3000\"\n";

#[test_log::test]
fn test_schema_defaults_and_invalid_select() {
    let env = "# comment\nFOO=bar\n\nBAZ=qux\n";
    let (_dir, template) = template(APP, Some(env), Some(SCHEMA));

    // customize, text default, invalid select, list default, expose, networks default, two env keys
    let (output, transcript) = run_with(&template, "y\n\nz\n\n\n\n\n\n");
    let output = output.unwrap();
    let app = &parse(&output.compose)["services"]["app"];

    assert_eq!(app["container_name"], parse("app"));
    assert_eq!(app["restart"], parse("a"));
    assert_eq!(app["dns"], parse("['1.1.1.1']"));
    assert_eq!(app["expose"], parse("['3000']"));
    assert!(app.get("ports").is_none());
    assert!(app.get("healthcheck").is_none());
    assert_eq!(parse(&output.compose)["networks"], parse("proxy: {external: true}"));

    assert!(transcript.contains("warning: 'z' is not one of a, b; using 'a'"));
    assert!(transcript.contains("'services.app.healthcheck' has an unknown field type"));
    assert!(transcript.contains("How the app is reached"));
    assert_eq!(output.env.as_deref(), Some(env));
}

#[test]
fn test_schema_answers_are_applied() {
    let (_dir, template) = template(APP, Some("# comment\nFOO=bar\n\nBAZ=qux\n"), Some(SCHEMA));

    let input = concat!(
        "y\n",            // customize
        "api\n",          // container name
        "b\n",            // restart
        " , \n",          // dns: nothing left, key removed
        "ports\n",        // publish
        "8000\n",         // host for 3000
        "front, back\n",  // top-level networks
        "y\n",            // front external
        "n\n", "n\n",     // back: plain
        "changed\n",      // FOO
        "\n",             // BAZ
    );
    let (output, _) = run_with(&template, input);
    let output = output.unwrap();
    let document = parse(&output.compose);
    let app = &document["services"]["app"];

    assert_eq!(app["container_name"], parse("api"));
    assert_eq!(app["restart"], parse("b"));
    assert!(app.get("dns").is_none());
    assert_eq!(app["ports"], parse("['8000:3000']"));
    assert!(app.get("expose").is_none());
    assert_eq!(document["networks"], parse("{front: {external: true}, back: {}}"));
    assert_eq!(output.env.as_deref(), Some("# comment\nFOO=changed\n\nBAZ=qux\n"));
}

#[test]
fn test_schema_without_env_produces_no_env() {
    let schema = r#"{"fields": [{"key": "services.app.image", "type": "text", "default": "example/app:2"}]}"#;
    let (_dir, template) = template(APP, None, Some(schema));

    let (output, _) = run_with(&template, "y\n\n");
    let output = output.unwrap();

    assert!(output.customized);
    assert_eq!(output.env, None);
    assert_eq!(parse(&output.compose)["services"]["app"]["image"], parse("example/app:2"));
}

#[test]
fn test_schema_networks_keep_declared_ones() {
    let compose = concat!(
        "services:\n",
        "  app:\n",
        "    image: example/app\n",
        "    networks: [backend]\n",
        "networks:\n",
        "  backend: {}\n",
    );
    let schema = r#"{"fields": [{"key": "networks", "type": "networks", "label": "Networks"}]}"#;
    let (_dir, template) = template(compose, None, Some(schema));

    let (output, _) = run_with(&template, "y\nproxy\ny\n");
    let document = parse(&output.unwrap().compose);

    assert_eq!(document["networks"], parse("{backend: {}, proxy: {external: true}}"));
    assert_eq!(document["services"]["app"]["networks"], parse("[backend]"));
}

#[test]
fn test_fixed_sequence_keeps_long_syntax_ports() {
    let compose = concat!(
        "services:\n",
        "  web:\n",
        "    image: nginx\n",
        "    ports:\n",
        "      - 8080:80\n",
        "      - target: 443\n",
        "        published: 8443\n",
    );
    let (_dir, template) = template(compose, None, None);

    // customize, keep name, publish and keep 8080, no network
    let (output, _) = run_with(&template, "y\n\nports\n\nn\n");
    let output = output.unwrap();

    assert_eq!(
        parse(&output.compose)["services"]["web"]["ports"],
        parse("['${PORT_80}:80', {target: 443, published: 8443}]")
    );
    assert!(output.env.unwrap().contains("PORT_80=8080\n"));
}

#[test]
fn test_tagged_sections_survive_customization() {
    let compose = concat!(
        "services:\n",
        "  web:\n",
        "    image: nginx\n",
        "    ports: !override\n",
        "      - 8080:80\n",
        "    restart: always\n",
    );
    let (_dir, template) = template(compose, None, None);

    // customize, keep name, expose, no network
    let (output, _) = run_with(&template, "y\n\n\nn\n");
    let web = &parse(&output.unwrap().compose)["services"]["web"];

    assert_eq!(web["expose"], parse("['80']"));
    assert_eq!(web["restart"], parse("always"));
}

#[test]
fn test_closed_input_fails_the_run() {
    let (_dir, template) = template(APP, None, Some(SCHEMA));

    let (output, _) = run_with(&template, "y\n");
    assert!(matches!(output, Err(Error::PromptError(_))));
}
