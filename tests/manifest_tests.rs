use pathwright::manifest::{load_registry, Manifest};
use pathwright::{Registry, RouteError};

mod common;
use common::fixtures::{ZOO_JSON, ZOO_TOML, ZOO_YAML};
use common::temp_files;

fn assert_zoo(registry: &Registry<String>) {
    assert_eq!(
        registry.path_patterns(),
        vec![
            "/",
            "/zoo/animals",
            "/zoo/animals/{id:int}",
            "/zoo/animals/{name}",
            "/zoo/keepers/{keeper_id:int}",
            "/zoo/keepers/{keeper_id:int}/shifts/{day}",
        ]
    );

    let m = registry.match_route("GET", "/zoo/keepers/7/shifts/monday");
    assert_eq!(m.handler().map(String::as_str), Some("keeper_shift"));
    assert_eq!(m.path_params.get_int("keeper_id"), Some(7));
    assert_eq!(m.path_params.get_str("day"), Some("monday"));

    let m = registry.match_route("PATCH", "/zoo/keepers/7");
    assert_eq!(m.handler().map(String::as_str), Some("keeper"));
    assert_eq!(m.method_allowed, Some(true));

    let m = registry.match_route("POST", "/zoo/animals/1");
    assert_eq!(m.handler().map(String::as_str), Some("animal"));
    assert_eq!(m.method_allowed, Some(false));
}

#[test]
fn test_load_toml_manifest() {
    let file = temp_files::create_temp_toml(ZOO_TOML);
    assert_zoo(&load_registry(file.path()).unwrap());
}

#[test]
fn test_load_yaml_manifest() {
    let file = temp_files::create_temp_yaml(ZOO_YAML);
    assert_zoo(&load_registry(file.path()).unwrap());
}

#[test]
fn test_load_json_manifest() {
    let file = temp_files::create_temp_json(ZOO_JSON);
    assert_zoo(&load_registry(file.path()).unwrap());
}

#[test]
fn test_formats_agree() {
    let toml = Manifest::load(temp_files::create_temp_toml(ZOO_TOML).path()).unwrap();
    let yaml = Manifest::load(temp_files::create_temp_yaml(ZOO_YAML).path()).unwrap();
    let json = Manifest::load(temp_files::create_temp_json(ZOO_JSON).path()).unwrap();
    assert_eq!(toml, yaml);
    assert_eq!(yaml, json);
}

#[test]
fn test_missing_file_names_the_path() {
    let err = load_registry("/definitely/not/here/routes.toml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here/routes.toml"));
}

#[test]
fn test_invalid_route_names_the_file_and_template() {
    let file = temp_files::create_temp_toml(
        "[[routes]]\npath = \"/a/{rest:path}/b\"\nhandler = \"x\"\n",
    );
    let err = load_registry(file.path()).unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("routes.toml"), "{text}");
    assert!(text.contains("/a/{rest:path}/b"), "{text}");
    assert!(err
        .downcast_ref::<RouteError>()
        .is_some_and(RouteError::is_syntax));
}

#[test]
fn test_mount_conflict_aborts_whole_manifest() {
    let file = temp_files::create_temp_yaml(
        r#"
routes:
  - path: /ok
    handler: ok
mounts:
  - prefix: /{id}
    routes:
      - path: /fine
        handler: fine
      - path: /{id}
        handler: clash
"#,
    );
    assert!(load_registry(file.path()).is_err());
}

#[test]
fn test_empty_manifest_is_empty_registry() {
    let file = temp_files::create_temp_json("{}");
    let registry = load_registry(file.path()).unwrap();
    assert!(registry.is_empty());
}
