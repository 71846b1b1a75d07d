#![allow(dead_code)]

pub mod temp_files {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A manifest written into its own temporary directory. The directory is
    /// removed on drop.
    pub struct TempManifest {
        _dir: TempDir,
        path: PathBuf,
    }

    impl TempManifest {
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Overwrite the manifest contents in place.
        pub fn rewrite(&self, content: &str) {
            std::fs::write(&self.path, content).unwrap();
        }
    }

    /// Write `content` to `routes.<ext>` in a fresh temporary directory.
    pub fn create_temp_manifest(content: &str, ext: &str) -> TempManifest {
        let dir = tempfile::Builder::new()
            .prefix("pathwright_test_")
            .tempdir()
            .unwrap();
        let path = dir.path().join(format!("routes.{ext}"));
        std::fs::write(&path, content).unwrap();
        TempManifest { _dir: dir, path }
    }

    pub fn create_temp_toml(content: &str) -> TempManifest {
        create_temp_manifest(content, "toml")
    }

    pub fn create_temp_yaml(content: &str) -> TempManifest {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> TempManifest {
        create_temp_manifest(content, "json")
    }
}

pub mod fixtures {
    /// The same routing table in all three manifest formats.
    pub const ZOO_TOML: &str = r#"
[[routes]]
path = "/"
handler = "root_handler"
methods = ["GET"]

[[routes]]
path = "/zoo/animals"
handler = "animals"
methods = ["GET", "POST"]

[[routes]]
path = "/zoo/animals/{id:int}"
handler = "animal"
methods = ["GET", "PUT", "PATCH", "DELETE"]

[[routes]]
path = "/zoo/animals/{name}"
handler = "animal_by_name"
methods = ["GET"]

[[mounts]]
prefix = "/zoo/keepers/{keeper_id:int}"

[[mounts.routes]]
path = "/"
handler = "keeper"

[[mounts.routes]]
path = "/shifts/{day}"
handler = "keeper_shift"
methods = ["GET"]
"#;

    pub const ZOO_YAML: &str = r#"
routes:
  - path: /
    handler: root_handler
    methods: [GET]
  - path: /zoo/animals
    handler: animals
    methods: [GET, POST]
  - path: /zoo/animals/{id:int}
    handler: animal
    methods: [GET, PUT, PATCH, DELETE]
  - path: /zoo/animals/{name}
    handler: animal_by_name
    methods: [GET]
mounts:
  - prefix: /zoo/keepers/{keeper_id:int}
    routes:
      - path: /
        handler: keeper
      - path: /shifts/{day}
        handler: keeper_shift
        methods: [GET]
"#;

    pub const ZOO_JSON: &str = r#"{
  "routes": [
    {"path": "/", "handler": "root_handler", "methods": ["GET"]},
    {"path": "/zoo/animals", "handler": "animals", "methods": ["GET", "POST"]},
    {"path": "/zoo/animals/{id:int}", "handler": "animal", "methods": ["GET", "PUT", "PATCH", "DELETE"]},
    {"path": "/zoo/animals/{name}", "handler": "animal_by_name", "methods": ["GET"]}
  ],
  "mounts": [
    {
      "prefix": "/zoo/keepers/{keeper_id:int}",
      "routes": [
        {"path": "/", "handler": "keeper"},
        {"path": "/shifts/{day}", "handler": "keeper_shift", "methods": ["GET"]}
      ]
    }
  ]
}"#;
}
