//! Plugin loading tests — plugin directories on disk feeding the compiler.

use std::path::PathBuf;

use boxc::config::BoxcConfig;
use boxc::diagnostics::Warning;
use boxc::dsl::Compiler;
use boxc::registry::{ComponentSource, PluginDir, Registry};
use tempfile::TempDir;

fn repo_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn bundled_registry() -> Registry {
    let mut reg = Registry::new();
    PluginDir::new(repo_path("plugins"))
        .populate(&mut reg)
        .expect("bundled plugins load");
    reg
}

#[test]
fn bundled_plugins_register_components() {
    let reg = bundled_registry();
    for name in ["html", "head", "body", "card", "list", "link", "image", "style"] {
        assert!(reg.contains(name), "missing component {name}");
    }
    assert_eq!(reg.metadata()[0].to_string(), "Default Components v0.1 by boxc");
}

#[test]
fn demo_page_compiles() {
    let reg = bundled_registry();
    let src = std::fs::read_to_string(repo_path("demos/page.box")).unwrap();
    let doc = Compiler::compile(&src, &reg).unwrap();

    assert!(doc.html.starts_with("<html>\n  <head>\n<style>\n"));
    assert!(doc.html.contains("    <title>Welcome</title>\n"));
    assert!(doc.html.contains("    <style>body{font-family:sans-serif}</style>\n"));
    assert!(doc.html.contains(r#"<h1 id="top">Hello, box</h1>"#));
    assert!(doc.html.contains(
        "    <div class=\"card\">\n      <h3>About</h3>\n      <p>Components come from plugins.</p>\n      <a href=\"https://example.org\">Source</a>\n    </div>\n"
    ));
    assert!(doc.html.contains("<li>alpha</li>\n      <li>beta</li>\n      <li>gamma</li>"));
    assert!(!doc.html.contains("onclick"));
    assert!(doc.html.contains(
        "  <script>\nconsole.log('list', [\"alpha\",\"beta\",\"gamma\"]);\n</script>\n</body>\n</html>\n"
    ));

    assert_eq!(
        doc.stylesheets,
        vec![
            ".card{padding:10px;border:1px solid #ddd}",
            ".list li{margin:2px 0}",
        ]
    );
    assert_eq!(
        doc.warnings,
        vec![Warning::DeniedAttribute {
            attribute: "onclick".to_string(),
            component: "link".to_string(),
        }]
    );
}

#[test]
fn later_plugin_files_override_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("default.box"),
        r#"define Button(tag("button"); attr("type"))"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("theme.yaml"),
        r#"
metadata:
  name: Theme
  author: Sam
  version: "2.0"
components:
  button:
    tag: a
    attrs: [href]
    default_css: ".button{}"
"#,
    )
    .unwrap();

    let mut reg = Registry::new();
    reg.populate_from(&PluginDir::new(dir.path())).unwrap();
    let src = r#"Button(text("Go"); href("/go"); type("submit"))"#;
    let doc = Compiler::compile(src, &reg).unwrap();
    assert_eq!(
        doc.html,
        "<style>\n.button{}\n</style>\n<a href=\"/go\">Go</a>\n"
    );
    assert_eq!(reg.metadata()[0].to_string(), "Theme v2.0 by Sam");
}

#[test]
fn broken_plugin_reports_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.box"), r#"define Oops(tag("x")"#).unwrap();
    let mut reg = Registry::new();
    let err = reg.populate_from(&PluginDir::new(dir.path())).unwrap_err();
    assert!(err.to_string().contains("bad.box"));
}

#[test]
fn config_plugin_dirs_feed_the_registry() {
    let plugins = TempDir::new().unwrap();
    std::fs::write(plugins.path().join("a.box"), r#"define Hi(tag("b"))"#).unwrap();

    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!("plugin_dirs:\n  - {}\n", plugins.path().display()),
    )
    .unwrap();

    let config = BoxcConfig::load_from(&config_path).unwrap();
    let mut reg = Registry::new();
    for dir in &config.plugin_dirs {
        reg.populate_from(&PluginDir::new(dir)).unwrap();
    }
    let doc = Compiler::compile(r#"Hi(text("there"))"#, &reg).unwrap();
    assert_eq!(doc.html, "<b>there</b>\n");
}
