//! Library-level passes over the fixture graph.

use std::path::PathBuf;
use std::sync::Arc;

use css_export::config::{OutputOptions, PluginOptions};
use css_export::core::CssExportError;
use css_export::host::{BundleHost, InMemoryBundle};
use css_export::plugin::{CssExport, PassSummary};
use css_export::test_utils::{StubInliner, init_test_logging};

use crate::common::fixture;

/// (file, imports) of the fixture graph, in encounter order.
const GRAPH: &[(&str, &[&str])] = &[
    ("blue.js", &["lib/reset.css", "blue.css"]),
    ("lib/reset.css", &[]),
    ("blue.css", &[]),
    ("red.js", &["lib/reset.css", "red.css"]),
    ("red.css", &[]),
    ("purple.js", &["red.js", "blue.js"]),
];

fn id(file: &str) -> String {
    format!("test/fixtures/{file}")
}

fn output(preserve_modules: bool, root: Option<&str>) -> OutputOptions {
    OutputOptions {
        preserve_modules,
        preserve_modules_root: root.map(PathBuf::from),
        asset_file_names: "assets/[name].[ext]".to_string(),
    }
}

async fn bundle(plugin: &CssExport, output: &OutputOptions) -> Result<(InMemoryBundle, PassSummary), CssExportError> {
    init_test_logging(None);

    let mut host = InMemoryBundle::new(output.asset_file_names.clone());
    let mut pass = plugin.begin_pass();
    for (file, imports) in GRAPH {
        let source = fixture(file);
        let code = pass.transform(&source, &id(file)).unwrap_or(source);
        host.add_module(id(file), imports.iter().map(|i| id(i)), code);
    }
    let summary = pass.generate_bundle(output, &mut host).await?;
    Ok((host, summary))
}

fn assert_assets(host: &InMemoryBundle, expected: &[(&str, &str)]) {
    assert_eq!(host.assets().len(), expected.len());
    for (file_name, fixture_file) in expected {
        let asset = host.asset(file_name).unwrap_or_else(|| panic!("missing asset {file_name}"));
        assert_eq!(asset.source, fixture(fixture_file), "content of {file_name}");
    }
}

#[tokio::test]
async fn test_flat_output_uses_base_names() {
    let plugin = CssExport::new(PluginOptions::new()).unwrap();
    let (host, summary) = bundle(&plugin, &output(false, None)).await.unwrap();

    assert_eq!(summary.emitted, ["reset.css", "blue.css", "red.css"]);
    assert_assets(
        &host,
        &[
            ("assets/reset.css", "lib/reset.css"),
            ("assets/blue.css", "blue.css"),
            ("assets/red.css", "red.css"),
        ],
    );
}

#[tokio::test]
async fn test_style_modules_compile_to_empty_code() {
    let plugin = CssExport::new(PluginOptions::new()).unwrap();
    let (host, _) = bundle(&plugin, &output(false, None)).await.unwrap();

    assert_eq!(host.module(&id("red.css")).unwrap().code, "");
    assert_eq!(host.module(&id("red.js")).unwrap().code, fixture("red.js"));
}

#[tokio::test]
async fn test_preserve_modules_keeps_layout_from_working_directory() {
    let plugin = CssExport::new(PluginOptions::new()).unwrap();
    let (host, _) = bundle(&plugin, &output(true, None)).await.unwrap();

    assert_assets(
        &host,
        &[
            ("assets/test/fixtures/lib/reset.css", "lib/reset.css"),
            ("assets/test/fixtures/blue.css", "blue.css"),
            ("assets/test/fixtures/red.css", "red.css"),
        ],
    );
}

#[tokio::test]
async fn test_preserve_modules_from_root() {
    let plugin = CssExport::new(PluginOptions::new()).unwrap();
    let (host, _) = bundle(&plugin, &output(true, Some("test"))).await.unwrap();

    assert_assets(
        &host,
        &[
            ("assets/fixtures/lib/reset.css", "lib/reset.css"),
            ("assets/fixtures/blue.css", "blue.css"),
            ("assets/fixtures/red.css", "red.css"),
        ],
    );
}

#[tokio::test]
async fn test_entry_metadata() {
    let plugin = CssExport::new(PluginOptions::new().meta_key("styles")).unwrap();
    let (host, summary) = bundle(&plugin, &output(false, None)).await.unwrap();

    let meta = |file: &str| host.meta(&id(file), "styles").map(<[String]>::to_vec);
    assert_eq!(meta("blue.js").unwrap(), ["assets/reset.css", "assets/blue.css"]);
    assert_eq!(meta("red.js").unwrap(), ["assets/reset.css", "assets/red.css"]);
    assert_eq!(meta("purple.js").unwrap(), ["assets/reset.css", "assets/red.css", "assets/blue.css"]);

    // style sheets are leaves and carry no metadata
    assert!(meta("red.css").is_none());
    assert_eq!(summary.annotated, 3);
}

#[tokio::test]
async fn test_entry_metadata_with_preserved_layout() {
    let plugin = CssExport::new(PluginOptions::new().meta_key("styles")).unwrap();
    let (host, _) = bundle(&plugin, &output(true, Some("test"))).await.unwrap();

    assert_eq!(
        host.meta(&id("purple.js"), "styles").unwrap(),
        ["assets/fixtures/lib/reset.css", "assets/fixtures/red.css", "assets/fixtures/blue.css"]
    );
}

#[tokio::test]
async fn test_metadata_only_written_for_modules_reaching_styles() {
    let plugin = CssExport::new(PluginOptions::new().meta_key("styles")).unwrap();
    let (host, _) = bundle(&plugin, &output(false, None)).await.unwrap();

    let annotated: Vec<_> = host
        .modules()
        .iter()
        .filter(|m| m.meta.contains_key("styles"))
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(annotated, [id("blue.js"), id("red.js"), id("purple.js")]);
}

#[tokio::test]
async fn test_inlining_engine_output_is_emitted() {
    let inliner = StubInliner::new().with_file(id("lib/reset.css"), fixture("lib/reset.css"));
    let plugin = CssExport::new(PluginOptions::new())
        .unwrap()
        .with_inliner(Arc::new(inliner));

    let output = output(false, None);
    let mut host = InMemoryBundle::new(output.asset_file_names.clone());
    let mut pass = plugin.begin_pass();
    pass.transform("@import './lib/reset.css';\n.green { color: green }", &id("green.css"));
    pass.generate_bundle(&output, &mut host).await.unwrap();

    let expected = format!("{}\n.green {{ color: green }}", fixture("lib/reset.css"));
    assert_eq!(host.asset("assets/green.css").unwrap().source, expected);
}

#[tokio::test]
async fn test_inlining_failure_is_fatal() {
    let plugin = CssExport::new(PluginOptions::new().meta_key("styles"))
        .unwrap()
        .with_inliner(Arc::new(StubInliner::new()));

    let output = output(true, Some("test"));
    let mut host = InMemoryBundle::new(output.asset_file_names.clone());
    let mut pass = plugin.begin_pass();
    pass.transform("@import './missing.css';", &id("broken.css"));
    host.add_module(id("main.js"), [id("broken.css")], "");

    let err = pass.generate_bundle(&output, &mut host).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Something went wrong when inlining an @import directive in 'fixtures/broken.css'."
    );
    assert!(host.assets().is_empty());
    assert!(host.meta(&id("main.js"), "styles").is_none());
}

#[tokio::test]
async fn test_second_pass_starts_from_scratch() {
    let plugin = CssExport::new(PluginOptions::new().meta_key("styles")).unwrap();
    let output = output(false, None);

    let (first, _) = bundle(&plugin, &output).await.unwrap();
    let (second, _) = bundle(&plugin, &output).await.unwrap();

    assert_eq!(first.assets(), second.assets());
    assert_eq!(second.assets().len(), 3);
}

#[test]
fn test_invalid_include_pattern_fails_construction() {
    let err = CssExport::new(PluginOptions::new().include(["[unclosed"])).unwrap_err();
    assert!(matches!(err, CssExportError::InvalidPattern { .. }));
}

#[test]
fn test_host_file_names_follow_template() {
    let mut host = InMemoryBundle::new("static/[name]-[hash][extname]");
    host.emit_asset("red.css", fixture("red.css"));

    let file_name = host.file_name_for("red.css").unwrap();
    assert!(file_name.starts_with("static/red-"));
    assert!(file_name.ends_with(".css"));
}
