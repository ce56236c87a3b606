//! End-to-end tests against a real Embedded Sass compiler.
//!
//! These run only when `SASS_EMBEDDED_BIN` names a compiler binary,
//! e.g. `SASS_EMBEDDED_BIN="sass --embedded"` for dart-sass; otherwise
//! each test skips. Everything here is also covered against the
//! in-process mock compiler in the crate's unit tests.

use sass_host::{
    sync_function, Compiler, Error, FileOptions, ImportResolver, Importer, ImporterResults,
    OutputStyle, StringOptions, Syntax, Value,
};
use url::Url;

fn real_compiler() -> Option<Compiler> {
    let spec = match std::env::var("SASS_EMBEDDED_BIN") {
        Ok(spec) => spec,
        Err(_) => {
            eprintln!("skipping: SASS_EMBEDDED_BIN is not set");
            return None;
        }
    };
    let mut parts = spec.split_whitespace();
    let mut builder = Compiler::builder(parts.next()?);
    for arg in parts {
        builder = builder.arg(arg);
    }
    Some(builder.build())
}

fn compressed() -> StringOptions {
    StringOptions {
        style: OutputStyle::Compressed,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_hello_world() {
    let Some(compiler) = real_compiler() else {
        return;
    };

    let results = compiler
        .compile_string("a { b: 1 + 2 }", compressed())
        .await
        .unwrap();
    assert_eq!(results.css.trim(), "a{b:3}");
    assert!(results.messages.is_empty());

    assert!(compiler.process_id().is_some());
    let versions = compiler.versions().unwrap();
    assert!(!versions.protocol_version.is_empty());

    compiler.shutdown().await.unwrap();
}

struct RedImporter;

#[async_trait::async_trait]
impl Importer for RedImporter {
    async fn canonicalize(&self, url: &str, _from_import: bool) -> anyhow::Result<Option<Url>> {
        let url = url.strip_prefix("test://").unwrap_or(url);
        Ok(Some(Url::parse(&format!("test://{url}"))?))
    }

    async fn load(&self, _canonical_url: &Url) -> anyhow::Result<ImporterResults> {
        Ok(ImporterResults::new("a{color:red}", Syntax::Css))
    }
}

#[tokio::test]
async fn test_custom_importer() {
    let Some(compiler) = real_compiler() else {
        return;
    };

    let results = compiler
        .compile_string(
            "@import 'secondary'",
            StringOptions {
                syntax: Syntax::Indented,
                style: OutputStyle::Compressed,
                importers: vec![ImportResolver::custom(RedImporter)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(results.css.trim(), "a{color:red}");

    compiler.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_host_function_override() {
    // Skip without a real compiler; also drops the probe handle.
    if real_compiler().is_none() {
        return;
    }

    // The compiler-wide declaration loses to the per-compilation one.
    let spec = std::env::var("SASS_EMBEDDED_BIN").unwrap();
    let mut parts = spec.split_whitespace();
    let mut builder = Compiler::builder(parts.next().unwrap());
    for arg in parts {
        builder = builder.arg(arg);
    }
    let compiler = builder
        .function("ofunc($p)", sync_function(|_| Ok(Value::from("bucket"))))
        .build();

    let mut options = compressed();
    options.functions.insert(
        "ofunc()".to_string(),
        sync_function(|_| Ok(Value::from("goat"))),
    );

    let results = compiler
        .compile_string("a { a: ofunc() }", options)
        .await
        .unwrap();
    assert_eq!(results.css.trim(), "a{a:\"goat\"}");

    compiler.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_compiler_error() {
    let Some(compiler) = real_compiler() else {
        return;
    };

    let error = compiler
        .compile_string(
            "@error \"stop\"",
            StringOptions {
                syntax: Syntax::Indented,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    let Error::Compiler(failure) = error else {
        panic!("expected a compiler failure, got {error:?}");
    };
    assert!(failure.message.contains("stop"));

    compiler.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_compile_file_with_load_path() {
    let Some(compiler) = real_compiler() else {
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("_partial.scss"), "b { c: d }").unwrap();
    std::fs::write(dir.path().join("main.scss"), "@use 'partial';\na { b: c }").unwrap();

    let results = compiler
        .compile_file(
            dir.path().join("main.scss"),
            FileOptions {
                style: OutputStyle::Compressed,
                importers: vec![ImportResolver::LoadPath(dir.path().to_path_buf())],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(results.css.contains("b{c:d}"));
    assert!(!results.loaded_urls.is_empty());

    compiler.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reinit() {
    let Some(compiler) = real_compiler() else {
        return;
    };

    compiler
        .compile_string("a { b: c }", compressed())
        .await
        .unwrap();
    assert_eq!(compiler.startup_count(), 1);

    compiler.reinit().await.unwrap();
    assert_eq!(compiler.startup_count(), 2);

    let results = compiler
        .compile_string("a { b: c }", compressed())
        .await
        .unwrap();
    assert_eq!(results.css.trim(), "a{b:c}");

    compiler.shutdown().await.unwrap();
}
