use std::fs;
use std::path::Path;

use tempfile::TempDir;

use depdocs_cli::{collect_documents, is_doc_file, load_config};

#[test]
fn only_documentation_extensions_are_collected() {
    assert!(is_doc_file(Path::new("README.md")));
    assert!(is_doc_file(Path::new("guide/intro.MDX")));
    assert!(is_doc_file(Path::new("notes.rst")));
    assert!(!is_doc_file(Path::new("index.js")));
    assert!(!is_doc_file(Path::new("LICENSE")));
}

#[test]
fn documents_get_root_relative_paths_in_order() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("docs/api")).unwrap();
    fs::write(tmp.path().join("README.md"), "# Readme\nhello").unwrap();
    fs::write(tmp.path().join("docs/api/routing.md"), "routes").unwrap();
    fs::write(tmp.path().join("docs/guide.txt"), "guide").unwrap();
    fs::write(tmp.path().join("index.js"), "code").unwrap();

    let docs = collect_documents(tmp.path()).unwrap();
    let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md", "docs/api/routing.md", "docs/guide.txt"]);
    assert_eq!(docs[1].filename, "routing.md");
    assert_eq!(docs[1].content, "routes");
}

#[test]
fn missing_docs_dir_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(collect_documents(&tmp.path().join("nope")).is_err());
}

#[test]
fn config_is_read_from_the_given_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[depdocs]\nchunksReturned = 7\nuseFakeEmbeddings = true\n").unwrap();
    let config = load_config(tmp.path()).unwrap();
    assert_eq!(config.chunks_returned, 7);
    assert!(config.use_fake_embeddings);
}
