use assert_fs::prelude::*;
use modgraph_fs::{NormalizedPath, io};

fn normalized(temp: &assert_fs::TempDir) -> NormalizedPath {
    NormalizedPath::new(dunce::canonicalize(temp.path()).unwrap())
}

#[test]
fn find_upward_stops_at_nearest_manifest() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("package.json").write_str("{}").unwrap();
    temp.child("node_modules/a/package.json").write_str("{}").unwrap();
    temp.child("node_modules/a/sass/deep").create_dir_all().unwrap();

    let root = normalized(&temp);
    let found = root
        .join("node_modules/a/sass/deep/file.scss")
        .find_upward("package.json");

    assert_eq!(found, Some(root.join("node_modules/a")));
}

#[test]
fn find_upward_ignores_directories_with_the_same_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("package.json").write_str("{}").unwrap();
    temp.child("inner/package.json").create_dir_all().unwrap();

    let root = normalized(&temp);
    assert_eq!(root.join("inner").find_upward("package.json"), Some(root));
}

#[test]
fn read_text_if_exists_reads_content() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("package.json").write_str(r#"{"name":"a"}"#).unwrap();

    let path = normalized(&temp).join("package.json");
    assert_eq!(
        io::read_text_if_exists(&path).unwrap().as_deref(),
        Some(r#"{"name":"a"}"#)
    );
}

#[test]
fn read_text_reports_missing_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let err = io::read_text(&normalized(&temp).join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[cfg(unix)]
#[test]
fn real_path_resolves_symlinked_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("real/file.scss").write_str("").unwrap();
    temp.child("link").symlink_to_dir(temp.child("real").path()).unwrap();

    let root = normalized(&temp);
    let resolved = io::real_path(&root.join("link/file.scss")).unwrap();
    assert_eq!(resolved, root.join("real/file.scss"));
}
