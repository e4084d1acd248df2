//! Integration tests for the `osinfo-db` binary.
//!
//! Each test runs the built binary against temporary directories with the
//! database environment variables cleared, so nothing outside the test's
//! own directories is read or written. No test needs network access.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const DB_VARS: [&str; 5] = [
    "OSINFO_SYSTEM_DIR",
    "OSINFO_LOCAL_DIR",
    "OSINFO_USER_DIR",
    "XDG_CONFIG_HOME",
    "RUST_LOG",
];

/// Build a command with a clean database environment.
fn cli(home: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_osinfo-db"));
    for var in DB_VARS {
        command.env_remove(var);
    }
    command.env("HOME", home);
    command
}

/// Run a command with the given arguments.
fn run_cli(home: &Path, args: &[&str]) -> Output {
    cli(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command")
}

/// Run a command feeding `input` on stdin.
fn run_cli_with_stdin(home: &Path, args: &[&str], input: &[u8]) -> Output {
    let mut child = cli(home)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input)
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for CLI")
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "{} failed:\nstdout: {}\nstderr: {}",
            context, stdout, stderr
        );
    }
}

/// Assert a command exited with status 1.
fn assert_exit_one(output: &Output, context: &str) {
    assert_eq!(
        output.status.code(),
        Some(1),
        "{} should exit 1, stderr: {}",
        context,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a small database tree.
fn sample_db(root: &Path) -> PathBuf {
    let db = root.join("db");
    fs::create_dir_all(db.join("os/fedoraproject.org")).unwrap();
    fs::create_dir_all(db.join("schema")).unwrap();
    fs::write(
        db.join("os/fedoraproject.org/fedora-39.xml"),
        r#"<?xml version="1.0"?><libosinfo version="0.0.1"><os id="http://fedoraproject.org/fedora/39"/></libosinfo>"#,
    )
    .unwrap();
    fs::write(db.join("schema/osinfo.rng"), "<grammar/>").unwrap();
    db
}

/// Map of relative path to file contents (`None` for directories).
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(base).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                walk(base, &path, out);
            } else {
                out.insert(rel, Some(fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

#[test]
fn test_path_dir_is_verbatim() {
    let temp = TempDir::new().unwrap();
    let output = cli(temp.path())
        .env("OSINFO_SYSTEM_DIR", "/somewhere/else")
        .args(["path", "--dir", "some/rel dir", "--root", "/mnt"])
        .output()
        .unwrap();

    assert_success(&output, "path --dir");
    assert_eq!(output.stdout, b"some/rel dir\n");
}

#[test]
fn test_path_root_system() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("sysroot");
    let output = run_cli(temp.path(), &["path", "--root", root.to_str().unwrap(), "--system"]);

    assert_success(&output, "path --root --system");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(root.to_str().unwrap()), "{}", stdout);
    assert!(stdout.ends_with("osinfo\n"), "{}", stdout);
}

#[test]
fn test_path_env_override() {
    let temp = TempDir::new().unwrap();
    let output = cli(temp.path())
        .env("OSINFO_LOCAL_DIR", "/srv/osinfo")
        .args(["path", "--local"])
        .output()
        .unwrap();

    assert_success(&output, "path --local");
    assert_eq!(output.stdout, b"/srv/osinfo\n");
}

#[test]
fn test_path_user_uses_home() {
    let temp = TempDir::new().unwrap();
    let output = run_cli(temp.path(), &["path", "--user"]);

    assert_success(&output, "path --user");
    let expected = format!("{}\n", temp.path().join(".config/osinfo").display());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}

#[test]
fn test_conflicting_flags_exit_one() {
    let temp = TempDir::new().unwrap();
    let output = run_cli(temp.path(), &["path", "--system", "--user"]);
    assert_exit_one(&output, "path --system --user");

    let output = run_cli(temp.path(), &["import", "--latest", "--nightly"]);
    assert_exit_one(&output, "import --latest --nightly");
}

#[test]
fn test_export_plain_file_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain");
    fs::write(&file, "x").unwrap();

    let output = cli(temp.path())
        .current_dir(temp.path())
        .args(["export", "--dir", file.to_str().unwrap()])
        .output()
        .unwrap();

    assert_exit_one(&output, "export of a plain file");
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
    let archives: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tar.xz"))
        .collect();
    assert!(archives.is_empty());
}

#[test]
fn test_export_default_name_and_generated_version() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();

    let output = cli(temp.path())
        .current_dir(&out)
        .args(["export", "--dir", db.to_str().unwrap()])
        .output()
        .unwrap();
    assert_success(&output, "export");

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);

    let now = chrono::Utc::now();
    let accepted: Vec<String> = [-1, 0, 1]
        .iter()
        .map(|days| {
            let day = now + chrono::Duration::days(*days);
            format!("osinfo-db-{}.tar.xz", day.format("%Y%m%d"))
        })
        .collect();
    assert!(accepted.contains(&names[0]), "{}", names[0]);
    assert!(!db.join("VERSION").exists());
}

#[test]
fn test_export_import_roundtrip() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());
    let license = temp.path().join("COPYING");
    fs::write(&license, "license text").unwrap();
    let before = snapshot(&db);

    let archive = temp.path().join("db.tar.xz");
    let output = run_cli(
        temp.path(),
        &[
            "export",
            "--dir",
            db.to_str().unwrap(),
            "--version",
            "20240101",
            "--license",
            license.to_str().unwrap(),
            archive.to_str().unwrap(),
        ],
    );
    assert_success(&output, "export");
    assert!(output.stdout.is_empty());
    assert_eq!(snapshot(&db), before);

    let bytes = fs::read(&archive).unwrap();
    let from_file = temp.path().join("t1");
    let from_dash = temp.path().join("t2");
    let from_stdin = temp.path().join("t3");

    let output = run_cli(
        temp.path(),
        &["import", "--dir", from_file.to_str().unwrap(), archive.to_str().unwrap()],
    );
    assert_success(&output, "import from file");

    let output = run_cli_with_stdin(
        temp.path(),
        &["import", "--dir", from_dash.to_str().unwrap(), "-"],
        &bytes,
    );
    assert_success(&output, "import from -");

    let output = run_cli_with_stdin(
        temp.path(),
        &["import", "--dir", from_stdin.to_str().unwrap()],
        &bytes,
    );
    assert_success(&output, "import from stdin");

    let imported = snapshot(&from_file);
    assert_eq!(snapshot(&from_dash), imported);
    assert_eq!(snapshot(&from_stdin), imported);

    let mut expected = before;
    expected.insert(PathBuf::from("VERSION"), Some(b"20240101".to_vec()));
    expected.insert(PathBuf::from("LICENSE"), Some(b"license text".to_vec()));
    assert_eq!(imported, expected);
}

#[test]
fn test_export_to_stdout() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());

    let output = run_cli(temp.path(), &["export", "--dir", db.to_str().unwrap(), "-"]);
    assert_success(&output, "export -");
    assert!(output.stdout.starts_with(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]));
}

#[test]
fn test_import_overlays_existing_files() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());
    let archive = temp.path().join("db.tar.xz");
    assert_success(
        &run_cli(
            temp.path(),
            &["export", "--dir", db.to_str().unwrap(), "--version", "2", archive.to_str().unwrap()],
        ),
        "export",
    );

    let target = temp.path().join("target");
    fs::create_dir_all(target.join("os")).unwrap();
    fs::write(target.join("os/custom.xml"), "<libosinfo/>").unwrap();
    fs::write(target.join("VERSION"), "1").unwrap();

    let output = run_cli(
        temp.path(),
        &["import", "--dir", target.to_str().unwrap(), archive.to_str().unwrap()],
    );
    assert_success(&output, "import");

    assert_eq!(fs::read_to_string(target.join("VERSION")).unwrap(), "2");
    assert!(target.join("os/custom.xml").is_file());
    assert!(target.join("os/fedoraproject.org/fedora-39.xml").is_file());
}

#[test]
fn test_import_corrupt_archive_leaves_target() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("VERSION"), "1").unwrap();
    let before = snapshot(&target);

    let output = run_cli_with_stdin(
        temp.path(),
        &["import", "--dir", target.to_str().unwrap()],
        b"this is not an archive",
    );
    assert_exit_one(&output, "import of garbage");
    assert_eq!(snapshot(&target), before);
}

#[test]
fn test_import_into_file_fails() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("file");
    fs::write(&target, "x").unwrap();

    let output = run_cli_with_stdin(
        temp.path(),
        &["import", "--dir", target.to_str().unwrap()],
        b"",
    );
    assert_exit_one(&output, "import into a file");
    assert_eq!(fs::read_to_string(&target).unwrap(), "x");
}

#[test]
fn test_validate_outcomes() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());

    let output = run_cli(temp.path(), &["validate", "--dir", db.to_str().unwrap()]);
    assert_success(&output, "validate valid db");

    let bad = db.join("os/broken.xml");
    fs::write(&bad, "<libosinfo><os></libosinfo>").unwrap();
    let output = run_cli(temp.path(), &["validate", "--dir", db.to_str().unwrap()]);
    assert_exit_one(&output, "validate invalid db");
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken.xml"));

    let output = run_cli(
        temp.path(),
        &["validate", "--dir", temp.path().join("missing").to_str().unwrap()],
    );
    assert_exit_one(&output, "validate missing dir");
}

#[test]
fn test_validate_positional_paths() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());
    let good = db.join("os/fedoraproject.org/fedora-39.xml");

    let output = run_cli(temp.path(), &["validate", good.to_str().unwrap()]);
    assert_success(&output, "validate single file");

    let bad = temp.path().join("bad.xml");
    fs::write(&bad, "<wrong/>").unwrap();
    let output = run_cli(
        temp.path(),
        &["validate", good.to_str().unwrap(), bad.to_str().unwrap()],
    );
    assert_exit_one(&output, "validate with one bad file");
}

#[test]
fn test_verbose_lists_entries() {
    let temp = TempDir::new().unwrap();
    let db = sample_db(temp.path());

    let output = run_cli(
        temp.path(),
        &["export", "-v", "--dir", db.to_str().unwrap(), "--version", "1", "-"],
    );
    assert_success(&output, "export -v");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("d os"), "{}", stderr);
    assert!(stderr.contains("r schema/osinfo.rng"), "{}", stderr);
}
