use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn phocco() -> Command {
    Command::cargo_bin("phocco").unwrap()
}

/// Write a pygmentize stand-in that wraps its input and marks divider lines
/// as comment spans.
#[cfg(unix)]
fn fake_pygmentize(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-pygmentize");
    fs::write(
        &path,
        "#!/bin/sh\nprintf '<div class=\"highlight\"><pre>'\nsed 's|^\\(.*DIVIDER\\)$|<span class=\"c1\">\\1</span>|'\nprintf '</pre></div>\\n'\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[test]
fn no_files_prints_usage_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    phocco()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("You must supply a filename to continue."));
}

#[test]
fn unsupported_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    phocco()
        .current_dir(dir.path())
        .args(["notes.txt", "--no-fallback"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not determine language for extension '.txt'"));
    assert!(!dir.path().join("docs").exists());
}

#[test]
fn missing_highlighter_without_fallback_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("app.py"), "# doc\nx = 1\n").unwrap();

    phocco()
        .current_dir(dir.path())
        .args(["app.py", "--no-fallback", "--highlighter", "phocco-missing-tool"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not available"));
    assert!(!dir.path().join("docs").join("app.html").exists());
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("phocco.toml"), "unknown-key = 1\n").unwrap();
    fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();

    phocco()
        .current_dir(dir.path())
        .arg("app.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("phocco.toml"));
}

#[cfg(unix)]
#[test]
fn generates_pages_with_local_highlighter() {
    let dir = tempfile::tempdir().unwrap();
    let highlighter = fake_pygmentize(dir.path());
    fs::write(
        dir.path().join("calc.php"),
        "<?php\n/**\n * @param int a left\n * @param int b right\n */\nfunction plus($a, $b) { return $a + $b; }\n",
    )
    .unwrap();
    fs::write(dir.path().join("run.py"), "# Entry point\nmain()\n").unwrap();

    phocco()
        .current_dir(dir.path())
        .args(["calc.php", "run.py", "-o", "site", "--no-fallback", "--highlighter", &highlighter])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"))
        .stdout(predicate::str::contains("calc.html"))
        .stdout(predicate::str::contains("run.html"));

    let calc = fs::read_to_string(dir.path().join("site").join("calc.html")).unwrap();
    assert!(calc.contains("<strong><code> plus</code></strong>"));
    assert!(calc.contains("Takes <code>int a</code> left"));
    assert!(calc.contains("href=\"run.html\""));

    let run = fs::read_to_string(dir.path().join("site").join("run.html")).unwrap();
    assert!(run.contains("<p>Entry point</p>"));
    assert!(run.contains("main()"));
}

#[cfg(unix)]
#[test]
fn one_bad_file_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let highlighter = fake_pygmentize(dir.path());
    fs::write(dir.path().join("good.py"), "# fine\nx = 1\n").unwrap();
    fs::write(dir.path().join("bad.xyz"), "???").unwrap();

    phocco()
        .current_dir(dir.path())
        .args(["bad.xyz", "good.py", "--no-fallback", "--highlighter", &highlighter])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 files could not be documented"));

    assert!(dir.path().join("docs").join("good.html").exists());
    assert!(!dir.path().join("docs").join("bad.html").exists());
}
