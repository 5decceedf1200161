mod common;

use common::helpers::{stderr_of, stdout_of, write_file};
use common::{LiblinearCheckout, run_extpack};

/// Build, then drop the artifacts a compile and a test run would leave
fn built_checkout() -> LiblinearCheckout {
    let checkout = LiblinearCheckout::new();
    let output = run_extpack(&checkout.project, &["build", "--platform", "linux"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let project = &checkout.project;
    write_file(&project.join("build/temp.linux-x86_64-cpython-312/linear.o"), "o");
    write_file(
        &project.join("build/lib.linux-x86_64-cpython-312/liblinear/clib.so"),
        "so",
    );
    write_file(&project.join("dist/liblinear_multicore-2.43.0.tar.gz"), "tgz");
    write_file(&project.join("MANIFEST"), "setup.py\n");
    write_file(&project.join("liblinear-multicore.egg-info/PKG-INFO"), "info");
    write_file(
        &project.join("liblinear/clib.cpython-312-x86_64-linux-gnu.so"),
        "so",
    );
    write_file(
        &project.join("liblinear/__pycache__/liblinear.cpython-312.pyc"),
        "pyc",
    );
    write_file(&project.join("tests/__pycache__/test_basic.cpython-312.pyc"), "pyc");
    write_file(&project.join("stray.pyc"), "pyc");
    checkout
}

#[test]
fn clean_removes_every_artifact() {
    let checkout = built_checkout();
    let project = &checkout.project;

    let output = run_extpack(project, &["clean"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("remove "));

    for gone in [
        "build",
        "dist",
        "MANIFEST",
        "cpp-source",
        "liblinear-multicore.egg-info",
        "liblinear/clib.cpython-312-x86_64-linux-gnu.so",
        "liblinear/__pycache__",
        "tests/__pycache__",
        "stray.pyc",
    ] {
        assert!(!project.join(gone).exists(), "{gone} should be removed");
    }
    for kept in ["setup.py", "README", "liblinear/__init__.py", "liblinear/liblinear.py"] {
        assert!(project.join(kept).exists(), "{kept} should be kept");
    }

    // Origin sources are outside the project and untouched
    assert!(checkout.root.join("linear.cpp").exists());
}

#[test]
fn clean_twice_is_a_no_op() {
    let checkout = built_checkout();

    let first = run_extpack(&checkout.project, &["clean", "--all"]);
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));

    let second = run_extpack(&checkout.project, &["clean", "--all"]);
    assert!(second.status.success(), "stderr: {}", stderr_of(&second));
    let stdout = stdout_of(&second);
    assert!(!stdout.contains("remove "));
    assert!(stdout.contains("Nothing to clean"));
}

#[test]
fn clean_on_fresh_checkout_succeeds() {
    let checkout = LiblinearCheckout::new();

    let output = run_extpack(&checkout.project, &["clean"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Nothing to clean"));
}

#[test]
fn dry_run_lists_without_removing() {
    let checkout = built_checkout();

    let output = run_extpack(&checkout.project, &["clean", "--dry-run"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Would remove:"));
    assert!(stdout.contains("cpp-source"));
    assert!(checkout.project.join("cpp-source/linear.cpp").exists());
    assert!(checkout.project.join("liblinear/__pycache__").exists());
}

#[test]
fn escaping_configured_path_fails_and_is_untouched() {
    let checkout = built_checkout();
    write_file(&checkout.root.join("keep/important.txt"), "keep");
    checkout.write_config("[clean]\nextra_paths = [\"MANIFEST\", \"../keep\"]\n");

    let output = run_extpack(&checkout.project, &["clean"]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("outside the project root"));
    assert!(checkout.root.join("keep/important.txt").exists());
    // The rest of the pass still ran
    assert!(!checkout.project.join("build").exists());
    assert!(!checkout.project.join("MANIFEST").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_cache_is_unlinked_not_followed() {
    let checkout = LiblinearCheckout::new();
    let shared = checkout.root.join("shared-cache");
    write_file(&shared.join("keep.pyc"), "keep");
    std::os::unix::fs::symlink(&shared, checkout.project.join("liblinear/__pycache__")).unwrap();

    let output = run_extpack(&checkout.project, &["clean"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(
        std::fs::symlink_metadata(checkout.project.join("liblinear/__pycache__")).is_err(),
        "link should be removed"
    );
    assert!(shared.join("keep.pyc").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_build_dir_is_unlinked_not_emptied() {
    let checkout = LiblinearCheckout::new();
    let shared = checkout.root.join("shared-build");
    write_file(&shared.join("temp.linux-x86_64-cpython-312/keep.o"), "keep");
    std::os::unix::fs::symlink(&shared, checkout.project.join("build")).unwrap();

    let output = run_extpack(&checkout.project, &["clean", "--all"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(
        std::fs::symlink_metadata(checkout.project.join("build")).is_err(),
        "link should be removed"
    );
    assert!(shared.join("temp.linux-x86_64-cpython-312/keep.o").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_package_dir_is_refused() {
    let checkout = LiblinearCheckout::new();
    let vendored = checkout.root.join("vendored-package");
    write_file(&vendored.join("clib.cpython-312-x86_64-linux-gnu.so"), "so");
    std::fs::remove_dir_all(checkout.project.join("liblinear")).unwrap();
    std::os::unix::fs::symlink(&vendored, checkout.project.join("liblinear")).unwrap();
    write_file(&checkout.project.join("MANIFEST"), "setup.py\n");

    let output = run_extpack(&checkout.project, &["clean"]);

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("symlinked directory"));
    assert!(vendored.join("clib.cpython-312-x86_64-linux-gnu.so").exists());
    assert!(checkout.project.join("liblinear").exists());
    // The rest of the pass still ran
    assert!(!checkout.project.join("MANIFEST").exists());
}
