use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "skirmish"])
        .status()
        .expect("failed to invoke cargo check for skirmish CLI binary");

    assert!(status.success(), "cargo check --bin skirmish should succeed");
}

#[test]
fn help_lists_every_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .arg("--help")
        .output()
        .expect("failed to run skirmish --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--seed", "--frame-delay-ms", "--log-file"] {
        assert!(help.contains(flag), "help is missing {flag}");
    }
}
