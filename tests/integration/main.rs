//! Integration tests for tsbundle

mod toolchain;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the host's config file and environment
    fn tsbundle(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("tsbundle");
        cmd.env_remove("PORT")
            .env_remove("RUST_LOG")
            .env("TSBUNDLE_CONFIG", config_dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        tsbundle(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("On-demand TypeScript bundling proxy"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        tsbundle(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tsbundle"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        tsbundle(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        tsbundle(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[server]"))
            .stdout(predicate::str::contains("port = 8000"))
            .stdout(predicate::str::contains("target = \"es2015\""));
    }

    #[test]
    fn config_show_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[server]\nport = 9123\n").unwrap();

        tsbundle(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 9123"));
    }

    #[test]
    fn invalid_config_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[server]\nport = \"eighty\"\n").unwrap();

        tsbundle(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn serve_fails_when_port_is_taken() {
        let dir = TempDir::new().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port().to_string();

        tsbundle(&dir)
            .args(["serve", "--host", "127.0.0.1", "--port", &port, "--cache-dir"])
            .arg(dir.path().join("cache"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to bind"));
    }
}
