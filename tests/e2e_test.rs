/// End-to-end tests for the CLI
///
/// Every case here stops before the first cloud call, so no credentials
/// or network access are needed.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("azqr").arg("--help").assert().code(0);
        cargo_bin_cmd!("azqr").args(["scan", "--help"]).assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("azqr").arg("--version").assert().code(0);
    }

    /// Exit code 1: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("azqr")
            .args(["scan", "--invalid-option"])
            .assert()
            .code(1);
    }

    /// Exit code 1: Missing subcommand
    #[test]
    fn test_exit_code_missing_subcommand() {
        cargo_bin_cmd!("azqr").assert().code(1);
    }

    /// Exit code 1: Invalid format value
    #[test]
    fn test_exit_code_invalid_format() {
        cargo_bin_cmd!("azqr")
            .args(["scan", "--format", "json,pdf"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("pdf"));
    }

    /// Exit code 1: Management groups combined with subscriptions
    #[test]
    fn test_exit_code_conflicting_scope() {
        cargo_bin_cmd!("azqr")
            .args([
                "scan",
                "--management-groups",
                "mg-root",
                "--subscriptions",
                "6fd2c3a1-0d4b-4e7f-9a8b-1234567890ab",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--management-groups"));
    }

    /// Exit code 1: Malformed resource-group id
    #[test]
    fn test_exit_code_malformed_resource_group() {
        cargo_bin_cmd!("azqr")
            .args(["scan", "--resource-groups", "rg-app"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid resource group id"));
    }

    /// Exit code 1: the cause is reported on a single stderr line
    #[test]
    fn test_configuration_error_is_one_line() {
        let output = cargo_bin_cmd!("azqr")
            .args(["scan", "--resource-groups", "rg-app"])
            .assert()
            .code(1)
            .get_output()
            .stderr
            .clone();

        let stderr = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 1, "{}", stderr);
        assert!(lines[0].contains("Invalid resource group id: rg-app"));
    }

    /// Exit code 1: Output directory missing
    #[test]
    fn test_exit_code_missing_output_dir() {
        cargo_bin_cmd!("azqr")
            .args(["scan", "--output-dir", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Output directory does not exist"));
    }

    /// Exit code 1: Unknown scanner
    #[test]
    fn test_exit_code_unknown_scanner() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("azqr")
            .args(["scan", "--scanners", "zz"])
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Unknown scanner"));
    }

    /// Exit code 1: Unknown stage override
    #[test]
    fn test_exit_code_unknown_stage() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("azqr")
            .args(["scan", "--stages", "bogus-scan"])
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Unknown stage"));
    }

    /// Exit code 1: graph-scan disabled in a default run
    #[test]
    fn test_exit_code_graph_scan_disabled() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("azqr")
            .args(["scan", "--stages", "-graph-scan"])
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("graph-scan"));
    }

    /// Exit code 1: --plugin-only without any enabled plugin
    #[test]
    fn test_exit_code_plugin_only_without_plugins() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("azqr")
            .args(["scan", "--plugin-only"])
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--plugin-only"));
    }

    /// Exit code 1: Enabled plugin missing from the plugin directory
    #[test]
    fn test_exit_code_unknown_plugin() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("azqr")
            .args(["scan", "--enable-plugins", "contoso"])
            .arg("--plugin-dir")
            .arg(dir.path())
            .arg("--output-dir")
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Unknown plugin: contoso"));
    }
}

mod filter_file_tests {
    use super::*;

    #[test]
    fn test_missing_filter_file() {
        cargo_bin_cmd!("azqr")
            .args(["scan", "--filter-file", "/nonexistent/filters.yaml"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to read filter file"));
    }

    #[test]
    fn test_malformed_filter_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.yaml");
        fs::write(&path, "azqr:\n  include:\n    subscription: []\n").unwrap();

        cargo_bin_cmd!("azqr")
            .args(["scan", "--filter-file"])
            .arg(&path)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to parse filter file"))
            .stderr(predicate::str::contains("💡 Hint:"));
    }

    #[test]
    fn test_filter_file_with_malformed_resource_group() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.yaml");
        fs::write(&path, "azqr:\n  exclude:\n    resourceGroups: [rg-sandbox]\n").unwrap();

        cargo_bin_cmd!("azqr")
            .args(["scan", "--filter-file"])
            .arg(&path)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("rg-sandbox"));
    }
}

mod catalog_command_tests {
    use super::*;

    #[test]
    fn test_types_lists_catalog_and_scanner_types() {
        cargo_bin_cmd!("azqr")
            .arg("types")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("microsoft.storage/storageaccounts"))
            .stdout(predicate::str::contains("microsoft.compute/disks"));
    }

    #[test]
    fn test_recommendations_prints_json_catalog() {
        let output = cargo_bin_cmd!("azqr")
            .arg("recommendations")
            .assert()
            .code(0)
            .get_output()
            .stdout
            .clone();

        let entries: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let entries = entries.as_array().unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().any(|e| e["source"] == "AZQR"));
        assert!(entries.iter().any(|e| e["source"] == "AOR"));
        // disabled and sentinel-marked rules are listed too
        assert!(entries.iter().any(|e| e["underDevelopment"] == true));
    }

    #[test]
    fn test_types_with_catalog_dir_override() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("Web/sites");
        fs::create_dir_all(tree.join("kql")).unwrap();
        fs::write(
            tree.join("recommendations.yaml"),
            r#"
- recommendationId: app-001
  resourceType: Microsoft.Web/sites
  category: Scalability
  impact: Medium
  recommendation: Use at least two instances
  longDescription: Two instances keep the site up during platform updates.
  potentialBenefits: Resilience
  learnMoreLink:
    - url: https://learn.microsoft.com/azure/app-service/
  automationAvailable: true
"#,
        )
        .unwrap();
        fs::write(
            tree.join("kql/app-001.kql"),
            "resources | where type =~ 'microsoft.web/sites' | project id, name",
        )
        .unwrap();

        cargo_bin_cmd!("azqr")
            .arg("types")
            .arg("--catalog-dir")
            .arg(dir.path())
            .assert()
            .code(0)
            .stdout(predicate::str::contains("microsoft.web/sites"))
            // the orphan tree stays embedded
            .stdout(predicate::str::contains("microsoft.compute/disks"));
    }
}
