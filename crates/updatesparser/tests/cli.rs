use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::process::Command;

const UPDATEINFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<updates>
  <update from="maint-coord@suse.de" status="stable" type="security" version="1">
    <id>SUSE-SLE-Micro-5.5-2023-4501</id>
    <title>Security update for openssl-3</title>
    <severity>important</severity>
    <release>SUSE Updates SLE-Micro 5.5 x86_64</release>
    <issued date="1700000000"/>
    <references>
      <reference href="https://www.suse.com/security/cve/CVE-2023-5678/" id="CVE-2023-5678" title="CVE-2023-5678" type="cve"/>
    </references>
    <description>This update for openssl-3 fixes CVE-2023-5678.</description>
    <pkglist>
      <collection>
        <package name="libopenssl3" version="3.0.8" release="150500.5.17.1" arch="x86_64">
          <filename>libopenssl3-3.0.8-150500.5.17.1.x86_64.rpm</filename>
        </package>
      </collection>
    </pkglist>
  </update>
  <update from="maint-coord@suse.de" status="stable" type="recommended" version="1">
    <id>SUSE-SLE-Micro-5.5-2023-4502</id>
    <title>Recommended update for podman</title>
    <severity>moderate</severity>
    <issued date="1700000100"/>
    <description>This update for podman fixes restarts.</description>
    <pkglist>
      <collection>
        <package name="podman" version="4.7.2" release="150500.3.3.1" arch="x86_64"/>
      </collection>
    </pkglist>
  </update>
</updates>
"#;

fn fixture() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.child("updateinfo.xml");
    input.write_str(UPDATEINFO).unwrap();
    let path = input.path().to_path_buf();
    (dir, path)
}

fn updatesparser() -> Command {
    let mut cmd = Command::cargo_bin("updatesparser").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_default_changelog() {
    let (_dir, input) = fixture();
    updatesparser()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("CHANGE LOG"))
        .stdout(predicate::str::contains("ID: SUSE-SLE-Micro-5.5-2023-4501"))
        .stdout(predicate::str::contains("  * cve: [CVE-2023-5678] CVE-2023-5678"))
        .stdout(predicate::str::contains("Recommended update for podman"));
}

#[test]
fn test_security_only_json() {
    let (_dir, input) = fixture();
    let output = updatesparser()
        .arg(&input)
        .arg("--security")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let updates = value.as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["id"], "SUSE-SLE-Micro-5.5-2023-4501");
    assert_eq!(updates[0]["date"], "1700000000");
    assert!(updates[0].get("release").is_none());
}

#[test]
fn test_after_date_selects_later_updates() {
    let (_dir, input) = fixture();
    let output = updatesparser()
        .arg(&input)
        .args(["--afterDate", "1700000000", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["id"], "SUSE-SLE-Micro-5.5-2023-4502");
}

#[test]
fn test_date_format() {
    let (_dir, input) = fixture();
    updatesparser()
        .arg(&input)
        .args(["-f", "%Y-%m-%d", "-b", "2023-11-14", "-j"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]"));
}

#[test]
fn test_packages_and_output_file() {
    let (dir, input) = fixture();
    let packages = dir.child("micro.packages");
    packages
        .write_str("podman|4.7.2|150500.3.3.1|x86_64|\n")
        .unwrap();
    let out = dir.child("changelog.txt");

    updatesparser()
        .arg(&input)
        .arg("--packages")
        .arg(packages.path())
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    out.assert(predicate::str::contains("Recommended update for podman"));
    out.assert(predicate::str::contains("openssl").not());
}

#[test]
fn test_custom_template() {
    let (dir, input) = fixture();
    let template = dir.child("ids.hbs");
    template
        .write_str(
            r#"{{#*inline "header"}}ids:{{/inline}}
{{#*inline "body"}} {{id}}{{/inline}}
{{#*inline "join"}},{{/inline}}
{{#*inline "footer"}}
{{/inline}}"#,
        )
        .unwrap();

    updatesparser()
        .arg(&input)
        .arg("--template")
        .arg(template.path())
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "ids: SUSE-SLE-Micro-5.5-2023-4501, SUSE-SLE-Micro-5.5-2023-4502\n",
        ));
}

#[test]
fn test_json_and_template_conflict() {
    let (dir, input) = fixture();
    let template = dir.child("ids.hbs");
    template.write_str("unused").unwrap();

    updatesparser()
        .arg(&input)
        .arg("--json")
        .arg("--template")
        .arg(template.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_input_is_usage_error() {
    let dir = TempDir::new().unwrap();
    updatesparser()
        .arg(dir.child("missing.xml").path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("could not find updateinfo file"));
}

#[test]
fn test_malformed_date_filter_fails() {
    let (_dir, input) = fixture();
    updatesparser()
        .arg(&input)
        .args(["--beforeDate", "tomorrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filter options"));
}

#[test]
fn test_malformed_document_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.child("updateinfo.xml");
    input
        .write_str(r#"<updates><update type="security"><issued date="not-a-number"/></update></updates>"#)
        .unwrap();

    updatesparser()
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-a-number"));
}
