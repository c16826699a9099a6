//! `helm` command lines built from resolved release properties
//!
//! Only options that are set produce flags; boolean options produce a flag
//! only when true. Everything else is left to Helm's own defaults.

use serde_json::Value as JsonValue;
use std::ffi::OsStr;
use std::fmt;
use std::process::Command;
use std::time::Duration;

use crate::error::Result;
use crate::options::SECRET_MASK;
use crate::resolved::ResolvedReleaseProperties;

const PASSWORD_FLAG: &str = "--password";

/// Argument vector for one `helm` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmCommand {
    release: String,
    args: Vec<String>,
}

impl HelmCommand {
    /// `helm upgrade --install`
    pub fn upgrade_install(props: &ResolvedReleaseProperties) -> Result<Self> {
        let mut cmd = Self::start(props, ["upgrade", "--install"]);
        cmd.arg(&props.release_name);
        cmd.arg(props.chart_location()?);
        cmd.server_flags(props, true);
        cmd.install_flags(props, true);
        cmd.repository_flags(props);
        if let Some(max) = props.history_max {
            cmd.flag_value("--history-max", max.to_string());
        }
        cmd.value_flags(props);
        Ok(cmd)
    }

    /// `helm install`, used for fresh installs
    pub fn install(props: &ResolvedReleaseProperties) -> Result<Self> {
        let mut cmd = Self::start(props, ["install"]);
        cmd.arg(&props.release_name);
        cmd.arg(props.chart_location()?);
        cmd.server_flags(props, true);
        cmd.install_flags(props, false);
        cmd.repository_flags(props);
        cmd.switch("--replace", Some(props.replace));
        cmd.value_flags(props);
        Ok(cmd)
    }

    /// `helm uninstall`
    pub fn uninstall(props: &ResolvedReleaseProperties) -> Self {
        let mut cmd = Self::start(props, ["uninstall"]);
        cmd.arg(&props.release_name);
        cmd.server_flags(props, true);
        cmd.switch("--keep-history", Some(props.keep_history));
        cmd
    }

    /// `helm test`
    pub fn test(props: &ResolvedReleaseProperties) -> Self {
        let mut cmd = Self::start(props, ["test"]);
        cmd.arg(&props.release_name);
        cmd.server_flags(props, false);
        cmd.switch("--logs", props.test.show_logs);
        if let Some(timeout) = props.test.timeout {
            cmd.flag_value("--timeout", go_duration(timeout));
        }
        cmd
    }

    /// Helm release name this command operates on
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Arguments after the `helm` binary, unmasked
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// A process ready to run with the given `helm` binary
    pub fn to_command(&self, helm: impl AsRef<OsStr>) -> Command {
        let mut command = Command::new(helm);
        command.args(&self.args);
        command
    }

    fn start<const N: usize>(props: &ResolvedReleaseProperties, subcommand: [&str; N]) -> Self {
        Self {
            release: props.release_name.clone(),
            args: subcommand.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn arg(&mut self, value: impl Into<String>) {
        self.args.push(value.into());
    }

    fn switch(&mut self, flag: &str, enabled: Option<bool>) {
        if enabled == Some(true) {
            self.arg(flag);
        }
    }

    fn flag_value(&mut self, flag: &str, value: impl Into<String>) {
        self.arg(flag);
        self.arg(value);
    }

    fn server_flags(&mut self, props: &ResolvedReleaseProperties, operation: bool) {
        let server = &props.server;
        if let Some(path) = &server.kube_config {
            let path = props.resolve_path(path);
            self.flag_value("--kubeconfig", path.display().to_string());
        }
        if let Some(context) = &server.kube_context {
            self.flag_value("--kube-context", context.clone());
        }
        if let Some(namespace) = &server.namespace {
            self.flag_value("--namespace", namespace.clone());
        }
        if !operation {
            return;
        }
        self.switch("--dry-run", server.dry_run);
        self.switch("--no-hooks", server.no_hooks);
        if let Some(timeout) = server.remote_timeout {
            self.flag_value("--timeout", go_duration(timeout));
        }
    }

    fn install_flags(&mut self, props: &ResolvedReleaseProperties, upgrade: bool) {
        let install = &props.install;
        self.switch("--atomic", install.atomic);
        self.switch("--create-namespace", install.create_namespace);
        self.switch("--devel", install.devel);
        self.switch("--verify", install.verify);
        self.switch("--wait", install.wait);
        self.switch("--wait-for-jobs", install.wait_for_jobs);
        if let Some(version) = &install.version {
            self.flag_value("--version", version.clone());
        }
        self.switch("--skip-crds", install.skip_crds);
        if upgrade {
            self.switch("--reset-values", install.reset_values);
            self.switch("--reuse-values", install.reuse_values);
        }
    }

    fn repository_flags(&mut self, props: &ResolvedReleaseProperties) {
        let repo = &props.repository;
        if let Some(url) = &repo.repository {
            self.flag_value("--repo", url.clone());
        }
        if let Some(username) = &repo.username {
            self.flag_value("--username", username.clone());
        }
        if let Some(password) = &repo.password {
            self.flag_value(PASSWORD_FLAG, password.clone());
        }
        for (flag, path) in [
            ("--ca-file", &repo.ca_file),
            ("--cert-file", &repo.cert_file),
            ("--key-file", &repo.key_file),
        ] {
            if let Some(path) = path {
                self.flag_value(flag, props.resolve_path(path).display().to_string());
            }
        }
        self.switch("--insecure-skip-tls-verify", repo.insecure_skip_tls_verify);
    }

    fn value_flags(&mut self, props: &ResolvedReleaseProperties) {
        let values = &props.values;
        for file in &values.value_files {
            self.flag_value("-f", props.resolve_path(file).display().to_string());
        }
        for (key, value) in &values.values {
            match value {
                JsonValue::String(s) => self.flag_value("--set-string", format!("{}={}", key, s)),
                JsonValue::Object(_) | JsonValue::Array(_) => {
                    self.flag_value("--set-json", format!("{}={}", key, value))
                }
                other => self.flag_value("--set", format!("{}={}", key, other)),
            }
        }
        for (key, file) in &values.file_values {
            let path = props.resolve_path(file);
            self.flag_value("--set-file", format!("{}={}", key, path.display()));
        }
    }
}

impl fmt::Display for HelmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "helm")?;
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                write!(f, " {}", SECRET_MASK)?;
            } else {
                write!(f, " {}", shell_quote(arg))?;
            }
            mask_next = arg == PASSWORD_FLAG;
        }
        Ok(())
    }
}

/// Render a duration the way Helm's `--timeout` parses it
pub fn go_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartReference;
    use crate::release::Release;
    use crate::target::ReleaseTarget;
    use serde_json::json;
    use std::path::PathBuf;

    fn resolved(release: Release, target: &str) -> std::sync::Arc<ResolvedReleaseProperties> {
        release
            .resolve_for_target(&ReleaseTarget::new(target))
            .unwrap()
    }

    #[test]
    fn test_upgrade_install_flags() {
        let mut release = Release::new("backend", ChartReference::location("charts/backend"))
            .with_base_dir("/work");
        release.server.kube_context = Some("kind-local".into());
        release.server.namespace = Some("apps".into());
        release.server.remote_timeout = Some(Duration::from_secs(300));
        release.install.atomic = Some(true);
        release.install.wait = Some(false);
        release.install.version = Some("1.2.0".into());
        release.history_max = Some(0);

        let cmd = HelmCommand::upgrade_install(&resolved(release, "local")).unwrap();

        insta::assert_snapshot!(
            cmd.to_string(),
            @"helm upgrade --install backend charts/backend --kube-context kind-local --namespace apps --timeout 300s --atomic --version 1.2.0 --history-max 0"
        );
    }

    #[test]
    fn test_value_flags_follow_json_type() {
        let mut release =
            Release::new("web", ChartReference::location("charts/web")).with_base_dir("/work");
        release.values.add_value_file("values/common.yaml");
        release.values.set("image.tag", "2.0");
        release.values.set("replicas", 3);
        release.values.set("debug", true);
        release.values.set("ports", json!([80, 443]));
        release
            .values
            .file_values
            .insert("banner".into(), PathBuf::from("banner.txt"));

        let cmd = HelmCommand::upgrade_install(&resolved(release, "local")).unwrap();
        let args = cmd.args();

        let values_start = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(
            &args[values_start..],
            &[
                "-f",
                "/work/values/common.yaml",
                "--set-string",
                "image.tag=2.0",
                "--set",
                "replicas=3",
                "--set",
                "debug=true",
                "--set-json",
                "ports=[80,443]",
                "--set-file",
                "banner=/work/banner.txt",
            ]
        );
    }

    #[test]
    fn test_local_chart_and_value_files_share_base_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("charts/app")).unwrap();

        let mut release = Release::new("app", ChartReference::location("./charts/app"))
            .with_base_dir(dir.path());
        release.values.add_value_file("values/dev.yaml");

        let cmd = HelmCommand::upgrade_install(&resolved(release, "local")).unwrap();
        let args = cmd.args();

        assert_eq!(args[3], dir.path().join("charts/app").display().to_string());
        let values = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(
            args[values + 1],
            dir.path().join("values/dev.yaml").display().to_string()
        );
    }

    #[test]
    fn test_install_adds_replace_and_skips_upgrade_flags() {
        let mut release = Release::new("db", ChartReference::location("bitnami/postgresql"));
        release.replace = true;
        release.install.reuse_values = Some(true);
        release.history_max = Some(5);

        let props = resolved(release, "local");
        let install = HelmCommand::install(&props).unwrap();
        assert!(install.args().contains(&"--replace".to_string()));
        assert!(!install.args().contains(&"--reuse-values".to_string()));
        assert!(!install.args().contains(&"--history-max".to_string()));

        let upgrade = HelmCommand::upgrade_install(&props).unwrap();
        assert!(upgrade.args().contains(&"--reuse-values".to_string()));
        assert!(!upgrade.args().contains(&"--replace".to_string()));
    }

    #[test]
    fn test_password_is_masked_in_display_only() {
        let mut release = Release::new("app", ChartReference::location("app"));
        release.repository.repository = Some("https://charts.example.com".into());
        release.repository.username = Some("deploy".into());
        release.repository.password = Some("s3cret".into());

        let cmd = HelmCommand::upgrade_install(&resolved(release, "local")).unwrap();

        assert!(cmd.args().contains(&"s3cret".to_string()));
        let shown = cmd.to_string();
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("--password ******"));
    }

    #[test]
    fn test_uninstall_and_test_commands() {
        let mut release = Release::new("app", ChartReference::location("app"));
        release.release_name = Some("my-app".into());
        release.keep_history = true;
        release.server.namespace = Some("apps".into());
        release.server.dry_run = Some(true);
        release.test.show_logs = Some(true);
        release.test.timeout = Some(Duration::from_millis(1500));

        let props = resolved(release, "local");

        let uninstall = HelmCommand::uninstall(&props);
        assert_eq!(
            uninstall.args(),
            &["uninstall", "my-app", "--namespace", "apps", "--dry-run", "--keep-history"]
        );

        let test = HelmCommand::test(&props);
        assert_eq!(test.release(), "my-app");
        assert_eq!(
            test.args(),
            &["test", "my-app", "--namespace", "apps", "--logs", "--timeout", "1500ms"]
        );
    }

    #[test]
    fn test_unbuilt_chart_fails_command() {
        let release = Release::new(
            "app",
            ChartReference::packaged("app", "build/helm/charts/app.tgz"),
        )
        .with_base_dir("/nonexistent");

        assert!(HelmCommand::upgrade_install(&resolved(release, "local")).is_err());
    }

    #[test]
    fn test_display_quotes_special_characters() {
        let mut release = Release::new("app", ChartReference::location("app"));
        release.values.set("motd", "hello world");

        let cmd = HelmCommand::upgrade_install(&resolved(release, "local")).unwrap();
        assert!(cmd.to_string().ends_with("--set-string 'motd=hello world'"));
    }

    #[test]
    fn test_go_duration() {
        assert_eq!(go_duration(Duration::from_secs(300)), "300s");
        assert_eq!(go_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(go_duration(Duration::ZERO), "0s");
    }
}
