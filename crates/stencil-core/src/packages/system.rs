//! Package managers run as subprocesses

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use stencil_context::{JsPackageManager, ProjectContext, PythonInstaller};
use stencil_fs::NormalizedPath;
use stencil_schema::Ecosystem;
use tokio::process::Command;

use super::{PackageError, PackageManager};

/// Runs the project's own package managers in the project root.
///
/// Every call is bounded by `timeout`; the child is killed when it runs
/// over.
#[derive(Debug, Clone)]
pub struct SystemPackageManager {
    root: NormalizedPath,
    js: Option<JsPackageManager>,
    python: Option<PythonInstaller>,
    timeout: Duration,
}

impl SystemPackageManager {
    /// Pick tools from what detection found. JavaScript falls back to npm
    /// and Python to pip when no lockfile said otherwise.
    pub fn for_project(ctx: &ProjectContext, timeout: Duration) -> Self {
        Self {
            root: ctx.root().clone(),
            js: ctx.js_package_manager(),
            python: ctx.python_installer(),
            timeout,
        }
    }

    /// Program and arguments for one call, without the package names.
    fn command_line(&self, ecosystem: Ecosystem, install: bool, dev: bool) -> (String, Vec<String>) {
        let (program, args): (&str, Vec<&str>) = match ecosystem {
            Ecosystem::Javascript => {
                let pm = self.js.unwrap_or(JsPackageManager::Npm);
                let args = match (pm, install) {
                    (JsPackageManager::Npm, true) if dev => vec!["install", "--save-dev"],
                    (JsPackageManager::Npm, true) => vec!["install"],
                    (JsPackageManager::Npm, false) => vec!["uninstall"],
                    (JsPackageManager::Bun, true) if dev => vec!["add", "-d"],
                    (_, true) if dev => vec!["add", "-D"],
                    (_, true) => vec!["add"],
                    (_, false) => vec!["remove"],
                };
                (pm.program(), args)
            }
            Ecosystem::Python => match self.python.unwrap_or(PythonInstaller::Pip) {
                PythonInstaller::Uv => {
                    let verb = if install { "add" } else { "remove" };
                    let args = if dev { vec![verb, "--dev"] } else { vec![verb] };
                    ("uv", args)
                }
                PythonInstaller::Pip if install => ("python", vec!["-m", "pip", "install"]),
                PythonInstaller::Pip => ("python", vec!["-m", "pip", "uninstall", "-y"]),
            },
            Ecosystem::Go => ("go", vec!["get"]),
        };
        (
            program.to_string(),
            args.into_iter().map(str::to_string).collect(),
        )
    }

    fn package_args(ecosystem: Ecosystem, names: &[String], install: bool) -> Vec<String> {
        match ecosystem {
            // go has no remove verb; pinning to `none` drops the requirement
            Ecosystem::Go if !install => names.iter().map(|n| format!("{n}@none")).collect(),
            _ => names.to_vec(),
        }
    }

    fn invoke(&self, ecosystem: Ecosystem, names: &[String], install: bool, dev: bool) -> Result<(), PackageError> {
        if names.is_empty() {
            return Ok(());
        }
        let (program, mut args) = self.command_line(ecosystem, install, dev);
        args.extend(Self::package_args(ecosystem, names, install));
        let shown = format!("{} {}", program, args.join(" "));

        tracing::info!(command = %shown, "running package manager");
        self.run(&program, &args, &shown)
    }

    fn run(&self, program: &str, args: &[String], shown: &str) -> Result<(), PackageError> {
        let failed = |message: String| PackageError::CommandFailed {
            command: shown.to_string(),
            message,
        };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| failed(e.to_string()))?;

        runtime.block_on(async {
            let child = Command::new(program)
                .args(args)
                .current_dir(self.root.to_native())
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => PackageError::CommandNotFound {
                        program: program.to_string(),
                    },
                    _ => failed(e.to_string()),
                })?;

            let output = tokio::time::timeout(self.timeout, child.wait_with_output())
                .await
                .map_err(|_| PackageError::Timeout {
                    command: shown.to_string(),
                    seconds: self.timeout.as_secs(),
                })?
                .map_err(|e| failed(e.to_string()))?;

            if output.status.success() {
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = stderr
                    .lines()
                    .rev()
                    .find(|l| !l.trim().is_empty())
                    .map(|l| l.trim().to_string())
                    .unwrap_or_else(|| format!("exited with {}", output.status));
                Err(failed(message))
            }
        })
    }
}

impl PackageManager for SystemPackageManager {
    fn install(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError> {
        self.invoke(ecosystem, names, true, dev)
    }

    fn uninstall(&self, ecosystem: Ecosystem, names: &[String], dev: bool) -> Result<(), PackageError> {
        self.invoke(ecosystem, names, false, dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn manager(js: Option<JsPackageManager>, python: Option<PythonInstaller>) -> SystemPackageManager {
        let ctx = ProjectContext::builder("/p")
            .js_package_manager(js)
            .python_installer(python)
            .build();
        SystemPackageManager::for_project(&ctx, Duration::from_secs(5))
    }

    #[rstest]
    #[case(None, true, true, "npm install --save-dev")]
    #[case(Some(JsPackageManager::Npm), false, true, "npm uninstall")]
    #[case(Some(JsPackageManager::Pnpm), true, true, "pnpm add -D")]
    #[case(Some(JsPackageManager::Yarn), true, false, "yarn add")]
    #[case(Some(JsPackageManager::Yarn), false, false, "yarn remove")]
    #[case(Some(JsPackageManager::Bun), true, true, "bun add -d")]
    fn javascript_command_lines(
        #[case] pm: Option<JsPackageManager>,
        #[case] install: bool,
        #[case] dev: bool,
        #[case] expected: &str,
    ) {
        let (program, args) = manager(pm, None).command_line(Ecosystem::Javascript, install, dev);
        assert_eq!(format!("{} {}", program, args.join(" ")), expected);
    }

    #[rstest]
    #[case(Some(PythonInstaller::Uv), true, true, "uv add --dev")]
    #[case(Some(PythonInstaller::Uv), false, true, "uv remove --dev")]
    #[case(None, true, true, "python -m pip install")]
    #[case(Some(PythonInstaller::Pip), false, false, "python -m pip uninstall -y")]
    fn python_command_lines(
        #[case] installer: Option<PythonInstaller>,
        #[case] install: bool,
        #[case] dev: bool,
        #[case] expected: &str,
    ) {
        let (program, args) = manager(None, installer).command_line(Ecosystem::Python, install, dev);
        assert_eq!(format!("{} {}", program, args.join(" ")), expected);
    }

    #[test]
    fn go_uninstall_pins_to_none() {
        let names = vec!["golang.org/x/tools".to_string()];
        assert_eq!(
            SystemPackageManager::package_args(Ecosystem::Go, &names, false),
            vec!["golang.org/x/tools@none".to_string()]
        );
    }

    #[test]
    fn missing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::builder(dir.path()).build();
        let pm = SystemPackageManager::for_project(&ctx, Duration::from_secs(5));
        let err = pm
            .run("stencil-no-such-program", &[], "stencil-no-such-program")
            .unwrap_err();
        assert!(matches!(err, PackageError::CommandNotFound { .. }));
    }

    #[test]
    fn trait_calls_run_in_the_project_root() {
        let ctx = ProjectContext::builder("/stencil-missing-project-root")
            .js_package_manager(Some(JsPackageManager::Pnpm))
            .build();
        let pm = SystemPackageManager::for_project(&ctx, Duration::from_secs(5));

        assert!(pm.install(Ecosystem::Javascript, &[], true).is_ok());
        // the root does not exist, so the spawn itself fails
        let err = pm
            .install(Ecosystem::Javascript, &["eslint".to_string()], true)
            .unwrap_err();
        assert!(matches!(
            err,
            PackageError::CommandNotFound { .. } | PackageError::CommandFailed { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::builder(dir.path()).build();
        let pm = SystemPackageManager::for_project(&ctx, Duration::from_millis(100));
        let err = pm
            .run("sleep", &["5".to_string()], "sleep 5")
            .unwrap_err();
        assert!(matches!(err, PackageError::Timeout { .. }));
    }
}
