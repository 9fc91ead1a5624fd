//! Container launcher and its lifecycle.
//!
//! `Created -> RootConfined -> Running -> Exited`; any failed transition
//! moves the container to `Failed`.

use std::path::{Path, PathBuf};
use std::process::Child;

use corral_common::error::{CorralError, Result};
use corral_common::types::{ContainerInstance, ContainerSpec, ContainerState};

use crate::process::ExitReport;

/// A container being launched.
#[derive(Debug)]
pub struct Container {
    spec: ContainerSpec,
    instance: ContainerInstance,
    program: PathBuf,
    state: ContainerState,
    child: Option<Child>,
}

impl Container {
    /// Creates a container in the `Created` state.
    ///
    /// The entrypoint is resolved on the launcher's executable search path
    /// here, before anything touches the filesystem.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Config` for an empty entrypoint and
    /// `CorralError::ExecutableNotFound` if it cannot be resolved.
    pub fn create(spec: ContainerSpec, instance: ContainerInstance) -> Result<Self> {
        spec.validate()?;
        let program = resolve_executable(spec.program())?;
        tracing::debug!(id = %instance.id(), program = %program.display(), "entrypoint resolved");
        Ok(Self {
            spec,
            instance,
            program,
            state: ContainerState::Created,
            child: None,
        })
    }

    /// Returns the launch description.
    #[must_use]
    pub const fn spec(&self) -> &ContainerSpec {
        &self.spec
    }

    /// Returns the runtime instance.
    #[must_use]
    pub const fn instance(&self) -> &ContainerInstance {
        &self.instance
    }

    /// Returns the resolved entrypoint path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ContainerState {
        self.state
    }

    /// Returns the child PID while the container is running.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Marks the container failed after an error outside the launcher.
    pub fn fail(&mut self) {
        tracing::warn!(id = %self.instance.id(), from = %self.state, "container failed");
        self.state = ContainerState::Failed;
    }

    /// Jails the launcher inside `root`: `Created -> RootConfined`.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Isolation` if `chroot`/`chdir` fails.
    pub fn confine(&mut self, root: &Path) -> Result<()> {
        self.expect_state(ContainerState::Created)?;
        let result = corral_core::filesystem::chroot::enter_root(root);
        self.advance(result, ContainerState::RootConfined)
    }

    /// Starts the entrypoint: `RootConfined -> Running`.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Launch` if the process cannot be started.
    pub fn start(&mut self) -> Result<u32> {
        self.expect_state(ContainerState::RootConfined)?;
        let result = crate::process::spawn_container_process(
            &self.program,
            &self.spec.entrypoint,
            &self.spec.environment,
        );
        let child = self.advance(result, ContainerState::Running)?;
        let pid = child.id();
        self.child = Some(child);
        Ok(pid)
    }

    /// Blocks until the entrypoint exits: `Running -> Exited`.
    ///
    /// # Errors
    ///
    /// Returns `CorralError::Wait` if waiting fails.
    pub fn wait(&mut self) -> Result<ExitReport> {
        self.expect_state(ContainerState::Running)?;
        let Some(child) = self.child.as_mut() else {
            return Err(CorralError::Config {
                message: format!("container {} has no process", self.instance.id()),
            });
        };
        let result = crate::process::wait_for_exit(child);
        let report = self.advance(result, ContainerState::Exited)?;
        self.child = None;
        Ok(report)
    }

    fn expect_state(&self, expected: ContainerState) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        Err(CorralError::Config {
            message: format!(
                "container {} is {}, expected {expected}",
                self.instance.id(),
                self.state
            ),
        })
    }

    fn advance<T>(&mut self, result: Result<T>, next: ContainerState) -> Result<T> {
        match result {
            Ok(value) => {
                tracing::debug!(id = %self.instance.short_id(), from = %self.state, to = %next, "transition");
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }
}

/// Resolves `name` to the program the launcher will execute.
///
/// Bare names are looked up on `PATH` and become absolute. Relative paths
/// such as `./tool` must exist from the current directory but are returned
/// unchanged, so they resolve against the container root after `chdir("/")`.
///
/// # Errors
///
/// Returns `CorralError::ExecutableNotFound` if no executable matches.
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    let resolved = which::which(name).map_err(|e| CorralError::ExecutableNotFound {
        name: name.to_owned(),
        reason: e.to_string(),
    })?;
    let path = Path::new(name);
    if !path.is_absolute() && path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(entrypoint: &[&str]) -> ContainerSpec {
        ContainerSpec {
            entrypoint: entrypoint.iter().map(ToString::to_string).collect(),
            environment: Vec::new(),
            image_name: "test".into(),
            image_dir: PathBuf::from("/nonexistent/images"),
            container_dir: PathBuf::from("/nonexistent/containers"),
        }
    }

    fn instance() -> ContainerInstance {
        ContainerInstance::create(Path::new("/nonexistent/containers"))
    }

    #[test]
    fn new_container_has_created_state() {
        let c = Container::create(spec(&["sh"]), instance()).expect("sh on PATH");
        assert_eq!(c.state(), ContainerState::Created);
        assert!(c.pid().is_none());
        assert!(c.program().is_absolute());
    }

    #[test]
    fn unknown_entrypoint_is_executable_not_found() {
        let err = Container::create(spec(&["corral-no-such-binary"]), instance())
            .expect_err("must fail");
        assert!(matches!(err, CorralError::ExecutableNotFound { ref name, .. } if name == "corral-no-such-binary"));
    }

    /// `../` repeated up to `/`, then `bin/sh`, from the test's directory.
    fn relative_sh() -> String {
        let depth = std::env::current_dir()
            .expect("cwd")
            .components()
            .count();
        format!("{}bin/sh", "../".repeat(depth))
    }

    #[test]
    fn relative_entrypoint_is_kept_relative() {
        let name = relative_sh();
        let program = resolve_executable(&name).expect("sh reachable from cwd");
        assert_eq!(program, PathBuf::from(&name));
        assert!(program.is_relative());
    }

    #[test]
    fn bare_name_becomes_absolute() {
        let program = resolve_executable("sh").expect("sh on PATH");
        assert!(program.is_absolute());
        assert_eq!(program.file_name(), Some(std::ffi::OsStr::new("sh")));
    }

    #[test]
    fn missing_relative_entrypoint_is_executable_not_found() {
        let err = resolve_executable("./corral-no-such-tool").expect_err("must fail");
        assert!(matches!(err, CorralError::ExecutableNotFound { .. }));
    }

    #[test]
    fn empty_entrypoint_is_config_error() {
        let err = Container::create(spec(&[]), instance()).expect_err("must fail");
        assert!(matches!(err, CorralError::Config { .. }));
    }

    #[test]
    fn start_before_confine_is_rejected() {
        let mut c = Container::create(spec(&["sh"]), instance()).expect("create");
        let err = c.start().expect_err("not confined");
        assert!(matches!(err, CorralError::Config { .. }));
        assert_eq!(c.state(), ContainerState::Created);
    }

    #[test]
    fn wait_before_start_is_rejected() {
        let mut c = Container::create(spec(&["sh"]), instance()).expect("create");
        assert!(c.wait().is_err());
    }

    #[test]
    fn failed_confine_marks_container_failed() {
        let mut c = Container::create(spec(&["sh"]), instance()).expect("create");
        let err = c
            .confine(Path::new("/nonexistent/corral/rootfs"))
            .expect_err("missing root");
        assert!(matches!(err, CorralError::Isolation { .. }));
        assert_eq!(c.state(), ContainerState::Failed);
    }
}
