//! Runtime engine that runs one container from launch description to exit.

use corral_common::error::{Result, Stage};
use corral_common::types::{ContainerInstance, ContainerSpec};

use crate::container::Container;
use crate::process::ExitReport;

/// Runs the bootstrap stages for a single container.
///
/// Stages run strictly in order and the first failure stops the pipeline,
/// wrapped with the stage it came from. Nothing is torn down afterwards:
/// mounts, device nodes and the root directory outlive the run.
#[derive(Debug)]
pub struct Engine {
    spec: ContainerSpec,
}

impl Engine {
    /// Creates an engine for `spec`.
    #[must_use]
    pub const fn new(spec: ContainerSpec) -> Self {
        Self { spec }
    }

    /// Builds the root, mounts, provisions `/dev`, then launches and waits.
    ///
    /// The calling process ends up confined to the container root.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure as `CorralError::Stage`; use
    /// [`corral_common::error::CorralError::root_cause`] to reach the underlying kind.
    pub fn run(self) -> Result<ExitReport> {
        let instance = ContainerInstance::create(&self.spec.container_dir);
        tracing::info!(
            id = %instance.id(),
            short_id = instance.short_id(),
            image = %self.spec.image_name,
            created_at = instance.created_at(),
            "bootstrapping container"
        );

        let mut container =
            Container::create(self.spec, instance).map_err(|e| e.in_stage(Stage::Resolve))?;

        let result = prepare_root(&container);
        let root = match result {
            Ok(root) => root,
            Err(e) => {
                container.fail();
                return Err(e);
            }
        };

        launch(&mut container, &root).map_err(|e| e.in_stage(Stage::Launch))
    }
}

/// Runs root creation, mounts and device provisioning.
fn prepare_root(container: &Container) -> Result<std::path::PathBuf> {
    let rootfs = corral_image::rootfs::build_root(container.spec(), container.instance())
        .map_err(|e| e.in_stage(Stage::CreateContainer))?;

    let mounted = corral_core::filesystem::mount::mount_namespace(rootfs.path())
        .map_err(|e| e.in_stage(Stage::MountFilesystems))?;

    corral_core::filesystem::devices::provision_devices(&mounted)
        .map_err(|e| e.in_stage(Stage::ProvisionDevices))?;

    Ok(mounted.path().to_path_buf())
}

fn launch(container: &mut Container, root: &std::path::Path) -> Result<ExitReport> {
    container.confine(root)?;
    let _pid = container.start()?;
    container.wait()
}

/// Runs `spec` to completion.
///
/// # Errors
///
/// See [`Engine::run`].
pub fn run(spec: ContainerSpec) -> Result<ExitReport> {
    Engine::new(spec).run()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use corral_common::error::CorralError;

    use super::*;

    fn spec_in(dir: &Path, entrypoint: &str) -> ContainerSpec {
        ContainerSpec {
            entrypoint: vec![entrypoint.into()],
            environment: Vec::new(),
            image_name: "test".into(),
            image_dir: dir.join("images"),
            container_dir: dir.join("containers"),
        }
    }

    #[test]
    fn unresolvable_entrypoint_fails_before_any_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = run(spec_in(dir.path(), "corral-no-such-binary")).expect_err("must fail");

        assert_eq!(err.stage(), Some(Stage::Resolve));
        assert!(matches!(
            err.root_cause(),
            CorralError::ExecutableNotFound { .. }
        ));
        assert!(!dir.path().join("containers").exists());
    }

    #[test]
    fn missing_image_fails_in_create_stage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = run(spec_in(dir.path(), "sh")).expect_err("must fail");

        assert_eq!(err.stage(), Some(Stage::CreateContainer));
        assert!(matches!(err.root_cause(), CorralError::ImageNotFound { .. }));
    }
}
