//! `corral run`: create a container and run a command inside it.

use std::path::PathBuf;

use clap::Args;
use corral_common::config::CorralConfig;
use corral_common::types::ContainerSpec;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Environment variables (PORT=80); repeat the flag or separate with commas.
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_delimiter = ',')]
    pub env: Vec<String>,

    /// Image name; the archive is `<image-dir>/<image-name>.tar`.
    #[arg(short, long, env = "CORRAL_IMAGE_NAME")]
    pub image_name: Option<String>,

    /// Images directory.
    #[arg(long, env = "CORRAL_IMAGE_DIR")]
    pub image_dir: Option<PathBuf>,

    /// Containers directory.
    #[arg(long, env = "CORRAL_CONTAINER_DIR")]
    pub container_dir: Option<PathBuf>,

    /// Command to run inside the container, followed by its arguments.
    #[arg(
        value_name = "ENTRYPOINT",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub entrypoint: Vec<String>,
}

impl RunArgs {
    /// Folds flags over the configured defaults into a launch description.
    #[must_use]
    pub fn into_spec(self, config: &CorralConfig) -> ContainerSpec {
        ContainerSpec {
            entrypoint: self.entrypoint,
            environment: self.env,
            image_name: self
                .image_name
                .unwrap_or_else(|| config.image_name.clone()),
            image_dir: self.image_dir.unwrap_or_else(|| config.image_dir.clone()),
            container_dir: self
                .container_dir
                .unwrap_or_else(|| config.container_dir.clone()),
        }
    }
}

/// Executes the `run` command.
///
/// Prints `<pid> <exit description>` once the entrypoint has exited. The
/// command succeeds whenever the entrypoint ran, whatever its exit status.
///
/// # Errors
///
/// Returns an error if any bootstrap stage fails.
pub fn execute(args: RunArgs, config: &CorralConfig) -> anyhow::Result<()> {
    let spec = args.into_spec(config);
    tracing::debug!(?spec, "launch requested");

    let report = corral_runtime::engine::run(spec)?;
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::commands::{Cli, Command};

    fn parse(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).expect("valid args");
        match cli.command {
            Command::Run(args) => args,
        }
    }

    #[test]
    fn entrypoint_keeps_trailing_hyphen_args() {
        let args = parse(&["corral", "run", "/bin/sh", "-c", "echo hi"]);
        assert_eq!(args.entrypoint, vec!["/bin/sh", "-c", "echo hi"]);
    }

    #[test]
    fn env_accepts_repeats_and_commas() {
        let args = parse(&["corral", "run", "-e", "A=1,B=2", "--env", "C=3", "sh"]);
        assert_eq!(args.env, vec!["A=1", "B=2", "C=3"]);
    }

    #[test]
    fn missing_entrypoint_is_rejected() {
        assert!(Cli::try_parse_from(["corral", "run"]).is_err());
    }

    #[test]
    fn flags_override_config_defaults() {
        let args = parse(&[
            "corral",
            "run",
            "-i",
            "alpine",
            "--container-dir",
            "/tmp/c",
            "sh",
        ]);
        let spec = args.into_spec(&CorralConfig::default());
        assert_eq!(spec.image_name, "alpine");
        assert_eq!(spec.container_dir, PathBuf::from("/tmp/c"));
        assert_eq!(spec.image_dir, PathBuf::from("/workshop/images"));
        assert_eq!(spec.image_path(), PathBuf::from("/workshop/images/alpine.tar"));
    }
}
