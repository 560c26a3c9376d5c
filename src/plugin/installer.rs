use std::fs;
use std::path::Path;

use crate::executor::PackageExecutor;

const ROS2_INSTALL: &str = "apt-get update -qq && \
apt-get install -y software-properties-common curl && \
curl -sSL https://raw.githubusercontent.com/ros/rosdistro/master/ros.key -o /usr/share/keyrings/ros-archive-keyring.gpg && \
echo \"deb [arch=$(dpkg --print-architecture) signed-by=/usr/share/keyrings/ros-archive-keyring.gpg] http://packages.ros.org/ros2/ubuntu $(lsb_release -cs) main\" | tee /etc/apt/sources.list.d/ros2.list > /dev/null && \
apt-get update -qq && \
apt-get install -y ros-humble-desktop python3-colcon-common-extensions";

/// How a built-in plugin gets onto the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// Run one command line through the package executor.
    Command(&'static str),
    /// Check for hardware only. Success means the device is present and the
    /// user must install the toolkit by hand; nothing is installed.
    Probe {
        probe: &'static str,
        guidance: &'static [&'static str],
        /// Reported when the probe fails.
        missing: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct BuiltinInstaller {
    pub name: &'static str,
    pub description: &'static str,
    pub method: InstallMethod,
}

pub const BUILTIN_INSTALLERS: &[BuiltinInstaller] = &[
    BuiltinInstaller {
        name: "ros2",
        description: "Robot Operating System 2",
        method: InstallMethod::Command(ROS2_INSTALL),
    },
    BuiltinInstaller {
        name: "robot-arm",
        description: "Robot arm control libraries",
        method: InstallMethod::Command(
            "apt-get install -y libmodbus-dev can-utils liburdfdom-dev && pip3 install roboticstoolbox-python",
        ),
    },
    BuiltinInstaller {
        name: "opencv",
        description: "Computer vision library",
        method: InstallMethod::Command("apt-get install -y libopencv-dev python3-opencv"),
    },
    BuiltinInstaller {
        name: "pytorch",
        description: "Deep learning framework",
        method: InstallMethod::Command("pip3 install torch torchvision torchaudio"),
    },
    BuiltinInstaller {
        name: "tensorflow",
        description: "Machine learning framework",
        method: InstallMethod::Command("pip3 install tensorflow"),
    },
    BuiltinInstaller {
        name: "cuda-toolkit",
        description: "NVIDIA CUDA development kit",
        method: InstallMethod::Probe {
            probe: "lspci | grep -i nvidia > /dev/null",
            guidance: &[
                "NVIDIA GPU detected",
                "Please install CUDA from NVIDIA website:",
                "https://developer.nvidia.com/cuda-downloads",
            ],
            missing: "No NVIDIA GPU detected",
        },
    },
];

pub fn find(name: &str) -> Option<&'static BuiltinInstaller> {
    BUILTIN_INSTALLERS.iter().find(|installer| installer.name == name)
}

/// What an install attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// Hardware found; the user has to finish by hand.
    ManualSteps(&'static [&'static str]),
    /// Unknown plugin name: only its directory was reserved.
    Reserved,
}

impl BuiltinInstaller {
    /// `None` when the command or probe failed.
    pub fn run(&self, executor: &dyn PackageExecutor) -> Option<InstallOutcome> {
        match self.method {
            InstallMethod::Command(command) => {
                tracing::info!("installing {} ({})", self.name, self.description);
                executor.run(command).then_some(InstallOutcome::Installed)
            }
            InstallMethod::Probe {
                probe,
                guidance,
                missing,
            } => {
                tracing::info!("probing hardware for {}", self.name);
                if executor.run(probe) {
                    Some(InstallOutcome::ManualSteps(guidance))
                } else {
                    tracing::error!("{missing}");
                    None
                }
            }
        }
    }
}

/// Fallback for names without a built-in installer. Always succeeds.
pub fn reserve_directory(plugin_dir: &Path) -> InstallOutcome {
    tracing::warn!(
        "no built-in installer, reserving {}",
        plugin_dir.display()
    );
    if let Err(err) = fs::create_dir_all(plugin_dir) {
        tracing::warn!("failed to create {}: {err}", plugin_dir.display());
    }
    InstallOutcome::Reserved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::FakeExecutor;
    use tempfile::TempDir;

    #[test]
    fn test_table_has_required_installers() {
        for name in ["ros2", "robot-arm", "opencv", "pytorch", "tensorflow", "cuda-toolkit"] {
            assert!(find(name).is_some(), "missing installer {name}");
        }
        assert!(find("gazebo").is_none());
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<&str> = BUILTIN_INSTALLERS.iter().map(|i| i.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_INSTALLERS.len());
    }

    #[test]
    fn test_command_installer_runs_its_command() {
        let executor = FakeExecutor::succeeding();
        let outcome = find("opencv").unwrap().run(&executor);

        assert_eq!(outcome, Some(InstallOutcome::Installed));
        assert_eq!(
            executor.calls(),
            vec!["apt-get install -y libopencv-dev python3-opencv"]
        );
    }

    #[test]
    fn test_command_installer_failure() {
        let executor = FakeExecutor::failing();
        assert_eq!(find("pytorch").unwrap().run(&executor), None);
    }

    #[test]
    fn test_cuda_probe_only_gives_guidance() {
        let executor = FakeExecutor::succeeding();
        let outcome = find("cuda-toolkit").unwrap().run(&executor).unwrap();

        let InstallOutcome::ManualSteps(steps) = outcome else {
            panic!("expected manual steps, got {outcome:?}");
        };
        assert!(steps.iter().any(|s| s.contains("developer.nvidia.com")));
        // only the probe ran; nothing was installed
        assert_eq!(executor.calls(), vec!["lspci | grep -i nvidia > /dev/null"]);
    }

    #[test]
    fn test_cuda_probe_without_gpu_fails() {
        let executor = FakeExecutor::failing();
        assert_eq!(find("cuda-toolkit").unwrap().run(&executor), None);
    }

    #[test]
    fn test_reserve_directory_always_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("plugins/custom");
        assert_eq!(reserve_directory(&dir), InstallOutcome::Reserved);
        assert!(dir.is_dir());

        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        assert_eq!(reserve_directory(&blocker.join("custom")), InstallOutcome::Reserved);
    }
}
