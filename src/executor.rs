use std::process::Command;

/// Runs an external command line; `true` means it exited successfully.
///
/// The registries never interpret exit codes beyond success/failure.
pub trait PackageExecutor {
    fn run(&self, command: &str) -> bool;
}

/// Runs commands through `sh -c`, blocking until they finish.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl PackageExecutor for ShellExecutor {
    fn run(&self, command: &str) -> bool {
        tracing::debug!(command, "running shell command");

        match Command::new("sh").arg("-c").arg(command).status() {
            Ok(status) => {
                if !status.success() {
                    tracing::debug!(command, %status, "shell command failed");
                }
                status.success()
            }
            Err(err) => {
                tracing::warn!("failed to spawn shell for `{command}`: {err}");
                false
            }
        }
    }
}

/// System package managers, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
    Pacman,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [Self::Apt, Self::Yum, Self::Dnf, Self::Pacman];

    pub fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Yum => "yum",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
        }
    }

    /// First manager whose binary is on `PATH`.
    pub fn detect(executor: &dyn PackageExecutor) -> Option<Self> {
        let found = Self::ALL.into_iter().find(|manager| {
            executor.run(&format!("command -v {} > /dev/null 2>&1", manager.binary()))
        });

        match found {
            Some(manager) => tracing::debug!("package manager: {}", manager.binary()),
            None => tracing::warn!("no supported package manager found"),
        }
        found
    }

    pub fn install_command(self, package: &str) -> String {
        let package = shell_words::quote(package);
        match self {
            Self::Apt => format!("apt-get update -qq && apt-get install -y {package}"),
            Self::Yum => format!("yum install -y {package}"),
            Self::Dnf => format!("dnf install -y {package}"),
            Self::Pacman => format!("pacman -S --noconfirm {package}"),
        }
    }

    pub fn remove_command(self, package: &str) -> String {
        let package = shell_words::quote(package);
        match self {
            Self::Apt => format!("apt-get remove -y {package}"),
            Self::Yum => format!("yum remove -y {package}"),
            Self::Dnf => format!("dnf remove -y {package}"),
            Self::Pacman => format!("pacman -R --noconfirm {package}"),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;

    use super::PackageExecutor;

    /// Records every command and answers with a fixed outcome.
    #[derive(Debug, Default)]
    pub struct FakeExecutor {
        succeed: bool,
        fail_matching: Vec<String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeExecutor {
        pub fn succeeding() -> Self {
            Self {
                succeed: true,
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }

        /// Succeeds except for commands containing `pattern`.
        pub fn failing_on(pattern: &str) -> Self {
            Self {
                succeed: true,
                fail_matching: vec![pattern.to_string()],
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl PackageExecutor for FakeExecutor {
        fn run(&self, command: &str) -> bool {
            self.calls.borrow_mut().push(command.to_string());
            self.succeed
                && !self
                    .fail_matching
                    .iter()
                    .any(|pattern| command.contains(pattern.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeExecutor;
    use super::*;

    #[test]
    fn test_detect_prefers_apt() {
        let executor = FakeExecutor::succeeding();
        assert_eq!(PackageManager::detect(&executor), Some(PackageManager::Apt));
        assert_eq!(executor.calls(), vec!["command -v apt-get > /dev/null 2>&1"]);
    }

    #[test]
    fn test_detect_falls_through_in_order() {
        let executor = FakeExecutor::failing_on("apt-get");
        assert_eq!(PackageManager::detect(&executor), Some(PackageManager::Yum));

        let executor = FakeExecutor::failing();
        assert_eq!(PackageManager::detect(&executor), None);
        assert_eq!(executor.call_count(), 4);
    }

    #[test]
    fn test_install_and_remove_commands() {
        assert_eq!(
            PackageManager::Apt.install_command("nginx"),
            "apt-get update -qq && apt-get install -y nginx"
        );
        assert_eq!(PackageManager::Dnf.install_command("php"), "dnf install -y php");
        assert_eq!(
            PackageManager::Pacman.remove_command("redis"),
            "pacman -R --noconfirm redis"
        );
        assert_eq!(PackageManager::Yum.remove_command("docker"), "yum remove -y docker");
    }

    #[test]
    fn test_package_names_are_quoted() {
        assert_eq!(
            PackageManager::Yum.install_command("a b"),
            "yum install -y 'a b'"
        );
    }

    #[test]
    fn test_shell_executor_reports_exit_status() {
        assert!(ShellExecutor.run("true"));
        assert!(!ShellExecutor.run("exit 3"));
    }
}
