use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::share::ShareError;

/// The platform's "open with default app" tool.
pub struct Opener {
    pub program: &'static str,
    /// explorer.exe exits with 1 even when the launch worked, so its status is ignored.
    pub checks_exit: bool,
}

#[cfg(target_os = "macos")]
pub const OPENER: Option<Opener> = Some(Opener { program: "open", checks_exit: true });
#[cfg(target_os = "windows")]
pub const OPENER: Option<Opener> = Some(Opener { program: "explorer", checks_exit: false });
#[cfg(target_os = "linux")]
pub const OPENER: Option<Opener> = Some(Opener { program: "xdg-open", checks_exit: true });
#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
pub const OPENER: Option<Opener> = None;

pub fn launch_outcome(checks_exit: bool, exit_code: Option<i32>) -> Result<(), ShareError> {
    match exit_code {
        _ if !checks_exit => Ok(()),
        Some(0) => Ok(()),
        Some(code) => Err(ShareError::Failed(format!("opener exited with {}", code))),
        None => Err(ShareError::Failed("opener was terminated".to_string())),
    }
}

fn run(opener: &Opener, mut cmd: Command) -> Result<(), ShareError> {
    let status = cmd.status().map_err(|e| ShareError::Failed(format!("{}: {}", opener.program, e)))?;
    launch_outcome(opener.checks_exit, status.code())
}

/// Opens a file or link with the default application.
pub fn open(target: impl AsRef<OsStr>) -> Result<(), ShareError> {
    let opener = OPENER.ok_or(ShareError::Unsupported)?;
    let mut cmd = Command::new(opener.program);
    cmd.arg(target);
    run(&opener, cmd)
}

/// Command that shows `path` in the file manager, selecting it where the platform allows.
pub fn reveal_command(path: &Path) -> Option<Command> {
    let opener = OPENER?;
    let mut cmd = Command::new(opener.program);
    match opener.program {
        "open" => {
            cmd.arg("-R").arg(path);
        }
        "explorer" => {
            cmd.arg(format!("/select,{}", path.to_string_lossy()));
        }
        _ => {
            cmd.arg(path.parent().unwrap_or(path));
        }
    }
    Some(cmd)
}

pub fn reveal(path: &Path) -> Result<(), ShareError> {
    let opener = OPENER.ok_or(ShareError::Unsupported)?;
    let cmd = reveal_command(path).ok_or(ShareError::Unsupported)?;
    run(&opener, cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_ignored_when_not_checked() {
        assert!(launch_outcome(false, Some(1)).is_ok());
        assert!(launch_outcome(false, None).is_ok());
    }

    #[test]
    fn test_exit_status_checked() {
        assert!(launch_outcome(true, Some(0)).is_ok());
        assert!(matches!(launch_outcome(true, Some(1)), Err(ShareError::Failed(_))));
        assert!(matches!(launch_outcome(true, None), Err(ShareError::Failed(_))));
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_explorer_exit_code_is_not_trusted() {
        let opener = OPENER.unwrap();
        assert_eq!(opener.program, "explorer");
        assert!(!opener.checks_exit);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_reveal_opens_parent_dir() {
        let cmd = reveal_command(Path::new("/tmp/out/sr_xerox_bill.csv")).unwrap();
        assert_eq!(cmd.get_program(), "xdg-open");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("/tmp/out")]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_reveal_selects_file() {
        let cmd = reveal_command(Path::new("/tmp/out/sr_xerox_bill.csv")).unwrap();
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("-R"), OsStr::new("/tmp/out/sr_xerox_bill.csv")]);
    }
}
