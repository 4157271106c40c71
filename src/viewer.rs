//! Launching an external viewer for the finished report.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};

/// Value of the viewer setting that turns launching off.
pub const DISABLED_SETTING: &str = "none";

/// How the finished report is opened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Viewer {
    /// Run this executable with the report path as its only argument.
    Command(PathBuf),
    /// Hand the file to the platform's default handler.
    #[default]
    SystemDefault,
    /// Do not open the report.
    Disabled,
}

impl Viewer {
    /// Interprets a textual setting such as the value of an environment variable.
    ///
    /// An empty value or `none` (any case) disables the viewer.
    pub fn from_setting(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(DISABLED_SETTING) {
            Self::Disabled
        } else {
            Self::Command(PathBuf::from(value))
        }
    }

    /// The process that would be started for `document`, if any.
    pub fn invocation(&self, document: &Path) -> Option<ViewerInvocation> {
        match self {
            Self::Command(program) => Some(ViewerInvocation {
                program: program.clone().into_os_string(),
                args: vec![document.as_os_str().to_os_string()],
            }),
            Self::SystemDefault => Some(system_default_invocation(document)),
            Self::Disabled => None,
        }
    }

    /// Starts the viewer for `document` without waiting for it to exit.
    pub fn open(&self, document: &Path) -> Result<ViewerStatus, ViewerError> {
        let Some(invocation) = self.invocation(document) else {
            return Ok(ViewerStatus::Disabled);
        };
        invocation.spawn()?;
        let program = invocation.program.to_string_lossy().into_owned();
        info!("Opened {} with {}", document.display(), program);
        Ok(ViewerStatus::Launched { program })
    }

    /// Like [`Viewer::open`], but turns a failure into a logged warning.
    pub fn open_or_warn(&self, document: &Path) -> ViewerStatus {
        match self.open(document) {
            Ok(status) => status,
            Err(err) => {
                warn!("Could not open {}: {}", document.display(), err);
                ViewerStatus::Failed(err.to_string())
            }
        }
    }
}

/// A resolved viewer command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerInvocation {
    /// Executable to run.
    pub program: OsString,
    /// Arguments passed to the executable.
    pub args: Vec<OsString>,
}

impl ViewerInvocation {
    fn spawn(&self) -> Result<(), ViewerError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| ViewerError::from_spawn(&self.program, source))
    }
}

#[cfg(target_os = "macos")]
fn system_default_invocation(document: &Path) -> ViewerInvocation {
    ViewerInvocation {
        program: "open".into(),
        args: vec![document.as_os_str().to_os_string()],
    }
}

#[cfg(target_os = "windows")]
fn system_default_invocation(document: &Path) -> ViewerInvocation {
    // The empty string is the window title consumed by `start`.
    ViewerInvocation {
        program: "cmd".into(),
        args: vec![
            "/C".into(),
            "start".into(),
            "".into(),
            document.as_os_str().to_os_string(),
        ],
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn system_default_invocation(document: &Path) -> ViewerInvocation {
    ViewerInvocation {
        program: "xdg-open".into(),
        args: vec![document.as_os_str().to_os_string()],
    }
}

/// Result of trying to open the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerStatus {
    /// The viewer process was started.
    Launched {
        /// Program that was run.
        program: String,
    },
    /// Opening was turned off.
    Disabled,
    /// The viewer could not be started.
    Failed(String),
}

/// Errors raised while starting a viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// The executable does not exist or is not on `PATH`.
    NotFound {
        /// Program that was looked up.
        program: String,
    },
    /// The operating system refused to start the process.
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl ViewerError {
    fn from_spawn(program: &OsString, source: io::Error) -> Self {
        let program = program.to_string_lossy().into_owned();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { program }
        } else {
            Self::Spawn { program, source }
        }
    }
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { program } => write!(f, "Viewer '{program}' was not found"),
            Self::Spawn { program, .. } => write!(f, "Failed to start viewer '{program}'"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Spawn { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_values_map_to_viewers() {
        assert_eq!(Viewer::from_setting(""), Viewer::Disabled);
        assert_eq!(Viewer::from_setting("  "), Viewer::Disabled);
        assert_eq!(Viewer::from_setting("None"), Viewer::Disabled);
        assert_eq!(
            Viewer::from_setting("evince"),
            Viewer::Command(PathBuf::from("evince"))
        );
    }

    #[test]
    fn command_viewer_receives_document_path() {
        let invocation = Viewer::Command(PathBuf::from("/usr/bin/zathura"))
            .invocation(Path::new("/tmp/all_plots.pdf"))
            .unwrap();
        assert_eq!(invocation.program, OsString::from("/usr/bin/zathura"));
        assert_eq!(invocation.args, vec![OsString::from("/tmp/all_plots.pdf")]);
    }

    #[test]
    fn system_default_passes_document_last() {
        let invocation = Viewer::SystemDefault
            .invocation(Path::new("all_plots.pdf"))
            .unwrap();
        assert_eq!(
            invocation.args.last(),
            Some(&OsString::from("all_plots.pdf"))
        );
        if cfg!(target_os = "windows") {
            assert_eq!(invocation.program, OsString::from("cmd"));
        } else if cfg!(target_os = "macos") {
            assert_eq!(invocation.program, OsString::from("open"));
        } else {
            assert_eq!(invocation.program, OsString::from("xdg-open"));
        }
    }

    #[test]
    fn disabled_viewer_does_nothing() {
        assert!(Viewer::Disabled.invocation(Path::new("x.pdf")).is_none());
        assert_eq!(
            Viewer::Disabled.open(Path::new("x.pdf")).unwrap(),
            ViewerStatus::Disabled
        );
    }

    #[test]
    fn missing_executable_is_not_fatal() {
        let viewer = Viewer::Command(PathBuf::from("definitely-not-a-real-pdf-viewer-binary"));
        let err = viewer.open(Path::new("x.pdf")).unwrap_err();
        assert!(matches!(err, ViewerError::NotFound { .. }));
        assert!(matches!(
            viewer.open_or_warn(Path::new("x.pdf")),
            ViewerStatus::Failed(_)
        ));
    }
}
