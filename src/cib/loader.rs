//! Obtain a CIB document from a file or from the cluster's query command.

use crate::cib::document::{Document, ParseFailure};
use crate::cib::error::CibError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_QUERY_PROGRAM: &str = "/usr/sbin/cibadmin";
pub const DEFAULT_QUERY_ARGS: &[&str] = &["--query"];

/// External program that prints the live CIB on stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for QueryCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_QUERY_PROGRAM.to_string(),
            args: DEFAULT_QUERY_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for QueryCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Everything a finished process left behind.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the query command. Swapped out in tests.
pub trait CommandRunner {
    fn run(&self, cmd: &QueryCommand) -> io::Result<CapturedOutput>;
}

/// Production runner that spawns the program directly, without a shell.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cmd: &QueryCommand) -> io::Result<CapturedOutput> {
        let output = Command::new(&cmd.program).args(&cmd.args).output()?;
        Ok(CapturedOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Where a decode pass gets its document from.
#[derive(Debug, Clone)]
pub enum Source {
    File(PathBuf),
    External(QueryCommand),
}

impl Source {
    pub fn load(&self, runner: &dyn CommandRunner) -> Result<Document, CibError> {
        match self {
            Source::File(path) => load_from_file(path),
            Source::External(cmd) => load_from_external_query(runner, cmd),
        }
    }
}

/// Read and parse a saved CIB (e.g. `cibadmin --query > cib.xml`).
pub fn load_from_file(path: &Path) -> Result<Document, CibError> {
    let text = fs::read_to_string(path).map_err(|source| CibError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match Document::parse(&text) {
        Ok(doc) => Ok(doc),
        Err(ParseFailure::Malformed(msg)) => Err(CibError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, msg),
        }),
        Err(ParseFailure::Empty) => Err(CibError::EmptyDocument {
            origin: path.display().to_string(),
        }),
    }
}

/// Run the query command and parse what it printed.
pub fn load_from_external_query(
    runner: &dyn CommandRunner,
    cmd: &QueryCommand,
) -> Result<Document, CibError> {
    let output = runner.run(cmd).map_err(|e| CibError::ExternalCommand {
        command: cmd.to_string(),
        stderr: e.to_string(),
    })?;

    if !output.success || output.stdout.is_empty() {
        return Err(CibError::ExternalCommand {
            command: cmd.to_string(),
            stderr: output.stderr.trim_end().to_string(),
        });
    }

    Document::parse(&output.stdout).map_err(|failure| {
        if let ParseFailure::Malformed(msg) = &failure {
            tracing::warn!(command = %cmd, error = %msg, "query command printed malformed XML");
        }
        CibError::EmptyDocument {
            origin: cmd.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    struct CannedRunner(io::Result<CapturedOutput>);

    impl CommandRunner for CannedRunner {
        fn run(&self, _cmd: &QueryCommand) -> io::Result<CapturedOutput> {
            match &self.0 {
                Ok(out) => Ok(out.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn canned(success: bool, stdout: &str, stderr: &str) -> CannedRunner {
        CannedRunner(Ok(CapturedOutput {
            success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }))
    }

    #[test]
    fn default_query_command_is_cibadmin() {
        assert_eq!(QueryCommand::default().to_string(), "/usr/sbin/cibadmin --query");
    }

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"<cib><status/></cib>"#).unwrap();
        let doc = load_from_file(file.path()).unwrap();
        assert_eq!(doc.root.name, "cib");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_file(&dir.path().join("nope.xml")).unwrap_err();
        assert!(matches!(err, CibError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_io_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<cib><status></cib>").unwrap();
        let err = load_from_file(file.path()).unwrap_err();
        match err {
            CibError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_empty_document() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CibError::EmptyDocument { .. }));
    }

    #[test]
    fn external_query_parses_stdout() {
        let runner = canned(true, "<cib/>", "");
        let doc = load_from_external_query(&runner, &QueryCommand::default()).unwrap();
        assert_eq!(doc.root.name, "cib");
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let runner = canned(false, "<cib/>", "Signon to CIB failed: Transport endpoint\n");
        let err = load_from_external_query(&runner, &QueryCommand::default()).unwrap_err();
        match err {
            CibError::ExternalCommand { command, stderr } => {
                assert_eq!(command, "/usr/sbin/cibadmin --query");
                assert_eq!(stderr, "Signon to CIB failed: Transport endpoint");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_stdout_is_external_command_error() {
        let runner = canned(true, "", "");
        let err = load_from_external_query(&runner, &QueryCommand::default()).unwrap_err();
        assert!(matches!(err, CibError::ExternalCommand { .. }));
    }

    #[test]
    fn spawn_failure_is_external_command_error() {
        let runner = CannedRunner(Err(io::Error::new(io::ErrorKind::NotFound, "no such file")));
        let err = load_from_external_query(&runner, &QueryCommand::default()).unwrap_err();
        assert!(matches!(err, CibError::ExternalCommand { .. }));
    }

    #[test]
    fn unparseable_stdout_is_empty_document() {
        let runner = canned(true, "not xml <<<", "");
        let err = load_from_external_query(&runner, &QueryCommand::default()).unwrap_err();
        assert!(matches!(err, CibError::EmptyDocument { .. }));
    }

    #[test]
    fn process_runner_captures_real_process() {
        let cmd = QueryCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo '<cib/>'; echo oops >&2".to_string()],
        };
        let out = ProcessRunner.run(&cmd).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "<cib/>");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn source_dispatches_to_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<cib/>").unwrap();
        let runner = canned(false, "", "must not run");
        let doc = Source::File(file.path().to_path_buf()).load(&runner).unwrap();
        assert_eq!(doc.root.name, "cib");
    }
}
