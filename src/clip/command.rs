use std::process::Command;

use tracing::{debug, info};

use super::{remove_stale_output, ClipOutcome, ClipRequest, RasterClipper};
use crate::errors::{CompareError, Result};

/// Clips by running an external program with the `intersectMask` calling
/// convention:
///
/// ```text
/// <program> <src> <mask> <out> --src_band=<n> --msk_band=<m>
/// ```
///
/// The exit status is checked and the output file must exist afterwards.
#[derive(Debug, Clone)]
pub struct CommandClipper {
    program: String,
}

impl CommandClipper {
    pub fn new(program: impl Into<String>) -> Self {
        CommandClipper {
            program: program.into(),
        }
    }

    fn command(&self, request: &ClipRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&request.source)
            .arg(&request.mask)
            .arg(request.output_path())
            .arg(format!("--src_band={}", request.source_band))
            .arg(format!("--msk_band={}", request.mask_band));
        cmd
    }
}

impl RasterClipper for CommandClipper {
    fn name(&self) -> &str {
        &self.program
    }

    fn clip(&self, request: &ClipRequest) -> Result<ClipOutcome> {
        let output = request.output_path();
        remove_stale_output(&output)?;

        let mut cmd = self.command(request);
        info!(
            source = %request.source.display(),
            mask = %request.mask.display(),
            "Clipping to match extent"
        );
        debug!(command = ?cmd, "Running clip program");

        let result = cmd.output().map_err(|source| CompareError::ClipSpawn {
            program: self.program.clone(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        debug!(status = %result.status, %stdout, %stderr, "Clip program finished");

        if !result.status.success() {
            return Err(CompareError::ClipFailed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr,
            });
        }
        if !output.exists() {
            return Err(CompareError::ClipOutputMissing(output));
        }
        Ok(ClipOutcome {
            output,
            log: stdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RasterFixture;

    fn request(fixture: &RasterFixture) -> ClipRequest {
        ClipRequest {
            source: fixture.path("src.tif"),
            mask: fixture.path("msk.tif"),
            source_band: 2,
            mask_band: 3,
            output_dir: fixture.dir().to_path_buf(),
        }
    }

    #[test]
    fn test_command_line() {
        let fixture = RasterFixture::new();
        let request = request(&fixture);
        let cmd = CommandClipper::new("intersectMask").command(&request);
        assert_eq!(cmd.get_program(), "intersectMask");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                fixture.path("src.tif").display().to_string(),
                fixture.path("msk.tif").display().to_string(),
                fixture.path("src_clippedto_msk.tif").display().to_string(),
                "--src_band=2".to_string(),
                "--msk_band=3".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let fixture = RasterFixture::new();
        let err = CommandClipper::new("compare-maps-no-such-clipper")
            .clip(&request(&fixture))
            .unwrap_err();
        assert!(matches!(err, CompareError::ClipSpawn { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let fixture = RasterFixture::new();
        let err = CommandClipper::new("false")
            .clip(&request(&fixture))
            .unwrap_err();
        assert!(matches!(err, CompareError::ClipFailed { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output() {
        let fixture = RasterFixture::new();
        let request = request(&fixture);
        std::fs::write(request.output_path(), b"stale").unwrap();

        let err = CommandClipper::new("true").clip(&request).unwrap_err();
        assert!(matches!(err, CompareError::ClipOutputMissing(_)), "{err}");
        assert!(!request.output_path().exists());
    }
}
