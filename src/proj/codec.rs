use crate::error::CommandError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionFormat {
    Tar,
    Gztar,
    #[default]
    Bztar,
    Xztar,
}

impl CompressionFormat {
    pub const ALL: [CompressionFormat; 4] = [Self::Tar, Self::Gztar, Self::Bztar, Self::Xztar];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Gztar => "gztar",
            Self::Bztar => "bztar",
            Self::Xztar => "xztar",
        }
    }

    /// Suffix appended to a project's basename once packed.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tar => ".tar",
            Self::Gztar => ".tar.gz",
            Self::Bztar => ".tar.bz2",
            Self::Xztar => ".tar.xz",
        }
    }

    /// Pack the contents of `source_dir` into `dest_file`, rooted at `.`.
    pub fn pack(self, source_dir: &Path, dest_file: &Path) -> Result<()> {
        let file = File::create(dest_file)
            .with_context(|| format!("failed to create {}", dest_file.display()))?;
        let writer = BufWriter::new(file);

        let writer = match self {
            Self::Tar => write_tar(writer, source_dir)?,
            Self::Gztar => write_tar(
                flate2::write::GzEncoder::new(writer, flate2::Compression::default()),
                source_dir,
            )?
            .finish()?,
            Self::Bztar => write_tar(
                bzip2::write::BzEncoder::new(writer, bzip2::Compression::best()),
                source_dir,
            )?
            .finish()?,
            Self::Xztar => write_tar(xz2::write::XzEncoder::new(writer, 6), source_dir)?.finish()?,
        };

        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
            .with_context(|| format!("failed to sync {}", dest_file.display()))?;
        Ok(())
    }

    /// Unpack `artifact` into `dest_dir`, creating it first.
    pub fn unpack(self, artifact: &Path, dest_dir: &Path) -> Result<()> {
        let file =
            File::open(artifact).with_context(|| format!("failed to open {}", artifact.display()))?;
        let reader = BufReader::new(file);
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;

        let unpacked = match self {
            Self::Tar => read_tar(reader, dest_dir),
            Self::Gztar => read_tar(flate2::read::GzDecoder::new(reader), dest_dir),
            Self::Bztar => read_tar(bzip2::read::BzDecoder::new(reader), dest_dir),
            Self::Xztar => read_tar(xz2::read::XzDecoder::new(reader), dest_dir),
        };
        unpacked.with_context(|| {
            format!(
                "failed to unpack {} into {}",
                artifact.display(),
                dest_dir.display()
            )
        })
    }
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CommandError::UnknownFormat(wanted.to_string()))
    }
}

fn write_tar<W: Write>(writer: W, source_dir: &Path) -> Result<W> {
    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(false);
    builder.append_dir_all(".", source_dir)?;
    Ok(builder.into_inner()?)
}

fn read_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_mtime(true);
    archive.unpack(dest_dir)?;
    Ok(())
}
