//! Fixture archives for install tests
//!
//! Builds in-memory `.tar.gz` and `.zip` archives shaped like real interpreter
//! distributions, with a shell script standing in for the interpreter. The
//! script answers the version query and runs any other file argument with
//! `/bin/sh`, so test "programs" are written in shell.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{Cursor, Write};

/// One file inside a fixture archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: String,
    pub contents: Vec<u8>,
    pub mode: u32,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            mode: 0o644,
        }
    }

    pub fn executable(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: 0o755,
            ..Self::file(path, contents)
        }
    }
}

/// Builds a gzip-compressed tar archive from `entries`
pub fn tar_gz_archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.contents.len() as u64);
        header.set_mode(entry.mode);
        builder
            .append_data(&mut header, &entry.path, entry.contents.as_slice())
            .expect("Failed to append tar entry");
    }

    builder
        .into_inner()
        .expect("Failed to finish tar archive")
        .finish()
        .expect("Failed to finish gzip stream")
}

/// Builds a zip archive from `entries`
pub fn zip_archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(entry.mode);
        zip.start_file(entry.path.as_str(), options)
            .expect("Failed to start zip entry");
        zip.write_all(&entry.contents)
            .expect("Failed to write zip entry");
    }

    zip.finish().expect("Failed to finish zip archive").into_inner()
}

/// Shell script that prints `version_output` for `version_flag` and otherwise
/// runs its first argument as a shell script
pub fn fake_interpreter_script(version_flag: &str, version_output: &str) -> String {
    format!(
        "#!/bin/sh\nif [ \"$1\" = \"{flag}\" ]; then\n  echo '{output}'\n  exit 0\nfi\nexec /bin/sh \"$@\"\n",
        flag = version_flag,
        output = version_output
    )
}

/// Fake interpreter distribution
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    /// Directory every entry is nested under, `None` for a flat archive
    pub top_level: Option<String>,
    /// Interpreter path relative to the distribution root
    pub interpreter: String,
    pub version_flag: String,
    pub version_output: String,
    pub interpreter_mode: u32,
}

impl FakeRuntime {
    /// Layout of an official Node.js tarball: `node-<version>-<token>/bin/node`
    pub fn node(version: &str, token: &str) -> Self {
        Self {
            top_level: Some(format!("node-{}-{}", version, token)),
            interpreter: "bin/node".to_string(),
            version_flag: "-v".to_string(),
            version_output: version.to_string(),
            interpreter_mode: 0o755,
        }
    }

    /// Python layout: `python-<version>-<token>/bin/python3`
    pub fn python(version: &str, token: &str) -> Self {
        Self {
            top_level: Some(format!("python-{}-{}", version, token)),
            interpreter: "bin/python3".to_string(),
            version_flag: "--version".to_string(),
            version_output: format!("Python {}", version),
            interpreter_mode: 0o755,
        }
    }

    /// Places every entry at the archive root
    pub fn flat(mut self) -> Self {
        self.top_level = None;
        self
    }

    /// Reports a different version than the one requested
    pub fn reporting(mut self, version_output: &str) -> Self {
        self.version_output = version_output.to_string();
        self
    }

    /// Strips the executable bit from every entry
    pub fn without_exec_bits(mut self) -> Self {
        self.interpreter_mode = 0o644;
        self
    }

    pub fn entries(&self) -> Vec<ArchiveEntry> {
        let prefix = |path: &str| match &self.top_level {
            Some(top) => format!("{}/{}", top, path),
            None => path.to_string(),
        };

        vec![
            ArchiveEntry {
                path: prefix(&self.interpreter),
                contents: fake_interpreter_script(&self.version_flag, &self.version_output)
                    .into_bytes(),
                mode: self.interpreter_mode,
            },
            ArchiveEntry {
                path: prefix("bin/helper"),
                contents: b"#!/bin/sh\necho helper\n".to_vec(),
                mode: self.interpreter_mode,
            },
            ArchiveEntry::file(prefix("README.md"), "fake interpreter distribution\n"),
        ]
    }

    pub fn tar_gz(&self) -> Vec<u8> {
        tar_gz_archive(&self.entries())
    }

    pub fn zip(&self) -> Vec<u8> {
        zip_archive(&self.entries())
    }
}
