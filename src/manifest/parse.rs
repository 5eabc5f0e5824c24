//! Manifest text format
//!
//! ```text
//! MANIFEST	1
//! version:	10
//! includes:	os-core
//!
//! D...	<hash>	10	/usr/bin
//! F...	<hash>	10	/usr/bin/ed
//! Fd..	<hash>	12	/usr/bin/red
//! ```
//!
//! The header runs until the first blank line. Entry flags are four characters:
//! type (`F`, `D`, `L`, `M`), `d` for deleted, `C` for do-not-update, and one
//! reserved column. Unknown header keys are ignored so newer manifests stay readable.

use std::fmt::Write as _;

use super::{File, FileKind, Manifest};
use crate::error::{self, Result};

const MAGIC: &str = "MANIFEST";

/// Manifest format written by [`render_manifest`]
pub const FORMAT: u32 = 1;

/// Parse manifest text for bundle `name`
pub fn parse_manifest(name: &str, content: &str) -> Result<Manifest> {
    let mut lines = content.lines().enumerate();

    match lines.next() {
        Some((_, first)) if first.split('\t').next() == Some(MAGIC) => {}
        _ => {
            return Err(error::manifest::invalid(
                name,
                1,
                "missing MANIFEST header",
            ));
        }
    }

    let mut manifest = Manifest::new(name, 0);
    let mut saw_version = false;

    for (idx, line) in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once('\t') else {
            return Err(error::manifest::invalid(name, idx + 1, "malformed header line"));
        };
        match key {
            "version:" => {
                manifest.version = parse_version(name, idx + 1, value)?;
                saw_version = true;
            }
            "includes:" => manifest.includes.push(value.trim().to_string()),
            _ => {}
        }
    }

    if !saw_version {
        return Err(error::manifest::invalid(name, 1, "missing version header"));
    }

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        manifest.files.push(parse_entry(name, idx + 1, line)?);
    }

    Ok(manifest)
}

fn parse_version(name: &str, line: usize, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| error::manifest::invalid(name, line, format!("bad version '{value}': {e}")))
}

fn parse_entry(name: &str, line: usize, text: &str) -> Result<File> {
    let fields: Vec<&str> = text.splitn(4, '\t').collect();
    let [flags, hash, last_change, filename] = fields[..] else {
        return Err(error::manifest::invalid(
            name,
            line,
            "expected flags, hash, version and filename",
        ));
    };

    let flag_chars: Vec<char> = flags.chars().collect();
    if flag_chars.len() != 4 {
        return Err(error::manifest::invalid(
            name,
            line,
            format!("flags '{flags}' must be four characters"),
        ));
    }

    let kind = FileKind::from_char(flag_chars[0]).ok_or_else(|| {
        error::manifest::invalid(name, line, format!("unknown entry type '{}'", flag_chars[0]))
    })?;

    if filename.is_empty() {
        return Err(error::manifest::invalid(name, line, "empty filename"));
    }

    Ok(File {
        filename: filename.to_string(),
        last_change: parse_version(name, line, last_change)?,
        hash: hash.to_string(),
        kind,
        is_deleted: flag_chars[1] == 'd',
        do_not_update: flag_chars[2] == 'C',
        staging: None,
    })
}

/// Render a manifest in the text format understood by [`parse_manifest`]
pub fn render_manifest(manifest: &Manifest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{MAGIC}\t{FORMAT}");
    let _ = writeln!(out, "version:\t{}", manifest.version);
    for include in &manifest.includes {
        let _ = writeln!(out, "includes:\t{include}");
    }
    out.push('\n');
    for file in &manifest.files {
        let _ = writeln!(
            out,
            "{}{}{}.\t{}\t{}\t{}",
            file.kind.as_char(),
            if file.is_deleted { 'd' } else { '.' },
            if file.do_not_update { 'C' } else { '.' },
            file.hash,
            file.last_change,
            file.filename
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITOR: &str = "MANIFEST\t1\n\
                          version:\t10\n\
                          previous:\t8\n\
                          includes:\tos-core\n\
                          includes:\tlib-ncurses\n\
                          \n\
                          D...\t0\t10\t/usr/bin\n\
                          F...\tabc\t10\t/usr/bin/ed\n\
                          Fd..\t0\t9\t/usr/bin/red\n\
                          F.C.\tdef\t8\t/etc/edrc\n\
                          L...\t123\t10\t/usr/bin/vi\n";

    #[test]
    fn test_parse_header_and_includes() {
        let manifest = parse_manifest("editor", EDITOR).unwrap();
        assert_eq!(manifest.name, "editor");
        assert_eq!(manifest.version, 10);
        assert_eq!(manifest.includes, vec!["os-core", "lib-ncurses"]);
        assert_eq!(manifest.files.len(), 5);
    }

    #[test]
    fn test_parse_entry_flags() {
        let manifest = parse_manifest("editor", EDITOR).unwrap();
        let dir = manifest.find_file("/usr/bin").unwrap();
        assert_eq!(dir.kind, FileKind::Directory);

        let red = manifest.find_file("/usr/bin/red").unwrap();
        assert!(red.is_deleted);
        assert_eq!(red.last_change, 9);

        let edrc = manifest.find_file("/etc/edrc").unwrap();
        assert!(edrc.do_not_update);
        assert!(!edrc.is_deleted);

        assert_eq!(manifest.find_file("/usr/bin/vi").unwrap().kind, FileKind::Link);
    }

    #[test]
    fn test_filename_may_contain_spaces() {
        let text = "MANIFEST\t1\nversion:\t3\n\nF...\th\t3\t/usr/share/doc/read me\n";
        let manifest = parse_manifest("docs", text).unwrap();
        assert_eq!(manifest.files[0].filename, "/usr/share/doc/read me");
    }

    #[test]
    fn test_missing_magic_rejected() {
        let err = parse_manifest("editor", "version:\t10\n").unwrap_err();
        assert!(matches!(err, crate::error::SwupError::ManifestInvalid { line: 1, .. }));
    }

    #[test]
    fn test_missing_version_rejected() {
        let err = parse_manifest("editor", "MANIFEST\t1\nincludes:\tos-core\n\n").unwrap_err();
        assert!(err.to_string().contains("Invalid manifest 'editor'"));
    }

    #[test]
    fn test_bad_entry_reports_line() {
        let text = "MANIFEST\t1\nversion:\t10\n\nF...\tabc\tten\t/usr/bin/ed\n";
        match parse_manifest("editor", text) {
            Err(crate::error::SwupError::ManifestInvalid { line, reason, .. }) => {
                assert_eq!(line, 4);
                assert!(reason.contains("ten"));
            }
            other => panic!("Expected ManifestInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let text = "MANIFEST\t1\nversion:\t10\n\nX...\tabc\t10\t/usr/bin/ed\n";
        assert!(parse_manifest("editor", text).is_err());
    }

    #[test]
    fn test_render_is_readable_by_parser() {
        let original = parse_manifest("editor", EDITOR).unwrap();
        let reparsed = parse_manifest("editor", &render_manifest(&original)).unwrap();
        assert_eq!(original.files, reparsed.files);
        assert_eq!(original.includes, reparsed.includes);
    }
}
