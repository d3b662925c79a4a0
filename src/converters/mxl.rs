//! Compressed MusicXML (`.mxl`)
//!
//! An `.mxl` file is a zip archive holding one MusicXML document. The
//! document's path is normally listed in `META-INF/container.xml`; archives
//! without a usable container fall back to the first MusicXML entry.

use super::musicxml::parse_musicxml;
use super::{ImportError, ImportOptions, ImportResult};
use crate::models::Score;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Parse the MusicXML document inside an `.mxl` archive
pub fn parse_mxl(bytes: &[u8], options: &ImportOptions) -> ImportResult<Score> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| ImportError::Archive(e.to_string()))?;

    let rootfile = match read_entry(&mut archive, CONTAINER_PATH) {
        Ok(container) => rootfile_path(&container),
        Err(_) => None,
    };
    let rootfile = rootfile
        .or_else(|| first_musicxml_entry(&archive))
        .ok_or_else(|| ImportError::Archive("no MusicXML document in archive".to_string()))?;

    log::debug!("reading {} from archive", rootfile);
    let xml = read_entry(&mut archive, &rootfile)?;
    parse_musicxml(&xml, options)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> ImportResult<String> {
    let mut entry = archive.by_name(name).map_err(|e| ImportError::Archive(format!("{}: {}", name, e)))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| ImportError::Archive(format!("{}: {}", name, e)))?;
    Ok(content)
}

/// `full-path` of the first `<rootfile>` in the container manifest
fn rootfile_path(container: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(container).ok()?;
    let path = doc
        .descendants()
        .filter(|n| n.has_tag_name("rootfile"))
        .find_map(|n| n.attribute("full-path"))?;
    Some(path.to_string())
}

fn first_musicxml_entry(archive: &ZipArchive<Cursor<&[u8]>>) -> Option<String> {
    let mut names: Vec<&str> = archive
        .file_names()
        .filter(|name| !name.starts_with("META-INF/"))
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".xml") || lower.ends_with(".musicxml")
        })
        .collect();
    names.sort_unstable();
    names.first().map(|name| name.to_string())
}
