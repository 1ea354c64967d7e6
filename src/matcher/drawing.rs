//! xlsx埋め込み画像の抽出
//!
//! workbook.xml → シート → drawing → media のリレーションを辿り、
//! 画像ごとに固定セル（`xdr:from` の row/col）とバイト列を取り出す。

use super::types::{CellAnchor, EmbeddedImage};
use crate::error::{MigrationError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// 指定シートの埋め込み画像をdrawing内の出現順で返す
pub fn read_embedded_images(path: &Path, sheet_name: &str) -> Result<Vec<EmbeddedImage>> {
    if !path.exists() {
        return Err(MigrationError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let workbook_xml = read_entry_string(&mut archive, "xl/workbook.xml")?;
    let sheet_rel_id = find_sheet_rel_id(&workbook_xml, sheet_name)?
        .ok_or_else(|| MigrationError::SheetNotFound(sheet_name.to_string()))?;

    let workbook_rels = read_relationships(&mut archive, "xl/workbook.xml")?;
    let sheet_target = workbook_rels.get(&sheet_rel_id).ok_or_else(|| {
        MigrationError::InvalidWorkbook(format!("シートのリレーション {} がありません", sheet_rel_id))
    })?;
    let sheet_path = resolve_target("xl/workbook.xml", sheet_target);

    let sheet_xml = read_entry_string(&mut archive, &sheet_path)?;
    let drawing_ids = find_drawing_rel_ids(&sheet_xml)?;
    if drawing_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sheet_rels = read_relationships(&mut archive, &sheet_path)?;
    let mut images = Vec::new();

    for drawing_id in drawing_ids {
        let Some(target) = sheet_rels.get(&drawing_id) else {
            continue;
        };
        let drawing_path = resolve_target(&sheet_path, target);
        let drawing_xml = read_entry_string(&mut archive, &drawing_path)?;
        let drawing_rels = read_relationships(&mut archive, &drawing_path)?;

        for anchor in parse_anchors(&drawing_xml)? {
            let Some(media_target) = drawing_rels.get(&anchor.embed) else {
                continue;
            };
            let media_path = resolve_target(&drawing_path, media_target);
            let data = read_entry_bytes(&mut archive, &media_path)?;
            images.push(EmbeddedImage {
                anchor: anchor.from,
                media_path,
                data,
            });
        }
    }

    Ok(images)
}

/// drawing内の画像アンカー
///
/// グループ図形（`grpSp`）に複数の画像がある場合は画像ごとに1件ずつ、同じ固定セルで返す。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PictureAnchor {
    pub from: Option<CellAnchor>,
    /// `a:blip r:embed` のリレーションID
    pub embed: String,
}

/// drawing XMLから画像アンカーを抽出（画像を持たない図形は除外）
pub(crate) fn parse_anchors(xml: &str) -> Result<Vec<PictureAnchor>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    #[derive(Clone, Copy)]
    enum Field {
        Row,
        Col,
    }

    let mut anchors = Vec::new();
    let mut in_anchor = false;
    let mut in_from = false;
    let mut field: Option<Field> = None;
    let mut row: Option<u32> = None;
    let mut col: Option<u32> = None;
    let mut embeds: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" | b"absoluteAnchor" => {
                    in_anchor = true;
                    row = None;
                    col = None;
                    embeds.clear();
                }
                b"from" if in_anchor => in_from = true,
                b"row" if in_from => field = Some(Field::Row),
                b"col" if in_from => field = Some(Field::Col),
                b"blip" if in_anchor => embeds.extend(attr_value(&reader, &e, b"embed")?),
                _ => {}
            },
            Event::Empty(e) => {
                if in_anchor && e.local_name().as_ref() == b"blip" {
                    embeds.extend(attr_value(&reader, &e, b"embed")?);
                }
            }
            Event::Text(t) => {
                if let Some(f) = field {
                    let text = t.unescape()?;
                    let value = text.trim().parse::<u32>().ok();
                    match f {
                        Field::Row => row = value,
                        Field::Col => col = value,
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" | b"absoluteAnchor" => {
                    let from = match (row, col) {
                        (Some(row), Some(col)) => Some(CellAnchor { row, col }),
                        _ => None,
                    };
                    for embed in embeds.drain(..) {
                        anchors.push(PictureAnchor { from, embed });
                    }
                    in_anchor = false;
                    in_from = false;
                }
                b"from" => in_from = false,
                b"row" | b"col" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(anchors)
}

/// workbook.xml から指定名シートのリレーションIDを探す
fn find_sheet_rel_id(xml: &str, sheet_name: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if attr_value(&reader, &e, b"name")?.as_deref() == Some(sheet_name) {
                    return attr_value(&reader, &e, b"id");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// シートXMLの `<drawing r:id>` を列挙
fn find_drawing_rel_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"drawing" => {
                if let Some(id) = attr_value(&reader, &e, b"id")? {
                    ids.push(id);
                }
            }
            Event::Eof => return Ok(ids),
            _ => {}
        }
    }
}

/// .rels の Id → Target
pub(crate) fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                // 外部リンク（TargetMode="External"）は対象外
                if attr_value(&reader, &e, b"TargetMode")?.as_deref() == Some("External") {
                    continue;
                }
                if let (Some(id), Some(target)) = (attr_value(&reader, &e, b"Id")?, attr_value(&reader, &e, b"Target")?) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => return Ok(rels),
            _ => {}
        }
    }
}

/// パーツに対応する .rels を読む（存在しなければ空）
fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    part_path: &str,
) -> Result<HashMap<String, String>> {
    match read_entry_string(archive, &rels_path_for(part_path)) {
        Ok(xml) => parse_relationships(&xml),
        Err(MigrationError::Zip(ZipError::FileNotFound)) => Ok(HashMap::new()),
        Err(e) => Err(e),
    }
}

/// `xl/worksheets/sheet1.xml` → `xl/worksheets/_rels/sheet1.xml.rels`
pub(crate) fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// リレーションのTargetをパッケージ内パスに解決
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    let base = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if base.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", base, target))
    }
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn attr_value(reader: &Reader<&[u8]>, e: &BytesStart, local_name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.decode_and_unescape_value(reader)?.into_owned()));
        }
    }
    Ok(None)
}

fn read_entry_string<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

fn read_entry_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name)?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}
