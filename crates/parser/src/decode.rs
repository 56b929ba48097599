//! Decoding of one `<update>` element from a quick-xml event stream.
//!
//! Only the parts of the element that map onto [`Update`] are read, every
//! other child element is skipped. Text fields keep their content verbatim.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Display;
use std::io::BufRead;
use updateinfo_common::{Error, Result, Timestamp};
use updateinfo_schema::{Href, Package, Reference, Update};

pub(crate) const UPDATE_TAG: &[u8] = b"update";

pub(crate) fn xml_error(err: impl Display) -> Error {
    Error::Xml(err.to_string())
}

fn unexpected_eof(element: &str) -> Error {
    Error::Xml(format!("unexpected end of document inside <{element}>"))
}

/// Decode an update whose start tag has just been read. `empty` is set for
/// a self-closing `<update/>`.
pub(crate) fn decode_update<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<Update> {
    let mut update = Update::default();
    for_each_attribute(start, |key, value| {
        match key {
            b"type" => update.update_type = value,
            b"status" => update.status = value,
            _ => {}
        }
        Ok(())
    })?;
    if empty {
        return Ok(update);
    }

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"issued" => {
                    update.issued = issued_date(&e)?;
                    skip_element(reader, &e)?;
                }
                b"references" => read_references(reader, &mut update.references)?,
                b"pkglist" => read_pkglist(reader, &mut update.packages)?,
                other => match text_field(&mut update, other) {
                    Some(field) => *field = read_text(reader, "update")?,
                    None => skip_element(reader, &e)?,
                },
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"issued" => update.issued = issued_date(&e)?,
                other => {
                    if let Some(field) = text_field(&mut update, other) {
                        field.clear();
                    }
                }
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("update")),
            _ => {}
        }
        buf.clear();
    }

    Ok(update)
}

fn text_field<'u>(update: &'u mut Update, name: &[u8]) -> Option<&'u mut String> {
    match name {
        b"id" => Some(&mut update.id),
        b"title" => Some(&mut update.title),
        b"severity" => Some(&mut update.severity),
        b"release" => Some(&mut update.release),
        b"description" => Some(&mut update.description),
        _ => None,
    }
}

fn for_each_attribute<F>(start: &BytesStart<'_>, mut f: F) -> Result<()>
where
    F: FnMut(&[u8], String) -> Result<()>,
{
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        f(attr.key.local_name().as_ref(), value.into_owned())?;
    }
    Ok(())
}

fn issued_date(start: &BytesStart<'_>) -> Result<Option<Timestamp>> {
    let mut issued = None;
    for_each_attribute(start, |key, value| {
        if key == b"date" {
            issued = Some(Timestamp::parse_unix(&value)?);
        }
        Ok(())
    })?;
    Ok(issued)
}

/// Collect the character data directly inside the current element and
/// consume it up to its end tag. Text of nested elements is ignored.
fn read_text<R: BufRead>(reader: &mut Reader<R>, context: &str) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Text(t) if depth == 0 => text.push_str(&t.unescape().map_err(xml_error)?),
            Event::CData(c) if depth == 0 => {
                text.push_str(std::str::from_utf8(&c).map_err(xml_error)?)
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof(context)),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart<'_>) -> Result<()> {
    let mut buf = Vec::new();
    reader
        .read_to_end_into(start.name(), &mut buf)
        .map_err(xml_error)?;
    Ok(())
}

fn read_references<R: BufRead>(
    reader: &mut Reader<R>,
    references: &mut Vec<Reference>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"reference" {
                    references.push(decode_reference(&e)?);
                }
                skip_element(reader, &e)?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"reference" => {
                references.push(decode_reference(&e)?)
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("references")),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn decode_reference(start: &BytesStart<'_>) -> Result<Reference> {
    let mut reference = Reference::default();
    for_each_attribute(start, |key, value| {
        match key {
            b"href" if !value.is_empty() => reference.href = Some(Href::parse(&value)?),
            b"id" => reference.id = value,
            b"title" => reference.title = value,
            b"type" => reference.reference_type = value,
            _ => {}
        }
        Ok(())
    })?;
    Ok(reference)
}

fn read_pkglist<R: BufRead>(reader: &mut Reader<R>, packages: &mut Vec<Package>) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"collection" => {
                read_collection(reader, packages)?
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("pkglist")),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn read_collection<R: BufRead>(
    reader: &mut Reader<R>,
    packages: &mut Vec<Package>,
) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"package" => {
                let mut package = decode_package(&e)?;
                read_package_children(reader, &mut package)?;
                packages.push(package);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"package" => {
                packages.push(decode_package(&e)?)
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("collection")),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn decode_package(start: &BytesStart<'_>) -> Result<Package> {
    let mut package = Package::default();
    for_each_attribute(start, |key, value| {
        match key {
            b"name" => package.name = value,
            b"version" => package.version = value,
            b"release" => package.release = value,
            b"arch" => package.arch = value,
            _ => {}
        }
        Ok(())
    })?;
    Ok(package)
}

fn read_package_children<R: BufRead>(reader: &mut Reader<R>, package: &mut Package) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"filename" => {
                package.filename = read_text(reader, "filename")?
            }
            Event::Empty(e) if e.local_name().as_ref() == b"filename" => package.filename.clear(),
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof("package")),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}
