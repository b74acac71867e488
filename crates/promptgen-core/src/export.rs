//! XML export of a prompt for pasting into a chat.
//!
//! Prompt bodies routinely contain angle brackets, quotes and code, so the
//! content is written inside CDATA rather than escaped. The optional `doc`
//! file is appended verbatim after the `<prompt>` element.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ExportError;
use crate::prompt::Prompt;

const INDENT: usize = 4;
const CDATA_END: &str = "]]>";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serialize `prompt` without its doc attachment.
pub fn to_markup(prompt: &Prompt) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', INDENT);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut writer, Event::Start(BytesStart::new("prompt")))?;

    write_text_element(&mut writer, "title", &prompt.title)?;
    if !prompt.tags.is_empty() {
        write_text_element(&mut writer, "tags", &prompt.tags.join(", "))?;
    }
    if !prompt.description.is_empty() {
        write_text_element(&mut writer, "description", &prompt.description)?;
    }

    emit(&mut writer, Event::Start(BytesStart::new("content")))?;
    for section in cdata_sections(&prompt.content) {
        emit(&mut writer, Event::CData(BytesCData::new(section)))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("content")))?;

    emit(&mut writer, Event::End(BytesEnd::new("prompt")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| ExportError::Markup(e.to_string()))
}

/// Serialize `prompt` and append its doc file, if it has one.
///
/// When the doc file cannot be read the error still carries the serialized
/// prompt (see [`ExportError::partial_output`]).
pub fn export(prompt: &Prompt) -> Result<String, ExportError> {
    let markup = to_markup(prompt)?;
    if !prompt.has_doc() {
        return Ok(markup);
    }

    let path = PathBuf::from(&prompt.doc);
    // Doc files are raw bytes; text in other encodings is kept lossily.
    match fs::read(&path) {
        Ok(bytes) => {
            let doc = String::from_utf8_lossy(&bytes);
            Ok(format!("{markup}\n\n<doc>\n{doc}\n</doc>"))
        }
        Err(source) => Err(ExportError::Doc {
            path,
            partial: markup,
            source,
        }),
    }
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Markup(e.to_string()))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), ExportError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Split text so no section contains `]]>`; adjacent sections concatenate
/// back to the original.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(CDATA_END) {
        // Keep "]]" in this section and start the next one at ">".
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}
