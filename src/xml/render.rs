//! Serialization of a document to text.

use quick_xml::events::{BytesCData, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};

use crate::error::RenderError;
use crate::xml::XmlDocument;

/// How a document is written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Write the `<?xml ...?>` prolog
    pub declaration: bool,
    /// Name the encoding in the prolog
    pub encoding: bool,
    /// Indent nested elements by this many spaces; `None` keeps the output on
    /// one line
    pub indent: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            declaration: true,
            encoding: false,
            indent: None,
        }
    }
}

/// Serialize `document` according to `options`.
///
/// Text added with `CDATA` is written as a `<![CDATA[...]]>` section.
pub fn render(document: &XmlDocument<'_>, options: &RenderOptions) -> Result<String, RenderError> {
    let mut buffer = Vec::new();
    sxd_document::writer::Writer::new()
        .set_single_quotes(false)
        .set_write_encoding(options.encoding)
        .format_document(document.document(), &mut buffer)
        .map_err(|err| RenderError::Write(err.to_string()))?;
    let text = String::from_utf8(buffer).map_err(|err| RenderError::Write(err.to_string()))?;

    let text = if options.declaration {
        text
    } else {
        strip_declaration(&text).to_string()
    };

    let indent = options.indent.filter(|width| *width > 0);
    let runs = text_runs(document);
    if indent.is_none() && runs.iter().all(|run| run.iter().all(|(_, cdata)| !cdata)) {
        return Ok(text);
    }
    rewrite(&text, runs, indent)
}

fn strip_declaration(xml: &str) -> &str {
    if xml.starts_with("<?xml") {
        if let Some(end) = xml.find("?>") {
            return xml[end + 2..].trim_start();
        }
    }
    xml
}

/// One entry per run of adjacent text nodes that produces output, in document
/// order. Each piece is flagged when it is character data.
type TextRun<'d> = Vec<(&'d str, bool)>;

fn text_runs<'d>(document: &XmlDocument<'d>) -> VecDeque<TextRun<'d>> {
    let mut runs = VecDeque::new();
    for child in document.document().root().children() {
        if let ChildOfRoot::Element(element) = child {
            collect_runs(document, element, &mut runs);
        }
    }
    runs
}

fn collect_runs<'d>(document: &XmlDocument<'d>, element: Element<'d>, runs: &mut VecDeque<TextRun<'d>>) {
    let mut run = TextRun::new();
    for child in element.children() {
        match child {
            ChildOfElement::Text(text) => run.push((text.text(), document.is_cdata(text))),
            other => {
                flush(&mut run, runs);
                if let ChildOfElement::Element(nested) = other {
                    collect_runs(document, nested, runs);
                }
            }
        }
    }
    flush(&mut run, runs);
}

fn flush<'d>(run: &mut TextRun<'d>, runs: &mut VecDeque<TextRun<'d>>) {
    if run.iter().any(|(text, _)| !text.is_empty()) {
        runs.push_back(std::mem::take(run));
    } else {
        run.clear();
    }
}

/// Re-emit `xml` through quick-xml, splitting character data out of the text
/// events and indenting by `indent` spaces when given.
///
/// Every text event of `xml` is one entry of `runs`, in the same order.
fn rewrite(xml: &str, mut runs: VecDeque<TextRun<'_>>, indent: Option<usize>) -> Result<String, RenderError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(mut text)) => {
                let run = runs.pop_front().unwrap_or_default();
                if run.iter().any(|(_, cdata)| *cdata) {
                    for (piece, cdata) in run {
                        if piece.is_empty() {
                            continue;
                        }
                        if cdata {
                            for section in cdata_sections(piece) {
                                write(&mut writer, Event::CData(BytesCData::new(section)))?;
                            }
                        } else {
                            write(&mut writer, Event::Text(BytesText::new(piece)))?;
                        }
                    }
                } else if indent.is_none() || !(text.inplace_trim_start() || text.inplace_trim_end()) {
                    write(&mut writer, Event::Text(text))?;
                }
            }
            Ok(event) => write(&mut writer, event)?,
            Err(err) => return Err(RenderError::Indent(err.to_string())),
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|err| RenderError::Indent(err.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|err| RenderError::Indent(err.to_string()))
}

/// Split `text` so no section contains the `]]>` terminator.
fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let head = if index == 0 { "" } else { ">" };
            let tail = if index == last { "" } else { "]]" };
            format!("{}{}{}", head, part, tail)
        })
        .collect()
}
