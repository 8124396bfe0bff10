//! Parser for TEI XML documents produced by GROBID.
//!
//! A processed fulltext document follows the structure:
//! ```xml
//! <TEI xmlns="http://www.tei-c.org/ns/1.0">
//!   <teiHeader>
//!     <fileDesc>
//!       <titleStmt><title level="a" type="main">Paper Title</title></titleStmt>
//!     </fileDesc>
//!     <profileDesc>
//!       <abstract><div><p>Abstract text.</p></div></abstract>
//!     </profileDesc>
//!   </teiHeader>
//!   <text>
//!     <body>
//!       <div><head>Introduction</head><p>First paragraph.</p></div>
//!     </body>
//!     <back><div><listBibl>...</listBibl></div></back>
//!   </text>
//! </TEI>
//! ```
//!
//! Only the header title, the abstract, and body divisions are kept.
//! Bibliography entries in `<back>` and figure or table captions are
//! ignored.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::BufRead;

/// Title, abstract, and body sections parsed from a TEI document.
#[derive(Debug, Clone, Default)]
pub struct ParsedArticle {
    pub title: String,
    pub abstract_text: String,
    pub sections: Vec<TeiSection>,
}

impl ParsedArticle {
    /// True when the document carried no usable content at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.abstract_text.is_empty() && self.sections.is_empty()
    }
}

/// A body division: heading plus its paragraphs joined with newlines.
#[derive(Debug, Clone, Default)]
pub struct TeiSection {
    pub heading: String,
    pub text: String,
}

/// Parse a TEI document into title, abstract, and body sections.
///
/// The parser is lenient: malformed or truncated input yields whatever
/// was collected up to that point. Text spacing inside paragraphs is
/// kept as written, so inline elements such as `<ref>` markers merge
/// into the surrounding sentence.
pub fn parse_tei<R: BufRead>(reader: R) -> ParsedArticle {
    let mut xml_reader = Reader::from_reader(reader);

    let mut buf = Vec::new();

    let mut title = String::new();
    let mut abstract_paragraphs: Vec<String> = Vec::new();
    let mut sections: Vec<TeiSection> = Vec::new();

    // Current body division state
    let mut div_heading = String::new();
    let mut div_paragraphs: Vec<String> = Vec::new();
    let mut head_buf = String::new();
    let mut p_buf = String::new();

    // Nesting tracking
    let mut in_title_stmt = false;
    let mut in_title = false;
    let mut title_done = false;
    let mut in_abstract = false;
    let mut in_body = false;
    let mut in_figure = false;
    let mut in_div = false;
    let mut in_head = false;
    let mut in_p = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match tag.as_str() {
                    "titleStmt" => {
                        in_title_stmt = true;
                    }
                    // Only the first header title counts; references in
                    // <back> carry their own <title> elements.
                    "title" if in_title_stmt && !title_done => {
                        in_title = true;
                        title.clear();
                    }
                    "abstract" => {
                        in_abstract = true;
                    }
                    "body" => {
                        in_body = true;
                    }
                    "figure" if in_body => {
                        in_figure = true;
                    }
                    "div" if in_body && !in_figure => {
                        in_div = true;
                        div_heading.clear();
                        div_paragraphs.clear();
                    }
                    "head" if in_div && !in_figure => {
                        in_head = true;
                        head_buf.clear();
                    }
                    "p" if in_abstract || (in_div && !in_figure) => {
                        in_p = true;
                        p_buf.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_title {
                    title.push_str(&e.unescape().unwrap_or_default());
                } else if in_head {
                    head_buf.push_str(&e.unescape().unwrap_or_default());
                } else if in_p {
                    p_buf.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match tag.as_str() {
                    "titleStmt" => {
                        in_title_stmt = false;
                    }
                    "title" if in_title => {
                        in_title = false;
                        title_done = true;
                    }
                    "abstract" => {
                        in_abstract = false;
                    }
                    "body" => {
                        in_body = false;
                    }
                    "figure" => {
                        in_figure = false;
                    }
                    "head" if in_head => {
                        in_head = false;
                        div_heading = head_buf.trim().to_string();
                    }
                    "p" if in_p => {
                        in_p = false;
                        let text = p_buf.trim();
                        if !text.is_empty() {
                            if in_abstract {
                                abstract_paragraphs.push(text.to_string());
                            } else {
                                div_paragraphs.push(text.to_string());
                            }
                        }
                    }
                    "div" if in_div => {
                        in_div = false;
                        let text = div_paragraphs.join("\n");
                        if !div_heading.is_empty() || !text.is_empty() {
                            sections.push(TeiSection {
                                heading: div_heading.clone(),
                                text,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    ParsedArticle {
        title: title.trim().to_string(),
        abstract_text: abstract_paragraphs.join("\n"),
        sections,
    }
}
