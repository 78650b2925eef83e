use anyhow::{anyhow, Result};
use encoding_rs::{Encoding, UTF_8};
use lazy_static::lazy_static;
use regex::Regex;
use topicrank_core::tokenizer::Tokenizer;
use topicrank_core::{Document, Query, TopicId};

lazy_static! {
    static ref ITEM_ID: Regex = Regex::new(r#"itemid="([^"]+)""#).expect("valid regex");
    static ref PARA: Regex = Regex::new(r"</?p>").expect("valid regex");
    static ref TOPIC_NUM: Regex = Regex::new(r"(\d+)").expect("valid regex");
    static ref XML_ENCODING: regex::bytes::Regex =
        regex::bytes::Regex::new(r#"^<\?xml[^>]*encoding=["']([A-Za-z0-9._-]+)["']"#).expect("valid regex");
}

/// Decodes a news item with the encoding its XML declaration names
/// (`iso-8859-1` resolves to windows-1252). Undeclared or unknown encodings are read as UTF-8.
pub fn decode_news_item(bytes: &[u8]) -> String {
    let encoding = XML_ENCODING
        .captures(bytes)
        .and_then(|c| Encoding::for_label(&c[1]))
        .unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "malformed bytes replaced while decoding");
    }
    text.into_owned()
}

/// Parses one `<newsitem>` file. The body is every line between `<text>` and `</text>`.
pub fn parse_news_item(xml: &str, tok: &Tokenizer) -> Result<Document> {
    let mut doc: Option<Document> = None;
    let mut in_text = false;
    for line in xml.lines() {
        let line = line.trim();
        if !in_text {
            if doc.is_none() && line.starts_with("<newsitem ") {
                if let Some(caps) = ITEM_ID.captures(line) {
                    doc = Some(Document::new(&caps[1]));
                }
            }
            if line.starts_with("<text>") {
                in_text = true;
            }
            continue;
        }
        if line.starts_with("</text>") {
            break;
        }
        let Some(d) = doc.as_mut() else { break };
        tok.feed_document(d, &PARA.replace_all(line, ""));
    }
    doc.ok_or_else(|| anyhow!("no <newsitem itemid=...> header"))
}

/// Topic number of a collection directory such as `Data_C101`.
pub fn topic_from_name(name: &str) -> Option<TopicId> {
    TOPIC_NUM.captures_iter(name).last().and_then(|c| c[1].parse().ok())
}

/// Parses a topic file made of `<Query> ... </Query>` blocks. Query terms come from the title.
pub fn parse_topics(text: &str, tok: &Tokenizer) -> Vec<Query> {
    let mut queries = Vec::new();
    for block in text.split("</Query>") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let mut topic: Option<TopicId> = None;
        let mut title: Option<String> = None;
        let mut section: Option<&str> = None;
        let mut desc = String::new();
        let mut narr = String::new();
        for line in block.lines() {
            let line = line.trim();
            if line.starts_with("<num>") {
                topic = topic_from_name(line);
            } else if let Some(rest) = line.strip_prefix("<title>") {
                title = Some(rest.trim().to_string());
                section = None;
            } else if let Some(rest) = line.strip_prefix("<desc>") {
                section = Some("desc");
                push_line(&mut desc, rest.trim().trim_start_matches("Description:"));
            } else if let Some(rest) = line.strip_prefix("<narr>") {
                section = Some("narr");
                push_line(&mut narr, rest.trim().trim_start_matches("Narrative:"));
            } else {
                match section {
                    Some("desc") => push_line(&mut desc, line),
                    Some("narr") => push_line(&mut narr, line),
                    _ => {}
                }
            }
        }
        let (Some(topic), Some(title)) = (topic, title) else {
            tracing::warn!("topic block without <num> or <title>, skipped");
            continue;
        };
        let mut q = Query::new(topic);
        tok.feed_query(&mut q, &title);
        q.title = Some(title);
        q.description = (!desc.is_empty()).then_some(desc);
        q.narrative = (!narr.is_empty()).then_some(narr);
        queries.push(q);
    }
    queries
}

fn push_line(buf: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(line);
}
