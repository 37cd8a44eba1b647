//! XML serializer.
//!
//! The prolog declares the charset (`<?xml version="1.0" encoding="..."?>`);
//! every element thereafter is one node, its tag the node name and its
//! attributes the node's own attribute list plus two reconstruction
//! attributes: `__type` names the `Kind` (omitted for the default `str`
//! case so ordinary text nodes stay uncluttered) and `__count` is present
//! only on arrays, giving the element count so an empty array is
//! distinguishable from a scalar of the same kind. A void node has no
//! `__type`; a string node with no children and no occasion for ambiguity
//! carries its text as the element body, every other scalar or array
//! renders its value(s) in a whitespace-separated list.
//!
//! This is a hand-rolled reader, not a validating XML parser: it accepts
//! exactly the subset this protocol emits and rejects everything else with
//! a `SchemaError::Xml`.

use crate::charset::TextCharset;
use crate::error::{Error, SchemaError};
use crate::node::{Kind, Node, Payload, Scalar};

pub fn encode(tree: &Node, charset: TextCharset) -> Result<Vec<u8>, Error> {
    let mut text = String::new();
    text.push_str(&format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", charset.xml_label()));
    write_node(tree, &mut text)?;
    text.push('\n');
    charset.encode(&text)
}

fn write_node(node: &Node, out: &mut String) -> Result<(), Error> {
    out.push('<');
    out.push_str(node.name());
    match node.value() {
        Payload::Void => {}
        Payload::Scalar(Scalar::Str(s)) if !s.is_empty() => {}
        // An empty string renders identically to a void node (no body, no
        // children) so it needs an explicit marker to survive the round trip.
        Payload::Scalar(Scalar::Str(_)) => {
            out.push_str(" __type=\"str\"");
        }
        Payload::Scalar(s) => {
            out.push_str(" __type=\"");
            out.push_str(s.kind().xml_type_name());
            out.push('"');
        }
        Payload::Array(kind, values) => {
            out.push_str(" __type=\"");
            out.push_str(kind.xml_type_name());
            out.push_str("\" __count=\"");
            out.push_str(&values.len().to_string());
            out.push('"');
        }
    }
    for (key, value) in node.attributes() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_into(value, out);
        out.push('"');
    }

    let body = render_body(node)?;
    if body.is_empty() && node.children().is_empty() {
        out.push_str("/>");
        return Ok(());
    }
    out.push('>');
    out.push_str(&body);
    for child in node.children() {
        write_node(child, out)?;
    }
    out.push_str("</");
    out.push_str(node.name());
    out.push('>');
    Ok(())
}

fn render_body(node: &Node) -> Result<String, Error> {
    Ok(match node.value() {
        Payload::Void => String::new(),
        Payload::Scalar(s) => render_scalar(s),
        Payload::Array(_, values) => values.iter().map(render_scalar).collect::<Vec<_>>().join(" "),
    })
}

fn render_scalar(s: &Scalar) -> String {
    let mut out = String::new();
    match s {
        Scalar::S8(v) => out.push_str(&v.to_string()),
        Scalar::U8(v) => out.push_str(&v.to_string()),
        Scalar::S16(v) => out.push_str(&v.to_string()),
        Scalar::U16(v) => out.push_str(&v.to_string()),
        Scalar::S32(v) => out.push_str(&v.to_string()),
        Scalar::U32(v) => out.push_str(&v.to_string()),
        Scalar::S64(v) => out.push_str(&v.to_string()),
        Scalar::U64(v) => out.push_str(&v.to_string()),
        Scalar::Bin(bytes) => out.push_str(&hex::encode(bytes)),
        Scalar::Str(text) => escape_into(text, &mut out),
        Scalar::Ip4(ip) => out.push_str(&ip.to_string()),
        Scalar::Time(t) => out.push_str(&t.to_string()),
        Scalar::Float(f) => out.push_str(&f.to_string()),
        Scalar::Bool(b) => out.push_str(if *b { "1" } else { "0" }),
        Scalar::Pair2S8(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Triple3S8(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Quad4U8(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Pair2S16(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Triple3S16(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Quad4S16(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Pair2S32(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Triple3S32(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Quad4S32(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Pair2S64(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Triple3S64(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
        Scalar::Quad4S64(a) => out.push_str(&a.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",")),
    }
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn unescape(text: &str) -> String {
    text.replace("&quot;", "\"").replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

/// Sniff the declared charset from the prolog, decode the document bytes
/// under it, then parse. The caller may already know the charset from the
/// envelope's own header; this re-derives it from the document itself so
/// the function is usable standalone.
pub fn decode(data: &[u8]) -> Result<(Node, TextCharset), Error> {
    let prolog_end = find_prolog_end(data)?;
    let prolog_bytes = &data[..prolog_end];
    let prolog_text = String::from_utf8_lossy(prolog_bytes);
    let charset = extract_encoding(&prolog_text)?;
    let text = charset.decode(&data[prolog_end..])?;
    let mut parser = Parser::new(&text);
    let node = parser.parse_element()?;
    parser.skip_whitespace();
    if parser.pos != text.len() {
        return Err(Error::Schema(SchemaError::TrailingData));
    }
    Ok((node, charset))
}

fn find_prolog_end(data: &[u8]) -> Result<usize, Error> {
    let needle = b"?>";
    data.windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + needle.len())
        .ok_or_else(|| Error::Schema(SchemaError::Xml("missing XML prolog".into())))
}

fn extract_encoding(prolog: &str) -> Result<TextCharset, Error> {
    let key = "encoding=\"";
    let start = prolog.find(key).ok_or_else(|| Error::Schema(SchemaError::Xml("prolog has no encoding attribute".into())))? + key.len();
    let end = prolog[start..].find('"').ok_or_else(|| Error::Schema(SchemaError::Xml("unterminated encoding attribute".into())))?;
    TextCharset::from_xml_label(&prolog[start..start + end])
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.text.len() && self.text.as_bytes()[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn parse_element(&mut self) -> Result<Node, Error> {
        self.skip_whitespace();
        self.expect('<')?;
        let name = self.read_ident()?;
        let attrs = self.read_attributes()?;

        self.skip_whitespace();
        if self.consume_str("/>") {
            return self.finish_node(name, attrs, String::new(), Vec::new());
        }
        self.expect('>')?;

        let mut children = Vec::new();
        let body_start = self.pos;
        loop {
            self.skip_whitespace();
            if self.peek_str(&format!("</{name}")) {
                let body = self.text[body_start..self.pos].trim().to_string();
                self.pos += format!("</{name}").len();
                self.skip_whitespace();
                self.expect('>')?;
                return self.finish_node(name, attrs, body, children);
            }
            if self.peek_char() == Some('<') {
                children.push(self.parse_element()?);
            } else {
                return Err(Error::Schema(SchemaError::Xml(format!("malformed body for element {name:?}"))));
            }
        }
    }

    fn finish_node(&self, name: String, attrs: Vec<(String, String)>, body: String, mut children: Vec<Node>) -> Result<Node, Error> {
        let mut explicit_type = None;
        let mut count = None;
        let mut real_attrs = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (k, v) in attrs {
            match k.as_str() {
                "__type" => explicit_type = Some(v),
                "__count" => count = Some(v.parse::<usize>().map_err(|_| Error::Schema(SchemaError::Xml(format!("bad __count {v:?}"))))?),
                _ => {
                    if !seen.insert(k.clone()) {
                        return Err(Error::Schema(SchemaError::DuplicateAttribute(k)));
                    }
                    real_attrs.push((k, unescape(&v)));
                }
            }
        }

        // With no explicit `__type`, a node with children or an empty body
        // is `Void` (a `str` node never has children, and an empty string
        // value always carries an explicit `__type="str"`, see `write_node`);
        // otherwise it's the implicit default `str` case.
        let mut node = match (explicit_type, count) {
            (None, None) if !children.is_empty() || body.is_empty() => Node::void(name),
            (None, None) => Node::string(name, unescape(&body)),
            (Some(type_name), count) => {
                let kind = Kind::from_xml_type_name(&type_name)
                    .ok_or_else(|| Error::Schema(SchemaError::Xml(format!("unknown __type {type_name:?}"))))?;
                build_typed_node(name, kind, count, &body)?
            }
            (None, Some(_)) => return Err(Error::Schema(SchemaError::Xml("__count without __type".into()))),
        };
        for (k, v) in real_attrs {
            node.set_attribute(k, v);
        }
        children.drain(..).for_each(|c| node.add_child(c));
        Ok(node)
    }

    fn read_attributes(&mut self) -> Result<Vec<(String, String)>, Error> {
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                Some('/') | Some('>') | None => break,
                _ => {}
            }
            let key = self.read_ident()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            self.expect('"')?;
            let start = self.pos;
            let end = self.text[start..].find('"').ok_or_else(|| Error::Schema(SchemaError::Xml("unterminated attribute value".into())))?;
            let value = self.text[start..start + end].to_string();
            self.pos = start + end;
            self.expect('"')?;
            attrs.push((key, value));
        }
        Ok(attrs)
    }

    fn read_ident(&mut self) -> Result<String, Error> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(Error::Schema(SchemaError::Xml("expected identifier".into())));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.text[self.pos..].starts_with(s)
    }

    fn consume_str(&mut self, s: &str) -> bool {
        if self.peek_str(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), Error> {
        if self.peek_char() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(Error::Schema(SchemaError::Xml(format!("expected {c:?} at byte {}", self.pos))))
        }
    }
}

fn build_typed_node(name: String, kind: Kind, count: Option<usize>, body: &str) -> Result<Node, Error> {
    let tokens: Vec<&str> = if body.trim().is_empty() { Vec::new() } else { body.split_whitespace().collect() };
    if let Some(n) = count {
        let values = tokens.iter().map(|t| parse_scalar(kind, t)).collect::<Result<Vec<_>, _>>()?;
        if values.len() != n {
            return Err(Error::Schema(SchemaError::Xml(format!("__count {n} does not match {} values", values.len()))));
        }
        Node::array(name, kind, values)
    } else if kind == Kind::Void {
        Ok(Node::void(name))
    } else {
        let token = tokens.first().copied().unwrap_or("");
        Ok(Node::scalar(name, parse_scalar(kind, token)?))
    }
}

fn parse_scalar(kind: Kind, token: &str) -> Result<Scalar, Error> {
    let bad = || Error::Schema(SchemaError::Xml(format!("malformed {} value {token:?}", kind.xml_type_name())));
    let csv = |n: usize| -> Result<Vec<i64>, Error> {
        let parts: Vec<&str> = token.split(',').collect();
        if parts.len() != n {
            return Err(bad());
        }
        parts.iter().map(|p| p.parse::<i64>().map_err(|_| bad())).collect()
    };
    Ok(match kind {
        Kind::S8 => Scalar::S8(token.parse().map_err(|_| bad())?),
        Kind::U8 => Scalar::U8(token.parse().map_err(|_| bad())?),
        Kind::S16 => Scalar::S16(token.parse().map_err(|_| bad())?),
        Kind::U16 => Scalar::U16(token.parse().map_err(|_| bad())?),
        Kind::S32 => Scalar::S32(token.parse().map_err(|_| bad())?),
        Kind::U32 => Scalar::U32(token.parse().map_err(|_| bad())?),
        Kind::S64 => Scalar::S64(token.parse().map_err(|_| bad())?),
        Kind::U64 => Scalar::U64(token.parse().map_err(|_| bad())?),
        Kind::Bin => Scalar::Bin(hex::decode(token).map_err(|_| bad())?),
        Kind::Str => Scalar::Str(unescape(token)),
        Kind::Ip4 => Scalar::Ip4(token.parse().map_err(|_| bad())?),
        Kind::Time => Scalar::Time(token.parse().map_err(|_| bad())?),
        Kind::Float => Scalar::Float(token.parse().map_err(|_| bad())?),
        Kind::Bool => Scalar::Bool(token == "1"),
        Kind::Pair2S8 => {
            let v = csv(2)?;
            Scalar::Pair2S8([v[0] as i8, v[1] as i8])
        }
        Kind::Triple3S8 => {
            let v = csv(3)?;
            Scalar::Triple3S8([v[0] as i8, v[1] as i8, v[2] as i8])
        }
        Kind::Quad4U8 => {
            let v = csv(4)?;
            Scalar::Quad4U8([v[0] as u8, v[1] as u8, v[2] as u8, v[3] as u8])
        }
        Kind::Pair2S16 => {
            let v = csv(2)?;
            Scalar::Pair2S16([v[0] as i16, v[1] as i16])
        }
        Kind::Triple3S16 => {
            let v = csv(3)?;
            Scalar::Triple3S16([v[0] as i16, v[1] as i16, v[2] as i16])
        }
        Kind::Quad4S16 => {
            let v = csv(4)?;
            Scalar::Quad4S16([v[0] as i16, v[1] as i16, v[2] as i16, v[3] as i16])
        }
        Kind::Pair2S32 => {
            let v = csv(2)?;
            Scalar::Pair2S32([v[0] as i32, v[1] as i32])
        }
        Kind::Triple3S32 => {
            let v = csv(3)?;
            Scalar::Triple3S32([v[0] as i32, v[1] as i32, v[2] as i32])
        }
        Kind::Quad4S32 => {
            let v = csv(4)?;
            Scalar::Quad4S32([v[0] as i32, v[1] as i32, v[2] as i32, v[3] as i32])
        }
        Kind::Pair2S64 => {
            let v = csv(2)?;
            Scalar::Pair2S64([v[0], v[1]])
        }
        Kind::Triple3S64 => {
            let v = csv(3)?;
            Scalar::Triple3S64([v[0], v[1], v[2]])
        }
        Kind::Quad4S64 => {
            let v = csv(4)?;
            Scalar::Quad4S64([v[0], v[1], v[2], v[3]])
        }
        Kind::Void => return Err(bad()),
    })
}
