//! Compact binary serializer.
//!
//! Layout: `0xA0` magic, charset byte, 2 reserved bytes, `u32` BE structure
//! segment length, then the structure segment, then the data segment.
//!
//! The structure segment is a pre-order walk of the tree: each node writes
//! its type tag (bit `0x40` set when the payload is an array), its name in
//! the 6-bit alphabet, an `0xFE`-prefixed 6-bit name for each attribute (in
//! declaration order), then its children, then an `0xFF` to close it. The
//! document as a whole is closed by one more `0xFF`, and the segment is
//! padded with zero bytes to a 4-byte boundary.
//!
//! The data segment holds every non-void node's value, in the same
//! document order, followed by every attribute's value, again in document
//! order. Fixed-size scalars are written raw; `str`/`bin` and arrays are
//! prefixed with a `u32` BE byte count. Every value is padded to a 4-byte
//! boundary, which (since the segment starts 4-byte aligned) is equivalent
//! to requiring the running length to stay a multiple of 4 after each one.

use crate::charset::TextCharset;
use crate::error::{Error, SchemaError};
use crate::node::{Kind, Node, Payload, Scalar};

const MAGIC: u8 = 0xA0;
const ATTR_MARKER: u8 = 0xFE;
const END_MARKER: u8 = 0xFF;
const ARRAY_BIT: u8 = 0x40;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_.";

fn alphabet_index(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

fn write_name(name: &str, out: &mut Vec<u8>) -> Result<(), Error> {
    if name.len() > 63 || !name.is_ascii() {
        return Err(Error::Schema(SchemaError::InvalidName(name.to_string())));
    }
    let codes: Vec<u8> = name
        .bytes()
        .map(|b| alphabet_index(b).ok_or_else(|| Error::Schema(SchemaError::InvalidName(name.to_string()))))
        .collect::<Result<_, _>>()?;
    out.push(codes.len() as u8);
    for chunk in codes.chunks(4) {
        let mut c = [0u8; 4];
        c[..chunk.len()].copy_from_slice(chunk);
        let combined = ((c[0] as u32) << 18) | ((c[1] as u32) << 12) | ((c[2] as u32) << 6) | (c[3] as u32);
        out.push((combined >> 16) as u8);
        out.push((combined >> 8) as u8);
        out.push(combined as u8);
    }
    Ok(())
}

fn read_name(buf: &[u8], pos: &mut usize) -> Result<String, Error> {
    let len = read_u8(buf, pos, "name length")? as usize;
    let groups = (len + 3) / 4;
    let mut codes = Vec::with_capacity(groups * 4);
    for _ in 0..groups {
        if *pos + 3 > buf.len() {
            return Err(Error::Schema(SchemaError::TruncatedValue { what: "name bytes" }));
        }
        let combined = ((buf[*pos] as u32) << 16) | ((buf[*pos + 1] as u32) << 8) | (buf[*pos + 2] as u32);
        *pos += 3;
        codes.push(((combined >> 18) & 0x3F) as u8);
        codes.push(((combined >> 12) & 0x3F) as u8);
        codes.push(((combined >> 6) & 0x3F) as u8);
        codes.push((combined & 0x3F) as u8);
    }
    codes.truncate(len);
    let bytes: Vec<u8> = codes
        .into_iter()
        .map(|c| ALPHABET.get(c as usize).copied().ok_or(Error::Schema(SchemaError::NameDecode)))
        .collect::<Result<_, _>>()?;
    String::from_utf8(bytes).map_err(|_| Error::Schema(SchemaError::NameDecode))
}

fn read_u8(buf: &[u8], pos: &mut usize, what: &'static str) -> Result<u8, Error> {
    let b = *buf.get(*pos).ok_or(Error::Schema(SchemaError::TruncatedValue { what }))?;
    *pos += 1;
    Ok(b)
}

fn peek_u8(buf: &[u8], pos: usize) -> Result<u8, Error> {
    buf.get(pos).copied().ok_or(Error::Schema(SchemaError::TruncatedStructure))
}

fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32, Error> {
    if *pos + 4 > buf.len() {
        return Err(Error::Schema(SchemaError::TruncatedValue { what: "length prefix" }));
    }
    let v = u32::from_be_bytes(buf[*pos..*pos + 4].try_into().unwrap());
    *pos += 4;
    Ok(v)
}

fn pad4_write(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn pad4_read(pos: &mut usize) {
    while *pos % 4 != 0 {
        *pos += 1;
    }
}

pub fn encode(tree: &Node, charset: TextCharset) -> Result<Vec<u8>, Error> {
    let mut structure = Vec::new();
    write_node_structure(tree, &mut structure)?;
    structure.push(END_MARKER);
    pad4_write(&mut structure);

    let mut data = Vec::new();
    write_node_values(tree, charset, &mut data)?;
    write_attribute_values(tree, charset, &mut data)?;

    let mut out = Vec::with_capacity(8 + structure.len() + data.len());
    out.push(MAGIC);
    out.push(charset.magic_byte());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(structure.len() as u32).to_be_bytes());
    out.extend_from_slice(&structure);
    out.extend_from_slice(&data);
    Ok(out)
}

fn write_node_structure(node: &Node, out: &mut Vec<u8>) -> Result<(), Error> {
    let mut tag = node.kind().tag();
    if matches!(node.value(), Payload::Array(..)) {
        tag |= ARRAY_BIT;
    }
    out.push(tag);
    write_name(node.name(), out)?;
    for (key, _) in node.attributes() {
        out.push(ATTR_MARKER);
        write_name(key, out)?;
    }
    for child in node.children() {
        write_node_structure(child, out)?;
    }
    out.push(END_MARKER);
    Ok(())
}

fn write_node_values(node: &Node, charset: TextCharset, out: &mut Vec<u8>) -> Result<(), Error> {
    match node.value() {
        Payload::Void => {}
        Payload::Scalar(s) => {
            write_scalar_value(s, charset, out)?;
            pad4_write(out);
        }
        Payload::Array(kind, values) => {
            let elem_size = kind.array_element_size().expect("array kinds always carry a fixed element size");
            out.extend_from_slice(&((values.len() * elem_size) as u32).to_be_bytes());
            for v in values {
                write_scalar_raw(v, out);
            }
            pad4_write(out);
        }
    }
    for child in node.children() {
        write_node_values(child, charset, out)?;
    }
    Ok(())
}

fn write_attribute_values(node: &Node, charset: TextCharset, out: &mut Vec<u8>) -> Result<(), Error> {
    for (_, value) in node.attributes() {
        let bytes = charset.encode(value)?;
        out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&bytes);
        pad4_write(out);
    }
    for child in node.children() {
        write_attribute_values(child, charset, out)?;
    }
    Ok(())
}

fn write_scalar_value(s: &Scalar, charset: TextCharset, out: &mut Vec<u8>) -> Result<(), Error> {
    match s {
        Scalar::Str(text) => {
            let bytes = charset.encode(text)?;
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(&bytes);
        }
        Scalar::Bin(bytes) => {
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        other => write_scalar_raw(other, out),
    }
    Ok(())
}

fn write_scalar_raw(s: &Scalar, out: &mut Vec<u8>) {
    match s {
        Scalar::S8(v) => out.push(*v as u8),
        Scalar::U8(v) => out.push(*v),
        Scalar::S16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::U16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::S32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::S64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::U64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Scalar::Ip4(ip) => out.extend_from_slice(&ip.octets()),
        Scalar::Time(t) => out.extend_from_slice(&t.to_be_bytes()),
        Scalar::Float(f) => out.extend_from_slice(&f.to_be_bytes()),
        Scalar::Bool(b) => out.push(if *b { 1 } else { 0 }),
        Scalar::Pair2S8(a) => a.iter().for_each(|x| out.push(*x as u8)),
        Scalar::Triple3S8(a) => a.iter().for_each(|x| out.push(*x as u8)),
        Scalar::Quad4U8(a) => out.extend_from_slice(a),
        Scalar::Pair2S16(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Triple3S16(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Quad4S16(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Pair2S32(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Triple3S32(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Quad4S32(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Pair2S64(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Triple3S64(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Quad4S64(a) => a.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        Scalar::Str(_) | Scalar::Bin(_) => unreachable!("str/bin always go through write_scalar_value"),
    }
}

/// Decode a complete binary document, returning the tree and the charset it
/// was declared under (the caller generally already knows the charset from
/// the envelope sniff, but returning it keeps this function self-contained).
pub fn decode(data: &[u8]) -> Result<(Node, TextCharset), Error> {
    if data.len() < 8 || data[0] != MAGIC {
        return Err(Error::Schema(SchemaError::TruncatedStructure));
    }
    let charset = TextCharset::from_magic_byte(data[1])?;
    let structure_len = u32::from_be_bytes(data[4..8].try_into().unwrap()) as usize;
    if 8 + structure_len > data.len() {
        return Err(Error::Schema(SchemaError::TruncatedStructure));
    }
    let structure = &data[8..8 + structure_len];
    let body = &data[8 + structure_len..];

    let mut spos = 0usize;
    let shape = parse_structure(structure, &mut spos)?;
    if peek_u8(structure, spos)? != END_MARKER {
        return Err(Error::Schema(SchemaError::TrailingData));
    }
    spos += 1;
    if structure[spos..].iter().any(|&b| b != 0) {
        return Err(Error::Schema(SchemaError::TrailingData));
    }

    let mut dpos = 0usize;
    let mut node = build_node_values(&shape, charset, body, &mut dpos)?;
    fill_attribute_values(&mut node, &shape, charset, body, &mut dpos)?;
    Ok((node, charset))
}

struct Shape {
    name: String,
    kind: Kind,
    is_array: bool,
    attr_names: Vec<String>,
    children: Vec<Shape>,
}

fn parse_structure(buf: &[u8], pos: &mut usize) -> Result<Shape, Error> {
    let tag = read_u8(buf, pos, "type tag")?;
    let is_array = tag & ARRAY_BIT != 0;
    let kind = Kind::from_tag(tag & !ARRAY_BIT)?;
    let name = read_name(buf, pos)?;
    let mut attr_names = Vec::new();
    let mut seen_attrs = std::collections::HashSet::new();
    let mut children = Vec::new();
    loop {
        match peek_u8(buf, *pos)? {
            ATTR_MARKER => {
                *pos += 1;
                let attr_name = read_name(buf, pos)?;
                if !seen_attrs.insert(attr_name.clone()) {
                    return Err(Error::Schema(SchemaError::DuplicateAttribute(attr_name)));
                }
                attr_names.push(attr_name);
            }
            END_MARKER => {
                *pos += 1;
                break;
            }
            _ => children.push(parse_structure(buf, pos)?),
        }
    }
    Ok(Shape { name, kind, is_array, attr_names, children })
}

fn build_node_values(shape: &Shape, charset: TextCharset, data: &[u8], pos: &mut usize) -> Result<Node, Error> {
    let mut node = match (shape.kind, shape.is_array) {
        (Kind::Void, _) => Node::void(shape.name.clone()),
        (kind, false) => {
            let scalar = read_scalar_value(kind, charset, data, pos)?;
            pad4_read(pos);
            Node::scalar(shape.name.clone(), scalar)
        }
        (kind, true) => {
            let elem_size = kind
                .array_element_size()
                .ok_or(Error::Schema(SchemaError::NotArrayCapable(kind.xml_type_name())))?;
            let byte_count = read_u32(data, pos)? as usize;
            let count = byte_count / elem_size;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(read_scalar_raw(kind, data, pos)?);
            }
            pad4_read(pos);
            Node::array(shape.name.clone(), kind, values)?
        }
    };
    for child_shape in &shape.children {
        node.add_child(build_node_values(child_shape, charset, data, pos)?);
    }
    Ok(node)
}

fn fill_attribute_values(node: &mut Node, shape: &Shape, charset: TextCharset, data: &[u8], pos: &mut usize) -> Result<(), Error> {
    for attr_name in &shape.attr_names {
        let len = read_u32(data, pos)? as usize;
        if *pos + len > data.len() {
            return Err(Error::Schema(SchemaError::TruncatedValue { what: "attribute value" }));
        }
        let value = charset.decode(&data[*pos..*pos + len])?;
        *pos += len;
        pad4_read(pos);
        node.set_attribute(attr_name.clone(), value);
    }
    for (child_shape, child_node) in shape.children.iter().zip(node.children_mut().iter_mut()) {
        fill_attribute_values(child_node, child_shape, charset, data, pos)?;
    }
    Ok(())
}

fn read_scalar_value(kind: Kind, charset: TextCharset, data: &[u8], pos: &mut usize) -> Result<Scalar, Error> {
    match kind {
        Kind::Str => {
            let len = read_u32(data, pos)? as usize;
            if *pos + len > data.len() {
                return Err(Error::Schema(SchemaError::TruncatedValue { what: "string value" }));
            }
            let text = charset.decode(&data[*pos..*pos + len])?;
            *pos += len;
            Ok(Scalar::Str(text))
        }
        Kind::Bin => {
            let len = read_u32(data, pos)? as usize;
            if *pos + len > data.len() {
                return Err(Error::Schema(SchemaError::TruncatedValue { what: "binary value" }));
            }
            let bytes = data[*pos..*pos + len].to_vec();
            *pos += len;
            Ok(Scalar::Bin(bytes))
        }
        other => read_scalar_raw(other, data, pos),
    }
}

fn read_scalar_raw(kind: Kind, data: &[u8], pos: &mut usize) -> Result<Scalar, Error> {
    macro_rules! take {
        ($n:expr) => {{
            if *pos + $n > data.len() {
                return Err(Error::Schema(SchemaError::TruncatedValue { what: "scalar value" }));
            }
            let s = &data[*pos..*pos + $n];
            *pos += $n;
            s
        }};
    }
    Ok(match kind {
        Kind::S8 => Scalar::S8(take!(1)[0] as i8),
        Kind::U8 => Scalar::U8(take!(1)[0]),
        Kind::S16 => Scalar::S16(i16::from_be_bytes(take!(2).try_into().unwrap())),
        Kind::U16 => Scalar::U16(u16::from_be_bytes(take!(2).try_into().unwrap())),
        Kind::S32 => Scalar::S32(i32::from_be_bytes(take!(4).try_into().unwrap())),
        Kind::U32 => Scalar::U32(u32::from_be_bytes(take!(4).try_into().unwrap())),
        Kind::S64 => Scalar::S64(i64::from_be_bytes(take!(8).try_into().unwrap())),
        Kind::U64 => Scalar::U64(u64::from_be_bytes(take!(8).try_into().unwrap())),
        Kind::Ip4 => {
            let b = take!(4);
            Scalar::Ip4(std::net::Ipv4Addr::new(b[0], b[1], b[2], b[3]))
        }
        Kind::Time => Scalar::Time(u32::from_be_bytes(take!(4).try_into().unwrap())),
        Kind::Float => Scalar::Float(f32::from_be_bytes(take!(4).try_into().unwrap())),
        Kind::Bool => Scalar::Bool(take!(1)[0] != 0),
        Kind::Pair2S8 => {
            let b = take!(2);
            Scalar::Pair2S8([b[0] as i8, b[1] as i8])
        }
        Kind::Triple3S8 => {
            let b = take!(3);
            Scalar::Triple3S8([b[0] as i8, b[1] as i8, b[2] as i8])
        }
        Kind::Quad4U8 => {
            let b = take!(4);
            Scalar::Quad4U8([b[0], b[1], b[2], b[3]])
        }
        Kind::Pair2S16 => {
            let b = take!(4);
            Scalar::Pair2S16([i16::from_be_bytes([b[0], b[1]]), i16::from_be_bytes([b[2], b[3]])])
        }
        Kind::Triple3S16 => {
            let b = take!(6);
            Scalar::Triple3S16([
                i16::from_be_bytes([b[0], b[1]]),
                i16::from_be_bytes([b[2], b[3]]),
                i16::from_be_bytes([b[4], b[5]]),
            ])
        }
        Kind::Quad4S16 => {
            let b = take!(8);
            Scalar::Quad4S16([
                i16::from_be_bytes([b[0], b[1]]),
                i16::from_be_bytes([b[2], b[3]]),
                i16::from_be_bytes([b[4], b[5]]),
                i16::from_be_bytes([b[6], b[7]]),
            ])
        }
        Kind::Pair2S32 => {
            let b = take!(8);
            Scalar::Pair2S32([i32::from_be_bytes(b[0..4].try_into().unwrap()), i32::from_be_bytes(b[4..8].try_into().unwrap())])
        }
        Kind::Triple3S32 => {
            let b = take!(12);
            Scalar::Triple3S32([
                i32::from_be_bytes(b[0..4].try_into().unwrap()),
                i32::from_be_bytes(b[4..8].try_into().unwrap()),
                i32::from_be_bytes(b[8..12].try_into().unwrap()),
            ])
        }
        Kind::Quad4S32 => {
            let b = take!(16);
            Scalar::Quad4S32([
                i32::from_be_bytes(b[0..4].try_into().unwrap()),
                i32::from_be_bytes(b[4..8].try_into().unwrap()),
                i32::from_be_bytes(b[8..12].try_into().unwrap()),
                i32::from_be_bytes(b[12..16].try_into().unwrap()),
            ])
        }
        Kind::Pair2S64 => {
            let b = take!(16);
            Scalar::Pair2S64([i64::from_be_bytes(b[0..8].try_into().unwrap()), i64::from_be_bytes(b[8..16].try_into().unwrap())])
        }
        Kind::Triple3S64 => {
            let b = take!(24);
            Scalar::Triple3S64([
                i64::from_be_bytes(b[0..8].try_into().unwrap()),
                i64::from_be_bytes(b[8..16].try_into().unwrap()),
                i64::from_be_bytes(b[16..24].try_into().unwrap()),
            ])
        }
        Kind::Quad4S64 => {
            let b = take!(32);
            Scalar::Quad4S64([
                i64::from_be_bytes(b[0..8].try_into().unwrap()),
                i64::from_be_bytes(b[8..16].try_into().unwrap()),
                i64::from_be_bytes(b[16..24].try_into().unwrap()),
                i64::from_be_bytes(b[24..32].try_into().unwrap()),
            ])
        }
        Kind::Void | Kind::Str | Kind::Bin => unreachable!("handled by read_scalar_value or never arrays"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn roundtrip(node: &Node, charset: TextCharset) -> Node {
        let bytes = encode(node, charset).unwrap();
        let (decoded, decoded_charset) = decode(&bytes).unwrap();
        assert_eq!(decoded_charset, charset);
        decoded
    }

    #[test]
    fn void_leaf_roundtrips() {
        let n = Node::void("response");
        assert_eq!(roundtrip(&n, TextCharset::Utf8), n);
    }

    #[test]
    fn magic_and_charset_byte_are_correct() {
        let n = Node::void("response");
        let bytes = encode(&n, TextCharset::Utf8).unwrap();
        assert_eq!(bytes[0], 0xA0);
        assert_eq!(bytes[1], TextCharset::Utf8.magic_byte());
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn nested_tree_with_attributes_and_mixed_kinds_roundtrips() {
        let mut root = Node::void("call");
        root.set_attribute("model", "LDJ");
        root.set_attribute("ver", "2.00");
        let mut child = Node::s32("score", -12345);
        child.set_attribute("rank", "S");
        root.add_child(child);
        root.add_child(Node::array_u8("bytes", vec![1, 2, 3, 4, 5]));
        root.add_child(Node::string("message", "hello"));
        root.add_child(Node::ipv4("ip", std::net::Ipv4Addr::new(192, 168, 0, 1)));
        assert_eq!(roundtrip(&root, TextCharset::Utf8), root);
    }

    #[test]
    fn array_boundary_sizes_roundtrip() {
        for len in [0usize, 1, 2, 255, 256, 65535] {
            let values: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let n = Node::array_u8("data", values);
            assert_eq!(roundtrip(&n, TextCharset::Utf8), n);
        }
    }

    #[test]
    fn shift_jis_text_roundtrips() {
        let n = Node::string("greeting", "こんにちは");
        assert_eq!(roundtrip(&n, TextCharset::ShiftJis), n);
    }

    #[test]
    fn array_of_str_is_rejected_at_construction_not_at_the_wire() {
        assert!(Node::array("x", Kind::Str, vec![Scalar::Str("a".into())]).is_err());
    }

    #[test]
    fn composite_pair_and_quad_kinds_roundtrip() {
        let mut root = Node::void("root");
        root.add_child(Node::pair2s32("pair", [1, -2]));
        root.add_child(Node::quad4s16("quad", [1, 2, 3, 4]));
        root.add_child(Node::array_triple3s8("triples", vec![[1, 2, 3], [-1, -2, -3]]));
        assert_eq!(roundtrip(&root, TextCharset::Utf8), root);
    }

    fn wrap_document(mut structure: Vec<u8>, attr_values: &[&[u8]]) -> Vec<u8> {
        // `structure` already ends with the node's own closing `END_MARKER`;
        // append the document trailer before padding, mirroring `encode`.
        structure.push(END_MARKER);
        pad4_write(&mut structure);
        let mut out = vec![MAGIC, TextCharset::Utf8.magic_byte(), 0, 0];
        out.extend_from_slice(&(structure.len() as u32).to_be_bytes());
        out.extend_from_slice(&structure);
        for bytes in attr_values {
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(bytes);
            while out.len() % 4 != 0 {
                out.push(0);
            }
        }
        out
    }

    #[test]
    fn duplicate_attribute_name_is_rejected() {
        let mut structure = Vec::new();
        structure.push(Kind::Void.tag());
        write_name("x", &mut structure).unwrap();
        structure.push(ATTR_MARKER);
        write_name("a", &mut structure).unwrap();
        structure.push(ATTR_MARKER);
        write_name("a", &mut structure).unwrap();
        structure.push(END_MARKER);
        let data = wrap_document(structure, &[&[], &[]]);
        let result = decode(&data);
        assert!(matches!(result, Err(Error::Schema(SchemaError::DuplicateAttribute(_)))));
    }

    #[test]
    fn trailing_data_after_the_document_root_is_rejected() {
        let n = Node::void("response");
        let mut bytes = encode(&n, TextCharset::Utf8).unwrap();
        let structure_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;

        // Splice a second root's worth of structure bytes right after the
        // first document's trailer/padding, growing the declared length to
        // match, so the segment now looks like two concatenated documents.
        let mut second_root = Vec::new();
        second_root.push(Kind::Void.tag());
        write_name("y", &mut second_root).unwrap();
        second_root.push(END_MARKER);
        pad4_write(&mut second_root);

        bytes[4..8].copy_from_slice(&((structure_len + second_root.len()) as u32).to_be_bytes());
        let insert_at = 8 + structure_len;
        for (i, b) in second_root.into_iter().enumerate() {
            bytes.insert(insert_at + i, b);
        }
        let result = decode(&bytes);
        assert!(matches!(result, Err(Error::Schema(SchemaError::TrailingData))));
    }
}
