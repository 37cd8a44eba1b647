use assert_cmd::prelude::*;
use std::process::Command;

use eamuse_codec::charset::TextCharset;
use eamuse_codec::node::Node;
use eamuse_codec::{binary, lz77, xml};

type StdResult = Result<(), Box<dyn std::error::Error>>;

fn sample_tree() -> Node {
    let mut root = Node::void("call");
    root.set_attribute("model", "NBT:J:A:A:2024050100");
    let mut child = Node::s32("score", -12345);
    child.set_attribute("rank", "S");
    root.add_child(child);
    root.add_child(Node::string("message", "hello"));
    root.add_child(Node::array_u8("payload", vec![1, 2, 3, 4, 5]));
    root
}

#[test]
fn convert_binary_to_xml_preserves_the_tree() -> StdResult {
    let tree = sample_tree();
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("req.bin");
    let out_path = temp_dir.path().join("req.xml");
    std::fs::write(&in_path, binary::encode(&tree, TextCharset::Utf8)?)?;

    Command::cargo_bin("codec")?
        .arg("convert")
        .arg("--from").arg("binary")
        .arg("--to").arg("xml")
        .arg("--charset").arg("utf8")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    let (decoded, charset) = xml::decode(&std::fs::read(out_path)?)?;
    assert_eq!(charset, TextCharset::Utf8);
    assert_eq!(decoded, tree);
    Ok(())
}

#[test]
fn convert_xml_to_binary_preserves_the_tree() -> StdResult {
    let tree = sample_tree();
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("req.xml");
    let out_path = temp_dir.path().join("req.bin");
    std::fs::write(&in_path, xml::encode(&tree, TextCharset::Utf8)?)?;

    Command::cargo_bin("codec")?
        .arg("convert")
        .arg("--from").arg("xml")
        .arg("--to").arg("binary")
        .arg("--charset").arg("utf8")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    let (decoded, _) = binary::decode(&std::fs::read(out_path)?)?;
    assert_eq!(decoded, tree);
    Ok(())
}

#[test]
fn convert_honors_compress_in_and_compress_out() -> StdResult {
    let tree = sample_tree();
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("req.bin.lz");
    let out_path = temp_dir.path().join("req.out.lz");
    let raw = binary::encode(&tree, TextCharset::Utf8)?;
    std::fs::write(&in_path, lz77::compress(&raw))?;

    Command::cargo_bin("codec")?
        .arg("convert")
        .arg("--from").arg("binary")
        .arg("--to").arg("binary")
        .arg("--charset").arg("utf8")
        .arg("--compress-in")
        .arg("--compress-out")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    let decompressed = lz77::decompress(&std::fs::read(out_path)?)?;
    let (decoded, _) = binary::decode(&decompressed)?;
    assert_eq!(decoded, tree);
    Ok(())
}

#[test]
fn roundtrip_subcommand_reproduces_the_input_byte_for_byte() -> StdResult {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("data.bin");
    let out_path = temp_dir.path().join("data.out");
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&in_path, &data)?;

    Command::cargo_bin("codec")?
        .arg("roundtrip")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    assert_eq!(std::fs::read(out_path)?, data);
    Ok(())
}

#[test]
fn void_document_matches_the_documented_byte_layout() -> StdResult {
    let tree = Node::void("response");
    let bytes = binary::encode(&tree, TextCharset::Utf8)?;
    assert_eq!(&bytes[0..4], &[0xA0, 0x54, 0x00, 0x00]);
    assert_eq!(bytes.len() % 4, 0);
    let (decoded, _) = binary::decode(&bytes)?;
    assert_eq!(decoded, tree);
    Ok(())
}
