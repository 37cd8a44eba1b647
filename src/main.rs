use clap::{arg, crate_version, Command};
use eamuse_codec::charset::TextCharset;
use eamuse_codec::envelope::{self, Compression, PacketFormat};
use eamuse_codec::lz77;

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Convert binary to XML:  `codec convert --from binary --to xml --charset utf8 -i req.bin -o req.xml`
Check LZ77 idempotence: `codec roundtrip -i some_file -o some_file.rt`";

    let charsets = ["ascii", "shiftjis", "eucjp", "latin1", "utf8"];
    let formats = ["binary", "xml"];

    let mut main_cmd = Command::new("codec")
        .about("Inspect and convert e-amusement protocol packets")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("convert")
            .about("re-serialize a packet body between binary and XML form")
            .arg(arg!(--from <FORMAT> "source format").value_parser(formats).required(true))
            .arg(arg!(--to <FORMAT> "destination format").value_parser(formats).required(true))
            .arg(arg!(--charset <CHARSET> "text charset").value_parser(charsets).required(true))
            .arg(arg!(--"compress-in" "input body is LZ77-compressed"))
            .arg(arg!(--"compress-out" "compress the output body with LZ77"))
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true)),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("roundtrip")
            .about("LZ77-compress then decompress a file to verify idempotence")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true)),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("convert") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let from = parse_format(cmd.get_one::<String>("from").expect(RCH));
        let to = parse_format(cmd.get_one::<String>("to").expect(RCH));
        let charset = parse_charset(cmd.get_one::<String>("charset").expect(RCH));
        let compress_in = cmd.get_flag("compress-in");
        let compress_out = cmd.get_flag("compress-out");

        let body = std::fs::read(path_in)?;
        let in_compress = if compress_in { Compression::Lz77 } else { Compression::None };
        let out_compress = if compress_out { Compression::Lz77 } else { Compression::None };

        let tree = envelope::decode(in_compress, "", &body)?;
        log::info!("decoded {} as {:?}", path_in, from);
        let (bytes, info) = envelope::encode(out_compress, &tree, charset, to)?;
        log::info!("re-encoded with X-Eamuse-Info {}", info);
        std::fs::write(path_out, bytes)?;
    }

    if let Some(cmd) = matches.subcommand_matches("roundtrip") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let data = std::fs::read(path_in)?;
        let compressed = lz77::compress(&data);
        let expanded = lz77::decompress(&compressed)?;
        if expanded != data {
            eprintln!("roundtrip mismatch: compress/decompress did not reproduce the input");
            return Err(Box::new(std::fmt::Error));
        }
        std::fs::write(path_out, expanded)?;
    }

    Ok(())
}

fn parse_format(s: &str) -> PacketFormat {
    match s {
        "binary" => PacketFormat::Binary,
        "xml" => PacketFormat::Xml,
        _ => unreachable!("{RCH}"),
    }
}

fn parse_charset(s: &str) -> TextCharset {
    match s {
        "ascii" => TextCharset::Ascii,
        "shiftjis" => TextCharset::ShiftJis,
        "eucjp" => TextCharset::EucJp,
        "latin1" => TextCharset::Iso8859_1,
        "utf8" => TextCharset::Utf8,
        _ => unreachable!("{RCH}"),
    }
}
