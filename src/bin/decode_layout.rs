use anyhow::Context;
use binshape::dump::{format_value, hex_dump};
use binshape::{decode_layout_with_extent, DecoderOptions, Endianness, Schema};
use std::path::PathBuf;

fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    match args.iter().position(|a| names.contains(&a.as_str())) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn main() -> anyhow::Result<()> {
    let mut raw_args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut raw_args, &["--verbose", "-v"]);
    let big_endian = take_flag(&mut raw_args, &["--big-endian", "-b"]);
    let hex = take_flag(&mut raw_args, &["--hex"]);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "warn" }))
        .init();

    let mut args = raw_args.into_iter();
    let (layout_path, name, data_path) = match (args.next(), args.next(), args.next()) {
        (Some(l), Some(n), Some(d)) => (PathBuf::from(l), n, PathBuf::from(d)),
        _ => anyhow::bail!("usage: decode_layout [--big-endian|-b] [--hex] [--verbose|-v] LAYOUT_FILE NAME DATA_FILE"),
    };

    let schema = Schema::load(&layout_path).map_err(|e| anyhow::anyhow!(e))?;
    let bytes = std::fs::read(&data_path).with_context(|| format!("reading {}", data_path.display()))?;
    let endianness = if big_endian { Endianness::Big } else { Endianness::Little };
    let options = DecoderOptions::new(endianness);

    if hex {
        print!("{}", hex_dump(&bytes));
    }
    let (value, consumed) = decode_layout_with_extent(&schema, &name, &bytes, &options)
        .with_context(|| format!("decoding {} from {}", name, data_path.display()))?;
    print!("{}", format_value(&value));

    if consumed < bytes.len() {
        eprintln!("note: {} trailing bytes after offset {} not decoded", bytes.len() - consumed, consumed);
    }
    if verbose {
        eprintln!("layouts: {}", layout_path.display());
        eprintln!("data:    {} ({} bytes, {:?})", data_path.display(), bytes.len(), endianness);
        eprintln!("consumed: {}", consumed);
    }
    Ok(())
}
