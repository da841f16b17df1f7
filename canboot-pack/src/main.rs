//! Frames program images for the canboot loader.
//!
//! Reads an ASCII-hex boot image (two hex characters per byte, low byte of
//! each word first; control bytes below `'0'` are ignored), validates its
//! header and block structure, and emits the counted data-channel payload
//! stream that a host-side CAN channel pushes to the device.

use anyhow::{bail, ensure, Context, Result};
use byteorder::{WriteBytesExt, BE, LE};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};

use canboot_shared::{self as shared, codec};

/// Frame program images for the canboot loader.
#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the entry address and block table of an image.
    Inspect {
        /// Image in ASCII hex format.
        src: PathBuf,
    },
    /// Write the framed data-channel payload stream.
    Frames {
        /// Image in ASCII hex format.
        src: PathBuf,
        /// Destination path of the frame stream.
        dst: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.cmd {
        Cmd::Inspect { src } => {
            let words = read_image_words(&src)?;
            let image = Image::parse(&words)?;
            println!("entry:  0x{:08x}", image.entry);
            for (i, block) in image.blocks.iter().enumerate() {
                println!("block {i}: {} words at 0x{:08x}", block.words.len(), block.dest);
            }
            println!("total:  {} words ({} bytes on the wire)", words.len(), words.len() * 4);
        }
        Cmd::Frames { src, dst } => {
            let words = read_image_words(&src)?;
            let image = Image::parse(&words)?;
            let dst = dst.unwrap_or_else(|| src.with_extension("can"));

            let stream = frames(&words);
            fs::write(&dst, &stream).with_context(|| format!("writing {}", dst.display()))?;
            eprintln!(
                "{} -> {} (entry 0x{:08x}, {} blocks, {} messages)",
                src.display(),
                dst.display(),
                image.entry,
                image.blocks.len(),
                words.len()
            );
        }
    }

    Ok(())
}

/// Reads and decodes an ASCII-hex image into its word stream.
fn read_image_words(path: &PathBuf) -> Result<Vec<u16>> {
    let text = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let words = parse_hex(&text)?;
    log::debug!("parsed {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Decodes ASCII hex into words, low byte first.
///
/// Bytes below `'0'` (STX/ETX, whitespace) are skipped, matching what the
/// device discards on its end of the stream.
fn parse_hex(text: &[u8]) -> Result<Vec<u16>> {
    let mut nibbles = Vec::new();
    for &byte in text {
        if byte < b'0' {
            continue;
        }
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'A'..=b'F' => byte - b'A' + 10,
            b'a'..=b'f' => byte - b'a' + 10,
            _ => bail!("invalid hex character {:?}", char::from(byte)),
        };
        nibbles.push(nibble);
    }
    ensure!(nibbles.len() % 4 == 0, "image ends mid-word ({} hex digits)", nibbles.len());

    Ok(nibbles
        .chunks_exact(4)
        .map(|n| codec::word((n[0] << 4) | n[1], (n[2] << 4) | n[3]))
        .collect())
}

/// Frames the word stream with the global sequence counter starting at 1.
fn frames(words: &[u16]) -> Vec<u8> {
    let mut stream = Vec::with_capacity(words.len() * 4);
    for (i, &word) in words.iter().enumerate() {
        stream.write_u16::<BE>((i + 1) as u16).unwrap();
        stream.write_u16::<LE>(word).unwrap();
    }
    stream
}

struct Block {
    dest: u32,
    words: Vec<u16>,
}

struct Image {
    entry: u32,
    blocks: Vec<Block>,
}

impl Image {
    /// Validates the header and block structure of a word stream.
    fn parse(words: &[u16]) -> Result<Self> {
        let mut iter = words.iter().copied();
        let mut next = |what: &str| iter.next().with_context(|| format!("image truncated at {what}"));

        let key = next("key")?;
        ensure!(key == shared::IMAGE_KEY, "bad image key 0x{key:04x}, expected 0x{:04x}", shared::IMAGE_KEY);
        for _ in 0..shared::RESERVED_WORDS {
            next("reserved words")?;
        }
        let entry = codec::join(next("entry address")?, next("entry address")?);

        let mut blocks = Vec::new();
        loop {
            let size = next("block size")?;
            if size == 0 {
                break;
            }
            let dest = codec::join(next("destination address")?, next("destination address")?);
            let mut block = Block { dest, words: Vec::with_capacity(size.into()) };
            for _ in 0..size {
                block.words.push(next("block payload")?);
            }
            blocks.push(block);
        }
        ensure!(iter.next().is_none(), "trailing words after terminating block");

        Ok(Self { entry, blocks })
    }
}
