// Fetches known Whisper ggml weight files into the model directory so the
// main CLI can load them offline afterwards.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use murmur::opts::ModelSize;
use murmur::whisper::resolve_model_dir;

#[derive(Parser, Debug)]
#[command(name = "murmur-fetch", version)]
#[command(about = "Download Whisper model weights for murmur")]
struct Args {
    /// List supported model names and exit.
    #[arg(long)]
    list: bool,

    /// Model size to fetch (tiny, base, small, medium, large).
    ///
    /// Only known-good ggml artifacts are fetched; arbitrary URLs are not.
    #[arg(long, value_enum, required_unless_present = "list")]
    name: Option<ModelSize>,

    /// Target directory to store weights (created if missing). Defaults to
    /// MURMUR_MODELS or ./models.
    #[arg(long)]
    dir: Option<PathBuf>,
}

// whisper.cpp's standard Hugging Face repo for ggml weights.
const GGML_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

fn weight_url(size: ModelSize) -> String {
    format!("{GGML_BASE_URL}/{}", size.ggml_filename())
}

fn model_list_string() -> String {
    let mut out = String::from("Available models:\n");
    for size in [
        ModelSize::Tiny,
        ModelSize::Base,
        ModelSize::Small,
        ModelSize::Medium,
        ModelSize::Large,
    ] {
        out.push_str(&format!("  - {size} ({})\n", size.ggml_filename()));
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print!("{}", model_list_string());
        return Ok(());
    }

    let Some(size) = args.name else {
        anyhow::bail!("--name is required unless --list is given");
    };
    let dir = resolve_model_dir(args.dir);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create model directory: {}", dir.display()))?;

    let dest_path = dir.join(size.ggml_filename());
    if dest_path.exists() {
        println!("already present: {}", dest_path.display());
        return Ok(());
    }

    let url = weight_url(size);
    println!("fetching {size} -> {}", dest_path.display());

    let client = Client::builder().build()?;
    download_to_path(&client, &url, &dest_path)?;

    println!("done: {}", dest_path.display());
    Ok(())
}

/// Download a URL into `dest_path` safely:
/// - download to `dest_path.part`
/// - fsync + rename to final path
fn download_to_path(client: &Client, url: &str, dest_path: &Path) -> Result<()> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?
        .error_for_status()
        .with_context(|| format!("download failed (bad status): {url}"))?;

    let total = resp.content_length();
    download_to_path_with_reader(resp, total, dest_path)
}

fn download_to_path_with_reader<R: Read>(
    mut reader: R,
    total_bytes: Option<u64>,
    dest_path: &Path,
) -> Result<()> {
    let total = total_bytes.unwrap_or(0);

    let pb = if total > 0 {
        ProgressBar::new(total)
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {bytes}/{total_bytes} {bar:40.cyan/blue} {eta}",
        )
        .expect("static progress template")
        .progress_chars("#>-"),
    );

    let tmp_path = PathBuf::from(format!("{}.part", dest_path.display()));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            pb.inc(n as u64);
        }

        file.sync_all()?;
        pb.finish_and_clear();

        fs::rename(&tmp_path, dest_path)
            .with_context(|| format!("failed to move into place: {}", dest_path.display()))?;

        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
        pb.finish_and_clear();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_urls_point_at_ggml_artifacts() {
        assert!(weight_url(ModelSize::Tiny).ends_with("/ggml-tiny.bin"));
        assert!(weight_url(ModelSize::Large).ends_with("/ggml-large-v3.bin"));
    }

    #[test]
    fn model_list_names_every_size() {
        let list = model_list_string();
        for name in ["tiny", "base", "small", "medium", "large"] {
            assert!(list.contains(name), "missing {name} in list");
        }
    }

    #[test]
    fn args_require_name_unless_list() {
        assert!(Args::try_parse_from(["murmur-fetch"]).is_err());
        let args = Args::try_parse_from(["murmur-fetch", "--list"]).expect("parse list args");
        assert!(args.list);
        assert!(args.name.is_none());
    }

    #[test]
    fn download_writes_and_renames() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dest_path = dir.path().join("model.bin");
        let tmp_path = PathBuf::from(format!("{}.part", dest_path.display()));

        let bytes = b"abc123".to_vec();
        download_to_path_with_reader(
            std::io::Cursor::new(bytes.clone()),
            Some(bytes.len() as u64),
            &dest_path,
        )?;

        assert!(dest_path.exists());
        assert!(!tmp_path.exists());
        assert_eq!(fs::read(&dest_path)?, bytes);
        Ok(())
    }

    #[test]
    fn download_cleans_up_part_file_on_error() -> Result<()> {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("simulated read failure"))
            }
        }

        let dir = tempfile::tempdir()?;
        let dest_path = dir.path().join("model.bin");
        let tmp_path = PathBuf::from(format!("{}.part", dest_path.display()));

        let err = download_to_path_with_reader(FailingReader, Some(6), &dest_path).unwrap_err();
        assert!(err.to_string().contains("simulated read failure"));
        assert!(!dest_path.exists());
        assert!(!tmp_path.exists());
        Ok(())
    }
}
