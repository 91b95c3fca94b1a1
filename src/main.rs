//! epubkit - inspect EPUB files from the command line

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use epubkit::{Deadline, Epub, Metadata, ReadOptions, Result, TocSource};

#[derive(Parser)]
#[command(name = "epubkit")]
#[command(version, about = "Inspect EPUB files", long_about = None)]
#[command(after_help = "EXAMPLES:
    epubkit book.epub                      Show book metadata
    epubkit book.epub --chapters --json    List chapters as JSON
    epubkit book.epub --cover cover.jpg    Save the cover image
    epubkit book.epub --extract OEBPS/content.opf")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "FILE")]
    input: String,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// List chapters in reading order
    #[arg(long)]
    chapters: bool,

    /// Skip chapters larger than this many bytes (0 = no limit)
    #[arg(long, value_name = "N", default_value_t = 0, requires = "chapters")]
    max_len: u64,

    /// Give up listing chapters after this many milliseconds
    #[arg(long, value_name = "N", requires = "chapters")]
    timeout_ms: Option<u64>,

    /// Write the cover image to OUT
    #[arg(long, value_name = "OUT", conflicts_with_all = ["chapters", "extract"])]
    cover: Option<String>,

    /// Copy one archive entry to stdout
    #[arg(long, value_name = "PATH", conflicts_with = "chapters")]
    extract: Option<String>,
}

#[derive(Serialize)]
struct Summary<'a> {
    file: &'a str,
    root_file: &'a str,
    metadata: &'a Metadata,
    items: usize,
    spine: usize,
    toc_entries: Option<usize>,
    nav_document: Option<&'a str>,
    cover: Option<&'a str>,
    cover_media_type: Option<&'a str>,
}

#[derive(Serialize)]
struct ChapterSummary {
    order: usize,
    title: String,
    path: String,
    len: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut book = Epub::open(&cli.input)?;

    if let Some(out) = &cli.cover {
        save_cover(&mut book, out)?;
    } else if let Some(path) = &cli.extract {
        let mut entry = book.file_reader(path)?;
        io::copy(&mut entry, &mut io::stdout().lock())?;
    } else if cli.chapters {
        list_chapters(&mut book, cli)?;
    } else {
        show_info(&book, cli)?;
    }

    book.close();
    Ok(())
}

fn show_info(book: &Epub, cli: &Cli) -> Result<()> {
    let nav_document = match book.toc_source() {
        Some(TocSource::Navigation(item)) => Some(item.href.as_str()),
        _ => None,
    };
    let summary = Summary {
        file: &cli.input,
        root_file: book.root_file(),
        metadata: book.metadata(),
        items: book.items().len(),
        spine: book.spine().len(),
        toc_entries: book.toc().map(|toc| toc.nav_map.len()),
        nav_document,
        cover: book.cover_item().map(|item| item.href.as_str()),
        cover_media_type: book.cover_media_type(),
    };

    if cli.json {
        return print_json(&summary);
    }

    let meta = summary.metadata;
    println!("File: {}", summary.file);
    println!("Package: {}", summary.root_file);
    println!("Title: {}", meta.title);
    if !meta.creator.is_empty() {
        println!("Author: {}", meta.creator);
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if !meta.publisher.is_empty() {
        println!("Publisher: {}", meta.publisher);
    }
    if !meta.identifier.is_empty() {
        println!("Identifier: {}", meta.identifier);
    }
    let desc = meta.description.trim();
    if !desc.is_empty() {
        match desc.char_indices().nth(200) {
            Some((end, _)) => println!("Description: {}...", &desc[..end]),
            None => println!("Description: {desc}"),
        }
    }
    println!("Items: {}", summary.items);
    println!("Spine: {}", summary.spine);
    match (summary.toc_entries, summary.nav_document) {
        (Some(entries), _) => println!("TOC entries: {entries}"),
        (None, Some(href)) => println!("TOC: navigation document {href} (not parsed)"),
        (None, None) => println!("TOC: none"),
    }
    if let (Some(cover), Some(media_type)) = (summary.cover, summary.cover_media_type) {
        println!("Cover: {cover} ({media_type})");
    }

    Ok(())
}

fn list_chapters(book: &mut Epub, cli: &Cli) -> Result<()> {
    let deadline = cli
        .timeout_ms
        .map(|ms| Deadline::after(Duration::from_millis(ms)));
    let mut options = ReadOptions::new().with_max_content_length(cli.max_len);
    if let Some(deadline) = &deadline {
        options = options.with_cancel(deadline);
    }

    let chapters: Vec<ChapterSummary> = book
        .chapters(&options)?
        .into_iter()
        .map(|chapter| ChapterSummary {
            order: chapter.order,
            len: chapter.content.len(),
            title: chapter.title,
            path: chapter.path,
        })
        .collect();

    if cli.json {
        return print_json(&chapters);
    }

    for chapter in &chapters {
        println!(
            "{:>4}  {}  ({}, {} bytes)",
            chapter.order, chapter.title, chapter.path, chapter.len
        );
    }
    Ok(())
}

fn save_cover(book: &mut Epub, out: &str) -> Result<()> {
    let media_type = book.cover_media_type().unwrap_or_default().to_string();
    let Some(mut cover) = book.cover()? else {
        eprintln!("no cover image found");
        return Ok(());
    };

    let mut file = File::create(out)?;
    let written = io::copy(&mut cover, &mut file)?;
    file.flush()?;
    println!("Wrote {written} bytes ({media_type}) to {out}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}
